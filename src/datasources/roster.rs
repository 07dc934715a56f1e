use crate::error::{CropCastError, Result};
use crate::models::{first_duplicate, Roster};
use std::collections::HashMap;
use std::path::PathBuf;

/// Loads the crop roster from a `crops.txt` / `countries.txt` pair.
///
/// `crops.txt` holds one crop per line; its order defines crop identifiers.
/// `countries.txt` holds lines of the form `Crop: Country A, Country B`.
pub struct FileRosterSource {
    crops_path: PathBuf,
    countries_path: Option<PathBuf>,
}

impl FileRosterSource {
    pub fn new(crops_path: impl Into<PathBuf>, countries_path: Option<PathBuf>) -> Self {
        Self {
            crops_path: crops_path.into(),
            countries_path,
        }
    }

    pub fn load(&self) -> Result<Roster> {
        let crops_text = std::fs::read_to_string(&self.crops_path).map_err(|e| {
            CropCastError::InvalidInput(format!(
                "crop roster {} unreadable: {}",
                self.crops_path.display(),
                e
            ))
        })?;
        let names = parse_crops(&crops_text);
        if names.is_empty() {
            return Err(CropCastError::InvalidInput(format!(
                "crop roster {} lists no crops",
                self.crops_path.display()
            )));
        }
        if let Some(dup) = first_duplicate(&names) {
            return Err(CropCastError::InvalidInput(format!(
                "crop roster {} lists '{}' more than once",
                self.crops_path.display(),
                dup
            )));
        }
        tracing::info!("Loaded {} crops from {}", names.len(), self.crops_path.display());

        let countries = match &self.countries_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(text) => {
                    let countries = parse_countries(&text);
                    tracing::info!(
                        "Loaded countries for {} crops from {}",
                        countries.len(),
                        path.display()
                    );
                    countries
                }
                Err(e) => {
                    tracing::warn!("Country metadata unavailable at {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        Ok(Roster { names, countries })
    }
}

const BUILTIN_COUNTRIES: &str = include_str!("../../data/countries.txt");

/// The default U.S. roster with its bundled export destinations.
pub fn builtin_roster() -> Roster {
    Roster {
        countries: parse_countries(BUILTIN_COUNTRIES),
        ..Roster::default_crops()
    }
}

pub fn parse_crops(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

pub fn parse_countries(text: &str) -> HashMap<String, Vec<String>> {
    text.lines()
        .filter_map(|line| {
            let (crop, countries) = line.split_once(':')?;
            let crop = crop.trim();
            if crop.is_empty() {
                return None;
            }
            let countries = countries
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
            Some((crop.to_string(), countries))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crops_skip_blank_lines() {
        let names = parse_crops("Corn\n\n  Soybean \nTree Nuts\n");
        assert_eq!(names, vec!["Corn", "Soybean", "Tree Nuts"]);
    }

    #[test]
    fn countries_line_format() {
        let map = parse_countries("Corn: Mexico, Japan , Colombia\nno colon here\nRice:\n");
        assert_eq!(map["Corn"], vec!["Mexico", "Japan", "Colombia"]);
        assert!(map["Rice"].is_empty());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn builtin_roster_covers_every_crop() {
        let roster = builtin_roster();
        assert_eq!(roster.len(), 10);
        assert_eq!(roster.names[0], "Corn");
        for crop in &roster.names {
            assert_eq!(roster.countries_for(crop).len(), 5, "{}", crop);
        }
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let crops = dir.path().join("crops.txt");
        let countries = dir.path().join("countries.txt");
        std::fs::write(&crops, "Corn\nWheat\n").unwrap();
        std::fs::write(&countries, "Wheat: Philippines, Mexico\n").unwrap();

        let roster = FileRosterSource::new(&crops, Some(countries)).load().unwrap();
        assert_eq!(roster.names, vec!["Corn", "Wheat"]);
        assert!(roster.countries_for("Corn").is_empty());
        assert_eq!(roster.countries_for("Wheat"), vec!["Philippines", "Mexico"]);
    }

    #[test]
    fn missing_countries_file_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let crops = dir.path().join("crops.txt");
        std::fs::write(&crops, "Corn\n").unwrap();

        let roster = FileRosterSource::new(&crops, Some(dir.path().join("nope.txt")))
            .load()
            .unwrap();
        assert_eq!(roster.len(), 1);
        assert!(roster.countries.is_empty());
    }

    #[test]
    fn missing_crops_file_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileRosterSource::new(dir.path().join("crops.txt"), None).load();
        assert!(matches!(result, Err(CropCastError::InvalidInput(_))));
    }

    #[test]
    fn duplicate_crop_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let crops = dir.path().join("crops.txt");
        std::fs::write(&crops, "Corn\nWheat\n Corn \n").unwrap();
        assert!(matches!(
            FileRosterSource::new(&crops, None).load(),
            Err(CropCastError::InvalidInput(msg)) if msg.contains("'Corn'")
        ));
    }

    #[test]
    fn empty_crops_file_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let crops = dir.path().join("crops.txt");
        std::fs::write(&crops, "\n\n").unwrap();
        assert!(FileRosterSource::new(&crops, None).load().is_err());
    }
}
