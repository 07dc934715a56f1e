use crate::error::Result;
use crate::models::{TrainingSample, WeatherObservation};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Flat CSV row of the training corpus.
#[derive(Debug, Serialize, Deserialize)]
struct DatasetRecord {
    crop_type: String,
    month: u32,
    temperature_celsius: f64,
    humidity_percent: f64,
    pressure_hpa: f64,
    rainfall_mm: Option<f64>,
    wind_speed_mps: f64,
    quantity_normalized: f64,
}

impl From<&TrainingSample> for DatasetRecord {
    fn from(sample: &TrainingSample) -> Self {
        let o = &sample.observation;
        Self {
            crop_type: sample.crop.clone(),
            month: o.month,
            temperature_celsius: o.temperature_c,
            humidity_percent: o.humidity_percent,
            pressure_hpa: o.pressure_hpa,
            rainfall_mm: o.rainfall_mm,
            wind_speed_mps: o.wind_speed_mps,
            quantity_normalized: sample.label,
        }
    }
}

impl From<DatasetRecord> for TrainingSample {
    fn from(r: DatasetRecord) -> Self {
        TrainingSample::new(
            r.crop_type,
            WeatherObservation {
                temperature_c: r.temperature_celsius,
                humidity_percent: r.humidity_percent,
                pressure_hpa: r.pressure_hpa,
                rainfall_mm: r.rainfall_mm,
                wind_speed_mps: r.wind_speed_mps,
                month: r.month,
            },
            r.quantity_normalized,
        )
    }
}

pub fn write_samples<W: Write>(writer: W, samples: &[TrainingSample]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for sample in samples {
        wtr.serialize(DatasetRecord::from(sample))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_samples<R: Read>(reader: R) -> Result<Vec<TrainingSample>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut samples = Vec::new();
    for record in rdr.deserialize::<DatasetRecord>() {
        samples.push(record?.into());
    }
    Ok(samples)
}

pub fn save(path: &Path, samples: &[TrainingSample]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_samples(std::io::BufWriter::new(file), samples)?;
    tracing::info!("Saved {} samples to {}", samples.len(), path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<TrainingSample>> {
    let file = std::fs::File::open(path)?;
    let samples = read_samples(std::io::BufReader::new(file))?;
    tracing::info!("Loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
crop_type,month,temperature_celsius,humidity_percent,pressure_hpa,rainfall_mm,wind_speed_mps,quantity_normalized
Corn,7,27.1,71.4,1011.9,62.3,2.4,0.7123
Wheat,1,1.5,58.0,1015.2,,4.0,0.0
";

    #[test]
    fn reads_corpus_column_layout() {
        let samples = read_samples(CSV.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].crop, "Corn");
        assert_eq!(samples[0].observation.month, 7);
        assert_eq!(samples[0].observation.rainfall_mm, Some(62.3));
        assert_eq!(samples[0].label, 0.7123);
        assert_eq!(samples[1].observation.rainfall_mm, None);
    }

    #[test]
    fn writes_header_and_rows() {
        let samples = read_samples(CSV.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_samples(&mut out, &samples).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("crop_type,month,temperature_celsius"));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Wheat,1,1.5,58.0,1015.2,,4.0,0.0"));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dataset.csv");
        let samples = read_samples(CSV.as_bytes()).unwrap();
        save(&path, &samples).unwrap();
        assert_eq!(load(&path).unwrap(), samples);
    }

    #[test]
    fn malformed_row_is_an_error() {
        let bad = "crop_type,month,temperature_celsius,humidity_percent,pressure_hpa,rainfall_mm,wind_speed_mps,quantity_normalized\nCorn,July,1,2,3,4,5,6\n";
        assert!(read_samples(bad.as_bytes()).is_err());
    }
}
