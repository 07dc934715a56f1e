use super::model::SuitabilityModel;
use crate::error::{CropCastError, Result};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Persistence for the trained artifact. The on-disk format is private to the
/// implementation.
pub trait ModelStore {
    fn load(&self) -> Result<SuitabilityModel>;
    fn save(&self, model: &SuitabilityModel) -> Result<()>;
}

/// JSON artifact on the local filesystem.
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Sibling file the artifact is written to before it replaces `path`.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "model".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_to(path: &Path, model: &SuitabilityModel) -> Result<()> {
        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer(&mut writer, model)?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| e.into_error())?
            .sync_all()?;
        Ok(())
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<SuitabilityModel> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            CropCastError::ModelUnavailable(format!(
                "cannot open {}: {}. Run `cropcast train` first",
                self.path.display(),
                e
            ))
        })?;

        let model: SuitabilityModel =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                CropCastError::ModelUnavailable(format!(
                    "corrupt model artifact {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        model.validate().map_err(|e| {
            CropCastError::ModelUnavailable(format!(
                "invalid model artifact {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::info!(
            crops = model.crops().len(),
            trained_at = %model.trained_at,
            "Loaded model from {}",
            self.path.display()
        );
        Ok(model)
    }

    fn save(&self, model: &SuitabilityModel) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Replace the previous artifact only once the new one is fully on disk
        let tmp = self.temp_path();
        if let Err(e) = Self::write_to(&tmp, model) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        std::fs::rename(&tmp, &self.path)?;
        tracing::info!("Saved model to {}", self.path.display());
        Ok(())
    }
}
