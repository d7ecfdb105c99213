//! Model Store
//!
//! The persisted model is the only shared mutable state in the service.
//! `FileModelStore` serializes writers with a mutex and replaces the file by
//! renaming a fully written temp file over it, so readers never see a
//! partial model. The stored envelope carries a SHA-256 of the model payload
//! which is verified on every load.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::artifact::ModelArtifact;
use super::error::{DetectorError, DetectorResult};

/// On-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Load/save access to the persisted model
pub trait ModelStore: Send + Sync {
    fn exists(&self) -> bool;
    fn load(&self) -> DetectorResult<ModelArtifact>;
    fn save(&self, artifact: &ModelArtifact) -> DetectorResult<()>;
    /// Human readable location, for logs
    fn location(&self) -> String;
}

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    format_version: u32,
    checksum: String,
    model: &'a RawValue,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    format_version: u32,
    checksum: String,
    model: Box<RawValue>,
}

fn checksum(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Single JSON file at a fixed path
pub struct FileModelStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        self.path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
    }
}

impl ModelStore for FileModelStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> DetectorResult<ModelArtifact> {
        let data = fs::read(&self.path).map_err(|e| DetectorError::io(&self.path, e))?;
        let envelope: EnvelopeIn = serde_json::from_slice(&data)?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(DetectorError::UnsupportedFormat {
                found: envelope.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let actual = checksum(envelope.model.get());
        if actual != envelope.checksum {
            return Err(DetectorError::ChecksumMismatch {
                expected: envelope.checksum,
                actual,
            });
        }

        let artifact: ModelArtifact = serde_json::from_str(envelope.model.get())?;
        tracing::debug!("Loaded model {} from {}", artifact.model_id, self.path.display());
        Ok(artifact)
    }

    fn save(&self, artifact: &ModelArtifact) -> DetectorResult<()> {
        let payload = RawValue::from_string(serde_json::to_string(artifact)?)?;
        let envelope = EnvelopeOut {
            format_version: FORMAT_VERSION,
            checksum: checksum(payload.get()),
            model: &*payload,
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        let _guard = self.write_lock.lock();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DetectorError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(DetectorError::io(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(DetectorError::io(&self.path, e));
        }

        tracing::info!("Saved model {} to {}", artifact.model_id, self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
