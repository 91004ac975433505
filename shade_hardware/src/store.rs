use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shade_traits::StateStore;

use crate::error::{HwError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    current_position: u8,
}

/// Persists the settled position as a small JSON document.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<Option<u8>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        let snap: Snapshot = serde_json::from_str(&text)?;
        if snap.current_position > 100 {
            return Err(HwError::State(format!(
                "stored position {} out of range",
                snap.current_position
            )));
        }
        Ok(Some(snap.current_position))
    }

    fn write(&self, position: u8) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let body = serde_json::to_string(&Snapshot {
            current_position: position,
        })?;
        // Write-then-rename so a crash never leaves a truncated file behind.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(position, path = ?self.path, "state saved");
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> std::result::Result<Option<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read()?)
    }

    fn save(&mut self, position: u8) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.write(position)?)
    }
}
