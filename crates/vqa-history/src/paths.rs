//! Path resolution for history files

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve `<data_dir>/vqa-gen` for the current user
    pub fn new() -> std::io::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "data directory not found")
        })?;
        Ok(Self::with_root(base.join("vqa-gen")))
    }

    pub fn with_root(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("history.jsonl")
    }
}
