use crate::raw::RawEntry;
use crate::record::{image_key_for_path, AnnotationRecord};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Failure to load an annotation corpus as a whole
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("cannot read annotation corpus {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse annotation corpus {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// In-memory annotation records keyed by image key
#[derive(Debug, Default, Clone)]
pub struct AnnotationStore {
    records: Vec<AnnotationRecord>,
    by_key: HashMap<String, usize>,
}

impl AnnotationStore {
    /// Load a JSON array of annotation entries from disk
    pub fn load(path: &Path) -> Result<Self, AnnotationError> {
        let contents = std::fs::read_to_string(path).map_err(|source| AnnotationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::parse(&contents, path)?;
        tracing::info!(path = %path.display(), records = store.len(), "Loaded annotations");
        Ok(store)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, AnnotationError> {
        Self::parse(contents, Path::new("<inline>"))
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, AnnotationError> {
        let entries: Vec<Value> =
            serde_json::from_str(contents).map_err(|source| AnnotationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_entries(entries))
    }

    /// Build from already-parsed entries; bad entries are skipped, bad fields default
    pub fn from_entries(entries: Vec<Value>) -> Self {
        let mut store = Self::default();
        for (index, value) in entries.into_iter().enumerate() {
            let entry: RawEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(
                        index,
                        error = %e,
                        "Skipping annotation entry that is not an object"
                    );
                    continue;
                }
            };
            let Some(record) = AnnotationRecord::from_raw(&entry) else {
                tracing::warn!(index, "Skipping annotation entry without an image reference");
                continue;
            };
            store.insert(record);
        }
        store
    }

    fn insert(&mut self, record: AnnotationRecord) {
        if self.by_key.contains_key(&record.image_id) {
            tracing::debug!(key = %record.image_id, "Duplicate annotation key, keeping first");
            return;
        }
        self.by_key.insert(record.image_id.clone(), self.records.len());
        self.records.push(record);
    }

    /// Find the annotation for an image file by its base name without extension
    pub fn lookup(&self, image_path: &Path) -> Option<&AnnotationRecord> {
        let key = image_key_for_path(image_path)?;
        tracing::debug!(key = %key, "Looking up annotation");
        let found = self.get(&key);
        if found.is_none() {
            tracing::warn!(image = %image_path.display(), "No annotation found");
        }
        found
    }

    pub fn get(&self, key: &str) -> Option<&AnnotationRecord> {
        self.by_key.get(key).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in corpus order
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.records.iter()
    }
}
