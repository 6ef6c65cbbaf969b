use crate::raw::RawEntry;
use serde::Serialize;
use std::path::Path;
use vqa_core::{ObjectCount, Quality};

/// Object category that makes an image eligible for vehicle questions
pub const VEHICLES: &str = "Vehicles";

/// Normalized annotation for one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    pub image_id: String,
    pub object_count: ObjectCount,
    /// Corpus order, without repeats
    pub object_types: Vec<String>,
    pub collaborator: Option<String>,
    pub perception_issues: Vec<String>,
    pub quality: Option<Quality>,
}

impl AnnotationRecord {
    pub(crate) fn from_raw(entry: &RawEntry) -> Option<Self> {
        let image_id = image_key(entry.image_reference()?)?;
        Some(Self {
            image_id,
            object_count: entry
                .object_count
                .as_ref()
                .map(ObjectCount::from_json)
                .unwrap_or_default(),
            object_types: entry.object_types(),
            collaborator: RawEntry::string_field(&entry.collaboration_who),
            perception_issues: entry.perception_issues(),
            quality: RawEntry::string_field(&entry.quality)
                .as_deref()
                .and_then(Quality::from_label),
        })
    }

    pub fn has_vehicles(&self) -> bool {
        self.object_types.iter().any(|t| t == VEHICLES)
    }

    pub fn quality_rank(&self) -> u8 {
        Quality::rank_of(self.quality)
    }
}

/// Derive the lookup key from a stored image reference.
///
/// Storage prefixes such as `/data/upload/2/` disappear with the directory
/// part; the key is the file name cut at its first `.`, so
/// `/data/upload/2/00000001 2.jpg` becomes `00000001 2`.
pub fn image_key(reference: &str) -> Option<String> {
    let name = reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference);
    let stem = name.split('.').next().unwrap_or(name);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Key for an image file on disk, derived the same way as [`image_key`]
pub fn image_key_for_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    image_key(&name)
}
