//! Candidate enumeration, vehicle filter and ranking

use crate::naming::{is_numbered_folder, PairNaming};
use serde::Serialize;
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use vqa_annotations::{AnnotationRecord, AnnotationStore};
use vqa_core::RankCriterion;

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("cannot read dataset root {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An eligible pair: both images exist and both annotations list vehicles
#[derive(Debug, Clone, Serialize)]
pub struct ImagePairCandidate {
    pub path_a: PathBuf,
    pub path_b: PathBuf,
    pub annotation_a: AnnotationRecord,
    pub annotation_b: AnnotationRecord,
}

impl ImagePairCandidate {
    /// Sort key under a criterion; higher ranks first
    pub fn rank_key(&self, criterion: RankCriterion) -> u64 {
        match criterion {
            RankCriterion::Quality => u64::from(self.annotation_a.quality_rank()),
            RankCriterion::ObjectCount => {
                let a = self.annotation_a.object_count.value_or_zero();
                a.saturating_add(self.annotation_b.object_count.value_or_zero())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PairSelector {
    naming: PairNaming,
}

impl PairSelector {
    pub fn new(naming: PairNaming) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &PairNaming {
        &self.naming
    }

    /// Pick the highest-ranked eligible pair under `root`.
    ///
    /// `Ok(None)` means the tree holds no pair where both images are
    /// annotated with vehicles.
    pub fn select(
        &self,
        root: &Path,
        store: &AnnotationStore,
        criterion: RankCriterion,
    ) -> Result<Option<ImagePairCandidate>, SelectError> {
        let mut candidates = self.candidates(root, store)?;
        if candidates.is_empty() {
            tracing::error!(root = %root.display(), "No eligible image pair found");
            return Ok(None);
        }
        rank(&mut candidates, criterion);
        let best = candidates.into_iter().next();
        if let Some(ref pair) = best {
            tracing::info!(
                image_a = %pair.path_a.display(),
                image_b = %pair.path_b.display(),
                %criterion,
                key = pair.rank_key(criterion),
                "Selected image pair"
            );
        }
        Ok(best)
    }

    /// All eligible pairs in enumeration order (folders and files by name)
    pub fn candidates(
        &self,
        root: &Path,
        store: &AnnotationStore,
    ) -> Result<Vec<ImagePairCandidate>, SelectError> {
        let mut candidates = Vec::new();
        for folder in numbered_folders(root)? {
            for primary in self.primary_images(&folder) {
                let Some(partner) = self.naming.partner_path(&primary) else {
                    continue;
                };
                if !partner.is_file() {
                    continue;
                }
                if let Some(candidate) = eligible_pair(primary, partner, store) {
                    candidates.push(candidate);
                }
            }
        }
        tracing::debug!(root = %root.display(), count = candidates.len(), "Enumerated candidates");
        Ok(candidates)
    }

    fn primary_images(&self, folder: &Path) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    folder = %folder.display(),
                    error = %e,
                    "Skipping unreadable folder"
                );
                return Vec::new();
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| self.naming.is_image(name) && !self.naming.is_partner(name))
            .collect();
        names.sort();
        names.into_iter().map(|name| folder.join(name)).collect()
    }
}

/// Stable descending sort; ties keep enumeration order
pub fn rank(candidates: &mut [ImagePairCandidate], criterion: RankCriterion) {
    candidates.sort_by_key(|c| Reverse(c.rank_key(criterion)));
}

fn numbered_folders(root: &Path) -> Result<Vec<PathBuf>, SelectError> {
    let entries = std::fs::read_dir(root).map_err(|source| SelectError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    let mut folders: Vec<(String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            is_numbered_folder(&name).then(|| (name, entry.path()))
        })
        .collect();
    folders.sort();
    Ok(folders.into_iter().map(|(_, path)| path).collect())
}

fn eligible_pair(
    path_a: PathBuf,
    path_b: PathBuf,
    store: &AnnotationStore,
) -> Option<ImagePairCandidate> {
    let annotation_a = store.lookup(&path_a)?;
    let annotation_b = store.lookup(&path_b)?;
    if !(annotation_a.has_vehicles() && annotation_b.has_vehicles()) {
        return None;
    }
    Some(ImagePairCandidate {
        annotation_a: annotation_a.clone(),
        annotation_b: annotation_b.clone(),
        path_a,
        path_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn touch(root: &Path, folder: &str, file: &str) {
        let dir = root.join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), b"jpg").unwrap();
    }

    fn pair(root: &Path, folder: &str, stem: &str) {
        touch(root, folder, &format!("{stem}.jpg"));
        touch(root, folder, &format!("{stem} 2.jpg"));
    }

    fn entry(stem: &str, count: u64, types: &[&str], quality: &str) -> serde_json::Value {
        json!({
            "img1": format!("/data/upload/2/{stem}.jpg"),
            "Object_count": count,
            "Object_type": {"choices": types},
            "Quality": quality,
        })
    }

    fn store(entries: Vec<serde_json::Value>) -> AnnotationStore {
        AnnotationStore::from_entries(entries)
    }

    #[test]
    fn test_skips_non_numeric_folders_and_missing_partners() {
        let temp = TempDir::new().unwrap();
        pair(temp.path(), "1", "a");
        pair(temp.path(), "extras", "b");
        touch(temp.path(), "2", "c.jpg");

        let s = store(vec![
            entry("a", 1, &["Vehicles"], "Good"),
            entry("a 2", 1, &["Vehicles"], "Good"),
            entry("b", 1, &["Vehicles"], "Good"),
            entry("b 2", 1, &["Vehicles"], "Good"),
            entry("c", 1, &["Vehicles"], "Good"),
        ]);
        let candidates = PairSelector::default().candidates(temp.path(), &s).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].path_a.ends_with("1/a.jpg"));
        assert!(candidates[0].path_b.ends_with("1/a 2.jpg"));
    }

    #[test]
    fn test_vehicle_filter_requires_both_sides() {
        let temp = TempDir::new().unwrap();
        pair(temp.path(), "1", "a");
        pair(temp.path(), "2", "b");
        pair(temp.path(), "3", "c");

        let s = store(vec![
            entry("a", 3, &["Vehicles"], "Good"),
            entry("a 2", 3, &["Pedestrians"], "Good"),
            entry("b", 3, &["Vehicles"], "Good"),
            // "b 2" has no annotation
            entry("c", 3, &["Vehicles", "Buildings"], "Fair"),
            entry("c 2", 3, &["Vehicles"], "Fair"),
        ]);
        let best = PairSelector::default()
            .select(temp.path(), &s, RankCriterion::Quality)
            .unwrap()
            .unwrap();
        assert!(best.path_a.ends_with("3/c.jpg"));
        assert!(best.annotation_a.has_vehicles() && best.annotation_b.has_vehicles());
    }

    #[test]
    fn test_no_eligible_pair_is_none() {
        let temp = TempDir::new().unwrap();
        pair(temp.path(), "1", "a");
        let s = store(vec![entry("a", 1, &["Buildings"], "Good")]);
        let result = PairSelector::default()
            .select(temp.path(), &s, RankCriterion::ObjectCount)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_quality_ranking_order() {
        let temp = TempDir::new().unwrap();
        let labels = ["Poor (2/5)", "Unrated", "Excellent (5/5)", "Fair (3/5)", "Good (4/5)"];
        let mut entries = Vec::new();
        for (i, label) in labels.iter().enumerate() {
            let stem = format!("img{i}");
            pair(temp.path(), &format!("{}", i + 1), &stem);
            entries.push(entry(&stem, 1, &["Vehicles"], label));
            entries.push(entry(&format!("{stem} 2"), 1, &["Vehicles"], label));
        }
        let s = store(entries);
        let selector = PairSelector::default();
        let mut candidates = selector.candidates(temp.path(), &s).unwrap();
        rank(&mut candidates, RankCriterion::Quality);

        let keys: Vec<u64> = candidates
            .iter()
            .map(|c| c.rank_key(RankCriterion::Quality))
            .collect();
        assert_eq!(keys, vec![4, 3, 2, 1, 0]);
        assert!(candidates[0].path_a.ends_with("3/img2.jpg"));
    }

    #[test]
    fn test_quality_uses_primary_image_only() {
        let temp = TempDir::new().unwrap();
        pair(temp.path(), "1", "a");
        pair(temp.path(), "2", "b");
        let s = store(vec![
            entry("a", 1, &["Vehicles"], "Fair"),
            entry("a 2", 1, &["Vehicles"], "Excellent"),
            entry("b", 1, &["Vehicles"], "Good"),
            entry("b 2", 1, &["Vehicles"], "Poor"),
        ]);
        let best = PairSelector::default()
            .select(temp.path(), &s, RankCriterion::Quality)
            .unwrap()
            .unwrap();
        assert!(best.path_a.ends_with("2/b.jpg"));
    }

    #[test]
    fn test_object_count_ranking_sums_both_sides() {
        let temp = TempDir::new().unwrap();
        pair(temp.path(), "1", "small");
        pair(temp.path(), "2", "large");
        let s = store(vec![
            entry("small", 2, &["Vehicles"], "Excellent"),
            entry("small 2", 2, &["Vehicles"], "Excellent"),
            entry("large", 3, &["Vehicles"], "Poor"),
            entry("large 2", 7, &["Vehicles"], "Poor"),
        ]);
        let best = PairSelector::default()
            .select(temp.path(), &s, RankCriterion::ObjectCount)
            .unwrap()
            .unwrap();
        assert_eq!(best.rank_key(RankCriterion::ObjectCount), 10);
        assert!(best.path_a.ends_with("2/large.jpg"));
    }

    #[test]
    fn test_unknown_count_ranks_as_zero() {
        let temp = TempDir::new().unwrap();
        pair(temp.path(), "1", "a");
        let s = store(vec![
            json!({"img1": "a.jpg", "Object_count": "n/a", "Object_type": ["Vehicles"]}),
            entry("a 2", 4, &["Vehicles"], "Good"),
        ]);
        let best = PairSelector::default()
            .select(temp.path(), &s, RankCriterion::ObjectCount)
            .unwrap()
            .unwrap();
        assert_eq!(best.rank_key(RankCriterion::ObjectCount), 4);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let temp = TempDir::new().unwrap();
        pair(temp.path(), "1", "a");
        pair(temp.path(), "2", "b");
        let s = store(vec![
            json!({"img1": "a.jpg", "Object_count": u64::MAX, "Object_type": ["Vehicles"]}),
            entry("a 2", 1, &["Vehicles"], "Good"),
            entry("b", 50, &["Vehicles"], "Good"),
            entry("b 2", 50, &["Vehicles"], "Good"),
        ]);
        let best = PairSelector::default()
            .select(temp.path(), &s, RankCriterion::ObjectCount)
            .unwrap()
            .unwrap();
        assert!(best.path_a.ends_with("1/a.jpg"));
        assert_eq!(best.rank_key(RankCriterion::ObjectCount), u64::MAX);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let temp = TempDir::new().unwrap();
        pair(temp.path(), "10", "z");
        pair(temp.path(), "02", "y");
        let s = store(vec![
            entry("z", 1, &["Vehicles"], "Good"),
            entry("z 2", 1, &["Vehicles"], "Good"),
            entry("y", 1, &["Vehicles"], "Good"),
            entry("y 2", 1, &["Vehicles"], "Good"),
        ]);
        let best = PairSelector::default()
            .select(temp.path(), &s, RankCriterion::Quality)
            .unwrap()
            .unwrap();
        assert!(best.path_a.ends_with("02/y.jpg"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let s = AnnotationStore::default();
        let err = PairSelector::default()
            .select(Path::new("/nonexistent/train630"), &s, RankCriterion::Quality)
            .unwrap_err();
        assert!(matches!(err, SelectError::Io { .. }));
    }
}
