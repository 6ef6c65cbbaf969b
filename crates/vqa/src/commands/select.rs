use super::{load_store, require_root, AppError};
use std::path::PathBuf;
use vqa_core::{RankCriterion, Settings};
use vqa_select::{ImagePairCandidate, PairNaming, PairSelector};

fn format_pair(pair: &ImagePairCandidate, criterion: RankCriterion) -> String {
    let mut out = format!("Best pair by {} (key {})\n", criterion, pair.rank_key(criterion));
    for (path, record) in [
        (&pair.path_a, &pair.annotation_a),
        (&pair.path_b, &pair.annotation_b),
    ] {
        let types: Vec<&str> = record.object_types.iter().map(String::as_str).collect();
        out.push_str(&format!(
            "  {} | count:{} types:{} quality:{}\n",
            path.display(),
            record.object_count,
            types.join(","),
            record
                .quality
                .map(|q| q.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    out
}

pub fn run(
    annotations: Option<PathBuf>,
    root: Option<PathBuf>,
    criterion: RankCriterion,
    json: bool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let store = load_store(annotations, settings)?;
    let root = require_root(root, settings)?;
    let selector = PairSelector::new(PairNaming::from_settings(&settings.dataset));

    let pair = selector
        .select(&root, &store, criterion)?
        .ok_or(AppError::NoEligiblePair)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pair)?);
    } else {
        print!("{}", format_pair(&pair, criterion));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqa_annotations::AnnotationStore;

    fn candidate() -> ImagePairCandidate {
        let store = AnnotationStore::from_json_str(
            r#"[
                {"img1": "00000004.jpg", "Object_count": 5, "Object_type": {"choices": ["Vehicles", "Pedestrians"]}, "Quality": "Good (4/5)"},
                {"img1": "00000004 2.jpg", "Object_type": ["Vehicles"]}
            ]"#,
        )
        .unwrap();
        ImagePairCandidate {
            path_a: PathBuf::from("train630/4/00000004.jpg"),
            path_b: PathBuf::from("train630/4/00000004 2.jpg"),
            annotation_a: store.get("00000004").unwrap().clone(),
            annotation_b: store.get("00000004 2").unwrap().clone(),
        }
    }

    #[test]
    fn test_format_pair() {
        let text = format_pair(&candidate(), RankCriterion::ObjectCount);
        assert!(text.starts_with("Best pair by Object_count (key 5)"));
        assert!(text.contains("00000004.jpg | count:5 types:Vehicles,Pedestrians quality:Good"));
        assert!(text.contains("00000004 2.jpg | count:未知 types:Vehicles quality:-"));
    }

    #[test]
    fn test_missing_root_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let annotations = temp.path().join("a.json");
        std::fs::write(&annotations, "[]").unwrap();

        let err = run(
            Some(annotations),
            None,
            RankCriterion::Quality,
            false,
            &Settings::default(),
        )
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::MissingInput(_))));
    }
}
