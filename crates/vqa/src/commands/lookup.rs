use super::load_store;
use std::path::PathBuf;
use vqa_annotations::AnnotationStore;
use vqa_core::Settings;

fn describe(store: &AnnotationStore, image: &std::path::Path) -> anyhow::Result<String> {
    let body = match store.lookup(image) {
        Some(record) => serde_json::to_string_pretty(record)?,
        None => "not found".to_string(),
    };
    Ok(format!("{}: {}", image.display(), body))
}

pub fn run(
    annotations: Option<PathBuf>,
    images: &[PathBuf],
    settings: &Settings,
) -> anyhow::Result<()> {
    let store = load_store(annotations, settings)?;
    tracing::debug!(records = store.len(), "Loaded annotations");
    for image in images {
        println!("{}", describe(&store, image)?);
    }
    Ok(())
}
