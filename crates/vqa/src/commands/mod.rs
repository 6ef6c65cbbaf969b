pub mod generate;
pub mod history;
pub mod lookup;
pub mod select;
pub mod version;

use std::path::PathBuf;
use vqa_annotations::AnnotationStore;
use vqa_core::Settings;

/// Operator-facing failures that are not errors of a library crate
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no eligible image pair found (both images must be annotated with Vehicles)")]
    NoEligiblePair,

    #[error("the selected images do not both contain vehicles")]
    NoVehicles,

    #[error("missing input: {0}")]
    MissingInput(&'static str),
}

/// Flag value, else the configured default
fn resolve_path(flag: Option<PathBuf>, configured: &Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| configured.clone())
}

fn load_store(flag: Option<PathBuf>, settings: &Settings) -> anyhow::Result<AnnotationStore> {
    let path = resolve_path(flag, &settings.dataset.annotations)
        .ok_or(AppError::MissingInput("an annotation file (--annotations)"))?;
    Ok(AnnotationStore::load(&path)?)
}

fn require_root(flag: Option<PathBuf>, settings: &Settings) -> Result<PathBuf, AppError> {
    resolve_path(flag, &settings.dataset.root)
        .ok_or(AppError::MissingInput("a dataset root (--root) for automatic selection"))
}
