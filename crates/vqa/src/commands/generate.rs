use super::{require_root, resolve_path, AppError};
use std::path::{Path, PathBuf};
use vqa_annotations::{AnnotationRecord, AnnotationStore};
use vqa_core::{RankCriterion, Settings};
use vqa_generate::{
    DashScopeBackend, Delay, GenerateError, Generation, GeneratorConfig, InferenceBackend,
    MimePolicy, PromptTemplate, QuestionGenerator,
};
use vqa_history::{append_jsonl, GenerationRecord, Outcome, Paths};
use vqa_select::{PairNaming, PairSelector};

pub struct GenerateOptions {
    pub image1: Option<PathBuf>,
    pub image2: Option<PathBuf>,
    pub annotations: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub criterion: RankCriterion,
    pub legacy_mime: bool,
    pub record_history: bool,
    pub history_file: Option<PathBuf>,
}

/// The pair that will be sent, and how it was chosen
#[derive(Debug)]
pub struct ResolvedPair {
    pub path_a: PathBuf,
    pub path_b: PathBuf,
    pub annotation_a: Option<AnnotationRecord>,
    pub annotation_b: Option<AnnotationRecord>,
    pub selected_by: Option<RankCriterion>,
}

impl ResolvedPair {
    fn template(&self) -> PromptTemplate {
        PromptTemplate::for_annotations(self.annotation_a.as_ref(), self.annotation_b.as_ref())
    }
}

/// Decide which images to use.
///
/// With an annotation file, an explicit pair is used when both images have
/// records; otherwise the best pair under the dataset root is selected.
/// Without one, both images must be given and the unannotated prompt is used.
pub fn resolve_pair(
    options: &GenerateOptions,
    settings: &Settings,
) -> anyhow::Result<ResolvedPair> {
    let explicit = match (&options.image1, &options.image2) {
        (Some(a), Some(b)) => Some((a.clone(), b.clone())),
        _ => None,
    };

    let Some(annotations) = resolve_path(options.annotations.clone(), &settings.dataset.annotations)
    else {
        let (path_a, path_b) = explicit.ok_or(AppError::MissingInput(
            "two images (--image1, --image2) or an annotation file (--annotations)",
        ))?;
        return Ok(ResolvedPair {
            path_a,
            path_b,
            annotation_a: None,
            annotation_b: None,
            selected_by: None,
        });
    };

    let store = AnnotationStore::load(&annotations)?;

    if let Some((path_a, path_b)) = explicit {
        match (store.lookup(&path_a), store.lookup(&path_b)) {
            (Some(a), Some(b)) => {
                if !(a.has_vehicles() && b.has_vehicles()) {
                    return Err(AppError::NoVehicles.into());
                }
                return Ok(ResolvedPair {
                    annotation_a: Some(a.clone()),
                    annotation_b: Some(b.clone()),
                    path_a,
                    path_b,
                    selected_by: None,
                });
            }
            _ => tracing::info!("Chosen images lack annotations, selecting a pair automatically"),
        }
    }

    let root = require_root(options.root.clone(), settings)?;
    let selector = PairSelector::new(PairNaming::from_settings(&settings.dataset));
    let best = selector
        .select(&root, &store, options.criterion)?
        .ok_or(AppError::NoEligiblePair)?;

    Ok(ResolvedPair {
        path_a: best.path_a,
        path_b: best.path_b,
        annotation_a: Some(best.annotation_a),
        annotation_b: Some(best.annotation_b),
        selected_by: Some(options.criterion),
    })
}

pub fn execute<B: InferenceBackend, D: Delay>(
    generator: &QuestionGenerator<B, D>,
    pair: &ResolvedPair,
) -> Result<Generation, GenerateError> {
    generator.generate_from_paths(
        &pair.path_a,
        &pair.path_b,
        pair.annotation_a.as_ref(),
        pair.annotation_b.as_ref(),
    )
}

fn history_record(
    pair: &ResolvedPair,
    model: &str,
    result: &Result<Generation, GenerateError>,
) -> GenerationRecord {
    let outcome = match result {
        Ok(generation) => Outcome::Success {
            attempts: generation.attempts,
            text: generation.text.clone(),
        },
        Err(e) => Outcome::Failure {
            kind: e.kind().to_string(),
            message: e.to_string(),
        },
    };
    GenerationRecord::new(
        pair.path_a.display().to_string(),
        pair.path_b.display().to_string(),
        model,
        pair.template().to_string(),
        pair.selected_by.map(|c| c.to_string()),
        outcome,
    )
}

fn record(path: &Path, record: &GenerationRecord) {
    if let Err(e) = append_jsonl(path, record) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to write history");
    }
}

pub fn run(options: &GenerateOptions, settings: &Settings) -> anyhow::Result<()> {
    let pair = resolve_pair(options, settings)?;
    tracing::info!(
        image_a = %pair.path_a.display(),
        image_b = %pair.path_b.display(),
        template = %pair.template(),
        "Processing images"
    );

    let backend = DashScopeBackend::from_settings(&settings.api)?;
    let mut config = GeneratorConfig::from_settings(settings);
    if options.legacy_mime {
        config.mime_policy = MimePolicy::LegacyJpeg;
    }
    let generator = QuestionGenerator::new(backend, config);
    let result = execute(&generator, &pair);

    if options.record_history {
        let path = match &options.history_file {
            Some(path) => Some(path.clone()),
            None => Paths::new().ok().map(|p| p.history_file()),
        };
        if let Some(path) = path {
            record(&path, &history_record(&pair, &settings.api.model, &result));
        }
    }

    let generation = result?;
    println!("{}", generation.text);
    Ok(())
}
