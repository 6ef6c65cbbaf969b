//! History record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success { attempts: u32, text: String },
    Failure { kind: String, message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// One `generate` invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub image_a: String,
    pub image_b: String,
    pub model: String,
    pub template: String,
    /// Set when the pair came from the selector rather than the operator
    #[serde(default)]
    pub criterion: Option<String>,
    pub outcome: Outcome,
}

impl GenerationRecord {
    pub fn new(
        image_a: impl Into<String>,
        image_b: impl Into<String>,
        model: impl Into<String>,
        template: impl Into<String>,
        criterion: Option<String>,
        outcome: Outcome,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("gen_{}", timestamp.timestamp_millis()),
            timestamp,
            image_a: image_a.into(),
            image_b: image_b.into(),
            model: model.into(),
            template: template.into(),
            criterion,
            outcome,
        }
    }
}
