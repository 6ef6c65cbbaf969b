//! Raw annotation entries as exported by the labeling tool

use serde::Deserialize;
use serde_json::Value;

/// `Object_type` comes either as a bare list or wrapped in `{"choices": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ObjectTypeField {
    BareList(Vec<String>),
    ChoiceWrapper { choices: Vec<String> },
}

impl ObjectTypeField {
    /// Resolve either shape from a raw value; anything else yields `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Labels in corpus order with repeats dropped
    pub fn into_labels(self) -> Vec<String> {
        let labels = match self {
            ObjectTypeField::BareList(labels) => labels,
            ObjectTypeField::ChoiceWrapper { choices } => choices,
        };
        let mut unique: Vec<String> = Vec::with_capacity(labels.len());
        for label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        unique
    }
}

/// One exported entry. Every field is kept loose so a single bad field
/// degrades to a default instead of rejecting the corpus.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawEntry {
    #[serde(default)]
    pub img1: Option<Value>,
    #[serde(rename = "Object_count", default)]
    pub object_count: Option<Value>,
    #[serde(rename = "Object_type", default)]
    pub object_type: Option<Value>,
    #[serde(rename = "Collaboration_who", default)]
    pub collaboration_who: Option<Value>,
    #[serde(rename = "PerceptionIssues", default)]
    pub perception_issues: Option<Value>,
    #[serde(rename = "Quality", default)]
    pub quality: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct IssueRegion {
    #[serde(default)]
    rectanglelabels: Vec<String>,
}

impl RawEntry {
    pub fn image_reference(&self) -> Option<&str> {
        self.img1.as_ref().and_then(Value::as_str)
    }

    pub fn object_types(&self) -> Vec<String> {
        self.object_type
            .as_ref()
            .and_then(ObjectTypeField::from_value)
            .map(ObjectTypeField::into_labels)
            .unwrap_or_default()
    }

    /// First rectangle label of each issue region, in order
    pub fn perception_issues(&self) -> Vec<String> {
        let Some(Value::Array(items)) = &self.perception_issues else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value::<IssueRegion>(item.clone()).ok())
            .filter_map(|region| region.rectanglelabels.into_iter().next())
            .collect()
    }

    pub fn string_field(value: &Option<Value>) -> Option<String> {
        value
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }
}
