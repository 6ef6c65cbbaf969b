//! Core types shared by the annotation store, selector and generator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal image quality scale used by the annotation tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Quality {
    /// Parse a quality label such as `"Good (4/5)"` or `"Good"`.
    ///
    /// Only the leading word is significant and matching is case-sensitive,
    /// so `"good"` is unrecognized.
    pub fn from_label(label: &str) -> Option<Self> {
        let word = label
            .trim()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");
        match word {
            "Excellent" => Some(Quality::Excellent),
            "Good" => Some(Quality::Good),
            "Fair" => Some(Quality::Fair),
            "Poor" => Some(Quality::Poor),
            _ => None,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Quality::Excellent => 4,
            Quality::Good => 3,
            Quality::Fair => 2,
            Quality::Poor => 1,
        }
    }

    /// Rank of an optional label; missing or unrecognized ranks 0
    pub fn rank_of(quality: Option<Quality>) -> u8 {
        quality.map(Quality::rank).unwrap_or(0)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quality::Excellent => "Excellent",
            Quality::Good => "Good",
            Quality::Fair => "Fair",
            Quality::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// Annotated number of objects in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectCount {
    Known(u64),
    #[default]
    Unknown,
}

impl ObjectCount {
    /// Interpret a raw JSON value. Non-negative integers, whole floats such
    /// as `5.0` and numeric strings are known counts; everything else is
    /// unknown.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(count) => ObjectCount::Known(count),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map_or(ObjectCount::Unknown, |f| ObjectCount::Known(f as u64)),
            },
            serde_json::Value::String(s) => s
                .trim()
                .parse::<u64>()
                .map_or(ObjectCount::Unknown, ObjectCount::Known),
            _ => ObjectCount::Unknown,
        }
    }

    /// Numeric value for ranking; unknown counts as zero
    pub fn value_or_zero(self) -> u64 {
        match self {
            ObjectCount::Known(n) => n,
            ObjectCount::Unknown => 0,
        }
    }
}

impl fmt::Display for ObjectCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectCount::Known(n) => write!(f, "{}", n),
            ObjectCount::Unknown => f.write_str("未知"),
        }
    }
}

/// Field used to order eligible image pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankCriterion {
    #[default]
    Quality,
    #[serde(rename = "Object_count")]
    ObjectCount,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown ranking criterion '{0}' (expected 'quality' or 'object-count')")]
pub struct ParseCriterionError(String);

impl FromStr for RankCriterion {
    type Err = ParseCriterionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "quality" => Ok(RankCriterion::Quality),
            "object_count" | "objectcount" | "count" => Ok(RankCriterion::ObjectCount),
            _ => Err(ParseCriterionError(s.to_string())),
        }
    }
}

impl fmt::Display for RankCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankCriterion::Quality => f.write_str("Quality"),
            RankCriterion::ObjectCount => f.write_str("Object_count"),
        }
    }
}
