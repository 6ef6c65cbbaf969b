//! Shared domain types and configuration for VQA item generation

mod config;
mod types;

pub use config::{
    ApiSettings, ConfigError, DatasetSettings, LogSettings, LogSink, RetrySettings, Settings,
};
pub use types::{ObjectCount, ParseCriterionError, Quality, RankCriterion};
