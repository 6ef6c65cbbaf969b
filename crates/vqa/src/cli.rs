use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vqa_core::RankCriterion;

#[derive(Parser)]
#[command(name = "vqa")]
#[command(version)]
#[command(about = "Generate multiple-choice vehicle VQA items from image pairs")]
pub struct Cli {
    /// Config file (JSON); defaults to <config_dir>/vqa-gen/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `vqa_select=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate three VQA questions for an image pair
    Generate {
        /// First image of the pair
        #[arg(long)]
        image1: Option<PathBuf>,

        /// Second image of the pair
        #[arg(long)]
        image2: Option<PathBuf>,

        /// Annotation corpus (JSON array)
        #[arg(short, long)]
        annotations: Option<PathBuf>,

        /// Dataset root for automatic pair selection
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Ranking criterion for automatic selection
        #[arg(short, long, default_value = "quality")]
        sort: RankCriterion,

        /// Override the model identifier
        #[arg(long)]
        model: Option<String>,

        /// Label every image as image/jpeg regardless of its format
        #[arg(long)]
        legacy_mime: bool,

        /// Do not append this run to the history file
        #[arg(long)]
        no_history: bool,

        /// History file (defaults to <data_dir>/vqa-gen/history.jsonl)
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Show the best-ranked eligible pair under a dataset root
    Select {
        #[arg(short, long)]
        annotations: Option<PathBuf>,

        #[arg(short, long)]
        root: Option<PathBuf>,

        #[arg(short, long, default_value = "quality")]
        sort: RankCriterion,

        /// Print the pair as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the normalized annotation for images
    Lookup {
        #[arg(short, long)]
        annotations: Option<PathBuf>,

        /// Image paths to look up
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// View past generation runs
    History {
        /// Show statistics summary
        #[arg(long)]
        stats: bool,

        /// Number of runs to list
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// History file (defaults to <data_dir>/vqa-gen/history.jsonl)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print version information
    Version,
}
