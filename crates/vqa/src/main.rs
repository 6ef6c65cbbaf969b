mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use vqa_core::{LogSink, Settings};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        settings.log.level = level;
    }
    if let Some(path) = cli.log_file {
        settings.log.sink = LogSink::File(path);
    }

    logging::init(&settings.log)?;
    tracing::debug!(?settings, "Loaded settings");

    match cli.command {
        Commands::Generate {
            image1,
            image2,
            annotations,
            root,
            sort,
            model,
            legacy_mime,
            no_history,
            history,
        } => {
            if let Some(model) = model {
                settings.api.model = model;
            }
            let options = commands::generate::GenerateOptions {
                image1,
                image2,
                annotations,
                root,
                criterion: sort,
                legacy_mime,
                record_history: !no_history,
                history_file: history,
            };
            commands::generate::run(&options, &settings)
        }
        Commands::Select {
            annotations,
            root,
            sort,
            json,
        } => commands::select::run(annotations, root, sort, json, &settings),
        Commands::Lookup {
            annotations,
            images,
        } => commands::lookup::run(annotations, &images, &settings),
        Commands::History { stats, limit, file } => commands::history::run(stats, limit, file),
        Commands::Version => commands::version::run(),
    }
}
