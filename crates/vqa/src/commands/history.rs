use std::collections::BTreeMap;
use std::path::PathBuf;
use vqa_history::{read_jsonl, GenerationRecord, Outcome, Paths};

fn compute_stats(records: &[GenerationRecord]) -> String {
    if records.is_empty() {
        return "No runs to analyze.".to_string();
    }
    let total = records.len();
    let successes: Vec<u32> = records
        .iter()
        .filter_map(|r| match r.outcome {
            Outcome::Success { attempts, .. } => Some(attempts),
            Outcome::Failure { .. } => None,
        })
        .collect();

    let mut failures: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        if let Outcome::Failure { ref kind, .. } = record.outcome {
            *failures.entry(kind.as_str()).or_default() += 1;
        }
    }

    let avg_attempts = if successes.is_empty() {
        0.0
    } else {
        successes.iter().map(|&a| f64::from(a)).sum::<f64>() / successes.len() as f64
    };

    let mut out = format!(
        "Total runs: {}\n\
         Success rate: {:.1}%\n\
         Avg attempts (successful): {:.2}",
        total,
        successes.len() as f64 / total as f64 * 100.0,
        avg_attempts,
    );
    for (kind, count) in failures {
        out.push_str(&format!("\nFailures ({kind}): {count}"));
    }
    out
}

fn format_record(record: &GenerationRecord) -> String {
    let status = match &record.outcome {
        Outcome::Success { attempts, .. } => format!("ok after {attempts}"),
        Outcome::Failure { kind, .. } => format!("failed: {kind}"),
    };
    format!(
        "  {} | {} + {} | {} | {}",
        record.timestamp.format("%Y-%m-%d %H:%M"),
        record.image_a,
        record.image_b,
        record.template,
        status,
    )
}

pub fn run(stats: bool, limit: usize, file: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match file {
        Some(path) => path,
        None => Paths::new()?.history_file(),
    };
    let records: Vec<GenerationRecord> = read_jsonl(&path)?;

    if records.is_empty() {
        println!("No generation history");
        return Ok(());
    }

    if stats {
        println!("{}", compute_stats(&records));
        return Ok(());
    }

    let recent: Vec<_> = records.iter().rev().take(limit).collect();
    println!("Recent Runs (last {})", recent.len());
    println!("====================");
    for record in recent {
        println!("{}", format_record(record));
    }
    Ok(())
}
