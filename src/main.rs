//! postop-pain entrypoint: ingest a dataset, score one record, or summarise a cohort.
//! Each invocation is one request; its failure is reported and nothing else is affected.

use clap::{Parser, Subcommand};
use postop_pain::{
    analytics::{summarize, validate_outcomes, AggregateStats},
    config::AppConfig,
    error::AppError,
    logging::{PredictionAudit, StructuredLogger},
    risk::{RiskEngine, RiskLevel},
    schema::{FeatureSchema, ANAESTHESIA_TYPES, SURGERY_DURATIONS},
    source::{RawTable, RawValue, ReadOutcome, Source, SourceReader},
    validate::{validate_table, ClinicalRecord},
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "postop-pain",
    version,
    about = "Post-caesarean pain risk: data ingestion, risk prediction and cohort analytics"
)]
struct Cli {
    /// JSON config file (defaults to $POSTOP_PAIN_CONFIG, then config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read and validate patient data from a .csv/.xlsx file or a CSV-export link
    Ingest {
        /// File path or http(s) link ending with the CSV export marker
        source: String,
        /// Rows to preview
        #[arg(long, default_value_t = 5)]
        preview: usize,
        /// Print the validation result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Predict the risk of severe post-operative pain for one patient
    Predict {
        #[arg(long, default_value_t = 30.0)]
        age: f64,
        #[arg(long, default_value_t = 28.0)]
        bmi: f64,
        #[arg(long, default_value = "<30min", value_parser = SURGERY_DURATIONS)]
        surgery_duration: String,
        #[arg(long, default_value = "Spinal", value_parser = ANAESTHESIA_TYPES)]
        anaesthesia: String,
        /// Model artifact overriding the configured path
        #[arg(long)]
        model: Option<PathBuf>,
        /// Print a JSON audit line instead of text
        #[arg(long)]
        json: bool,
    },
    /// Pain score histogram and quartiles by surgery duration and anaesthesia
    Summarize {
        /// Dataset path or link (defaults to the configured dataset)
        dataset: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::path_from_env);
    let config = match AppConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(config = %config_path.display(), "postop-pain starting");

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "request failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &AppConfig) -> Result<(), AppError> {
    match command {
        Command::Ingest {
            source,
            preview,
            json,
        } => ingest(&source, preview, json, config),
        Command::Predict {
            age,
            bmi,
            surgery_duration,
            anaesthesia,
            model,
            json,
        } => {
            let record = ClinicalRecord {
                age,
                bmi,
                surgery_duration,
                anaesthesia,
            };
            let model_path = model.unwrap_or_else(|| config.model_path.clone());
            predict(&record, model_path, json, config)
        }
        Command::Summarize { dataset, json } => summarize_dataset(dataset.as_deref(), json, config),
    }
}

fn ingest(source: &str, preview: usize, json: bool, config: &AppConfig) -> Result<(), AppError> {
    let reader = SourceReader::new(config.source.clone());
    let table = match reader.read(&Source::from_arg(source))? {
        ReadOutcome::Table(t) => t,
        ReadOutcome::Warning(w) => {
            println!("warning: {}", w.message);
            return Ok(());
        }
    };
    let batch = validate_table(&table, FeatureSchema::clinical());

    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }
    println!(
        "Data loaded: {} rows, {} columns from {}",
        table.len(),
        table.headers().len(),
        source
    );
    print_preview(&table, preview);
    println!(
        "{} of {} rows accepted, {} rejected",
        batch.accepted.len(),
        batch.total(),
        batch.rejected.len()
    );
    for rejected in &batch.rejected {
        println!("  {}", rejected);
    }
    Ok(())
}

fn print_preview(table: &RawTable, n: usize) {
    if n == 0 || table.is_empty() {
        return;
    }
    println!("{}", table.headers().join("\t"));
    for row in table.head(n) {
        let cells: Vec<String> = row
            .iter()
            .map(|(_, v)| match v {
                RawValue::Text(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        println!("{}", cells.join("\t"));
    }
}

fn predict(
    record: &ClinicalRecord,
    model_path: PathBuf,
    json: bool,
    config: &AppConfig,
) -> Result<(), AppError> {
    let vector = record.validate().map_err(|violations| {
        let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
        AppError::Validation(reasons.join(", "))
    })?;

    let engine = RiskEngine::from_path(model_path);
    let score = engine.predict(&vector)?;
    let level = RiskLevel::from_probability(score.probability, &config.risk);

    if json {
        let mut out = std::io::stdout().lock();
        StructuredLogger::emit_json(&PredictionAudit::new(&score, level), &mut out)?;
    } else {
        println!(
            "Predicted risk of severe pain: {} ({})",
            score.percent(),
            level.as_str()
        );
    }
    Ok(())
}

fn summarize_dataset(dataset: Option<&str>, json: bool, config: &AppConfig) -> Result<(), AppError> {
    let source = match dataset {
        Some(arg) => Source::from_arg(arg),
        None => Source::Path(config.analytics.dataset_path.clone()),
    };
    if let Source::Path(path) = &source {
        if !path.exists() {
            println!("warning: no data available at {}. Upload or link a dataset.", path.display());
            return Ok(());
        }
    }

    let reader = SourceReader::new(config.source.clone());
    let table = match reader.read(&source)? {
        ReadOutcome::Table(t) => t,
        ReadOutcome::Warning(w) => {
            println!("warning: {}", w.message);
            return Ok(());
        }
    };
    let batch = validate_outcomes(&table, &config.analytics.outcome_field);
    let stats = summarize(&batch.records, &config.analytics);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    if !batch.rejected.is_empty() {
        println!("{} rows excluded from analytics:", batch.rejected.len());
        for rejected in &batch.rejected {
            println!("  {}", rejected);
        }
    }
    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &AggregateStats) {
    println!("Distribution of {} (n = {})", stats.outcome_field, stats.total);
    if stats.histogram.edges.is_empty() {
        println!("  (no records)");
    } else {
        let widest = stats.histogram.counts.iter().copied().max().unwrap_or(0).max(1);
        for (i, count) in stats.histogram.counts.iter().enumerate() {
            let bar = "#".repeat(count * 40 / widest);
            println!(
                "  [{:>6.2}, {:>6.2}{} {:>5}  {}",
                stats.histogram.edges[i],
                stats.histogram.edges[i + 1],
                if i + 1 == stats.histogram.bin_count { "]" } else { ")" },
                count,
                bar
            );
        }
    }

    println!();
    println!("{} by {}", stats.outcome_field, stats.group_by.join(" & "));
    println!(
        "  {:<28} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "group", "n", "min", "q1", "median", "q3", "max"
    );
    for g in &stats.groups {
        println!(
            "  {:<28} {:>5} {:>6.2} {:>6.2} {:>6.2} {:>6.2} {:>6.2}",
            g.key.join(" / "),
            g.count,
            g.min,
            g.q1,
            g.median,
            g.q3,
            g.max
        );
    }
}
