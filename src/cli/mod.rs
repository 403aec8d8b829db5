//! CLI module for news enrichment
//!
//! Provides subcommands:
//! - `analyze`: enrich a single article
//! - `batch`: enrich a JSON-lines file of articles

pub mod analyze;
pub mod batch;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::observability::{init_metrics, PrometheusMetrics};
use crate::Engine;

/// News enrichment - sentiment, topic, summary and relevance for articles
#[derive(Parser)]
#[command(name = "news-enrich")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze one article read from a file or stdin
    Analyze(analyze::AnalyzeArgs),

    /// Analyze a JSON-lines file of articles
    Batch(batch::BatchArgs),
}

/// Flags shared by every subcommand
#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    /// Use only the local heuristics
    #[arg(long)]
    pub no_external: bool,

    /// Comma-separated keywords the reader cares about
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Write the JSON result to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print Prometheus metrics to stderr after the run
    #[arg(long)]
    pub metrics: bool,
}

/// Load configuration, initialize logging and optionally metrics, and build the engine
pub(crate) fn prepare(common: &CommonArgs) -> anyhow::Result<(Engine, Option<PrometheusMetrics>)> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().unwrap_or_default();
    if common.no_external {
        config.engine.use_external = false;
    }

    logging::init_logging(&config.logging);

    let metrics = if common.metrics { init_metrics() } else { None };
    let engine = crate::create_engine(&config).context("Failed to create enrichment engine")?;

    Ok((engine, metrics))
}

/// Default options of the engine with the command-line keywords applied
pub(crate) fn options_for(engine: &Engine, common: &CommonArgs) -> crate::domain::AnalysisOptions {
    if common.keywords.is_empty() {
        engine.default_options.clone()
    } else {
        engine.default_options.clone().with_keywords(&common.keywords)
    }
}

/// Read a file, or stdin when the path is absent or `-`
pub(crate) async fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Serialize `value` as pretty JSON to the output file or stdout
pub(crate) async fn write_output<T: Serialize>(
    value: &T,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => tokio::fs::write(path, format!("{}\n", json))
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

pub(crate) fn print_metrics(metrics: Option<&PrometheusMetrics>) {
    if let Some(metrics) = metrics {
        eprintln!("{}", metrics.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_command() {
        let cli = Cli::try_parse_from([
            "news-enrich",
            "batch",
            "articles.jsonl",
            "--max-concurrent",
            "3",
            "--keywords",
            "ai,chips",
            "--no-external",
        ])
        .unwrap();

        match cli.command {
            Command::Batch(args) => {
                assert_eq!(args.max_concurrent, Some(3));
                assert!(args.common.no_external);
                assert_eq!(args.common.keywords, vec!["ai", "chips"]);
                assert_eq!(args.input, PathBuf::from("articles.jsonl"));
            }
            Command::Analyze(_) => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_parse_analyze_command() {
        let cli = Cli::try_parse_from([
            "news-enrich",
            "analyze",
            "--id",
            "a-7",
            "--source",
            "reuters.com",
            "--output",
            "out.json",
        ])
        .unwrap();

        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.id, "a-7");
                assert_eq!(args.source.as_deref(), Some("reuters.com"));
                assert!(args.input.is_none());
                assert_eq!(args.common.output, Some(PathBuf::from("out.json")));
            }
            Command::Batch(_) => panic!("expected analyze command"),
        }
    }

    #[tokio::test]
    async fn test_write_output_to_file() {
        let path = std::env::temp_dir().join(format!("news-enrich-{}.json", uuid::Uuid::new_v4()));

        write_output(&serde_json::json!({"ok": true}), Some(&path))
            .await
            .unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("\"ok\": true"));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
