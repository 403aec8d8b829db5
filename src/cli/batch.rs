//! Batch command - enriches a JSON-lines file of articles

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use super::{options_for, prepare, print_metrics, read_input, write_output, CommonArgs};
use crate::domain::Article;

/// Arguments for the batch command
#[derive(Args, Clone, Debug)]
pub struct BatchArgs {
    /// JSON-lines file with one article object per line (`-` for stdin)
    pub input: PathBuf,

    /// Maximum articles analyzed at once (overrides config)
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the batch command
pub async fn run(args: BatchArgs) -> anyhow::Result<()> {
    let (engine, metrics) = prepare(&args.common)?;

    let input = read_input(Some(&args.input)).await?;
    let articles = parse_articles(&input)?;
    let options = options_for(&engine, &args.common);
    let max_concurrent = args.max_concurrent.unwrap_or(engine.max_concurrent);

    info!(
        articles = articles.len(),
        max_concurrent = max_concurrent,
        "Starting batch"
    );

    let outcome = engine
        .batch
        .batch_analyze(articles, &options, max_concurrent)
        .await;

    write_output(&outcome, args.common.output.as_deref()).await?;
    print_metrics(metrics.as_ref());

    Ok(())
}

/// Parse one article per non-blank line
fn parse_articles(input: &str) -> anyhow::Result<Vec<Article>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid article on line {}", index + 1))
        })
        .collect()
}
