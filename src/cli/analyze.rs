//! Analyze command - enriches a single article

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use tracing::info;

use super::{options_for, prepare, print_metrics, read_input, write_output, CommonArgs};
use crate::domain::Article;

/// Arguments for the analyze command
#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// Article text file (stdin when omitted or `-`)
    pub input: Option<PathBuf>,

    /// Treat the input as a JSON article object instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Article ID for plain-text input
    #[arg(long, default_value = "article")]
    pub id: String,

    /// Publishing source for plain-text input
    #[arg(long)]
    pub source: Option<String>,

    /// Publication time (RFC 3339) for plain-text input
    #[arg(long)]
    pub published_at: Option<DateTime<Utc>>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the analyze command
pub async fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let (engine, metrics) = prepare(&args.common)?;

    let input = read_input(args.input.as_deref()).await?;
    let article = build_article(&args, input)?;
    let options = options_for(&engine, &args.common);

    info!(article_id = %article.id, "Analyzing article");
    let result = engine
        .orchestrator
        .analyze(&article, &options)
        .await
        .with_context(|| format!("Failed to analyze article '{}'", article.id))?;

    write_output(&result, args.common.output.as_deref()).await?;
    print_metrics(metrics.as_ref());

    Ok(())
}

fn build_article(args: &AnalyzeArgs, input: String) -> anyhow::Result<Article> {
    if args.json {
        return serde_json::from_str(&input).context("Input is not a valid article object");
    }

    let mut article = Article::new(args.id.clone(), input);
    article.source = args.source.clone();
    article.published_at = args.published_at;
    Ok(article)
}
