use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kotoba_cloud::article::Article;
use kotoba_cloud::config::Config;
use kotoba_cloud::pipeline::Pipeline;

/// Render tag and keyword word clouds from a JSON array of articles
#[derive(Parser, Debug)]
#[command(name = "kotoba-cloud", version)]
struct Args {
    /// Articles JSON file (stdin when omitted)
    input: Option<PathBuf>,

    /// Configuration file (defaults to ./kotoba-cloud.toml, then the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the result JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout carries the result
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load_from_default(),
    };

    let input = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let articles: Vec<Article> = serde_json::from_str(&input).context("Invalid articles JSON")?;

    let pipeline = Pipeline::build(&config).await?;
    let output = pipeline.run(articles).await?;
    let json = serde_json::to_string_pretty(&output)?;

    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}
