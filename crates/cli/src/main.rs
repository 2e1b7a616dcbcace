mod cli;

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Parser;

use explainer_core::Config;
use explainer_ingest::document::extract_text;
use explainer_ingest::Fetcher;
use explainer_llm::{Explainer, Explanation};

use crate::cli::{CliArgs, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    explainer_core::config::load_dotenv();
    let mut config = Config::from_env();
    apply_overrides(&mut config, &args);

    let document_text = read_input(&args, &config).await?;

    let explainer = Explainer::from_config(&config.llm, &config.ollama)
        .context("failed to create LLM provider")?;
    let explanation = explainer
        .explain(&document_text)
        .await
        .context("explain request failed")?;

    match args.format {
        OutputFormat::Text => print_text(&explanation),
        OutputFormat::Json => print_json(&explanation)?,
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &CliArgs) {
    if let Some(provider) = &args.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &args.model {
        match config.llm.provider.as_str() {
            "openai" => config.llm.openai_model = model.clone(),
            "anthropic" | "claude" => config.llm.anthropic_model = model.clone(),
            _ => config.ollama.model = model.clone(),
        }
    }
}

/// Resolve the document text from --url, a file argument, or stdin.
async fn read_input(args: &CliArgs, config: &Config) -> Result<String> {
    if let Some(url) = &args.url {
        let fetcher = Fetcher::new(&config.fetch).context("failed to create URL fetcher")?;
        let document = fetcher
            .fetch(url)
            .await
            .with_context(|| format!("failed to fetch {url}"))?;
        return Ok(document.full_text());
    }

    match args.file.as_deref() {
        Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
            let document = extract_text(&bytes, path, &config.extract)
                .with_context(|| format!("failed to extract text from {path}"))?;
            Ok(document.full_text())
        }
        None => bail!("nothing to explain: pass a file, '-' for stdin, or --url"),
    }
}

fn print_text(explanation: &Explanation) {
    println!("{}", explanation.result.text);

    if !explanation.result.citations.is_empty() {
        println!("\nCitations:");
        for c in &explanation.result.citations {
            match &c.source_ref {
                Some(source) => println!("  {} \"{}\" ({})", c.marker_text, c.quote, source),
                None => println!("  {} \"{}\"", c.marker_text, c.quote),
            }
        }
    }

    for warning in &explanation.result.warnings {
        eprintln!("warning: {warning}");
    }
}

fn print_json(explanation: &Explanation) -> Result<()> {
    let value = serde_json::json!({
        "text": explanation.result.text,
        "citations": explanation.result.citations,
        "warnings": explanation.result.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
        "model": explanation.model,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
