use clap::Parser;

/// Explain a document from the command line.
///
/// Reads a file, a URL, or stdin, asks the configured LLM for a
/// plain-language explanation, and prints it with reconciled citations.
#[derive(Parser, Debug)]
#[command(name = "explain", about = "Explain a document with cited sources")]
pub struct CliArgs {
    /// Document file to explain (pdf, txt, md); "-" reads plain text from stdin
    #[arg(conflicts_with = "url")]
    pub file: Option<String>,

    /// Fetch and explain a web page instead of a file
    #[arg(long)]
    pub url: Option<String>,

    /// LLM provider override: openai, anthropic, or ollama
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name override (uses provider default if not set)
    #[arg(long)]
    pub model: Option<String>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
