use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rerank_compressor::{CompressorConfig, Document, DocumentCompressor, RerankCompressor};

#[derive(Parser)]
#[command(
    name = "rerank-compressor",
    about = "Rerank retrieved documents against a query with a cross-encoder model",
    version
)]
struct Cli {
    /// Query to rank the documents against
    #[arg(long, short = 'q')]
    query: String,

    /// JSON file holding an array of documents (stdin when omitted)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Config file (TOML, or JSON when the extension is .json)
    #[arg(long, short = 'c', env = "RERANK_CONFIG")]
    config: Option<PathBuf>,

    /// Reranker model name
    #[arg(long, short = 'm', env = "RERANK_MODEL")]
    model: Option<String>,

    /// Directory for downloaded model files
    #[arg(long = "cache-dir", env = "RERANK_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Number of documents to keep
    #[arg(long = "top-n", short = 'n', env = "RERANK_TOP_N")]
    top_n: Option<usize>,

    /// Log file path
    #[arg(long = "log-file", env = "RERANK_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Enable debug mode
    #[arg(long, env = "RERANK_DEBUG")]
    debug: bool,
}

impl Cli {
    /// Config file values overridden by flags and environment.
    fn to_config(&self) -> Result<CompressorConfig> {
        let mut config = match &self.config {
            Some(path) => CompressorConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CompressorConfig::default(),
        };
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_dir = Some(cache_dir.clone());
        }
        if let Some(top_n) = self.top_n {
            config.top_n = Some(top_n);
        }
        Ok(config)
    }
}

fn setup_logging(log_file: Option<&PathBuf>, debug: bool) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        // stdout carries the JSON result
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn read_documents(input: Option<&Path>) -> Result<Vec<Document>> {
    let content = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read documents from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Input must be a JSON array of documents")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_file.as_ref(), cli.debug)?;

    let config = cli.to_config()?;
    let documents = read_documents(cli.input.as_deref())?;

    let compressor = RerankCompressor::from_config(config, None)?;
    info!(
        "rerank-compressor v{} · model={} · top_n={} · cache={}",
        rerank_compressor::VERSION,
        compressor.model(),
        compressor.top_n(),
        compressor.cache_dir().display()
    );

    let ranked = compressor.compress_documents(&documents, &cli.query)?;
    info!("Kept {} of {} documents", ranked.len(), documents.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &ranked)?;
    writeln!(out)?;

    Ok(())
}
