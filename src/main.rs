use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use docsift::{api, config, logging, processing};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Classify documents and attach LLM-derived summaries or insights.
#[derive(Parser)]
#[command(name = "docsift", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a single file and print the JSON result.
    Process {
        /// Path to the input file (PDF, text, CSV, or Excel).
        #[arg(long)]
        input_file: PathBuf,
    },
    /// Process supported files under a directory, one after another.
    Batch {
        /// Directory to scan recursively.
        #[arg(long)]
        input_dir: PathBuf,
        /// Maximum number of files to process (defaults to `BATCH_MAX_FILES`).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Start the HTTP server.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();
    let config = config::load().context("Failed to load configuration")?;
    let processor = processing::DocumentProcessor::from_config(&config)
        .context("Failed to initialize LLM client")?;

    match cli.command {
        Command::Process { input_file } => {
            if !input_file.is_file() {
                tracing::error!(path = %input_file.display(), "File does not exist");
                bail!("File does not exist: {}", input_file.display());
            }
            let result = processor.process(&input_file).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Batch { input_dir, limit } => {
            let limit = limit.unwrap_or(config.batch_max_files);
            let documents = processing::collect_documents(&input_dir, limit)
                .with_context(|| format!("Failed to scan {}", input_dir.display()))?;
            tracing::info!(dir = %input_dir.display(), files = documents.len(), "Starting batch");
            let mut results = Vec::with_capacity(documents.len());
            for path in &documents {
                results.push(processor.process(path).await);
            }
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Serve => {
            let app = api::create_router(Arc::new(processor));
            let (listener, port) = bind_listener(config.server_port)
                .await
                .context("Failed to bind listener")?;
            tracing::info!("Listening on http://0.0.0.0:{}", port);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn bind_listener(server_port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4100..=4199;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4100-4199",
    ))
}
