//! courtify: command-line front end for legal questions and document summaries.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use courtify_app::{AppConfig, Courtify, CourtifyEvent, EventEnvelope, FileCandidate};

#[derive(Parser)]
#[command(name = "courtify")]
#[command(author, version, about = "AI legal assistant for Indian constitutional law")]
#[command(propagate_version = true)]
struct Cli {
    /// Remote service base URL (overrides COURTIFY_API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a legal question
    Ask {
        /// The question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Upload documents and print their summaries
    Summarize {
        /// Files to summarize (PDF, DOC, DOCX or TXT, up to 10MB each)
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Check whether the remote service is reachable
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().with_session(
        // The CLI prints only the answer to the question asked.
        courtify_app::SessionConfig::default().with_greeting(false),
    );
    if let Some(url) = cli.api_url {
        config.client = config.client.with_base_url(url);
    }
    let app = Courtify::new(config).context("Invalid configuration")?;

    let code = match cli.command {
        Commands::Ask { question } => cmd_ask(&app, &question.join(" ")).await,
        Commands::Summarize { files } => cmd_summarize(&app, files).await?,
        Commands::Health => cmd_health(&app).await,
    };
    app.shutdown();
    Ok(code)
}

/// Initialize tracing from the environment.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter
///
/// Console output goes to stderr so command results stay on stdout.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "courtify=info,courtify_app=info,courtify_core=info,courtify_inference=info,courtify_jobs=info"
            .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("courtify.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

async fn cmd_ask(app: &Courtify, question: &str) -> ExitCode {
    let session = app.session();
    match session.ask(question).await {
        Some(reply) => {
            println!("{}", reply.content);
            if let Some(reference) = reply.reference {
                println!("\nReference: {}", reference);
            }
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("Error: question is empty");
            ExitCode::FAILURE
        }
    }
}

async fn cmd_summarize(app: &Courtify, files: Vec<PathBuf>) -> anyhow::Result<ExitCode> {
    let mut candidates = Vec::with_capacity(files.len());
    for path in &files {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        // Empty declared type: resolved from content and extension.
        candidates.push(FileCandidate::new(name, "", data));
    }

    let mut events = app.subscribe();
    let accepted = app.intake().submit(candidates).await;
    let names: HashMap<Uuid, String> = accepted.iter().map(|d| (d.id, d.name.clone())).collect();
    let mut pending: HashSet<Uuid> = names.keys().copied().collect();
    let mut rejected = 0usize;

    while !pending.is_empty() {
        match events.recv().await {
            Ok(envelope) => render(&envelope, &names, &mut pending, &mut rejected),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Progress display fell behind");
                for document in app.intake().documents().await {
                    if document.status.is_terminal() {
                        pending.remove(&document.id);
                    }
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
    // Rejections are published during submit; pick up any not yet rendered.
    while let Ok(envelope) = events.try_recv() {
        render(&envelope, &names, &mut pending, &mut rejected);
    }

    let mut failed = 0usize;
    for document in &accepted {
        let document = app.intake().wait(document.id).await?;
        match document.summary_report() {
            Some(report) => println!("\n{}", report),
            None => {
                failed += 1;
                eprintln!(
                    "\n{} failed: {}",
                    document.name,
                    document.failure.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }

    Ok(if failed == 0 && rejected == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn render(
    envelope: &EventEnvelope,
    names: &HashMap<Uuid, String>,
    pending: &mut HashSet<Uuid>,
    rejected: &mut usize,
) {
    match &envelope.payload {
        CourtifyEvent::DocumentRejected { reason } => {
            *rejected += 1;
            eprintln!("{}: {}", reason.title(), reason);
        }
        CourtifyEvent::DocumentStatusChanged {
            document_id,
            status,
        } => println!("{}: {}", name_of(names, document_id), status.label()),
        CourtifyEvent::DocumentProgress {
            document_id,
            progress,
        } if *progress > 0 => println!("{}: {}%", name_of(names, document_id), progress),
        CourtifyEvent::DocumentCompleted { document_id, .. }
        | CourtifyEvent::DocumentFailed { document_id, .. } => {
            pending.remove(document_id);
        }
        _ => {}
    }
}

fn name_of<'a>(names: &'a HashMap<Uuid, String>, id: &Uuid) -> &'a str {
    names.get(id).map(String::as_str).unwrap_or("document")
}

async fn cmd_health(app: &Courtify) -> ExitCode {
    let base_url = app.client().base_url().to_string();
    if app.client().health_check().await {
        println!("{} is reachable", base_url);
        ExitCode::SUCCESS
    } else {
        println!(
            "{} is unreachable; answers will come from the local knowledge base",
            base_url
        );
        ExitCode::FAILURE
    }
}
