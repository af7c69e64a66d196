//! vscan command-line front end.

mod args;
mod pairing;
mod render;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vscan_client::{AnalysisClient, ClientConfig};
use vscan_models::{format_file_size, rejection_reason, MediaFile};
use vscan_session::{aggregate, OrchestratorConfig, UploadOrchestrator, UploadSession};

use crate::args::{Args, Command};
use crate::pairing::entry_positions;
use crate::render::{render_events, render_report, JsonReport, ProgressBoard};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut args = Args::parse();

    let outcome = match args.command.take() {
        Some(Command::Health { server }) => health(server).await,
        Some(Command::Result { name, server, json }) => stored_result(&name, server, json).await,
        None => scan(args).await,
    };

    if let Err(e) = outcome {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "vscan=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

fn client_for(server: Option<String>) -> anyhow::Result<AnalysisClient> {
    let mut config = ClientConfig::from_env();
    if let Some(server) = server {
        config.base_url = server;
    }
    AnalysisClient::new(config).context("Failed to create analysis client")
}

async fn health(server: Option<String>) -> anyhow::Result<()> {
    let client = client_for(server)?;
    if client.health_check().await? {
        println!("{} is reachable", client.base_url());
        Ok(())
    } else {
        bail!("{} is not reachable", client.base_url())
    }
}

async fn stored_result(name: &str, server: Option<String>, json: bool) -> anyhow::Result<()> {
    let client = client_for(server)?;
    let raw = client
        .fetch_result(name)
        .await
        .with_context(|| format!("Failed to fetch {}", name))?;
    let aggregated = aggregate(&raw);

    if json {
        println!("{}", serde_json::to_string_pretty(&aggregated)?);
    } else {
        print!("{}", render_events(&aggregated));
    }
    Ok(())
}

async fn scan(args: Args) -> anyhow::Result<()> {
    if args.videos.is_empty() {
        bail!("no videos given; run 'vscan --help' for usage");
    }

    let client = client_for(args.server.clone())?;
    let mut config = OrchestratorConfig::from_env();
    if let Some(policy) = args.rerun_policy {
        config.rerun_policy = policy;
    }
    info!(server = %client.base_url(), policy = %config.rerun_policy, "Starting scan");

    let mut candidates = Vec::with_capacity(args.videos.len());
    for path in &args.videos {
        let file = MediaFile::from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if let Some(reason) = rejection_reason(&file) {
            warn!(file = %file.name, "Not added: {}", reason);
        }
        candidates.push(file);
    }

    let session = UploadSession::new();
    let admitted = session.add_files(candidates.clone()).await?;
    if admitted == 0 {
        bail!("none of the given files can be uploaded");
    }
    if !args.json {
        println!(
            "{} files added ({})",
            admitted,
            format_file_size(session.total_size().await)
        );
    }

    let positions = entry_positions(&candidates, &session.snapshot().await);
    for (position, path) in args.subtitles.iter().enumerate() {
        let Some(index) = positions.get(position).copied().flatten() else {
            warn!(
                subtitle = %path.display(),
                position = position + 1,
                "No admitted video at this position; subtitle ignored"
            );
            continue;
        };
        let srt = MediaFile::from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session.set_subtitle(index, Some(srt)).await?;
    }

    let entries = session.snapshot().await;
    let board = ProgressBoard::new(&entries, args.json);
    let mut rx = session.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if board.apply(&event, &entries) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Progress display fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
        board.finish();
    });

    let orchestrator = UploadOrchestrator::new(client, config);
    let summary = orchestrator.run(&session).await?;
    renderer.await.context("Progress display task failed")?;

    let aggregated = session.aggregated().await;
    if args.json {
        let entries = session.snapshot().await;
        let report = JsonReport {
            summary: &summary,
            entries: &entries,
            results: aggregated.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!(
            "{}",
            render_report(&summary, session.uploaded_count(), aggregated.as_ref())
        );
    }

    Ok(())
}
