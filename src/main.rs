//! `addrmatch` command-line entrypoint.

mod cli;

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use addrmatch::catalog::extract_unique_addresses;
use addrmatch::config::Config;
use addrmatch::evaluation::{PairDataset, evaluate_with_threshold, tokenize_dataset};
use addrmatch::gateway::{HandlerState, create_router_with_state};
use addrmatch::matcher::PairScorer;
use addrmatch::model::{EsimModel, select_device};
use addrmatch::session::{self, InferenceSession};
use addrmatch::vocab::Vocabulary;
use cli::{Cli, Command};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_tracing(verbose: u8) {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Serve => serve(cli.cpu).await?,
        Command::Match { query, top } => {
            let config = load_config(cli.cpu)?;
            tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
                let session = InferenceSession::load(&config)?;
                let mut stdout = io::stdout().lock();
                match query {
                    Some(query) => print_match(&session, &query, top, &mut stdout),
                    None => interactive(&session, top, io::stdin().lock(), &mut stdout),
                }
            })
            .await??;
        }
        Command::BuildDict { input, output } => {
            let vocab = Vocabulary::load_word_list(&input)?;
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            vocab.write_json(&output)?;
            println!("{} words written to {}", vocab.len(), output.display());
        }
        Command::ExtractCatalog { input, output } => {
            let written = extract_unique_addresses(&input, &output)?;
            println!("{} unique addresses written to {}", written, output.display());
        }
        Command::TokenizeDataset { input, output_dir } => {
            let config = load_config(cli.cpu)?;
            let indexer = session::load_indexer(&config)?;
            let summary = tokenize_dataset(&input, &output_dir, &indexer)?;
            println!(
                "{} pairs written to {} ({} rows skipped)",
                summary.pairs,
                output_dir.display(),
                summary.skipped
            );
        }
        Command::Evaluate {
            dir,
            threshold,
            json,
        } => {
            let config = load_config(cli.cpu)?;
            evaluate_dir(&config, &dir, threshold, json)?;
        }
        Command::HealthCheck => std::process::exit(run_health_check().await),
    }

    Ok(())
}

fn load_config(force_cpu: bool) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    config.force_cpu = force_cpu;
    Ok(config)
}

async fn serve(force_cpu: bool) -> anyhow::Result<()> {
    let config = load_config(force_cpu)?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        checkpoint = %config.checkpoint_path.display(),
        "addrmatch starting"
    );

    let session = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || InferenceSession::load(&config)).await??
    };

    let state = HandlerState::new(Arc::new(session), config.match_timeout);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("addrmatch shutdown complete");
    Ok(())
}

fn print_match<S: PairScorer>(
    session: &InferenceSession<S>,
    query: &str,
    top: Option<usize>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match top {
        Some(top_n) => {
            for (rank, scored) in session.rank(query, top_n)?.iter().enumerate() {
                writeln!(out, "{:>3}. {:.4}  {}", rank + 1, scored.score, scored.candidate)?;
            }
        }
        None => writeln!(out, "{}", session.match_query(query)?)?,
    }
    Ok(())
}

/// Reads one address per line until EOF.
fn interactive<S: PairScorer>(
    session: &InferenceSession<S>,
    top: Option<usize>,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    loop {
        write!(out, "address> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        if let Err(e) = print_match(session, line.trim_end_matches(['\r', '\n']), top, out) {
            tracing::error!(error = %e, "Match failed");
        }
    }
    Ok(())
}

fn evaluate_dir(config: &Config, dir: &Path, threshold: f32, json: bool) -> anyhow::Result<()> {
    let device = select_device(config.force_cpu)?;
    let model = EsimModel::load(&config.checkpoint_path, config.model_config(), &device)?;
    let dataset = PairDataset::load_dir(dir, config.max_seq_len)?;

    let metrics = evaluate_with_threshold(&model, &dataset, threshold)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        println!("{metrics}");
    }
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = Config::from_env().map_or(8080, |config| config.port);
    let url = format!("http://127.0.0.1:{}/healthz", port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
