use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use llm_interface::Generator;
use notifier::{Notification, Notifier};
use rand::rngs::StdRng;
use rand::SeedableRng;
use social_client::Listener;
use std::path::PathBuf;
use std::process::ExitCode;
use xthreads_agent::{build_generator, build_listener, logging, readiness, Pipeline, SourceMode};
use xthreads_core::{AppConfig, CoreError, ErrorReporter, SnapshotStore};

/// Daily content pipeline for xthreads.app
#[derive(Parser, Debug)]
#[command(name = "xthreads-agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Listen, plan, generate and export a day of social posts")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Seed for topic, angle and time-slot selection
    #[arg(long)]
    seed: Option<u64>,

    /// Run date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Read raw posts from the saved snapshots instead of the network
    #[arg(long)]
    replay: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the full pipeline (default)
    Run,
    /// Check configuration and environment readiness
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    if cli.command == Some(Command::Check) {
        let report = readiness::check(&cli.config, |key| std::env::var(key).ok());
        print!("{}", report.render());
        return if report.is_ready() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            tracing::error!("❌ Pipeline failed: {:#}", e);
            if let Some(core) = e.downcast_ref::<CoreError>() {
                ErrorReporter::new().report_error(core);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let log_file = logging::init(&config.file.paths.log_dir, date)
        .context("failed to set up logging")?;
    tracing::info!("Logging to {}", log_file.display());

    let notifier = Notifier::from_config(&config.file.notifications, &config.secrets)
        .context("failed to set up notifications")?;

    let mode = if cli.replay {
        SourceMode::Replay
    } else {
        SourceMode::Live
    };
    let (listener, generator) = match build_stages(&config, date, mode) {
        Ok(stages) => stages,
        Err(e) => {
            notifier.notify(&Notification::error(format!("{:#}", e))).await;
            return Err(e);
        }
    };

    let pipeline = Pipeline::from_config(&config.file, date, listener, generator, notifier)
        .with_raw_snapshots(mode == SourceMode::Live);

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let output = pipeline
        .run_or_notify(&mut rng)
        .await
        .context("pipeline run failed")?;
    let summary = output.summary();
    tracing::info!(
        "Run finished: {}/{} posts ready, {} files exported",
        summary.successful,
        summary.total,
        summary.exported_files.len()
    );
    Ok(())
}

fn build_stages(
    config: &AppConfig,
    date: NaiveDate,
    mode: SourceMode,
) -> Result<(Listener, Generator)> {
    let store = SnapshotStore::new(&config.file.paths.data_dir, date);
    let listener = build_listener(config, &store, mode, Utc::now())
        .context("failed to set up content sources")?;
    let generator = build_generator(config).context("failed to set up the content generator")?;
    Ok((listener, generator))
}
