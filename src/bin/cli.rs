//! KTD Crawler CLI
//!
//! Mirrors the Kostenträgerdateien download page into a local directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ktd_crawler::{
    error::{AppError, Result},
    models::Config,
    pipeline::{self, Mirror, Shutdown, ShutdownTrigger},
    services::HttpFetcher,
    storage::FingerprintStore,
};

/// KTD Crawler - Kostenträgerdateien mirror
#[derive(Parser, Debug)]
#[command(name = "ktd-crawler", version, about = "Mirror and archive KTD files")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a cycle every interval until interrupted
    Run {
        /// Seconds between the end of one cycle and the start of the next
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Run a single cycle and exit
    Once,

    /// Fetch the listing page and print the matching links
    Links {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Write the default configuration to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Trigger shutdown on Ctrl+C (and SIGTERM on Unix).
fn spawn_signal_listener(trigger: ShutdownTrigger) {
    tokio::spawn(async move {
        wait_for_signal().await;
        log::info!("Shutdown signal received");
        trigger.trigger();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            log::warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn build_mirror(config: &Config) -> Result<Mirror<HttpFetcher>> {
    let fetcher = HttpFetcher::new(&config.crawler)?;
    Mirror::from_config(config, fetcher)
}

async fn run(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Command::Run { interval } => {
            if let Some(secs) = interval {
                config.crawler.interval_secs = secs;
            }
            config.validate()?;

            let mirror = build_mirror(&config)?;
            let (trigger, shutdown) = pipeline::shutdown_channel();
            spawn_signal_listener(trigger);

            log::info!(
                "Mirroring {} into {} every {}s",
                config.source.page_url()?,
                config.paths.download_dir.display(),
                config.crawler.interval_secs
            );

            let mut store = FingerprintStore::new();
            pipeline::run_scheduler(&mirror, &mut store, config.crawler.interval(), &shutdown)
                .await;
        }

        Command::Once => {
            config.validate()?;
            let mirror = build_mirror(&config)?;
            let (trigger, shutdown) = pipeline::shutdown_channel();
            spawn_signal_listener(trigger);

            let mut store = FingerprintStore::new();
            let report = mirror.run_cycle(&mut store, &shutdown).await?;
            report.log_summary();
        }

        Command::Links { json } => {
            config.validate()?;
            let mirror = build_mirror(&config)?;
            let links = mirror.fetch_links(&Shutdown::never()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&links)?);
            } else {
                for link in &links {
                    println!("{}\t{}", link.file_name, link.url);
                }
            }
            log::info!("{} matching links", links.len());
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Init { force } => {
            if cli.config.exists() && !force {
                return Err(AppError::config(format!(
                    "{} already exists. Use --force to overwrite.",
                    cli.config.display()
                )));
            }
            Config::default().save(&cli.config)?;
            log::info!("Default configuration written to {}", cli.config.display());
        }
    }

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        match Config::load(&cli.config) {
            Ok(config) => config,
            Err(e) => {
                init_logging(cli.verbose, "info");
                log::error!("Failed to load {}: {}", cli.config.display(), e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        Config::default()
    };
    init_logging(cli.verbose, &config.logging.level);

    if !cli.config.exists() && !matches!(cli.command, Command::Init { .. }) {
        log::warn!(
            "No configuration at {}, using defaults",
            cli.config.display()
        );
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
