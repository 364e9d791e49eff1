pub mod check;
pub mod export;
pub mod migrate;
pub mod portals;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};

use guestmig_common::config::{Config, ListingPolicy, MAX_PAGE_SIZE, RunOptions};
use guestmig_common::target::TargetName;
use guestmig_common::warn;
use guestmig_core::network::ErsClient;

pub const DEFAULT_OUTPUT: &str = "guests.csv";

/// Exit status of a run stopped by Ctrl-C.
pub const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "guestmig", version)]
#[command(about = "Copies guest accounts from a legacy ISE deployment to a new one.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file [default: ./guestmig.toml when present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Guests requested per listing page (at most 100)
    #[arg(long, global = true, default_value_t = MAX_PAGE_SIZE)]
    pub page_size: u32,

    /// Stop listing after this many pages, 0 for no limit
    #[arg(long, global = true, default_value_t = 0)]
    pub max_pages: u32,

    /// Abort when the guest listing cannot be read to the end
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Guest details requested in parallel
    #[arg(long, global = true, default_value_t = 1)]
    pub fetch_concurrency: usize,

    /// Less output; repeat for less
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log detail; repeat for more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify both deployments answer with the configured credentials
    #[command(alias = "c")]
    Check,
    /// Write every guest of one deployment to a CSV file
    #[command(alias = "e")]
    Export {
        #[arg(short, long, default_value = "legacy")]
        target: TargetName,
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Copy every guest from the legacy deployment to the new one
    #[command(alias = "m")]
    Migrate {
        /// Where the fetched guests are written
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
        /// Stop after the portal check, create nothing
        #[arg(long)]
        dry_run: bool,
        /// Also write the guests that could not be created
        #[arg(long)]
        failures: Option<PathBuf>,
    },
    /// List the portals of a deployment
    #[command(alias = "p")]
    Portals {
        #[arg(short, long, default_value = "new")]
        target: TargetName,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            page_size: self.page_size,
            max_pages: self.max_pages,
            listing_policy: if self.fail_fast {
                ListingPolicy::FailFast
            } else {
                ListingPolicy::BestEffort
            },
            fetch_concurrency: self.fetch_concurrency,
            dry_run: matches!(self.command, Commands::Migrate { dry_run: true, .. }),
        }
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        Config::load(self.config.as_deref()).context("cannot load configuration")
    }
}

pub fn client(cfg: &Config, target: TargetName) -> anyhow::Result<ErsClient> {
    ErsClient::new(cfg.target(target)).with_context(|| format!("cannot set up the {target} client"))
}

/// Raises the returned flag on the first Ctrl-C. A second one exits at once.
pub fn stop_on_ctrl_c() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("interrupt received, finishing the current guest (Ctrl-C again to quit now)");
        flag.store(true, Ordering::Relaxed);
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
    });
    stop
}

pub async fn run(commands: CommandLine) -> anyhow::Result<ExitCode> {
    let cfg = commands.load_config()?;
    let options = commands.run_options();
    let quiet = commands.quiet;

    match commands.command {
        Commands::Check => check::check(&cfg, quiet).await,
        Commands::Export { target, output } => {
            export::export(&cfg, target, &output, &options, quiet).await
        }
        Commands::Migrate {
            output, failures, ..
        } => migrate::migrate(&cfg, &output, failures.as_deref(), &options, quiet).await,
        Commands::Portals { target } => portals::portals(&cfg, target, quiet).await,
    }
}
