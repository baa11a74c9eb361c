//! Daily Pulse CLI.
//!
//! Simulates one day of product analytics traffic and ships it to PostHog.
//!
//! Usage:
//!   POSTHOG_API_KEY=phc_... daily-pulse [OPTIONS]
//!
//! Examples:
//!   daily-pulse                          # Default: 5-12 signups, pool of 50
//!   daily-pulse --new-users 10 --seed 42 # Reproducible run
//!   daily-pulse --dry-run --json         # Print events, no network

use clap::Parser;
use daily_pulse::ingest::{PostHogClient, StdoutClient};
use daily_pulse::simulator::{mask_key, run_simulation, NewUserCount, SimConfig};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "daily-pulse")]
#[command(version, about = "Simulate a day of product analytics traffic", long_about = None)]
struct Cli {
    /// Exact number of new signups (default: random 5-12)
    #[arg(short = 'n', long)]
    new_users: Option<u32>,

    /// Size of the returning-user pool
    #[arg(short, long)]
    pool_size: Option<u32>,

    /// Hours covered by the trailing window
    #[arg(short, long)]
    window_hours: Option<u32>,

    /// Random seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Events per ingestion request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Ingestion host (overrides POSTHOG_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Print events as JSON lines instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut SimConfig) {
        if let Some(n) = self.new_users {
            config.new_users = NewUserCount::Fixed(n);
        }
        if let Some(pool) = self.pool_size {
            config.returning_pool_size = pool;
        }
        if let Some(hours) = self.window_hours {
            config.window_hours = hours;
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        config.seed = self.seed.or(config.seed);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = if cli.dry_run {
        SimConfig::dry_run()
    } else {
        match SimConfig::from_env() {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {}", err);
                eprintln!("Set it with: export POSTHOG_API_KEY=phc_...");
                return ExitCode::from(err.exit_code());
            }
        }
    };
    cli.apply(&mut config);

    if let Err(err) = config.validate() {
        eprintln!("Error: {}", err);
        return ExitCode::from(err.exit_code());
    }

    // Dry-run stdout carries only event lines.
    let console = Console::new(cli.dry_run);
    console.print(&banner(&config, cli.dry_run));

    let result = if cli.dry_run {
        run_simulation(&config, &mut StdoutClient::stdout())
    } else {
        match PostHogClient::from_config(&config) {
            Ok(mut client) => run_simulation(&config, &mut client),
            Err(err) => Err(err),
        }
    };

    match result {
        Ok(summary) => {
            if cli.json {
                match summary.to_json() {
                    Ok(json) => console.print(&json),
                    Err(err) => error!("Could not encode summary: {}", err),
                }
            } else {
                console.print(&format!("\n{}\n", summary.to_text()));
            }
            console.print(&format!(
                "Simulation complete. Data sent to {}.",
                destination(&config, cli.dry_run)
            ));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Simulation failed: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

/// Human-facing output: stdout normally, stderr during dry runs.
struct Console {
    to_stderr: bool,
}

impl Console {
    fn new(dry_run: bool) -> Self {
        Self { to_stderr: dry_run }
    }

    fn print(&self, text: &str) {
        if self.to_stderr {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

fn destination(config: &SimConfig, dry_run: bool) -> String {
    if dry_run {
        "stdout".to_string()
    } else {
        config.host.clone()
    }
}

fn banner(config: &SimConfig, dry_run: bool) -> String {
    let mut out = String::from("Daily Pulse - analytics traffic simulator\n");
    match (&config.api_key, dry_run) {
        (_, true) => out.push_str("  Mode:         dry run (nothing is sent)\n"),
        (Some(key), false) => out.push_str(&format!("  API key:      {}\n", mask_key(key))),
        (None, false) => {}
    }
    out.push_str(&format!("  Host:         {}\n", config.host));
    match config.new_users {
        NewUserCount::Fixed(n) => out.push_str(&format!("  New users:    {}\n", n)),
        NewUserCount::Between(low, high) => {
            out.push_str(&format!("  New users:    {}-{}\n", low, high))
        }
    }
    out.push_str(&format!("  Pool size:    {}\n", config.returning_pool_size));
    out.push_str(&format!("  Window:       {}h\n", config.window_hours));
    if let Some(seed) = config.seed {
        out.push_str(&format!("  Seed:         {}\n", seed));
    }
    out
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(filter)
        .init();
}
