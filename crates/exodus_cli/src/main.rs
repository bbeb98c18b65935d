//! Colony simulation runner.
//!
//! # Usage
//!
//! ```bash
//! # Autoplay one game, text output
//! cargo run -p exodus_cli -- run --seed 7 --max-days 120
//!
//! # Same game as JSON lines
//! cargo run -p exodus_cli -- run --seed 7 --json
//!
//! # Balance run
//! cargo run -p exodus_cli -- batch --count 1000 --seed 0 --output results/batch.json
//!
//! # Validate a rules file
//! cargo run -p exodus_cli -- validate assets/rules/harsh.ron
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exodus_cli::{play, run_batch, BatchConfig, Format, Presenter, Strategy};
use exodus_core::prelude::*;

#[derive(Parser)]
#[command(name = "exodus")]
#[command(about = "Headless runner for the colony ship survival simulation")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Autoplay a single game and print every day
    Run {
        /// Random seed for world generation and events
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Stop after this many days
        #[arg(long, default_value = "365")]
        max_days: u32,

        /// RON rules file (canonical rules when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// RON strategy file (default planner when omitted)
        #[arg(long)]
        strategy: Option<PathBuf>,

        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Autoplay many seeds in parallel
    Batch {
        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// First seed; game i uses seed + i
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Day cap per game
        #[arg(long, default_value = "365")]
        max_days: u32,

        /// RON rules file (canonical rules when omitted)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Write full results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse and validate a RON rules file
    Validate {
        /// Rules file
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries reports
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run {
            seed,
            max_days,
            rules,
            strategy,
            json,
        } => cmd_run(seed, max_days, rules.as_deref(), strategy.as_deref(), json),
        Commands::Batch {
            count,
            seed,
            max_days,
            rules,
            output,
        } => cmd_batch(count, seed, max_days, rules.as_deref(), output.as_deref()),
        Commands::Validate { path } => cmd_validate(&path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn load_rules(path: Option<&Path>) -> std::result::Result<RuleSet, String> {
    match path {
        Some(path) => RuleSet::load(path).map_err(|e| e.to_string()),
        None => Ok(RuleSet::default()),
    }
}

fn cmd_run(
    seed: u64,
    max_days: u32,
    rules: Option<&Path>,
    strategy: Option<&Path>,
    json: bool,
) -> std::result::Result<(), String> {
    let rules = load_rules(rules)?;
    let strategy = match strategy {
        Some(path) => Strategy::load(path).map_err(|e| e.to_string())?,
        None => Strategy::default(),
    };
    let mut session = Session::new(rules, WorldConfig::default().with_seed(seed), seed)
        .map_err(|e| e.to_string())?;

    let format = if json { Format::Json } else { Format::Text };
    let stdout = std::io::stdout();
    let mut presenter = Presenter::new(stdout.lock(), format);
    presenter.start(&session).map_err(|e| e.to_string())?;

    let mut write_error = None;
    let record = play(&mut session, &strategy, max_days, |summary, session| {
        if write_error.is_none() {
            write_error = presenter.day(summary, session).err();
        }
    });
    if let Some(err) = write_error {
        return Err(err.to_string());
    }

    presenter
        .finished(record.outcome, record.days_played, session.rules().victory)
        .map_err(|e| e.to_string())
}

fn cmd_batch(
    count: u32,
    seed: u64,
    max_days: u32,
    rules: Option<&Path>,
    output: Option<&Path>,
) -> std::result::Result<(), String> {
    let config = BatchConfig::new(count)
        .with_seed(seed)
        .with_max_days(max_days)
        .with_rules(load_rules(rules)?);
    let results = run_batch(&config).map_err(|e| e.to_string())?;

    let s = results.summary;
    println!("Games:   {}", results.games.len());
    println!("Won:     {} ({:.1}%)", s.won, s.win_rate() * 100.0);
    println!("Lost:    {}", s.lost);
    println!("Ongoing: {}", s.ongoing);
    println!("Mean days played: {:.1}", s.mean_days);

    if let Some(path) = output {
        results.save(path).map_err(|e| e.to_string())?;
        tracing::info!("Results saved to {}", path.display());
    }
    Ok(())
}

fn cmd_validate(path: &Path) -> std::result::Result<(), String> {
    tracing::info!("Validating rules file: {}", path.display());
    let rules = RuleSet::load(path).map_err(|e| format!("Validation failed: {e}"))?;
    println!(
        "{}: OK ({} survivors, {} buildings, {} events, victory {:?})",
        path.display(),
        rules.starting_roster.len(),
        rules.buildings.len(),
        rules.events.entries().len(),
        rules.victory
    );
    Ok(())
}
