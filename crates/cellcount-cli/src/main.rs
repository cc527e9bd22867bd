use anyhow::Result;
use cellcount_core::counting::{CountKind, CountTarget, CountingMode};
use cellcount_core::volume::{VolumeField, VolumePreset};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;

use commands::session::Edit;

#[derive(Parser)]
#[command(name = "cellcount")]
#[command(about = "Yeast cell counting - dilution, concentration and viability", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current session and its results
    Status,
    /// Set the sample identifier
    Sample { id: String },
    /// Set the must density (blank clears it)
    Density {
        #[arg(default_value = "")]
        value: String,
    },
    /// Set one preparation volume from text
    Volume {
        field: VolumeField,
        #[arg(default_value = "")]
        text: String,
    },
    /// Apply a stock dilution protocol
    Preset { preset: VolumePreset },
    /// Switch between the 5-square and 13-square protocols
    Mode {
        #[arg(value_parser = parse_mode)]
        squares: CountingMode,
    },
    /// Add to (or subtract from) a tally
    Count {
        target: CountTarget,
        kind: CountKind,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Overwrite a tally from typed text
    Set {
        target: CountTarget,
        kind: CountKind,
        #[arg(default_value = "")]
        text: String,
    },
    /// Mark a square as examined without changing its counts
    Review { target: CountTarget },
    /// Discard the current session and start over
    NewSample {
        #[arg(long)]
        yes: bool,
    },
    /// Validate the session and append it to the history
    Save,
    /// Saved counts
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Stateless dilution and concentration calculator
    Calc(commands::calc::CalcArgs),
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved records, newest first
    List,
    /// Delete one record
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Delete every record
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

fn parse_mode(value: &str) -> Result<CountingMode, String> {
    let squares: u8 = value
        .trim()
        .parse()
        .map_err(|_| format!("expected 5 or 13, got '{}'", value))?;
    CountingMode::try_from(squares)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Status => commands::session::status().await?,
        Commands::Sample { id } => commands::session::edit(Edit::SampleId(id)).await?,
        Commands::Density { value } => commands::session::edit(Edit::Density(value)).await?,
        Commands::Volume { field, text } => {
            commands::session::edit(Edit::Volume(field, text)).await?
        }
        Commands::Preset { preset } => commands::session::edit(Edit::Preset(preset)).await?,
        Commands::Mode { squares } => commands::session::edit(Edit::Mode(squares)).await?,
        Commands::Count {
            target,
            kind,
            delta,
        } => commands::session::edit(Edit::Increment(target, kind, delta)).await?,
        Commands::Set { target, kind, text } => {
            commands::session::edit(Edit::Direct(target, kind, text)).await?
        }
        Commands::Review { target } => commands::session::edit(Edit::Review(target)).await?,
        Commands::NewSample { yes } => commands::session::new_sample(yes).await?,
        Commands::Save => commands::history::save().await?,
        Commands::History { action } => match action {
            HistoryAction::List => commands::history::list().await?,
            HistoryAction::Delete { id, yes } => commands::history::delete(&id, yes).await?,
            HistoryAction::Clear { yes } => commands::history::clear(yes).await?,
        },
        Commands::Calc(args) => commands::calc::run(&args),
    }

    Ok(())
}
