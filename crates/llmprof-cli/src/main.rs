//! llmprof CLI - Command-line interface for llmprof
//!
//! Provides `llmprof list`, `llmprof add`, `llmprof use`, `llmprof test`, and
//! other commands for managing LLM provider profiles.

mod commands;
mod config;
mod logging;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use commands::probe::ModelsArgs;
use commands::profile::{AddArgs, EditArgs};
use config::{App, Settings, SettingsArgs};

#[derive(Parser)]
#[command(name = "llmprof")]
#[command(about = "llmprof - LLM provider profile manager")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List profiles
    List {
        /// Only show profiles matching this text
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show profile details
    Show {
        /// Profile name or ID
        profile: String,
        /// Print the API key in full
        #[arg(long)]
        reveal: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a profile
    Add(AddArgs),
    /// Change fields of a profile
    Edit(EditArgs),
    /// Delete a profile
    Remove {
        /// Profile name or ID
        profile: String,
    },
    /// Copy a profile under a new name
    Clone {
        /// Profile name or ID
        profile: String,
        /// Name for the copy (defaults to "<name> (copy)")
        #[arg(long)]
        name: Option<String>,
    },
    /// Make a profile the active one
    Use {
        /// Profile name or ID
        profile: String,
    },
    /// Show the active profile
    Active {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all profiles as a JSON bundle
    Export {
        /// Output file (prints to stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Import profiles from a JSON bundle
    Import {
        /// Bundle file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the models a provider offers
    Models(ModelsArgs),
    /// Test a profile's connection to its provider
    Test {
        /// Profile name or ID
        profile: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::resolve(&cli.settings)?;
    let app = App::open(settings)?;

    match cli.command {
        Commands::List { search, json } => commands::profile::list(&app, search.as_deref(), json),
        Commands::Show {
            profile,
            reveal,
            json,
        } => commands::profile::show(&app, &profile, reveal, json),
        Commands::Add(args) => commands::profile::add(&app, args),
        Commands::Edit(args) => commands::profile::edit(&app, &args),
        Commands::Remove { profile } => commands::profile::remove(&app, &profile),
        Commands::Clone { profile, name } => commands::profile::clone(&app, &profile, name),
        Commands::Use { profile } => commands::profile::activate(&app, &profile),
        Commands::Active { json } => commands::profile::active(&app, json),
        Commands::Export { output } => commands::bundle::export(&app, output.as_deref()),
        Commands::Import { file, json } => commands::bundle::import(&app, &file, json),
        Commands::Models(args) => commands::probe::models(&app, args),
        Commands::Test { profile, json } => commands::probe::test(&app, &profile, json),
    }
}
