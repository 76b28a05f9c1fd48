//! Ordo CLI
//!
//! Drives the Ordering Engine against a SQLite database file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ordo_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "ordo")]
#[command(about = "Ordo - positional ordering of sibling records", long_about = None)]
struct Cli {
    /// SQLite database file (created and migrated on first use)
    #[arg(long, global = true, default_value = "ordo.db")]
    db: PathBuf,

    /// Engine configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sibling family to operate on
    #[arg(long, global = true, default_value = "lines")]
    family: String,

    /// Human-readable debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Register or remove parents
    Parent(commands::parent::ParentArgs),
    /// Create a record under a parent
    Create(commands::record::CreateArgs),
    /// Move a record to a new position
    Move(commands::record::MoveArgs),
    /// Release a record, leaving its slot free
    Release(commands::record::ReleaseArgs),
    /// Renumber a parent's records to 1..N
    Reindex(commands::inspect::ParentRef),
    /// List a parent's records in order
    List(commands::inspect::ListArgs),
    /// Verify a parent's positions are unique and in range
    Check(commands::inspect::ParentRef),
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        init(Profile::Development);
    } else if std::env::var_os("RUST_LOG").is_some() {
        init(Profile::Production);
    }

    let result = commands::Context::open(&cli.db, cli.config.as_deref(), &cli.family).and_then(
        |ctx| match cli.command {
            Commands::Parent(args) => commands::parent::execute(&ctx, args),
            Commands::Create(args) => commands::record::execute_create(&ctx, args),
            Commands::Move(args) => commands::record::execute_move(&ctx, args),
            Commands::Release(args) => commands::record::execute_release(&ctx, args),
            Commands::Reindex(args) => commands::inspect::execute_reindex(&ctx, args),
            Commands::List(args) => commands::inspect::execute_list(&ctx, args),
            Commands::Check(args) => commands::inspect::execute_check(&ctx, args),
        },
    );

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
