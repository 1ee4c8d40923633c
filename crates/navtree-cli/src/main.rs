//! navtree CLI
//!
//! Command-line interface for navigation trees

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod context;

use context::Context;

#[derive(Debug, Parser)]
#[command(name = "navtree")]
#[command(about = "navtree - Closure-table navigation menus", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "navtree.toml")]
    config: PathBuf,

    /// Database file, overrides `database_path` from the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Taxonomy operations
    Taxon(commands::taxon::TaxonArgs),
    /// Navigation operations
    Navigation(commands::navigation::NavigationArgs),
    /// Item operations
    Item(commands::item::ItemArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = Context::load(&cli.config, cli.db).and_then(|ctx| {
        navtree_core::logging_facility::init(ctx.config.logging);
        match cli.command {
            Commands::Taxon(args) => commands::taxon::execute(&ctx, args),
            Commands::Navigation(args) => commands::navigation::execute(&ctx, args),
            Commands::Item(args) => commands::item::execute(&ctx, args),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
