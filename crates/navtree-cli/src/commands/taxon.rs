//! Taxonomy commands
//!
//! Usage: navtree taxon import <PATH>

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::context::{CliResult, Context};

#[derive(Debug, Args)]
pub struct TaxonArgs {
    #[command(subcommand)]
    pub command: TaxonCommand,
}

#[derive(Debug, Subcommand)]
pub enum TaxonCommand {
    /// Import a taxonomy seed file (or a directory of them)
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to seed YAML file or directory
    pub path: PathBuf,
}

pub fn execute(ctx: &Context, args: TaxonArgs) -> CliResult {
    match args.command {
        TaxonCommand::Import(import_args) => execute_import(ctx, import_args),
    }
}

fn execute_import(ctx: &Context, args: ImportArgs) -> CliResult {
    let mut conn = ctx.open_connection()?;

    let seed_files = if args.path.is_dir() {
        // Sorted for determinism
        let mut files: Vec<PathBuf> = std::fs::read_dir(&args.path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    } else {
        vec![args.path]
    };

    for seed_file in seed_files {
        println!("Importing {}...", seed_file.display());
        let report = navtree_store::seed::import_seed(&seed_file, &mut conn)?;
        println!(
            "✓ Imported {} taxons from {} (digest: {})",
            report.taxon_count,
            report.roots.join(", "),
            report.digest
        );
    }

    Ok(())
}
