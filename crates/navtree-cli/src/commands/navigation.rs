//! Navigation commands
//!
//! Usage:
//!   navtree navigation create <CODE> [--max-depth <N>] [--channel <C>]...
//!   navtree navigation build <CODE> --from <TAXON> [--include-root] [--max-depth <N>]
//!   navtree navigation render <CODE> [--channel <C>] [--output <FILE>]
//!   navtree navigation show <CODE>
//!   navtree navigation list

use clap::{Args, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;

use navtree_core::model::{ItemKind, KindItemFactory};
use navtree_core::ops::navigation_ops::create_navigation;
use navtree_core::render::export_tree;
use navtree_core::{build_from_taxon, ClosureStore};
use navtree_store::SqliteTaxonSource;

use crate::context::{navigation_by_code, CliResult, Context};

#[derive(Debug, Args)]
pub struct NavigationArgs {
    #[command(subcommand)]
    pub command: NavigationCommand,
}

#[derive(Debug, Subcommand)]
pub enum NavigationCommand {
    /// Create an empty navigation
    Create(CreateArgs),
    /// Rebuild a navigation from a taxonomy subtree
    Build(BuildArgs),
    /// Render a navigation as a Markdown list
    Render(RenderArgs),
    /// Print the item tree of a navigation as JSON
    Show(ShowArgs),
    /// List every navigation
    List,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    pub code: String,

    /// Render at most this many levels
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Restrict the navigation to a channel (repeatable)
    #[arg(long = "channel")]
    pub channels: Vec<String>,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    pub code: String,

    /// Taxon code to build from
    #[arg(long = "from")]
    pub taxon: String,

    /// Materialize the source taxon itself as the single root item
    #[arg(long)]
    pub include_root: bool,

    /// Number of levels to materialize
    #[arg(long)]
    pub max_depth: Option<u32>,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    pub code: String,

    #[arg(long)]
    pub channel: Option<String>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub code: String,
}

pub fn execute(ctx: &Context, args: NavigationArgs) -> CliResult {
    match args.command {
        NavigationCommand::Create(create_args) => execute_create(ctx, create_args),
        NavigationCommand::Build(build_args) => execute_build(ctx, build_args),
        NavigationCommand::Render(render_args) => execute_render(ctx, render_args),
        NavigationCommand::Show(show_args) => execute_show(ctx, show_args),
        NavigationCommand::List => execute_list(ctx),
    }
}

fn execute_create(ctx: &Context, args: CreateArgs) -> CliResult {
    let mut store = ctx.open_store()?;
    let channels: BTreeSet<String> = args.channels.into_iter().collect();

    // The hidden root is never rendered, so it doesn't need a registered type
    let navigation = create_navigation(
        &mut store,
        &KindItemFactory::new(ItemKind::Text),
        &args.code,
        args.max_depth,
        channels,
    )?;

    println!("✓ Created navigation {} ({})", navigation.code, navigation.id);
    Ok(())
}

fn execute_build(ctx: &Context, args: BuildArgs) -> CliResult {
    let mut store = ctx.open_store()?;
    let taxons = ctx.open_connection()?;
    let registry = ctx.registry()?;
    let navigation = navigation_by_code(&store, &args.code)?;

    build_from_taxon(
        &mut store,
        &ctx.hook(),
        &SqliteTaxonSource::new(&taxons),
        registry.factory(ItemKind::TAXON)?,
        &navigation.id,
        &args.taxon,
        args.include_root,
        args.max_depth,
    )?;

    let count = store.find_by_navigation(&navigation.id)?.len();
    println!(
        "✓ Built {} from {} ({} closure records)",
        navigation.code, args.taxon, count
    );
    Ok(())
}

fn execute_render(ctx: &Context, args: RenderArgs) -> CliResult {
    let store = ctx.open_store()?;
    let markdown = ctx
        .renderer()
        .render(&store, &args.code, args.channel.as_deref())?;

    if let Some(output_path) = args.output {
        std::fs::write(&output_path, markdown)?;
        println!("✓ Rendered to {}", output_path.display());
    } else {
        print!("{}", markdown);
    }

    Ok(())
}

fn execute_show(ctx: &Context, args: ShowArgs) -> CliResult {
    let store = ctx.open_store()?;
    let navigation = navigation_by_code(&store, &args.code)?;
    let tree = export_tree(&store, &navigation.id)?;

    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

fn execute_list(ctx: &Context) -> CliResult {
    let store = ctx.open_store()?;
    for navigation in store.list_navigations()? {
        println!(
            "{}\t{}\t{}",
            navigation.code,
            navigation.state.map(|s| s.as_str()).unwrap_or("idle"),
            if navigation.enabled { "enabled" } else { "disabled" }
        );
    }
    Ok(())
}
