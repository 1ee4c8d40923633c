//! Item commands
//!
//! Usage:
//!   navtree item add <NAVIGATION> <LABEL> [--parent <ID>] [--position <N>] [--type <T>] [--url <URL>]
//!   navtree item move <ID> [--parent <ID>] [--position <N>]
//!   navtree item remove <ID>
//!   navtree item enable <ID>
//!   navtree item disable <ID>

use clap::{Args, Subcommand};

use navtree_core::model::{ItemFactory, ItemKind, KindItemFactory};
use navtree_core::ops::closure_ops::{move_item, remove_tree};
use navtree_core::ops::navigation_ops::{add_item, set_item_enabled};
use navtree_core::UnitOfWork;

use crate::context::{navigation_by_code, CliResult, Context};

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemCommand,
}

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// Add an item to a navigation; prints the new item id
    Add(AddArgs),
    /// Move an item (and its subtree) under another parent
    Move(MoveArgs),
    /// Delete an item and its subtree
    Remove(ItemIdArgs),
    /// Show an item again
    Enable(ItemIdArgs),
    /// Hide an item and its subtree from rendering
    Disable(ItemIdArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Navigation code
    pub navigation: String,

    pub label: String,

    /// Parent item id (default: top level)
    #[arg(long)]
    pub parent: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub position: u32,

    /// Registered item type
    #[arg(long = "type", default_value = ItemKind::TEXT)]
    pub item_type: String,

    /// Link target; implies `--type link`
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub item_id: String,

    /// New parent item id (default: top level)
    #[arg(long)]
    pub parent: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub position: u32,
}

#[derive(Debug, Args)]
pub struct ItemIdArgs {
    pub item_id: String,
}

pub fn execute(ctx: &Context, args: ItemArgs) -> CliResult {
    match args.command {
        ItemCommand::Add(add_args) => execute_add(ctx, add_args),
        ItemCommand::Move(move_args) => execute_move(ctx, move_args),
        ItemCommand::Remove(id_args) => execute_remove(ctx, id_args),
        ItemCommand::Enable(id_args) => execute_set_enabled(ctx, id_args, true),
        ItemCommand::Disable(id_args) => execute_set_enabled(ctx, id_args, false),
    }
}

fn execute_add(ctx: &Context, args: AddArgs) -> CliResult {
    let mut store = ctx.open_store()?;
    let registry = ctx.registry()?;
    let navigation = navigation_by_code(&store, &args.navigation)?;

    let link_factory;
    let factory: &dyn ItemFactory = match args.url {
        Some(url) => {
            // Fail on a configuration without links
            registry.factory(ItemKind::LINK)?;
            link_factory = KindItemFactory::new(ItemKind::Link { url });
            &link_factory
        }
        None => registry.factory(&args.item_type)?,
    };

    let item = add_item(
        &mut store,
        &ctx.hook(),
        factory,
        &navigation.id,
        &args.label,
        args.parent.as_deref(),
        args.position,
    )?;

    println!("{}", item.id);
    Ok(())
}

fn execute_move(ctx: &Context, args: MoveArgs) -> CliResult {
    let mut store = ctx.open_store()?;
    move_item(
        &mut store,
        &ctx.hook(),
        &args.item_id,
        args.parent.as_deref(),
        args.position,
    )?;
    store.flush()?;

    println!("✓ Moved {}", args.item_id);
    Ok(())
}

fn execute_remove(ctx: &Context, args: ItemIdArgs) -> CliResult {
    let mut store = ctx.open_store()?;
    remove_tree(&mut store, &ctx.hook(), &args.item_id)?;
    store.flush()?;

    println!("✓ Removed {}", args.item_id);
    Ok(())
}

fn execute_set_enabled(ctx: &Context, args: ItemIdArgs, enabled: bool) -> CliResult {
    let mut store = ctx.open_store()?;
    set_item_enabled(&mut store, &ctx.hook(), &args.item_id, enabled)?;

    println!(
        "✓ {} {}",
        if enabled { "Enabled" } else { "Disabled" },
        args.item_id
    );
    Ok(())
}
