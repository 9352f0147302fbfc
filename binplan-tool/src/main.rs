mod commands;
mod config;
mod error;
mod render;

use std::path::PathBuf;

use binplan_client::{HttpLayoutService, PlacementEditor};
use binplan_core::{Cell, Size};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::commands::Context;
use crate::config::{load_config, resolve_connection, resolve_unit};

#[derive(Parser)]
#[command(name = "binplan")]
#[command(about = "Plan Gridfinity bin layouts in storage units", long_about = None)]
struct Cli {
    /// Base URL of the inventory API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (default: ~/.config/binplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage unit to work on
    #[arg(short, long, global = true)]
    unit: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the grid and its placements
    Show,

    /// List items not yet placed in the unit
    Unplaced {
        /// Only items whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Place an item with its top-left corner at a cell
    Place {
        #[arg(long)]
        item: String,
        x: u32,
        y: u32,
        /// Width in grid units (default: recommendation or 1)
        #[arg(long)]
        width: Option<u32>,
        /// Depth in grid units (default: recommendation or 1)
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Move a placement, keeping its size
    Move { placement: String, x: u32, y: u32 },

    /// Resize a placement, keeping its origin
    Resize {
        placement: String,
        width: u32,
        depth: u32,
    },

    /// Delete a placement
    Delete { placement: String },

    /// Let the server lay out items and place them
    AutoLayout {
        /// Items to place (default: every unplaced item)
        #[arg(long = "item")]
        items: Vec<String>,

        /// Print the suggestions without placing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show bin size recommendations
    Recommend {
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },

    /// List preset sizes that fit at a cell
    Sizes {
        x: u32,
        y: u32,
        /// Ignore this placement when checking overlap
        #[arg(long)]
        placement: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,binplan_client=info,binplan_tool=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let connection = resolve_connection(cli.api_url, &config)?;
    let unit = resolve_unit(cli.unit, &config)?;
    info!(api = %connection.api_url, unit = %unit, "Connecting");

    let mut service = HttpLayoutService::new(connection.api_url);
    if let Some(token) = connection.api_token {
        service = service.with_token(token);
    }
    let ctx = Context {
        editor: PlacementEditor::new(service, unit),
        unit_mm: config.grid.unit_mm,
    };

    match cli.command {
        Command::Show => ctx.show().await?,
        Command::Unplaced { search } => ctx.unplaced(search).await?,
        Command::Place {
            item,
            x,
            y,
            width,
            depth,
        } => ctx.place(&item, Cell::new(x, y), width, depth).await?,
        Command::Move { placement, x, y } => ctx.move_to(&placement, Cell::new(x, y)).await?,
        Command::Resize {
            placement,
            width,
            depth,
        } => ctx.resize(&placement, Size::new(width, depth)).await?,
        Command::Delete { placement } => ctx.delete(&placement).await?,
        Command::AutoLayout { items, dry_run } => ctx.auto_layout(items, dry_run).await?,
        Command::Recommend { items } => ctx.recommend(items).await?,
        Command::Sizes { x, y, placement } => ctx.sizes(Cell::new(x, y), placement).await?,
    }

    Ok(())
}
