//! Deposit queue CLI binary
//!
//! Run with:
//! ```bash
//! cargo run -p queue-cli --bin deposit-queue -- --rpc-url http://localhost:8545 combined
//! ```

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Args as ClapArgs, Parser, Subcommand};
use queue_cli::render::{self, format_milliether};
use queue_cli::{resolve_nodes, NodeMap, Pager, PagerView};
use queue_core::{Lane, QueueEngine};
use queue_rpc::{RocketPoolClient, RpcConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "deposit-queue")]
#[command(about = "Show the Rocket Pool validator deposit queue")]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Execution layer RPC URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// RocketStorage contract address
    #[arg(long)]
    storage_address: Option<Address>,

    /// Entries per page
    #[arg(long)]
    page_size: Option<u64>,

    /// Let every read observe latest instead of pinning a request to one block
    #[arg(long)]
    no_pin: bool,

    /// Show megapool addresses instead of looking up node operators
    #[arg(long)]
    no_nodes: bool,

    /// Print pages as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Combined queue in processing order
    Combined(PageArgs),
    /// Express lane only
    Express(PageArgs),
    /// Standard lane only
    Standard(PageArgs),
    /// Queue cursor and lane lengths
    Status,
    /// Head of both lanes
    Summary {
        /// Entries shown per lane
        #[arg(long, default_value = "5")]
        limit: u64,
    },
}

#[derive(ClapArgs, Debug)]
struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value = "1", conflicts_with = "position")]
    page: u64,

    /// Jump to the page holding this 1-based queue position
    #[arg(long)]
    position: Option<u64>,
}

impl PageArgs {
    fn pager(&self, page_size: u64) -> Pager {
        let mut pager = Pager::new(page_size);
        match self.position {
            Some(position) => pager.jump_to_position(position),
            None => pager.set_page_index(self.page.saturating_sub(1)),
        }
        pager
    }
}

fn load_config(args: &Args) -> anyhow::Result<RpcConfig> {
    let mut config = match &args.config {
        Some(path) => RpcConfig::load(path)?,
        None => RpcConfig::default(),
    };
    if let Some(url) = &args.rpc_url {
        config = config.with_rpc_url(url.clone());
    }
    if let Some(address) = args.storage_address {
        config = config.with_storage_address(address);
    }
    if let Some(page_size) = args.page_size {
        config = config.with_page_size(page_size);
    }
    if args.no_pin {
        config.engine = config.engine.with_pinned_reads(false);
    }
    config.validate()?;
    Ok(config)
}

async fn nodes_for(
    args: &Args,
    client: &RocketPoolClient,
    megapools: impl IntoIterator<Item = Address>,
    block: Option<u64>,
) -> NodeMap {
    if args.no_nodes {
        return NodeMap::new();
    }
    resolve_nodes(client, megapools, block).await
}

async fn show_combined(
    args: &Args,
    engine: &QueueEngine<RocketPoolClient>,
    page_args: &PageArgs,
    page_size: u64,
) -> anyhow::Result<()> {
    let mut pager = page_args.pager(page_size);
    let view = pager
        .load(|start, limit| engine.get_combined_page(start, limit))
        .await?;

    let PagerView::Page {
        page, page_index, ..
    } = view
    else {
        println!("Validator Queue is empty");
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let megapools = page.entries.iter().map(|t| t.entry.owner_address);
    let nodes = nodes_for(args, engine.ledger(), megapools, page.block).await;
    println!(
        "{}",
        render::page_header("Validator Queue", page_index, page_size, page.total_length)
    );
    print!("{}", render::render_combined_page(&page, &nodes));
    Ok(())
}

async fn show_lane(
    args: &Args,
    engine: &QueueEngine<RocketPoolClient>,
    lane: Lane,
    page_args: &PageArgs,
    page_size: u64,
) -> anyhow::Result<()> {
    let mut pager = page_args.pager(page_size);
    let view = pager
        .load(|start, limit| engine.get_lane_page(lane, start, limit))
        .await?;

    let PagerView::Page {
        page, page_index, ..
    } = view
    else {
        println!("{} is empty", lane.label());
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let megapools = page.entries.iter().map(|e| e.owner_address);
    let nodes = nodes_for(args, engine.ledger(), megapools, page.block).await;
    println!(
        "{}",
        render::page_header(lane.label(), page_index, page_size, page.total_length)
    );
    print!("{}", render::render_lane_page(&page, &nodes));
    Ok(())
}

async fn show_summary(
    args: &Args,
    engine: &QueueEngine<RocketPoolClient>,
    limit: u64,
) -> anyhow::Result<()> {
    let at = engine.read_point().await?;
    let (express, standard, status) = tokio::try_join!(
        engine.get_lane_page_at(Lane::Express, 0, limit, at),
        engine.get_lane_page_at(Lane::Standard, 0, limit, at),
        engine.status_at(at),
    )?;
    let cursor = status.cursor;

    if args.json {
        let summary = serde_json::json!({
            "block": status.block,
            "cursor": cursor,
            "express": express,
            "standard": standard,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let total = express.total_length + standard.total_length;
    if total == 0 {
        println!("Queue is empty.");
        return Ok(());
    }

    let megapools = express
        .entries
        .iter()
        .chain(standard.entries.iter())
        .map(|e| e.owner_address);
    let nodes = nodes_for(args, engine.ledger(), megapools, status.block).await;

    for page in [&express, &standard] {
        if page.total_length == 0 {
            continue;
        }
        println!(
            "{} {} ({})",
            render::lane_marker(page.lane),
            page.lane.label(),
            page.total_length
        );
        print!("{}", render::render_lane_page(page, &nodes));
        if page.total_length > limit {
            println!("...");
        }
    }

    println!(
        "Queue index {} (express rate {}), {} validators queued",
        cursor.queue_index, cursor.rate, total
    );
    if let Some(first) = express.entries.first().or(standard.entries.first()) {
        println!(
            "Bond {} of {} per validator",
            format_milliether(first.bond_amount),
            format_milliether(first.total_size)
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("queue_core=info".parse()?)
                .add_directive("queue_rpc=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let client = RocketPoolClient::connect(&config).await?;
    let engine = QueueEngine::with_config(client, config.engine.clone());
    let page_size = config.page_size;

    let result = match &args.command {
        Command::Combined(page_args) => show_combined(&args, &engine, page_args, page_size).await,
        Command::Express(page_args) => {
            show_lane(&args, &engine, Lane::Express, page_args, page_size).await
        }
        Command::Standard(page_args) => {
            show_lane(&args, &engine, Lane::Standard, page_args, page_size).await
        }
        Command::Status => {
            let status = engine.status().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print!("{}", render::render_status(&status));
            }
            Ok(())
        }
        Command::Summary { limit } => show_summary(&args, &engine, (*limit).max(1)).await,
    };

    if let Err(e) = &result {
        if e.downcast_ref::<queue_core::Error>()
            .is_some_and(queue_core::Error::is_defect)
        {
            tracing::error!(error = %e, "Queue accounting defect");
        }
    }
    result
}
