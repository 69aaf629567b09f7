use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use rltr_api::{config::RltrConfig, create_app, tracing_setup};
use rltr_core::{Catalog, FilterQuery, Page, filter::parse_bound};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rltr", version, about = "Search and list RLTR record collections")]
struct Cli {
    /// Configuration file (defaults to $RLTR_CONFIG_PATH, then ./rltr.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of `<collection>.json` files replacing the built-in seeds
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List collections with their record counts
    Collections,
    /// Filter one collection and print the matching records as JSON
    Query(QueryArgs),
    /// Start the HTTP listing API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    collection: String,
    /// Free-text search
    #[arg(long, short, default_value = "")]
    q: String,
    /// Categorical constraint, repeatable
    #[arg(long = "where", value_name = "FIELD=VALUE", value_parser = parse_pair)]
    constraints: Vec<(String, String)>,
    /// Inclusive lower bound, repeatable
    #[arg(long = "min", value_name = "FIELD=VALUE", value_parser = parse_pair)]
    min: Vec<(String, String)>,
    /// Inclusive upper bound, repeatable
    #[arg(long = "max", value_name = "FIELD=VALUE", value_parser = parse_pair)]
    max: Vec<(String, String)>,
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long)]
    offset: Option<usize>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(field, value)| (field.trim().to_string(), value.to_string()))
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) = RltrConfig::load(cli.config.as_deref())?;
    let mut config = config.apply_env()?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data.data_dir = Some(dir);
    }
    tracing_setup::init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting RLTR");
    source.log();
    info!(
        host = %config.server.host,
        port = config.server.port,
        log_format = ?config.logging.format,
        "Resolved configuration"
    );
    let catalog = Catalog::load(config.data.data_dir.as_deref()).context("failed to seed catalog")?;

    match cli.command {
        Command::Collections => {
            for entry in catalog.entries() {
                println!("{:<14}{:>6}", entry.collection.name(), entry.store.len());
            }
            Ok(())
        }
        Command::Query(args) => run_query(&catalog, &config, args),
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(catalog, &config).await
        }
    }
}

fn run_query(catalog: &Catalog, config: &RltrConfig, args: QueryArgs) -> anyhow::Result<()> {
    let entry = catalog.resolve(&args.collection)?;

    let mut filter = FilterQuery::new(args.q);
    for (field, value) in args.constraints {
        filter = filter.with_constraint(field, value);
    }
    for (field, raw) in args.min {
        if let Some(bound) = parse_bound(&field, &raw)? {
            filter = filter.with_min(field, bound);
        }
    }
    for (field, raw) in args.max {
        if let Some(bound) = parse_bound(&field, &raw)? {
            filter = filter.with_max(field, bound);
        }
    }
    if args.limit == Some(0) {
        bail!("--limit must be at least 1");
    }

    let outcome = entry.search(&filter);
    let page = if args.limit.is_none() && args.offset.is_none() {
        Page { limit: outcome.len(), offset: 0 }
    } else {
        Page::new(args.limit, args.offset, config.page_limits())
    };
    let result = outcome.page(page);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn serve(catalog: Catalog, config: &RltrConfig) -> anyhow::Result<()> {
    let app = create_app(catalog, config)?;
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, prefix = %config.server.api_prefix, "RLTR listing API started");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("RLTR listing API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
