//! Deleted Products
//!
//! Lists soft-deleted inventory products as a searchable, filterable, sortable
//! table and restores them. Can run one-shot (`list`, `restore`) or as an
//! interactive session that re-renders on every change.

use clap::{Args, Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv, InventoryApiConfig};
use domain_inventory::{
    DeletedItemsBrowser, HttpInventoryRepository, InventoryRepository, SortOption,
};
use eyre::{Result, eyre};
use tracing::{info, warn};

mod render;
mod session;

#[derive(Parser)]
#[command(name = "deleted-products")]
#[command(about = "Browse and restore soft-deleted inventory products")]
struct Cli {
    /// Inventory service base URL. Overrides INVENTORY_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the deleted products
    List {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Restore products by SKU, then print the refreshed list
    Restore {
        /// SKUs to restore, in order
        #[arg(required = true)]
        skus: Vec<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Interactive session reading commands from stdin
    Session,
}

#[derive(Args, Debug, Clone)]
struct ViewArgs {
    /// Case-insensitive name search
    #[arg(short, long, default_value = "")]
    search: String,

    /// Category filter (Gemstones, Jewelry, DropsBeads, Semimounts, Findings, clear)
    #[arg(short, long)]
    category: Option<String>,

    /// Sort option ("A to Z", "Z to A", "Lowest Price", "Highest Price")
    #[arg(long, default_value = "A to Z")]
    sort: String,

    /// Print rows as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let config = api_config(cli.api_url.as_deref())?;
    info!(base_url = %config.base_url, "Using inventory service");

    let browser = DeletedItemsBrowser::new(HttpInventoryRepository::new(config)?);

    match cli.command {
        Commands::List { view } => {
            browser.on_mount().await;
            apply_view_args(&browser, &view).await?;
            print!("{}", render_view(&browser, &view).await?);
        }

        Commands::Restore { skus, view } => {
            browser.on_mount().await;
            apply_view_args(&browser, &view).await?;

            let failed = restore_skus(&browser, &skus).await;
            if failed > 0 {
                warn!(failed, requested = skus.len(), "Some products were not restored");
            }
            print!("{}", render_view(&browser, &view).await?);
        }

        Commands::Session => session::run(browser).await?,
    }

    Ok(())
}

fn api_config(api_url: Option<&str>) -> Result<InventoryApiConfig> {
    let config = InventoryApiConfig::from_env()?;
    Ok(match api_url {
        Some(url) => InventoryApiConfig {
            timeout: config.timeout,
            ..InventoryApiConfig::new(url)
        },
        None => config,
    })
}

async fn apply_view_args<R: InventoryRepository>(
    browser: &DeletedItemsBrowser<R>,
    args: &ViewArgs,
) -> Result<()> {
    browser.set_search_term(args.search.clone()).await;

    if let Some(label) = &args.category {
        browser
            .select_category(label)
            .await
            .map_err(|e| eyre!("Unknown category '{}': {}", label, e))?;
    }

    if browser.select_sort(&args.sort).await == SortOption::Unordered {
        warn!(sort = %args.sort, "Unrecognized sort option, keeping filtered order");
    }
    Ok(())
}

async fn render_view<R: InventoryRepository>(
    browser: &DeletedItemsBrowser<R>,
    args: &ViewArgs,
) -> Result<String> {
    let rows = browser.rows();
    if args.json {
        return Ok(format!("{}\n", render::json(&rows)?));
    }
    Ok(format!(
        "{}\n{}",
        render::summary(&browser.query().await, rows.len()),
        render::table(&rows)
    ))
}

/// Restore each SKU in turn; returns how many did not complete
async fn restore_skus<R: InventoryRepository>(
    browser: &DeletedItemsBrowser<R>,
    skus: &[String],
) -> usize {
    let mut failed = 0;
    for sku in skus {
        if let Err(err) = browser.restore_by_sku(sku).await {
            warn!(sku = %sku, error = %err, "Restore did not complete");
            failed += 1;
        }
    }
    failed
}
