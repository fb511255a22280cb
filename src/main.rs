use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storefront::application::cart_validator::CartValidator;
use storefront::application::checkout::CheckoutIntentBuilder;
use storefront::application::order_poller::OrderPoller;
use storefront::application::order_polling::{
    DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, PollingConfig,
};
use storefront::domain::cart::CatalogItem;
use storefront::domain::checkout::validate_claims;
use storefront::domain::money::Money;
use storefront::domain::order::{Order, SessionId};
use storefront::domain::ports::{CatalogLookupRef, OrderLookupRef};
use storefront::domain::pricing::{FlatRateShipping, FlatRateTax};
use storefront::infrastructure::in_memory::{InMemoryCatalog, InMemoryOrderStore};
#[cfg(feature = "storage-rocksdb")]
use storefront::infrastructure::rocksdb::RocksDBStore;
use storefront::infrastructure::simulated_payments::SimulatedPaymentAuthority;
use storefront::interfaces::csv::catalog_reader::CatalogReader;
use storefront::interfaces::fixtures;
use storefront::interfaces::http::client::HttpOrderClient;
use storefront::interfaces::http::{self, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the checkout API
    Serve(ServeArgs),
    /// Validate a cart file against the catalog and print the priced cart
    Validate(ValidateArgs),
    /// Poll a running server until the order for a session is settled
    Poll(PollArgs),
}

#[derive(Args)]
struct StorageArgs {
    /// Catalog seed CSV (item_id,title,price,stock,slug)
    #[arg(long, env = "STOREFRONT_CATALOG")]
    catalog: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "STOREFRONT_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Args)]
struct ShippingArgs {
    /// Flat shipping rate charged on every valid cart
    #[arg(long, env = "STOREFRONT_FLAT_SHIPPING", default_value = "5.00")]
    flat_shipping: Decimal,

    /// Subtotal at or above which shipping is free
    #[arg(long, env = "STOREFRONT_FREE_SHIPPING_OVER")]
    free_shipping_over: Option<Decimal>,
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    storage: StorageArgs,

    #[command(flatten)]
    shipping: ShippingArgs,

    /// Orders seed file (JSON array)
    #[arg(long, env = "STOREFRONT_ORDERS")]
    orders: Option<PathBuf>,

    #[arg(long, env = "STOREFRONT_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// Tax rate applied by the simulated payment authority, e.g. 0.08
    #[arg(long, env = "STOREFRONT_TAX_RATE", default_value = "0.00")]
    tax_rate: Decimal,

    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "usd")]
    currency: String,
}

#[derive(Args)]
struct ValidateArgs {
    #[command(flatten)]
    storage: StorageArgs,

    #[command(flatten)]
    shipping: ShippingArgs,

    /// Cart file: {"items": [...]}
    cart: PathBuf,
}

#[derive(Args)]
struct PollArgs {
    #[arg(long, env = "STOREFRONT_BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,

    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    #[arg(long, default_value_t = DEFAULT_INITIAL_DELAY.as_millis() as u64)]
    initial_delay_ms: u64,

    session_id: SessionId,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Validate(args) => validate(args).await,
        Command::Poll(args) => poll(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let (catalog, orders) = open_stores(&args.storage, args.orders.as_deref()).await?;

    let validator = Arc::new(CartValidator::new(catalog, shipping_policy(&args.shipping)?));
    let payments = Arc::new(SimulatedPaymentAuthority::new(
        Arc::new(FlatRateTax {
            rate: args.tax_rate,
        }),
        args.currency,
    ));
    let checkout = Arc::new(CheckoutIntentBuilder::new(validator.clone(), payments));

    let app = http::router(AppState {
        validator,
        checkout,
        orders,
    });

    info!("Binding to {}", args.bind);
    let listener = TcpListener::bind(&args.bind).await.into_diagnostic()?;
    http::serve(listener, app).await.into_diagnostic()
}

async fn validate(args: ValidateArgs) -> Result<()> {
    let (catalog, _) = open_stores(&args.storage, None).await?;
    let validator = CartValidator::new(catalog, shipping_policy(&args.shipping)?);

    let request = fixtures::read_cart(File::open(&args.cart).into_diagnostic()?).into_diagnostic()?;
    let claims = validate_claims(&request.items).map_err(|errors| {
        let details = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        miette::miette!("Invalid cart data: {details}")
    })?;

    let cart = validator.validate_cart(&claims, None).await.into_diagnostic()?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &cart).into_diagnostic()?;
    writeln!(stdout).into_diagnostic()?;
    Ok(())
}

async fn poll(args: PollArgs) -> Result<()> {
    let source = Arc::new(HttpOrderClient::new(args.base_url));
    let config = PollingConfig {
        max_attempts: args.max_attempts,
        initial_delay: Duration::from_millis(args.initial_delay_ms),
    };

    let state = OrderPoller::poll_until_settled(source, config, args.session_id).await;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &state).into_diagnostic()?;
    writeln!(stdout).into_diagnostic()?;
    Ok(())
}

fn shipping_policy(args: &ShippingArgs) -> Result<Arc<FlatRateShipping>> {
    let mut policy = FlatRateShipping::new(Money::new(args.flat_shipping).into_diagnostic()?);
    if let Some(threshold) = args.free_shipping_over {
        policy = policy.with_free_shipping_over(Money::new(threshold).into_diagnostic()?);
    }
    Ok(Arc::new(policy))
}

fn read_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    let reader = CatalogReader::new(File::open(path).into_diagnostic()?);
    let mut items = Vec::new();
    for item in reader.items() {
        match item {
            Ok(item) => items.push(item),
            Err(e) => warn!(error = %e, "skipping catalog row"),
        }
    }
    Ok(items)
}

fn read_orders(path: Option<&Path>) -> Result<Vec<Order>> {
    match path {
        Some(path) => fixtures::read_orders(File::open(path).into_diagnostic()?).into_diagnostic(),
        None => Ok(Vec::new()),
    }
}

/// Seeds the stores and returns them as lookup ports.
async fn open_stores(
    storage: &StorageArgs,
    orders_seed: Option<&Path>,
) -> Result<(CatalogLookupRef, OrderLookupRef)> {
    let items = read_catalog(&storage.catalog)?;
    let orders = read_orders(orders_seed)?;

    if let Some(db_path) = &storage.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            for item in &items {
                store.put_item(item).into_diagnostic()?;
            }
            for order in &orders {
                store.put_order(order).into_diagnostic()?;
            }
            info!(path = %db_path.display(), "Using RocksDB storage");
            return Ok((Arc::new(store.clone()), Arc::new(store)));
        }

        #[cfg(not(feature = "storage-rocksdb"))]
        {
            let _ = db_path;
            warn!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
        }
    }

    let catalog = InMemoryCatalog::new();
    for item in items {
        catalog.insert(item).await;
    }
    let order_store = InMemoryOrderStore::new();
    for order in orders {
        order_store.insert(order).await;
    }
    info!(items = catalog.len().await, "Using in-memory storage");

    Ok((Arc::new(catalog), Arc::new(order_store)))
}
