use std::{
    error::Error,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::{Parser, ValueEnum};
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, filter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use sales_dashboard::{
    AppState, DEFAULT_SEED_URL, InMemoryTransactionStore, PaginationConfig,
    SQLiteTransactionStore, SeedSource, SharedStore, build_router, graceful_shutdown,
    initialize_db,
};

/// Opens an in-memory SQLite database instead of a file.
const IN_MEMORY_DB_PATH: &str = ":memory:";

/// Which transaction store backs the server.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreKind {
    /// A SQLite database at `--db-path`.
    Sqlite,
    /// A store that lives in the server's memory and is lost on exit.
    Memory,
}

/// The REST API and dashboard server for sales_dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database, or ":memory:".
    #[arg(long, env = "DATABASE_PATH", default_value = "sales.db")]
    db_path: String,

    /// The transaction store to use.
    #[arg(long, env = "STORE", value_enum, default_value_t = StoreKind::Sqlite)]
    store: StoreKind,

    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// The URL or file path of the dataset loaded by `/api/v1/initialize-db`.
    #[arg(long, env = "SEED_SOURCE", default_value = DEFAULT_SEED_URL)]
    seed_source: SeedSource,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging()?;

    let args = Args::parse();
    let store = open_store(&args)?;

    let addr = SocketAddr::from((args.host, args.port));
    let app_state = AppState::new(store, args.seed_source, PaginationConfig::default())?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn open_store(args: &Args) -> Result<SharedStore, Box<dyn Error>> {
    let store: SharedStore = match args.store {
        StoreKind::Memory => {
            tracing::info!("Using the in-memory transaction store");
            Arc::new(InMemoryTransactionStore::new())
        }
        StoreKind::Sqlite if args.db_path == IN_MEMORY_DB_PATH => {
            tracing::info!("Using an in-memory SQLite database");
            Arc::new(SQLiteTransactionStore::open_in_memory()?)
        }
        StoreKind::Sqlite => {
            tracing::info!("Using the SQLite database at {}", args.db_path);
            let connection = Connection::open(&args.db_path)?;
            initialize_db(&connection)?;
            Arc::new(SQLiteTransactionStore::new(Arc::new(Mutex::new(connection))))
        }
    };

    Ok(store)
}

fn setup_logging() -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::DEBUG.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(env_filter),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
