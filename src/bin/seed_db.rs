use std::{
    error::Error,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;

use sales_dashboard::{
    DEFAULT_SEED_URL, SQLiteTransactionStore, SeedSource, initialize_db, seed_store,
};

/// A utility for filling a database for the sales_dashboard server with the seed dataset.
///
/// Any transactions already in the database are replaced.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database to seed. It is created if it does not exist.
    #[arg(long, short, env = "DATABASE_PATH")]
    db_path: String,

    /// The URL or file path of the dataset.
    #[arg(long, short, env = "SEED_SOURCE", default_value = DEFAULT_SEED_URL)]
    seed_source: SeedSource,
}

/// Create the database if needed and replace its transactions with the seed dataset.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);

    if db_path.extension().is_none_or(|extension| extension.is_empty()) {
        eprintln!("Database path must include a file extension (e.g., 'sales.db').");
        exit(1);
    }

    println!("Opening database at {db_path:#?}");
    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;
    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));

    println!("Loading transactions from {}...", args.seed_source);
    let client = reqwest::Client::new();
    let count = seed_store(Arc::new(store), &args.seed_source, &client).await?;

    println!("Success! Inserted {count} transactions.");

    Ok(())
}
