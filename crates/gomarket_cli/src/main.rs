//! Command-line driver for the cart core.
//!
//! # Responsibility
//! - Run one cart operation against a local database file and print the cart.
//! - Exercise the same load/mutate/persist path the mobile app uses.

use clap::{Parser, Subcommand};
use gomarket_core::{
    default_log_level, init_logging, CartSnapshot, CartStore, CartStoreConfig, ProductDescriptor,
    SqliteKeyValueStore, DEFAULT_PERSIST_KEY,
};
use rust_decimal::Decimal;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "gomarket", version, about = "Inspect and edit the local cart")]
struct Cli {
    /// Cart database file.
    #[arg(long, env = "GOMARKET_DB_PATH", default_value = "gomarket_cart.sqlite3")]
    db: PathBuf,
    /// Read and write `@GoMarketPlace:products` instead of the legacy split keys.
    #[arg(long)]
    unified_key: bool,
    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long)]
    log_dir: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the cart.
    List,
    /// Add one unit of a product.
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        price: Decimal,
    },
    /// Add one to a line's quantity.
    Increment { id: String },
    /// Subtract one from a line's quantity.
    Decrement { id: String },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = if cli.unified_key {
        CartStoreConfig::unified(DEFAULT_PERSIST_KEY)
    } else {
        CartStoreConfig::default()
    };
    let storage = Arc::new(SqliteKeyValueStore::open(&cli.db)?);
    let mut store = CartStore::open(storage, config)?;

    match cli.command {
        Command::List => {}
        Command::Add {
            id,
            title,
            image_url,
            price,
        } => store.add_to_cart(ProductDescriptor::new(id, title, image_url, price)),
        Command::Increment { id } => store.increment(&id),
        Command::Decrement { id } => store.decrement(&id),
    }

    print_cart(&store.snapshot());
    // Dropping the store waits for the background write.
    drop(store);
    Ok(())
}

fn print_cart(snapshot: &CartSnapshot) {
    if snapshot.is_empty() {
        println!("cart is empty");
        return;
    }
    for item in snapshot.products() {
        println!(
            "{}\t{}\tx{}\t{}\t{}",
            item.id,
            item.title,
            item.quantity,
            item.price,
            item.line_total()
        );
    }
    println!(
        "items={} quantity={} total={}",
        snapshot.len(),
        snapshot.total_quantity(),
        snapshot.total_price()
    );
}
