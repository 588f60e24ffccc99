//! RocketStore CLI
//!
//! Command-line interface for a RocketStore storage area.

use clap::{Parser, Subcommand, ValueEnum};
use rocketstore::{Config, Engine, GetOptions, Mode, NameCheck, Order, PostOptions};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// RocketStore CLI
#[derive(Parser, Debug)]
#[command(name = "rocketstore-cli")]
#[command(about = "CLI for the RocketStore file-backed record store")]
#[command(version)]
struct Args {
    /// Storage area directory
    #[arg(short, long, default_value_os_t = Config::default().storage_area)]
    storage_area: std::path::PathBuf,

    /// Accept any safe path segment as a collection name
    #[arg(long)]
    relaxed_names: bool,

    /// Do not take lock markers around sequence updates
    #[arg(long)]
    no_lock: bool,

    /// Lock retry interval in milliseconds
    #[arg(long, default_value = "13")]
    lock_retry_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert or overwrite a record
    Post {
        /// Collection name
        collection: String,

        /// Record as JSON (anything unparseable is stored as a string)
        record: String,

        /// Record key; generated from the collection sequence when empty
        #[arg(short, long, default_value = "")]
        key: String,

        /// Prefix the key with the next sequence number
        #[arg(long)]
        auto_inc: bool,

        /// Prefix the key with a GUID
        #[arg(long)]
        guid: bool,
    },

    /// Get records by key or wildcard pattern
    Get {
        /// Collection name (empty lists the storage area)
        #[arg(default_value = "")]
        collection: String,

        /// Key or pattern (`*`, `?`)
        #[arg(default_value = "")]
        key: String,

        /// Return keys only
        #[arg(long, conflicts_with = "count")]
        keys: bool,

        /// Return the count only
        #[arg(long)]
        count: bool,

        /// Sort keys
        #[arg(long, value_enum)]
        order: Option<SortOrder>,
    },

    /// Delete records, a collection, or the whole store
    #[command(alias = "delete")]
    Del {
        /// Collection name (empty deletes everything)
        #[arg(default_value = "")]
        collection: String,

        /// Key or pattern
        #[arg(default_value = "")]
        key: String,
    },

    /// Bump and print a sequence
    #[command(alias = "sequence")]
    Seq {
        /// Sequence name
        name: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortOrder {
    Asc,
    Desc,
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,rocketstore=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .storage_area(&args.storage_area)
        .lock_files(!args.no_lock)
        .lock_retry_interval_ms(args.lock_retry_ms)
        .name_check(if args.relaxed_names {
            NameCheck::Relaxed
        } else {
            NameCheck::Strict
        })
        .build();

    let engine = match Engine::open(config).await {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&engine, args.command).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(engine: &Engine, command: Commands) -> rocketstore::Result<()> {
    match command {
        Commands::Post {
            collection,
            record,
            key,
            auto_inc,
            guid,
        } => {
            let record: Value = serde_json::from_str(&record).unwrap_or(Value::String(record));
            let options = PostOptions::new().auto_increment(auto_inc).guid(guid);
            print_json(&engine.post(&collection, &key, &record, options).await?);
        }
        Commands::Get {
            collection,
            key,
            keys,
            count,
            order,
        } => {
            let mode = match (keys, count) {
                (true, _) => Mode::Keys,
                (_, true) => Mode::Count,
                _ => Mode::Read,
            };
            let order = match order {
                Some(SortOrder::Asc) => Order::Asc,
                Some(SortOrder::Desc) => Order::Desc,
                None => Order::None,
            };
            let options = GetOptions::new().mode(mode).order(order);
            print_json(&engine.get(&collection, &key, options).await?);
        }
        Commands::Del { collection, key } => {
            print_json(&engine.delete(&collection, &key).await?);
        }
        Commands::Seq { name } => {
            println!("{}", engine.sequence(&name).await?);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!("Failed to render result: {}", e),
    }
}
