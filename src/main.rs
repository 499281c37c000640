//! Community Hub - REST API server

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use community_hub::{
    config::{Args, LogFormat},
    db::{Collections, MongoClient, StoreBackend},
    server::{self, AppState},
    services::Services,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("community_hub={},info", args.log_level).into());
    let json = args.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    if let Err(e) = args.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Community Hub API v{}", env!("CARGO_PKG_VERSION"));
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Store: {}", args.store_backend);
    info!("MongoDB database: {}", args.mongodb_db);
    info!(
        "Admin API key: {}",
        if args.admin_api_key.is_some() { "configured" } else { "not set" }
    );
    info!("Max body: {} bytes", args.max_body_bytes);
    info!("======================================");

    let store = match args.store_backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store - data is lost on restart");
            Collections::in_memory()
        }
        StoreBackend::Mongo => match connect_mongo(&args).await {
            Ok(store) => {
                info!("MongoDB connected successfully");
                store
            }
            Err(e) if args.dev_mode => {
                warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                Collections::in_memory()
            }
            Err(e) => {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        },
    };

    let state = Arc::new(AppState::new(args, Services::new(store)));
    server::run(state).await?;

    info!("Community hub stopped");
    Ok(())
}

async fn connect_mongo(args: &Args) -> community_hub::Result<Collections> {
    let client = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;
    info!("Opening collections in database '{}'", client.db_name());
    Collections::mongo(&client).await
}
