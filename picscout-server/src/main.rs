use std::sync::Arc;

use clap::Parser;
use picscout_core::{AppConfig, ImageSearchClient, QueryLog};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use picscout_server::http;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "picscout.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match AppConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    if args.health {
        let pool = match picscout_core::db::create_pool(&config.database).await {
            Ok(p) => p,
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        };

        match picscout_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL health check failed: {}", e);
                std::process::exit(1);
            }
        }

        println!("✅ picscout DB health check passed");
        return Ok(());
    }

    // Search gateway — a missing API key is a startup failure
    let search = match ImageSearchClient::new(config.search.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create search client: {}", e);
            std::process::exit(1);
        }
    };

    // Query log — connected from a spawned task so the listener binds
    // immediately; requests before readiness fail with ConnectionNotReady
    let log = QueryLog::new();
    let init_log = log.clone();
    let db_config = config.database.clone();
    tokio::spawn(async move {
        if let Err(e) = init_log.initialize(&db_config).await {
            tracing::error!(error = %e, "query log initialization failed");
        }
    });

    // Shutdown signal
    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(http::HttpState {
        search,
        log: log.clone(),
    });
    http::start_http_server(state, &config.http, tx.subscribe()).await?;

    log.close().await;

    Ok(())
}
