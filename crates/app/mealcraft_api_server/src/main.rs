//! MealCraft API server binary.
//!
//! Reads configuration from the environment (and `.env`), connects the user
//! store, and serves the REST API until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mealcraft_api::config::ApiConfig;
use mealcraft_core::completion::OpenAiClient;
use mealcraft_core::store::{MemoryUserStore, PgUserStore, UserStore};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI arguments for the API server. Flags override the environment.
#[derive(Parser, Debug)]
#[command(name = "mealcraft_api_server", about = "MealCraft API server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS")]
    max_connections: Option<u32>,

    /// Keep users in process memory instead of PostgreSQL. Registrations
    /// are lost on restart.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,mealcraft_api=debug,mealcraft_core=debug,tower_http=info",
                )
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        config.pg_connection_url = url;
    }
    if let Some(max) = args.max_connections {
        config.max_connections = max;
    }

    info!(?config, "starting mealcraft_api_server");

    let completions = OpenAiClient::new(config.openai.clone());
    if !completions.is_configured() {
        warn!("OPENAI_API_KEY is not set; query endpoints will report a misconfiguration");
    }

    let (users, pool): (Arc<dyn UserStore>, Option<PgPool>) = if args.in_memory {
        warn!("using in-memory user store");
        (Arc::new(MemoryUserStore::new()), None)
    } else {
        let pool = connect(&config).await?;
        info!("running database migrations");
        mealcraft_api::migrate(&pool).await?;
        (Arc::new(PgUserStore::new(pool.clone())), Some(pool))
    };

    let state = mealcraft_api::AppState::new(config.clone(), users, Arc::new(completions))?;
    let app = mealcraft_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    info!("shutdown complete");
    Ok(())
}

async fn connect(config: &ApiConfig) -> Result<PgPool, sqlx::Error> {
    let mut options: PgConnectOptions = config.pg_connection_url.parse()?;
    if let Some(name) = &config.database_name {
        options = options.database(name);
    }
    info!(
        max_connections = config.max_connections,
        database = config.database_name.as_deref().unwrap_or("<from url>"),
        "configuring connection pool"
    );
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
}

/// Cancel `token` on Ctrl-C or, on Unix, SIGTERM.
async fn wait_for_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
    token.cancel();
}
