//! MealCraft web frontend binary.

use clap::Parser;
use mealcraft_web::config::WebConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mealcraft_web", about = "MealCraft web frontend", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "WEB_BIND_ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,mealcraft_web=debug")),
        )
        .init();

    let args = Args::parse();
    let mut config = WebConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    info!(backend = %config.backend_api_base, "starting mealcraft_web");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "frontend listening");

    let app = mealcraft_web::router(mealcraft_web::WebState::new(config)?);

    let shutdown = CancellationToken::new();
    tokio::spawn(mealcraft_web::shutdown::wait_for_signal(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("shutdown complete");
    Ok(())
}

