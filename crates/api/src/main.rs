use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use domain::services::{InMemoryStore, SubmissionStore};
use persistence::PgSubmissionStore;
use prize_wheel_api::{app, config, middleware};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Prize wheel campaign API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Print an argon2id PHC string for `admin.password_hash`.
    HashPassword {
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::HashPassword { password } => {
            println!("{}", shared::password::hash_password(&password)?);
            Ok(())
        }
    }
}

async fn serve() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Prize Wheel API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn SubmissionStore> = if config.database.in_memory {
        warn!("Using in-memory store; data is lost on restart");
        Arc::new(InMemoryStore::new())
    } else {
        let pool = persistence::db::create_pool(&(&config.database).into()).await?;

        info!("Running database migrations...");
        sqlx::migrate!("../persistence/src/migrations")
            .run(&pool)
            .await?;
        info!("Migrations completed");

        Arc::new(PgSubmissionStore::new(pool))
    };

    info!(
        auto_approve = config.campaign.auto_approve,
        segments = config.wheel.segments.len(),
        "Campaign configured"
    );

    let addr = config.socket_addr()?;
    let state = app::AppState::new(config, store)?;

    if let Some(limiter) = state.rate_limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                limiter.prune();
            }
        });
    }

    let app = app::build_router(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
