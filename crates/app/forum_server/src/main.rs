//! Forum HTTP server binary.
//!
//! Connects to PostgreSQL, applies migrations and serves the REST API until
//! Ctrl-C.

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use forum_api::config::ApiConfig;

/// CLI arguments for the forum server.
///
/// Anything not given here comes from the environment, see [`ApiConfig::from_env`].
#[derive(Parser, Debug)]
#[command(name = "forum_server", about = "Forum REST API server")]
struct Args {
    /// Port to listen on. Overrides the port of `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 10)]
    max_connections: u32,

    /// Production mode: marks the auth cookie `Secure`. Also set by `APP_ENV=production`.
    #[arg(long, default_value_t = false)]
    production: bool,

    /// Skip running embedded migrations at startup.
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,forum_api=debug,forum_core=debug")),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    config.secure_cookies |= args.production;

    info!(
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        production = config.secure_cookies,
        "starting forum_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    if args.skip_migrations {
        info!("skipping database migrations");
    } else {
        info!("running database migrations");
        forum_api::migrate(&pool).await?;
    }

    forum_api::services::auth::prime_dummy_hash().await;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let app = forum_api::router(forum_api::AppState::new(pool, config));

    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
