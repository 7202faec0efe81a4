use tracing_subscriber::EnvFilter;

use phyto_api::app::{router, AppState};
use phyto_api::auth::TokenService;
use phyto_api::config::AppConfig;
use phyto_api::database::pool;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DB_DSN, TOKEN_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_new(format!("{},sqlx=warn", config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(environment = ?config.environment, "starting phyto-api");

    let db_pool = match pool::build_pool(&config.database) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "failed to configure database pool");
            std::process::exit(1);
        }
    };

    if let Err(e) = pool::ping(&db_pool).await {
        tracing::error!(error = %e, "database is unreachable");
        std::process::exit(1);
    }

    if let Err(e) = sqlx::migrate!().run(&db_pool).await {
        tracing::error!(error = %e, "migrations failed");
        std::process::exit(1);
    }

    let state = AppState::new(db_pool, TokenService::new(config.token.clone()));
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, addr = %bind_addr, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %bind_addr, "listening");

    let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(e) = serve.await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
