use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vocab_practice_backend::{
    config::{get_config, init_config, LogFormat},
    database::pool::create_lazy_pool,
    routes, AppState,
};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let pool = create_lazy_pool(config)?;

    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(()) => info!("Database migrations applied"),
        Err(e) => tracing::error!(
            error = %e,
            "Could not apply migrations; sessions are served from memory until the database is back"
        ),
    }

    let app_state = AppState::new(pool, config);
    let app = routes::router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
