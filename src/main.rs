use axum::{extract::DefaultBodyLimit, routing::get, Router};
use process_core::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    middleware::{cors::cors_layer, rate_limit},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    let app_state = AppState::new(pool)?;

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = routes::api_routes().layer(axum::middleware::from_fn_with_state(
        rate_limit::RateLimiter::new(config.api_rps),
        rate_limit::rps_middleware,
    ));

    info!("Serving uploads from: {}", config.uploads_dir);

    let app = base_routes
        .merge(api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(app_state)
        .layer(cors_layer(&config.allowed_origins))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_upload_mb * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
