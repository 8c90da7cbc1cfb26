use std::sync::Arc;

use kambaz_api::{ApiConfig, ApiState, middleware::cors::create_cors_layer};
use kambaz_db::postgres::PgStore;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    kambaz_api::tracing::init_tracing(&config.env);

    // Connect, migrate, and build the injected datastore
    let pool = kambaz_db::create_pool(&config.database_url).await?;
    kambaz_db::ensure_db_and_migrate(&config.database_url, &pool).await?;
    let state = ApiState::new(&config, Arc::new(PgStore::new(pool)));

    let cors = create_cors_layer(vec![config.client_url.clone()]);
    let app = kambaz_api::router::router()
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, client_url = %config.client_url, "server running");
    axum::serve(listener, app).await?;

    Ok(())
}
