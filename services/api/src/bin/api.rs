//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{credentials::hash_password, db::PgContentStore},
    config::Config,
    error::ApiError,
    web::{build_router, state::spawn_idle_sweeper, ApiDoc, AppState},
};
use axum::Router;
use site_core::domain::AdminCredentials;
use site_core::ports::ContentStore;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgContentStore::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Seed the Admin Account ---
    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        store
            .upsert_admin_credentials(AdminCredentials {
                username: username.clone(),
                password_hash: hash_password(password)?,
            })
            .await?;
        info!("Admin account '{}' is ready.", username);
    }

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(store, config.clone()));
    let _sweeper = spawn_idle_sweeper(app_state.chats.clone(), config.chat_idle_timeout);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(build_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
