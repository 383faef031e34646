use std::sync::Arc;

use anyhow::{Context, Result};
use domain::ports::{BathroomStore, IdentityProvider, UserStore};
use persistence::{BathroomRepository, InMemoryStore, UserRepository};
use tracing::{info, warn};

use bathroom_api::app::{self, AppState};
use bathroom_api::config::{Config, StorageBackend};
use bathroom_api::middleware;
use bathroom_api::services::GoogleIdentityProvider;

type Stores = (Arc<dyn BathroomStore>, Arc<dyn UserStore>);

async fn build_stores(config: &Config) -> Result<Stores> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let db_config = persistence::db::DatabaseConfig::from(&config.database);
            let pool = persistence::db::create_pool(&db_config)
                .await
                .context("Failed to connect to PostgreSQL")?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            Ok((
                Arc::new(BathroomRepository::new(pool.clone())),
                Arc::new(UserRepository::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store; data will not survive a restart");
            let store = Arc::new(InMemoryStore::new());
            Ok((store.clone(), store))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Bathroom Finder API v{}", env!("CARGO_PKG_VERSION"));

    let (bathrooms, users) = build_stores(&config).await?;

    let identity: Arc<dyn IdentityProvider> =
        Arc::new(GoogleIdentityProvider::new(&config.oauth.google_client_id)?);

    // Start server
    let addr = config.socket_addr();
    let state = AppState::new(config, bathrooms, users, identity)?;
    let app = app::create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
