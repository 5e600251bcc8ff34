use std::sync::Arc;

use planbook::config::AppConfig;
use planbook::state::AppState;
use planbook::store::postgres::PgStore;
use planbook::store::{GameStore, IdentityStore, StudyStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planbook=info,tower_http=info".into()),
        )
        .init();

    let config = Arc::new(AppConfig::from_env());
    tracing::info!("starting in {} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable is required")?;
    let store = Arc::new(PgStore::connect(&database_url, &config.database).await?);
    tracing::info!("database connected, migrations applied");

    let users: Arc<dyn IdentityStore> = store.clone();
    let games: Arc<dyn GameStore> = store.clone();
    let studies: Arc<dyn StudyStore> = store;

    let state = AppState {
        config: config.clone(),
        users,
        games,
        studies,
    };

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, planbook::app(state)).await?;
    Ok(())
}
