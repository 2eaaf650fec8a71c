use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_planner::api::router;
use study_planner::config::AppConfig;
use study_planner::services::{ScheduleCache, SessionSweeper};
use study_planner::state::{AppState, SessionRegistry};
use study_planner::store::{RestStore, ScheduleStore, SqliteStore};
use study_planner::toast::{DEFAULT_TOAST_CAPACITY, ToastQueue};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "study_planner=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let store: Arc<dyn ScheduleStore> = match &config.remote_store {
        Some(remote) => {
            info!("using hosted store at {}", remote.base_url);
            Arc::new(RestStore::new(remote.clone())?)
        }
        None => {
            info!("using local store at {}", config.database_url);
            Arc::new(SqliteStore::new(pool.clone()))
        }
    };

    let toast_ttl = config.toast_ttl;
    let toasts = Arc::new(SessionRegistry::new(move || {
        ToastQueue::new(toast_ttl, DEFAULT_TOAST_CAPACITY)
    }));

    let cache = Arc::new(ScheduleCache::new());

    let state = AppState {
        db: pool.clone(),
        store,
        cache: cache.clone(),
        toasts: toasts.clone(),
    };

    let sweeper = SessionSweeper::new(
        toasts,
        cache,
        config.sweep_interval_secs,
        config.cache_max_age_secs,
    );
    tokio::spawn(sweeper.start());

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
