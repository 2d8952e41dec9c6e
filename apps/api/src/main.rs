mod aggregation;
mod cache;
mod config;
mod db;
mod errors;
mod matching;
mod models;
mod queue;
mod recommendation;
mod routes;
mod sources;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::aggregation::aggregator::ParallelAggregator;
use crate::aggregation::LiveSearch;
use crate::cache::{InMemoryListingStore, ListingStore, RedisListingStore, ResultCache};
use crate::config::Config;
use crate::db::create_pool;
use crate::matching::KeywordMatchScorer;
use crate::queue::RecommendationQueue;
use crate::recommendation::{
    OpportunityCatalog, PgOpportunityCatalog, RecommendationEngine, StaticCatalog,
};
use crate::routes::build_router;
use crate::sources::apify::ApifyClient;
use crate::sources::build_adapters;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Result cache: Redis when configured, process memory otherwise
    let store: Arc<dyn ListingStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
            let manager = redis::aio::ConnectionManager::new(client)
                .await
                .context("Failed to connect to Redis")?;
            info!("Redis listing cache initialized");
            Arc::new(RedisListingStore::new(manager, config.cache.fallback))
        }
        None => {
            info!("REDIS_URL not set; using in-memory listing cache");
            Arc::new(InMemoryListingStore::with_retention(config.cache.fallback))
        }
    };

    // Internal opportunity catalog
    let catalog: Arc<dyn OpportunityCatalog> = match &config.database_url {
        Some(url) => Arc::new(PgOpportunityCatalog::new(create_pool(url).await?)),
        None => {
            info!("DATABASE_URL not set; internal opportunity catalog is empty");
            Arc::new(StaticCatalog::default())
        }
    };

    let adapters = build_adapters(
        &config.apify,
        Arc::new(ApifyClient::new()),
        &config.default_location,
    );
    let search = LiveSearch::new(
        ParallelAggregator::new(adapters, config.apify.platform_timeout),
        ResultCache::new(store, config.cache),
    );
    let engine = RecommendationEngine::new(
        search,
        catalog,
        Arc::new(KeywordMatchScorer::default()),
        config.default_location.clone(),
    )
    .with_app_base_url(config.app_base_url.clone());

    let queue = Arc::new(RecommendationQueue::new(
        Arc::new(engine),
        config.queue.clone(),
    ));
    queue.start();

    let app = build_router(AppState { queue })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
