use anyhow::Context;
use scorebook::{
    api, config::Config, db::init_db, BroadcastSink, ChannelBroadcaster, EngineContext,
    KeyValueCache, MemoryCache, RedisCache, Repository, ScoreCache, ScoreStore, ScoringEngine,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("configuration error")?;
    let port = config.port;

    let pool = init_db(&config.database_path)
        .await
        .context("failed to initialize database")?;
    let store: Arc<dyn ScoreStore> = Arc::new(Repository::new(pool));

    let backend = cache_backend(config.redis_url.as_deref()).await;
    let cache = ScoreCache::new(backend, config.cache_policy());
    let broadcaster: Arc<dyn BroadcastSink> = Arc::new(ChannelBroadcaster::default());

    let engine = ScoringEngine::new(EngineContext {
        store,
        cache,
        broadcaster,
        settings: config.engine_settings(),
    });

    let app = api::create_router(api::AppState::new(engine));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Redis when configured and reachable, otherwise the in-process cache.
async fn cache_backend(redis_url: Option<&str>) -> Arc<dyn KeyValueCache> {
    match redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, using in-process cache");
                Arc::new(MemoryCache::new())
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    }
}
