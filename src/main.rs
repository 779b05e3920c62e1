use anyhow::Context;
use forum_search::{
    analytics::{AnalyticsRecorder, InMemoryAnalyticsStore},
    api::{build_router, AppState},
    clock::{Clock, SystemClock},
    config::{Config, ObservabilityConfig},
    history::{SavedSearches, SearchHistory},
    metrics::{AtomicSearchMetrics, PrometheusSearchMetrics, SearchMetrics},
    search::{build_strategy, SearchService, SuggestionProvider},
    state::{create_store, MokaCacheBackend},
};
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("forum_search={},tower_http={}", observability.log_level, observability.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config.observability);
    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Metrics
    let registry = Arc::new(Registry::new());
    let metrics: Arc<dyn SearchMetrics> = if config.observability.prometheus_enabled {
        let metrics = PrometheusSearchMetrics::new(&registry).context("Failed to register search metrics")?;
        tracing::info!("✅ Prometheus metrics initialized");
        Arc::new(metrics)
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
        Arc::new(AtomicSearchMetrics::new())
    };

    // Forum data
    let store = create_store(&config.data).context("Failed to load forum data")?;
    tracing::info!("✅ Forum store initialized");

    let strategy = build_strategy(store.clone(), &config.search)
        .await
        .context("Failed to initialize search backend")?;
    tracing::info!("✅ Search backend initialized: {:?}", config.search.backend);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let analytics = Arc::new(AnalyticsRecorder::new(
        Arc::new(InMemoryAnalyticsStore::new()),
        clock.clone(),
        config.analytics.clone(),
    ));
    tracing::info!(
        enabled = config.analytics.enabled,
        inline = config.analytics.record_inline,
        "✅ Search analytics initialized"
    );

    let search = Arc::new(
        SearchService::builder(store.clone(), strategy)
            .clock(clock.clone())
            .metrics(metrics)
            .cache_backend(Arc::new(MokaCacheBackend::new(config.cache.max_capacity)))
            .cache_config(config.cache.clone())
            .search_config(config.search.clone())
            .analytics(analytics)
            .history(Arc::new(SearchHistory::new(clock.clone())))
            .build(),
    );
    tracing::info!("✅ Search service initialized");

    let state = AppState::new(
        search,
        Arc::new(SuggestionProvider::new(store)),
        Arc::new(SavedSearches::new(clock)),
        registry,
    );
    let app = build_router(state).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Search API: http://{}/api/search", http_addr);
    tracing::info!("   Metrics: http://{}/metrics", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutdown signal received");
    })
    .await
    .context("HTTP server error")?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
