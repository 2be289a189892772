//! Assessment Recommender — Binary Entrypoint
//! Loads config and catalog, builds the feature index once, then boots the
//! Axum HTTP server with the shared read-only recommender.

use assessment_recommender::{
    api::{self, AppState},
    config::RecommenderConfig,
    engine::Recommender,
    metrics::{self, Metrics},
    telemetry,
};
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let metrics = Metrics::init()
        .map_err(|e| warn!(error = %e, "metrics disabled"))
        .ok();

    let cfg = RecommenderConfig::from_env()?;
    info!(
        catalog = %cfg.catalog.path.display(),
        representation = %cfg.index.representation,
        "starting recommender"
    );

    // Index build is the initialization barrier: no requests until it finishes.
    let recommender = tokio::task::spawn_blocking(move || Recommender::from_config(&cfg))
        .await
        .map_err(|e| anyhow::anyhow!("index build task failed: {e}"))?;
    metrics::record_catalog_size(recommender.index().len());
    if recommender.index().is_empty() {
        warn!("catalog is empty; every search will return no results");
    }

    let mut router = api::create_router(AppState::new(recommender));
    if let Some(m) = &metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
