pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, redis::RedisHandle, state::AppState, telemetry};
use crate::services::ai_grading::GradingGateway;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let redis = RedisHandle::new(settings.redis().redis_url());
    if let Err(err) = redis.connect().await {
        tracing::error!(error = %err, "Failed to connect to Redis; auth rate limiting disabled");
    } else {
        tracing::info!("Redis connected successfully");
    }

    if settings.catalog().seed_on_startup {
        if let Err(err) = core::bootstrap::seed_catalog(&db_pool).await {
            tracing::error!(error = %format!("{err:#}"), "Failed to seed default catalog");
        }
    }

    let grader = GradingGateway::from_settings(&settings)?;
    let state = AppState::new(settings, db_pool, redis.clone(), grader);

    let app = api::router::app(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        api_prefix = %state.settings().api().prefix,
        "Code Coach API listening"
    );

    let result = axum::serve(
        listener,
        axum::ServiceExt::<axum::extract::Request>::into_make_service(app),
    )
    .with_graceful_shutdown(core::shutdown::shutdown_signal())
    .await;

    redis.disconnect().await;
    tracing::info!("Redis disconnected");

    result?;

    Ok(())
}
