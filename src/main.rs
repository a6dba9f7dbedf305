use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cosmos_event_store::{
    BoundedContextConfig, EventStoreRegistry, JsonSerializer, StoreMetrics, StoreOptions,
};

const BOUNDED_CONTEXT_VAR: &str = "COSMOS_EVENT_STORE_BOUNDED_CONTEXT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cosmos_event_store=debug")),
        )
        .init();

    tracing::info!("🚀 Bootstrapping Cosmos event store");

    // === 1. Load options from COSMOS_EVENT_STORE_* ===
    let options = StoreOptions::from_env()?;
    let bounded_context =
        std::env::var(BOUNDED_CONTEXT_VAR).unwrap_or_else(|_| "Elders".to_string());
    tracing::info!(bounded_context = %bounded_context, options = ?options, "Loaded store options");

    // === 2. Configure, provision and register ===
    let registry = Arc::new(EventStoreRegistry::new());
    let metrics = Arc::new(StoreMetrics::new()?);

    BoundedContextConfig::new(bounded_context.as_str(), registry.clone(), Arc::new(JsonSerializer))?
        .with_metrics(metrics.clone())
        .use_cosmos_event_store(|settings| {
            options.apply(settings)?;
            Ok(())
        })
        .await?;

    // === 3. Resolve what was registered ===
    let store = registry
        .resolve(&bounded_context)
        .ok_or_else(|| anyhow::anyhow!("no event store registered for {bounded_context}"))?;

    tracing::info!(
        bounded_context = %store.bounded_context(),
        collection = %store.collection(),
        connected = store.client().is_some(),
        "🎉 Event store ready"
    );
    tracing::debug!("Metrics:\n{}", metrics.encode_text()?);

    Ok(())
}
