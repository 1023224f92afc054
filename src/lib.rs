pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{
    MutationKind, PickerCandidates, RecordCacheSynchronizer, RelationCardError, RelationCardView,
    RelationCardinality, RelationCardinalityResolver, RelationFetchPlan, RelationFieldCard,
    RelationLinkBuilder, RelationRecordFetcher, RelationSearchPicker, ResolvedRelation,
    SelectionDispatcher, SelectionMutation, SelectionOutcome, ViewAllLink, ViewAllLinkPolicy,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{InMemoryStore, RecordCache, Store};

use std::sync::Arc;

/// Build the application router over an in-memory store, seeding it when
/// configured to.
pub fn build_app(
    config: &crate::config::AppConfig,
) -> anyhow::Result<(axum::Router, Arc<api::AppState<InMemoryStore>>)> {
    let store = Arc::new(InMemoryStore::new());
    if config.load_seed_data {
        seed::load_seed_data(&store)?;
    } else {
        // Metadata is always registered so relation fields resolve
        for metadata in seed::demo_object_metadata() {
            store.register_object(metadata);
        }
    }

    let state = Arc::new(api::AppState::new(store, config.relation_card.clone()));
    let app = api::routes::create_router::<InMemoryStore>().with_state(Arc::clone(&state));
    Ok((app, state))
}

/// Load `.env` and configuration, set up logging and serve until shutdown
pub async fn run_server() -> anyhow::Result<()> {
    use env_logger::Builder;
    use log::LevelFilter;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("relation_card::logic", LevelFilter::Warn)
        .parse_default_env()
        .init();

    log::info!("relation-card: relation field service");

    let config = crate::config::AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{} seed={}",
        config.server.host,
        config.server.port,
        config.load_seed_data
    );

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("relation-card server running on http://{}", bind_address);

    serve(listener, &config).await
}

/// Build the app for `config` and serve it on an already bound listener
pub async fn serve(
    listener: tokio::net::TcpListener,
    config: &crate::config::AppConfig,
) -> anyhow::Result<()> {
    let (app, _state) = build_app(config)?;
    axum::serve(listener, app).await?;
    Ok(())
}
