use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{self, SharedState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<SharedState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Relation field card
        .route(
            "/objects/:object/records/:record_id/relations/:field",
            get(handlers::get_relation_card::<S>),
        )
        .route(
            "/objects/:object/records/:record_id/relations/:field/candidates",
            get(handlers::list_candidates::<S>),
        )
        .route(
            "/objects/:object/records/:record_id/relations/:field/select",
            post(handlers::select_candidate::<S>),
        )
        // Shared record cache
        .route("/cache/records/:record_id", get(handlers::get_cached_record::<S>))
}
