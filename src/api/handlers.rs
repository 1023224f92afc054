use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::RelationCardConfig;
use crate::logic::{
    MutationKind, RelationCardError, RelationCardView, RelationFieldCard, SearchFilterState,
};
use crate::model::{CandidateEntity, Id, Record};
use crate::store::traits::Store;
use crate::store::RecordCache;

/// Shared state handed to every handler
pub struct AppState<S: ?Sized> {
    pub store: Arc<S>,
    pub cache: Arc<RecordCache>,
    pub config: RelationCardConfig,
}

impl<S: ?Sized> AppState<S> {
    pub fn new(store: Arc<S>, config: RelationCardConfig) -> Self {
        Self {
            store,
            cache: Arc::new(RecordCache::new()),
            config,
        }
    }
}

pub type SharedState<S> = Arc<AppState<S>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl From<RelationCardError> for ApiError {
    fn from(error: RelationCardError) -> Self {
        match error {
            RelationCardError::ObjectNotFound(_) | RelationCardError::FieldNotFound { .. } => {
                ApiError::NotFound(error.to_string())
            }
            RelationCardError::NotARelation { .. } => ApiError::BadRequest(error.to_string()),
            RelationCardError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(message) => {
                log::error!("request failed: {}", message);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct RelationCardResponse {
    /// True when the target object cannot be displayed
    pub hidden: bool,
    #[serde(flatten)]
    pub view: Option<RelationCardView>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CandidateListResponse {
    pub items: Vec<CandidateEntity>,
    pub total: usize,
    pub loading: bool,
    pub search_filter: SearchFilterState,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub candidate_id: Option<Id>,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub picker_closed: bool,
    pub mutation: Option<MutationKind>,
}

async fn resolve_card<S: Store + 'static>(
    state: &AppState<S>,
    object: &str,
    record_id: &Id,
    field: &str,
) -> Result<RelationFieldCard<S>, ApiError> {
    let card = RelationFieldCard::resolve(
        Arc::clone(&state.store),
        Arc::clone(&state.cache),
        state.config.clone(),
        object,
        record_id,
        field,
    )
    .await?;

    if card.owning_record().await.is_none() {
        return Err(ApiError::NotFound(format!(
            "Record {} not found in {}",
            record_id, object
        )));
    }
    Ok(card)
}

pub async fn get_relation_card<S: Store + 'static>(
    State(state): State<SharedState<S>>,
    Path((object, record_id, field)): Path<(String, Id, String)>,
) -> Result<Json<RelationCardResponse>, ApiError> {
    let card = resolve_card(&state, &object, &record_id, &field).await?;
    let view = card.load().await;

    Ok(Json(RelationCardResponse {
        hidden: view.is_none(),
        view,
    }))
}

pub async fn list_candidates<S: Store + 'static>(
    State(state): State<SharedState<S>>,
    Path((object, record_id, field)): Path<(String, Id, String)>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<CandidateListResponse>, ApiError> {
    let card = resolve_card(&state, &object, &record_id, &field).await?;
    card.load().await;

    card.open_picker();
    card.set_search_filter(query.search.unwrap_or_default());
    let result = card.candidates().await;

    Ok(Json(CandidateListResponse {
        total: result.candidates.len(),
        items: result.candidates,
        loading: result.loading,
        search_filter: card.picker().search_filter(),
    }))
}

pub async fn select_candidate<S: Store + 'static>(
    State(state): State<SharedState<S>>,
    Path((object, record_id, field)): Path<(String, Id, String)>,
    RequestJson(request): RequestJson<SelectRequest>,
) -> Result<(StatusCode, Json<SelectResponse>), ApiError> {
    let card = resolve_card(&state, &object, &record_id, &field).await?;
    card.load().await;
    card.open_picker();

    let candidate = match request.candidate_id {
        Some(candidate_id) => {
            let target = &card.relation().target;
            let record = state
                .store
                .find_one_record(&target.name_singular, &candidate_id)
                .await?
                .ok_or_else(|| {
                    ApiError::NotFound(format!(
                        "Record {} not found in {}",
                        candidate_id, target.name_singular
                    ))
                })?;
            Some(CandidateEntity::from_record(&record, target))
        }
        None => None,
    };

    let outcome = card.select(candidate.as_ref());
    Ok((
        StatusCode::ACCEPTED,
        Json(SelectResponse {
            picker_closed: outcome.picker_closed,
            mutation: outcome.mutation,
        }),
    ))
}

pub async fn get_cached_record<S: Store + 'static>(
    State(state): State<SharedState<S>>,
    Path(record_id): Path<Id>,
) -> Result<Json<Record>, ApiError> {
    state
        .cache
        .get(&record_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Record {} is not cached", record_id)))
}
