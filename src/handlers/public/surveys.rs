use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring matched against author, title and description
    pub search: Option<String>,
}

/// GET /surveys - List published surveys, or search all surveys
///
/// Without `search` only published surveys are returned. With a non-blank
/// `search` every survey whose author, title or description contains the
/// term is returned, published or not. Questions are never included.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Value> {
    let term = query.search.as_deref().filter(|t| !t.trim().is_empty());
    let surveys = state.surveys.list(term).await?;

    tracing::debug!("Listed {} surveys (search: {:?})", surveys.len(), term);
    Ok(ApiResponse::success(json!({ "surveys": surveys })))
}

/// GET /surveys/:id - Survey detail including its questions
pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id, "Survey")?;
    let survey = state.surveys.get(id).await?;

    Ok(ApiResponse::success(json!({ "survey": survey })))
}

/// GET /questions/:id/choices - Choices of one question
pub async fn choices(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id, "Question")?;
    let choices = state.surveys.list_choices(id).await?;

    Ok(ApiResponse::success(json!({ "choices": choices })))
}
