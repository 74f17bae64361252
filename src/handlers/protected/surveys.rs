use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::auth::authorize;
use crate::database::models::{NewQuestion, NewSurvey, SurveyPatch};
use crate::database::SURVEY_FIELDS;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult, Authenticated};
use crate::state::AppState;

/// POST /surveys - Create a survey authored by the token's user
///
/// `title` is required; `description` and `category` are optional. The new
/// survey is unpublished until patched with `published: true`.
pub async fn create(
    State(state): State<AppState>,
    Authenticated { user, body }: Authenticated,
) -> ApiResult<Value> {
    let new_survey = NewSurvey::from_fields(&body)?;
    let survey = state.surveys.create(&user.username, new_survey).await?;

    tracing::info!("User '{}' created survey {}", user.username, survey.id);
    Ok(ApiResponse::created(json!({ "survey": survey })))
}

/// PATCH /surveys/:id - Partially update a survey (author only)
///
/// Accepts any subset of `title`, `description`, `category`, `published`.
/// Unknown keys are dropped; server-controlled keys (`author`, `_id`,
/// `date_posted`, ...) or a payload with nothing updatable yield 400.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Authenticated { user, body }: Authenticated,
) -> ApiResult<Value> {
    let id = parse_id(&id, "Survey")?;
    let existing = state.surveys.find(id).await?;
    authorize(&user, &existing)?;

    let fields = SURVEY_FIELDS.apply(&body)?;
    let patch = SurveyPatch::from_fields(&fields)?;
    let survey = state.surveys.update(id, &patch).await?;

    tracing::info!("User '{}' updated survey {}", user.username, id);
    Ok(ApiResponse::success(json!({ "survey": survey })))
}

/// DELETE /surveys/:id - Delete a survey with its questions (author only)
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Authenticated { user, .. }: Authenticated,
) -> ApiResult<&'static str> {
    let id = parse_id(&id, "Survey")?;
    let existing = state.surveys.find(id).await?;
    authorize(&user, &existing)?;

    state.surveys.delete(id).await?;

    tracing::info!("User '{}' deleted survey {}", user.username, id);
    Ok(ApiResponse::success("Deleted"))
}

/// POST /surveys/:id/questions - Add a question to a survey (author only)
pub async fn create_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Authenticated { user, body }: Authenticated,
) -> ApiResult<Value> {
    let id = parse_id(&id, "Survey")?;
    let existing = state.surveys.find(id).await?;
    authorize(&user, &existing)?;

    let new_question = NewQuestion::from_fields(&body)?;
    let question = state.surveys.create_question(id, new_question).await?;

    tracing::info!("User '{}' added question {} to survey {}", user.username, question.id, id);
    Ok(ApiResponse::created(json!({ "question": question })))
}
