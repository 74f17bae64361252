use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Choice, NewQuestion, NewSurvey, NewUser, Question, Survey, SurveyDetail, SurveyPatch, User,
};

/// Fields a search term is matched against, OR-combined.
pub const SURVEY_SEARCH_FIELDS: &[&str] = &["author", "title", "description"];

/// Persistence for surveys and their questions/choices.
///
/// Implementations are the only writers of survey state. Every method that
/// addresses a survey or question by id fails with [`DatabaseError::NotFound`]
/// when no such row exists.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Insert a survey authored by `author`. Unpublished, anonymous, stamped now.
    async fn create(&self, author: &str, survey: NewSurvey) -> Result<Survey, DatabaseError>;

    /// Without a term: published surveys only. With a term: every survey
    /// whose author, title or description contains it, ignoring case.
    async fn list(&self, search: Option<&str>) -> Result<Vec<Survey>, DatabaseError>;

    /// Survey row alone, used for ownership checks.
    async fn find(&self, id: i32) -> Result<Survey, DatabaseError>;

    /// Survey with its questions ordered by id.
    async fn get(&self, id: i32) -> Result<SurveyDetail, DatabaseError>;

    /// Write only the columns present in `patch`.
    async fn update(&self, id: i32, patch: &SurveyPatch) -> Result<Survey, DatabaseError>;

    /// Remove the survey together with its questions and their choices.
    async fn delete(&self, id: i32) -> Result<(), DatabaseError>;

    async fn create_question(&self, survey_id: i32, question: NewQuestion) -> Result<Question, DatabaseError>;

    async fn list_choices(&self, question_id: i32) -> Result<Vec<Choice>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Credential storage backing token issuance.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user whose password is already hashed. Duplicate usernames are a conflict.
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError>;
}
