use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Answer option of a multiple-choice question. Read-only over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Choice {
    #[serde(rename = "_id")]
    pub id: i32,
    #[serde(rename = "_question_id")]
    pub question_id: i32,
    pub title: String,
}
