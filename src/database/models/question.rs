use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::database::record::{required_string, RecordError};

/// The fixed set of question kinds a survey may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Multiple,
    Text,
}

impl std::str::FromStr for QuestionType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple" => Ok(QuestionType::Multiple),
            "text" => Ok(QuestionType::Text),
            other => Err(RecordError::InvalidQuestionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: i32,
    #[serde(rename = "_survey_id")]
    pub survey_id: i32,
    pub title: String,
    pub question_type: QuestionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub title: String,
    pub question_type: QuestionType,
}

impl NewQuestion {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, RecordError> {
        let title = required_string(fields, "title")?;
        let question_type = required_string(fields, "question_type")?.parse::<QuestionType>()?;
        Ok(Self { title, question_type })
    }
}
