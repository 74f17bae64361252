use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::question::Question;
use crate::database::record::{optional_bool, optional_string, required_string, RecordError};

/// Survey row as stored and as rendered in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Survey {
    #[serde(rename = "_id")]
    pub id: i32,
    pub author: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub published: bool,
    pub anonymous: bool,
    pub date_posted: DateTime<Utc>,
}

/// Survey plus its questions, rendered by the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: Survey,
    pub questions: Vec<Question>,
}

/// Validated input for creating a survey. The author comes from the token.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSurvey {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl NewSurvey {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, RecordError> {
        Ok(Self {
            title: required_string(fields, "title")?,
            description: optional_string(fields, "description")?,
            category: optional_string(fields, "category")?,
        })
    }
}

/// Typed view of an allow-listed partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
}

impl SurveyPatch {
    /// Check that each filtered value has its column's type. Title may not be blanked.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, RecordError> {
        let patch = Self {
            title: optional_string(fields, "title")?,
            description: optional_string(fields, "description")?,
            category: optional_string(fields, "category")?,
            published: optional_bool(fields, "published")?,
        };

        if matches!(&patch.title, Some(t) if t.trim().is_empty()) {
            return Err(RecordError::MissingRequiredField("title".to_string()));
        }
        if patch.is_empty() {
            return Err(RecordError::NoUpdatableFields);
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    /// Column/value pairs to write, in a stable order.
    pub fn columns(&self) -> Vec<(&'static str, Value)> {
        let mut columns = Vec::new();
        if let Some(title) = &self.title {
            columns.push(("title", Value::from(title.as_str())));
        }
        if let Some(description) = &self.description {
            columns.push(("description", Value::from(description.as_str())));
        }
        if let Some(category) = &self.category {
            columns.push(("category", Value::from(category.as_str())));
        }
        if let Some(published) = self.published {
            columns.push(("published", Value::Bool(published)));
        }
        columns
    }

    /// Apply to an in-memory survey. Author, id and date_posted are never touched.
    pub fn apply_to(&self, survey: &mut Survey) {
        if let Some(title) = &self.title {
            survey.title = title.clone();
        }
        if let Some(description) = &self.description {
            survey.description = Some(description.clone());
        }
        if let Some(category) = &self.category {
            survey.category = Some(category.clone());
        }
        if let Some(published) = self.published {
            survey.published = published;
        }
    }
}
