use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Choice, NewQuestion, NewSurvey, NewUser, Question, Survey, SurveyDetail, SurveyPatch, User,
};
use crate::database::query_builder::{fetch_all, fetch_optional, QueryBuilder};
use crate::database::repository::{SurveyRepository, UserRepository, SURVEY_SEARCH_FIELDS};

const SURVEY_COLUMNS: &[&str] = &[
    "id",
    "author",
    "title",
    "description",
    "category",
    "published",
    "anonymous",
    "date_posted",
];

/// Postgres-backed store. Each call checks a connection out of the pool and
/// returns it when the statement completes, whatever the outcome.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn surveys() -> QueryBuilder {
        QueryBuilder::new("surveys", SURVEY_COLUMNS)
    }

    fn survey_not_found(id: i32) -> DatabaseError {
        DatabaseError::NotFound(format!("Survey {} not found", id))
    }
}

#[async_trait]
impl SurveyRepository for PgStore {
    async fn create(&self, author: &str, survey: NewSurvey) -> Result<Survey, DatabaseError> {
        let created = sqlx::query_as::<_, Survey>(
            "INSERT INTO surveys (author, title, description, category)
             VALUES ($1, $2, $3, $4)
             RETURNING id, author, title, description, category, published, anonymous, date_posted",
        )
        .bind(author)
        .bind(&survey.title)
        .bind(&survey.description)
        .bind(&survey.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DatabaseError::NotFound(format!("User '{}' not found", author))
            }
            other => DatabaseError::Sqlx(other),
        })?;

        Ok(created)
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Survey>, DatabaseError> {
        let sql = match search {
            Some(term) => Self::surveys().select_matching_any(SURVEY_SEARCH_FIELDS, term),
            None => Self::surveys().select_where_eq("published", Value::Bool(true)),
        };
        fetch_all(&sql, &self.pool).await
    }

    async fn find(&self, id: i32) -> Result<Survey, DatabaseError> {
        let sql = Self::surveys().select_where_eq("id", Value::from(id));
        fetch_optional(&sql, &self.pool)
            .await?
            .ok_or_else(|| Self::survey_not_found(id))
    }

    async fn get(&self, id: i32) -> Result<SurveyDetail, DatabaseError> {
        let survey = self.find(id).await?;

        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, survey_id, title, question_type
             FROM questions
             WHERE survey_id = $1
             ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SurveyDetail { survey, questions })
    }

    async fn update(&self, id: i32, patch: &SurveyPatch) -> Result<Survey, DatabaseError> {
        let sql = Self::surveys().update_by_id(id, &patch.columns())?;
        fetch_optional(&sql, &self.pool)
            .await?
            .ok_or_else(|| Self::survey_not_found(id))
    }

    async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        // questions and choices go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::survey_not_found(id));
        }
        Ok(())
    }

    async fn create_question(&self, survey_id: i32, question: NewQuestion) -> Result<Question, DatabaseError> {
        let created = sqlx::query_as::<_, Question>(
            "INSERT INTO questions (survey_id, title, question_type)
             VALUES ($1, $2, $3)
             RETURNING id, survey_id, title, question_type",
        )
        .bind(survey_id)
        .bind(&question.title)
        .bind(question.question_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => Self::survey_not_found(survey_id),
            other => DatabaseError::Sqlx(other),
        })?;

        Ok(created)
    }

    async fn list_choices(&self, question_id: i32) -> Result<Vec<Choice>, DatabaseError> {
        let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM questions WHERE id = $1")
            .bind(question_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(DatabaseError::NotFound(format!("Question {} not found", question_id)));
        }

        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, title FROM choices WHERE question_id = $1 ORDER BY id",
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(choices)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, first_name, last_name, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING username, password, first_name, last_name, email",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(format!("Username '{}' is already taken", user.username))
            }
            other => DatabaseError::Sqlx(other),
        })?;

        Ok(created)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, password, first_name, last_name, email FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
