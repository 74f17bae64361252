use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Choice, NewQuestion, NewSurvey, NewUser, Question, Survey, SurveyDetail, SurveyPatch, User,
};
use crate::database::repository::{SurveyRepository, UserRepository};

#[derive(Default)]
struct MemoryState {
    surveys: Vec<Survey>,
    questions: Vec<Question>,
    choices: Vec<Choice>,
    users: HashMap<String, User>,
    next_survey_id: i32,
    next_question_id: i32,
    next_choice_id: i32,
}

impl MemoryState {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    fn survey_index(&self, id: i32) -> Result<usize, DatabaseError> {
        self.surveys
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Survey {} not found", id)))
    }
}

/// Process-local store used when no database is configured, and by tests.
/// Rows live in insertion order; ids are sequential from 1.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a choice to an existing question. Choices have no API writer.
    pub async fn insert_choice(&self, question_id: i32, title: impl Into<String>) -> Result<Choice, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.questions.iter().any(|q| q.id == question_id) {
            return Err(DatabaseError::NotFound(format!("Question {} not found", question_id)));
        }

        let choice = Choice {
            id: MemoryState::next_id(&mut state.next_choice_id),
            question_id,
            title: title.into(),
        };
        state.choices.push(choice.clone());
        Ok(choice)
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[async_trait]
impl SurveyRepository for MemoryStore {
    async fn create(&self, author: &str, survey: NewSurvey) -> Result<Survey, DatabaseError> {
        let mut state = self.state.write().await;
        let created = Survey {
            id: MemoryState::next_id(&mut state.next_survey_id),
            author: author.to_string(),
            title: survey.title,
            description: survey.description,
            category: survey.category,
            published: false,
            anonymous: true,
            date_posted: Utc::now(),
        };
        state.surveys.push(created.clone());
        Ok(created)
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Survey>, DatabaseError> {
        let state = self.state.read().await;
        let surveys = match search {
            Some(term) => {
                let needle = term.to_lowercase();
                state
                    .surveys
                    .iter()
                    .filter(|s| {
                        contains_ignore_case(&s.author, &needle)
                            || contains_ignore_case(&s.title, &needle)
                            || s.description.as_deref().is_some_and(|d| contains_ignore_case(d, &needle))
                    })
                    .cloned()
                    .collect()
            }
            None => state.surveys.iter().filter(|s| s.published).cloned().collect(),
        };
        Ok(surveys)
    }

    async fn find(&self, id: i32) -> Result<Survey, DatabaseError> {
        let state = self.state.read().await;
        let index = state.survey_index(id)?;
        Ok(state.surveys[index].clone())
    }

    async fn get(&self, id: i32) -> Result<SurveyDetail, DatabaseError> {
        let state = self.state.read().await;
        let index = state.survey_index(id)?;

        let mut questions: Vec<Question> = state
            .questions
            .iter()
            .filter(|q| q.survey_id == id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.id);

        Ok(SurveyDetail {
            survey: state.surveys[index].clone(),
            questions,
        })
    }

    async fn update(&self, id: i32, patch: &SurveyPatch) -> Result<Survey, DatabaseError> {
        let mut state = self.state.write().await;
        let index = state.survey_index(id)?;
        let survey = &mut state.surveys[index];
        patch.apply_to(survey);
        Ok(survey.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        let index = state.survey_index(id)?;
        state.surveys.remove(index);

        let orphaned: Vec<i32> = state
            .questions
            .iter()
            .filter(|q| q.survey_id == id)
            .map(|q| q.id)
            .collect();
        state.questions.retain(|q| q.survey_id != id);
        state.choices.retain(|c| !orphaned.contains(&c.question_id));
        Ok(())
    }

    async fn create_question(&self, survey_id: i32, question: NewQuestion) -> Result<Question, DatabaseError> {
        let mut state = self.state.write().await;
        state.survey_index(survey_id)?;

        let created = Question {
            id: MemoryState::next_id(&mut state.next_question_id),
            survey_id,
            title: question.title,
            question_type: question.question_type,
        };
        state.questions.push(created.clone());
        Ok(created)
    }

    async fn list_choices(&self, question_id: i32) -> Result<Vec<Choice>, DatabaseError> {
        let state = self.state.read().await;
        if !state.questions.iter().any(|q| q.id == question_id) {
            return Err(DatabaseError::NotFound(format!("Question {} not found", question_id)));
        }
        Ok(state
            .choices
            .iter()
            .filter(|c| c.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.username) {
            return Err(DatabaseError::Conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }

        let created = User {
            username: user.username,
            password: user.password,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        };
        state.users.insert(created.username.clone(), created.clone());
        Ok(created)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.state.read().await.users.get(username).cloned())
    }
}
