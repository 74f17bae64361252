#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use survey_api::auth::generate_jwt;
use survey_api::config::AppConfig;
use survey_api::database::models::{NewQuestion, NewSurvey, QuestionType, SurveyPatch};
use survey_api::database::{MemoryStore, SurveyRepository};
use survey_api::state::AppState;

/// An in-process server over a fresh in-memory store. Each test gets its own.
pub struct TestApp {
    pub base_url: String,
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

/// Ids of the rows created by [`TestApp::seed`].
pub struct Seeded {
    /// joerocket's unpublished survey, with one question
    pub albums: i32,
    /// spongebob's published survey
    pub ceos: i32,
    pub question: i32,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        let (state, store) = AppState::in_memory(config.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let app = survey_api::app(state);
        tokio::spawn(async move { axum::serve(listener, app).await });

        Ok(Self {
            base_url,
            config,
            store,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A valid token for `username`, signed with the server's secret.
    pub fn token_for(&self, username: &str) -> Result<String> {
        Ok(generate_jwt(&self.config.security, username)?)
    }

    pub async fn seed(&self) -> Result<Seeded> {
        let albums = self
            .store
            .create(
                "joerocket",
                NewSurvey {
                    title: "best albums of 2009".to_string(),
                    description: Some("hot fiya".to_string()),
                    category: Some("music".to_string()),
                },
            )
            .await?;
        let ceos = self
            .store
            .create(
                "spongebob",
                NewSurvey {
                    title: "top ceos".to_string(),
                    description: Some("top ceos of all time".to_string()),
                    category: Some("business".to_string()),
                },
            )
            .await?;
        let publish = SurveyPatch {
            published: Some(true),
            ..Default::default()
        };
        self.store.update(ceos.id, &publish).await?;

        let question = self
            .store
            .create_question(
                albums.id,
                NewQuestion {
                    title: "Favorite EDM Artist".to_string(),
                    question_type: QuestionType::Multiple,
                },
            )
            .await?;
        self.store.insert_choice(question.id, "Skrillex").await?;
        self.store.insert_choice(question.id, "Deadmau5").await?;

        Ok(Seeded {
            albums: albums.id,
            ceos: ceos.id,
            question: question.id,
        })
    }
}
