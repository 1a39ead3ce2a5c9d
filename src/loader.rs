//! Quiz sources: the HTTP quiz service and an in-memory stand-in.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info};

use crate::question::{Question, QuestionRecord};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8085/api/quizzes/quizSet";

/// Why a quiz set could not be fetched.
///
/// Callers that only care about success or failure treat every variant the
/// same; the variants exist for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error("invalid quiz service url '{0}'")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("quiz service returned status {0}")]
    Status(u16),

    #[error("could not decode quiz data: {0}")]
    Decode(String),

    #[error("unknown quiz set '{0}'")]
    NotFound(String),
}

/// Anything that can produce the ordered questions of a named quiz set
pub trait QuizSource: Send + Sync + 'static {
    fn fetch(&self, quiz_set: &str) -> Result<Vec<Question>, LoadError>;
}

/// Fetches quiz sets from the quiz service over HTTP
#[derive(Debug, Clone)]
pub struct HttpQuizLoader {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpQuizLoader {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let base_url =
            Url::parse(base_url).map_err(|_| LoadError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(LoadError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quizr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// URL of a quiz set; the name becomes one percent-encoded path segment
    pub fn quiz_set_url(&self, quiz_set: &str) -> Result<Url, LoadError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LoadError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(quiz_set);
        Ok(url)
    }
}

impl QuizSource for HttpQuizLoader {
    fn fetch(&self, quiz_set: &str) -> Result<Vec<Question>, LoadError> {
        let url = self.quiz_set_url(quiz_set)?;
        debug!(%url, "fetching quiz set");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LoadError::Status(response.status().as_u16()));
        }

        let records: Vec<QuestionRecord> = response
            .json()
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        info!(quiz_set, questions = records.len(), "quiz set fetched");
        Ok(records.into_iter().map(Question::from).collect())
    }
}

/// Serves quiz sets from memory, for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuizSource {
    sets: HashMap<String, Result<Vec<Question>, LoadError>>,
    delay: Option<Duration>,
}

impl InMemoryQuizSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(mut self, name: impl Into<String>, questions: Vec<Question>) -> Self {
        self.sets.insert(name.into(), Ok(questions));
        self
    }

    pub fn with_failure(mut self, name: impl Into<String>, error: LoadError) -> Self {
        self.sets.insert(name.into(), Err(error));
        self
    }

    /// Hold every fetch for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl QuizSource for InMemoryQuizSource {
    fn fetch(&self, quiz_set: &str) -> Result<Vec<Question>, LoadError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.sets
            .get(quiz_set)
            .cloned()
            .unwrap_or_else(|| Err(LoadError::NotFound(quiz_set.to_string())))
    }
}
