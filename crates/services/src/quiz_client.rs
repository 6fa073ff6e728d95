use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use assess_core::model::{
    AnswerSet, Question, QuestionId, Recommendation, RiskScore, ScoreResult,
};

use crate::config::ApiConfig;
use crate::error::ApiError;

/// The scoring backend as seen by the pipeline.
///
/// A trait seam so the flow and dashboard services can run against an
/// in-memory fake in tests.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Fetch the question set for a new session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` on transport failure or
    /// `ApiError::Server` for a non-success response.
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// Submit a complete answer set for scoring.
    ///
    /// Completeness is the caller's responsibility; this call never sees an
    /// incomplete set.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` on 401, `ApiError::Validation` when the
    /// backend rejects the input, `ApiError::Network`/`Server` otherwise.
    async fn submit_answers(
        &self,
        answers: &AnswerSet,
        token: &str,
    ) -> Result<ScoreResult, ApiError>;

    /// Fetch the last scored result for the authenticated user.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`QuizApi::submit_answers`].
    async fn fetch_dashboard(&self, token: &str) -> Result<ScoreResult, ApiError>;
}

/// `QuizApi` over the HTTP backend.
#[derive(Clone)]
pub struct HttpQuizClient {
    client: Client,
    config: ApiConfig,
}

impl HttpQuizClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    async fn error_for(response: Response) -> ApiError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Auth;
        }

        let message = match response.text().await {
            Ok(body) => match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => parsed.message(),
                Err(_) if !body.trim().is_empty() => body,
                Err(_) => status.to_string(),
            },
            Err(_) => status.to_string(),
        };

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            return ApiError::Validation(message);
        }
        ApiError::Server { status, message }
    }
}

#[async_trait]
impl QuizApi for HttpQuizClient {
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError> {
        let response = self
            .client
            .get(self.config.endpoint("/api/quiz/questions"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: Vec<QuestionWire> = response.json().await?;
        Ok(body.into_iter().map(QuestionWire::into_question).collect())
    }

    async fn submit_answers(
        &self,
        answers: &AnswerSet,
        token: &str,
    ) -> Result<ScoreResult, ApiError> {
        let payload = SubmitRequest::from_answers(answers);
        let response = self
            .client
            .post(self.config.endpoint("/api/quiz/submit"))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: ScoreResultWire = response.json().await?;
        normalize_result(body)
    }

    async fn fetch_dashboard(&self, token: &str) -> Result<ScoreResult, ApiError> {
        let response = self
            .client
            .get(self.config.endpoint("/api/dashboard/data"))
            .bearer_auth(token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: ScoreResultWire = response.json().await?;
        normalize_result(body)
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn message(self) -> String {
        self.error
            .or(self.message)
            .unwrap_or_else(|| "unknown server error".to_owned())
    }
}

#[derive(Debug, Deserialize)]
struct QuestionWire {
    id: String,
    text: String,
}

impl QuestionWire {
    fn into_question(self) -> Question {
        Question::new(QuestionId::new(self.id), self.text)
    }
}

#[derive(Debug, Serialize)]
struct SubmitRequest {
    answers: BTreeMap<String, bool>,
}

impl SubmitRequest {
    fn from_answers(answers: &AnswerSet) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(id, value)| (id.as_str().to_owned(), value))
                .collect(),
        }
    }
}

/// Recommendation entries arrive either as bare strings or as objects with a
/// `text` field. Both coerce to the canonical shape right here; nothing past
/// this module branches on the wire representation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecommendationWire {
    Entry {
        text: String,
        #[serde(default)]
        completed: bool,
        #[serde(default)]
        note: Option<String>,
    },
    Text(String),
}

#[derive(Debug, Deserialize)]
struct ScoreResultWire {
    #[serde(rename = "riskScore")]
    risk_score: i64,
    #[serde(default)]
    recommendations: Vec<RecommendationWire>,
    #[serde(default, rename = "owaspIssues")]
    owasp_issues: Vec<String>,
}

fn normalize_recommendation(wire: RecommendationWire) -> Recommendation {
    match wire {
        RecommendationWire::Text(text) => Recommendation::new(text),
        RecommendationWire::Entry {
            text,
            completed,
            note,
        } => Recommendation {
            text,
            completed,
            note,
        },
    }
}

fn normalize_result(wire: ScoreResultWire) -> Result<ScoreResult, ApiError> {
    let risk_score = RiskScore::new(wire.risk_score)
        .map_err(|err| ApiError::Validation(err.to_string()))?;
    Ok(ScoreResult::new(
        risk_score,
        wire.recommendations
            .into_iter()
            .map(normalize_recommendation)
            .collect(),
        wire.owasp_issues,
    ))
}
