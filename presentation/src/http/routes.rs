//! Route handlers and DTOs.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use triviad_application::{
    GenerateQuestionError, GeneratedQuestion, GetTodayError, SubmitAnswerError,
};
use triviad_domain::Question;

use super::{AppState, CRON_KEY_HEADER};

/// Maximum accepted answer length in characters.
const MAX_ANSWER_LEN: usize = 4000;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: String,
    pub title: String,
    pub text: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub choices: Vec<String>,
    /// Max similarity observed during generation, formatted to three
    /// decimals. Only present on the admin generation response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<String>,
}

impl QuestionResponse {
    fn from_question(question: Question) -> Self {
        Self {
            id: question.id,
            title: question.title,
            text: question.text,
            topic: question.topic,
            created_at: question.created_at,
            choices: question.choices,
            similarity: None,
        }
    }

    fn from_generated(generated: GeneratedQuestion) -> Self {
        let mut response = Self::from_question(generated.question);
        response.similarity = Some(format!("{:.3}", generated.max_similarity));
        response
    }
}

#[derive(Debug, Deserialize)]
pub struct PostAnswerRequest {
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub score: u8,
    pub feedback: String,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn get_today(
    State(state): State<AppState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    match state.today.execute().await {
        Ok(question) => Ok(Json(QuestionResponse::from_question(question))),
        Err(GetTodayError::NoQuestion) => Err(api_error(StatusCode::NOT_FOUND, "no question yet")),
        Err(GetTodayError::Store(err)) => {
            error!(%err, "today lookup failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "db error"))
        }
    }
}

pub async fn post_answer(
    State(state): State<AppState>,
    Json(request): Json<PostAnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let text = request.text.trim();
    if request.question_id.is_empty() || text.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "question_id and text are required",
        ));
    }
    if text.chars().count() > MAX_ANSWER_LEN {
        return Err(api_error(StatusCode::BAD_REQUEST, "answer too long"));
    }

    match state.submit.execute(&request.question_id, text).await {
        Ok(scored) => Ok(Json(AnswerResponse {
            score: scored.score,
            feedback: scored.feedback,
        })),
        Err(SubmitAnswerError::QuestionNotFound) => {
            Err(api_error(StatusCode::NOT_FOUND, "question not found"))
        }
        Err(SubmitAnswerError::Grading(err)) => {
            error!(%err, "grading failed");
            Err(api_error(StatusCode::BAD_GATEWAY, "grading failed"))
        }
        Err(SubmitAnswerError::Store(err)) => {
            error!(%err, "answer persistence failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "db error"))
        }
    }
}

pub async fn generate_today(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuestionResponse>, ApiError> {
    let presented = headers
        .get(CRON_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if state.cron_key.is_empty() || presented != state.cron_key {
        return Err(api_error(StatusCode::UNAUTHORIZED, "unauthorized"));
    }

    match state.generate.execute().await {
        Ok(generated) => Ok(Json(QuestionResponse::from_generated(generated))),
        Err(GenerateQuestionError::Exhausted) => Err(api_error(
            StatusCode::CONFLICT,
            "could not generate novel question",
        )),
        Err(GenerateQuestionError::Store(err)) => {
            error!(%err, "generation store failure");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "db error"))
        }
    }
}
