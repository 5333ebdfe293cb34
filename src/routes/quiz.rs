use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::AppError;
use crate::routes::{parse_body, require_body};
use crate::services::evaluation::{self, Answer, CheckRequest};
use crate::services::quiz::{self, QuizDirection, QuizMode, QuizModeRequest, QuizRequest, QuizType};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct QuizPayload {
    #[serde(default, rename = "type")]
    quiz_type: QuizType,
    #[serde(default)]
    mode: QuizModeRequest,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    focus_mode: bool,
}

#[derive(Serialize)]
pub struct QuizResponse {
    success: bool,
    mode: QuizMode,
    #[serde(rename = "type")]
    quiz_type: QuizDirection,
    word: String,
    question: String,
    correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    choices: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correct_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CheckPayload {
    #[serde(default)]
    word: String,
    #[serde(default)]
    answer: Value,
    #[serde(default, rename = "type")]
    quiz_type: QuizType,
    #[serde(default)]
    mode: QuizMode,
    #[serde(default)]
    correct_index: Option<i64>,
}

#[derive(Serialize)]
pub struct CheckResponse {
    success: bool,
    is_correct: bool,
    correct_answer: String,
    stats: [u32; 2],
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QuizResponse>, AppError> {
    let payload: QuizPayload = parse_body(&body)?.unwrap_or_default();
    let request = QuizRequest {
        quiz_type: payload.quiz_type,
        mode: payload.mode,
        category: payload.category,
        focus_mode: payload.focus_mode,
    };

    let session = {
        let mut random = state.random();
        quiz::generate(state.store(), &request, &mut **random)?
    };
    tracing::debug!(
        english = %session.word.english,
        direction = session.direction.as_str(),
        mode = ?session.mode,
        focus_mode = request.focus_mode,
        "quiz generated"
    );

    let choices = match session.mode {
        QuizMode::Multiple => Some(session.choices),
        QuizMode::Text => None,
    };

    Ok(Json(QuizResponse {
        success: true,
        mode: session.mode,
        quiz_type: session.direction,
        word: session.word.english,
        question: session.question,
        correct_answer: session.correct_answer,
        choices,
        correct_index: session.correct_index,
    }))
}

pub async fn check_answer(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CheckResponse>, AppError> {
    let payload: CheckPayload = require_body(&body)?;
    let answer = Answer::parse(payload.mode, &payload.answer, payload.correct_index)?;
    let request = CheckRequest {
        word: payload.word,
        answer,
        quiz_type: payload.quiz_type,
    };

    let outcome = evaluation::check(state.store(), &request)?;

    // counters already moved in memory; a failed save is only logged
    if let Err(err) = state.persist().await {
        tracing::warn!(error = %err, "snapshot save after answer check failed");
    }

    Ok(Json(CheckResponse {
        success: true,
        is_correct: outcome.is_correct,
        correct_answer: outcome.correct_answer,
        stats: [outcome.correct_count, outcome.wrong_count],
    }))
}
