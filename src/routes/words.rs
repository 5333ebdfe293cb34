use axum::extract::{Path, Query, State};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::response::{AppError, MessageResponse};
use crate::routes::{persist_mutation, require_body};
use crate::state::AppState;
use crate::store::Word;

#[derive(Debug, Default, Deserialize)]
pub struct ListWordsQuery {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WordPayload {
    #[serde(default)]
    english: String,
    #[serde(default)]
    korean: String,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Serialize)]
pub struct WordResponse {
    english: String,
    korean: String,
    category: String,
}

impl From<Word> for WordResponse {
    fn from(word: Word) -> Self {
        Self {
            english: word.english,
            korean: word.korean,
            category: word.category,
        }
    }
}

#[derive(Serialize)]
pub struct WordLookupResponse {
    success: bool,
    #[serde(flatten)]
    word: WordResponse,
}

pub async fn list_words(
    State(state): State<AppState>,
    Query(query): Query<ListWordsQuery>,
) -> Json<Vec<WordResponse>> {
    let words = state.store().list(query.category.as_deref());
    Json(words.into_iter().map(WordResponse::from).collect())
}

pub async fn get_word(
    State(state): State<AppState>,
    Path(english): Path<String>,
) -> Result<Json<WordLookupResponse>, AppError> {
    let word = state.store().get(&english)?;
    Ok(Json(WordLookupResponse {
        success: true,
        word: word.into(),
    }))
}

pub async fn create_word(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let payload: WordPayload = require_body(&body)?;
    let word = state
        .store()
        .add(&payload.english, &payload.korean, payload.category.as_deref())?;
    tracing::info!(english = %word.english, category = %word.category, "word added");

    persist_mutation(&state).await?;
    Ok(MessageResponse::ok(format!("'{}' 단어가 추가되었습니다!", word.english)))
}

pub async fn update_word(
    State(state): State<AppState>,
    Path(english): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let payload: WordPayload = require_body(&body)?;
    let word = state.store().update(
        &english,
        &payload.english,
        &payload.korean,
        payload.category.as_deref(),
    )?;
    tracing::info!(from = %english.trim().to_lowercase(), to = %word.english, "word updated");

    persist_mutation(&state).await?;
    Ok(MessageResponse::ok("단어가 수정되었습니다!"))
}

pub async fn delete_word(
    State(state): State<AppState>,
    Path(english): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.store().remove(&english)?;
    tracing::info!(english = %removed.english, "word deleted");

    persist_mutation(&state).await?;
    Ok(MessageResponse::ok(format!("'{}' 단어가 삭제되었습니다!", removed.english)))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.store().categories().into_iter().collect())
}
