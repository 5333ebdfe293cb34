mod health;
mod quiz;
mod stats;
mod words;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route(
            "/api/words",
            get(words::list_words)
                .post(words::create_word)
                .fallback(fallback_handler),
        )
        .route(
            "/api/words/:english",
            get(words::get_word)
                .put(words::update_word)
                .delete(words::delete_word)
                .fallback(fallback_handler),
        )
        .route(
            "/api/categories",
            get(words::list_categories).fallback(fallback_handler),
        )
        .route("/api/quiz", post(quiz::generate_quiz).fallback(fallback_handler))
        .route(
            "/api/quiz/check",
            post(quiz::check_answer).fallback(fallback_handler),
        )
        .route("/api/stats", get(stats::list_stats).fallback(fallback_handler));

    for path in ["/health", "/api/health"] {
        app = app.nest(path, health::router());
    }

    app.fallback(fallback_handler).with_state(state)
}

/// Parses a JSON body; an empty body is `None`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|err| {
            tracing::debug!(error = %err, "rejecting malformed request body");
            AppError::validation("요청 데이터가 올바르지 않습니다.")
        })
}

pub(crate) fn require_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    parse_body(body)?.ok_or_else(|| AppError::validation("요청 데이터가 없습니다."))
}

/// Saves the snapshot after a mutation. The in-memory change stands either
/// way; the caller learns whether it reached disk.
pub(crate) async fn persist_mutation(state: &AppState) -> Result<(), AppError> {
    state.persist().await.map_err(|err| {
        tracing::warn!(error = %err, "snapshot save failed");
        AppError::storage("파일 저장에 실패했습니다.")
    })
}

async fn fallback_handler() -> Response {
    AppError::not_found("요청한 API를 찾을 수 없습니다.").into_response()
}
