use axum::extract::State;
use axum::Json;

use crate::services::stats::{self, StatEntry};
use crate::state::AppState;

pub async fn list_stats(State(state): State<AppState>) -> Json<Vec<StatEntry>> {
    Json(stats::summarize(state.store()))
}
