use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::history::{HistoryEntry, SHARE_TITLE};
use crate::session::{SessionError, DEFAULT_SLOT};
use crate::state::AppState;
use crate::translate::error::DispatchError;
use crate::translate::interface::{Direction, LanguagePair};

type ApiError = (StatusCode, Json<Value>);

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/languages", get(get_languages))
        .route("/api/translate", post(translate))
        .route("/api/translate/:slot", delete(cancel_translation))
        .route("/api/history", get(get_history).delete(clear_history))
        .route("/api/history/:id", delete(delete_history_item))
        .route("/api/history/:id/share", get(share_history_item))
}

#[derive(Debug, Deserialize)]
pub struct TranslatePayload {
    pub text: String,
    #[serde(default)]
    pub direction: Direction,
    pub slot: Option<String>,
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let endpoints = state.session.translator().endpoint_health().await;
    Json(json!({
        "status": "ok",
        "endpoints": endpoints
    }))
}

async fn get_languages(State(state): State<AppState>) -> Json<Value> {
    let languages = state.session.languages();
    Json(json!({
        "source": languages.source,
        "target": languages.target,
        "forward": direction_info(languages, Direction::Forward),
        "reversed": direction_info(languages, Direction::Reversed),
    }))
}

fn direction_info(languages: &LanguagePair, direction: Direction) -> Value {
    json!({
        "source_lang": languages.source_for(direction),
        "target_lang": languages.target_for(direction),
        "label": languages.label(direction),
    })
}

async fn translate(
    State(state): State<AppState>,
    Json(payload): Json<TranslatePayload>,
) -> Result<Json<Value>, ApiError> {
    let slot = payload.slot.as_deref().unwrap_or(DEFAULT_SLOT);
    let entry = state
        .session
        .translate(slot, &payload.text, payload.direction)
        .await
        .map_err(session_error)?;

    Ok(Json(entry_json(&entry, state.session.languages())))
}

async fn cancel_translation(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Json<Value> {
    let cancelled = state.session.cancel(&slot);
    Json(json!({ "cancelled": cancelled }))
}

async fn get_history(State(state): State<AppState>) -> Json<Value> {
    let now = Utc::now();
    let languages = state.session.languages();
    let entries: Vec<Value> = state
        .history
        .list()
        .await
        .iter()
        .map(|entry| {
            let mut value = entry_json(entry, languages);
            value["relative"] = json!(entry.relative_time(now));
            value
        })
        .collect();
    Json(json!(entries))
}

async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.history.clear().await;
    StatusCode::NO_CONTENT
}

async fn delete_history_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if state.history.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

async fn share_history_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let entry = state.history.get(id).await.ok_or_else(|| not_found(id))?;
    Ok(Json(json!({
        "title": SHARE_TITLE,
        "message": entry.share_text()
    })))
}

fn entry_json(entry: &HistoryEntry, languages: &LanguagePair) -> Value {
    json!({
        "id": entry.id,
        "original": entry.original,
        "translation": entry.translation,
        "direction": entry.direction,
        "source_lang": entry.source_lang(languages),
        "target_lang": entry.target_lang(languages),
        "timestamp": entry.timestamp.to_rfc3339(),
    })
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("Invalid history id: {}", raw)})),
        )
    })
}

fn not_found(id: Uuid) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("No history entry {}", id)})),
    )
}

fn session_error(err: SessionError) -> ApiError {
    let status = match &err {
        SessionError::EmptyInput => StatusCode::BAD_REQUEST,
        SessionError::Superseded => StatusCode::CONFLICT,
        SessionError::Dispatch(DispatchError::DeadlineExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
        SessionError::Dispatch(DispatchError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        SessionError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        SessionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!("Translation failed: {}", err);
    }
    (status, Json(json!({"error": err.to_string()})))
}
