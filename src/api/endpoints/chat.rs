//! Health Chatbot endpoints.
//!
//! - `POST /api/chat/general`: general health question
//! - `POST /api/chat/patient`: question about one patient's stored record
//! - `GET /api/chat`: both histories for the caller's session
//! - `DELETE /api/chat/general`, `DELETE /api/chat/patient`: clear one history

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, AuthenticatedUser};
use crate::chat::{self, ChatOutcome, ChatTurn};

const MAX_QUERY_CHARS: usize = 2000;

#[derive(Deserialize)]
pub struct GeneralChatRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize)]
pub struct PatientChatRequest {
    pub patient_id: i64,
    #[serde(default)]
    pub query: String,
}

#[derive(Serialize)]
pub struct ChatReplyResponse {
    pub reply: String,
    /// False for apologies, which are shown once and not kept.
    pub stored: bool,
}

#[derive(Serialize)]
pub struct ChatHistoryResponse {
    pub general: Vec<ChatTurn>,
    pub patient: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ClearedResponse {
    pub cleared: usize,
}

#[derive(Clone, Copy)]
enum History {
    General,
    Patient,
}

fn validate_query(query: &str) -> Result<(), ApiError> {
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".into()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Query too long (max {MAX_QUERY_CHARS} chars)"
        )));
    }
    Ok(())
}

/// Append an answered turn to the chosen history; apologies pass through.
fn record_outcome(
    ctx: &ApiContext,
    user: &AuthenticatedUser,
    history: History,
    outcome: ChatOutcome,
) -> Result<Json<ChatReplyResponse>, ApiError> {
    match outcome {
        ChatOutcome::Answered(turn) => {
            let reply = turn.bot.clone();
            ctx.sessions
                .update(&user.token, move |session| match history {
                    History::General => session.general_chat.push(turn),
                    History::Patient => session.patient_chat.push(turn),
                })?
                .ok_or(ApiError::Unauthorized)?;
            Ok(Json(ChatReplyResponse {
                reply,
                stored: true,
            }))
        }
        ChatOutcome::Apology(reply) => Ok(Json(ChatReplyResponse {
            reply,
            stored: false,
        })),
    }
}

/// `POST /api/chat/general`
pub async fn general(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<GeneralChatRequest>,
) -> Result<Json<ChatReplyResponse>, ApiError> {
    validate_query(&req.query)?;

    let generator = ctx.generator.clone();
    let outcome = run_blocking(move || Ok(chat::general_reply(generator.as_ref(), &req.query))).await?;
    record_outcome(&ctx, &user, History::General, outcome)
}

/// `POST /api/chat/patient`
pub async fn patient(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<PatientChatRequest>,
) -> Result<Json<ChatReplyResponse>, ApiError> {
    validate_query(&req.query)?;

    let store = ctx.clinical.clone();
    let generator = ctx.generator.clone();
    let outcome = run_blocking(move || {
        let conn = store.open()?;
        Ok(chat::patient_reply(
            &conn,
            generator.as_ref(),
            req.patient_id,
            &req.query,
        )?)
    })
    .await?;
    record_outcome(&ctx, &user, History::Patient, outcome)
}

/// `GET /api/chat`
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let session = ctx
        .sessions
        .get(&user.token)?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(ChatHistoryResponse {
        general: session.general_chat,
        patient: session.patient_chat,
    }))
}

fn clear(
    ctx: &ApiContext,
    user: &AuthenticatedUser,
    history: History,
) -> Result<Json<ClearedResponse>, ApiError> {
    let cleared = ctx
        .sessions
        .update(&user.token, |session| {
            let turns = match history {
                History::General => &mut session.general_chat,
                History::Patient => &mut session.patient_chat,
            };
            std::mem::take(turns).len()
        })?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(ClearedResponse { cleared }))
}

/// `DELETE /api/chat/general`
pub async fn clear_general(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ClearedResponse>, ApiError> {
    clear(&ctx, &user, History::General)
}

/// `DELETE /api/chat/patient`
pub async fn clear_patient(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ClearedResponse>, ApiError> {
    clear(&ctx, &user, History::Patient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_rejected() {
        assert!(matches!(validate_query("   "), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn overlong_query_rejected() {
        let long = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(matches!(validate_query(&long), Err(ApiError::BadRequest(_))));
        assert!(validate_query("How much water should I drink?").is_ok());
    }
}
