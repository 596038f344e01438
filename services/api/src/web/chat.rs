//! services/api/src/web/chat.rs
//!
//! Endpoints for the FAQ chat widget. Each chat lives in memory until it is
//! closed; bot replies are held back by a simulated typing delay that is
//! aborted when the chat closes.

use crate::error::HttpError;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use site_core::chat::{ChatMessage, Origin};
use site_core::faq::KNOWLEDGE_BASE;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChatTranscript {
    pub chat_id: Uuid,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub text: String,
    #[serde(default)]
    pub origin: Origin,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChatExchange {
    pub user: ChatMessage,
    pub reply: ChatMessage,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct FaqQuestion {
    pub question: String,
    pub category: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /chat - Open a chat window
#[utoipa::path(
    post,
    path = "/chat",
    responses((status = 201, description = "Chat opened with the bot greeting", body = ChatTranscript))
)]
pub async fn open_chat_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (chat_id, handle) = state.chats.open().await;
    let messages = handle.session.lock().await.messages().to_vec();
    info!("Opened chat {}", chat_id);
    (StatusCode::CREATED, Json(ChatTranscript { chat_id, messages }))
}

/// GET /chat/{id} - Current transcript
#[utoipa::path(
    get,
    path = "/chat/{id}",
    params(("id" = Uuid, Path, description = "Chat id")),
    responses(
        (status = 200, body = ChatTranscript),
        (status = 404, description = "No such chat")
    )
)]
pub async fn get_chat_handler(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<ChatTranscript>, HttpError> {
    let handle = state.chats.get(chat_id).await.ok_or_else(chat_not_found)?;
    let messages = handle.session.lock().await.messages().to_vec();
    Ok(Json(ChatTranscript { chat_id, messages }))
}

/// POST /chat/{id}/messages - Send a message and wait for the bot's reply
#[utoipa::path(
    post,
    path = "/chat/{id}/messages",
    params(("id" = Uuid, Path, description = "Chat id")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, body = ChatExchange),
        (status = 400, description = "Blank message"),
        (status = 404, description = "No such chat"),
        (status = 410, description = "Chat closed before the reply was ready")
    )
)]
pub async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatExchange>, HttpError> {
    let handle = state.chats.get(chat_id).await.ok_or_else(chat_not_found)?;

    let user = handle
        .session
        .lock()
        .await
        .submit(&req.text)
        .ok_or((StatusCode::BAD_REQUEST, "Message must not be empty".to_string()))?;

    let delay = state
        .config
        .typing_delay
        .for_origin(req.origin, rand::random::<f64>());

    tokio::select! {
        _ = handle.cancellation_token.cancelled() => {
            info!("Chat {} closed while typing, dropping reply", chat_id);
            return Err(chat_closed());
        }
        _ = tokio::time::sleep(delay) => {}
    }

    let mut session = handle.session.lock().await;
    if handle.cancellation_token.is_cancelled() {
        return Err(chat_closed());
    }
    let reply = session.reply(&req.text, req.origin);

    Ok(Json(ChatExchange { user, reply }))
}

/// DELETE /chat/{id} - Close the chat, aborting pending replies
#[utoipa::path(
    delete,
    path = "/chat/{id}",
    params(("id" = Uuid, Path, description = "Chat id")),
    responses(
        (status = 204, description = "Chat closed"),
        (status = 404, description = "No such chat")
    )
)]
pub async fn close_chat_handler(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
) -> Result<StatusCode, HttpError> {
    if state.chats.close(chat_id).await {
        info!("Closed chat {}", chat_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(chat_not_found())
    }
}

/// GET /faq - The questions the bot knows about
#[utoipa::path(
    get,
    path = "/faq",
    responses((status = 200, body = [FaqQuestion]))
)]
pub async fn list_faq_handler() -> Json<Vec<FaqQuestion>> {
    Json(
        KNOWLEDGE_BASE
            .iter()
            .map(|entry| FaqQuestion {
                question: entry.question.to_string(),
                category: entry.category.to_string(),
            })
            .collect(),
    )
}

fn chat_not_found() -> HttpError {
    (StatusCode::NOT_FOUND, "Chat not found".to_string())
}

fn chat_closed() -> HttpError {
    (StatusCode::GONE, "Chat was closed".to_string())
}
