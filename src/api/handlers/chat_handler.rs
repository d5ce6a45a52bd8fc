use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::chat_dto::*},
    error::AppError,
};

pub async fn open_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let widget = state.chat_service.open_session().await?;
    state.metrics.record_session_opened();

    let snapshot = widget.snapshot();
    let greeting = snapshot
        .transcript
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("Chat session has no greeting".to_string()))?;

    let response = OpenSessionResponse {
        id: snapshot.id,
        state: snapshot.state,
        greeting,
        quick_questions: state.chat_service.quick_questions(),
        created_at: snapshot.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Getting chat session: {}", id);

    let widget = state.chat_service.get_session(&id).await?;
    Ok(Json(widget.snapshot()))
}

pub async fn toggle_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let widget_state = state.chat_service.toggle(&id).await?;
    Ok(Json(ToggleResponse {
        id,
        state: widget_state,
    }))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Sending message to chat session: {}", id);

    let widget = state.chat_service.get_session(&id).await?;
    let message = state
        .validator
        .validate_message("message", &request.message)?;

    let reply = widget
        .send(&message)
        .await
        .inspect_err(|_| state.metrics.record_error())?
        .ok_or_else(|| AppError::Validation("Message is empty".to_string()))?;

    if let Some(kind) = reply.kind {
        state.metrics.record_reply(kind);
    }

    Ok(Json(SendMessageResponse {
        session_id: id,
        reply,
        state: widget.state(),
    }))
}

pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.chat_service.close_session(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reply(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = state
        .validator
        .validate_message("message", &request.message)?;

    let reply = state.chat_service.reply(&message);
    debug!("Stateless reply: kind={}", reply.kind.as_str());
    state.metrics.record_reply(reply.kind);

    Ok(Json(ReplyResponse::from(reply)))
}

pub async fn list_topics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let topics: Vec<TopicSummary> = state
        .chat_service
        .topics()
        .into_iter()
        .map(TopicSummary::from)
        .collect();

    Ok(Json(TopicListResponse {
        total: topics.len(),
        topics,
    }))
}

pub async fn quick_questions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(QuickQuestionsResponse {
        questions: state.chat_service.quick_questions(),
    }))
}
