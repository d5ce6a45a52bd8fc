//! Chat Routes
//!
//! 定义聊天相关的 API 路由。

use crate::api::handlers::chat_handler::*;
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;

/// 创建聊天路由器
pub fn create_chat_router() -> Router<AppState> {
    Router::new()
        .route("/chat/sessions", post(open_session))
        .route(
            "/chat/sessions/:id",
            get(get_session).delete(close_session),
        )
        .route("/chat/sessions/:id/toggle", post(toggle_session))
        .route("/chat/sessions/:id/messages", post(send_message))
        .route("/chat/reply", post(reply))
        .route("/topics", get(list_topics))
        .route("/quick-questions", get(quick_questions))
}
