//! 聊天 DTO
//!
//! 定义聊天相关的请求和响应数据结构。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::chat::{ChatMessage, Reply, ReplyKind, WidgetState};
use crate::models::topic::Topic;

/// 打开会话响应
#[derive(Debug, Serialize)]
pub struct OpenSessionResponse {
    /// 会话 ID
    pub id: String,
    /// 窗口状态
    pub state: WidgetState,
    /// 欢迎语
    pub greeting: ChatMessage,
    /// 快捷问题
    pub quick_questions: Vec<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 切换窗口响应
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: String,
    pub state: WidgetState,
}

/// 发送消息请求
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendMessageRequest {
    /// 用户输入
    pub message: String,
}

/// 发送消息响应
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    /// 会话 ID
    pub session_id: String,
    /// 机器人回复
    pub reply: ChatMessage,
    /// 回复后的窗口状态
    pub state: WidgetState,
}

/// 无状态匹配响应
#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub reply: String,
    pub kind: ReplyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl From<Reply> for ReplyResponse {
    fn from(reply: Reply) -> Self {
        Self {
            reply: reply.text,
            kind: reply.kind,
            topic: reply.topic,
        }
    }
}

/// 主题摘要（不含回答正文）
#[derive(Debug, Serialize)]
pub struct TopicSummary {
    pub id: String,
    pub keywords: Vec<String>,
}

impl From<Topic> for TopicSummary {
    fn from(topic: Topic) -> Self {
        Self {
            id: topic.id,
            keywords: topic.keywords,
        }
    }
}

/// 主题列表响应
#[derive(Debug, Serialize)]
pub struct TopicListResponse {
    pub topics: Vec<TopicSummary>,
    pub total: usize,
}

/// 快捷问题响应
#[derive(Debug, Serialize)]
pub struct QuickQuestionsResponse {
    pub questions: Vec<String>,
}
