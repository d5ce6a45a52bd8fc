use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 聊天窗口状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    /// 窗口已关闭
    Closed,
    /// 窗口打开，等待输入
    Open,
    /// 已收到输入，正在"输入"回复
    Typing,
}

impl WidgetState {
    pub fn is_open(&self) -> bool {
        !matches!(self, WidgetState::Closed)
    }
}

/// 消息发送方
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// 回复的来源
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// 第一轮：任一关键词命中
    Keyword,
    /// 第二轮：关键词命中数达到阈值
    Threshold,
    /// 与学校相关但未命中主题
    Rephrase,
    /// 与学校无关
    OffTopic,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Keyword => "keyword",
            ReplyKind::Threshold => "threshold",
            ReplyKind::Rephrase => "rephrase",
            ReplyKind::OffTopic => "off_topic",
        }
    }

    /// 是否命中了具体主题
    pub fn is_topic(&self) -> bool {
        matches!(self, ReplyKind::Keyword | ReplyKind::Threshold)
    }
}

/// 匹配结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    /// 回复文本（可能包含 HTML）
    pub text: String,
    /// 回复来源
    pub kind: ReplyKind,
    /// 命中的主题标识
    pub topic: Option<String>,
}

impl Reply {
    pub fn topic(text: &str, topic_id: &str, kind: ReplyKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
            topic: Some(topic_id.to_string()),
        }
    }

    pub fn fallback(text: &str, kind: ReplyKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
            topic: None,
        }
    }
}

/// 聊天记录中的一条消息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    /// 仅机器人消息携带
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReplyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: Sender::User,
            text: text.to_string(),
            kind: None,
            topic: None,
            sent_at: Utc::now(),
        }
    }

    /// 窗口打开时显示的欢迎语
    pub fn greeting(text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: Sender::Bot,
            text: text.to_string(),
            kind: None,
            topic: None,
            sent_at: Utc::now(),
        }
    }

    pub fn bot(reply: Reply) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: Sender::Bot,
            text: reply.text,
            kind: Some(reply.kind),
            topic: reply.topic,
            sent_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_state_serialization() {
        assert_eq!(
            serde_json::to_string(&WidgetState::Typing).unwrap(),
            "\"typing\""
        );
        assert!(WidgetState::Typing.is_open());
        assert!(!WidgetState::Closed.is_open());
    }

    #[test]
    fn test_bot_message_carries_reply_metadata() {
        let msg = ChatMessage::bot(Reply::topic("answer", "fees", ReplyKind::Keyword));

        assert_eq!(msg.sender, Sender::Bot);
        assert_eq!(msg.kind, Some(ReplyKind::Keyword));
        assert_eq!(msg.topic.as_deref(), Some("fees"));
    }

    #[test]
    fn test_user_message_skips_reply_fields() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();

        assert_eq!(json["sender"], "user");
        assert!(json.get("kind").is_none());
        assert!(json.get("topic").is_none());
    }
}
