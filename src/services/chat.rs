//! 聊天服务
//!
//! 聊天窗口状态机（Closed → Open → Typing → Open）以及会话管理。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::config::ChatbotConfig;
use crate::error::{AppError, Result};
use crate::models::chat::{ChatMessage, Reply, WidgetState};
use crate::models::topic::Topic;
use crate::services::matcher::TopicMatcher;

/// 聊天窗口设置
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// 回复前的模拟输入延迟
    pub typing_delay: Duration,
    /// 欢迎语
    pub greeting: String,
    /// 助手名称，用于"正在输入"提示
    pub assistant_name: String,
    /// 单条消息最大字符数
    pub max_message_length: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from(&ChatbotConfig::default())
    }
}

impl From<&ChatbotConfig> for ChatSettings {
    fn from(config: &ChatbotConfig) -> Self {
        Self {
            typing_delay: Duration::from_millis(config.typing_delay_ms),
            greeting: config.greeting.clone(),
            assistant_name: config.assistant_name.clone(),
            max_message_length: config.max_message_length,
        }
    }
}

#[derive(Debug)]
struct WidgetInner {
    state: WidgetState,
    transcript: Vec<ChatMessage>,
    pending: usize,
    /// 最后一个已安排回复的完成信号，新回复在其之后发出
    last_turn: Option<oneshot::Receiver<()>>,
}

/// 窗口快照
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub id: String,
    pub state: WidgetState,
    pub typing_indicator: Option<String>,
    pub transcript: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

/// 单个聊天窗口
///
/// 同一窗口内的回复严格按提交顺序产生：新消息会排在尚未发出的回复之后，
/// 已安排的回复总会发出。
#[derive(Debug)]
pub struct ChatWidget {
    id: String,
    matcher: Arc<TopicMatcher>,
    settings: Arc<ChatSettings>,
    inner: Arc<parking_lot::Mutex<WidgetInner>>,
    created_at: DateTime<Utc>,
}

impl ChatWidget {
    /// 创建处于关闭状态的窗口
    pub fn new(matcher: Arc<TopicMatcher>, settings: Arc<ChatSettings>) -> Self {
        let greeting = ChatMessage::greeting(&settings.greeting);
        Self {
            id: Uuid::new_v4().to_string(),
            matcher,
            settings,
            inner: Arc::new(parking_lot::Mutex::new(WidgetInner {
                state: WidgetState::Closed,
                transcript: vec![greeting],
                pending: 0,
                last_turn: None,
            })),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> WidgetState {
        self.inner.lock().state
    }

    /// Closed ⇄ Open
    pub fn toggle(&self) -> WidgetState {
        let mut inner = self.inner.lock();
        inner.state = match inner.state {
            WidgetState::Closed if inner.pending > 0 => WidgetState::Typing,
            WidgetState::Closed => WidgetState::Open,
            WidgetState::Open | WidgetState::Typing => WidgetState::Closed,
        };
        inner.state
    }

    pub fn close(&self) {
        self.inner.lock().state = WidgetState::Closed;
    }

    pub fn typing_indicator(&self) -> Option<String> {
        match self.state() {
            WidgetState::Typing => Some(format!("{} is typing...", self.settings.assistant_name)),
            _ => None,
        }
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.inner.lock().transcript.clone()
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            id: self.id.clone(),
            state: self.state(),
            typing_indicator: self.typing_indicator(),
            transcript: self.transcript(),
            created_at: self.created_at,
        }
    }

    /// 提交一条消息，延迟后返回机器人回复
    ///
    /// 空白输入被忽略并返回 `None`；窗口关闭时返回 `Conflict`。
    pub async fn send(&self, message: &str) -> Result<Option<ChatMessage>> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(None);
        }

        let length = message.chars().count();
        if length > self.settings.max_message_length {
            return Err(AppError::Validation(format!(
                "message too long: max {} characters, got {}",
                self.settings.max_message_length, length
            )));
        }

        let (done_tx, done_rx) = oneshot::channel();
        let previous = {
            let mut inner = self.inner.lock();
            if inner.state == WidgetState::Closed {
                return Err(AppError::Conflict(format!(
                    "chat widget {} is closed",
                    self.id
                )));
            }
            inner.transcript.push(ChatMessage::user(message));
            inner.state = WidgetState::Typing;
            inner.pending += 1;
            inner.last_turn.replace(done_rx)
        };

        // 回复在独立任务中发出，调用方被取消时依然会完成
        let turn = tokio::spawn(Self::run_turn(
            self.inner.clone(),
            self.matcher.clone(),
            self.settings.typing_delay,
            message.to_string(),
            previous,
            done_tx,
        ));

        turn.await
            .map(Some)
            .map_err(|e| AppError::Internal(format!("chat reply task failed: {}", e)))
    }

    async fn run_turn(
        inner: Arc<parking_lot::Mutex<WidgetInner>>,
        matcher: Arc<TopicMatcher>,
        typing_delay: Duration,
        message: String,
        previous: Option<oneshot::Receiver<()>>,
        done: oneshot::Sender<()>,
    ) -> ChatMessage {
        if let Some(previous) = previous {
            // 前一个任务异常退出时发送端被丢弃，同样视为完成
            let _ = previous.await;
        }
        if !typing_delay.is_zero() {
            tokio::time::sleep(typing_delay).await;
        }

        let reply = matcher.respond(&message);
        debug!("Scheduled reply fired: kind={}", reply.kind.as_str());
        let bot_message = ChatMessage::bot(reply);

        {
            let mut inner = inner.lock();
            inner.transcript.push(bot_message.clone());
            inner.pending -= 1;
            if inner.pending == 0 && inner.state == WidgetState::Typing {
                inner.state = WidgetState::Open;
            }
        }

        let _ = done.send(());
        bot_message
    }

    /// 快捷问题与直接输入其文本等价
    pub async fn ask_quick_question(&self, question: &str) -> Result<Option<ChatMessage>> {
        self.send(question).await
    }
}

/// 聊天服务 trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// 打开一个新窗口
    async fn open_session(&self) -> Result<Arc<ChatWidget>>;

    /// 根据 ID 获取窗口
    async fn get_session(&self, id: &str) -> Result<Arc<ChatWidget>>;

    /// 切换窗口开关
    async fn toggle(&self, id: &str) -> Result<WidgetState>;

    /// 在窗口中发送消息
    async fn send(&self, id: &str, message: &str) -> Result<Option<ChatMessage>>;

    /// 关闭并移除窗口
    async fn close_session(&self, id: &str) -> Result<()>;

    /// 无状态匹配
    fn reply(&self, message: &str) -> Reply;

    fn topics(&self) -> Vec<Topic>;

    fn quick_questions(&self) -> Vec<String>;

    fn settings(&self) -> &ChatSettings;

    fn session_count(&self) -> usize;
}

/// 聊天服务实现
pub struct ChatServiceImpl {
    matcher: Arc<TopicMatcher>,
    settings: Arc<ChatSettings>,
    sessions: DashMap<String, Arc<ChatWidget>>,
}

impl ChatServiceImpl {
    pub fn new(matcher: Arc<TopicMatcher>, settings: ChatSettings) -> Self {
        Self {
            matcher,
            settings: Arc::new(settings),
            sessions: DashMap::new(),
        }
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    async fn open_session(&self) -> Result<Arc<ChatWidget>> {
        let widget = Arc::new(ChatWidget::new(
            self.matcher.clone(),
            self.settings.clone(),
        ));
        widget.toggle();
        self.sessions
            .insert(widget.id().to_string(), widget.clone());
        info!("Opened chat session {}", widget.id());
        Ok(widget)
    }

    async fn get_session(&self, id: &str) -> Result<Arc<ChatWidget>> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("Chat session not found: {}", id)))
    }

    async fn toggle(&self, id: &str) -> Result<WidgetState> {
        let widget = self.get_session(id).await?;
        let state = widget.toggle();
        debug!("Chat session {} toggled to {:?}", id, state);
        Ok(state)
    }

    async fn send(&self, id: &str, message: &str) -> Result<Option<ChatMessage>> {
        // Clone the Arc out of the map so the shard lock is not held across the delay.
        let widget = self.get_session(id).await?;
        widget.send(message).await
    }

    async fn close_session(&self, id: &str) -> Result<()> {
        let (_, widget) = self
            .sessions
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Chat session not found: {}", id)))?;
        widget.close();
        info!("Closed chat session {}", id);
        Ok(())
    }

    fn reply(&self, message: &str) -> Reply {
        self.matcher.respond(message.trim())
    }

    fn topics(&self) -> Vec<Topic> {
        self.matcher.knowledge_base().topics().to_vec()
    }

    fn quick_questions(&self) -> Vec<String> {
        self.matcher.knowledge_base().quick_questions().to_vec()
    }

    fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

pub fn create_chat_service(
    matcher: Arc<TopicMatcher>,
    settings: ChatSettings,
) -> Box<dyn ChatService> {
    Box::new(ChatServiceImpl::new(matcher, settings))
}
