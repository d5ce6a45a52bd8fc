//! 提示消息服务
//!
//! 维护当前显示的提示消息，并按时间线（显示 → 退出动画 → 移除）淘汰过期消息。

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::config::FlashConfig;
use crate::models::flash::{FlashCategory, FlashMessage};

/// 消息所处阶段
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashPhase {
    Visible,
    Leaving,
    Removed,
}

/// 显示时长与退出动画时长
#[derive(Debug, Clone, Copy)]
pub struct FlashTimeline {
    pub display: Duration,
    pub exit: Duration,
}

impl Default for FlashTimeline {
    fn default() -> Self {
        Self::from(&FlashConfig::default())
    }
}

impl From<&FlashConfig> for FlashTimeline {
    fn from(config: &FlashConfig) -> Self {
        Self {
            display: Duration::milliseconds(config.display_ms as i64),
            exit: Duration::milliseconds(config.exit_ms as i64),
        }
    }
}

impl FlashTimeline {
    pub fn phase(&self, message: &FlashMessage, now: DateTime<Utc>) -> FlashPhase {
        let age = now - message.created_at;
        if age < self.display {
            FlashPhase::Visible
        } else if age < self.display + self.exit {
            FlashPhase::Leaving
        } else {
            FlashPhase::Removed
        }
    }
}

/// 提示消息容器
#[derive(Debug, Default)]
pub struct FlashBoard {
    timeline: FlashTimeline,
    messages: Mutex<Vec<FlashMessage>>,
}

impl FlashBoard {
    pub fn new(timeline: FlashTimeline) -> Self {
        Self {
            timeline,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn show(&self, message: &str, category: FlashCategory) -> FlashMessage {
        self.push(FlashMessage::new(message, category))
    }

    pub fn push(&self, message: FlashMessage) -> FlashMessage {
        self.messages.lock().push(message.clone());
        message
    }

    /// 尚未移除的消息及其阶段，按显示顺序
    pub fn active(&self, now: DateTime<Utc>) -> Vec<(FlashMessage, FlashPhase)> {
        self.messages
            .lock()
            .iter()
            .map(|m| (m.clone(), self.timeline.phase(m, now)))
            .filter(|(_, phase)| *phase != FlashPhase::Removed)
            .collect()
    }

    /// 移除已过期的消息，返回移除数量
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut messages = self.messages.lock();
        let before = messages.len();
        messages.retain(|m| self.timeline.phase(m, now) != FlashPhase::Removed);
        before - messages.len()
    }

    /// 手动关闭
    pub fn dismiss(&self, id: &str) -> bool {
        let mut messages = self.messages.lock();
        let before = messages.len();
        messages.retain(|m| m.id != id);
        messages.len() != before
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
