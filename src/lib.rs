//! Campus Assistant - 学校网站 FAQ 聊天助手
//!
//! 基于关键词的主题匹配、聊天窗口状态机，以及站点交互中的提示消息、
//! 表单提交结果和数字计数器动画。

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
