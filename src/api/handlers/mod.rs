//! Handlers 模块
//!
//! API 请求处理器。

pub mod chat_handler;
