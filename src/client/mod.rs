//! 客户端模块
//!
//! 面向外部 HTTP 端点的客户端。

pub mod form;

pub use form::{FormOutcome, FormSubmitter, parse_envelope};
