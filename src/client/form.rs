//! AJAX 表单提交
//!
//! 将表单字段提交到表单的 action 地址，并把服务端返回的 JSON 结果转换为提示消息。

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::flash::{FlashCategory, FlashMessage, FormEnvelope};

pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";
pub const EMPTY_MESSAGE_FALLBACK: &str = "No message returned from server.";

/// 一次提交的结果
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormOutcome {
    /// 需要显示的提示消息
    pub flash: FlashMessage,
    /// 是否清空表单
    pub reset_form: bool,
    /// 解析或合成的响应；请求未完成时为 `None`
    pub envelope: Option<FormEnvelope>,
}

impl FormOutcome {
    /// 收到服务端响应（无论是否为 JSON）时的结果
    pub fn from_envelope(envelope: FormEnvelope) -> Self {
        let flash = if envelope.message.is_empty() {
            FlashMessage::new(EMPTY_MESSAGE_FALLBACK, FlashCategory::Warning)
        } else {
            FlashMessage::new(&envelope.message, envelope.effective_category())
        };
        Self {
            flash,
            reset_form: envelope.success,
            envelope: Some(envelope),
        }
    }

    /// 网络错误时的结果
    pub fn network_error() -> Self {
        Self {
            flash: FlashMessage::new(GENERIC_ERROR_MESSAGE, FlashCategory::Danger),
            reset_form: false,
            envelope: None,
        }
    }
}

/// 解析响应体，非 JSON 文本回退为失败结果
pub fn parse_envelope(body: &str) -> FormEnvelope {
    match serde_json::from_str::<FormEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Non-JSON form response: {}", e);
            FormEnvelope::from_raw_text(body)
        }
    }
}

/// 基于共享 HTTP 客户端的表单提交器
#[derive(Debug, Clone)]
pub struct FormSubmitter {
    client: reqwest::Client,
}

impl FormSubmitter {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// 以表单编码提交 `fields` 到 `action`。不会返回错误：网络错误转换为通用的
    /// danger 提示。
    pub async fn submit<T>(&self, action: &str, fields: &T) -> FormOutcome
    where
        T: Serialize + ?Sized,
    {
        debug!("AJAX submit for form {}", action);

        let response = match self
            .client
            .post(action)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(fields)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Form submission error for {}: {}", action, e);
                return FormOutcome::network_error();
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read form response from {}: {}", action, e);
                return FormOutcome::network_error();
            }
        };

        let envelope = parse_envelope(&body);
        debug!(
            "AJAX response for {} (status {}): success={}",
            action, status, envelope.success
        );
        FormOutcome::from_envelope(envelope)
    }
}
