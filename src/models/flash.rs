//! 提示消息与表单响应模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 提示消息类别，未知值回退为 `Info`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Danger,
    Warning,
    #[default]
    Info,
    Primary,
}

impl FlashCategory {
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "success" => Self::Success,
            "danger" => Self::Danger,
            "warning" => Self::Warning,
            "primary" => Self::Primary,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Primary => "primary",
        }
    }

    /// 渲染用的配色
    pub fn style(&self) -> FlashStyle {
        match self {
            Self::Success => FlashStyle {
                background: "linear-gradient(135deg, #d4edda 0%, #c3e6cb 100%)",
                color: "#155724",
                border: "#28a745",
            },
            Self::Danger => FlashStyle {
                background: "linear-gradient(135deg, #f8d7da 0%, #f1b0b7 100%)",
                color: "#721c24",
                border: "#dc3545",
            },
            Self::Warning => FlashStyle {
                background: "linear-gradient(135deg, #fff3cd 0%, #ffeaa7 100%)",
                color: "#856404",
                border: "#ffc107",
            },
            Self::Info => FlashStyle {
                background: "linear-gradient(135deg, #d1ecf1 0%, #b8e2e8 100%)",
                color: "#0c5460",
                border: "#17a2b8",
            },
            Self::Primary => FlashStyle {
                background: "linear-gradient(135deg, #cce7ff 0%, #b3d9ff 100%)",
                color: "#004085",
                border: "#007bff",
            },
        }
    }
}

impl<'de> Deserialize<'de> for FlashCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_or_default(&raw))
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FlashStyle {
    pub background: &'static str,
    pub color: &'static str,
    pub border: &'static str,
}

/// 提示消息
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlashMessage {
    /// `flash-<millis>`
    pub id: String,
    pub message: String,
    pub category: FlashCategory,
    pub created_at: DateTime<Utc>,
}

impl FlashMessage {
    pub fn new(message: &str, category: FlashCategory) -> Self {
        Self::at(message, category, Utc::now())
    }

    pub fn at(message: &str, category: FlashCategory, created_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("flash-{}", created_at.timestamp_millis()),
            message: message.to_string(),
            category,
            created_at,
        }
    }

    pub fn style(&self) -> FlashStyle {
        self.category.style()
    }
}

/// 表单接口返回的 JSON：`{success, message, category?}`
///
/// 字段按真值语义宽松解析：`null`、缺失或类型不符的字段不会让整个响应作废。
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FlashCategory>,
}

impl<'de> Deserialize<'de> for FormEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// JSON 值的真值判断：null、false、0、空字符串为假
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl FormEnvelope {
    /// 从任意 JSON 值构建；非对象的值视为既无消息也未成功
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).filter(|v| is_truthy(v));

        let message = match field("message") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let category = field("category").map(|v| match v {
            Value::String(s) => FlashCategory::parse_or_default(s),
            _ => FlashCategory::Info,
        });

        Self {
            success: field("success").is_some(),
            message,
            category,
        }
    }

    /// 非 JSON 响应体对应的失败结果
    pub fn from_raw_text(text: &str) -> Self {
        let message = if text.trim().is_empty() {
            "Unexpected server response".to_string()
        } else {
            text.to_string()
        };
        Self {
            success: false,
            message,
            category: Some(FlashCategory::Danger),
        }
    }

    /// 有消息时显示的类别
    pub fn effective_category(&self) -> FlashCategory {
        self.category.unwrap_or(if self.success {
            FlashCategory::Success
        } else {
            FlashCategory::Info
        })
    }
}
