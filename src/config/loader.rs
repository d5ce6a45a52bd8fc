use crate::config::config::AppConfig;
use crate::services::matcher::PickerKind;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序（后者覆盖前者）：
    /// 1. 内置默认值
    /// 2. ./config.toml
    /// 3. CAMPUS_ 前缀的环境变量，例如 `CAMPUS_CHATBOT__TYPING_DELAY_MS=0`
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CAMPUS_").split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.chatbot.picker.parse::<PickerKind>().is_err() {
            return Err(ConfigValidationError::UnknownPicker(
                config.chatbot.picker.clone(),
            ));
        }

        if config.chatbot.picker.parse::<PickerKind>() == Ok(PickerKind::Seeded)
            && config.chatbot.seed.is_none()
        {
            return Err(ConfigValidationError::MissingSeed);
        }

        if config.chatbot.match_threshold == 0 {
            return Err(ConfigValidationError::InvalidThreshold);
        }

        if config.chatbot.max_message_length == 0 {
            return Err(ConfigValidationError::InvalidMessageLength);
        }

        let ratio = config.counter.visibility_threshold;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigValidationError::InvalidVisibility(ratio));
        }

        if let Some(path) = &config.chatbot.knowledge_base_path {
            if !path.exists() {
                return Err(ConfigValidationError::InvalidPath(
                    path.display().to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("未知的回复选择策略: {0}")]
    UnknownPicker(String),

    #[error("seeded 回复选择策略需要设置 chatbot.seed")]
    MissingSeed,

    #[error("匹配阈值无效，必须大于 0")]
    InvalidThreshold,

    #[error("消息长度上限无效，必须大于 0")]
    InvalidMessageLength,

    #[error("可见比例无效，必须在 (0, 1] 之间: {0}")]
    InvalidVisibility(f64),

    #[error("配置路径无效: {0}")]
    InvalidPath(String),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// 检查配置文件是否存在
pub fn config_exists() -> bool {
    default_config_path().exists()
}
