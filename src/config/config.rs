use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 允许跨域访问的来源，"*" 表示任意来源
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            structured: false,
        }
    }
}

/// 聊天机器人配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatbotConfig {
    /// 模拟"正在输入"的延迟（毫秒）
    pub typing_delay_ms: u64,
    /// 自定义知识库文件，未设置时使用内置知识库
    pub knowledge_base_path: Option<PathBuf>,
    /// 兜底回复选择策略: "random" | "seeded" | "first"
    pub picker: String,
    /// seeded 策略使用的随机种子
    pub seed: Option<u64>,
    /// 第二轮匹配所需的关键词命中数
    pub match_threshold: usize,
    /// 单条消息最大字符数
    pub max_message_length: usize,
    /// 助手名称
    pub assistant_name: String,
    /// 打开窗口时的欢迎语
    pub greeting: String,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: 500,
            knowledge_base_path: None,
            picker: "random".to_string(),
            seed: None,
            match_threshold: 2,
            max_message_length: 1000,
            assistant_name: "FML Assistant".to_string(),
            greeting: "Hello! How can we assist you today?".to_string(),
        }
    }
}

/// 提示消息配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// 消息显示时长（毫秒）
    pub display_ms: u64,
    /// 退出动画时长（毫秒）
    pub exit_ms: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            display_ms: 5000,
            exit_ms: 500,
        }
    }
}

/// 数字计数器动画配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// 增量分母，每帧增加 target / frames
    pub frames: u32,
    /// 帧间隔（毫秒）
    pub frame_interval_ms: u64,
    /// 触发动画的可见比例
    pub visibility_threshold: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            frames: 200,
            frame_interval_ms: 20,
            visibility_threshold: 0.5,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 聊天机器人配置
    pub chatbot: ChatbotConfig,
    /// 提示消息配置
    pub flash: FlashConfig,
    /// 计数器配置
    pub counter: CounterConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            chatbot: ChatbotConfig::default(),
            flash: FlashConfig::default(),
            counter: CounterConfig::default(),
            app_name: "campus-assistant".to_string(),
            environment: "development".to_string(),
        }
    }
}
