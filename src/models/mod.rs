//! 数据模型

pub mod chat;
pub mod flash;
pub mod topic;

pub use chat::{ChatMessage, Reply, ReplyKind, Sender, WidgetState};
pub use flash::{FlashCategory, FlashMessage, FlashStyle, FormEnvelope};
pub use topic::{FallbackVocabulary, KnowledgeBase, Topic};
