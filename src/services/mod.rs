//! 服务模块

pub mod chat;
pub mod counter;
pub mod flash;
pub mod matcher;

pub use chat::{ChatService, ChatServiceImpl, ChatSettings, ChatWidget, WidgetSnapshot, create_chat_service};
pub use counter::{CounterAnimation, ScrollTrigger};
pub use flash::{FlashBoard, FlashPhase, FlashTimeline};
pub use matcher::{
    FirstPicker, PickerKind, RandomPicker, ResponsePicker, SeededPicker, TopicMatcher,
    create_response_picker,
};
