//! 主题匹配服务
//!
//! 将用户输入与知识库中的主题关键词进行匹配，选出一条回复。

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::chat::{Reply, ReplyKind};
use crate::models::topic::{KnowledgeBase, Topic};

/// 兜底回复的选择策略
#[cfg_attr(test, mockall::automock)]
pub trait ResponsePicker: Send + Sync {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn pick(&self, len: usize) -> usize;
}

/// 均匀随机选择
#[derive(Debug, Default)]
pub struct RandomPicker;

impl ResponsePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// 固定种子的随机选择，输出可复现
#[derive(Debug)]
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ResponsePicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        self.rng.lock().gen_range(0..len)
    }
}

/// 总是选择第一条
#[derive(Debug, Default)]
pub struct FirstPicker;

impl ResponsePicker for FirstPicker {
    fn pick(&self, _len: usize) -> usize {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Random,
    Seeded,
    First,
}

impl FromStr for PickerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "seeded" => Ok(Self::Seeded),
            "first" => Ok(Self::First),
            other => Err(format!("unknown picker: {}", other)),
        }
    }
}

pub fn create_response_picker(kind: PickerKind, seed: Option<u64>) -> Box<dyn ResponsePicker> {
    match kind {
        PickerKind::Random => Box::new(RandomPicker),
        PickerKind::Seeded => {
            let seed = seed.unwrap_or_else(|| {
                warn!("Seeded picker created without a seed, using 0");
                0
            });
            Box::new(SeededPicker::new(seed))
        }
        PickerKind::First => Box::new(FirstPicker),
    }
}

/// 默认的第二轮命中阈值
pub const DEFAULT_MATCH_THRESHOLD: usize = 2;

/// 主题匹配器
///
/// 三轮匹配：
/// 1. 按声明顺序，第一个有任一关键词出现在输入中的主题胜出；
/// 2. 按声明顺序，第一个关键词命中数达到阈值的主题胜出；
/// 3. 兜底：输入含领域通用词时回复"请换个说法"，否则回复"无关话题"。
pub struct TopicMatcher {
    knowledge_base: Arc<KnowledgeBase>,
    picker: Box<dyn ResponsePicker>,
    threshold: usize,
}

impl std::fmt::Debug for TopicMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicMatcher")
            .field("topics", &self.knowledge_base.topics().len())
            .field("picker", &"Box<dyn ResponsePicker>")
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl TopicMatcher {
    pub fn new(knowledge_base: Arc<KnowledgeBase>, picker: Box<dyn ResponsePicker>) -> Self {
        Self {
            knowledge_base,
            picker,
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold.max(1);
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    /// 为一条用户输入选择回复，总会返回结果
    pub fn respond(&self, utterance: &str) -> Reply {
        let normalized = utterance.to_lowercase();

        if let Some(topic) = self.keyword_pass(&normalized) {
            debug!("Matched topic '{}' on keyword pass", topic.id);
            return Reply::topic(&topic.answer, &topic.id, ReplyKind::Keyword);
        }

        if let Some(topic) = self.threshold_pass(&normalized) {
            debug!("Matched topic '{}' on threshold pass", topic.id);
            return Reply::topic(&topic.answer, &topic.id, ReplyKind::Threshold);
        }

        self.fallback(&normalized)
    }

    fn keyword_pass(&self, normalized: &str) -> Option<&Topic> {
        self.knowledge_base
            .topics()
            .iter()
            .find(|t| t.matches_any(normalized))
    }

    // With substring hits, any topic reaching the threshold already matched
    // on the keyword pass, so `respond` only gets here if that pass changes.
    pub(crate) fn threshold_pass(&self, normalized: &str) -> Option<&Topic> {
        self.knowledge_base
            .topics()
            .iter()
            .find(|t| t.hit_count(normalized) >= self.threshold)
    }

    fn fallback(&self, normalized: &str) -> Reply {
        let vocabulary = self.knowledge_base.fallback();

        let (responses, kind) = if vocabulary.is_domain_related(normalized) {
            (&vocabulary.rephrase, ReplyKind::Rephrase)
        } else {
            (&vocabulary.off_topic, ReplyKind::OffTopic)
        };

        let index = self.picker.pick(responses.len()) % responses.len();
        debug!("No topic matched, using {} fallback #{}", kind.as_str(), index);
        Reply::fallback(&responses[index], kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::topic::FallbackVocabulary;
    use rstest::rstest;

    fn small_kb() -> Arc<KnowledgeBase> {
        let topics = vec![
            Topic::new("admission", ["apply", "enroll"], "ADMISSION"),
            Topic::new("fees", ["fee", "tuition", "cost"], "FEES"),
            Topic::new("sports", ["football", "club"], "SPORTS"),
        ];
        let fallback = FallbackVocabulary {
            domain_terms: vec!["school".into(), "teacher".into()],
            rephrase: vec!["R0".into(), "R1".into()],
            off_topic: vec!["O0".into(), "O1".into(), "O2".into()],
        };
        Arc::new(KnowledgeBase::new(topics, fallback, vec![]).unwrap())
    }

    fn matcher() -> TopicMatcher {
        TopicMatcher::new(small_kb(), Box::new(FirstPicker))
    }

    #[rstest]
    #[case("How do I APPLY?", "ADMISSION", "admission")]
    #[case("what is the tuition", "FEES", "fees")]
    #[case("is there a football team", "SPORTS", "sports")]
    fn test_single_topic_keyword(#[case] input: &str, #[case] text: &str, #[case] id: &str) {
        let reply = matcher().respond(input);

        assert_eq!(reply.text, text);
        assert_eq!(reply.topic.as_deref(), Some(id));
        assert_eq!(reply.kind, ReplyKind::Keyword);
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        // "fee" and "football" both hit, but fees is declared before sports.
        let reply = matcher().respond("football club fee");
        assert_eq!(reply.topic.as_deref(), Some("fees"));

        let reply = matcher().respond("what does it cost to enroll");
        assert_eq!(reply.topic.as_deref(), Some("admission"));
    }

    #[test]
    fn test_substring_matching() {
        // "fee" is contained in "coffee"
        let reply = matcher().respond("coffee please");
        assert_eq!(reply.topic.as_deref(), Some("fees"));
    }

    #[test]
    fn test_threshold_pass_requires_two_hits() {
        let m = matcher();

        assert!(m.threshold_pass("tuition").is_none());
        let topic = m.threshold_pass("tuition cost").unwrap();
        assert_eq!(topic.id, "fees");

        let strict = TopicMatcher::new(small_kb(), Box::new(FirstPicker)).with_threshold(3);
        assert!(strict.threshold_pass("tuition cost").is_none());
        assert_eq!(
            strict.threshold_pass("fee tuition cost").map(|t| t.id.as_str()),
            Some("fees")
        );
    }

    #[test]
    fn test_threshold_pass_declaration_order() {
        let m = matcher();
        let topic = m.threshold_pass("apply enroll fee tuition").unwrap();
        assert_eq!(topic.id, "admission");
    }

    #[test]
    fn test_domain_related_fallback() {
        let reply = matcher().respond("Tell me about the School");

        assert_eq!(reply.kind, ReplyKind::Rephrase);
        assert_eq!(reply.text, "R0");
        assert!(reply.topic.is_none());
    }

    #[test]
    fn test_off_topic_fallback() {
        let reply = matcher().respond("blah blah random nonsense");

        assert_eq!(reply.kind, ReplyKind::OffTopic);
        assert_eq!(reply.text, "O0");
    }

    #[test]
    fn test_empty_utterance_is_off_topic() {
        assert_eq!(matcher().respond("").kind, ReplyKind::OffTopic);
    }

    #[test]
    fn test_picker_receives_list_length() {
        let mut picker = MockResponsePicker::new();
        picker.expect_pick().withf(|len| *len == 3).times(1).return_const(2usize);

        let m = TopicMatcher::new(small_kb(), Box::new(picker));
        assert_eq!(m.respond("weather today?").text, "O2");
    }

    #[test]
    fn test_out_of_range_pick_wraps() {
        let mut picker = MockResponsePicker::new();
        picker.expect_pick().return_const(5usize);

        let m = TopicMatcher::new(small_kb(), Box::new(picker));
        // 5 % 2 == 1
        assert_eq!(m.respond("teacher?").text, "R1");
    }

    #[test]
    fn test_picker_not_consulted_on_topic_match() {
        let mut picker = MockResponsePicker::new();
        picker.expect_pick().never();

        let m = TopicMatcher::new(small_kb(), Box::new(picker));
        assert_eq!(m.respond("apply now").kind, ReplyKind::Keyword);
    }

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let a = SeededPicker::new(42);
        let b = SeededPicker::new(42);
        let xs: Vec<usize> = (0..10).map(|_| a.pick(5)).collect();
        let ys: Vec<usize> = (0..10).map(|_| b.pick(5)).collect();

        assert_eq!(xs, ys);
        assert!(xs.iter().all(|i| *i < 5));
    }

    #[test]
    fn test_random_picker_stays_in_range() {
        let picker = RandomPicker;
        for _ in 0..100 {
            assert!(picker.pick(4) < 4);
        }
    }

    #[rstest]
    #[case("random", PickerKind::Random)]
    #[case("Seeded", PickerKind::Seeded)]
    #[case(" first ", PickerKind::First)]
    fn test_picker_kind_from_str(#[case] raw: &str, #[case] kind: PickerKind) {
        assert_eq!(raw.parse::<PickerKind>().unwrap(), kind);
    }

    #[test]
    fn test_unknown_picker_kind() {
        assert!("loudest".parse::<PickerKind>().is_err());
    }
}
