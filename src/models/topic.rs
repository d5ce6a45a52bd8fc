use figment::{
    Figment,
    providers::{Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::error::{AppError, Result};

/// 内置知识库（TOML 格式）
pub const BUILTIN_KNOWLEDGE_BASE: &str = include_str!("../../assets/knowledge_base.toml");

/// FAQ 主题
///
/// 一组触发关键词加上一段预设回答。关键词在加载时统一转为小写。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    /// 主题标识
    pub id: String,
    /// 触发关键词（小写，去重）
    pub keywords: Vec<String>,
    /// 回答内容（HTML 片段，原样返回）
    pub answer: String,
}

impl Topic {
    /// 创建主题并规范化关键词
    pub fn new<I, S>(id: &str, keywords: I, answer: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.trim().to_string(),
            keywords: normalize_terms(keywords),
            answer: answer.to_string(),
        }
    }

    /// 任一关键词出现在（已小写的）输入中
    pub fn matches_any(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|k| normalized.contains(k.as_str()))
    }

    /// 出现在（已小写的）输入中的关键词数量
    pub fn hit_count(&self, normalized: &str) -> usize {
        self.keywords
            .iter()
            .filter(|k| normalized.contains(k.as_str()))
            .count()
    }
}

/// 兜底词汇：领域通用词与两组兜底回复
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackVocabulary {
    /// 判断输入是否与学校相关的通用词
    pub domain_terms: Vec<String>,
    /// 与学校相关但未命中主题时的"请换个说法"回复
    pub rephrase: Vec<String>,
    /// 与学校无关时的回复
    pub off_topic: Vec<String>,
}

impl FallbackVocabulary {
    /// 输入包含任一领域通用词
    pub fn is_domain_related(&self, normalized: &str) -> bool {
        self.domain_terms
            .iter()
            .any(|t| normalized.contains(t.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct KnowledgeBaseFile {
    #[serde(default)]
    quick_questions: Vec<String>,
    fallback: FallbackVocabulary,
    topics: Vec<Topic>,
}

/// 知识库
///
/// 有序的主题列表，顺序决定匹配时的优先级。构建后只读。
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    topics: Vec<Topic>,
    fallback: FallbackVocabulary,
    quick_questions: Vec<String>,
}

impl KnowledgeBase {
    /// 由各部分构建并校验知识库
    pub fn new(
        topics: Vec<Topic>,
        fallback: FallbackVocabulary,
        quick_questions: Vec<String>,
    ) -> Result<Self> {
        let topics: Vec<Topic> = topics
            .into_iter()
            .map(|t| Topic::new(&t.id, &t.keywords, &t.answer))
            .collect();

        if topics.is_empty() {
            return Err(AppError::Config(
                "knowledge base must define at least one topic".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for topic in &topics {
            if topic.id.is_empty() {
                return Err(AppError::Config("topic id cannot be empty".to_string()));
            }
            if !seen.insert(topic.id.as_str()) {
                return Err(AppError::Config(format!(
                    "duplicate topic id: {}",
                    topic.id
                )));
            }
            if topic.keywords.is_empty() {
                return Err(AppError::Config(format!(
                    "topic '{}' has no keywords",
                    topic.id
                )));
            }
        }

        let fallback = FallbackVocabulary {
            domain_terms: normalize_terms(&fallback.domain_terms),
            rephrase: fallback.rephrase,
            off_topic: fallback.off_topic,
        };
        if fallback.rephrase.is_empty() || fallback.off_topic.is_empty() {
            return Err(AppError::Config(
                "fallback response lists cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            topics,
            fallback,
            quick_questions,
        })
    }

    /// 内置知识库
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_KNOWLEDGE_BASE)
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: KnowledgeBaseFile = Figment::from(Toml::string(source)).extract()?;
        Self::new(file.topics, file.fallback, file.quick_questions)
    }

    /// 从 TOML 文件加载
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::Config(format!(
                "knowledge base file not found: {}",
                path.display()
            )));
        }

        let file: KnowledgeBaseFile = Figment::from(Toml::file(path)).extract()?;
        let kb = Self::new(file.topics, file.fallback, file.quick_questions)?;
        debug!(
            "Loaded knowledge base from {} ({} topics)",
            path.display(),
            kb.topics.len()
        );
        Ok(kb)
    }

    /// 配置了路径时从文件加载，否则使用内置知识库
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::builtin(),
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn fallback(&self) -> &FallbackVocabulary {
        &self.fallback
    }

    pub fn quick_questions(&self) -> &[String] {
        &self.quick_questions
    }
}

fn normalize_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
