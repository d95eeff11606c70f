//! 文章生成过程中的数据模型

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 结论章节的键，不参与正文循环
pub const CONCLUSION_KEY: &str = "conclusion";

/// 每章问题数的允许范围
pub const MIN_QUESTIONS_PER_SECTION: usize = 1;
pub const MAX_QUESTIONS_PER_SECTION: usize = 5;
pub const DEFAULT_QUESTIONS_PER_SECTION: usize = 3;

// ========== 章节规划 ==========

/// 章节规划：章节标识（slug）→ 描述
///
/// 不为空、键唯一、保持插入顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    sections: Vec<(String, String)>,
}

impl SectionPlan {
    /// 构造章节规划；重复的键保留第一次出现的位置、最后一次的描述
    pub fn new(sections: Vec<(String, String)>) -> Result<Self, ParseError> {
        let mut deduped: Vec<(String, String)> = Vec::with_capacity(sections.len());
        for (key, description) in sections {
            match deduped.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = description,
                None => deduped.push((key, description)),
            }
        }
        if deduped.is_empty() {
            return Err(ParseError::EmptyPlan);
        }
        Ok(Self { sections: deduped })
    }

    /// 解析失败时使用的固定五章规划
    pub fn fallback() -> Self {
        Self {
            sections: vec![
                ("introduction".into(), "An introduction to the topic.".into()),
                ("background".into(), "Background information on the topic.".into()),
                ("main_points".into(), "The main technical points, with examples.".into()),
                ("examples".into(), "Real-world examples illustrating the key concepts.".into()),
                (CONCLUSION_KEY.into(), "A conclusion summarizing the article.".into()),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, d)| d.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().map(|(k, d)| (k.as_str(), d.as_str()))
    }

    /// 正文章节（排除 conclusion）
    pub fn body_sections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| *k != CONCLUSION_KEY)
    }
}

/// slug 转标题：下划线换成空格，每个单词首字母大写、其余小写
pub fn section_title(slug: &str) -> String {
    let mut title = String::with_capacity(slug.len());
    let mut prev_is_alpha = false;
    for c in slug.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_is_alpha {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            title.push(c);
            prev_is_alpha = false;
        }
    }
    title
}

// ========== 问题 ==========

/// 整篇文章范围内已经用过的问题（大小写不敏感）
#[derive(Debug, Clone, Default)]
pub struct SeenQuestions {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenQuestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, question: &str) -> bool {
        self.index.contains(&question.to_lowercase())
    }

    /// 记录一个问题，已存在时返回 false
    pub fn insert(&mut self, question: &str) -> bool {
        let key = question.to_lowercase();
        if self.index.insert(key.clone()) {
            self.order.push(key);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按记录顺序返回（小写形式）
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// 某一章节保留下来的问题
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<String>,
}

impl QuestionSet {
    /// 从候选问题中按顺序挑出前 `limit` 个没见过的问题，并记入 `seen`
    pub fn select<I, S>(candidates: I, seen: &mut SeenQuestions, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut questions = Vec::new();
        for candidate in candidates {
            if questions.len() >= limit {
                break;
            }
            let candidate = candidate.as_ref();
            if seen.insert(candidate) {
                questions.push(candidate.to_string());
            }
        }
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(String::as_str)
    }
}

/// 一个问题的联网回答
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedAnswer {
    pub question: String,
    pub answer: String,
    /// 搜索结果渲染片段
    pub sources: Vec<String>,
}

// ========== 文稿 ==========

/// 正在拼装的文稿，只追加
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDraft {
    text: String,
}

impl ArticleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个正文章节
    pub fn push_section(&mut self, title: &str, answers: &[GroundedAnswer]) {
        self.text.push_str(&format!("## {}\n\n", title));
        for answer in answers {
            self.text
                .push_str(&format!("### {}\n\n{}\n\n", answer.question, answer.answer));
            if !answer.sources.is_empty() {
                self.text
                    .push_str(&format!("*Sources:* {}\n\n", answer.sources.join(", ")));
            }
        }
    }

    /// 追加结论
    pub fn push_conclusion(&mut self, conclusion: &str) {
        self.text
            .push_str(&format!("## Conclusion\n\n{}\n", conclusion));
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ========== 文章风格与请求 ==========

/// 目标读者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Audience {
    #[default]
    Beginners,
    Intermediate,
    Experts,
}

impl Audience {
    pub const ALL: [Audience; 3] = [Audience::Beginners, Audience::Intermediate, Audience::Experts];
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Audience::Beginners => write!(f, "Beginners"),
            Audience::Intermediate => write!(f, "Intermediate"),
            Audience::Experts => write!(f, "Experts"),
        }
    }
}

/// 行文语气
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tone {
    Casual,
    Formal,
    #[default]
    Technical,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Casual, Tone::Formal, Tone::Technical];
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Casual => write!(f, "Casual"),
            Tone::Formal => write!(f, "Formal"),
            Tone::Technical => write!(f, "Technical"),
        }
    }
}

/// 影响提示词的文章风格
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleStyle {
    pub audience: Audience,
    pub tone: Tone,
    /// 需要重点覆盖的内容（可为空）
    pub focus: String,
}

/// 一次文章生成请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRequest {
    pub topic: String,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub focus: String,
    #[serde(default = "default_questions_per_section")]
    pub questions_per_section: usize,
}

fn default_questions_per_section() -> usize {
    DEFAULT_QUESTIONS_PER_SECTION
}

impl ArticleRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            audience: Audience::default(),
            tone: Tone::default(),
            focus: String::new(),
            questions_per_section: DEFAULT_QUESTIONS_PER_SECTION,
        }
    }

    pub fn style(&self) -> ArticleStyle {
        ArticleStyle {
            audience: self.audience,
            tone: self.tone,
            focus: self.focus.trim().to_string(),
        }
    }

    /// 每章问题数，限制在 1..=5
    pub fn questions_per_section(&self) -> usize {
        self.questions_per_section
            .clamp(MIN_QUESTIONS_PER_SECTION, MAX_QUESTIONS_PER_SECTION)
    }
}
