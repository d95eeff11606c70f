//! 生成式 AI 调用的载荷与响应
//!
//! 请求侧：`Contents` 可以是一段文本、一个结构化 part，或文本与 part 的混合列表。
//! 响应侧：字段名与 Gemini `generateContent` 的 JSON 保持一致（camelCase）。

use serde::{Deserialize, Serialize};

/// 结构化内容片段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// 混合列表中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Text(String),
    Part(Part),
}

impl ContentItem {
    fn extract_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text(text) => Some(text),
            ContentItem::Part(part) => part.text.as_deref(),
        }
    }
}

/// 一次调用的内容载荷
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Text(String),
    Part(Part),
    Items(Vec<ContentItem>),
}

impl Contents {
    /// 提取所有可提取的文本片段，用空格拼接（用于 token 估算）
    pub fn prompt_text(&self) -> String {
        match self {
            Contents::Text(text) => text.clone(),
            Contents::Part(part) => part.text.clone().unwrap_or_default(),
            Contents::Items(items) => items
                .iter()
                .filter_map(ContentItem::extract_text)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// 转成 part 列表（用于构造请求体）
    pub fn to_parts(&self) -> Vec<Part> {
        match self {
            Contents::Text(text) => vec![Part::text(text.clone())],
            Contents::Part(part) => vec![part.clone()],
            Contents::Items(items) => items
                .iter()
                .map(|item| match item {
                    ContentItem::Text(text) => Part::text(text.clone()),
                    ContentItem::Part(part) => part.clone(),
                })
                .collect(),
        }
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Contents::Text(text.to_string())
    }
}

impl From<String> for Contents {
    fn from(text: String) -> Self {
        Contents::Text(text)
    }
}

impl From<Part> for Contents {
    fn from(part: Part) -> Self {
        Contents::Part(part)
    }
}

/// 可挂载的工具
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// 联网搜索（grounding）
    GoogleSearch,
}

/// 调用参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateConfig {
    pub tools: Vec<Tool>,
    pub response_modalities: Vec<String>,
}

impl GenerateConfig {
    /// 带联网搜索、只要文本输出的配置
    pub fn grounded() -> Self {
        Self {
            tools: vec![Tool::GoogleSearch],
            response_modalities: vec!["TEXT".to_string()],
        }
    }
}

/// 一次完整的调用请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Contents,
    pub config: Option<GenerateConfig>,
}

// ========== 响应 ==========

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub search_entry_point: Option<SearchEntryPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntryPoint {
    #[serde(default)]
    pub rendered_content: Option<String>,
}

impl GenerateResponse {
    /// 只含一段文本的响应
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(CandidateContent {
                    parts: vec![Part::text(text)],
                }),
                grounding_metadata: None,
            }],
        }
    }

    /// 附带一段搜索引用的响应
    pub fn with_rendered_citation(mut self, rendered: impl Into<String>) -> Self {
        if let Some(candidate) = self.candidates.first_mut() {
            candidate.grounding_metadata = Some(GroundingMetadata {
                search_entry_point: Some(SearchEntryPoint {
                    rendered_content: Some(rendered.into()),
                }),
            });
        }
        self
    }

    /// 第一个候选的所有文本片段拼接；没有任何文本时返回 None
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// 第一个候选的搜索引用片段
    pub fn rendered_citations(&self) -> Vec<String> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .and_then(|m| m.search_entry_point.as_ref())
            .and_then(|e| e.rendered_content.clone())
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text_from_mixed_items() {
        let contents = Contents::Items(vec![
            ContentItem::Text("first".to_string()),
            ContentItem::Part(Part::text("second part")),
            ContentItem::Part(Part::default()),
            ContentItem::Text("third".to_string()),
        ]);
        assert_eq!(contents.prompt_text(), "first second part third");
    }

    #[test]
    fn test_prompt_text_from_single_part() {
        let contents: Contents = Part::text("what is a battery?").into();
        assert_eq!(contents.prompt_text(), "what is a battery?");
        assert_eq!(Contents::Part(Part::default()).prompt_text(), "");
    }

    #[test]
    fn test_response_text_and_citations() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "world"}]},
                "groundingMetadata": {
                    "searchEntryPoint": {"renderedContent": "<div>chips</div>"},
                    "webSearchQueries": ["hello"]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3}
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello world"));
        assert_eq!(response.rendered_citations(), vec!["<div>chips</div>"]);
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert_eq!(response.text(), None);
        assert!(response.rendered_citations().is_empty());
    }
}
