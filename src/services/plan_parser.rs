//! 章节规划解析 - 业务能力层
//!
//! 从模型的自由文本里抠出 `{...}`，去掉右花括号前的多余逗号，再按 JSON 解码。
//! 解析失败不会抛给调用方：结果是显式的 `Parsed` / `Fallback`，
//! `Fallback` 总是对应固定的五章默认规划。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::ParseError;
use crate::models::article::SectionPlan;

/// 第一个 `{` 到最后一个 `}`（贪婪匹配）
static OBJECT_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("Invalid object span regex"));

/// 右花括号前的逗号
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("Invalid trailing comma regex"));

/// 解析结果
#[derive(Debug)]
pub enum PlanOutcome {
    Parsed(SectionPlan),
    Fallback(ParseError),
}

impl PlanOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanOutcome::Fallback(_))
    }

    /// 取出可用的章节规划；回退时记一条警告并返回默认规划
    pub fn into_plan(self) -> SectionPlan {
        match self {
            PlanOutcome::Parsed(plan) => plan,
            PlanOutcome::Fallback(reason) => {
                warn!("⚠️ 章节规划解析失败: {}，使用默认章节", reason);
                SectionPlan::fallback()
            }
        }
    }
}

/// 解析章节规划（纯函数）
pub fn parse_section_plan(raw_text: &str) -> PlanOutcome {
    match try_parse(raw_text) {
        Ok(plan) => PlanOutcome::Parsed(plan),
        Err(reason) => PlanOutcome::Fallback(reason),
    }
}

fn try_parse(raw_text: &str) -> Result<SectionPlan, ParseError> {
    let span = OBJECT_SPAN_RE
        .find(raw_text.trim())
        .ok_or(ParseError::NoObjectFound)?
        .as_str();

    let cleaned = TRAILING_COMMA_RE.replace_all(span, "}");

    let object = match serde_json::from_str::<JsonValue>(&cleaned)? {
        JsonValue::Object(map) => map,
        _ => return Err(ParseError::NotAnObject),
    };

    let sections = object
        .into_iter()
        .map(|(key, value)| match value {
            JsonValue::String(description) => Ok((key, description)),
            _ => Err(ParseError::NonStringValue { key }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    SectionPlan::new(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> SectionPlan {
        match parse_section_plan(raw) {
            PlanOutcome::Parsed(plan) => plan,
            PlanOutcome::Fallback(e) => panic!("unexpected fallback: {}", e),
        }
    }

    #[test]
    fn test_trailing_comma_is_ignored() {
        assert_eq!(
            parsed(r#"{"introduction": "desc",}"#),
            parsed(r#"{"introduction": "desc"}"#)
        );
    }

    #[test]
    fn test_surrounding_prose_and_fences() {
        let raw = "Sure! Here is the plan:\n```json\n{\n  \"introduction\": \"What EVs are\",\n  \"charging\": \"How charging works\",\n  \"conclusion\": \"Wrap up\"\n}\n```\nLet me know!";
        let plan = parsed(raw);
        assert_eq!(
            plan.keys().collect::<Vec<_>>(),
            vec!["introduction", "charging", "conclusion"]
        );
        assert_eq!(plan.get("charging"), Some("How charging works"));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let raw = r#"noise {"b": "two", "a": "one",} noise"#;
        assert_eq!(parsed(raw), parsed(raw));
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        let outcome = parse_section_plan("I cannot help with that.");
        assert!(matches!(outcome, PlanOutcome::Fallback(ParseError::NoObjectFound)));
        let plan = outcome.into_plan();
        assert_eq!(
            plan.keys().collect::<Vec<_>>(),
            vec!["introduction", "background", "main_points", "examples", "conclusion"]
        );
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let outcome = parse_section_plan("{introduction: 'single quotes'}");
        assert!(matches!(outcome, PlanOutcome::Fallback(ParseError::InvalidJson(_))));
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let outcome = parse_section_plan(r#"{"intro": {"title": "x"}}"#);
        assert!(matches!(
            outcome,
            PlanOutcome::Fallback(ParseError::NonStringValue { ref key }) if key == "intro"
        ));
    }

    #[test]
    fn test_empty_object_falls_back() {
        let outcome = parse_section_plan("{}");
        assert!(matches!(outcome, PlanOutcome::Fallback(ParseError::EmptyPlan)));
        assert_eq!(outcome.into_plan(), SectionPlan::fallback());
    }
}
