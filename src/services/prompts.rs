//! 提示词模板
//!
//! 所有阶段的提示词都在这里，读者、语气、重点内容在构造时确定，
//! 各阶段只负责填入话题和上一阶段的产出。

use crate::models::article::{ArticleStyle, SeenQuestions};

/// 一篇文章使用的提示词集合
#[derive(Debug, Clone, Default)]
pub struct PromptBook {
    style: ArticleStyle,
}

impl PromptBook {
    pub fn new(style: ArticleStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &ArticleStyle {
        &self.style
    }

    fn audience(&self) -> String {
        self.style.audience.to_string().to_lowercase()
    }

    fn tone(&self) -> String {
        self.style.tone.to_string().to_lowercase()
    }

    /// 重点内容为空时不出现在提示词里
    fn focus_clause(&self, template: impl Fn(&str) -> String) -> String {
        if self.style.focus.is_empty() {
            String::new()
        } else {
            template(&self.style.focus)
        }
    }

    /// 章节规划
    pub fn section_plan(&self, topic: &str) -> String {
        format!(
            "You are an expert in writing articles for a {} audience. Given the topic '{}', \
             generate a dictionary of 5-7 section names and descriptions. \
             Use snake_case keys (e.g., 'introduction') and brief descriptions as values. \
             The tone should be {}.{} \
             Output in valid JSON format with no trailing commas or comments.",
            self.audience(),
            topic,
            self.tone(),
            self.focus_clause(|f| format!(" Include {} in the content where relevant.", f)),
        )
    }

    /// 章节问题
    ///
    /// # 参数
    /// - `section`: 章节描述
    /// - `count`: 需要生成的候选问题数
    /// - `existing`: 整篇文章已用过的问题
    pub fn questions(
        &self,
        topic: &str,
        section: &str,
        count: usize,
        existing: &SeenQuestions,
    ) -> String {
        format!(
            "You are a technical expert writing for a {} audience. \
             For an article titled '{}', generate {} unique questions for the section '{}'. \
             Use a {} tone{}. \
             Avoid these existing questions: {}. \
             Return only the questions, one per line.",
            self.audience(),
            topic,
            count,
            section,
            self.tone(),
            self.focus_clause(|f| format!(" and incorporate {} where applicable", f)),
            existing.iter().collect::<Vec<_>>().join(", "),
        )
    }

    /// 结论
    pub fn conclusion(&self, article_body: &str) -> String {
        format!(
            "You are an experienced technical writer who explains complex subjects to a {} audience. \
             Given the main body of an article: {}, write a conclusion that \
             summarizes the key ideas, clarifies technical concepts with examples, and maintains a {} tone. \
             Format your response as valid HTML with proper paragraph tags. Do not use Markdown formatting.",
            self.audience(),
            article_body,
            self.tone(),
        )
    }

    /// 整篇转 HTML
    pub fn html_transform(&self, topic: &str, sections_text: &str) -> String {
        format!(
            "You are an expert in HTML formatting. Convert the following article content into valid, well-structured HTML. \
             Ensure proper use of <h1> for the title, <h2> for section titles, <h3> for questions, <p> for paragraphs, \
             <table> for any tabular data (detect tables from text like rows with consistent separators), \
             <ul> or <ol> for lists, and <a> tags for URLs. Use semantic HTML and avoid Markdown. \
             Wrap each section in a <section> tag with an appropriate id. Here's the article:\n\n\
             # {}\n\n{}",
            topic, sections_text,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::article::{Audience, Tone};

    #[test]
    fn test_style_flows_into_prompts() {
        let book = PromptBook::new(ArticleStyle {
            audience: Audience::Experts,
            tone: Tone::Casual,
            focus: "solid-state batteries".into(),
        });
        let plan = book.section_plan("Electric Cars");
        assert!(plan.contains("for a experts audience"));
        assert!(plan.contains("The tone should be casual."));
        assert!(plan.contains("Include solid-state batteries"));

        let mut seen = SeenQuestions::new();
        seen.insert("What is an EV?");
        let questions = book.questions("Electric Cars", "History of EVs", 4, &seen);
        assert!(questions.contains("generate 4 unique questions for the section 'History of EVs'"));
        assert!(questions.contains("Avoid these existing questions: what is an ev?."));
        assert!(questions.contains("incorporate solid-state batteries"));
    }

    #[test]
    fn test_empty_focus_is_omitted() {
        let book = PromptBook::default();
        let plan = book.section_plan("Tides");
        assert!(!plan.contains("Include"));
        let questions = book.questions("Tides", "Basics", 3, &SeenQuestions::new());
        assert!(questions.contains("Use a technical tone."));
    }

    #[test]
    fn test_transform_embeds_title_and_body() {
        let prompt = PromptBook::default().html_transform("Tides", "## Basics\n\nbody");
        assert!(prompt.ends_with("# Tides\n\n## Basics\n\nbody"));
    }
}
