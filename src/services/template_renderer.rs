//! 模板渲染服务 - 业务能力层
//!
//! 把结构化 HTML 套进文章模板。模板里可用的占位符：
//! `{{ topic }}`、`{{ article_content }}`、`{{ current_date }}`，未知占位符渲染为空。
//! 模板读取失败时退回到内置的带样式页面，不会让生成失败。

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::TemplateError;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("Invalid placeholder regex"));

const FALLBACK_STYLE: &str = r#"        body { font-family: Arial, sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }
        h1, h2, h3 { color: #333; }
        h1 { font-size: 28px; margin-bottom: 20px; }
        h2 { font-size: 24px; margin-top: 30px; margin-bottom: 15px; border-bottom: 1px solid #eee; padding-bottom: 10px; }
        h3 { font-size: 20px; margin-top: 25px; margin-bottom: 10px; color: #444; }
        p { margin-bottom: 15px; }
        .sources { font-size: 0.9em; color: #666; margin-top: 5px; margin-bottom: 20px; }
        code { background-color: #f4f4f4; padding: 2px 4px; border-radius: 3px; font-family: monospace; }
        pre { background-color: #f4f4f4; padding: 10px; border-radius: 5px; overflow-x: auto; font-family: monospace; }
        section { margin-bottom: 40px; }
        ul, ol { margin-bottom: 15px; padding-left: 30px; }"#;

/// 模板渲染服务
pub struct TemplateRenderer {
    template_path: PathBuf,
}

impl TemplateRenderer {
    pub fn new(config: &Config) -> Self {
        Self::with_path(Path::new(&config.template_dir).join(&config.template_file))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: path.into(),
        }
    }

    /// 渲染完整页面，失败时使用内置页面
    pub async fn render(&self, topic: &str, article_content: &str) -> String {
        match self.render_template(topic, article_content).await {
            Ok(html) => html,
            Err(e) => {
                warn!("⚠️ 模板渲染失败: {}，使用内置页面", e);
                fallback_document(topic, article_content)
            }
        }
    }

    async fn render_template(
        &self,
        topic: &str,
        article_content: &str,
    ) -> Result<String, TemplateError> {
        let template = tokio::fs::read_to_string(&self.template_path)
            .await
            .map_err(|e| TemplateError::ReadFailed {
                path: self.template_path.display().to_string(),
                source: e,
            })?;

        let current_date = chrono::Local::now().format("%Y-%m-%d").to_string();
        Ok(fill_placeholders(&template, topic, article_content, &current_date))
    }
}

fn fill_placeholders(template: &str, topic: &str, article_content: &str, current_date: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "topic" => html_escape::encode_text(topic).into_owned(),
            "article_content" => article_content.to_string(),
            "current_date" => current_date.to_string(),
            other => {
                debug!("未知占位符: {}", other);
                String::new()
            }
        })
        .into_owned()
}

/// 内置页面
pub fn fallback_document(topic: &str, article_content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
    <style>
{}
    </style>
</head>
<body>
    {}
</body>
</html>"#,
        html_escape::encode_text(topic),
        FALLBACK_STYLE,
        article_content
    )
}
