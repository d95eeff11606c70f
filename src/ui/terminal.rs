//! 终端交互界面
//!
//! 收集 API Key 与文章参数、生成期间显示忙碌动画、展示结果或错误。

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use inquire::{Confirm, CustomType, InquireError, Password, PasswordDisplayMode, Select, Text};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::models::article::{
    ArticleRequest, Audience, Tone, DEFAULT_QUESTIONS_PER_SECTION, MAX_QUESTIONS_PER_SECTION,
    MIN_QUESTIONS_PER_SECTION,
};

/// 默认话题
pub const DEFAULT_TOPIC: &str = "Is AI important in Customer Service?";

/// 忙碌动画帧
const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// 界面能力
///
/// 返回 `None` 表示用户取消
pub trait Presenter {
    fn request_api_key(&mut self) -> Result<Option<String>>;

    fn request_article(&mut self) -> Result<Option<ArticleRequest>>;

    fn start_busy(&self, message: &str) -> BusyIndicator;

    fn show_document(&self, path: &Path, html: &str);

    fn show_warning(&self, message: &str);

    fn show_error(&self, message: &str);

    fn confirm_another(&mut self) -> Result<bool>;
}

/// 忙碌动画，结束或丢弃时停止
pub struct BusyIndicator {
    handle: Option<JoinHandle<()>>,
}

impl BusyIndicator {
    /// 在 stderr 上转圈
    pub fn spinner(message: &str) -> Self {
        let message = message.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(100));
            let mut frame = 0usize;
            loop {
                ticker.tick().await;
                let mut stderr = io::stderr();
                let _ = write!(stderr, "\r{} {}", SPINNER_FRAMES[frame], message);
                let _ = stderr.flush();
                frame = (frame + 1) % SPINNER_FRAMES.len();
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// 不显示任何东西
    pub fn silent() -> Self {
        Self { handle: None }
    }

    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let mut stderr = io::stderr();
            let _ = write!(stderr, "\r\x1b[2K");
            let _ = stderr.flush();
        }
    }
}

impl Drop for BusyIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 终端界面
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Presenter for TerminalPresenter {
    fn request_api_key(&mut self) -> Result<Option<String>> {
        let key = optional(
            Password::new("Enter your Gemini API Key:")
                .without_confirmation()
                .with_display_mode(PasswordDisplayMode::Masked)
                .prompt(),
        )?;
        Ok(key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()))
    }

    fn request_article(&mut self) -> Result<Option<ArticleRequest>> {
        let Some(topic) = optional(
            Text::new("Enter the article topic:")
                .with_default(DEFAULT_TOPIC)
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        let Some(audience) = optional(
            Select::new("Target audience:", Audience::ALL.to_vec())
                .with_starting_cursor(0)
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        let Some(tone) = optional(
            Select::new("Tone of the article:", Tone::ALL.to_vec())
                .with_starting_cursor(2)
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        let Some(focus) = optional(
            Text::new("Specific focus or details to include:")
                .with_help_message("e.g. examples, industries, technologies (optional)")
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        let Some(questions_per_section) = optional(
            CustomType::<usize>::new("Number of questions per section:")
                .with_default(DEFAULT_QUESTIONS_PER_SECTION)
                .with_error_message("Please type a whole number")
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        if !(MIN_QUESTIONS_PER_SECTION..=MAX_QUESTIONS_PER_SECTION).contains(&questions_per_section) {
            warn!(
                "每章问题数 {} 超出范围 [{}, {}]，将自动调整",
                questions_per_section, MIN_QUESTIONS_PER_SECTION, MAX_QUESTIONS_PER_SECTION
            );
        }

        Ok(Some(ArticleRequest {
            topic: topic.trim().to_string(),
            audience,
            tone,
            focus,
            questions_per_section,
        }))
    }

    fn start_busy(&self, message: &str) -> BusyIndicator {
        BusyIndicator::spinner(message)
    }

    fn show_document(&self, path: &Path, html: &str) {
        println!("{}", html);
        println!("\n✅ Article generated successfully! Saved to {}", path.display());
    }

    fn show_warning(&self, message: &str) {
        eprintln!("⚠️ {}", message);
    }

    fn show_error(&self, message: &str) {
        eprintln!("❌ {}", message);
    }

    fn confirm_another(&mut self) -> Result<bool> {
        Ok(optional(
            Confirm::new("Generate another article?")
                .with_default(false)
                .prompt(),
        )?
        .unwrap_or(false))
    }
}

/// 用户取消（Esc / Ctrl-C）视为 None，其余错误向上传递
fn optional<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_none() {
        assert!(optional::<String>(Err(InquireError::OperationCanceled))
            .unwrap()
            .is_none());
        assert_eq!(optional(Ok(3usize)).unwrap(), Some(3));
        assert!(optional::<String>(Err(InquireError::NotTTY)).is_err());
    }

    #[tokio::test]
    async fn test_busy_indicator_stops() {
        let busy = BusyIndicator::spinner("working");
        tokio::time::sleep(Duration::from_millis(10)).await;
        busy.finish();
        BusyIndicator::silent().finish();
    }
}
