//! 文章保存服务 - 业务能力层
//!
//! 只负责"把最终页面写到磁盘"

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::config::Config;
use crate::error::FileError;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("Invalid non-word regex"));

/// 文章保存服务
pub struct ArticleStore {
    output_dir: PathBuf,
}

impl ArticleStore {
    pub fn new(config: &Config) -> Self {
        Self::with_dir(&config.output_dir)
    }

    pub fn with_dir(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// 话题对应的输出路径
    pub fn path_for(&self, topic: &str) -> PathBuf {
        self.output_dir.join(file_name_for(topic))
    }

    /// 写入文章，返回写入路径
    pub async fn save(&self, topic: &str, html: &str) -> Result<PathBuf, FileError> {
        let path = self.path_for(topic);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| FileError::write_failed(self.output_dir.display().to_string(), e))?;
        tokio::fs::write(&path, html)
            .await
            .map_err(|e| FileError::write_failed(path.display().to_string(), e))?;

        info!("📝 文章已写入: {}", path.display());
        Ok(path)
    }
}

/// 去掉话题中的所有非单词字符，加上 `.html`
pub fn file_name_for(topic: &str) -> String {
    let stem = NON_WORD_RE.replace_all(topic, "");
    if stem.is_empty() {
        "article.html".to_string()
    } else {
        format!("{}.html", stem)
    }
}
