use crate::error::FileError;
use crate::models::article::ArticleRequest;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载文章请求
///
/// ```toml
/// topic = "Electric Cars"
/// audience = "Intermediate"
/// tone = "Formal"
/// focus = "battery chemistry"
/// questions_per_section = 2
/// ```
pub async fn load_article_request(toml_file_path: &Path) -> Result<ArticleRequest, FileError> {
    let path = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| FileError::read_failed(&path, e))?;

    let request: ArticleRequest =
        toml::from_str(&content).map_err(|e| FileError::TomlParseFailed { path, source: e })?;

    tracing::info!("已加载文章请求: {}", request.topic);

    Ok(request)
}
