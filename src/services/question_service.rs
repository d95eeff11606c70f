//! 问题生成服务 - 业务能力层
//!
//! 只负责"为一个章节想问题"，不关心章节顺序

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::UpstreamError;
use crate::models::article::{QuestionSet, SeenQuestions};
use crate::services::gateway::ThrottledGateway;
use crate::services::prompts::PromptBook;

/// 比需要的数量多要几个候选，给去重留余量
pub const EXTRA_CANDIDATES: usize = 2;

/// 问题生成服务
pub struct QuestionService {
    gateway: Arc<ThrottledGateway>,
    prompts: Arc<PromptBook>,
}

impl QuestionService {
    pub fn new(gateway: Arc<ThrottledGateway>, prompts: Arc<PromptBook>) -> Self {
        Self { gateway, prompts }
    }

    /// 为一个章节生成问题
    ///
    /// # 参数
    /// - `topic`: 文章话题
    /// - `section`: 章节描述
    /// - `count`: 需要保留的问题数
    /// - `seen`: 整篇文章共享的已见问题集合，会被更新
    ///
    /// # 返回
    /// 返回最多 `count` 个新问题
    pub async fn generate(
        &self,
        topic: &str,
        section: &str,
        count: usize,
        seen: &mut SeenQuestions,
    ) -> Result<QuestionSet, UpstreamError> {
        let prompt = self
            .prompts
            .questions(topic, section, count + EXTRA_CANDIDATES, seen);

        let response = self.gateway.invoke_text(prompt, None).await?;
        let candidates = split_candidates(&response);
        debug!("候选问题 {} 个", candidates.len());

        let questions = QuestionSet::select(candidates, seen, count);
        info!("✓ 保留 {} 个问题", questions.len());

        Ok(questions)
    }
}

/// 每行一个问题，去掉空行与首尾空白
pub fn split_candidates(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
