//! 联网回答服务 - 业务能力层
//!
//! 每个问题单独发一次带搜索工具的调用

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::UpstreamError;
use crate::models::article::{GroundedAnswer, QuestionSet};
use crate::models::content::{ContentItem, Contents, GenerateConfig, Part};
use crate::services::gateway::ThrottledGateway;
use crate::utils::logging::truncate_text;

/// 联网回答服务
pub struct GroundingService {
    gateway: Arc<ThrottledGateway>,
}

impl GroundingService {
    pub fn new(gateway: Arc<ThrottledGateway>) -> Self {
        Self { gateway }
    }

    /// 回答一个问题
    ///
    /// 回答为空时不算失败；引用只在响应带有搜索入口时出现
    pub async fn answer(&self, question: &str) -> Result<GroundedAnswer, UpstreamError> {
        info!("🔍 联网回答: {}", truncate_text(question, 80));

        let contents = Contents::Items(vec![ContentItem::Part(Part::text(question))]);
        let response = self
            .gateway
            .invoke(contents, Some(GenerateConfig::grounded()))
            .await?;

        let answer = response.text().unwrap_or_default();
        let sources = response.rendered_citations();
        debug!("回答长度: {} 字符，引用 {} 条", answer.len(), sources.len());

        Ok(GroundedAnswer {
            question: question.to_string(),
            answer,
            sources,
        })
    }

    /// 按顺序回答一组问题
    pub async fn answer_all(
        &self,
        questions: &QuestionSet,
    ) -> Result<Vec<GroundedAnswer>, UpstreamError> {
        let mut answers = Vec::with_capacity(questions.len());
        for question in questions.iter() {
            answers.push(self.answer(question).await?);
        }
        Ok(answers)
    }
}
