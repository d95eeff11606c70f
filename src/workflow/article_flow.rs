//! 文章生成流程 - 流程层
//!
//! 核心职责：定义"一篇文章"的完整生成流程
//!
//! 流程顺序（每一步的输出类型就是下一步的输入类型）：
//! 1. plan       → `SectionPlan`
//! 2. research   → `ResearchedArticle`（每章：想问题 → 联网回答 → 拼装）
//! 3. conclude   → `ConcludedArticle`
//! 4. transform  → `StructuredArticle`
//!
//! 只有章节规划的解析会降级到默认值，任何上游调用失败都直接终止整个流程。

use std::sync::Arc;

use tracing::info;

use crate::error::UpstreamError;
use crate::models::article::{
    section_title, ArticleDraft, ArticleRequest, ArticleStyle, SectionPlan, SeenQuestions,
};
use crate::services::gateway::ThrottledGateway;
use crate::services::grounding_service::GroundingService;
use crate::services::plan_parser::parse_section_plan;
use crate::services::prompts::PromptBook;
use crate::services::question_service::QuestionService;
use crate::workflow::section_ctx::SectionCtx;

/// 正文写完、还没有结论
#[derive(Debug, Clone)]
pub struct ResearchedArticle {
    pub topic: String,
    pub plan: SectionPlan,
    pub draft: ArticleDraft,
}

/// 正文 + 结论
#[derive(Debug, Clone)]
pub struct ConcludedArticle {
    pub topic: String,
    pub draft: ArticleDraft,
}

/// 最终的结构化 HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredArticle {
    pub topic: String,
    pub html: String,
}

/// 文章生成流程
///
/// - 编排各阶段的调用顺序
/// - 持有整篇文章共享的提示词
/// - 只依赖业务能力（services）
pub struct ArticleFlow {
    gateway: Arc<ThrottledGateway>,
    prompts: Arc<PromptBook>,
    question_service: QuestionService,
    grounding_service: GroundingService,
    questions_per_section: usize,
}

impl ArticleFlow {
    /// 创建新的文章生成流程
    pub fn new(
        gateway: Arc<ThrottledGateway>,
        style: ArticleStyle,
        questions_per_section: usize,
    ) -> Self {
        let prompts = Arc::new(PromptBook::new(style));
        Self {
            question_service: QuestionService::new(Arc::clone(&gateway), Arc::clone(&prompts)),
            grounding_service: GroundingService::new(Arc::clone(&gateway)),
            gateway,
            prompts,
            questions_per_section,
        }
    }

    /// 按请求里的风格与问题数创建
    pub fn for_request(gateway: Arc<ThrottledGateway>, request: &ArticleRequest) -> Self {
        Self::new(gateway, request.style(), request.questions_per_section())
    }

    /// 跑完整个流程
    pub async fn run(&self, topic: &str) -> Result<StructuredArticle, UpstreamError> {
        let plan = self.plan(topic).await?;
        let researched = self.research(topic, plan).await?;
        let concluded = self.conclude(researched).await?;
        self.transform(concluded).await
    }

    /// 阶段一：章节规划
    ///
    /// 模型输出无法解析（包括没有任何文本）时使用默认五章规划
    pub async fn plan(&self, topic: &str) -> Result<SectionPlan, UpstreamError> {
        info!("🗂️ 正在规划章节: {}", topic);

        let response = self
            .gateway
            .invoke(self.prompts.section_plan(topic), None)
            .await?;
        let raw = response.text().unwrap_or_default();
        let plan = parse_section_plan(&raw).into_plan();

        info!(
            "✓ 章节规划完成: {}",
            plan.keys().collect::<Vec<_>>().join(", ")
        );
        Ok(plan)
    }

    /// 阶段二：逐章想问题、联网回答、拼装正文
    pub async fn research(
        &self,
        topic: &str,
        plan: SectionPlan,
    ) -> Result<ResearchedArticle, UpstreamError> {
        let mut seen = SeenQuestions::new();
        let mut draft = ArticleDraft::new();
        let total = plan.body_sections().count();

        for (index, (section_id, description)) in plan.body_sections().enumerate() {
            let ctx = SectionCtx::new(section_id, index + 1, total);
            info!("{} ✍️ 开始撰写", ctx);

            let questions = self
                .question_service
                .generate(topic, description, self.questions_per_section, &mut seen)
                .await?;

            let answers = self.grounding_service.answer_all(&questions).await?;
            draft.push_section(&section_title(section_id), &answers);

            info!("{} ✓ 完成，{} 个问题", ctx, answers.len());
        }

        Ok(ResearchedArticle {
            topic: topic.to_string(),
            plan,
            draft,
        })
    }

    /// 阶段三：结论
    pub async fn conclude(
        &self,
        researched: ResearchedArticle,
    ) -> Result<ConcludedArticle, UpstreamError> {
        info!("🧾 正在生成结论...");

        let text = self
            .gateway
            .invoke_text(self.prompts.conclusion(researched.draft.as_str()), None)
            .await?;
        let conclusion = if starts_with_markup(&text) {
            text
        } else {
            format!("<p>{}</p>", text)
        };

        let mut draft = researched.draft;
        draft.push_conclusion(&conclusion);

        Ok(ConcludedArticle {
            topic: researched.topic,
            draft,
        })
    }

    /// 阶段四：整篇转换为结构化 HTML
    pub async fn transform(
        &self,
        concluded: ConcludedArticle,
    ) -> Result<StructuredArticle, UpstreamError> {
        info!("🧱 正在转换为 HTML...");

        let text = self
            .gateway
            .invoke_text(
                self.prompts
                    .html_transform(&concluded.topic, concluded.draft.as_str()),
                None,
            )
            .await?;
        let html = if starts_with_markup(&text) {
            text
        } else {
            format!("<section><p>{}</p></section>", text)
        };

        info!("✓ HTML 转换完成，长度: {} 字符", html.len());

        Ok(StructuredArticle {
            topic: concluded.topic,
            html,
        })
    }
}

fn starts_with_markup(text: &str) -> bool {
    text.trim_start().starts_with('<')
}
