//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 1. **收集凭据**：每个进程只询问一次 API Key
//! 2. **资源管理**：创建唯一的客户端、配额追踪器和限流网关，整个进程共享
//! 3. **文章循环**：收集参数 → 跑流程 → 套模板 → 写文件 → 展示
//! 4. **错误展示**：流程失败只影响当前这篇文章

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::clients::{GeminiClient, GenerativeModel};
use crate::config::Config;
use crate::infrastructure::{QuotaTracker, SystemClock};
use crate::models::article::ArticleRequest;
use crate::models::loaders::load_article_request;
use crate::services::article_store::ArticleStore;
use crate::services::gateway::ThrottledGateway;
use crate::services::template_renderer::TemplateRenderer;
use crate::ui::{Presenter, TerminalPresenter};
use crate::utils::logging::{log_article_complete, log_article_start};
use crate::workflow::ArticleFlow;

pub const MISSING_API_KEY_MESSAGE: &str = "Please enter your Gemini API key to proceed.";
pub const MISSING_TOPIC_MESSAGE: &str = "Please enter a topic.";

/// 一篇文章的产出
#[derive(Debug, Clone)]
pub struct GeneratedArticle {
    pub output_path: PathBuf,
    pub document: String,
}

/// 应用主结构
pub struct App {
    config: Config,
    presenter: Box<dyn Presenter>,
    renderer: TemplateRenderer,
    store: ArticleStore,
}

impl App {
    /// 初始化应用（终端界面）
    pub async fn initialize(config: Config) -> Result<Self> {
        Ok(Self::with_presenter(config, Box::new(TerminalPresenter::new())))
    }

    pub fn with_presenter(config: Config, presenter: Box<dyn Presenter>) -> Self {
        let renderer = TemplateRenderer::new(&config);
        let store = ArticleStore::new(&config);
        Self {
            config,
            presenter,
            renderer,
            store,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<()> {
        let Some(api_key) = self.presenter.request_api_key()? else {
            warn!("⚠️ 未提供 API Key，程序结束");
            self.presenter.show_warning(MISSING_API_KEY_MESSAGE);
            return Ok(());
        };

        let client = GeminiClient::new(&self.config, api_key)?;
        let gateway = Arc::new(build_gateway(Arc::new(client), &self.config));

        loop {
            let request = match self.next_request().await {
                Ok(Some(request)) => request,
                Ok(None) => {
                    info!("👋 用户取消，程序结束");
                    break;
                }
                Err(e) => {
                    error!("❌ 读取文章参数失败: {}", e);
                    self.presenter.show_error(&e.to_string());
                    break;
                }
            };

            if request.topic.trim().is_empty() {
                self.presenter.show_warning(MISSING_TOPIC_MESSAGE);
            } else {
                self.generate_and_show(&gateway, &request).await;
            }

            if self.config.article_request_file.is_some() || !self.presenter.confirm_another()? {
                break;
            }
        }

        info!("📞 本次运行共调用 API {} 次", gateway.total_admitted());
        Ok(())
    }

    /// 生成一篇文章并写入输出目录
    ///
    /// # 参数
    /// - `gateway`: 进程内共享的限流网关
    /// - `request`: 话题与风格参数（话题不能为空）
    ///
    /// # 返回
    /// 返回输出路径和完整 HTML 文档
    pub async fn generate(
        &self,
        gateway: &Arc<ThrottledGateway>,
        request: &ArticleRequest,
    ) -> Result<GeneratedArticle> {
        let topic = request.topic.trim();
        log_article_start(request);

        let flow = ArticleFlow::for_request(Arc::clone(gateway), request);
        let article = flow.run(topic).await?;

        let document = self.renderer.render(topic, &article.html).await;
        let output_path = self.store.save(topic, &document).await?;

        log_article_complete(&output_path.display().to_string(), gateway.total_admitted());

        Ok(GeneratedArticle {
            output_path,
            document,
        })
    }

    async fn generate_and_show(&self, gateway: &Arc<ThrottledGateway>, request: &ArticleRequest) {
        let busy = self
            .presenter
            .start_busy("Generating article... This may take a few minutes.");
        let result = self.generate(gateway, request).await;
        busy.finish();

        match result {
            Ok(article) => self
                .presenter
                .show_document(&article.output_path, &article.document),
            Err(e) => {
                error!("❌ 文章生成失败: {:#}", e);
                self.presenter
                    .show_error(&format!("Error generating article: {:#}", e));
            }
        }
    }

    /// 配置了请求文件时从文件读取，否则询问用户
    async fn next_request(&mut self) -> Result<Option<ArticleRequest>> {
        match &self.config.article_request_file {
            Some(path) => {
                info!("📁 从文件读取文章参数: {}", path);
                Ok(Some(load_article_request(Path::new(path)).await?))
            }
            None => self.presenter.request_article(),
        }
    }
}

/// 组装共享的限流网关
pub fn build_gateway(model: Arc<dyn GenerativeModel>, config: &Config) -> ThrottledGateway {
    let tracker = QuotaTracker::new(config.quota_limits(), Arc::new(SystemClock));
    ThrottledGateway::new(model, tracker, config.gemini_model_name.clone())
}
