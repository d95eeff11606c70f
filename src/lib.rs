//! # Grounded Article Writer
//!
//! 一个基于 Gemini 联网搜索、自动撰写带引用来源文章的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 时钟与配额追踪，只暴露能力
//! - `QuotaTracker` - 滑动窗口内的 RPM / TPM / RPD 准入计算
//! - `clients/` - `GeminiClient`，唯一直接访问 API 的地方
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ThrottledGateway` - 所有调用的限流入口
//! - `QuestionService` - 生成并去重章节问题
//! - `GroundingService` - 联网回答单个问题并附带来源
//! - `TemplateRenderer` / `ArticleStore` - 套模板、写文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一篇文章"的完整生成流程
//! - `ArticleFlow` - 规划 → 研究 → 结论 → 转换 HTML
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 持有进程级资源，循环生成多篇文章
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GeminiClient, GenerativeModel};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Clock, ManualClock, QuotaLimits, QuotaTracker, SystemClock};
pub use models::{ArticleRequest, SectionPlan};
pub use orchestrator::App;
pub use services::ThrottledGateway;
pub use workflow::{ArticleFlow, StructuredArticle};
