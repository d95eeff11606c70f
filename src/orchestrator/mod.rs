//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有进程级资源（API 客户端、配额追踪器、限流网关），
//! 循环收集文章参数并委托 workflow 生成文章。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (一个进程，多篇文章)
//!     ↓
//! workflow::ArticleFlow (处理单篇文章)
//!     ↓
//! services (能力层：gateway / questions / grounding / template / store)
//!     ↓
//! infrastructure (基础设施：Clock / QuotaTracker)
//! ```

pub mod app;

pub use app::{build_gateway, App, GeneratedArticle};
