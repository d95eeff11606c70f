pub mod article_flow;
pub mod section_ctx;

pub use article_flow::{ArticleFlow, ConcludedArticle, ResearchedArticle, StructuredArticle};
pub use section_ctx::SectionCtx;
