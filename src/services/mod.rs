pub mod article_store;
pub mod gateway;
pub mod grounding_service;
pub mod plan_parser;
pub mod prompts;
pub mod question_service;
pub mod template_renderer;

pub use article_store::ArticleStore;
pub use gateway::ThrottledGateway;
pub use grounding_service::GroundingService;
pub use plan_parser::{parse_section_plan, PlanOutcome};
pub use prompts::PromptBook;
pub use question_service::QuestionService;
pub use template_renderer::TemplateRenderer;
