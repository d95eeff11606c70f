pub mod article;
pub mod content;
pub mod loaders;

pub use article::{
    section_title, ArticleDraft, ArticleRequest, ArticleStyle, Audience, GroundedAnswer,
    QuestionSet, SectionPlan, SeenQuestions, Tone, CONCLUSION_KEY,
};
pub use content::{
    ContentItem, Contents, GenerateConfig, GenerateRequest, GenerateResponse, Part, Tool,
};
pub use loaders::load_article_request;
