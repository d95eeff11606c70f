//! 文章流程端到端测试：用脚本化的模型代替真实 API

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use grounded_article_writer::clients::GenerativeModel;
use grounded_article_writer::error::UpstreamError;
use grounded_article_writer::infrastructure::{ManualClock, QuotaLimits, QuotaTracker};
use grounded_article_writer::models::{
    ArticleRequest, ArticleStyle, GenerateRequest, GenerateResponse, Tool,
};
use grounded_article_writer::orchestrator::app::MISSING_API_KEY_MESSAGE;
use grounded_article_writer::ui::{BusyIndicator, Presenter};
use grounded_article_writer::{App, ArticleFlow, Config, ThrottledGateway};

/// 按顺序返回预设响应，并记录收到的每个请求；预设用完后返回 "Response N"
#[derive(Default)]
struct ScriptedModel {
    responses: Mutex<VecDeque<Result<GenerateResponse, UpstreamError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    fn new(responses: Vec<Result<GenerateResponse, UpstreamError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate_content(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, UpstreamError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let index = requests.len();
        drop(requests);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenerateResponse::from_text(format!("Response {}", index))))
    }
}

fn text(t: &str) -> Result<GenerateResponse, UpstreamError> {
    Ok(GenerateResponse::from_text(t))
}

fn gateway_with(
    model: Arc<ScriptedModel>,
    limits: QuotaLimits,
) -> (Arc<ThrottledGateway>, ManualClock) {
    let clock = ManualClock::new();
    let tracker = QuotaTracker::new(limits, Arc::new(clock.clone()));
    (
        Arc::new(ThrottledGateway::new(model, tracker, "gemini-test")),
        clock,
    )
}

fn electric_cars_script() -> Vec<Result<GenerateResponse, UpstreamError>> {
    vec![
        text(r#"Here you go: {"history": "History of EVs", "charging": "Charging infrastructure", "conclusion": "Wrap up",}"#),
        text("What was the first electric car?\nWho built it?\n"),
        Ok(GenerateResponse::from_text("The first EV was built in the 1830s.")
            .with_rendered_citation("<div>search</div>")),
        text("How fast is DC charging?"),
        text("Very fast."),
        text("EVs are here to stay."),
        text("Electric cars article"),
    ]
}

#[tokio::test]
async fn test_electric_cars_article() {
    let model = Arc::new(ScriptedModel::new(electric_cars_script()));
    let (gateway, clock) = gateway_with(Arc::clone(&model), QuotaLimits::default());
    let flow = ArticleFlow::new(Arc::clone(&gateway), ArticleStyle::default(), 1);

    let article = flow.run("Electric Cars").await.unwrap();

    assert_eq!(article.topic, "Electric Cars");
    assert_eq!(article.html, "<section><p>Electric cars article</p></section>");
    // 规划 1 次 + 每章 (问题 1 + 回答 1) × 2 + 结论 1 + 转换 1
    assert_eq!(gateway.total_admitted(), 7);
    assert_eq!(clock.elapsed(), Duration::ZERO);

    let requests = model.requests();
    assert_eq!(requests.len(), 7);
    assert!(requests.iter().all(|r| r.model == "gemini-test"));

    let grounded: Vec<usize> = requests
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            r.config
                .as_ref()
                .is_some_and(|c| c.tools.contains(&Tool::GoogleSearch))
        })
        .map(|(i, _)| i)
        .collect();
    assert_eq!(grounded, vec![2, 4]);
    assert_eq!(
        requests[2].contents.prompt_text(),
        "What was the first electric car?"
    );

    let second_questions = requests[3].contents.prompt_text();
    assert!(second_questions.contains("generate 3 unique questions for the section 'Charging infrastructure'"));
    assert!(second_questions.contains("Avoid these existing questions: what was the first electric car?."));

    let conclusion_prompt = requests[5].contents.prompt_text();
    assert!(conclusion_prompt.contains(
        "## History\n\n### What was the first electric car?\n\nThe first EV was built in the 1830s.\n\n*Sources:* <div>search</div>\n\n## Charging\n\n### How fast is DC charging?\n\nVery fast.\n\n"
    ));
    assert!(!conclusion_prompt.contains("Who built it?"));

    let transform_prompt = requests[6].contents.prompt_text();
    assert!(transform_prompt.contains("# Electric Cars\n\n## History"));
    assert!(transform_prompt.ends_with("## Conclusion\n\n<p>EVs are here to stay.</p>\n"));
}

#[tokio::test]
async fn test_upstream_failure_aborts_article() {
    let mut script = electric_cars_script();
    script[5] = Err(UpstreamError::BadStatus {
        model: "gemini-test".into(),
        status: 500,
        body: "internal".into(),
    });
    let model = Arc::new(ScriptedModel::new(script));
    let (gateway, _clock) = gateway_with(Arc::clone(&model), QuotaLimits::default());
    let flow = ArticleFlow::new(Arc::clone(&gateway), ArticleStyle::default(), 1);

    let err = flow.run("Electric Cars").await.unwrap_err();
    assert!(matches!(err, UpstreamError::BadStatus { status: 500, .. }));
    // 失败的调用也计入配额，之后不再发出调用
    assert_eq!(gateway.total_admitted(), 6);
    assert_eq!(model.requests().len(), 6);
}

#[tokio::test]
async fn test_low_rpm_spreads_calls_over_minutes() {
    let model = Arc::new(ScriptedModel::new(electric_cars_script()));
    let limits = QuotaLimits {
        requests_per_minute: 2,
        ..QuotaLimits::default()
    };
    let (gateway, clock) = gateway_with(Arc::clone(&model), limits);
    let flow = ArticleFlow::new(Arc::clone(&gateway), ArticleStyle::default(), 1);

    flow.run("Electric Cars").await.unwrap();

    // 7 次调用两两一组：0s, 60s, 120s, 180s
    assert_eq!(clock.elapsed(), Duration::from_secs(180));
    assert!(gateway.quota_snapshot().minute_requests <= 2);
}

#[tokio::test]
async fn test_unparseable_plan_uses_default_sections() {
    let model = Arc::new(ScriptedModel::new(vec![text("Sorry, I can't do JSON today.")]));
    let (gateway, _clock) = gateway_with(Arc::clone(&model), QuotaLimits::default());
    let flow = ArticleFlow::new(Arc::clone(&gateway), ArticleStyle::default(), 1);

    let article = flow.run("Tides").await.unwrap();

    // 默认规划有 4 个正文章节
    assert_eq!(gateway.total_admitted(), 1 + 4 * 2 + 2);
    assert_eq!(article.html, "<section><p>Response 11</p></section>");

    let requests = model.requests();
    let conclusion_prompt = requests[9].contents.prompt_text();
    for heading in ["## Introduction", "## Background", "## Main Points", "## Examples"] {
        assert!(conclusion_prompt.contains(heading), "missing {}", heading);
    }
    assert!(!conclusion_prompt.contains("## Conclusion"));
}

// ========== 编排层 ==========

#[derive(Default)]
struct RecordingPresenter {
    warnings: Arc<Mutex<Vec<String>>>,
}

impl Presenter for RecordingPresenter {
    fn request_api_key(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn request_article(&mut self) -> Result<Option<ArticleRequest>> {
        Ok(None)
    }

    fn start_busy(&self, _message: &str) -> BusyIndicator {
        BusyIndicator::silent()
    }

    fn show_document(&self, _path: &Path, _html: &str) {}

    fn show_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn show_error(&self, _message: &str) {}

    fn confirm_another(&mut self) -> Result<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_missing_api_key_stops_before_any_call() {
    let presenter = RecordingPresenter::default();
    let warnings = Arc::clone(&presenter.warnings);
    let mut app = App::with_presenter(Config::default(), Box::new(presenter));

    app.run().await.unwrap();

    assert_eq!(*warnings.lock().unwrap(), vec![MISSING_API_KEY_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_generate_writes_document() {
    let output = tempfile::tempdir().unwrap();
    let config = Config {
        template_dir: output.path().join("missing").display().to_string(),
        output_dir: output.path().display().to_string(),
        ..Config::default()
    };
    let app = App::with_presenter(config, Box::new(RecordingPresenter::default()));

    let model = Arc::new(ScriptedModel::new(electric_cars_script()));
    let (gateway, _clock) = gateway_with(model, QuotaLimits::default());
    let mut request = ArticleRequest::new("Electric Cars");
    request.questions_per_section = 1;

    let article = app.generate(&gateway, &request).await.unwrap();

    assert_eq!(article.output_path, output.path().join("ElectricCars.html"));
    let written = std::fs::read_to_string(&article.output_path).unwrap();
    assert_eq!(written, article.document);
    assert!(written.contains("<title>Electric Cars</title>"));
    assert!(written.contains("<section><p>Electric cars article</p></section>"));
}
