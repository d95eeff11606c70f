/// Gemini API 客户端
///
/// 封装 `generateContent` REST 调用，只负责 HTTP 传输与 JSON 编解码，
/// 不做限流、不做重试。
use crate::config::Config;
use crate::error::UpstreamError;
use crate::models::content::{
    GenerateConfig, GenerateRequest, GenerateResponse, Part, Tool,
};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

/// 生成式 AI 能力
///
/// 网关只依赖这个 trait，测试里可以换成脚本化的实现
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_content(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, UpstreamError>;
}

/// Gemini 客户端
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    ///
    /// # 参数
    /// - `config`: 程序配置（API 地址、超时）
    /// - `api_key`: 由界面收集的 API Key
    pub fn new(config: &Config, api_key: impl Into<String>) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| UpstreamError::request_failed(&config.gemini_model_name, e))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            api_base_url: config.gemini_api_base_url.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, UpstreamError> {
        let model = request.model.as_str();
        debug!("调用 Gemini API，模型: {}", model);

        let body = WireRequest::from(request);

        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini API 请求失败: {}", e);
                UpstreamError::request_failed(model, e)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::request_failed(model, e))?;

        if !status.is_success() {
            warn!("Gemini API 返回错误状态: {}", status);
            return Err(UpstreamError::BadStatus {
                model: model.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("Gemini API 调用成功，响应长度: {} 字节", text.len());

        serde_json::from_str(&text).map_err(|e| UpstreamError::DecodeFailed {
            model: model.to_string(),
            source: e,
        })
    }
}

// ========== 请求体 ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    google_search: EmptyObject,
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    response_modalities: Vec<String>,
}

impl From<&GenerateRequest> for WireRequest {
    fn from(request: &GenerateRequest) -> Self {
        let contents = vec![WireContent {
            role: "user",
            parts: request.contents.to_parts(),
        }];

        let (tools, generation_config) = match &request.config {
            Some(config) => wire_config(config),
            None => (Vec::new(), None),
        };

        Self {
            contents,
            tools,
            generation_config,
        }
    }
}

fn wire_config(config: &GenerateConfig) -> (Vec<WireTool>, Option<WireGenerationConfig>) {
    let tools = config
        .tools
        .iter()
        .map(|tool| match tool {
            Tool::GoogleSearch => WireTool {
                google_search: EmptyObject {},
            },
        })
        .collect();

    let generation_config = if config.response_modalities.is_empty() {
        None
    } else {
        Some(WireGenerationConfig {
            response_modalities: config.response_modalities.clone(),
        })
    };

    (tools, generation_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::Contents;
    use serde_json::json;

    #[test]
    fn test_plain_request_body() {
        let request = GenerateRequest {
            model: "gemini-2.0-flash".into(),
            contents: Contents::from("Write about tides"),
            config: None,
        };
        let body = serde_json::to_value(WireRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({"contents": [{"role": "user", "parts": [{"text": "Write about tides"}]}]})
        );
    }

    #[test]
    fn test_grounded_request_body() {
        let request = GenerateRequest {
            model: "gemini-2.0-flash".into(),
            contents: Contents::Items(vec![crate::models::content::ContentItem::Part(
                Part::text("Why is the sky blue?"),
            )]),
            config: Some(GenerateConfig::grounded()),
        };
        let body = serde_json::to_value(WireRequest::from(&request)).unwrap();
        assert_eq!(body["tools"], json!([{"google_search": {}}]));
        assert_eq!(body["generationConfig"], json!({"responseModalities": ["TEXT"]}));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Why is the sky blue?");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = Config {
            gemini_api_base_url: "https://example.test/v1beta/".into(),
            ..Config::default()
        };
        let client = GeminiClient::new(&config, "key").unwrap();
        assert_eq!(
            client.endpoint("gemini-2.0-flash"),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    /// 测试真实 API 连接
    ///
    /// 运行方式：
    /// ```bash
    /// GEMINI_API_KEY=... cargo test test_live_generate -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_generate() {
        let _ = tracing_subscriber::fmt::try_init();

        let api_key = std::env::var("GEMINI_API_KEY").expect("需要设置 GEMINI_API_KEY");
        let config = Config::default();
        let client = GeminiClient::new(&config, api_key).unwrap();

        let request = GenerateRequest {
            model: config.gemini_model_name.clone(),
            contents: Contents::from("Say hello in one short sentence."),
            config: None,
        };
        let response = client.generate_content(&request).await.unwrap();
        println!("响应: {:?}", response.text());
        assert!(response.text().is_some());
    }
}
