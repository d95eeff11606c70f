//! 限流调用网关 - 业务能力层
//!
//! 所有对 AI API 的调用都必须经过这里：
//! 估算 token → 向配额追踪器申请准入 → 按需等待 → 发出调用。
//!
//! 上游错误不重试，原样返回给调用方。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};

use crate::clients::GenerativeModel;
use crate::error::UpstreamError;
use crate::infrastructure::{estimate_tokens, Clock, QuotaSnapshot, QuotaTracker};
use crate::models::content::{Contents, GenerateConfig, GenerateRequest, GenerateResponse};

/// 限流调用网关
///
/// 职责：
/// - 每次调用前记录一次准入（无论调用成功与否）
/// - 在调用线程上等待配额
/// - 不解析业务内容
pub struct ThrottledGateway {
    model: Arc<dyn GenerativeModel>,
    tracker: Mutex<QuotaTracker>,
    clock: Arc<dyn Clock>,
    model_name: String,
}

impl ThrottledGateway {
    /// 创建网关；等待使用追踪器的时钟
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        tracker: QuotaTracker,
        model_name: impl Into<String>,
    ) -> Self {
        let clock = tracker.clock();
        Self {
            model,
            tracker: Mutex::new(tracker),
            clock,
            model_name: model_name.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 发出一次限流调用
    ///
    /// # 参数
    /// - `contents`: 文本、单个 part 或混合列表
    /// - `config`: 工具 / 输出模态等调用参数
    ///
    /// # 返回
    /// 返回原始响应；上游失败时返回 `UpstreamError`
    pub async fn invoke(
        &self,
        contents: impl Into<Contents>,
        config: Option<GenerateConfig>,
    ) -> Result<GenerateResponse, UpstreamError> {
        let contents = contents.into();
        let token_cost = estimate_tokens(&contents.prompt_text());

        let wait = self.admit(token_cost);
        if wait > Duration::ZERO {
            info!("⏳ 配额限流，等待 {:.2} 秒后继续", wait.as_secs_f64());
            self.clock.sleep(wait).await;
        }

        debug!("发出调用，估算 token: {}", token_cost);

        let request = GenerateRequest {
            model: self.model_name.clone(),
            contents,
            config,
        };

        self.model.generate_content(&request).await
    }

    /// 发出调用并取出响应文本（去掉首尾空白）
    pub async fn invoke_text(
        &self,
        contents: impl Into<Contents>,
        config: Option<GenerateConfig>,
    ) -> Result<String, UpstreamError> {
        let response = self.invoke(contents, config).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| UpstreamError::empty_content(&self.model_name))
    }

    /// 自创建以来的准入总次数
    pub fn total_admitted(&self) -> u64 {
        self.lock_tracker().total_admitted()
    }

    pub fn quota_snapshot(&self) -> QuotaSnapshot {
        self.lock_tracker().snapshot()
    }

    /// 检查与记账在同一把锁内完成
    fn admit(&self, token_cost: usize) -> Duration {
        let mut tracker = self.lock_tracker();
        tracker.admit(token_cost).wait
    }

    fn lock_tracker(&self) -> std::sync::MutexGuard<'_, QuotaTracker> {
        self.tracker.lock().unwrap_or_else(|e| e.into_inner())
    }
}
