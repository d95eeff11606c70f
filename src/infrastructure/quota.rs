//! 配额追踪器 - 基础设施层
//!
//! 维护三个滑动窗口：每分钟请求数、每分钟 token 数、每天请求数。
//! 只负责"算出要等多久并记账"，真正的等待由网关完成。
//!
//! token 数用提示词的空白分词数估算，只是一个便宜的近似值，和计费口径不完全一致。

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::infrastructure::clock::Clock;

/// 估算提示词的 token 数（按空白分词计数）
pub fn estimate_tokens(prompt: &str) -> usize {
    prompt.split_whitespace().count()
}

/// 配额限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    pub requests_per_minute: usize,
    pub tokens_per_minute: usize,
    pub requests_per_day: usize,
    pub minute_window: Duration,
    pub day_window: Duration,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            requests_per_minute: 15,
            tokens_per_minute: 1_000_000,
            requests_per_day: 1500,
            minute_window: Duration::from_secs(60),
            day_window: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// 配额维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDimension {
    RequestsPerMinute,
    TokensPerMinute,
    RequestsPerDay,
}

impl fmt::Display for QuotaDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaDimension::RequestsPerMinute => write!(f, "RPM"),
            QuotaDimension::TokensPerMinute => write!(f, "TPM"),
            QuotaDimension::RequestsPerDay => write!(f, "RPD"),
        }
    }
}

/// 一次准入的结果
///
/// 准入总会成功，`wait` 是调用方在发出请求前必须等待的时长
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub wait: Duration,
    pub token_cost: usize,
    /// 触发等待的维度及各自的等待时长（按检查顺序）
    pub throttled: Vec<(QuotaDimension, Duration)>,
}

impl Admission {
    pub fn is_throttled(&self) -> bool {
        !self.throttled.is_empty()
    }
}

/// 当前窗口内的计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuotaSnapshot {
    pub minute_requests: usize,
    pub minute_tokens: usize,
    pub day_requests: usize,
}

#[derive(Debug, Clone, Copy)]
struct TokenEvent {
    at: Instant,
    tokens: usize,
}

/// 配额追踪器
///
/// 职责：
/// - 惰性清理过期事件
/// - 计算三个维度的等待时长（依次检查、等待时长累加）
/// - 在同一次调用里完成"检查 + 记账"，外部加锁即可保证原子性
pub struct QuotaTracker {
    limits: QuotaLimits,
    clock: Arc<dyn Clock>,
    minute_requests: VecDeque<Instant>,
    minute_tokens: VecDeque<TokenEvent>,
    day_requests: VecDeque<Instant>,
    total_admitted: u64,
}

impl QuotaTracker {
    pub fn new(limits: QuotaLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            limits,
            clock,
            minute_requests: VecDeque::new(),
            minute_tokens: VecDeque::new(),
            day_requests: VecDeque::new(),
            total_admitted: 0,
        }
    }

    pub fn limits(&self) -> &QuotaLimits {
        &self.limits
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// 自进程启动以来的准入总次数
    pub fn total_admitted(&self) -> u64 {
        self.total_admitted
    }

    /// 申请一次调用
    ///
    /// # 参数
    /// - `token_cost`: 本次调用的估算 token 数
    ///
    /// # 返回
    /// 返回需要等待的时长；事件按"当前时间 + 等待时长"记账
    pub fn admit(&mut self, token_cost: usize) -> Admission {
        let now = self.clock.now();
        self.evict(now);

        let mut throttled = Vec::new();

        if let Some(wait) = self.request_wait(&self.minute_requests, self.limits.requests_per_minute, self.limits.minute_window, now) {
            warn!("⏳ RPM 达到上限，等待 {:.2} 秒", wait.as_secs_f64());
            throttled.push((QuotaDimension::RequestsPerMinute, wait));
        }

        if let Some(wait) = self.token_wait(token_cost, now) {
            warn!("⏳ TPM 达到上限，等待 {:.2} 秒", wait.as_secs_f64());
            throttled.push((QuotaDimension::TokensPerMinute, wait));
        }

        if let Some(wait) = self.request_wait(&self.day_requests, self.limits.requests_per_day, self.limits.day_window, now) {
            warn!("⏳ RPD 达到上限，等待 {:.2} 秒", wait.as_secs_f64());
            throttled.push((QuotaDimension::RequestsPerDay, wait));
        }

        let wait: Duration = throttled.iter().map(|(_, d)| *d).sum();
        let at = now + wait;

        self.minute_requests.push_back(at);
        self.minute_tokens.push_back(TokenEvent {
            at,
            tokens: token_cost,
        });
        self.day_requests.push_back(at);
        self.total_admitted += 1;

        debug!(
            "准入第 {} 次调用，估算 token: {}，等待: {:.2} 秒",
            self.total_admitted,
            token_cost,
            wait.as_secs_f64()
        );

        Admission {
            wait,
            token_cost,
            throttled,
        }
    }

    /// 当前时间点各窗口内的计数
    pub fn snapshot(&mut self) -> QuotaSnapshot {
        let now = self.clock.now();
        self.evict(now);
        QuotaSnapshot {
            minute_requests: self.minute_requests.len(),
            minute_tokens: self.minute_tokens.iter().map(|e| e.tokens).sum(),
            day_requests: self.day_requests.len(),
        }
    }

    // ========== 内部方法 ==========

    /// 清理窗口外的事件（年龄达到窗口长度即视为过期）
    fn evict(&mut self, now: Instant) {
        let minute = self.limits.minute_window;
        let day = self.limits.day_window;

        while matches!(self.minute_requests.front(), Some(t) if now.saturating_duration_since(*t) >= minute) {
            self.minute_requests.pop_front();
        }
        while matches!(self.minute_tokens.front(), Some(e) if now.saturating_duration_since(e.at) >= minute) {
            self.minute_tokens.pop_front();
        }
        while matches!(self.day_requests.front(), Some(t) if now.saturating_duration_since(*t) >= day) {
            self.day_requests.pop_front();
        }
    }

    /// 请求数维度：已满时等待到足够多的最老事件过期
    fn request_wait(
        &self,
        events: &VecDeque<Instant>,
        limit: usize,
        window: Duration,
        now: Instant,
    ) -> Option<Duration> {
        let limit = limit.max(1);
        if events.len() < limit {
            return None;
        }
        // 需要腾出 len - limit + 1 个位置
        let must_expire = events.len() - limit;
        let expires_at = events[must_expire] + window;
        Some(expires_at.saturating_duration_since(now))
    }

    /// token 维度：加上本次估算后超限时，等待到剩余量足以容纳本次为止
    fn token_wait(&self, token_cost: usize, now: Instant) -> Option<Duration> {
        let limit = self.limits.tokens_per_minute;
        let mut in_window: usize = self.minute_tokens.iter().map(|e| e.tokens).sum();
        if in_window + token_cost <= limit {
            return None;
        }

        let mut expires_at = now;
        for event in &self.minute_tokens {
            in_window -= event.tokens;
            expires_at = event.at + self.limits.minute_window;
            if in_window + token_cost <= limit {
                break;
            }
        }
        Some(expires_at.saturating_duration_since(now))
    }
}
