use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 上游 AI API 调用错误（不重试，直接终止本次生成）
    #[error("上游API错误: {0}")]
    Upstream(#[from] UpstreamError),
    /// 模板渲染错误（通常在本地降级，不会冒泡）
    #[error("模板错误: {0}")]
    Template(#[from] TemplateError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 上游 AI API 调用错误
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// 网络请求失败（连接、超时、TLS 等）
    #[error("请求失败 (模型: {model}): {source}")]
    RequestFailed {
        model: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非成功状态码（鉴权失败、请求格式错误等）
    #[error("API返回错误响应 (模型: {model}): status={status}, body={body}")]
    BadStatus {
        model: String,
        status: u16,
        body: String,
    },
    /// 响应 JSON 解析失败
    #[error("响应解析失败 (模型: {model}): {source}")]
    DecodeFailed {
        model: String,
        #[source]
        source: serde_json::Error,
    },
    /// 需要文本的阶段没有拿到任何文本
    #[error("模型返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 章节规划解析错误
///
/// 只在解析器内部使用，调用方永远拿到一个可用的 `SectionPlan`
#[derive(Debug, Error)]
pub enum ParseError {
    /// 文本中没有 `{...}` 片段
    #[error("响应中没有找到 JSON 对象")]
    NoObjectFound,
    /// JSON 解码失败
    #[error("JSON解码失败: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// 顶层不是对象
    #[error("JSON顶层不是对象")]
    NotAnObject,
    /// 值不是字符串
    #[error("键 '{key}' 的值不是字符串")]
    NonStringValue { key: String },
    /// 对象为空
    #[error("章节规划为空")]
    EmptyPlan,
}

/// 模板渲染错误
#[derive(Debug, Error)]
pub enum TemplateError {
    /// 模板文件无法读取
    #[error("无法读取模板 {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl UpstreamError {
    /// 创建网络请求失败错误
    pub fn request_failed(model: impl Into<String>, source: reqwest::Error) -> Self {
        UpstreamError::RequestFailed {
            model: model.into(),
            source,
        }
    }

    /// 创建空响应错误
    pub fn empty_content(model: impl Into<String>) -> Self {
        UpstreamError::EmptyContent {
            model: model.into(),
        }
    }
}

impl FileError {
    /// 创建文件写入错误
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// 创建文件读取错误
    pub fn read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        FileError::ReadFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
