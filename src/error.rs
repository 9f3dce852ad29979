//! 统一错误处理
//!
//! 提供翻译引擎和中继服务共用的结构化错误类型

use thiserror::Error;

/// 引擎错误类型
///
/// 所有协作方（翻译服务）的失败都在编排层被捕获并转换为本类型，
/// 不会作为 panic 传播到宿主页面。
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// 支持语言列表获取失败
    #[error("支持语言列表不可用: {0}")]
    LanguagesUnavailable(String),

    /// 翻译请求失败（网络错误、服务错误或目标语言无效）
    #[error("翻译失败: {0}")]
    TranslationFailed(String),

    /// 目标语言代码无效
    #[error("目标语言无效: {0}")]
    InvalidLanguage(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 文档解析错误
    #[error("文档解析错误: {0}")]
    Parse(String),

    /// 引擎已销毁，不再接受操作
    #[error("引擎已销毁")]
    Destroyed,
}

impl EngineError {
    /// 检查错误是否可重试
    ///
    /// 协作方失败属于瞬态错误，下次用户操作或变更事件会自然重试；
    /// 配置和解析错误重试不会有不同结果。
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::LanguagesUnavailable(_) => true,
            EngineError::TranslationFailed(_) => true,
            EngineError::InvalidLanguage(_) => false,
            EngineError::Config(_) => false,
            EngineError::Parse(_) => false,
            EngineError::Destroyed => false,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::Config(format!("IO错误: {}", error))
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(error: toml::de::Error) -> Self {
        EngineError::Config(format!("TOML解析错误: {}", error))
    }
}

/// 错误结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
