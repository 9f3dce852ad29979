//! 翻译服务抽象
//!
//! 引擎通过 [`TranslationProvider`] 与外部翻译服务交互，
//! 测试时可注入模拟实现。

mod http;

pub use http::HttpProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// 支持的目标语言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// 语言代码，如 "en"
    pub code: String,
    /// 展示名称，如 "English"
    pub name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// 语言检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// 检测到的语言代码
    pub language: String,
    /// 置信度，0.0 到 1.0
    pub confidence: f32,
}

/// 批量翻译服务接口
///
/// 实现方必须保证返回的译文数量与顺序和输入一致；
/// 无法翻译的条目用空字符串占位。
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// 查询可用目标语言列表
    async fn list_languages(&self) -> EngineResult<Vec<Language>>;

    /// 批量翻译文本
    async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
        source_language: &str,
    ) -> EngineResult<Vec<String>>;

    /// 检测文本的语言
    async fn detect_language(&self, text: &str) -> EngineResult<Detection>;
}
