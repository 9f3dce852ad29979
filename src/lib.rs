//! # Widget Translate
//!
//! 面向网页的客户端翻译引擎：提取页面文本、保存原文快照、
//! 调用翻译服务并把译文写回DOM，同时监听页面变更做增量重翻译。
//!
//! ## 模块组织
//!
//! - `dom` - HTML解析、序列化与节点操作
//! - `engine` - 翻译引擎（提取器、快照、缓存、监听器、状态机）
//! - `provider` - 翻译服务抽象与HTTP客户端
//! - `relay` - 翻译中继HTTP服务
//! - `config` - 配置加载与内置常量
//! - `error` - 错误类型

pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod provider;
pub mod relay;

pub use config::{RelayConfig, WidgetConfig};
pub use engine::{EngineState, PageTranslator, SelectOutcome};
pub use error::{EngineError, EngineResult};
pub use provider::{Detection, HttpProvider, Language, TranslationProvider};
