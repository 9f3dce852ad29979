//! 配置管理模块
//!
//! 提供引擎配置和中继服务配置，支持 TOML 配置文件和环境变量覆盖

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// 配置常量
pub mod constants {
    /// 不参与翻译的元素标签（按最近元素祖先判断）
    pub const SKIP_ELEMENTS: &[&str] = &["script", "style", "code", "pre", "textarea", "input"];

    /// 引擎自身注入的 UI 容器 id，容器子树整体排除在翻译之外
    pub const WIDGET_CONTAINER_ID: &str = "widget-translate-container";

    /// 页面源语言默认值
    pub const DEFAULT_SOURCE_LANGUAGE: &str = "ja";

    /// 变更合并窗口默认值（毫秒）
    pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

    /// 批次缓存容量默认值（按批次条目数计）
    pub const DEFAULT_CACHE_CAPACITY: usize = 256;

    pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
    pub const DEFAULT_RELAY_BIND: &str = "127.0.0.1:3000";
    pub const DEFAULT_RATE_LIMIT_POINTS: u32 = 100;
    pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 900;
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

    /// 中继服务提供的语言列表（主要语言）
    pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
        ("en", "English"),
        ("ja", "日本語"),
        ("ko", "한국어"),
        ("zh", "中文"),
        ("es", "Español"),
        ("fr", "Français"),
        ("de", "Deutsch"),
        ("it", "Italiano"),
        ("pt", "Português"),
        ("ru", "Русский"),
    ];

    /// 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &["widget-translate.toml", ".widget-translate.toml"];
}

/// 翻译引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// 部件 id（由中继注册接口分配）
    pub widget_id: String,

    /// 中继 API 基础地址
    pub api_base: String,

    /// 页面源语言代码
    pub source_language: String,

    /// 变更合并窗口（毫秒）
    pub debounce_ms: u64,

    /// 批次缓存容量
    pub cache_capacity: usize,

    /// 不参与翻译的元素标签
    pub skip_elements: Vec<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            widget_id: String::new(),
            api_base: constants::DEFAULT_API_BASE.to_string(),
            source_language: constants::DEFAULT_SOURCE_LANGUAGE.to_string(),
            debounce_ms: constants::DEFAULT_DEBOUNCE_MS,
            cache_capacity: constants::DEFAULT_CACHE_CAPACITY,
            skip_elements: constants::SKIP_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl WidgetConfig {
    /// 变更合并窗口
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// 加载配置：搜索配置文件，找不到时使用默认值，最后应用环境变量覆盖
    pub fn load() -> EngineResult<Self> {
        let mut config = match find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    /// 应用 `WIDGET_TRANSLATE_*` 环境变量覆盖
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("WIDGET_TRANSLATE_WIDGET_ID") {
            self.widget_id = value;
        }
        if let Ok(value) = env::var("WIDGET_TRANSLATE_API_BASE") {
            self.api_base = value;
        }
        if let Ok(value) = env::var("WIDGET_TRANSLATE_SOURCE_LANG") {
            self.source_language = value;
        }
        if let Ok(value) = env::var("WIDGET_TRANSLATE_DEBOUNCE_MS") {
            if let Ok(ms) = value.parse() {
                self.debounce_ms = ms;
            }
        }
    }
}

/// 中继服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// 监听地址
    pub bind: String,

    /// 上游翻译服务的 API 基础地址
    pub upstream_api_base: Option<String>,

    /// 速率限制：窗口内允许的请求数
    pub rate_limit_points: u32,

    /// 速率限制：窗口长度（秒）
    pub rate_limit_window_secs: u64,

    /// 允许的跨域来源，空表示允许任意来源
    pub allowed_origins: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: constants::DEFAULT_RELAY_BIND.to_string(),
            upstream_api_base: None,
            rate_limit_points: constants::DEFAULT_RATE_LIMIT_POINTS,
            rate_limit_window_secs: constants::DEFAULT_RATE_LIMIT_WINDOW_SECS,
            allowed_origins: Vec::new(),
        }
    }
}

impl RelayConfig {
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// 加载配置，环境变量 `WIDGET_RELAY_*` 可覆盖文件和默认值
    pub fn load() -> EngineResult<Self> {
        let mut config = match find_config_file() {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)?;
                let wrapper: RelayConfigFile = toml::from_str(&raw)?;
                wrapper.relay.unwrap_or_default()
            }
            None => Self::default(),
        };
        if let Ok(value) = env::var("WIDGET_RELAY_BIND") {
            config.bind = value;
        }
        if let Ok(value) = env::var("WIDGET_RELAY_UPSTREAM") {
            config.upstream_api_base = Some(value);
        }
        Ok(config)
    }
}

/// 配置文件中中继段的包装（`[relay]` 表）
#[derive(Debug, Default, Deserialize)]
struct RelayConfigFile {
    relay: Option<RelayConfig>,
}

fn find_config_file() -> Option<std::path::PathBuf> {
    constants::CONFIG_PATHS
        .iter()
        .map(std::path::PathBuf::from)
        .find(|p| p.exists())
}
