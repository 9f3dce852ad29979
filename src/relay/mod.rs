//! 翻译中继服务
//!
//! 面向页面控件的HTTP服务：暴露语言列表与批量翻译接口，
//! 负责控件注册、限流和CORS，把真正的翻译请求转发给上游。

mod limiter;
mod routes;

pub use limiter::RateLimiter;
pub use routes::router;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::config::RelayConfig;
use crate::error::{EngineError, EngineResult};
use crate::provider::TranslationProvider;

/// 已注册控件的记录
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInfo {
    pub widget_id: String,
    pub site_name: String,
    pub created_at: String,
}

/// 中继服务共享状态
pub struct RelayState {
    pub config: RelayConfig,
    pub registry: Mutex<HashMap<String, WidgetInfo>>,
    pub limiter: RateLimiter,
    pub upstream: Arc<dyn TranslationProvider>,
}

impl RelayState {
    pub fn new(config: RelayConfig, upstream: Arc<dyn TranslationProvider>) -> Self {
        let limiter = RateLimiter::new(config.rate_limit_points, config.rate_limit_window());
        Self {
            config,
            registry: Mutex::new(HashMap::new()),
            limiter,
            upstream,
        }
    }
}

/// 启动中继服务并阻塞运行
pub async fn serve(config: RelayConfig, upstream: Arc<dyn TranslationProvider>) -> EngineResult<()> {
    let bind = config.bind.clone();
    let state = Arc::new(RelayState::new(config, upstream));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| EngineError::Config(format!("绑定 {} 失败: {}", bind, e)))?;

    tracing::info!("中继服务已启动: http://{}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| EngineError::Config(format!("服务异常退出: {}", e)))
}
