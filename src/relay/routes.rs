//! 中继服务路由与处理器

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::constants::{DEFAULT_SOURCE_LANGUAGE, SUPPORTED_LANGUAGES};
use crate::provider::Language;
use crate::relay::{RelayState, WidgetInfo};

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

#[derive(Serialize)]
struct LanguagesBody {
    success: bool,
    languages: Vec<Language>,
}

#[derive(Serialize)]
struct TranslationsBody {
    success: bool,
    translations: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextRequest {
    #[serde(default)]
    texts: Vec<String>,
    #[serde(default)]
    target_language: String,
    #[serde(default)]
    source_language: Option<String>,
}

#[derive(Deserialize)]
struct DetectTextRequest {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct DetectionBody {
    success: bool,
    language: String,
    confidence: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterWidgetRequest {
    #[serde(default)]
    site_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterWidgetBody {
    success: bool,
    widget: WidgetInfo,
    embed_code: String,
}

#[derive(Serialize)]
struct WidgetBody {
    success: bool,
    widget: WidgetInfo,
}

#[derive(Serialize)]
struct WidgetListBody {
    success: bool,
    widgets: Vec<WidgetInfo>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            message: message.into(),
        }),
    )
        .into_response()
}

/// 组装完整路由；限流覆盖全部 API 接口，健康检查除外
pub fn router(state: Arc<RelayState>) -> Router {
    let cors = cors_layer(&state);

    let api = Router::new()
        .route("/translate/languages", get(list_languages))
        .route("/translate/text", post(translate_text))
        .route("/translate/detect", post(detect_text))
        .route("/widget/register", post(register_widget))
        .route("/widget/:id", get(get_widget))
        .route("/widgets", get(list_widgets))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(state: &RelayState) -> CorsLayer {
    if state.config.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 按调用方IP限流的中间件
async fn rate_limit(
    State(state): State<Arc<RelayState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "local".to_string());

    if !state.limiter.check(&key) {
        tracing::warn!("限流拒绝: {}", key);
        return error_response(StatusCode::TOO_MANY_REQUESTS, "请求过于频繁，请稍后再试");
    }

    next.run(request).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// 返回固定的可用语言列表
async fn list_languages() -> Json<LanguagesBody> {
    let languages = SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| Language::new(*code, *name))
        .collect();

    Json(LanguagesBody {
        success: true,
        languages,
    })
}

/// 批量翻译文本
///
/// 纯空白条目不转发给上游，按原始位置以空串回填，
/// 保证响应长度与顺序和请求一致。
async fn translate_text(
    State(state): State<Arc<RelayState>>,
    Json(request): Json<TranslateTextRequest>,
) -> Response {
    if request.texts.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "texts 不能为空");
    }
    if request.target_language.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "targetLanguage 不能为空");
    }

    let source = request
        .source_language
        .as_deref()
        .unwrap_or(DEFAULT_SOURCE_LANGUAGE);

    let forwarded: Vec<(usize, String)> = request
        .texts
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.trim().is_empty())
        .map(|(i, t)| (i, t.clone()))
        .collect();

    let mut translations = vec![String::new(); request.texts.len()];

    if forwarded.is_empty() {
        return Json(TranslationsBody {
            success: true,
            translations,
        })
        .into_response();
    }

    let texts: Vec<String> = forwarded.iter().map(|(_, t)| t.clone()).collect();
    let translated = match state
        .upstream
        .translate_batch(&texts, &request.target_language, source)
        .await
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("上游翻译失败: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, e.to_string());
        }
    };

    if translated.len() != texts.len() {
        return error_response(StatusCode::BAD_GATEWAY, "上游返回的译文数量不匹配");
    }

    for ((index, _), text) in forwarded.into_iter().zip(translated) {
        translations[index] = text;
    }

    Json(TranslationsBody {
        success: true,
        translations,
    })
    .into_response()
}

/// 检测一段文本的语言
async fn detect_text(
    State(state): State<Arc<RelayState>>,
    Json(request): Json<DetectTextRequest>,
) -> Response {
    if request.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "text 不能为空");
    }

    match state.upstream.detect_language(&request.text).await {
        Ok(detection) => Json(DetectionBody {
            success: true,
            language: detection.language,
            confidence: detection.confidence,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("上游语言检测失败: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// 注册一个新控件，返回嵌入代码
async fn register_widget(
    State(state): State<Arc<RelayState>>,
    Json(request): Json<RegisterWidgetRequest>,
) -> Response {
    if request.site_name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "siteName 不能为空");
    }

    let widget_id = uuid::Uuid::new_v4().to_string();
    let created_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default();

    let widget = WidgetInfo {
        widget_id: widget_id.clone(),
        site_name: request.site_name.trim().to_string(),
        created_at,
    };

    let embed_code = format!(
        "<script src=\"/widget.js\" data-widget-id=\"{}\" defer></script>",
        widget_id
    );

    state
        .registry
        .lock()
        .unwrap()
        .insert(widget_id.clone(), widget.clone());

    tracing::info!("控件注册成功: {} ({})", widget.site_name, widget_id);

    (
        StatusCode::CREATED,
        Json(RegisterWidgetBody {
            success: true,
            widget,
            embed_code,
        }),
    )
        .into_response()
}

async fn get_widget(
    State(state): State<Arc<RelayState>>,
    Path(widget_id): Path<String>,
) -> Response {
    let widget = state.registry.lock().unwrap().get(&widget_id).cloned();

    match widget {
        Some(widget) => Json(WidgetBody {
            success: true,
            widget,
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "控件不存在"),
    }
}

async fn list_widgets(State(state): State<Arc<RelayState>>) -> Json<WidgetListBody> {
    let mut widgets: Vec<WidgetInfo> = state.registry.lock().unwrap().values().cloned().collect();
    widgets.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    Json(WidgetListBody {
        success: true,
        widgets,
    })
}
