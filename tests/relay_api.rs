//! 中继服务HTTP接口测试

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use widget_translate::config::RelayConfig;
use widget_translate::error::EngineError;
use widget_translate::provider::{Detection, Language, TranslationProvider};
use widget_translate::relay::{router, RelayState};

struct EchoUpstream {
    calls: Mutex<Vec<Vec<String>>>,
    fail: bool,
}

impl EchoUpstream {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl TranslationProvider for EchoUpstream {
    async fn list_languages(&self) -> Result<Vec<Language>, EngineError> {
        Ok(vec![Language::new("en", "English")])
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
        _source_language: &str,
    ) -> Result<Vec<String>, EngineError> {
        self.calls.lock().unwrap().push(texts.to_vec());
        if self.fail {
            return Err(EngineError::TranslationFailed("上游不可用".to_string()));
        }
        Ok(texts
            .iter()
            .map(|t| format!("{}:{}", target_language, t))
            .collect())
    }

    async fn detect_language(&self, _text: &str) -> Result<Detection, EngineError> {
        if self.fail {
            return Err(EngineError::TranslationFailed("上游不可用".to_string()));
        }
        Ok(Detection {
            language: "ja".to_string(),
            confidence: 0.92,
        })
    }
}

fn test_app(upstream: EchoUpstream) -> axum::Router {
    let config = RelayConfig::default();
    router(Arc::new(RelayState::new(config, Arc::new(upstream))))
}

fn app_with_limit(points: u32) -> axum::Router {
    let config = RelayConfig {
        rate_limit_points: points,
        ..RelayConfig::default()
    };
    router(Arc::new(RelayState::new(config, Arc::new(EchoUpstream::new()))))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let app = test_app(EchoUpstream::new());
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn languages_endpoint_returns_curated_list() {
    let app = test_app(EchoUpstream::new());
    let response = app.oneshot(get("/api/translate/languages")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    let languages = body["languages"].as_array().unwrap();
    assert!(!languages.is_empty());
    assert!(languages
        .iter()
        .any(|l| l["code"] == json!("en") && l["name"].is_string()));
}

#[tokio::test]
async fn translate_text_preserves_order_and_blanks() {
    let app = test_app(EchoUpstream::new());
    let request = post_json(
        "/api/translate/text",
        json!({
            "texts": ["こんにちは", "   ", "世界"],
            "targetLanguage": "en",
            "sourceLanguage": "ja"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["translations"],
        json!(["en:こんにちは", "", "en:世界"])
    );
}

#[tokio::test]
async fn translate_text_rejects_empty_batch() {
    let app = test_app(EchoUpstream::new());
    let request = post_json(
        "/api/translate/text",
        json!({ "texts": [], "targetLanguage": "en" }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn translate_text_rejects_missing_target() {
    let app = test_app(EchoUpstream::new());
    let request = post_json("/api/translate/text", json!({ "texts": ["a"] }));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whitespace_only_batch_never_hits_upstream() {
    let app = test_app(EchoUpstream::failing());
    let request = post_json(
        "/api/translate/text",
        json!({ "texts": ["  ", "\n"], "targetLanguage": "en" }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["translations"], json!(["", ""]));
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let app = test_app(EchoUpstream::failing());
    let request = post_json(
        "/api/translate/text",
        json!({ "texts": ["text"], "targetLanguage": "en" }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn detect_reports_language_and_confidence() {
    let app = test_app(EchoUpstream::new());
    let request = post_json("/api/translate/detect", json!({ "text": "こんにちは" }));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["language"], json!("ja"));
    assert!(body["confidence"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn detect_rejects_blank_text() {
    let app = test_app(EchoUpstream::new());
    let request = post_json("/api/translate/detect", json!({ "text": "   " }));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn detect_upstream_failure_maps_to_bad_gateway() {
    let app = test_app(EchoUpstream::failing());
    let request = post_json("/api/translate/detect", json!({ "text": "text" }));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn widget_registration_round_trip() {
    let app = test_app(EchoUpstream::new());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/widget/register",
            json!({ "siteName": "示例サイト" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    let widget_id = body["widget"]["widgetId"].as_str().unwrap().to_string();
    assert!(body["embedCode"]
        .as_str()
        .unwrap()
        .contains(widget_id.as_str()));

    let response = app
        .clone()
        .oneshot(get(&format!("/api/widget/{}", widget_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["widget"]["siteName"], json!("示例サイト"));

    let response = app.oneshot(get("/api/widgets")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["widgets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_widget_is_not_found() {
    let app = test_app(EchoUpstream::new());
    let response = app.oneshot(get("/api/widget/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_site_name_rejected() {
    let app = test_app(EchoUpstream::new());
    let response = app
        .oneshot(post_json("/api/widget/register", json!({ "siteName": " " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rate_limit_rejects_after_budget() {
    let app = app_with_limit(2);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get("/api/translate/languages"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get("/api/translate/languages"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // 其他调用方不受影响
    let request = Request::builder()
        .uri("/api/translate/languages")
        .header("x-forwarded-for", "10.0.0.9")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_covers_every_api_route() {
    let app = app_with_limit(1);

    app.clone()
        .oneshot(get("/api/translate/languages"))
        .await
        .unwrap();

    // 预算耗尽后控件接口同样被拒
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/widget/register",
            json!({ "siteName": "テスト" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // 健康检查不在限流范围内
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
