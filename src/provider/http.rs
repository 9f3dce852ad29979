//! 基于HTTP的翻译服务客户端
//!
//! 对接中继服务的REST接口，报文格式与中继保持一致。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::error::{EngineError, EngineResult};
use crate::provider::{Detection, Language, TranslationProvider};

/// HTTP翻译服务客户端
pub struct HttpProvider {
    client: reqwest::Client,
    api_base: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    texts: &'a [String],
    target_language: &'a str,
    source_language: &'a str,
}

#[derive(Deserialize)]
struct LanguagesResponse {
    success: bool,
    #[serde(default)]
    languages: Vec<Language>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct DetectResponse {
    success: bool,
    #[serde(default)]
    language: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    success: bool,
    #[serde(default)]
    translations: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpProvider {
    /// 创建客户端；`api_base` 形如 `http://localhost:3000/api`
    pub fn new(api_base: impl Into<String>) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| EngineError::Config(format!("构建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl TranslationProvider for HttpProvider {
    async fn list_languages(&self) -> EngineResult<Vec<Language>> {
        let url = self.endpoint("translate/languages");
        tracing::debug!("请求语言列表: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::LanguagesUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::LanguagesUnavailable(format!(
                "服务返回状态 {}",
                response.status()
            )));
        }

        let body: LanguagesResponse = response
            .json()
            .await
            .map_err(|e| EngineError::LanguagesUnavailable(e.to_string()))?;

        if !body.success {
            return Err(EngineError::LanguagesUnavailable(
                body.message.unwrap_or_else(|| "未知错误".to_string()),
            ));
        }

        Ok(body.languages)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
        source_language: &str,
    ) -> EngineResult<Vec<String>> {
        let url = self.endpoint("translate/text");
        tracing::debug!("请求批量翻译: {} 条 -> {}", texts.len(), target_language);

        let response = self
            .client
            .post(&url)
            .json(&TranslateRequest {
                texts,
                target_language,
                source_language,
            })
            .send()
            .await
            .map_err(|e| EngineError::TranslationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::TranslationFailed(format!(
                "服务返回状态 {}",
                response.status()
            )));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| EngineError::TranslationFailed(e.to_string()))?;

        if !body.success {
            return Err(EngineError::TranslationFailed(
                body.message.unwrap_or_else(|| "未知错误".to_string()),
            ));
        }

        Ok(body.translations)
    }

    async fn detect_language(&self, text: &str) -> EngineResult<Detection> {
        let url = self.endpoint("translate/detect");
        tracing::debug!("请求语言检测: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&DetectRequest { text })
            .send()
            .await
            .map_err(|e| EngineError::TranslationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::TranslationFailed(format!(
                "服务返回状态 {}",
                response.status()
            )));
        }

        let body: DetectResponse = response
            .json()
            .await
            .map_err(|e| EngineError::TranslationFailed(e.to_string()))?;

        if !body.success {
            return Err(EngineError::TranslationFailed(
                body.message.unwrap_or_else(|| "未知错误".to_string()),
            ));
        }

        Ok(Detection {
            language: body.language,
            confidence: body.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let provider = HttpProvider::new("http://localhost:3000/api/").unwrap();
        assert_eq!(
            provider.endpoint("/translate/text"),
            "http://localhost:3000/api/translate/text"
        );
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let texts = vec!["こんにちは".to_string()];
        let req = TranslateRequest {
            texts: &texts,
            target_language: "en",
            source_language: "ja",
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"targetLanguage\":\"en\""));
        assert!(json.contains("\"sourceLanguage\":\"ja\""));
    }
}
