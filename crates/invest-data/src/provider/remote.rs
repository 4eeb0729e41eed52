//! 원격 분석 API 클라이언트.
//!
//! 분석 서비스의 REST 엔드포인트를 호출합니다.
//!
//! # 엔드포인트
//!
//! - `GET /core/portfolio/{code}`, `POST /core/portfolio`
//! - `GET /core/security/{code}`, `POST /core/security`
//! - `POST /analytics/{prices,returns,realised-volatility,correlations,metrics,var}`
//!
//! API 키가 설정되어 있으면 `X-API-Key` 헤더로 전달합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use invest_data::{DataSource, PriceParams, EntityCodes, RemoteSource};
//!
//! let source = RemoteSource::new("http://localhost:8000", None, Duration::from_secs(30))?;
//! let resp = source.prices(&PriceParams::new(EntityCodes::securities(["AAPL"]))).await;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use invest_core::{ApiConfig, DEFAULT_API_TIMEOUT_SECS};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::params::{
    CorrelationParams, MetricsParams, PriceParams, ReturnsParams, VarParams, VolatilityParams,
};
use super::{ApiResponse, DataSource};
use crate::error::{DataError, Result};

/// 원격 분석 API 데이터 소스.
pub struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSource")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RemoteSource {
    /// 새 클라이언트를 생성합니다.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key
                .filter(|k| !k.is_empty())
                .map(|k| SecretString::new(k.into())),
        })
    }

    /// 애플리케이션 설정으로 클라이언트를 생성합니다.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.timeout(DEFAULT_API_TIMEOUT_SECS),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(method = %method, url = %url, "분석 API 요청");

        let mut request = self
            .client
            .request(method, &url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");

        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::Status { status, body });
        }

        Ok(response.json().await?)
    }

    /// 요청을 보내고 결과를 응답 봉투로 감쌉니다.
    async fn envelope(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ApiResponse<Value> {
        match self.send(method, endpoint, body).await {
            Ok(data) => ApiResponse::ok(data),
            Err(e) => {
                warn!(endpoint = endpoint, error = %e, "분석 API 요청 실패");
                ApiResponse::failure(e.to_string())
            }
        }
    }

    async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResponse<Value> {
        match serde_json::to_value(body) {
            Ok(body) => self.envelope(Method::POST, endpoint, Some(body)).await,
            Err(e) => ApiResponse::failure(DataError::from(e).to_string()),
        }
    }

    async fn get(&self, endpoint: &str) -> ApiResponse<Value> {
        self.envelope(Method::GET, endpoint, None).await
    }
}

/// 경로 세그먼트용 퍼센트 인코딩.
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[async_trait]
impl DataSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn portfolio(&self, code: &str) -> ApiResponse<Value> {
        self.get(&format!("/core/portfolio/{}", encode_path_segment(code)))
            .await
    }

    async fn portfolios(&self, codes: &[String]) -> ApiResponse<Value> {
        self.post("/core/portfolio", codes).await
    }

    async fn security(&self, code: &str) -> ApiResponse<Value> {
        self.get(&format!("/core/security/{}", encode_path_segment(code)))
            .await
    }

    async fn securities(&self, codes: &[String]) -> ApiResponse<Value> {
        self.post("/core/security", codes).await
    }

    async fn prices(&self, params: &PriceParams) -> ApiResponse<Value> {
        self.post("/analytics/prices", params).await
    }

    async fn returns(&self, params: &ReturnsParams) -> ApiResponse<Value> {
        self.post("/analytics/returns", params).await
    }

    async fn realised_volatility(&self, params: &VolatilityParams) -> ApiResponse<Value> {
        self.post("/analytics/realised-volatility", params).await
    }

    async fn correlations(&self, params: &CorrelationParams) -> ApiResponse<Value> {
        self.post("/analytics/correlations", params).await
    }

    async fn metrics(&self, params: &MetricsParams) -> ApiResponse<Value> {
        self.post("/analytics/metrics", params).await
    }

    async fn value_at_risk(&self, params: &VarParams) -> ApiResponse<Value> {
        self.post("/analytics/var", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("AAPL"), "AAPL");
        assert_eq!(encode_path_segment("BRK B"), "BRK%20B");
        assert_eq!(encode_path_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let source =
            RemoteSource::new("http://localhost:8000/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(source.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_debug_redacts_key() {
        let source = RemoteSource::new(
            "http://localhost:8000",
            Some("super-secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let debug = format!("{:?}", source);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
