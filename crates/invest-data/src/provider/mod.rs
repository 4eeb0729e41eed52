//! 데이터 소스 추상화.
//!
//! [`DataSource`]는 원격 분석 API([`RemoteSource`])와 로컬 합성 데이터
//! ([`SyntheticSource`])를 같은 인터페이스로 노출합니다. 호출자는 어느
//! 구현이 활성화되어 있는지 알 필요가 없습니다.

pub mod params;
pub mod remote;
pub mod synthetic;

use async_trait::async_trait;
use invest_core::{InvestError, InvestResult, Metric};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use params::{
    CorrelationParams, EntityCodes, MetricsParams, PriceParams, ReturnsParams, VarParams,
    VolatilityParams,
};
pub use remote::RemoteSource;
pub use synthetic::SyntheticSource;

/// 분석 API 응답 봉투.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// 성공 응답의 데이터. 실패했거나 데이터가 없으면 `None`.
    pub fn data(&self) -> Option<&T> {
        if self.success {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
        }
    }

    /// `Result`로 변환합니다.
    pub fn into_result(self) -> InvestResult<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(InvestError::Api("응답에 데이터가 없습니다".to_string())),
            (false, _) => Err(InvestError::Api(
                self.error
                    .unwrap_or_else(|| "Unknown error occurred".to_string()),
            )),
        }
    }
}

/// 분석 데이터 소스.
///
/// 모든 메서드는 에러를 반환하지 않고 실패를 응답 봉투에 담습니다.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// 소스 이름 (로그용).
    fn name(&self) -> &str;

    async fn portfolio(&self, code: &str) -> ApiResponse<Value>;

    async fn portfolios(&self, codes: &[String]) -> ApiResponse<Value>;

    async fn security(&self, code: &str) -> ApiResponse<Value>;

    async fn securities(&self, codes: &[String]) -> ApiResponse<Value>;

    /// 날짜별 가격 레코드 `[{date, CODE: value}]`.
    async fn prices(&self, params: &PriceParams) -> ApiResponse<Value>;

    /// 날짜별 수익률 레코드.
    async fn returns(&self, params: &ReturnsParams) -> ApiResponse<Value>;

    /// 날짜별 실현 변동성 레코드.
    async fn realised_volatility(&self, params: &VolatilityParams) -> ApiResponse<Value>;

    /// 상관 행렬 `{labels, matrix}`.
    async fn correlations(&self, params: &CorrelationParams) -> ApiResponse<Value>;

    /// 엔티티별 성과 지표 `[{code, sharpe_ratio, ...}]`.
    async fn metrics(&self, params: &MetricsParams) -> ApiResponse<Value>;

    /// 날짜별 VaR 레코드 `[{date, CODE_1d, CODE_5d, CODE_10d}]`.
    async fn value_at_risk(&self, params: &VarParams) -> ApiResponse<Value>;
}

/// 지표 종류에 맞는 시계열 요청을 기본 파라미터로 보냅니다.
pub async fn fetch_metric(
    source: &dyn DataSource,
    metric: Metric,
    codes: EntityCodes,
) -> ApiResponse<Value> {
    match metric {
        Metric::Price => source.prices(&PriceParams::new(codes)).await,
        Metric::Return => source.returns(&ReturnsParams::new(codes)).await,
        Metric::Volatility => {
            source
                .realised_volatility(&VolatilityParams::new(codes))
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_result() {
        assert_eq!(ApiResponse::ok(json!([1])).into_result().unwrap(), json!([1]));

        let err = ApiResponse::<Value>::failure("HTTP 500: boom")
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "API 에러: HTTP 500: boom");

        let empty = ApiResponse::<Value> {
            success: true,
            data: None,
            error: None,
        };
        assert!(empty.into_result().is_err());
    }

    #[test]
    fn test_data_hidden_on_failure() {
        let resp = ApiResponse {
            success: false,
            data: Some(json!([])),
            error: None,
        };
        assert!(resp.data().is_none());
    }

    #[test]
    fn test_envelope_wire_format() {
        let resp: ApiResponse<Value> =
            serde_json::from_value(json!({"success": false, "error": "nope"})).unwrap();
        assert_eq!(resp, ApiResponse::failure("nope"));
        assert_eq!(
            serde_json::to_value(ApiResponse::ok(json!(1))).unwrap(),
            json!({"success": true, "data": 1})
        );
    }
}
