//! 분석 데이터 소스.
//!
//! 이 crate는 다음을 제공합니다:
//! - 원격/합성 데이터 소스를 위한 공통 인터페이스 ([`DataSource`])
//! - 분석 API 응답 봉투와 요청 파라미터
//! - HTTP 분석 API 클라이언트 ([`RemoteSource`])
//! - 테스트 데이터 생성기 ([`SyntheticSource`])
//! - 테스트 엔티티 카탈로그

pub mod catalog;
pub mod error;
pub mod provider;

use std::sync::Arc;

use invest_core::{ApiConfig, DashboardSettings};
use tracing::info;

pub use error::{DataError, Result};
pub use provider::{
    fetch_metric, ApiResponse, CorrelationParams, DataSource, EntityCodes, MetricsParams,
    PriceParams, RemoteSource, ReturnsParams, SyntheticSource, VarParams, VolatilityParams,
};

/// 대시보드 설정에 따라 데이터 소스를 선택합니다.
///
/// `use_test_data`가 켜져 있으면 [`SyntheticSource`], 아니면 [`RemoteSource`].
/// 원격 소스의 타임아웃은 `[api] timeout_secs`가 있으면 그 값, 없으면
/// 대시보드 설정의 `api_timeout`입니다.
pub fn source_from_settings(
    settings: &DashboardSettings,
    api: &ApiConfig,
) -> Result<Arc<dyn DataSource>> {
    if settings.use_test_data {
        info!("합성 데이터 소스 사용");
        return Ok(Arc::new(
            SyntheticSource::new().with_num_days(settings.default_date_range),
        ));
    }

    let api = ApiConfig {
        timeout_secs: Some(api.timeout_secs.unwrap_or(settings.api_timeout)),
        ..api.clone()
    };
    info!(base_url = %api.base_url, timeout_secs = ?api.timeout_secs, "원격 분석 API 사용");
    Ok(Arc::new(RemoteSource::from_config(&api)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_selection() {
        let api = ApiConfig::default();
        let mut settings = DashboardSettings::default();

        let source = source_from_settings(&settings, &api).unwrap();
        assert_eq!(source.name(), "synthetic");

        settings.use_test_data = false;
        let source = source_from_settings(&settings, &api).unwrap();
        assert_eq!(source.name(), "remote");
    }
}
