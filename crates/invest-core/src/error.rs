//! 투자 분석 대시보드의 에러 타입.
//!
//! 이 모듈은 대시보드 전반에서 사용되는 에러 타입을 정의합니다.
//! 데이터 형태 이상(날짜 누락, 배열이 아닌 응답 등)은 에러가 아니라
//! 집계 단계에서 건너뛰는 데이터 공백으로 취급되며, 여기에는 호출자
//! 계약 위반과 외부 협력자 실패만 표현됩니다.

use thiserror::Error;

/// 핵심 대시보드 에러.
#[derive(Debug, Error)]
pub enum InvestError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 분석 API가 실패 응답을 반환함
    #[error("API 에러: {0}")]
    Api(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 설정 저장소 에러
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 잘못된 입력 (호출자 계약 위반)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 대시보드 작업을 위한 Result 타입.
pub type InvestResult<T> = Result<T, InvestError>;

impl InvestError {
    /// 일시적인 실패인지 확인합니다.
    ///
    /// 재시도는 수행하지 않으며, UI 메시지 구분에만 사용합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvestError::Network(_))
    }

    /// 호출자 계약 위반인지 확인합니다.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, InvestError::InvalidInput(_))
    }
}

impl From<serde_json::Error> for InvestError {
    fn from(err: serde_json::Error) -> Self {
        InvestError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for InvestError {
    fn from(err: std::io::Error) -> Self {
        InvestError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for InvestError {
    fn from(err: config::ConfigError) -> Self {
        InvestError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let network_err = InvestError::Network("timeout".to_string());
        assert!(network_err.is_retryable());

        let api_err = InvestError::Api("HTTP 500".to_string());
        assert!(!api_err.is_retryable());
    }

    #[test]
    fn test_contract_violation() {
        let err = InvestError::InvalidInput("expected an array".to_string());
        assert!(err.is_contract_violation());
        assert!(err.to_string().contains("expected an array"));

        let storage_err = InvestError::Storage("disk full".to_string());
        assert!(!storage_err.is_contract_violation());
    }

    #[test]
    fn test_from_serde_error() {
        let err: InvestError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, InvestError::Serialization(_)));
    }
}
