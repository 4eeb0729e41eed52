//! 데이터 모듈 오류 타입.
//!
//! 원격 클라이언트 내부에서만 사용됩니다. [`DataSource`](crate::DataSource)
//! 호출 경계에서는 모두 실패 응답 봉투로 변환됩니다.

use invest_core::InvestError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 전송 오류 (연결 실패, 타임아웃 등)
    #[error("{0}")]
    Transport(String),

    /// 2xx가 아닌 HTTP 응답
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::SerializationError(err.to_string())
        } else {
            DataError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<DataError> for InvestError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Transport(msg) => InvestError::Network(msg),
            DataError::Status { .. } => InvestError::Api(err.to_string()),
            DataError::SerializationError(msg) => InvestError::Serialization(msg),
            DataError::ConfigError(msg) => InvestError::Config(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_format() {
        let err = DataError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }

    #[test]
    fn test_into_invest_error() {
        let err: InvestError = DataError::Transport("connection refused".to_string()).into();
        assert!(err.is_retryable());

        let err: InvestError = DataError::Status {
            status: 404,
            body: "missing".to_string(),
        }
        .into();
        assert!(matches!(err, InvestError::Api(ref m) if m == "HTTP 404: missing"));
    }
}
