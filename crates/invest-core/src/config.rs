//! 설정 관리.
//!
//! 이 모듈은 애플리케이션(프로세스) 설정을 정의하고 로드합니다.
//! 사용자가 화면에서 바꾸는 대시보드 환경설정은 [`crate::settings`]에 있습니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 기본 분석 API 주소.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// 설정 어디에도 타임아웃이 없을 때의 요청 타임아웃 (초).
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 원격 분석 API 설정
    pub api: ApiConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 대시보드 환경설정 파일 경로
    pub settings_path: Option<PathBuf>,
}

/// 원격 분석 API 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API 기본 URL
    pub base_url: String,
    /// `X-API-Key` 헤더로 전달되는 키
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// 요청 타임아웃 (초). 지정하면 대시보드 환경설정의 `api_timeout`보다 우선합니다.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// 요청 타임아웃. `timeout_secs`가 없으면 `fallback_secs`를 사용합니다.
    pub fn timeout(&self, fallback_secs: u64) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(fallback_secs))
    }
}

// API 키가 로그에 남지 않도록 Debug를 직접 구현
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수(`INVEST__API__BASE_URL` 등)만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("INVEST")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// 환경설정 파일 경로를 반환합니다.
    ///
    /// 지정되지 않은 경우 현재 디렉토리의 `invest-settings.json`을 사용합니다.
    pub fn settings_file(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::settings::DEFAULT_SETTINGS_FILE))
    }
}
