//! tracing을 사용한 로깅 인프라.
//!
//! 출력 형식은 pretty, json, compact 세 가지이며 기본은 compact입니다.
//! 시계열 로드 span에는 `entity`, `metric` 필드가 붙습니다 ([`series_span!`]).

use tracing_subscriber::{
    filter::ParseError,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 여러 줄, 색상 포함 (개발용)
    Pretty,
    /// 한 줄 JSON (수집기용)
    Json,
    /// 한 줄 요약
    #[default]
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!(
                "Unknown log format: {}. Supported: pretty, json, compact",
                s
            )),
        }
    }
}

/// HTTP 스택의 연결 단위 로그는 기본적으로 숨김
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시어 (예: "warn", "invest_analytics=debug")
    pub level: String,
    pub format: LogFormat,
    /// 시계열 로드 span의 시작/종료 기록
    pub span_events: bool,
    /// 소스 위치(파일:줄) 기록
    pub with_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            span_events: false,
            with_location: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_location(mut self, enabled: bool) -> Self {
        self.with_location = enabled;
        self
    }

    /// 애플리케이션 설정의 `[logging]` 섹션에서 생성합니다.
    ///
    /// 알 수 없는 형식은 compact로 대체됩니다.
    pub fn from_settings(settings: &crate::config::LoggingConfig) -> Self {
        Self::new(settings.level.clone()).with_format(settings.format.parse().unwrap_or_default())
    }

    /// `RUST_LOG`, `LOG_FORMAT` 환경 변수에서 생성합니다.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|s| s.parse().ok()) {
            config.format = format;
        }
        config
    }

    /// 레벨 지시어에 의존 crate 억제 지시어를 덧붙인 필터.
    ///
    /// 사용자가 같은 crate를 직접 지정했다면 그 지시어를 우선합니다.
    fn env_filter(&self) -> Result<EnvFilter, ParseError> {
        let mut directives = vec![self.level.clone()];
        for &quiet in QUIET_DEPENDENCIES {
            let target = quiet.split('=').next().unwrap_or(quiet);
            if !self.level.contains(target) {
                directives.push(quiet.to_string());
            }
        }
        EnvFilter::try_new(directives.join(","))
    }
}

/// 로깅을 초기화합니다. `RUST_LOG`가 있으면 설정의 레벨보다 우선합니다.
///
/// 로그는 stderr로 나가므로 stdout의 표/CSV/JSON 출력과 섞이지 않습니다.
///
/// ```no_run
/// use invest_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::new("invest_analytics=debug").with_format(LogFormat::Json);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.env_filter()?,
    };

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_location)
        .with_line_number(config.with_location)
        .with_span_events(span_events);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => base.pretty().with_filter(filter).boxed(),
        LogFormat::Json => base.json().with_filter(filter).boxed(),
        LogFormat::Compact => base.compact().with_filter(filter).boxed(),
    };

    tracing_subscriber::registry().with(layer).try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화");
    Ok(())
}

/// `RUST_LOG`, `LOG_FORMAT`으로 로깅을 초기화합니다.
pub fn init_logging_from_env() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogConfig::from_env())
}

/// 시계열 컨텍스트 필드가 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! series_span {
    ($name:expr, $entity:expr) => {
        tracing::info_span!($name, entity = %$entity)
    };
    ($name:expr, $entity:expr, $metric:expr) => {
        tracing::info_span!($name, entity = %$entity, metric = %$metric)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("fancy".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_from_settings_falls_back_to_compact() {
        let settings = crate::config::LoggingConfig {
            level: "debug".to_string(),
            format: "fancy".to_string(),
        };
        let config = LogConfig::from_settings(&settings);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(!config.span_events);
    }

    #[test]
    fn test_env_filter_quiets_http_stack_unless_overridden() {
        let config = LogConfig::new("invest_data=debug").with_span_events(true);
        assert!(config.env_filter().is_ok());

        let explicit = LogConfig::new("info,reqwest=trace");
        let filter = explicit.env_filter().unwrap().to_string().to_lowercase();
        assert!(filter.contains("reqwest=trace"));
        assert!(!filter.contains("reqwest=warn"));
        assert!(filter.contains("hyper=warn"));
    }
}
