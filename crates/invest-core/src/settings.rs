//! 대시보드 환경설정과 영속화 어댑터.
//!
//! 환경설정은 초기화 시 한 번 로드되고, 변경될 때마다 저장소에 즉시
//! 기록됩니다(write-through). 전역 상태 대신 [`SettingsManager`]를 소비자에게
//! 명시적으로 전달합니다.
//!
//! # 예제
//!
//! ```rust,ignore
//! use invest_core::settings::{JsonFileSettingsStore, SettingsManager, SettingsPatch};
//!
//! let store = JsonFileSettingsStore::new("invest-settings.json");
//! let mut manager = SettingsManager::load(Box::new(store));
//! manager.update(SettingsPatch { use_test_data: Some(false), ..Default::default() })?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{InvestError, InvestResult};

/// 기본 환경설정 파일 이름.
pub const DEFAULT_SETTINGS_FILE: &str = "invest-settings.json";

/// 차트 테마.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartTheme {
    #[default]
    Auto,
    Light,
    Dark,
}

/// 기본 차트 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Area,
    Candlestick,
}

/// 대시보드 환경설정.
///
/// 저장된 데이터에 없는 필드는 기본값으로 채워집니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardSettings {
    /// 기본 통화
    pub default_currency: String,
    /// 날짜 표시 형식
    pub date_format: String,
    /// 차트 테마
    pub chart_theme: ChartTheme,
    /// 기본 조회 기간 (일)
    pub default_date_range: u32,
    /// 자동 새로고침 간격 (초)
    pub auto_refresh_interval: u64,
    /// 툴팁 표시
    pub show_tooltips: bool,
    /// 원격 API 대신 합성 데이터 사용
    pub use_test_data: bool,
    /// API 타임아웃 (초)
    pub api_timeout: u64,
    /// 기본 차트 유형
    pub default_chart_type: ChartType,
    /// 격자 표시
    pub show_grid: bool,
    /// 범례 표시
    pub show_legend: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            date_format: "YYYY-MM-DD".to_string(),
            chart_theme: ChartTheme::Auto,
            default_date_range: 252,
            auto_refresh_interval: 300,
            show_tooltips: true,
            use_test_data: true,
            api_timeout: 30,
            default_chart_type: ChartType::Line,
            show_grid: true,
            show_legend: true,
        }
    }
}

/// 부분 업데이트. `None` 필드는 기존 값을 유지합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub default_currency: Option<String>,
    pub date_format: Option<String>,
    pub chart_theme: Option<ChartTheme>,
    pub default_date_range: Option<u32>,
    pub auto_refresh_interval: Option<u64>,
    pub show_tooltips: Option<bool>,
    pub use_test_data: Option<bool>,
    pub api_timeout: Option<u64>,
    pub default_chart_type: Option<ChartType>,
    pub show_grid: Option<bool>,
    pub show_legend: Option<bool>,
}

impl SettingsPatch {
    /// `key=value` 형식의 단일 항목으로 패치를 생성합니다.
    ///
    /// 키는 camelCase(`useTestData`)와 snake_case(`use_test_data`)를 모두 허용합니다.
    pub fn from_key_value(key: &str, value: &str) -> InvestResult<Self> {
        let camel = snake_to_camel(key.trim());
        let raw = value.trim();

        let defaults = serde_json::to_value(DashboardSettings::default())?;
        let Some(target) = defaults.get(&camel) else {
            return Err(InvestError::InvalidInput(format!(
                "unknown settings key: {}",
                key
            )));
        };

        // 문자열 필드는 입력 그대로, 나머지는 JSON 리터럴로 해석 (실패 시 열거형 이름)
        let json_value = if target.is_string() {
            serde_json::Value::String(raw.to_string())
        } else {
            serde_json::from_str::<serde_json::Value>(raw)
                .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
        };

        let mut object = serde_json::Map::new();
        object.insert(camel, json_value);

        let patch: SettingsPatch = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| {
                InvestError::InvalidInput(format!("invalid value for {}: {}", key, e))
            })?;

        if patch.is_empty() {
            return Err(InvestError::InvalidInput(format!(
                "invalid value for {}: {}",
                key, raw
            )));
        }
        Ok(patch)
    }

    /// 변경 항목이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.default_currency.is_none()
            && self.date_format.is_none()
            && self.chart_theme.is_none()
            && self.default_date_range.is_none()
            && self.auto_refresh_interval.is_none()
            && self.show_tooltips.is_none()
            && self.use_test_data.is_none()
            && self.api_timeout.is_none()
            && self.default_chart_type.is_none()
            && self.show_grid.is_none()
            && self.show_legend.is_none()
    }
}

fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' || c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl DashboardSettings {
    /// 패치를 적용한 새 설정을 반환합니다.
    pub fn merged(&self, patch: SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.default_currency {
            next.default_currency = v;
        }
        if let Some(v) = patch.date_format {
            next.date_format = v;
        }
        if let Some(v) = patch.chart_theme {
            next.chart_theme = v;
        }
        if let Some(v) = patch.default_date_range {
            next.default_date_range = v;
        }
        if let Some(v) = patch.auto_refresh_interval {
            next.auto_refresh_interval = v;
        }
        if let Some(v) = patch.show_tooltips {
            next.show_tooltips = v;
        }
        if let Some(v) = patch.use_test_data {
            next.use_test_data = v;
        }
        if let Some(v) = patch.api_timeout {
            next.api_timeout = v;
        }
        if let Some(v) = patch.default_chart_type {
            next.default_chart_type = v;
        }
        if let Some(v) = patch.show_grid {
            next.show_grid = v;
        }
        if let Some(v) = patch.show_legend {
            next.show_legend = v;
        }
        next
    }
}

/// 환경설정 영속화 어댑터.
pub trait SettingsStore: Send + Sync {
    /// 저장된 설정을 로드합니다. 저장된 것이 없으면 기본값을 반환합니다.
    fn load(&self) -> InvestResult<DashboardSettings>;

    /// 설정을 저장합니다.
    fn save(&self, settings: &DashboardSettings) -> InvestResult<()>;
}

/// JSON 파일 기반 저장소.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> InvestResult<DashboardSettings> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved settings, using defaults");
                return Ok(DashboardSettings::default());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, settings: &DashboardSettings) -> InvestResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

/// 메모리 저장소 (테스트 및 임베딩용).
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: Mutex<Option<DashboardSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 값이 있는 저장소를 생성합니다.
    pub fn with_settings(settings: DashboardSettings) -> Self {
        Self {
            saved: Mutex::new(Some(settings)),
        }
    }

    /// 마지막으로 저장된 값.
    pub fn saved(&self) -> Option<DashboardSettings> {
        self.saved.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> InvestResult<DashboardSettings> {
        let guard = self
            .saved
            .lock()
            .map_err(|e| InvestError::Internal(format!("settings lock poisoned: {}", e)))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, settings: &DashboardSettings) -> InvestResult<()> {
        let mut guard = self
            .saved
            .lock()
            .map_err(|e| InvestError::Internal(format!("settings lock poisoned: {}", e)))?;
        *guard = Some(settings.clone());
        Ok(())
    }
}

/// 로드 시점에 초기화되고 변경 시 저장소에 기록하는 환경설정 핸들.
pub struct SettingsManager {
    store: Box<dyn SettingsStore>,
    current: DashboardSettings,
}

impl SettingsManager {
    /// 저장소에서 설정을 로드합니다.
    ///
    /// 저장된 데이터가 손상된 경우 경고를 남기고 기본값으로 시작합니다.
    pub fn load(store: Box<dyn SettingsStore>) -> Self {
        let current = match store.load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Failed to parse saved settings, using defaults");
                DashboardSettings::default()
            }
        };
        Self { store, current }
    }

    /// 현재 설정.
    pub fn current(&self) -> &DashboardSettings {
        &self.current
    }

    /// 패치를 적용하고 저장소에 즉시 기록합니다.
    ///
    /// 저장에 실패하면 메모리 상의 설정도 변경하지 않습니다.
    pub fn update(&mut self, patch: SettingsPatch) -> InvestResult<&DashboardSettings> {
        let next = self.current.merged(patch);
        self.store.save(&next)?;
        self.current = next;
        Ok(&self.current)
    }

    /// 기본값으로 되돌리고 저장합니다.
    pub fn reset(&mut self) -> InvestResult<&DashboardSettings> {
        let defaults = DashboardSettings::default();
        self.store.save(&defaults)?;
        self.current = defaults;
        Ok(&self.current)
    }
}
