//! 명령 실행 환경 구성.
//!
//! 설정 파일, 대시보드 환경설정, 선택 인자로부터 데이터 소스와
//! 대시보드 로더를 만듭니다.

use std::sync::Arc;

use anyhow::{Context, Result};
use invest_analytics::{DashboardLoader, LoadOutcome};
use invest_core::{
    AppConfig, AxisPolicy, DashboardSettings, EntityKind, JsonFileSettingsStore, Selection,
    SelectionState, SettingsManager,
};
use invest_data::{source_from_settings, DataSource};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::output::OutputFormat;

/// 데이터 소스 강제 선택.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOverride {
    /// 환경설정의 `use_test_data`를 따름
    Settings,
    Synthetic,
    Remote,
}

impl SourceOverride {
    pub fn from_flags(test_data: bool, remote: bool) -> Self {
        match (test_data, remote) {
            (true, _) => Self::Synthetic,
            (false, true) => Self::Remote,
            (false, false) => Self::Settings,
        }
    }

    fn apply(self, settings: &DashboardSettings) -> DashboardSettings {
        let mut settings = settings.clone();
        match self {
            Self::Settings => {}
            Self::Synthetic => settings.use_test_data = true,
            Self::Remote => settings.use_test_data = false,
        }
        settings
    }
}

/// 분석 명령 공통 인자.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub portfolios: Vec<String>,
    pub securities: Vec<String>,
    pub source: SourceOverride,
    pub format: OutputFormat,
    pub output: Option<String>,
}

impl SelectionConfig {
    /// 선택 상태를 만듭니다. 중복 코드는 경고 후 무시합니다.
    pub fn selection(&self) -> Result<Selection> {
        let mut selection = Selection::new();
        let entries = self
            .portfolios
            .iter()
            .map(|c| (EntityKind::Portfolio, c))
            .chain(self.securities.iter().map(|c| (EntityKind::Security, c)));

        for (kind, code) in entries {
            if let Err(e) = selection.add(kind, code) {
                warn!(code = %code, kind = %kind, error = %e, "엔티티 선택 건너뜀");
            }
        }

        if selection.is_empty() {
            anyhow::bail!("No entities selected. Use --portfolio/-p or --security/-s");
        }
        Ok(selection)
    }
}

/// 명령 실행 컨텍스트.
pub struct CommandContext {
    pub config: AppConfig,
    pub settings: SettingsManager,
}

impl CommandContext {
    pub fn new(config: AppConfig) -> Self {
        let path = config.settings_file();
        debug!(path = %path.display(), "환경설정 로드");
        let settings = SettingsManager::load(Box::new(JsonFileSettingsStore::new(path)));
        Self { config, settings }
    }

    /// 선택 인자에 맞는 데이터 소스.
    pub fn source(&self, source: SourceOverride) -> Result<Arc<dyn DataSource>> {
        let settings = source.apply(self.settings.current());
        source_from_settings(&settings, &self.config.api)
            .context("Failed to create data source")
    }

    /// 선택 인자로 대시보드 로더를 만듭니다.
    pub fn loader(&self, args: &SelectionConfig, policy: AxisPolicy) -> Result<DashboardLoader> {
        let state = SelectionState::new(policy).with_selection(args.selection()?);
        let source = self.source(args.source)?;
        Ok(DashboardLoader::new(source, Arc::new(RwLock::new(state))))
    }
}

/// CLI는 로드 도중 선택을 바꾸지 않으므로 폐기 결과는 내부 오류입니다.
pub fn applied<T>(outcome: LoadOutcome<T>) -> Result<T> {
    match outcome {
        LoadOutcome::Applied(value) => Ok(value),
        LoadOutcome::Stale { requested, current } => Err(anyhow::anyhow!(
            "Selection changed during load (generation {} -> {})",
            requested,
            current
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(portfolios: &[&str], securities: &[&str]) -> SelectionConfig {
        SelectionConfig {
            portfolios: portfolios.iter().map(|s| s.to_string()).collect(),
            securities: securities.iter().map(|s| s.to_string()).collect(),
            source: SourceOverride::Synthetic,
            format: OutputFormat::Table,
            output: None,
        }
    }

    #[test]
    fn test_selection_normalizes_and_dedups() {
        let selection = args(&["pf001"], &["aapl", "AAPL", " msft "]).selection().unwrap();
        assert_eq!(selection.all_codes(), vec!["PF001", "AAPL", "MSFT"]);
    }

    #[test]
    fn test_empty_selection_is_error() {
        assert!(args(&[], &["  "]).selection().is_err());
    }

    #[test]
    fn test_source_override() {
        let settings = DashboardSettings::default();
        assert!(SourceOverride::from_flags(true, false).apply(&settings).use_test_data);
        assert!(!SourceOverride::from_flags(false, true).apply(&settings).use_test_data);
        assert_eq!(
            SourceOverride::from_flags(false, false).apply(&settings),
            settings
        );
    }

    #[test]
    fn test_stale_outcome_is_error() {
        assert_eq!(applied(LoadOutcome::Applied(3)).unwrap(), 3);
        let err = applied(LoadOutcome::<u32>::Stale {
            requested: 1,
            current: 2,
        })
        .unwrap_err();
        assert!(err.to_string().contains("generation 1 -> 2"));
    }
}
