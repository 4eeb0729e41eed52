//! 사용자 선택 상태.
//!
//! 선택된 포트폴리오/종목 코드와 지표별 시계열 설정을 보관합니다.
//! 모든 변경은 세대(generation) 카운터를 증가시키며, 데이터 로더는
//! 요청 시점의 [`SelectionSnapshot`]을 보관했다가 결과 반영 전에
//! [`SelectionState::is_current`]로 유효성을 확인합니다.

use serde::{Deserialize, Serialize};

use crate::error::{InvestError, InvestResult};
use crate::types::{normalize_code, EntityKind, Metric, NormalizeMode, SeriesKey};

/// 차트 Y축.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Left,
    Right,
}

/// 축 배정 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisPolicy {
    /// 모든 시계열을 왼쪽 축에 표시
    #[default]
    SingleAxis,
    /// 가격은 왼쪽, 수익률/변동성은 오른쪽 축
    PriceLeftOthersRight,
}

impl AxisPolicy {
    /// 지표에 배정될 축.
    pub fn axis_for(&self, metric: Metric) -> Axis {
        match (self, metric) {
            (AxisPolicy::SingleAxis, _) => Axis::Left,
            (AxisPolicy::PriceLeftOthersRight, Metric::Price) => Axis::Left,
            (AxisPolicy::PriceLeftOthersRight, _) => Axis::Right,
        }
    }
}

/// 지표 하나에 대한 시계열 설정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub metric: Metric,
    pub enabled: bool,
    pub normalize: NormalizeMode,
    pub axis: Axis,
}

impl SeriesConfig {
    pub fn new(metric: Metric, enabled: bool, policy: AxisPolicy) -> Self {
        Self {
            metric,
            enabled,
            normalize: NormalizeMode::None,
            axis: policy.axis_for(metric),
        }
    }

    /// 엔티티 코드에 대한 시계열 키.
    pub fn key_for(&self, entity_code: &str) -> SeriesKey {
        SeriesKey::new(entity_code, self.metric).with_normalize(self.normalize)
    }
}

/// 선택된 엔티티 코드 (입력 순서 유지, 중복 없음).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub portfolios: Vec<String>,
    pub securities: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 코드 목록으로 생성합니다. 잘못된 코드나 중복은 무시됩니다.
    pub fn from_codes<P, S>(portfolios: P, securities: S) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let mut selection = Self::new();
        for code in portfolios {
            let _ = selection.add(EntityKind::Portfolio, code.as_ref());
        }
        for code in securities {
            let _ = selection.add(EntityKind::Security, code.as_ref());
        }
        selection
    }

    fn codes_mut(&mut self, kind: EntityKind) -> &mut Vec<String> {
        match kind {
            EntityKind::Portfolio => &mut self.portfolios,
            EntityKind::Security => &mut self.securities,
        }
    }

    /// 엔티티를 추가하고 정규화된 코드를 반환합니다.
    ///
    /// 빈 코드나 이미 선택된 코드는 거부됩니다.
    pub fn add(&mut self, kind: EntityKind, raw: &str) -> InvestResult<String> {
        let code = normalize_code(raw)
            .ok_or_else(|| InvestError::InvalidInput(format!("{} 코드가 비어 있습니다", kind)))?;

        let codes = self.codes_mut(kind);
        if codes.contains(&code) {
            return Err(InvestError::InvalidInput(format!(
                "{} {}은(는) 이미 선택되어 있습니다",
                kind, code
            )));
        }
        codes.push(code.clone());
        Ok(code)
    }

    /// 엔티티를 제거합니다. 제거했으면 `true`.
    pub fn remove(&mut self, kind: EntityKind, raw: &str) -> bool {
        let Some(code) = normalize_code(raw) else {
            return false;
        };
        let codes = self.codes_mut(kind);
        let before = codes.len();
        codes.retain(|c| c != &code);
        codes.len() != before
    }

    pub fn add_portfolio(&mut self, raw: &str) -> InvestResult<String> {
        self.add(EntityKind::Portfolio, raw)
    }

    pub fn add_security(&mut self, raw: &str) -> InvestResult<String> {
        self.add(EntityKind::Security, raw)
    }

    pub fn remove_portfolio(&mut self, raw: &str) -> bool {
        self.remove(EntityKind::Portfolio, raw)
    }

    pub fn remove_security(&mut self, raw: &str) -> bool {
        self.remove(EntityKind::Security, raw)
    }

    /// 포트폴리오 다음 종목 순서의 전체 코드.
    pub fn all_codes(&self) -> Vec<String> {
        self.portfolios
            .iter()
            .chain(self.securities.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.portfolios.len() + self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty() && self.securities.is_empty()
    }
}

/// 특정 시점의 선택 상태 사본.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub generation: u64,
    pub selection: Selection,
    pub series: Vec<SeriesConfig>,
}

impl SelectionSnapshot {
    /// 활성화된 시계열 설정.
    pub fn enabled_series(&self) -> Vec<SeriesConfig> {
        self.series.iter().copied().filter(|c| c.enabled).collect()
    }

    /// 지표의 설정.
    pub fn config(&self, metric: Metric) -> Option<&SeriesConfig> {
        self.series.iter().find(|c| c.metric == metric)
    }
}

/// 현재 선택 상태.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    selection: Selection,
    series: Vec<SeriesConfig>,
    axis_policy: AxisPolicy,
    generation: u64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(AxisPolicy::default())
    }
}

impl SelectionState {
    /// 가격만 활성화된 초기 상태를 생성합니다.
    pub fn new(axis_policy: AxisPolicy) -> Self {
        let series = Metric::ALL
            .iter()
            .map(|&m| SeriesConfig::new(m, m == Metric::Price, axis_policy))
            .collect();
        Self {
            selection: Selection::new(),
            series,
            axis_policy,
            generation: 0,
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self.generation += 1;
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn series(&self) -> &[SeriesConfig] {
        &self.series
    }

    pub fn axis_policy(&self) -> AxisPolicy {
        self.axis_policy
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    pub fn add_entity(&mut self, kind: EntityKind, raw: &str) -> InvestResult<String> {
        let code = self.selection.add(kind, raw)?;
        self.bump();
        Ok(code)
    }

    pub fn remove_entity(&mut self, kind: EntityKind, raw: &str) -> bool {
        let removed = self.selection.remove(kind, raw);
        if removed {
            self.bump();
        }
        removed
    }

    /// 선택을 통째로 교체합니다.
    pub fn replace_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.bump();
    }

    fn config_mut(&mut self, metric: Metric) -> &mut SeriesConfig {
        let idx = self
            .series
            .iter()
            .position(|c| c.metric == metric)
            .unwrap_or_else(|| {
                self.series
                    .push(SeriesConfig::new(metric, false, self.axis_policy));
                self.series.len() - 1
            });
        &mut self.series[idx]
    }

    pub fn set_enabled(&mut self, metric: Metric, enabled: bool) {
        self.config_mut(metric).enabled = enabled;
        self.bump();
    }

    /// 활성 상태를 뒤집고 새 상태를 반환합니다.
    pub fn toggle(&mut self, metric: Metric) -> bool {
        let config = self.config_mut(metric);
        config.enabled = !config.enabled;
        let enabled = config.enabled;
        self.bump();
        enabled
    }

    pub fn set_normalize(&mut self, metric: Metric, normalize: NormalizeMode) {
        self.config_mut(metric).normalize = normalize;
        self.bump();
    }

    /// 축 정책을 바꾸고 모든 시계열의 축을 재배정합니다.
    pub fn set_axis_policy(&mut self, policy: AxisPolicy) {
        self.axis_policy = policy;
        for config in &mut self.series {
            config.axis = policy.axis_for(config.metric);
        }
        self.bump();
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            generation: self.generation,
            selection: self.selection.clone(),
            series: self.series.clone(),
        }
    }

    /// 스냅샷 이후 상태가 바뀌지 않았는지 확인합니다.
    pub fn is_current(&self, snapshot: &SelectionSnapshot) -> bool {
        snapshot.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_normalizes_and_rejects_duplicates() {
        let mut selection = Selection::new();
        assert_eq!(selection.add_security(" aapl ").unwrap(), "AAPL");

        let err = selection.add_security("AAPL").unwrap_err();
        assert!(err.is_contract_violation());
        assert!(selection.add_portfolio("   ").is_err());

        // 같은 코드라도 종류가 다르면 별개
        selection.add_portfolio("aapl").unwrap();
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_all_codes_order() {
        let selection = Selection::from_codes(["pf001", "PF002"], ["MSFT", "AAPL", "msft"]);
        assert_eq!(selection.all_codes(), vec!["PF001", "PF002", "MSFT", "AAPL"]);
    }

    #[test]
    fn test_remove() {
        let mut selection = Selection::from_codes(Vec::<&str>::new(), ["AAPL", "MSFT"]);
        assert!(selection.remove_security("aapl"));
        assert!(!selection.remove_security("AAPL"));
        assert_eq!(selection.securities, vec!["MSFT"]);
    }

    #[test]
    fn test_default_series_configs() {
        let state = SelectionState::default();
        let snap = state.snapshot();
        let enabled = snap.enabled_series();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].metric, Metric::Price);
        assert!(state.series().iter().all(|c| c.axis == Axis::Left));
    }

    #[test]
    fn test_axis_policy() {
        let mut state = SelectionState::new(AxisPolicy::PriceLeftOthersRight);
        let snap = state.snapshot();
        assert_eq!(snap.config(Metric::Price).unwrap().axis, Axis::Left);
        assert_eq!(snap.config(Metric::Volatility).unwrap().axis, Axis::Right);

        state.set_axis_policy(AxisPolicy::SingleAxis);
        assert!(state.series().iter().all(|c| c.axis == Axis::Left));
    }

    #[test]
    fn test_generation_and_snapshot() {
        let mut state = SelectionState::default();
        let first = state.snapshot();
        assert!(state.is_current(&first));

        state.add_entity(EntityKind::Security, "AAPL").unwrap();
        assert!(!state.is_current(&first));

        let second = state.snapshot();
        state.toggle(Metric::Return);
        assert!(!state.is_current(&second));

        // 과거 스냅샷은 변경되지 않음
        assert!(second.selection.securities == vec!["AAPL"]);
        assert_eq!(second.enabled_series().len(), 1);
    }

    #[test]
    fn test_failed_mutation_keeps_generation() {
        let mut state = SelectionState::default();
        state.add_entity(EntityKind::Security, "AAPL").unwrap();
        let snap = state.snapshot();

        assert!(state.add_entity(EntityKind::Security, "aapl").is_err());
        assert!(!state.remove_entity(EntityKind::Portfolio, "PF001"));
        assert!(state.is_current(&snap));
    }

    #[test]
    fn test_series_key_from_config() {
        let mut state = SelectionState::default();
        state.set_normalize(Metric::Price, NormalizeMode::Index);
        let snap = state.snapshot();
        let key = snap.config(Metric::Price).unwrap().key_for("AAPL");
        assert_eq!(key.full_column(), "prices_AAPL_index");
    }
}
