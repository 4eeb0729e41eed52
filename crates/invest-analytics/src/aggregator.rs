//! 시계열 병합.
//!
//! 엔티티, 지표, 기간이 서로 다른 여러 시계열을 날짜 하나당 한 행인
//! 테이블로 합칩니다.
//!
//! # 알고리즘
//!
//! 1. 날짜가 가리키는 시점 → 행 매핑을 처음 등장한 순서로 구성
//!    (`2024-1-5`와 `2024-01-05`는 같은 행, 표기는 처음 본 문자열)
//! 2. 각 시계열의 각 포인트를 해당 날짜 행의 컬럼으로 upsert
//! 3. 시점 기준으로 정렬
//!
//! 날짜가 없거나 해석할 수 없는 포인트는 그 포인트만 건너뜁니다.
//!
//! # 예시
//!
//! ```rust,ignore
//! use invest_analytics::merge_series;
//!
//! let table = merge_series(&[aapl_prices, msft_prices]);
//! for row in &table.rows {
//!     println!("{} {:?}", row.date, row.values);
//! }
//! ```

use std::collections::HashMap;

use invest_core::{
    parse_date_key, InvestError, InvestResult, MergedRow, MergedTable, NamedSeries,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::payload::{date_from_value, number_from_value, value_kind};

/// 병합 테이블 컬럼 이름 규칙.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnNaming {
    /// 모든 컬럼이 유일해지는 가장 짧은 형식
    #[default]
    Auto,
    /// 엔티티 코드 (`AAPL`)
    Entity,
    /// 지표와 엔티티 (`prices_AAPL`)
    MetricEntity,
    /// 지표, 엔티티, 정규화 방식 (`prices_AAPL_index`)
    Full,
}

/// 병합 옵션.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorOptions {
    pub column_naming: ColumnNaming,
    /// NaN, ±∞ 값을 가진 포인트를 건너뜀
    pub skip_non_finite: bool,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            column_naming: ColumnNaming::Auto,
            skip_non_finite: true,
        }
    }
}

/// 시계열 병합기.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    options: AggregatorOptions,
}

/// 시점(epoch ms) → 행 매핑 (첫 등장 순서 유지).
#[derive(Default)]
struct RowBuilder {
    index: HashMap<i64, usize>,
    rows: Vec<(i64, MergedRow)>,
}

impl RowBuilder {
    fn upsert(&mut self, date: &str, column: &str, value: f64) -> bool {
        let Some(ts) = parse_date_key(date) else {
            return false;
        };
        let idx = match self.index.get(&ts) {
            Some(&idx) => idx,
            None => {
                self.rows.push((ts, MergedRow::new(date)));
                self.index.insert(ts, self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        self.rows[idx].1.values.insert(column.to_string(), value);
        true
    }

    fn finish(mut self, columns: Vec<String>) -> MergedTable {
        self.rows.sort_by_key(|(ts, _)| *ts);
        MergedTable::new(columns, self.rows.into_iter().map(|(_, row)| row).collect())
    }
}

impl Aggregator {
    pub fn new(options: AggregatorOptions) -> Self {
        Self { options }
    }

    pub fn with_naming(naming: ColumnNaming) -> Self {
        Self::new(AggregatorOptions {
            column_naming: naming,
            ..Default::default()
        })
    }

    pub fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    /// 입력 순서대로 각 시계열의 컬럼 이름을 결정합니다.
    pub fn column_names(&self, series: &[NamedSeries]) -> Vec<String> {
        let by_entity = || -> Vec<String> {
            series.iter().map(|s| s.key.entity_code.clone()).collect()
        };
        let by_metric = || -> Vec<String> { series.iter().map(|s| s.key.metric_column()).collect() };
        let full = || -> Vec<String> { series.iter().map(|s| s.key.full_column()).collect() };

        match self.options.column_naming {
            ColumnNaming::Entity => by_entity(),
            ColumnNaming::MetricEntity => by_metric(),
            ColumnNaming::Full => full(),
            ColumnNaming::Auto => {
                let entity = by_entity();
                if all_unique(&entity) {
                    return entity;
                }
                let metric = by_metric();
                if all_unique(&metric) {
                    return metric;
                }
                full()
            }
        }
    }

    /// 시계열 목록을 날짜 기준으로 병합합니다.
    pub fn merge(&self, series: &[NamedSeries]) -> MergedTable {
        let names = self.column_names(series);
        let mut builder = RowBuilder::default();
        let mut skipped = 0usize;

        for (s, column) in series.iter().zip(&names) {
            for point in &s.points {
                if self.options.skip_non_finite && !point.value.is_finite() {
                    skipped += 1;
                    continue;
                }
                let Some(date) = point.date.as_deref() else {
                    skipped += 1;
                    continue;
                };
                if !builder.upsert(date, column, point.value) {
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            debug!(skipped, "날짜 또는 값이 유효하지 않은 포인트 제외");
        }

        builder.finish(unique_in_order(names))
    }

    /// 원시 응답 배열 목록을 병합합니다.
    ///
    /// `raw`는 시계열 배열의 배열이어야 하며, 그렇지 않으면 호출자 계약
    /// 위반으로 [`InvestError::InvalidInput`]을 반환합니다. 내부의 배열이
    /// 아닌 시계열, 날짜가 없는 레코드, 숫자가 아닌 값은 건너뜁니다.
    /// 레코드의 `date` 외 모든 키가 컬럼이 됩니다.
    pub fn merge_raw(&self, raw: &Value) -> InvestResult<MergedTable> {
        let Some(series_list) = raw.as_array() else {
            return Err(InvestError::InvalidInput(format!(
                "시계열 목록은 배열이어야 합니다 (받은 값: {})",
                value_kind(raw)
            )));
        };

        let mut builder = RowBuilder::default();
        let mut columns: Vec<String> = Vec::new();

        for (i, series) in series_list.iter().enumerate() {
            let Some(points) = series.as_array() else {
                warn!(index = i, kind = value_kind(series), "배열이 아닌 시계열 건너뜀");
                continue;
            };

            for point in points {
                let Some(obj) = point.as_object() else {
                    continue;
                };
                let Some(date) = date_from_value(obj.get("date")) else {
                    continue;
                };
                for (key, value) in obj.iter().filter(|(k, _)| k.as_str() != "date") {
                    let Some(v) = number_from_value(value) else {
                        continue;
                    };
                    if self.options.skip_non_finite && !v.is_finite() {
                        continue;
                    }
                    if builder.upsert(&date, key, v) && !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
        }

        Ok(builder.finish(columns))
    }
}

/// 기본 옵션으로 시계열을 병합합니다.
pub fn merge_series(series: &[NamedSeries]) -> MergedTable {
    Aggregator::default().merge(series)
}

/// 기본 옵션으로 원시 응답 배열 목록을 병합합니다.
pub fn merge_raw_series(raw: &Value) -> InvestResult<MergedTable> {
    Aggregator::default().merge_raw(raw)
}

fn all_unique(names: &[String]) -> bool {
    let mut seen = std::collections::HashSet::new();
    names.iter().all(|n| seen.insert(n))
}

fn unique_in_order(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::{Metric, MergedRow, NormalizeMode, SeriesKey, TimePoint};
    use serde_json::json;

    fn series(code: &str, metric: Metric, points: Vec<TimePoint>) -> NamedSeries {
        NamedSeries::new(SeriesKey::new(code, metric), points)
    }

    #[test]
    fn test_merge_two_entities() {
        let aapl = series(
            "AAPL",
            Metric::Price,
            vec![
                TimePoint::new("2024-01-01", 100.0),
                TimePoint::new("2024-01-02", 110.0),
            ],
        );
        let msft = series("MSFT", Metric::Price, vec![TimePoint::new("2024-01-01", 50.0)]);

        let table = merge_series(&[aapl, msft]);

        assert_eq!(table.columns, vec!["AAPL", "MSFT"]);
        assert_eq!(
            table.rows,
            vec![
                MergedRow::new("2024-01-01").with("AAPL", 100.0).with("MSFT", 50.0),
                MergedRow::new("2024-01-02").with("AAPL", 110.0),
            ]
        );
        assert_eq!(
            serde_json::to_value(&table.rows).unwrap(),
            json!([
                {"date": "2024-01-01", "AAPL": 100.0, "MSFT": 50.0},
                {"date": "2024-01-02", "AAPL": 110.0}
            ])
        );
    }

    #[test]
    fn test_missing_date_skips_only_that_point() {
        let s = series(
            "AAPL",
            Metric::Price,
            vec![
                TimePoint::new("2024-01-01", 1.0),
                TimePoint::undated(2.0),
                TimePoint::new("2024-01-03", 3.0),
            ],
        );
        let table = merge_series(&[s]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_values("AAPL"), vec![1.0, 3.0]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_series(&[]).is_empty());
        let empty = series("AAPL", Metric::Price, vec![]);
        let table = merge_series(&[empty]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_sorted_by_time_not_lexicographic() {
        let s = series(
            "AAPL",
            Metric::Price,
            vec![
                TimePoint::new("2024-1-10", 10.0),
                TimePoint::new("2024-1-9", 9.0),
                TimePoint::new("2023-12-31", 1.0),
            ],
        );
        let table = merge_series(&[s]);
        let dates: Vec<&str> = table.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2023-12-31", "2024-1-9", "2024-1-10"]);
    }

    #[test]
    fn test_same_day_in_different_notation_shares_row() {
        let a = series("A", Metric::Price, vec![TimePoint::new("2024-01-05", 1.0)]);
        let b = series("B", Metric::Price, vec![TimePoint::new("2024-1-5", 2.0)]);
        let table = merge_series(&[a, b]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].date, "2024-01-05");
        assert_eq!(table.rows[0].get("A"), Some(1.0));
        assert_eq!(table.rows[0].get("B"), Some(2.0));
    }

    #[test]
    fn test_non_finite_values_skipped() {
        let s = series(
            "AAPL",
            Metric::Price,
            vec![
                TimePoint::new("2024-01-01", f64::NAN),
                TimePoint::new("2024-01-02", 2.0),
            ],
        );
        let table = merge_series(&[s]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_auto_naming_escalates_on_collision() {
        let price = series("AAPL", Metric::Price, vec![TimePoint::new("2024-01-01", 1.0)]);
        let vol = series("AAPL", Metric::Volatility, vec![TimePoint::new("2024-01-01", 0.2)]);
        let table = merge_series(&[price.clone(), vol]);
        assert_eq!(table.columns, vec!["prices_AAPL", "volatility_AAPL"]);

        let mut indexed = price.clone();
        indexed.key = indexed.key.with_normalize(NormalizeMode::Index);
        let table = merge_series(&[price, indexed]);
        assert_eq!(table.columns, vec!["prices_AAPL_none", "prices_AAPL_index"]);
    }

    #[test]
    fn test_explicit_naming() {
        let price = series("AAPL", Metric::Price, vec![TimePoint::new("2024-01-01", 1.0)]);
        let table = Aggregator::with_naming(ColumnNaming::MetricEntity).merge(&[price]);
        assert_eq!(table.columns, vec!["prices_AAPL"]);
        assert_eq!(table.rows[0].get("prices_AAPL"), Some(1.0));
    }

    #[test]
    fn test_merge_raw_combines_records() {
        let raw = json!([
            [
                {"date": "2024-01-02", "AAPL": 110.0},
                {"date": "2024-01-01", "AAPL": 100.0}
            ],
            [
                {"date": "2024-01-01", "MSFT": "50"},
                {"MSFT": 51.0}
            ],
            {"not": "an array"}
        ]);
        let table = merge_raw_series(&raw).unwrap();
        assert_eq!(table.columns, vec!["AAPL", "MSFT"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].date, "2024-01-01");
        assert_eq!(table.rows[0].get("MSFT"), Some(50.0));
        assert_eq!(table.rows[1].get("MSFT"), None);
    }

    #[test]
    fn test_merge_raw_rejects_non_array() {
        let err = merge_raw_series(&Value::Null).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(err.to_string().contains("null"));
        assert!(merge_raw_series(&json!({"a": 1})).is_err());
        assert!(merge_raw_series(&json!([])).unwrap().is_empty());
    }
}
