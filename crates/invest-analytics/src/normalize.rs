//! 시계열 정규화.
//!
//! - `none`: 원본 그대로
//! - `index`: 첫 값을 100으로 재조정 (`v / first * 100`)
//! - `zscore`: `(v - μ) / σ`, μ는 평균, σ는 모표준편차
//!
//! 분모가 0이 되는 경우(첫 값 0, 빈 시계열, 상수 시계열)는 분모를 1로
//! 대체합니다. 정규화는 길이와 순서, 날짜를 보존합니다.

use invest_core::domain::statistics;
use invest_core::{MergedRow, MergedTable, NamedSeries, NormalizeMode, TimePoint};

/// 포인트 목록을 정규화합니다.
pub fn normalize(points: &[TimePoint], mode: NormalizeMode) -> Vec<TimePoint> {
    match mode {
        NormalizeMode::None => points.to_vec(),
        NormalizeMode::Index => {
            let base = index_base(points.first().map(|p| p.value));
            rescale(points, |v| v / base * 100.0)
        }
        NormalizeMode::ZScore => {
            let values: Vec<f64> = points.iter().map(|p| p.value).collect();
            let (mu, sigma) = zscore_params(&values);
            rescale(points, |v| (v - mu) / sigma)
        }
    }
}

/// 시계열을 정규화하고 키에 정규화 방식을 기록합니다.
pub fn normalize_series(series: &NamedSeries, mode: NormalizeMode) -> NamedSeries {
    NamedSeries::new(
        series.key.clone().with_normalize(mode),
        normalize(&series.points, mode),
    )
}

/// 병합 테이블의 각 컬럼을 정규화합니다.
///
/// 컬럼마다 값이 있는 행만 대상으로 계산하며, 희소 구조는 유지됩니다.
pub fn normalize_table<F>(table: &MergedTable, mode_for: F) -> MergedTable
where
    F: Fn(&str) -> NormalizeMode,
{
    let mut rows: Vec<MergedRow> = table
        .rows
        .iter()
        .map(|r| MergedRow::new(r.date.clone()))
        .collect();

    for column in &table.columns {
        let mode = mode_for(column);
        let transform: Box<dyn Fn(f64) -> f64> = match mode {
            NormalizeMode::None => Box::new(|v: f64| v),
            NormalizeMode::Index => {
                let base = index_base(table.rows.iter().find_map(|r| r.get(column)));
                Box::new(move |v: f64| v / base * 100.0)
            }
            NormalizeMode::ZScore => {
                let (mu, sigma) = zscore_params(&table.column_values(column));
                Box::new(move |v: f64| (v - mu) / sigma)
            }
        };

        for (src, dst) in table.rows.iter().zip(rows.iter_mut()) {
            if let Some(v) = src.get(column) {
                dst.values.insert(column.clone(), transform(v));
            }
        }
    }

    MergedTable::new(table.columns.clone(), rows)
}

/// index 모드의 기준값. 첫 값이 없거나 0이거나 유한하지 않으면 1.
fn index_base(first: Option<f64>) -> f64 {
    match first {
        Some(v) if v != 0.0 && v.is_finite() => v,
        _ => 1.0,
    }
}

/// z-score의 (μ, σ). 값이 없으면 μ = 0, σ가 0이거나 없으면 1.
fn zscore_params(values: &[f64]) -> (f64, f64) {
    let mu = statistics::mean(values).unwrap_or(0.0);
    let sigma = match statistics::population_std_dev(values) {
        Some(s) if s > 0.0 => s,
        _ => 1.0,
    };
    (mu, sigma)
}

fn rescale(points: &[TimePoint], f: impl Fn(f64) -> f64) -> Vec<TimePoint> {
    points
        .iter()
        .map(|p| TimePoint {
            date: p.date.clone(),
            value: f(p.value),
        })
        .collect()
}
