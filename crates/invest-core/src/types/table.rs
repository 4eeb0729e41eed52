//! 병합 테이블 타입.
//!
//! 여러 시계열을 날짜 기준으로 합친 결과입니다. 행은 날짜가 가리키는
//! 시점의 오름차순이며, 관측값이 없는 컬럼은 해당 행에 키가 없습니다(sparse).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::series::TimePoint;

/// 날짜 하나에 대한 병합 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub date: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl MergedRow {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            values: BTreeMap::new(),
        }
    }

    /// 값을 추가한 행을 반환합니다 (테스트/픽스처용 빌더).
    pub fn with(mut self, column: impl Into<String>, value: f64) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// 차트용 병합 테이블.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedTable {
    /// 입력 순서대로의 컬럼 이름
    pub columns: Vec<String>,
    /// 날짜 오름차순 행
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn new(columns: Vec<String>, rows: Vec<MergedRow>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 가장 최근 날짜의 행.
    pub fn last_row(&self) -> Option<&MergedRow> {
        self.rows.last()
    }

    /// 특정 날짜의 행.
    pub fn row(&self, date: &str) -> Option<&MergedRow> {
        self.rows.iter().find(|r| r.date == date)
    }

    /// 한 컬럼의 값을 날짜 순서대로 추출합니다. 값이 없는 날짜는 제외됩니다.
    pub fn column_points(&self, column: &str) -> Vec<TimePoint> {
        self.rows
            .iter()
            .filter_map(|r| r.get(column).map(|v| TimePoint::new(r.date.clone(), v)))
            .collect()
    }

    /// 한 컬럼의 값만 추출합니다.
    pub fn column_values(&self, column: &str) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.get(column)).collect()
    }

    /// CSV 문자열로 변환합니다. 값이 없는 셀은 비워 둡니다.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("date");
        for col in &self.columns {
            out.push(',');
            out.push_str(&escape_csv(col));
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&escape_csv(&row.date));
            for col in &self.columns {
                out.push(',');
                if let Some(v) = row.get(col) {
                    out.push_str(&v.to_string());
                }
            }
            out.push('\n');
        }
        out
    }
}

/// 쉼표, 따옴표, 줄바꿈이 있는 필드를 CSV 규칙에 맞게 감쌉니다.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
