//! 상관행렬 모듈.
//!
//! 엔티티 간 수익률 움직임의 상관관계를 표현합니다. 분석 API 응답
//! `{labels, matrix}`를 해석하거나 병합 테이블에서 직접 계산합니다.
//!
//! # 예시
//!
//! ```rust,ignore
//! use invest_analytics::correlation::CorrelationMatrix;
//!
//! let matrix = CorrelationMatrix::from_payload(&payload, &selected_codes)
//!     .unwrap_or_else(|| CorrelationMatrix::from_returns_table(&returns, &selected_codes));
//! println!("{:?}", matrix.get("AAPL", "MSFT"));
//! ```

use invest_core::domain::statistics;
use invest_core::MergedTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::payload::number_from_value;

/// 상관계수 계산에 필요한 최소 공통 관측 수
pub const MIN_OBSERVATIONS: usize = 2;

/// 상관행렬.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// 엔티티 목록 (행/열 순서)
    pub labels: Vec<String>,
    /// 상관계수 행렬 (N×N, -1.0 ~ 1.0). 계산할 수 없는 칸은 `None`
    pub matrix: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 두 엔티티 간 상관계수.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.matrix.get(i)?.get(j).copied().flatten()
    }

    /// API 응답 `{matrix, labels?}`를 해석합니다.
    ///
    /// `labels`가 없으면 `default_labels`(선택 순서)를 사용합니다.
    /// 행렬이 없거나, 정사각형이 아니거나, 숫자/null 외의 칸이 있으면 `None`.
    pub fn from_payload(payload: &Value, default_labels: &[String]) -> Option<Self> {
        let rows = payload.get("matrix")?.as_array()?;

        let labels: Vec<String> = match payload.get("labels").and_then(Value::as_array) {
            Some(list) => list
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()?,
            None => default_labels.to_vec(),
        };

        let n = labels.len();
        if rows.len() != n {
            debug!(rows = rows.len(), labels = n, "상관행렬 크기 불일치");
            return None;
        }

        let mut matrix = Vec::with_capacity(n);
        for row in rows {
            let cells = row.as_array()?;
            if cells.len() != n {
                return None;
            }
            let parsed = cells
                .iter()
                .map(|c| match c {
                    Value::Null => Some(None),
                    other => number_from_value(other).map(Some),
                })
                .collect::<Option<Vec<_>>>()?;
            matrix.push(parsed);
        }

        Some(Self { labels, matrix })
    }

    /// 수익률 병합 테이블에서 상관행렬을 계산합니다.
    ///
    /// 두 컬럼 모두 값이 있는 날짜만 짝지어 계산합니다.
    pub fn from_returns_table(table: &MergedTable, labels: &[String]) -> Self {
        let n = labels.len();
        let mut matrix = vec![vec![None; n]; n];

        for i in 0..n {
            for j in i..n {
                let corr = if i == j {
                    Some(1.0)
                } else {
                    let (x, y) = paired_values(table, &labels[i], &labels[j]);
                    if x.len() < MIN_OBSERVATIONS {
                        None
                    } else {
                        statistics::pearson_correlation(&x, &y)
                    }
                };
                matrix[i][j] = corr;
                matrix[j][i] = corr; // 대칭
            }
        }

        Self {
            labels: labels.to_vec(),
            matrix,
        }
    }

    /// 가격 병합 테이블을 수익률로 바꾼 뒤 상관행렬을 계산합니다.
    pub fn from_prices_table(table: &MergedTable, labels: &[String]) -> Self {
        Self::from_returns_table(&returns_table(table), labels)
    }
}

/// 두 컬럼이 모두 값을 가진 행의 값 쌍.
fn paired_values(table: &MergedTable, a: &str, b: &str) -> (Vec<f64>, Vec<f64>) {
    table
        .rows
        .iter()
        .filter_map(|r| match (r.get(a), r.get(b)) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        })
        .unzip()
}

/// 가격 테이블을 단순 수익률 테이블로 변환합니다.
///
/// 각 컬럼에서 직전 관측값 대비 수익률을 현재 행에 기록합니다.
pub fn returns_table(prices: &MergedTable) -> MergedTable {
    let mut out = MergedTable::new(
        prices.columns.clone(),
        prices
            .rows
            .iter()
            .map(|r| invest_core::MergedRow::new(r.date.clone()))
            .collect(),
    );

    for column in &prices.columns {
        let mut prev: Option<f64> = None;
        for (src, dst) in prices.rows.iter().zip(out.rows.iter_mut()) {
            let Some(price) = src.get(column) else {
                continue;
            };
            if let Some(p) = prev {
                let r = statistics::simple_returns(&[p, price]);
                dst.values.insert(column.clone(), r[0]);
            }
            prev = Some(price);
        }
    }

    out.rows.retain(|r| !r.values.is_empty());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::MergedRow;
    use serde_json::json;

    fn labels(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_payload_with_labels() {
        let payload = json!({
            "labels": ["AAPL", "MSFT"],
            "matrix": [[1.0, 0.5], [0.5, 1.0]]
        });
        let m = CorrelationMatrix::from_payload(&payload, &[]).unwrap();
        assert_eq!(m.get("AAPL", "MSFT"), Some(0.5));
        assert_eq!(m.get("AAPL", "NVDA"), None);
    }

    #[test]
    fn test_from_payload_defaults_labels_and_allows_null() {
        let payload = json!({"matrix": [[1.0, null], [null, 1.0]]});
        let m = CorrelationMatrix::from_payload(&payload, &labels(&["PF001", "AAPL"])).unwrap();
        assert_eq!(m.labels, labels(&["PF001", "AAPL"]));
        assert_eq!(m.get("PF001", "AAPL"), None);
        assert_eq!(m.get("AAPL", "AAPL"), Some(1.0));
    }

    #[test]
    fn test_malformed_payload_yields_none() {
        let sel = labels(&["A", "B"]);
        assert!(CorrelationMatrix::from_payload(&json!([]), &sel).is_none());
        assert!(CorrelationMatrix::from_payload(&json!({"matrix": "x"}), &sel).is_none());
        assert!(CorrelationMatrix::from_payload(&json!({"matrix": [[1.0]]}), &sel).is_none());
        assert!(
            CorrelationMatrix::from_payload(&json!({"matrix": [[1.0, "hi"], [0.1, 1.0]]}), &sel)
                .is_none()
        );
    }

    #[test]
    fn test_from_returns_table() {
        let table = MergedTable::new(
            labels(&["A", "B", "C"]),
            vec![
                MergedRow::new("2024-01-01").with("A", 0.01).with("B", 0.02).with("C", -0.01),
                MergedRow::new("2024-01-02").with("A", 0.02).with("B", 0.04).with("C", -0.02),
                MergedRow::new("2024-01-03").with("A", -0.01).with("B", -0.02).with("C", 0.01),
            ],
        );
        let m = CorrelationMatrix::from_returns_table(&table, &labels(&["A", "B", "C"]));
        assert!((m.get("A", "B").unwrap() - 1.0).abs() < 1e-9);
        assert!((m.get("A", "C").unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(m.get("B", "A"), m.get("A", "B"));
        assert_eq!(m.get("C", "C"), Some(1.0));
    }

    #[test]
    fn test_returns_table() {
        let prices = MergedTable::new(
            labels(&["A"]),
            vec![
                MergedRow::new("2024-01-01").with("A", 100.0),
                MergedRow::new("2024-01-02"),
                MergedRow::new("2024-01-03").with("A", 110.0),
            ],
        );
        let returns = returns_table(&prices);
        assert_eq!(returns.len(), 1);
        assert_eq!(returns.rows[0].date, "2024-01-03");
        assert!((returns.rows[0].get("A").unwrap() - 0.1).abs() < 1e-12);
    }
}
