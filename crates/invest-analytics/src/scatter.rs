//! 횡단면 산점도 집계.
//!
//! 엔티티마다 X축 시계열과 Y축 시계열의 평균을 계산해 점 하나로 만듭니다.

use invest_core::domain::statistics;
use invest_core::MergedTable;
use serde::{Deserialize, Serialize};

/// 산점도의 점.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub entity: String,
    pub x: f64,
    pub y: f64,
}

/// 두 병합 테이블에서 엔티티별 평균 점을 만듭니다.
///
/// 테이블의 컬럼 이름은 엔티티 코드여야 합니다. 어느 한 축에라도
/// 유한한 값이 없는 엔티티는 결과에서 제외되며, 같은 엔티티가 여러 번
/// 주어져도 점은 하나만 만들어집니다.
pub fn combine_for_scatter(
    x_series: &MergedTable,
    y_series: &MergedTable,
    entities: &[String],
) -> Vec<ScatterPoint> {
    let mut points: Vec<ScatterPoint> = Vec::with_capacity(entities.len());

    for entity in entities {
        if points.iter().any(|p| &p.entity == entity) {
            continue;
        }
        let x = statistics::mean(&x_series.column_values(entity));
        let y = statistics::mean(&y_series.column_values(entity));
        if let (Some(x), Some(y)) = (x, y) {
            points.push(ScatterPoint {
                entity: entity.clone(),
                x,
                y,
            });
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::MergedRow;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_entity_missing_from_one_axis_is_excluded() {
        let x = MergedTable::new(
            codes(&["A"]),
            vec![
                MergedRow::new("2024-01-01").with("A", 1.0),
                MergedRow::new("2024-01-02").with("A", 3.0),
            ],
        );
        let y = MergedTable::new(
            codes(&["A", "B"]),
            vec![MergedRow::new("2024-01-01").with("A", 10.0).with("B", 20.0)],
        );

        let points = combine_for_scatter(&x, &y, &codes(&["A", "B"]));
        assert_eq!(
            points,
            vec![ScatterPoint {
                entity: "A".to_string(),
                x: 2.0,
                y: 10.0
            }]
        );
    }

    #[test]
    fn test_duplicate_entities_emit_once() {
        let t = MergedTable::new(
            codes(&["A"]),
            vec![MergedRow::new("2024-01-01").with("A", 1.0)],
        );
        let points = combine_for_scatter(&t, &t, &codes(&["A", "A"]));
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_non_finite_values_ignored_in_mean() {
        let x = MergedTable::new(
            codes(&["A"]),
            vec![
                MergedRow::new("2024-01-01").with("A", f64::NAN),
                MergedRow::new("2024-01-02").with("A", 4.0),
            ],
        );
        let y = MergedTable::new(
            codes(&["A"]),
            vec![MergedRow::new("2024-01-01").with("A", f64::NAN)],
        );
        assert!(combine_for_scatter(&x, &x, &codes(&["A"]))[0].x == 4.0);
        assert!(combine_for_scatter(&x, &y, &codes(&["A"])).is_empty());
    }
}
