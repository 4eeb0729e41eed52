//! 성과 지표 및 VaR 뷰.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::{date_from_value, number_from_value};

/// VaR 보유 기간 (일)
pub const VAR_HORIZONS: [u32; 3] = [1, 5, 10];

/// 엔티티 하나의 성과 지표.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub code: String,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub volatility: Option<f64>,
    pub annual_return: Option<f64>,
    pub beta: Option<f64>,
    pub alpha: Option<f64>,
}

/// 성과 지표 응답 `[{code, sharpe_ratio, ...}]`을 해석합니다.
///
/// 배열이 아니면 빈 목록입니다. `code`가 없는 원소는 건너뜁니다.
pub fn metrics_from_payload(payload: &Value) -> Vec<EntityMetrics> {
    let Some(items) = payload.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let code = item.get("code")?.as_str()?.to_string();
            let field = |name: &str| item.get(name).and_then(number_from_value);
            Some(EntityMetrics {
                code,
                sharpe_ratio: field("sharpe_ratio"),
                max_drawdown: field("max_drawdown"),
                volatility: field("volatility"),
                annual_return: field("annual_return"),
                beta: field("beta"),
                alpha: field("alpha"),
            })
        })
        .collect()
}

/// 엔티티 하나의 VaR 요약 (양수 손실 비율).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSummary {
    pub code: String,
    /// 기준 날짜 (가장 최근 레코드)
    pub date: Option<String>,
    pub var_1d: Option<f64>,
    pub var_5d: Option<f64>,
    pub var_10d: Option<f64>,
}

/// VaR 응답의 가장 최근 레코드에서 `{code}_1d/5d/10d`를 읽습니다.
///
/// 배열이 아니거나 비어 있으면 빈 목록입니다. 레코드에 값이 없는
/// 엔티티는 `None` 값으로 포함됩니다.
pub fn var_from_payload(payload: &Value, codes: &[String]) -> Vec<VarSummary> {
    let Some(latest) = payload
        .as_array()
        .and_then(|rows| rows.last())
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let date = date_from_value(latest.get("date"));
    let horizon = |code: &str, days: u32| {
        latest
            .get(&format!("{}_{}d", code, days))
            .and_then(number_from_value)
    };

    codes
        .iter()
        .map(|code| VarSummary {
            code: code.clone(),
            date: date.clone(),
            var_1d: horizon(code, VAR_HORIZONS[0]),
            var_5d: horizon(code, VAR_HORIZONS[1]),
            var_10d: horizon(code, VAR_HORIZONS[2]),
        })
        .collect()
}
