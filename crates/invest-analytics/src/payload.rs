//! 분석 API 응답 해석.
//!
//! 클라이언트 응답은 날짜별 레코드 배열 `[{date, CODE: number | string}]`
//! 입니다. 형태가 어긋난 데이터(배열이 아닌 응답, 숫자가 아닌 값)는
//! 에러가 아니라 비어 있는 데이터로 취급합니다.

use std::collections::BTreeMap;

use invest_core::{Metric, NamedSeries, SeriesKey, TimePoint};
use invest_data::ApiResponse;
use serde_json::Value;
use tracing::debug;

/// 날짜 하나에 대한 원시 레코드.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    pub date: Option<String>,
    pub values: BTreeMap<String, f64>,
}

/// JSON 값을 숫자로 해석합니다. 숫자 문자열도 허용합니다.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// 레코드의 날짜 필드. 문자열이 아니거나 비어 있으면 `None`.
pub fn date_from_value(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// 응답 데이터를 레코드 목록으로 변환합니다.
///
/// 배열이 아니면 빈 목록, 객체가 아닌 원소는 건너뜁니다.
pub fn records_from_payload(payload: &Value) -> Vec<SeriesRecord> {
    let Some(items) = payload.as_array() else {
        debug!(kind = value_kind(payload), "배열이 아닌 응답 데이터 무시");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let values = obj
                .iter()
                .filter(|(k, _)| k.as_str() != "date")
                .filter_map(|(k, v)| number_from_value(v).map(|n| (k.clone(), n)))
                .collect();
            Some(SeriesRecord {
                date: date_from_value(obj.get("date")),
                values,
            })
        })
        .collect()
}

/// 레코드에서 엔티티별 시계열을 추출합니다.
///
/// 코드마다 하나의 시계열을 만들며, 레코드에 값이 없는 날짜는 포함하지 않습니다.
/// 날짜가 없는 레코드는 날짜 없는 포인트로 남겨 병합 단계에서 건너뛰게 합니다.
pub fn series_from_records(
    records: &[SeriesRecord],
    codes: &[String],
    metric: Metric,
) -> Vec<NamedSeries> {
    codes
        .iter()
        .map(|code| {
            let points = records
                .iter()
                .filter_map(|r| {
                    let value = *r.values.get(code)?;
                    Some(match &r.date {
                        Some(date) => TimePoint::new(date.clone(), value),
                        None => TimePoint::undated(value),
                    })
                })
                .collect();
            NamedSeries::new(SeriesKey::new(code.clone(), metric), points)
        })
        .collect()
}

/// 응답 봉투에서 시계열을 추출합니다. 실패 응답은 시계열 없음.
pub fn series_from_response(
    response: &ApiResponse<Value>,
    codes: &[String],
    metric: Metric,
) -> Vec<NamedSeries> {
    match response.data() {
        Some(data) => series_from_records(&records_from_payload(data), codes, metric),
        None => Vec::new(),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_strings_accepted() {
        assert_eq!(number_from_value(&json!(1.5)), Some(1.5));
        assert_eq!(number_from_value(&json!(" 2.25 ")), Some(2.25));
        assert_eq!(number_from_value(&json!("abc")), None);
        assert_eq!(number_from_value(&json!(null)), None);
        assert_eq!(number_from_value(&json!(true)), None);
    }

    #[test]
    fn test_non_array_payload_yields_nothing() {
        assert!(records_from_payload(&json!(null)).is_empty());
        assert!(records_from_payload(&json!({"AAPL": 1})).is_empty());
        assert!(records_from_payload(&json!("oops")).is_empty());
    }

    #[test]
    fn test_records_skip_non_numeric_values() {
        let records = records_from_payload(&json!([
            {"date": "2024-01-01", "AAPL": 100, "MSFT": "50.5", "note": "n/a"},
            42,
            {"AAPL": 101}
        ]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].values.len(), 2);
        assert_eq!(records[0].values["MSFT"], 50.5);
        assert_eq!(records[1].date, None);
    }

    #[test]
    fn test_series_from_records() {
        let records = records_from_payload(&json!([
            {"date": "2024-01-01", "AAPL": 100.0, "MSFT": 50.0},
            {"date": "2024-01-02", "AAPL": 110.0}
        ]));
        let codes = vec!["AAPL".to_string(), "MSFT".to_string(), "NVDA".to_string()];
        let series = series_from_records(&records, &codes, Metric::Price);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].values(), vec![100.0, 110.0]);
        assert_eq!(series[1].points, vec![TimePoint::new("2024-01-01", 50.0)]);
        assert!(series[2].is_empty());
        assert_eq!(series[0].key.metric, Metric::Price);
    }

    #[test]
    fn test_failed_response_yields_no_series() {
        let resp = ApiResponse::<Value>::failure("HTTP 500: boom");
        assert!(series_from_response(&resp, &["AAPL".to_string()], Metric::Price).is_empty());
    }
}
