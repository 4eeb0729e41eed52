//! 날짜 문자열 해석.
//!
//! 병합 테이블의 정렬 키는 날짜 문자열 자체가 아니라 그 문자열이 가리키는
//! 시점입니다. `2024-1-5`처럼 0으로 채우지 않은 형식도 같은 규칙으로 정렬됩니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 달력 날짜 형식 (0 채움 여부와 무관하게 해석됨)
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// 날짜 문자열을 UTC 기준 epoch 밀리초로 해석합니다.
///
/// 지원 형식:
/// - `YYYY-MM-DD`, `YYYY-M-D`
/// - `YYYY/MM/DD`
/// - `YYYYMMDD`
/// - RFC 3339 타임스탬프 (`2024-01-05T09:30:00Z`)
/// - 시간대 없는 `YYYY-MM-DDTHH:MM:SS`
///
/// 해석할 수 없으면 `None`을 반환합니다.
pub fn parse_date_key(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// 날짜를 `YYYY-MM-DD` 문자열로 변환합니다.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        let a = parse_date_key("2024-01-01").unwrap();
        let b = parse_date_key("2024-01-02").unwrap();
        assert_eq!(b - a, 86_400_000);
    }

    #[test]
    fn test_non_padded_matches_padded() {
        assert_eq!(parse_date_key("2024-1-5"), parse_date_key("2024-01-05"));
        // 문자열 순서와 시점 순서가 다른 경우
        assert!(parse_date_key("2024-1-10").unwrap() > parse_date_key("2024-1-9").unwrap());
    }

    #[test]
    fn test_other_formats() {
        let base = parse_date_key("2024-03-15").unwrap();
        assert_eq!(parse_date_key("2024/03/15"), Some(base));
        assert_eq!(parse_date_key("20240315"), Some(base));
        assert_eq!(parse_date_key("2024-03-15T00:00:00Z"), Some(base));
        assert_eq!(parse_date_key("2024-03-15T00:00:00"), Some(base));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_date_key(""), None);
        assert_eq!(parse_date_key("   "), None);
        assert_eq!(parse_date_key("Day 3"), None);
        assert_eq!(parse_date_key("2024-13-01"), None);
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
        assert_eq!(format_date(d), "2024-02-09");
    }
}
