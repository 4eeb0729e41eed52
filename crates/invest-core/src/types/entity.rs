//! 엔티티(포트폴리오/종목) 타입.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 엔티티 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Portfolio,
    Security,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Portfolio => "portfolio",
            EntityKind::Security => "security",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 포트폴리오 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub code: String,
    pub name: String,
    pub description: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub portfolio_type: String,
}

/// 종목 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    pub code: String,
    pub name: String,
    pub description: String,
    pub currency: String,
    pub sector: String,
    pub exchange: String,
}

/// 사용자 입력 코드를 정규화합니다 (공백 제거, 대문자).
///
/// 빈 문자열이면 `None`.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  aapl "), Some("AAPL".to_string()));
        assert_eq!(normalize_code("pf001"), Some("PF001".to_string()));
        assert_eq!(normalize_code("   "), None);
    }

    #[test]
    fn test_portfolio_type_field_name() {
        let p: Portfolio = serde_json::from_value(serde_json::json!({
            "code": "PF001",
            "name": "Global Equity Fund",
            "description": "Diversified global equity portfolio",
            "currency": "USD",
            "type": "Equity"
        }))
        .unwrap();
        assert_eq!(p.portfolio_type, "Equity");
    }
}
