//! 테스트 데이터용 엔티티 카탈로그.

use invest_core::{EntityKind, Portfolio, Security};

const PORTFOLIOS: &[(&str, &str, &str, &str, &str)] = &[
    ("PF001", "Global Equity Fund", "Diversified global equity portfolio", "USD", "Equity"),
    ("PF002", "Tech Growth Portfolio", "Technology focused growth portfolio", "USD", "Growth"),
    ("PF003", "European Value Fund", "European value-oriented investments", "EUR", "Value"),
    ("PF004", "Asia Pacific Fund", "Asia Pacific market exposure", "USD", "Regional"),
    ("PF005", "Bond Strategic Fund", "Fixed income strategic allocation", "USD", "Fixed Income"),
];

const SECURITIES: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("AAPL", "Apple Inc.", "Technology hardware and software", "USD", "Technology", "NASDAQ"),
    ("MSFT", "Microsoft Corporation", "Software and cloud services", "USD", "Technology", "NASDAQ"),
    ("GOOGL", "Alphabet Inc.", "Internet services and technology", "USD", "Technology", "NASDAQ"),
    ("TSLA", "Tesla Inc.", "Electric vehicles and energy", "USD", "Automotive", "NASDAQ"),
    ("NVDA", "NVIDIA Corporation", "Graphics and AI computing", "USD", "Technology", "NASDAQ"),
    ("JPM", "JPMorgan Chase & Co.", "Banking and financial services", "USD", "Financials", "NYSE"),
    ("JNJ", "Johnson & Johnson", "Healthcare and pharmaceuticals", "USD", "Healthcare", "NYSE"),
    ("V", "Visa Inc.", "Payment processing services", "USD", "Financials", "NYSE"),
];

/// 테스트 포트폴리오 목록.
pub fn test_portfolios() -> Vec<Portfolio> {
    PORTFOLIOS
        .iter()
        .map(|&(code, name, description, currency, kind)| Portfolio {
            code: code.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            currency: currency.to_string(),
            portfolio_type: kind.to_string(),
        })
        .collect()
}

/// 테스트 종목 목록.
pub fn test_securities() -> Vec<Security> {
    SECURITIES
        .iter()
        .map(
            |&(code, name, description, currency, sector, exchange)| Security {
                code: code.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                currency: currency.to_string(),
                sector: sector.to_string(),
                exchange: exchange.to_string(),
            },
        )
        .collect()
}

pub fn find_portfolio(code: &str) -> Option<Portfolio> {
    test_portfolios()
        .into_iter()
        .find(|p| p.code.eq_ignore_ascii_case(code.trim()))
}

pub fn find_security(code: &str) -> Option<Security> {
    test_securities()
        .into_iter()
        .find(|s| s.code.eq_ignore_ascii_case(code.trim()))
}

/// 카탈로그에서 코드의 엔티티 종류를 찾습니다.
pub fn kind_of(code: &str) -> Option<EntityKind> {
    if find_portfolio(code).is_some() {
        Some(EntityKind::Portfolio)
    } else if find_security(code).is_some() {
        Some(EntityKind::Security)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(test_portfolios().len(), 5);
        assert_eq!(test_securities().len(), 8);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(find_portfolio("pf003").unwrap().currency, "EUR");
        assert_eq!(find_security(" v ").unwrap().name, "Visa Inc.");
        assert!(find_security("IBM").is_none());
    }

    #[test]
    fn test_kind_of() {
        assert_eq!(kind_of("PF001"), Some(EntityKind::Portfolio));
        assert_eq!(kind_of("NVDA"), Some(EntityKind::Security));
        assert_eq!(kind_of("XYZ"), None);
    }
}
