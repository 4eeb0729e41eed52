//! 테스트 엔티티 카탈로그 출력.

use anyhow::Result;
use invest_data::catalog::{test_portfolios, test_securities};
use serde::Serialize;

use super::output::{emit, escape_csv, format_json, truncate, OutputFormat};

/// 카탈로그 항목.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub code: String,
    pub kind: &'static str,
    pub name: String,
    pub currency: String,
    /// 포트폴리오 유형 또는 섹터
    pub category: String,
}

/// 포트폴리오 다음 증권 순서로 카탈로그를 모읍니다.
pub fn catalog_entries() -> Vec<CatalogEntry> {
    let portfolios = test_portfolios().into_iter().map(|p| CatalogEntry {
        code: p.code,
        kind: "portfolio",
        name: p.name,
        currency: p.currency,
        category: p.portfolio_type,
    });
    let securities = test_securities().into_iter().map(|s| CatalogEntry {
        code: s.code,
        kind: "security",
        name: s.name,
        currency: s.currency,
        category: s.sector,
    });
    portfolios.chain(securities).collect()
}

/// 카탈로그를 출력합니다.
pub fn run_catalog(format: OutputFormat, output: Option<&str>) -> Result<usize> {
    let entries = catalog_entries();
    let content = match format {
        OutputFormat::Table => format_table(&entries),
        OutputFormat::Csv => format_csv(&entries),
        OutputFormat::Json => format_json(&entries)?,
    };
    emit(&content, output)?;
    Ok(entries.len())
}

fn format_table(entries: &[CatalogEntry]) -> String {
    let mut output = format!(
        "{:<8} {:<10} {:<30} {:<8} {:<15}\n",
        "CODE", "KIND", "NAME", "CCY", "CATEGORY"
    );
    output.push_str(&"-".repeat(75));
    output.push('\n');

    for e in entries {
        output.push_str(&format!(
            "{:<8} {:<10} {:<30} {:<8} {:<15}\n",
            e.code,
            e.kind,
            truncate(&e.name, 30),
            e.currency,
            e.category
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {} entities", entries.len()));
    output
}

fn format_csv(entries: &[CatalogEntry]) -> String {
    let mut output = String::from("code,kind,name,currency,category\n");
    for e in entries {
        output.push_str(&format!(
            "{},{},{},{},{}\n",
            e.code,
            e.kind,
            escape_csv(&e.name),
            e.currency,
            escape_csv(&e.category)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let entries = catalog_entries();
        assert_eq!(entries.len(), 13);
        assert_eq!(entries[0].code, "PF001");
        assert_eq!(entries[0].kind, "portfolio");
        assert_eq!(entries[5].code, "AAPL");
        assert_eq!(entries[5].category, "Technology");
    }

    #[test]
    fn test_csv_escapes_names() {
        let csv = format_csv(&catalog_entries());
        assert!(csv.contains("JPM,security,JPMorgan Chase & Co.,USD,Financials"));
        assert!(csv.starts_with("code,kind,name,currency,category\n"));
    }
}
