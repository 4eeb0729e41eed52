//! 명령 결과 출력 형식.

use std::fs::File;
use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result};
pub use invest_core::escape_csv;
use invest_core::MergedTable;
use serde::Serialize;
use tracing::info;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid format: {}. Use: table, csv, json",
                s
            )),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// 파일 또는 stdout에 출력합니다.
pub fn emit(content: &str, output_path: Option<&str>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to file")?;
        info!("Output written to: {}", path);
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// JSON 형식.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
}

/// 병합 테이블을 형식에 맞게 렌더링합니다.
pub fn render_table(table: &MergedTable, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_merged_table(table)),
        OutputFormat::Csv => Ok(table.to_csv()),
        OutputFormat::Json => format_json(table),
    }
}

/// 병합 테이블을 고정폭 표로 만듭니다. 값이 없는 칸은 `-`.
pub fn format_merged_table(table: &MergedTable) -> String {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .map(|c| c.chars().count().max(12))
        .collect();

    let mut output = format!("{:<12}", "DATE");
    for (col, width) in table.columns.iter().zip(&widths) {
        output.push_str(&format!(" {:>width$}", col, width = width));
    }
    output.push('\n');
    output.push_str(&"-".repeat(12 + widths.iter().map(|w| w + 1).sum::<usize>()));
    output.push('\n');

    for row in &table.rows {
        output.push_str(&format!("{:<12}", truncate(&row.date, 12)));
        for (col, width) in table.columns.iter().zip(&widths) {
            let cell = row
                .get(col)
                .map(format_value)
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(" {:>width$}", cell, width = width));
        }
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&format!("Total: {} rows", table.len()));
    output
}

/// 숫자 표시. 크기에 따라 소수점 자릿수를 조정합니다.
pub fn format_value(v: f64) -> String {
    if !v.is_finite() {
        v.to_string()
    } else if v.abs() >= 1.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.4}", v)
    }
}

/// 선택적 숫자 표시.
pub fn format_optional(v: Option<f64>) -> String {
    v.map(format_value).unwrap_or_else(|| "-".to_string())
}

/// 문자열 자르기 (UTF-8 안전).
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invest_core::MergedRow;

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("CSV").unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(OutputFormat::parse("xml").is_err());
    }

    #[test]
    fn test_format_merged_table_marks_missing_cells() {
        let table = MergedTable::new(
            vec!["AAPL".to_string(), "MSFT".to_string()],
            vec![
                MergedRow::new("2024-01-01").with("AAPL", 100.0),
                MergedRow::new("2024-01-02").with("AAPL", 101.5).with("MSFT", 0.5),
            ],
        );
        let out = format_merged_table(&table);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("DATE"));
        assert!(lines[2].contains("100.00") && lines[2].trim_end().ends_with('-'));
        assert!(lines[3].contains("0.5000"));
        assert!(out.ends_with("Total: 2 rows"));
    }

    #[test]
    fn test_truncate_and_escape() {
        assert_eq!(truncate("Global Equity Fund", 10), "Global ...");
        assert_eq!(truncate("V", 10), "V");
        assert_eq!(escape_csv("JPMorgan Chase & Co."), "JPMorgan Chase & Co.");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
    }
}
