//! 시계열 뷰 명령 (chart, compare, scatter).

use anyhow::Result;
use invest_analytics::{DashboardView, ScatterPoint};
use invest_core::{AxisPolicy, Metric, NormalizeMode};
use tracing::{info, warn};

use super::context::{applied, CommandContext, SelectionConfig};
use super::output::{emit, escape_csv, format_json, format_value, render_table, OutputFormat};

/// 차트 명령 설정.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub selection: SelectionConfig,
    /// 활성화할 지표 (비어 있으면 가격만)
    pub metrics: Vec<Metric>,
    pub normalize: NormalizeMode,
}

/// 활성화된 지표를 하나의 병합 테이블로 출력합니다.
pub async fn run_chart(ctx: &CommandContext, config: ChartConfig) -> Result<usize> {
    let loader = ctx.loader(&config.selection, AxisPolicy::default())?;
    {
        let mut state = loader.state().write().await;
        if !config.metrics.is_empty() {
            for metric in Metric::ALL {
                state.set_enabled(metric, config.metrics.contains(&metric));
            }
        }
        for metric in Metric::ALL {
            state.set_normalize(metric, config.normalize);
        }
    }

    let view = applied(loader.load_chart().await)?;
    report_failures(&view);
    info!(rows = view.table.len(), columns = view.table.columns.len(), "차트 로드 완료");

    let content = render_table(&view.table, config.selection.format)?;
    emit(&content, config.selection.output.as_deref())?;
    Ok(view.table.len())
}

/// 비교 명령 설정.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub selection: SelectionConfig,
    pub metric: Metric,
    pub normalize: NormalizeMode,
}

/// 한 지표에 대해 선택된 엔티티를 나란히 출력합니다.
pub async fn run_compare(ctx: &CommandContext, config: CompareConfig) -> Result<usize> {
    let loader = ctx.loader(&config.selection, AxisPolicy::default())?;
    loader
        .state()
        .write()
        .await
        .set_normalize(config.metric, config.normalize);

    let view = applied(loader.load_comparison(config.metric).await)?;
    report_failures(&view);

    let content = render_table(&view.table, config.selection.format)?;
    emit(&content, config.selection.output.as_deref())?;
    Ok(view.table.len())
}

/// 산점도 명령 설정.
#[derive(Debug, Clone)]
pub struct ScatterConfig {
    pub selection: SelectionConfig,
    pub x: Metric,
    pub y: Metric,
}

/// 엔티티별 평균 산점도를 출력합니다.
pub async fn run_scatter(ctx: &CommandContext, config: ScatterConfig) -> Result<usize> {
    let loader = ctx.loader(&config.selection, AxisPolicy::default())?;
    let view = applied(loader.load_scatter(config.x, config.y).await)?;
    report_failures(&view);

    let content = match config.selection.format {
        OutputFormat::Table => format_scatter_table(&view.scatter, config.x, config.y),
        OutputFormat::Csv => format_scatter_csv(&view.scatter, config.x, config.y),
        OutputFormat::Json => format_json(&view.scatter)?,
    };
    emit(&content, config.selection.output.as_deref())?;
    Ok(view.scatter.len())
}

fn report_failures(view: &DashboardView) {
    for failure in &view.failures {
        warn!(metric = %failure.metric, error = %failure.error, "시계열 로드 실패");
        eprintln!("⚠ {} 로드 실패: {}", failure.metric, failure.error);
    }
}

fn format_scatter_table(points: &[ScatterPoint], x: Metric, y: Metric) -> String {
    let mut output = format!("{:<10} {:>14} {:>14}\n", "ENTITY", x.as_str(), y.as_str());
    output.push_str(&"-".repeat(40));
    output.push('\n');

    for point in points {
        output.push_str(&format!(
            "{:<10} {:>14} {:>14}\n",
            point.entity,
            format_value(point.x),
            format_value(point.y)
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {} entities", points.len()));
    output
}

fn format_scatter_csv(points: &[ScatterPoint], x: Metric, y: Metric) -> String {
    let mut output = format!("entity,{},{}\n", x, y);
    for point in points {
        output.push_str(&format!(
            "{},{},{}\n",
            escape_csv(&point.entity),
            point.x,
            point.y
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_csv() {
        let points = vec![ScatterPoint {
            entity: "AAPL".to_string(),
            x: 0.25,
            y: 0.001,
        }];
        assert_eq!(
            format_scatter_csv(&points, Metric::Volatility, Metric::Return),
            "entity,volatility,returns\nAAPL,0.25,0.001\n"
        );
    }

    #[test]
    fn test_scatter_table_header() {
        let out = format_scatter_table(&[], Metric::Volatility, Metric::Return);
        assert!(out.starts_with("ENTITY"));
        assert!(out.contains("volatility") && out.contains("returns"));
        assert!(out.ends_with("Total: 0 entities"));
    }
}
