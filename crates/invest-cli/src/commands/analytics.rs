//! 분석 뷰 명령 (correlations, metrics, var).

use anyhow::{Context, Result};
use invest_analytics::{CorrelationMatrix, EntityMetrics, VarSummary};
use invest_core::AxisPolicy;
use invest_data::{CorrelationParams, MetricsParams, VarParams};
use tracing::{info, warn};

use super::context::{applied, CommandContext, SelectionConfig};
use super::output::{emit, escape_csv, format_json, format_optional, OutputFormat};

/// 상관행렬을 출력합니다.
pub async fn run_correlations(
    ctx: &CommandContext,
    selection: SelectionConfig,
    params: CorrelationParams,
) -> Result<usize> {
    let loader = ctx.loader(&selection, AxisPolicy::default())?;
    let matrix = loader
        .load_correlations(params)
        .await
        .context("Failed to load correlations")?;
    let matrix = applied(matrix)?;

    let Some(matrix) = matrix else {
        warn!("상관행렬을 해석할 수 없음");
        println!("상관행렬 데이터가 없습니다.");
        return Ok(0);
    };

    let content = match selection.format {
        OutputFormat::Table => format_matrix_table(&matrix),
        OutputFormat::Csv => format_matrix_csv(&matrix),
        OutputFormat::Json => format_json(&matrix)?,
    };
    emit(&content, selection.output.as_deref())?;
    Ok(matrix.len())
}

/// 성과 지표를 출력합니다.
pub async fn run_metrics(
    ctx: &CommandContext,
    selection: SelectionConfig,
    params: MetricsParams,
) -> Result<usize> {
    let loader = ctx.loader(&selection, AxisPolicy::default())?;
    let metrics = loader
        .load_metrics(params)
        .await
        .context("Failed to load performance metrics")?;
    let metrics = applied(metrics)?;
    info!(entities = metrics.len(), "성과 지표 로드 완료");

    let content = match selection.format {
        OutputFormat::Table => format_metrics_table(&metrics),
        OutputFormat::Csv => format_metrics_csv(&metrics),
        OutputFormat::Json => format_json(&metrics)?,
    };
    emit(&content, selection.output.as_deref())?;
    Ok(metrics.len())
}

/// VaR 요약을 출력합니다.
pub async fn run_var(
    ctx: &CommandContext,
    selection: SelectionConfig,
    params: VarParams,
) -> Result<usize> {
    let loader = ctx.loader(&selection, AxisPolicy::default())?;
    let confidence = params.confidence_level;
    let summaries = loader
        .load_var(params)
        .await
        .context("Failed to load value at risk")?;
    let summaries = applied(summaries)?;

    let content = match selection.format {
        OutputFormat::Table => format_var_table(&summaries, confidence),
        OutputFormat::Csv => format_var_csv(&summaries),
        OutputFormat::Json => format_json(&summaries)?,
    };
    emit(&content, selection.output.as_deref())?;
    Ok(summaries.len())
}

fn format_matrix_table(matrix: &CorrelationMatrix) -> String {
    let mut output = format!("{:<10}", "");
    for label in &matrix.labels {
        output.push_str(&format!(" {:>8}", label));
    }
    output.push('\n');

    for (label, row) in matrix.labels.iter().zip(&matrix.matrix) {
        output.push_str(&format!("{:<10}", label));
        for cell in row {
            let text = cell
                .map(|v| format!("{:.3}", v))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(" {:>8}", text));
        }
        output.push('\n');
    }
    output
}

fn format_matrix_csv(matrix: &CorrelationMatrix) -> String {
    let mut output = String::from("code");
    for label in &matrix.labels {
        output.push(',');
        output.push_str(&escape_csv(label));
    }
    output.push('\n');

    for (label, row) in matrix.labels.iter().zip(&matrix.matrix) {
        output.push_str(&escape_csv(label));
        for cell in row {
            output.push(',');
            if let Some(v) = cell {
                output.push_str(&v.to_string());
            }
        }
        output.push('\n');
    }
    output
}

fn format_metrics_table(metrics: &[EntityMetrics]) -> String {
    let mut output = format!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
        "CODE", "SHARPE", "MAX_DD", "VOL", "ANN_RET", "BETA", "ALPHA"
    );
    output.push_str(&"-".repeat(76));
    output.push('\n');

    for m in metrics {
        output.push_str(&format!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            m.code,
            format_optional(m.sharpe_ratio),
            format_optional(m.max_drawdown),
            format_optional(m.volatility),
            format_optional(m.annual_return),
            format_optional(m.beta),
            format_optional(m.alpha)
        ));
    }
    output
}

fn format_metrics_csv(metrics: &[EntityMetrics]) -> String {
    let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    let mut output =
        String::from("code,sharpe_ratio,max_drawdown,volatility,annual_return,beta,alpha\n");
    for m in metrics {
        output.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            escape_csv(&m.code),
            cell(m.sharpe_ratio),
            cell(m.max_drawdown),
            cell(m.volatility),
            cell(m.annual_return),
            cell(m.beta),
            cell(m.alpha)
        ));
    }
    output
}

fn format_var_table(summaries: &[VarSummary], confidence: f64) -> String {
    let mut output = format!(
        "VaR ({:.0}% confidence, as of {})\n",
        confidence * 100.0,
        summaries
            .first()
            .and_then(|s| s.date.as_deref())
            .unwrap_or("-")
    );
    output.push_str(&format!(
        "{:<10} {:>10} {:>10} {:>10}\n",
        "CODE", "1D", "5D", "10D"
    ));
    output.push_str(&"-".repeat(43));
    output.push('\n');

    for s in summaries {
        output.push_str(&format!(
            "{:<10} {:>10} {:>10} {:>10}\n",
            s.code,
            format_optional(s.var_1d),
            format_optional(s.var_5d),
            format_optional(s.var_10d)
        ));
    }
    output
}

fn format_var_csv(summaries: &[VarSummary]) -> String {
    let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    let mut output = String::from("code,date,var_1d,var_5d,var_10d\n");
    for s in summaries {
        output.push_str(&format!(
            "{},{},{},{},{}\n",
            escape_csv(&s.code),
            s.date.as_deref().unwrap_or(""),
            cell(s.var_1d),
            cell(s.var_5d),
            cell(s.var_10d)
        ));
    }
    output
}
