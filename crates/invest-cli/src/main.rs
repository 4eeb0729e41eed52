//! 투자 분석 대시보드 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 두 종목의 가격 차트 (합성 데이터)
//! invest chart -s AAPL -s MSFT --test-data
//!
//! # 가격과 변동성을 함께, 첫 값 100 기준으로
//! invest chart -p PF001 -s NVDA -m prices -m volatility --normalize index
//!
//! # 수익률 비교를 CSV로 저장
//! invest compare -s AAPL -s GOOGL -m returns -f csv -o returns.csv
//!
//! # 변동성 대비 수익률 산점도
//! invest scatter -s AAPL -s TSLA -s JPM --x volatility --y returns
//!
//! # 상관행렬, 성과 지표, VaR
//! invest correlations -s AAPL -s MSFT -s V --window 120
//! invest metrics -p PF001 -p PF002 -f json
//! invest var -s AAPL --confidence 0.99
//!
//! # 환경설정
//! invest settings show
//! invest settings set use_test_data false
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use invest_cli::commands::analytics::{run_correlations, run_metrics, run_var};
use invest_cli::commands::catalog::run_catalog;
use invest_cli::commands::context::{CommandContext, SelectionConfig, SourceOverride};
use invest_cli::commands::output::{emit, OutputFormat};
use invest_cli::commands::series::{
    run_chart, run_compare, run_scatter, ChartConfig, CompareConfig, ScatterConfig,
};
use invest_cli::commands::settings;
use invest_core::{init_logging, AppConfig, LogConfig, Metric, NormalizeMode};
use invest_data::{CorrelationParams, EntityCodes, MetricsParams, VarParams};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "invest")]
#[command(about = "Investment analytics dashboard CLI - 포트폴리오/종목 시계열 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML)
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// 분석 명령 공통 인자.
#[derive(Args, Debug, Clone)]
struct SelectionArgs {
    /// 포트폴리오 코드 (여러 번 지정 가능, 예: -p PF001 -p PF002)
    #[arg(short, long = "portfolio")]
    portfolio: Vec<String>,

    /// 종목 코드 (여러 번 지정 가능, 예: -s AAPL -s MSFT)
    #[arg(short, long = "security")]
    security: Vec<String>,

    /// 환경설정과 무관하게 합성 데이터 사용
    #[arg(long, conflicts_with = "remote")]
    test_data: bool,

    /// 환경설정과 무관하게 원격 API 사용
    #[arg(long)]
    remote: bool,

    /// 출력 형식 (table, csv, json)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// 출력 파일 경로 (지정하지 않으면 stdout)
    #[arg(short, long)]
    output: Option<String>,
}

impl SelectionArgs {
    fn into_config(self) -> Result<SelectionConfig> {
        Ok(SelectionConfig {
            portfolios: self.portfolio,
            securities: self.security,
            source: SourceOverride::from_flags(self.test_data, self.remote),
            format: OutputFormat::parse(&self.format)?,
            output: self.output,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 활성화한 지표를 하나의 날짜별 테이블로 병합
    Chart {
        #[command(flatten)]
        selection: SelectionArgs,

        /// 지표 (prices, returns, volatility; 여러 번 지정 가능, 기본: prices)
        #[arg(short, long = "metric")]
        metric: Vec<String>,

        /// 정규화 방식 (none, index, zscore)
        #[arg(short, long, default_value = "none")]
        normalize: String,
    },

    /// 한 지표에 대해 선택된 엔티티 비교
    Compare {
        #[command(flatten)]
        selection: SelectionArgs,

        /// 지표 (prices, returns, volatility)
        #[arg(short, long, default_value = "prices")]
        metric: String,

        /// 정규화 방식 (none, index, zscore)
        #[arg(short, long, default_value = "none")]
        normalize: String,
    },

    /// 두 지표의 엔티티별 평균 산점도
    Scatter {
        #[command(flatten)]
        selection: SelectionArgs,

        /// X축 지표
        #[arg(long, default_value = "volatility")]
        x: String,

        /// Y축 지표
        #[arg(long, default_value = "returns")]
        y: String,
    },

    /// 수익률 상관행렬
    Correlations {
        #[command(flatten)]
        selection: SelectionArgs,

        /// 상관계수 계산 구간 (일)
        #[arg(long, default_value = "252")]
        window: u32,

        /// 두 번째 시계열 시차 (일)
        #[arg(long, default_value = "0")]
        lag: i32,

        /// 로그 수익률 사용
        #[arg(long)]
        log_returns: bool,
    },

    /// 성과 지표 (샤프, 최대 낙폭, 변동성, 베타, 알파)
    Metrics {
        #[command(flatten)]
        selection: SelectionArgs,

        /// 계산 구간 (일)
        #[arg(long, default_value = "252")]
        window: u32,

        /// 무위험 수익률 (연율)
        #[arg(long, default_value = "0.02")]
        risk_free_rate: f64,
    },

    /// Value at Risk (1일, 5일, 10일)
    Var {
        #[command(flatten)]
        selection: SelectionArgs,

        /// 신뢰수준 (0~1)
        #[arg(long, default_value = "0.95")]
        confidence: f64,

        /// 계산 구간 (일)
        #[arg(long, default_value = "252")]
        window: u32,

        /// 계산 방식
        #[arg(long, default_value = "historical")]
        method: String,
    },

    /// 테스트 포트폴리오/종목 목록
    Catalog {
        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 대시보드 환경설정 관리
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// 현재 설정 보기
    Show {
        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// 설정 항목 변경 (예: set use_test_data false)
    Set { key: String, value: String },
    /// 기본값으로 초기화
    Reset,
}

fn parse_metric(s: &str) -> Result<Metric> {
    s.parse::<Metric>().map_err(anyhow::Error::msg)
}

fn parse_normalize(s: &str) -> Result<NormalizeMode> {
    s.parse::<NormalizeMode>().map_err(anyhow::Error::msg)
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env는 선택 사항
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    // 로깅 초기화
    if let Err(e) = init_logging(LogConfig::from_settings(&config.logging)) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut ctx = CommandContext::new(config);

    let result = match cli.command {
        Commands::Chart {
            selection,
            metric,
            normalize,
        } => {
            let metrics = metric
                .iter()
                .map(|m| parse_metric(m))
                .collect::<Result<Vec<_>>>()?;
            let config = ChartConfig {
                selection: selection.into_config()?,
                metrics,
                normalize: parse_normalize(&normalize)?,
            };
            run_chart(&ctx, config)
                .await
                .map(|rows| info!("✅ Chart loaded: {} rows", rows))
        }

        Commands::Compare {
            selection,
            metric,
            normalize,
        } => {
            let config = CompareConfig {
                selection: selection.into_config()?,
                metric: parse_metric(&metric)?,
                normalize: parse_normalize(&normalize)?,
            };
            run_compare(&ctx, config)
                .await
                .map(|rows| info!("✅ Comparison loaded: {} rows", rows))
        }

        Commands::Scatter { selection, x, y } => {
            let config = ScatterConfig {
                selection: selection.into_config()?,
                x: parse_metric(&x)?,
                y: parse_metric(&y)?,
            };
            run_scatter(&ctx, config)
                .await
                .map(|points| info!("✅ Scatter loaded: {} points", points))
        }

        Commands::Correlations {
            selection,
            window,
            lag,
            log_returns,
        } => {
            let params = CorrelationParams {
                window,
                lag,
                log_returns,
                ..CorrelationParams::new(EntityCodes::default())
            };
            run_correlations(&ctx, selection.into_config()?, params)
                .await
                .map(|n| info!("✅ Correlation matrix: {}x{}", n, n))
        }

        Commands::Metrics {
            selection,
            window,
            risk_free_rate,
        } => {
            let params = MetricsParams {
                metric_win_size: window,
                risk_free_rate,
                ..MetricsParams::new(EntityCodes::default())
            };
            run_metrics(&ctx, selection.into_config()?, params)
                .await
                .map(|n| info!("✅ Metrics loaded: {} entities", n))
        }

        Commands::Var {
            selection,
            confidence,
            window,
            method,
        } => {
            if !(confidence > 0.0 && confidence < 1.0) {
                anyhow::bail!("Confidence level must be between 0 and 1: {}", confidence);
            }
            let params = VarParams {
                confidence_level: confidence,
                var_win_size: window,
                method,
                ..VarParams::new(EntityCodes::default())
            };
            run_var(&ctx, selection.into_config()?, params)
                .await
                .map(|n| info!("✅ VaR loaded: {} entities", n))
        }

        Commands::Catalog { format, output } => {
            run_catalog(OutputFormat::parse(&format)?, output.as_deref())
                .map(|n| info!("✅ Listed {} entities", n))
        }

        Commands::Settings { action } => {
            let rendered = match action {
                SettingsAction::Show { format } => {
                    settings::show(&ctx.settings, OutputFormat::parse(&format)?)
                }
                SettingsAction::Set { key, value } => {
                    settings::set(&mut ctx.settings, &key, &value)
                }
                SettingsAction::Reset => settings::reset(&mut ctx.settings),
            };
            rendered.and_then(|content| emit(&content, None))
        }
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}
