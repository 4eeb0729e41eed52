//! 합성(테스트) 데이터 소스.
//!
//! 원격 API 없이 대시보드를 사용할 수 있도록 엔티티별 가상 시계열을
//! 생성합니다. 난수는 엔티티 코드와 지표로 시드되므로 같은 설정으로
//! 반복 호출하면 같은 값이 나옵니다.
//!
//! 상관관계, 성과 지표, VaR은 합성 수익률에서 실제로 계산합니다.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use invest_core::domain::statistics;
use invest_core::{format_date, Metric, TimePoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::params::{
    CorrelationParams, EntityCodes, MetricsParams, PriceParams, ReturnsParams, VarParams,
    VolatilityParams,
};
use super::{ApiResponse, DataSource};
use crate::catalog;

/// 기본 생성 기간 (거래일)
pub const DEFAULT_NUM_DAYS: u32 = 252;

/// VaR 보유 기간 (일)
const VAR_HORIZONS: [u32; 3] = [1, 5, 10];

/// 합성 데이터 소스.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    num_days: u32,
    anchor: NaiveDate,
    seed: u64,
    latency: Option<Duration>,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticSource {
    /// 오늘을 기준으로 252일치를 생성하는 소스.
    pub fn new() -> Self {
        Self {
            num_days: DEFAULT_NUM_DAYS,
            anchor: Utc::now().date_naive(),
            seed: 0,
            latency: None,
        }
    }

    pub fn with_num_days(mut self, num_days: u32) -> Self {
        self.num_days = num_days;
        self
    }

    /// 기준일을 고정합니다. 날짜는 기준일 `num_days`일 전부터 시작합니다.
    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// 분석 요청마다 지연을 추가합니다.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    fn rng_for(&self, code: &str, metric: Metric) -> StdRng {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325 ^ self.seed;
        for byte in code.bytes().chain(metric.as_str().bytes()) {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        StdRng::seed_from_u64(hash)
    }

    fn dates(&self) -> Vec<String> {
        let start = self
            .anchor
            .checked_sub_days(Days::new(self.num_days as u64))
            .unwrap_or(self.anchor);
        (0..self.num_days as u64)
            .filter_map(|i| start.checked_add_days(Days::new(i)))
            .map(format_date)
            .collect()
    }

    /// 가격 시계열: 50~150에서 시작하는 약한 상승 편향 랜덤 워크 (최소 1).
    pub fn generate_price_data(&self, code: &str) -> Vec<TimePoint> {
        let mut rng = self.rng_for(code, Metric::Price);
        let mut price: f64 = rng.gen_range(50.0..150.0);

        self.dates()
            .into_iter()
            .map(|date| {
                let change = (rng.gen::<f64>() - 0.48) * price * 0.03;
                price = (price + change).max(1.0);
                TimePoint::new(date, price)
            })
            .collect()
    }

    /// 일간 수익률 시계열: ±3% 균등 분포.
    pub fn generate_returns_data(&self, code: &str) -> Vec<TimePoint> {
        let mut rng = self.rng_for(code, Metric::Return);
        self.dates()
            .into_iter()
            .map(|date| TimePoint::new(date, (rng.gen::<f64>() - 0.5) * 0.06))
            .collect()
    }

    /// 변동성 시계열: 연율 20~50% 기준에 0.8~1.2배 변동 (최소 0.05).
    pub fn generate_volatility_data(&self, code: &str) -> Vec<TimePoint> {
        let mut rng = self.rng_for(code, Metric::Volatility);
        self.dates()
            .into_iter()
            .map(|date| {
                let base = 0.2 + rng.gen::<f64>() * 0.3;
                let vol = (base * (0.8 + rng.gen::<f64>() * 0.4)).max(0.05);
                TimePoint::new(date, vol)
            })
            .collect()
    }

    fn generate(&self, metric: Metric, code: &str) -> Vec<TimePoint> {
        match metric {
            Metric::Price => self.generate_price_data(code),
            Metric::Return => self.generate_returns_data(code),
            Metric::Volatility => self.generate_volatility_data(code),
        }
    }

    /// 여러 엔티티 시계열을 날짜별 레코드 `[{date, CODE: value}]`로 합칩니다.
    fn records(&self, codes: &EntityCodes, metric: Metric, map_value: impl Fn(f64) -> f64) -> Value {
        let dates = self.dates();
        let mut rows: Vec<Map<String, Value>> = dates
            .iter()
            .map(|d| {
                let mut row = Map::new();
                row.insert("date".to_string(), Value::String(d.clone()));
                row
            })
            .collect();

        for code in codes.all_codes() {
            for (row, point) in rows.iter_mut().zip(self.generate(metric, &code)) {
                row.insert(code.clone(), json!(map_value(point.value)));
            }
        }

        Value::Array(rows.into_iter().map(Value::Object).collect())
    }

    /// 최근 `window`개 수익률 (window가 0이면 전체).
    fn windowed_returns(&self, code: &str, window: u32) -> Vec<f64> {
        let values: Vec<f64> = self
            .generate_returns_data(code)
            .into_iter()
            .map(|p| p.value)
            .collect();
        let window = window as usize;
        if window == 0 || window >= values.len() {
            values
        } else {
            values[values.len() - window..].to_vec()
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn correlation_payload(&self, params: &CorrelationParams) -> Value {
        let labels = params.codes.all_codes();
        let series: Vec<Vec<f64>> = labels
            .iter()
            .map(|code| {
                let returns = self.windowed_returns(code, params.window);
                if params.use_returns {
                    if params.log_returns {
                        returns.iter().map(|r| (1.0 + r).ln()).collect()
                    } else {
                        returns
                    }
                } else {
                    cumulative_growth(&returns)
                }
            })
            .collect();

        let lag = params.lag.unsigned_abs() as usize;
        let matrix: Vec<Vec<Value>> = series
            .iter()
            .enumerate()
            .map(|(i, x)| {
                series
                    .iter()
                    .enumerate()
                    .map(|(j, y)| {
                        if i == j {
                            return json!(1.0);
                        }
                        let (xs, ys) = lagged_pair(x, y, lag);
                        statistics::pearson_correlation(xs, ys)
                            .map(|r| json!(r))
                            .unwrap_or(Value::Null)
                    })
                    .collect()
            })
            .collect();

        json!({ "labels": labels, "matrix": matrix })
    }

    fn metrics_payload(&self, params: &MetricsParams) -> Value {
        let codes = params.codes.all_codes();
        let periods = params.periods_per_year;
        let returns: HashMap<String, Vec<f64>> = codes
            .iter()
            .map(|c| (c.clone(), self.windowed_returns(c, params.metric_win_size)))
            .collect();

        // 벤치마크: 선택 엔티티 동일가중 바스켓
        let len = returns.values().map(Vec::len).min().unwrap_or(0);
        let benchmark: Vec<f64> = (0..len)
            .map(|t| returns.values().map(|r| r[t]).sum::<f64>() / returns.len() as f64)
            .collect();
        let bench_annual = statistics::annualized_return(&benchmark, periods);

        let rows: Vec<Value> = codes
            .iter()
            .map(|code| {
                let r = &returns[code];
                let annual_return = statistics::annualized_return(r, periods);
                let beta = statistics::beta(&r[..len], &benchmark);
                let alpha = match (annual_return, beta, bench_annual) {
                    (Some(ar), Some(b), Some(ba)) => Some(
                        ar - (params.risk_free_rate + b * (ba - params.risk_free_rate)),
                    ),
                    _ => None,
                };

                json!({
                    "code": code,
                    "sharpe_ratio": statistics::sharpe_ratio(r, params.risk_free_rate, periods),
                    "max_drawdown": statistics::max_drawdown(&cumulative_growth(r)),
                    "volatility": statistics::annualized_volatility(r, periods),
                    "annual_return": annual_return,
                    "beta": beta,
                    "alpha": alpha,
                })
            })
            .collect();

        Value::Array(rows)
    }

    fn var_payload(&self, params: &VarParams) -> ApiResponse<Value> {
        if !params.method.eq_ignore_ascii_case("historical") {
            return ApiResponse::failure(format!(
                "Unsupported VaR method: {}. Supported: historical",
                params.method
            ));
        }

        let mut row = Map::new();
        if let Some(last) = self.dates().last() {
            row.insert("date".to_string(), Value::String(last.clone()));
        }

        for code in params.codes.all_codes() {
            let returns = self.windowed_returns(&code, params.var_win_size);
            for horizon in VAR_HORIZONS {
                let var = statistics::historical_var(&returns, params.confidence_level, horizon);
                row.insert(
                    format!("{}_{}d", code, horizon),
                    var.map(|v| json!(v)).unwrap_or(Value::Null),
                );
            }
        }

        ApiResponse::ok(Value::Array(vec![Value::Object(row)]))
    }
}

/// 수익률로부터 1에서 시작하는 누적 가치 곡선을 만듭니다.
fn cumulative_growth(returns: &[f64]) -> Vec<f64> {
    let mut value = 1.0;
    std::iter::once(1.0)
        .chain(returns.iter().map(|r| {
            value *= 1.0 + r;
            value
        }))
        .collect()
}

/// `y`를 `lag`만큼 뒤로 밀어 정렬된 쌍을 만듭니다.
fn lagged_pair<'a>(x: &'a [f64], y: &'a [f64], lag: usize) -> (&'a [f64], &'a [f64]) {
    let n = x.len().min(y.len());
    if lag >= n {
        return (&x[..0], &y[..0]);
    }
    (&x[..n - lag], &y[lag..n])
}

#[async_trait]
impl DataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn portfolio(&self, code: &str) -> ApiResponse<Value> {
        match catalog::find_portfolio(code) {
            Some(p) => ApiResponse::ok(json!(p)),
            None => ApiResponse::failure(format!("Portfolio {} not found", code)),
        }
    }

    async fn portfolios(&self, codes: &[String]) -> ApiResponse<Value> {
        let found: Vec<_> = codes
            .iter()
            .filter_map(|c| catalog::find_portfolio(c))
            .collect();
        ApiResponse::ok(json!(found))
    }

    async fn security(&self, code: &str) -> ApiResponse<Value> {
        match catalog::find_security(code) {
            Some(s) => ApiResponse::ok(json!(s)),
            None => ApiResponse::failure(format!("Security {} not found", code)),
        }
    }

    async fn securities(&self, codes: &[String]) -> ApiResponse<Value> {
        let found: Vec<_> = codes
            .iter()
            .filter_map(|c| catalog::find_security(c))
            .collect();
        ApiResponse::ok(json!(found))
    }

    async fn prices(&self, params: &PriceParams) -> ApiResponse<Value> {
        self.simulate_latency().await;
        debug!(codes = ?params.codes.all_codes(), "합성 가격 생성");
        ApiResponse::ok(self.records(&params.codes, Metric::Price, |v| v))
    }

    async fn returns(&self, params: &ReturnsParams) -> ApiResponse<Value> {
        self.simulate_latency().await;
        debug!(codes = ?params.codes.all_codes(), "합성 수익률 생성");
        if params.use_ln_ret {
            ApiResponse::ok(self.records(&params.codes, Metric::Return, |r| (1.0 + r).ln()))
        } else {
            ApiResponse::ok(self.records(&params.codes, Metric::Return, |r| r))
        }
    }

    async fn realised_volatility(&self, params: &VolatilityParams) -> ApiResponse<Value> {
        self.simulate_latency().await;
        debug!(codes = ?params.codes.all_codes(), "합성 변동성 생성");
        ApiResponse::ok(self.records(&params.codes, Metric::Volatility, |v| v))
    }

    async fn correlations(&self, params: &CorrelationParams) -> ApiResponse<Value> {
        self.simulate_latency().await;
        ApiResponse::ok(self.correlation_payload(params))
    }

    async fn metrics(&self, params: &MetricsParams) -> ApiResponse<Value> {
        self.simulate_latency().await;
        ApiResponse::ok(self.metrics_payload(params))
    }

    async fn value_at_risk(&self, params: &VarParams) -> ApiResponse<Value> {
        self.simulate_latency().await;
        self.var_payload(params)
    }
}
