//! 시계열 통계 공통 로직.
//!
//! 정규화, 산점도 집계, 합성 데이터의 상관/위험 지표가 공유하는
//! 순수 함수 모음입니다. 모든 함수는 유한하지 않은 값(NaN, ±∞)을 무시합니다.

/// 연간 거래일 수 (연율화 계산에 사용)
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// 유한한 값만 남깁니다.
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// 산술 평균. 값이 없으면 `None`.
pub fn mean(values: &[f64]) -> Option<f64> {
    let finite = finite_values(values);
    if finite.is_empty() {
        return None;
    }
    Some(finite.iter().sum::<f64>() / finite.len() as f64)
}

/// 모표준편차: √(Σ(x-μ)² / n).
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let finite = finite_values(values);
    let mu = mean(&finite)?;
    let n = finite.len() as f64;
    let variance = finite.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// 표본표준편차: √(Σ(x-μ)² / (n-1)). 값이 2개 미만이면 `None`.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let finite = finite_values(values);
    if finite.len() < 2 {
        return None;
    }
    let mu = mean(&finite)?;
    let n = finite.len() as f64;
    let variance = finite.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Pearson 상관계수.
///
/// 두 시계열 길이가 다르거나 2개 미만이면 `None`,
/// 어느 한쪽의 변동이 없으면 `None`.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// 가격 시계열을 단순 수익률로 변환합니다 (길이: n - 1).
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect()
}

/// 가격 시계열을 로그 수익률로 변환합니다 (길이: n - 1).
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| {
            if w[0] <= 0.0 || w[1] <= 0.0 {
                0.0
            } else {
                (w[1] / w[0]).ln()
            }
        })
        .collect()
}

/// 최대 낙폭 (음수 비율, 예: -0.15 = 15% 하락).
pub fn max_drawdown(prices: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for &p in prices.iter().filter(|p| p.is_finite()) {
        if p > peak {
            peak = p;
        }
        if peak > 0.0 {
            worst = worst.min((p - peak) / peak);
        }
    }
    worst
}

/// 연율화 변동성: 표본표준편차 × √(연간 기간 수).
pub fn annualized_volatility(returns: &[f64], periods_per_year: u32) -> Option<f64> {
    sample_std_dev(returns).map(|sd| sd * (periods_per_year as f64).sqrt())
}

/// 연율화 수익률 (복리).
pub fn annualized_return(returns: &[f64], periods_per_year: u32) -> Option<f64> {
    let finite = finite_values(returns);
    if finite.is_empty() {
        return None;
    }
    let growth: f64 = finite.iter().map(|r| 1.0 + r).product();
    if growth <= 0.0 {
        return Some(-1.0);
    }
    Some(growth.powf(periods_per_year as f64 / finite.len() as f64) - 1.0)
}

/// 샤프 비율.
///
/// Sharpe = (평균 수익률 - 기간 무위험 이자율) / 표본표준편차 × √(연간 기간 수)
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: u32) -> Option<f64> {
    let mu = mean(returns)?;
    let sd = sample_std_dev(returns)?;
    if sd == 0.0 {
        return None;
    }
    let periodic_rf = risk_free_rate / periods_per_year as f64;
    Some((mu - periodic_rf) / sd * (periods_per_year as f64).sqrt())
}

/// 베타: Cov(asset, benchmark) / Var(benchmark).
pub fn beta(asset: &[f64], benchmark: &[f64]) -> Option<f64> {
    if asset.len() != benchmark.len() || asset.len() < 2 {
        return None;
    }
    let n = asset.len() as f64;
    let mean_a = asset.iter().sum::<f64>() / n;
    let mean_b = benchmark.iter().sum::<f64>() / n;

    let cov = asset
        .iter()
        .zip(benchmark)
        .map(|(a, b)| (a - mean_a) * (b - mean_b))
        .sum::<f64>();
    let var_b = benchmark.iter().map(|b| (b - mean_b).powi(2)).sum::<f64>();

    if var_b == 0.0 {
        return None;
    }
    Some(cov / var_b)
}

/// 역사적 VaR (양수 손실 비율).
///
/// 수익률 분포의 `(1 - confidence)` 분위수를 손실로 표현합니다.
/// `horizon_days`가 1보다 크면 √h 규칙으로 확장합니다.
pub fn historical_var(returns: &[f64], confidence: f64, horizon_days: u32) -> Option<f64> {
    let mut sorted = finite_values(returns);
    if sorted.is_empty() || !(0.0..1.0).contains(&confidence) {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let idx = (((1.0 - confidence) * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    let one_day = (-sorted[idx]).max(0.0);
    Some(one_day * (horizon_days.max(1) as f64).sqrt())
}
