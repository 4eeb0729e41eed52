//! 시계열 타입 정의.
//!
//! - [`TimePoint`]: 한 엔티티, 한 지표의 하루치 관측값
//! - [`NamedSeries`]: 식별 키가 붙은 관측값 시퀀스 (생성 후 불변)
//! - [`SeriesKey`]: 엔티티 코드 + 지표 + 정규화 방식

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시계열 지표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// 가격
    #[serde(rename = "prices", alias = "price")]
    Price,
    /// 수익률
    #[serde(rename = "returns", alias = "return")]
    Return,
    /// 실현 변동성
    #[serde(alias = "realised-volatility")]
    Volatility,
}

impl Metric {
    /// 모든 지표 (표시 순서).
    pub const ALL: [Metric; 3] = [Metric::Price, Metric::Return, Metric::Volatility];

    /// 컬럼 이름 등에 쓰이는 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Price => "prices",
            Metric::Return => "returns",
            Metric::Volatility => "volatility",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" | "prices" => Ok(Metric::Price),
            "return" | "returns" => Ok(Metric::Return),
            "volatility" | "vol" | "realised-volatility" | "realized-volatility" => {
                Ok(Metric::Volatility)
            }
            _ => Err(format!(
                "Unknown metric: {}. Supported: prices, returns, volatility",
                s
            )),
        }
    }
}

/// 시계열 정규화 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// 원본 값
    #[default]
    None,
    /// 첫 값을 100으로 재조정
    Index,
    /// 평균 0, 표준편차 1로 표준화
    ZScore,
}

impl NormalizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizeMode::None => "none",
            NormalizeMode::Index => "index",
            NormalizeMode::ZScore => "zscore",
        }
    }
}

impl fmt::Display for NormalizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "raw" => Ok(NormalizeMode::None),
            "index" | "base100" => Ok(NormalizeMode::Index),
            "zscore" | "z-score" | "z" => Ok(NormalizeMode::ZScore),
            _ => Err(format!(
                "Unknown normalization: {}. Supported: none, index, zscore",
                s
            )),
        }
    }
}

/// 시계열 식별 키.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesKey {
    /// 포트폴리오 또는 종목 코드
    pub entity_code: String,
    /// 지표
    pub metric: Metric,
    /// 정규화 방식
    pub normalize: NormalizeMode,
}

impl SeriesKey {
    pub fn new(entity_code: impl Into<String>, metric: Metric) -> Self {
        Self {
            entity_code: entity_code.into(),
            metric,
            normalize: NormalizeMode::None,
        }
    }

    pub fn with_normalize(mut self, normalize: NormalizeMode) -> Self {
        self.normalize = normalize;
        self
    }

    /// 지표를 포함한 컬럼 이름 (예: `prices_AAPL`).
    pub fn metric_column(&self) -> String {
        format!("{}_{}", self.metric, self.entity_code)
    }

    /// 지표와 정규화 방식을 모두 포함한 컬럼 이름 (예: `prices_AAPL_index`).
    pub fn full_column(&self) -> String {
        format!("{}_{}_{}", self.metric, self.entity_code, self.normalize)
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_column())
    }
}

/// 하나의 관측값.
///
/// `date`가 없거나 해석할 수 없는 포인트는 병합 시 건너뜁니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// ISO-8601 달력 날짜
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// 관측값
    pub value: f64,
}

impl TimePoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: Some(date.into()),
            value,
        }
    }

    /// 날짜가 없는 포인트 (데이터 품질 공백).
    pub fn undated(value: f64) -> Self {
        Self { date: None, value }
    }
}

/// 식별 키가 붙은 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub key: SeriesKey,
    pub points: Vec<TimePoint>,
}

impl NamedSeries {
    pub fn new(key: SeriesKey, points: Vec<TimePoint>) -> Self {
        Self { key, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 값만 추출합니다.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}
