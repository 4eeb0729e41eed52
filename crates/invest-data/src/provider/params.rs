//! 분석 API 요청 파라미터.
//!
//! 각 타입의 `Default`는 대시보드가 사용하던 기본값과 같습니다.
//! 빈 코드 목록은 요청 본문에서 생략됩니다.

use invest_core::Selection;
use serde::{Deserialize, Serialize};

/// 요청 대상 엔티티 코드.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCodes {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub portfolio_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_codes: Vec<String>,
}

impl EntityCodes {
    pub fn new(portfolio_codes: Vec<String>, security_codes: Vec<String>) -> Self {
        Self {
            portfolio_codes,
            security_codes,
        }
    }

    pub fn securities<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Vec::new(), codes.into_iter().map(Into::into).collect())
    }

    pub fn portfolios<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(codes.into_iter().map(Into::into).collect(), Vec::new())
    }

    /// 포트폴리오 다음 종목 순서의 전체 코드.
    pub fn all_codes(&self) -> Vec<String> {
        self.portfolio_codes
            .iter()
            .chain(self.security_codes.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio_codes.is_empty() && self.security_codes.is_empty()
    }
}

impl From<&Selection> for EntityCodes {
    fn from(selection: &Selection) -> Self {
        Self::new(selection.portfolios.clone(), selection.securities.clone())
    }
}

/// 가격 조회 파라미터.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceParams {
    #[serde(flatten)]
    pub codes: EntityCodes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intraday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl PriceParams {
    pub fn new(codes: EntityCodes) -> Self {
        Self {
            codes,
            ..Default::default()
        }
    }
}

/// 수익률 조회 파라미터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsParams {
    #[serde(flatten)]
    pub codes: EntityCodes,
    /// 로그 수익률 사용 여부
    pub use_ln_ret: bool,
    /// 수익률 윈도우 크기
    pub win_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_only: Option<bool>,
}

impl Default for ReturnsParams {
    fn default() -> Self {
        Self {
            codes: EntityCodes::default(),
            use_ln_ret: false,
            win_size: 30,
            local_only: None,
        }
    }
}

impl ReturnsParams {
    pub fn new(codes: EntityCodes) -> Self {
        Self {
            codes,
            ..Default::default()
        }
    }
}

/// 실현 변동성 조회 파라미터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityParams {
    #[serde(flatten)]
    pub codes: EntityCodes,
    /// 변동성 모델 (예: `simple`)
    pub rv_model: String,
    /// 변동성 윈도우 크기
    pub rv_win_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_only: Option<bool>,
}

impl Default for VolatilityParams {
    fn default() -> Self {
        Self {
            codes: EntityCodes::default(),
            rv_model: "simple".to_string(),
            rv_win_size: 30,
            local_only: None,
        }
    }
}

impl VolatilityParams {
    pub fn new(codes: EntityCodes) -> Self {
        Self {
            codes,
            ..Default::default()
        }
    }
}

/// 상관관계 조회 파라미터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationParams {
    #[serde(flatten)]
    pub codes: EntityCodes,
    pub use_returns: bool,
    pub log_returns: bool,
    pub ret_win_size: u32,
    /// 상관 모델 (예: `pearson`)
    pub corr_model: String,
    pub window: u32,
    pub lag: i32,
}

impl Default for CorrelationParams {
    fn default() -> Self {
        Self {
            codes: EntityCodes::default(),
            use_returns: true,
            log_returns: false,
            ret_win_size: 30,
            corr_model: "pearson".to_string(),
            window: 252,
            lag: 0,
        }
    }
}

impl CorrelationParams {
    pub fn new(codes: EntityCodes) -> Self {
        Self {
            codes,
            ..Default::default()
        }
    }
}

/// 성과 지표 조회 파라미터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsParams {
    #[serde(flatten)]
    pub codes: EntityCodes,
    pub metric_win_size: u32,
    /// 연간 무위험 이자율
    pub risk_free_rate: f64,
    pub periods_per_year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_only: Option<bool>,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            codes: EntityCodes::default(),
            metric_win_size: 252,
            risk_free_rate: 0.02,
            periods_per_year: 252,
            local_only: None,
        }
    }
}

impl MetricsParams {
    pub fn new(codes: EntityCodes) -> Self {
        Self {
            codes,
            ..Default::default()
        }
    }
}

/// VaR 조회 파라미터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarParams {
    #[serde(flatten)]
    pub codes: EntityCodes,
    pub var_win_size: u32,
    /// 신뢰 수준 (0~1)
    pub confidence_level: f64,
    /// 계산 방식 (예: `historical`)
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_only: Option<bool>,
}

impl Default for VarParams {
    fn default() -> Self {
        Self {
            codes: EntityCodes::default(),
            var_win_size: 252,
            confidence_level: 0.95,
            method: "historical".to_string(),
            local_only: None,
        }
    }
}

impl VarParams {
    pub fn new(codes: EntityCodes) -> Self {
        Self {
            codes,
            ..Default::default()
        }
    }
}
