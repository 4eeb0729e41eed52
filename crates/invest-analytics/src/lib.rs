//! 투자 분석 대시보드 집계 계층.
//!
//! 데이터 소스 응답을 엔티티별 시계열로 풀고, 정규화하고, 날짜 하나당
//! 한 행인 테이블로 병합합니다. [`DashboardLoader`]는 선택 상태를 기준으로
//! 필요한 지표를 동시에 요청하고 최신 선택에 대한 결과만 게시합니다.
//!
//! # 모듈 구성
//!
//! - [`payload`]: 응답 레코드 해석
//! - [`aggregator`]: 다중 시계열 병합
//! - [`normalize`]: none / index / zscore 정규화
//! - [`scatter`]: 엔티티별 평균 산점도
//! - [`correlation`]: 상관행렬
//! - [`views`]: 성과 지표, VaR 요약
//! - [`dashboard`]: 대시보드 로더

pub mod aggregator;
pub mod correlation;
pub mod dashboard;
pub mod normalize;
pub mod payload;
pub mod scatter;
pub mod views;

pub use aggregator::{merge_raw_series, merge_series, Aggregator, AggregatorOptions, ColumnNaming};
pub use correlation::CorrelationMatrix;
pub use dashboard::{DashboardLoader, DashboardView, LoadOutcome, SeriesFailure, ViewKind};
pub use normalize::{normalize, normalize_series, normalize_table};
pub use payload::{records_from_payload, series_from_records, series_from_response, SeriesRecord};
pub use scatter::{combine_for_scatter, ScatterPoint};
pub use views::{metrics_from_payload, var_from_payload, EntityMetrics, VarSummary};
