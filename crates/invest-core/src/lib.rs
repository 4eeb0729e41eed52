//! # Invest Core
//!
//! 투자 분석 대시보드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 대시보드 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시계열 및 병합 테이블 타입
//! - 엔티티(포트폴리오/종목) 선택 상태
//! - 공통 통계 계산
//! - 대시보드 설정 및 저장소 어댑터
//! - 애플리케이션 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod settings;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use settings::*;
pub use types::*;
