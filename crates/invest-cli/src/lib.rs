//! 투자 분석 대시보드 CLI.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 다중 시계열 차트, 비교, 산점도 출력
//! - 상관행렬, 성과 지표, VaR 조회
//! - 테스트 엔티티 카탈로그
//! - 대시보드 환경설정 관리

pub mod commands;
