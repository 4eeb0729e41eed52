//! CLI 명령어 구현 모듈.

pub mod analytics;
pub mod catalog;
pub mod context;
pub mod output;
pub mod series;
pub mod settings;

// 각 서브모듈 직접 사용 권장 (ambiguous re-export 방지)
