//! 도메인 로직.
//!
//! - [`selection`]: 사용자 선택 상태 (엔티티, 시계열 설정, 스냅샷)
//! - [`statistics`]: 공통 통계 계산

pub mod selection;
pub mod statistics;

pub use selection::{
    Axis, AxisPolicy, Selection, SelectionSnapshot, SelectionState, SeriesConfig,
};
pub use statistics::TRADING_DAYS_PER_YEAR;
