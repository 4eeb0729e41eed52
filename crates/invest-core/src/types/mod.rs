//! 공통 타입 정의.

pub mod date;
pub mod entity;
pub mod series;
pub mod table;

pub use date::{format_date, parse_date_key};
pub use entity::{normalize_code, EntityKind, Portfolio, Security};
pub use series::{Metric, NamedSeries, NormalizeMode, SeriesKey, TimePoint};
pub use table::{escape_csv, MergedRow, MergedTable};
