/// Data layer: core types, loading, filtering and drill-down aggregation.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (memoized, loaded once)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, entity → group index
///   └──────────┘
///        │   + Selection (All | Entity)
///        ▼
///   ┌──────────┐
///   │  filter   │  period slice, then entity filter
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, geo / comparison / trend series, table rows
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod views;
