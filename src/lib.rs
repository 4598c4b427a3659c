//! Country drill-down aggregation for demographic dashboards.
//!
//! Given a [`Dataset`] and a [`Selection`], the functions in
//! [`data::aggregate`] derive the views a dashboard renders: KPI tiles, a
//! map series, a bar-chart comparison, a table slice and per-country trend
//! lines. [`Session`] ties them to an explicit view state.

pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod render;
pub mod session;

pub use data::aggregate::REFERENCE_PERIOD;
pub use data::model::{Dataset, Record, Selection};
pub use error::{AggregateError, DatasetError};
pub use session::{Dashboard, Panel, Session};
