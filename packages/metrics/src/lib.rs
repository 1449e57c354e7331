#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory metrics lookup and global trend aggregation.
//!
//! [`MetricsIndex`] is built once from the flat record list and answers
//! `(year, region)` lookups in constant time. The [`aggregate`] module
//! reduces the same records into one [`GlobalSeriesPoint`] per year for the
//! trend chart.
//!
//! [`GlobalSeriesPoint`]: vaxmap_metrics_models::GlobalSeriesPoint

pub mod aggregate;
pub mod index;

pub use aggregate::{aggregate, aggregate_all};
pub use index::MetricsIndex;
