//! Data core of the technical-opinion review dashboard.
//!
//! The survey export is loaded once per upload, annotated with process
//! codes and calendar buckets, and then filtered and aggregated for each
//! view. Nothing here renders charts; views consume the returned tables.

pub mod buckets;
pub mod config;
pub mod error;
pub mod filter;
pub mod kind;
pub mod loader;
pub mod options;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod reports;
pub mod turnaround;
pub mod types;
pub mod util;
pub mod weeks;

pub use config::ColumnConfig;
pub use error::{DashboardError, Result};
pub use filter::{apply_filters, Choice, FilterConfig, PeriodSource, Selection};
pub use pipeline::{prepare, Dataset, Session};
pub use types::{ProcessType, Record, TimeBucket, TimestampColumn};
