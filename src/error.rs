use std::io;

/// Errors raised by the dashboard core.
///
/// Only structurally invalid input ends up here. Bad rows are defaulted or
/// dropped by the loader and reported through `LoadReport::warnings`, and an
/// empty filtered subset is simply an empty `Vec`.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not decode input as UTF-8 or Latin-1")]
    Encoding,

    #[error("column configuration error: {0}")]
    Config(String),

    #[error("dataset is empty after load")]
    EmptyDataset,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
