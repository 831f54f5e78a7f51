use thiserror::Error;

use crate::engine::ReportKind;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Nothing to export: no {0} report data")]
    NothingToExport(ReportKind),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
