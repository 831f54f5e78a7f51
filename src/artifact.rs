use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Result, TallyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Html,
    #[cfg(feature = "pdf")]
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Html => "html",
            #[cfg(feature = "pdf")]
            Self::Pdf => "pdf",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Html => "text/html",
            #[cfg(feature = "pdf")]
            Self::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A file written by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub format: ExportFormat,
}

impl ExportArtifact {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// `{prefix}-{YYYY-MM-DD}.{ext}`
pub fn file_name(prefix: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!("{prefix}-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Write `bytes` to `path` all-or-nothing: the content lands in a temporary
/// file beside the target and is renamed into place once fully written.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;
    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| TallyError::Io(e.error))?;
    Ok(())
}

pub fn write_artifact(path: PathBuf, format: ExportFormat, bytes: &[u8]) -> Result<ExportArtifact> {
    write_atomic(&path, bytes)?;
    info!(path = %path.display(), mime = format.mime(), bytes = bytes.len(), "artifact written");
    Ok(ExportArtifact { path, format })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(
            file_name("inventory-report", date, ExportFormat::Csv),
            "inventory-report-2025-03-05.csv"
        );
        assert_eq!(
            file_name("top-sales-reps-report", date, ExportFormat::Html),
            "top-sales-reps-report-2025-03-05.html"
        );
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ExportFormat::Csv.mime(), "text/csv");
        assert_eq!(ExportFormat::Html.mime(), "text/html");
        #[cfg(feature = "pdf")]
        assert_eq!(ExportFormat::Pdf.mime(), "application/pdf");
    }

    #[test]
    fn test_write_atomic_creates_dirs_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let path = blocker.join("out.csv");
        assert!(write_atomic(&path, b"data").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_artifact_reports_path_and_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales-report-2025-03-05.html");
        let artifact = write_artifact(path.clone(), ExportFormat::Html, b"<html></html>").unwrap();
        assert_eq!(artifact.path, path);
        assert_eq!(artifact.mime(), "text/html");
    }
}
