//! Serializers that turn a built [`Report`](crate::report::Report) into bytes.
//!
//! Every format walks the same section list, so a figure that appears in the
//! terminal view appears with the same rounding in the spreadsheet, the
//! markup document and the PDF.

pub mod delimited;
pub mod markup;
#[cfg(feature = "pdf")]
pub mod pdf;

use crate::artifact::ExportFormat;
use crate::error::Result;
use crate::report::Report;

pub use delimited::to_delimited_text;
pub use markup::to_markup_document;

/// Render `report` in the requested format.
pub fn render(report: &Report, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => Ok(to_delimited_text(report)?.into_bytes()),
        ExportFormat::Html => Ok(to_markup_document(report).into_bytes()),
        #[cfg(feature = "pdf")]
        ExportFormat::Pdf => pdf::render(report),
    }
}
