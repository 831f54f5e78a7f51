use std::path::PathBuf;

use tracing::info;

use crate::artifact::{file_name, write_artifact, ExportArtifact, ExportFormat};
use crate::cli::{context, load_report};
use crate::engine::ReportKind;
use crate::error::Result;
use crate::export;
use crate::settings::{expand_home, load_settings};

/// Where the artifact goes: `--output` as given, a default file name inside
/// `--output` when it is a directory, or the configured export directory.
fn target_path(output: Option<String>, default_dir: PathBuf, name: String) -> PathBuf {
    match output {
        Some(out) => {
            let path = PathBuf::from(expand_home(&out));
            if path.is_dir() {
                path.join(name)
            } else {
                path
            }
        }
        None => default_dir.join(name),
    }
}

pub fn run(
    kind: ReportKind,
    input: &str,
    format: ExportFormat,
    output: Option<String>,
    period: Option<String>,
) -> Result<ExportArtifact> {
    let settings = load_settings();
    let ctx = context(&settings, period);
    let report = load_report(kind, input, &ctx)?;
    let bytes = export::render(&report, format)?;
    info!(kind = %kind, format = %format, bytes = bytes.len(), "report rendered");

    let name = file_name(&kind.file_prefix(), ctx.generated_at.date(), format);
    let path = target_path(output, settings.export_dir(), name);
    let artifact = write_artifact(path, format, &bytes)?;
    println!("Wrote {} ({})", artifact.path.display(), artifact.mime());
    Ok(artifact)
}
