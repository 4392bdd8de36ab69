use crate::error::ExportError;
use crate::export::ensure_dir_exists;
use crate::harness::SweepSummary;
use std::path::Path;

/// Write the sweep summary as pretty printed JSON.
pub fn write_summary(
    path: &Path,
    summary: &SweepSummary,
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    let file =
        std::fs::File::create(path).map_err(|e| ExportError::io(path, e))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), summary)?;
    tracing::info!(?path, "wrote summary");
    Ok(())
}
