//! Writers for accepted solutions. All of them are collaborators of the
//! harness: a failure is reported back and logged, the solution stands.

mod heatmap;
mod summary;
mod tabular;
mod vtk;

pub use heatmap::*;
pub use summary::*;
pub use tabular::*;
pub use vtk::*;

use crate::error::ExportError;
use crate::harness::FlowSolution;
use std::path::Path;

pub trait Exporter {
    fn name(&self) -> &'static str;

    fn export(&self, solution: &FlowSolution) -> Result<(), ExportError>;
}

/// Create `path` and its parents if missing.
pub fn ensure_dir_exists(path: &Path) -> Result<(), ExportError> {
    if path.is_dir() {
        return Ok(());
    }
    tracing::debug!(?path, "creating output directory");
    std::fs::create_dir_all(path).map_err(|e| ExportError::io(path, e))
}
