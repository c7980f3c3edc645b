//! Report generation port trait.

use crate::domain::comparison::ComparisonResult;
use crate::domain::error::AavcError;

/// Port for rendering comparison reports.
pub trait ReportPort {
    fn render(&self, result: &ComparisonResult) -> String;

    /// Write the rendered report to `output_path`.
    fn write(&self, result: &ComparisonResult, output_path: &str) -> Result<(), AavcError> {
        std::fs::write(output_path, self.render(result))?;
        Ok(())
    }
}
