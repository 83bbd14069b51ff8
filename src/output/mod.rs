//! Report rendering and persistence

pub mod formatter;
pub mod report;

pub use formatter::{report_path, save_report_to_file, OutputFormatter, ReportGenerator};
pub use report::{ReportMetadata, ScoreReport};
