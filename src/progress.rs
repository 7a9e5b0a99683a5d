//! Observer trait for batch events.
//!
//! The pipeline itself prints nothing; the binary implements
//! [`BatchProgress`] to render status lines, and tests can record events.

use crate::dispatcher::{FileRecord, Outcome};
use crate::pipeline::BatchReport;

/// Called by [`crate::pipeline::run`] as it works through the input directory.
///
/// All methods default to no-ops so implementations only override what they
/// need.
pub trait BatchProgress {
    /// Called once after scanning, with the number of files that will be processed.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a `.docx` or `.pdf` file is dispatched.
    fn on_file_start(&self, file: &FileRecord) {
        let _ = file;
    }

    /// Called for every file in the input directory, skipped ones included.
    fn on_file_done(&self, file: &FileRecord, outcome: &Outcome) {
        let _ = (file, outcome);
    }

    /// Called once at the end, also for an empty batch.
    fn on_batch_complete(&self, report: &BatchReport) {
        let _ = report;
    }
}

/// Ignores every event.
pub struct NoProgress;

impl BatchProgress for NoProgress {}
