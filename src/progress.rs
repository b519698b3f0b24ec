//! Progress-callback trait for per-class and per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the orchestrator walks the classes. The library never prints;
//! the CLI turns these events into warnings and progress bars.
//!
//! # Example
//!
//! ```rust
//! use idu_images::{ConversionConfig, ConversionProgressCallback, DocumentClass};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl ConversionProgressCallback for Counter {
//!     fn on_file_complete(&self, _index: usize, _total: usize, _source: &Path, _outputs: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::config::DocumentClass;
use crate::error::FileError;
use crate::output::{ClassStatus, ConversionReport};
use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as it processes each class and file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive strictly in order from one thread.
pub trait ConversionProgressCallback: Send + Sync {
    /// A class folder was skipped (`MissingFolder` or `Empty`).
    fn on_class_skipped(&self, class: DocumentClass, input_dir: &Path, status: ClassStatus) {
        let _ = (class, input_dir, status);
    }

    /// Called once before the first file of a class.
    ///
    /// # Arguments
    /// * `total_files` — source files (not pages) that will be attempted
    fn on_class_start(&self, class: DocumentClass, input_dir: &Path, total_files: usize) {
        let _ = (class, input_dir, total_files);
    }

    /// Called just before a file is opened. `index` is 1-based.
    fn on_file_start(&self, index: usize, total: usize, source: &Path) {
        let _ = (index, total, source);
    }

    /// Called when a file converted successfully.
    ///
    /// # Arguments
    /// * `outputs` — PNGs written (page count for PDFs, 1 for images)
    fn on_file_complete(&self, index: usize, total: usize, source: &Path, outputs: usize) {
        let _ = (index, total, source, outputs);
    }

    /// Called when a file failed.
    fn on_file_error(&self, index: usize, total: usize, error: &FileError) {
        let _ = (index, total, error);
    }

    /// Called after the last file of a class.
    fn on_class_complete(&self, class: DocumentClass, converted: usize, failed: usize) {
        let _ = (class, converted, failed);
    }

    /// Called once after every class has been visited.
    fn on_run_complete(&self, report: &ConversionReport) {
        let _ = report;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_class_skipped(DocumentClass::Form, Path::new("raw/form"), ClassStatus::Empty);
        cb.on_class_start(DocumentClass::Invoice, Path::new("raw/invoice"), 2);
        cb.on_file_start(1, 2, Path::new("a.pdf"));
        cb.on_file_complete(1, 2, Path::new("a.pdf"), 3);
        cb.on_class_complete(DocumentClass::Invoice, 2, 0);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_file_start(1, 10, Path::new("x.png"));
    }
}
