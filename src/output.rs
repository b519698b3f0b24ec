//! Run results: what was written, what was skipped, what failed.

use crate::config::DocumentClass;
use crate::error::{ConvertError, FileError};
use crate::pipeline::discover::SourceKind;
use serde::Serialize;
use std::path::PathBuf;

/// State of one class folder at planning time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    /// Folder exists and holds at least one convertible file.
    Ready,
    /// `raw_root/<class>` does not exist. Skipped with a warning.
    MissingFolder,
    /// Folder exists but holds no convertible file. Skipped with a warning.
    Empty,
}

/// Outcome of one source file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub source: PathBuf,
    pub kind: SourceKind,
    /// Written PNGs; empty when `error` is set.
    pub outputs: Vec<PathBuf>,
    pub error: Option<FileError>,
    pub duration_ms: u64,
}

impl FileResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of one class folder.
#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub class: DocumentClass,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub status: ClassStatus,
    pub files: Vec<FileResult>,
}

impl ClassReport {
    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|f| !f.is_ok()).count()
    }

    pub fn output_count(&self) -> usize {
        self.files.iter().map(|f| f.outputs.len()).sum()
    }
}

/// Outcome of a whole run, in class order.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub out_root: PathBuf,
    pub dpi: u32,
    pub classes: Vec<ClassReport>,
    pub total_duration_ms: u64,
}

impl ConversionReport {
    /// Source files attempted across all classes.
    pub fn total_files(&self) -> usize {
        self.classes.iter().map(|c| c.files.len()).sum()
    }

    /// PNGs written across all classes.
    pub fn total_outputs(&self) -> usize {
        self.classes.iter().map(ClassReport::output_count).sum()
    }

    pub fn failed_files(&self) -> usize {
        self.classes.iter().map(ClassReport::failed_files).sum()
    }

    /// Every per-file failure, in processing order.
    pub fn failures(&self) -> impl Iterator<Item = &FileError> {
        self.classes
            .iter()
            .flat_map(|c| c.files.iter())
            .filter_map(|f| f.error.as_ref())
    }

    /// Classes skipped because their folder was missing or empty.
    pub fn skipped_classes(&self) -> impl Iterator<Item = &ClassReport> {
        self.classes.iter().filter(|c| c.status != ClassStatus::Ready)
    }

    /// Turn any per-file failure into [`ConvertError::PartialFailure`].
    pub fn into_result(self) -> Result<Self, ConvertError> {
        let failed = self.failed_files();
        if failed > 0 {
            return Err(ConvertError::PartialFailure {
                failed,
                total: self.total_files(),
            });
        }
        Ok(self)
    }
}
