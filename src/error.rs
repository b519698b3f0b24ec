//! Error types for the idu-images library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the run cannot proceed at all (bad
//!   configuration, PDFium unavailable, output root not writable). Returned as
//!   `Err(ConvertError)` from [`crate::convert::convert_dataset`].
//!
//! * [`FileError`] — **Non-fatal**: one source file failed (corrupt PDF,
//!   undecodable image, write error) but the other files are fine. Stored
//!   inside [`crate::output::FileResult`] so callers can inspect partial
//!   success rather than losing the whole batch to one bad input.
//!
//! Which of the two a file failure becomes is decided by
//! [`crate::config::ErrorPolicy`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the idu-images library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF pages cannot be rasterised without PDFium. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create a class output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Policy errors ─────────────────────────────────────────────────────
    /// A file failed while running with [`crate::config::ErrorPolicy::Abort`].
    ///
    /// Files converted before the failure stay on disk.
    #[error("Conversion aborted after {converted} file(s): {source}")]
    Aborted {
        converted: usize,
        #[source]
        source: FileError,
    },

    /// Every file was attempted but at least one failed.
    ///
    /// Returned by [`crate::output::ConversionReport::into_result`] when
    /// the caller wants to treat any file failure as an error.
    #[error("{failed}/{total} files failed during conversion")]
    PartialFailure { failed: usize, total: usize },
}

/// A non-fatal error for a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// pdfium could not open the document.
    #[error("{path}: cannot open PDF: {detail}")]
    PdfOpen { path: PathBuf, detail: String },

    /// pdfium opened the document but failed on one page.
    #[error("{path}: rasterisation failed for page {page}: {detail}")]
    Rasterisation {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    /// The image decoder rejected the file.
    #[error("{path}: cannot decode image: {detail}")]
    Decode { path: PathBuf, detail: String },

    /// The extension is allow-listed but no decoder is compiled in for it.
    #[error("{path}: unsupported image format '.{extension}'")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// PNG encoding failed.
    #[error("{path}: PNG encoding failed: {detail}")]
    Encode { path: PathBuf, detail: String },

    /// The output file or its directory could not be written.
    #[error("{path}: write failed: {detail}")]
    Write { path: PathBuf, detail: String },
}

impl FileError {
    /// The path the error refers to (source file, or output file for `Write`).
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileError::PdfOpen { path, .. }
            | FileError::Rasterisation { path, .. }
            | FileError::Decode { path, .. }
            | FileError::UnsupportedFormat { path, .. }
            | FileError::Encode { path, .. }
            | FileError::Write { path, .. } => path,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        FileError::Write {
            path: path.into(),
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = ConvertError::PartialFailure {
            failed: 1,
            total: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/10"), "got: {msg}");
    }

    #[test]
    fn aborted_display_names_offending_file() {
        let e = ConvertError::Aborted {
            converted: 3,
            source: FileError::PdfOpen {
                path: PathBuf::from("raw/invoice/bad.pdf"),
                detail: "FormatError".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("3 file(s)"), "got: {msg}");
        assert!(msg.contains("bad.pdf"), "got: {msg}");
    }

    #[test]
    fn rasterisation_display_has_page() {
        let e = FileError::Rasterisation {
            path: PathBuf::from("a.pdf"),
            page: 7,
            detail: "oom".into(),
        };
        assert!(e.to_string().contains("page 7"));
    }

    #[test]
    fn path_accessor_covers_every_variant() {
        let p = PathBuf::from("x/y.heic");
        let e = FileError::UnsupportedFormat {
            path: p.clone(),
            extension: "heic".into(),
        };
        assert_eq!(e.path(), p.as_path());
        assert_eq!(FileError::write(&p, "disk full").path(), p.as_path());
    }

    #[test]
    fn file_error_serialises() {
        let e = FileError::Decode {
            path: PathBuf::from("b.jpg"),
            detail: "truncated".into(),
        };
        let json = serde_json::to_string(&e).expect("serialise");
        assert!(json.contains("Decode"));
        assert!(json.contains("truncated"));
    }
}
