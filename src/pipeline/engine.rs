//! PDFium binding.
//!
//! Resolution order (first match wins):
//!
//! 1. `PDFIUM_LIB_PATH` — path to an existing pdfium library.
//! 2. The platform library (`libpdfium.so` / `.dylib` / `pdfium.dll`) in the
//!    current working directory.
//! 3. The system library search path.
//!
//! The resolved location is remembered for the life of the process so later
//! runs skip the probing.

use crate::error::ConvertError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Environment variable pointing at an explicit pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

#[derive(Debug, Clone)]
enum LibrarySource {
    File(PathBuf),
    System,
}

static RESOLVED: OnceLock<LibrarySource> = OnceLock::new();

/// Bind to a pdfium library, probing the locations listed above.
pub fn bind_pdfium() -> Result<Pdfium, ConvertError> {
    if let Some(source) = RESOLVED.get() {
        return bind_source(source).map_err(ConvertError::PdfiumBindingFailed);
    }

    let mut failures = Vec::new();
    for source in candidates() {
        match bind_source(&source) {
            Ok(pdfium) => {
                info!("Bound pdfium from {:?}", source);
                let _ = RESOLVED.set(source);
                return Ok(pdfium);
            }
            Err(reason) => {
                debug!("pdfium not usable from {:?}: {}", source, reason);
                failures.push(reason);
            }
        }
    }

    Err(ConvertError::PdfiumBindingFailed(failures.join("; ")))
}

/// Whether a pdfium library can be bound in this environment.
pub fn pdfium_available() -> bool {
    bind_pdfium().is_ok()
}

fn candidates() -> Vec<LibrarySource> {
    let mut out = Vec::with_capacity(3);
    if let Ok(p) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !p.is_empty() {
            out.push(LibrarySource::File(PathBuf::from(p)));
        }
    }
    out.push(LibrarySource::File(
        Pdfium::pdfium_platform_library_name_at_path("./"),
    ));
    out.push(LibrarySource::System);
    out
}

fn bind_source(source: &LibrarySource) -> Result<Pdfium, String> {
    let bindings = match source {
        LibrarySource::File(path) => {
            if !path.exists() {
                return Err(format!("'{}' does not exist", path.display()));
            }
            Pdfium::bind_to_library(path)
        }
        LibrarySource::System => Pdfium::bind_to_system_library(),
    };
    bindings
        .map(Pdfium::new)
        .map_err(|e| format!("{source:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_end_with_system_library() {
        let c = candidates();
        assert!(c.len() >= 2);
        assert!(matches!(c.last(), Some(LibrarySource::System)));
    }

    #[test]
    fn missing_file_source_reports_path() {
        let err = bind_source(&LibrarySource::File(PathBuf::from("/nonexistent/libpdfium.so")))
            .err()
            .expect("binding a missing file must fail");
        assert!(err.contains("/nonexistent/libpdfium.so"), "got: {err}");
    }
}
