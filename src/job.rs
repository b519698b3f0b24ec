//! One unit of work: a source file paired with the directory it lands in.

use crate::config::DocumentClass;
use crate::error::FileError;
use crate::layout::image_output_path;
use crate::pipeline::discover::SourceKind;
use crate::pipeline::{normalize, render};
use pdfium_render::prelude::Pdfium;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A planned conversion.
///
/// Both variants share one capability, [`ConversionJob::run`]: given the
/// source and the class output directory, produce the written PNG paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConversionJob {
    /// Rasterise every page to `{stem}_pNN.png`.
    Pdf {
        class: DocumentClass,
        source: PathBuf,
        out_dir: PathBuf,
    },
    /// Re-encode to `{stem}.png`.
    Image {
        class: DocumentClass,
        source: PathBuf,
        out_path: PathBuf,
    },
}

impl ConversionJob {
    /// Build the job for `source`, or `None` when its extension is not
    /// allow-listed.
    pub fn new(class: DocumentClass, source: PathBuf, out_dir: &Path) -> Option<Self> {
        Some(match SourceKind::of(&source)? {
            SourceKind::Pdf => ConversionJob::Pdf {
                class,
                source,
                out_dir: out_dir.to_path_buf(),
            },
            SourceKind::Image => ConversionJob::Image {
                class,
                out_path: image_output_path(&source, out_dir),
                source,
            },
        })
    }

    pub fn class(&self) -> DocumentClass {
        match self {
            ConversionJob::Pdf { class, .. } | ConversionJob::Image { class, .. } => *class,
        }
    }

    pub fn source(&self) -> &Path {
        match self {
            ConversionJob::Pdf { source, .. } | ConversionJob::Image { source, .. } => source,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            ConversionJob::Pdf { .. } => SourceKind::Pdf,
            ConversionJob::Image { .. } => SourceKind::Image,
        }
    }

    /// Single-output path for images; PDFs only know theirs after opening.
    pub fn known_output(&self) -> Option<&Path> {
        match self {
            ConversionJob::Pdf { .. } => None,
            ConversionJob::Image { out_path, .. } => Some(out_path),
        }
    }

    /// Execute the job. `pdfium` is only touched by the PDF variant.
    ///
    /// [`crate::convert_dataset`] binds the engine before the first PDF job,
    /// so the unbound case below only reaches callers running jobs directly.
    pub fn run(&self, pdfium: Option<&Pdfium>, dpi: u32) -> Result<Vec<PathBuf>, FileError> {
        match self {
            ConversionJob::Pdf {
                source, out_dir, ..
            } => {
                let pdfium = pdfium.ok_or_else(|| FileError::PdfOpen {
                    path: source.clone(),
                    detail: "no pdfium engine bound".into(),
                })?;
                render::render_pdf(pdfium, source, out_dir, dpi)
            }
            ConversionJob::Image {
                source, out_path, ..
            } => normalize::normalize_image(source, out_path).map(|p| vec![p]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_extension() {
        let out = Path::new("out/invoice");
        let pdf = ConversionJob::new(DocumentClass::Invoice, "raw/invoice/a.PDF".into(), out)
            .unwrap();
        assert_eq!(pdf.kind(), SourceKind::Pdf);
        assert_eq!(pdf.known_output(), None);

        let img = ConversionJob::new(DocumentClass::Invoice, "raw/invoice/x/b.jpeg".into(), out)
            .unwrap();
        assert_eq!(img.kind(), SourceKind::Image);
        assert_eq!(img.known_output(), Some(Path::new("out/invoice/b.png")));
        assert_eq!(img.class(), DocumentClass::Invoice);

        assert!(ConversionJob::new(DocumentClass::Form, "notes.txt".into(), out).is_none());
    }

    #[test]
    fn pdf_job_without_engine_fails_per_file() {
        let job = ConversionJob::new(DocumentClass::Form, "f.pdf".into(), Path::new("o")).unwrap();
        let err = job.run(None, 300).unwrap_err();
        assert!(matches!(err, FileError::PdfOpen { .. }));
        assert_eq!(err.path(), Path::new("f.pdf"));
    }

    #[test]
    fn serialises_with_kind_tag() {
        let job =
            ConversionJob::new(DocumentClass::Contract, "c.png".into(), Path::new("o")).unwrap();
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["kind"], "image");
        assert_eq!(json["class"], "contract");
    }
}
