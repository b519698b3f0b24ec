//! # idu-images
//!
//! Turn a folder tree of raw documents, partitioned by class, into a flat,
//! normalised set of PNG images ready for dataset preparation.
//!
//! ## Layout
//!
//! ```text
//! raw_root/                         out_root/
//!  ├─ invoice/**/*.pdf   ───────▶    ├─ invoice/<stem>_p01.png …
//!  ├─ contract/**/*.jpg  ───────▶    ├─ contract/<stem>.png
//!  └─ form/**/*.tiff     ───────▶    └─ form/<stem>.png
//! ```
//!
//! PDFs are rasterised page by page through pdfium at a configurable DPI;
//! every other allow-listed image (png, jpg, jpeg, bmp, tif, tiff, webp,
//! jfif, heic) is decoded and re-encoded as 8-bit RGB PNG. Missing or empty
//! class folders are skipped with a warning.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use idu_images::{convert_dataset, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .raw_root("idu_data/raw")
//!         .out_root("idu_data/images")
//!         .dpi(300)
//!         .build()?;
//!     let report = convert_dataset(&config)?;
//!     eprintln!(
//!         "{} files → {} PNGs, {} failed",
//!         report.total_files(),
//!         report.total_outputs(),
//!         report.failed_files()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `idu-images` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod job;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, DocumentClass, ErrorPolicy};
pub use convert::{convert_dataset, plan, ClassPlan, ConversionPlan};
pub use error::{ConvertError, FileError};
pub use job::ConversionJob;
pub use output::{ClassReport, ClassStatus, ConversionReport, FileResult};
pub use pipeline::discover::{list_files, SourceKind};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
