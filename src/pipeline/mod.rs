//! Pipeline stages for dataset conversion.
//!
//! Each submodule implements exactly one step. Keeping stages separate makes
//! each independently testable and lets the rasteriser backend change
//! without touching discovery or normalisation.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ render     (PDF, one PNG per page)
//!          └─▶ normalize  (raster image, one PNG)
//! ```
//!
//! 1. [`discover`]  — recursive, sorted, extension-filtered file listing
//! 2. [`engine`]    — bind the pdfium library the renderer drives
//! 3. [`render`]    — rasterise PDF pages at `dpi / 72` zoom
//! 4. [`normalize`] — decode any supported raster and re-encode as RGB PNG

pub mod discover;
pub mod engine;
pub mod normalize;
pub mod render;
