//! PDF rasterisation: render every page of a PDF to its own PNG via pdfium.
//!
//! Pages are scaled uniformly by `dpi / 72` (72 pt = 1 in) and rendered onto
//! pdfium's default opaque white background, then written without alpha.
//! The document handle lives only for the duration of [`render_pdf`] and is
//! released on every exit path, including errors.

use crate::error::FileError;
use crate::layout::{ensure_dir, page_output_path};
use crate::pipeline::normalize::write_png;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF base unit: points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Uniform page scale for `dpi`.
pub fn zoom(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

/// Pixel size of a `width_pt × height_pt` page rendered at `dpi`, rounded to
/// the nearest pixel and never smaller than 1 × 1.
pub fn target_size(width_pt: f32, height_pt: f32, dpi: u32) -> (i32, i32) {
    let z = zoom(dpi);
    let w = (width_pt * z).round().max(1.0) as i32;
    let h = (height_pt * z).round().max(1.0) as i32;
    (w, h)
}

/// Rasterise every page of `pdf_path` into `out_dir` as
/// `{stem}_p{NN}.png`, returning the written paths in page order.
pub fn render_pdf(
    pdfium: &Pdfium,
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
) -> Result<Vec<PathBuf>, FileError> {
    ensure_dir(out_dir).map_err(|e| FileError::write(out_dir, e))?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| FileError::PdfOpen {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("{}: {} pages at {} DPI", pdf_path.display(), total_pages, dpi);

    let mut outputs = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let (width, height) = target_size(page.width().value, page.height().value, dpi);

        let render_config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| FileError::Rasterisation {
                    path: pdf_path.to_path_buf(),
                    page: page_num,
                    detail: format!("{:?}", e),
                })?;

        let image = DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8());
        let out_path = page_output_path(pdf_path, out_dir, page_num);
        write_png(&image, &out_path)?;

        debug!(
            "Rendered page {} → {}x{} px → {}",
            page_num,
            image.width(),
            image.height(),
            out_path.display()
        );
        outputs.push(out_path);
    }

    Ok(outputs)
}
