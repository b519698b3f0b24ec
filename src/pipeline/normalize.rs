//! Image normalisation: any supported raster → 8-bit RGB PNG.
//!
//! Grayscale, palette, 16-bit and CMYK sources are widened or converted to
//! RGB by the decoder. Alpha is dropped, not composited: a fully transparent
//! pixel keeps whatever colour the file stores under it.

use crate::error::FileError;
use crate::layout::ensure_dir;
use crate::pipeline::discover::lowercase_extension;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageError, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decode `src`, coerce it to RGB8 and write it as PNG to `out_path`.
pub fn normalize_image(src: &Path, out_path: &Path) -> Result<PathBuf, FileError> {
    let decoded = decode(src)?;
    let (w, h) = (decoded.width(), decoded.height());
    let color = decoded.color();

    let rgb = DynamicImage::ImageRgb8(decoded.into_rgb8());
    write_png(&rgb, out_path)?;

    debug!(
        "Normalised {} ({:?}, {}x{}) → {}",
        src.display(),
        color,
        w,
        h,
        out_path.display()
    );
    Ok(out_path.to_path_buf())
}

fn decode(src: &Path) -> Result<DynamicImage, FileError> {
    let to_decode_err = |e: std::io::Error| FileError::Decode {
        path: src.to_path_buf(),
        detail: e.to_string(),
    };

    let reader = ImageReader::open(src)
        .map_err(to_decode_err)?
        .with_guessed_format()
        .map_err(to_decode_err)?;

    reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => FileError::UnsupportedFormat {
            path: src.to_path_buf(),
            extension: lowercase_extension(src).unwrap_or_default(),
        },
        other => FileError::Decode {
            path: src.to_path_buf(),
            detail: other.to_string(),
        },
    })
}

/// Write `image` as a maximally compressed PNG, creating the parent
/// directory when needed.
pub fn write_png(image: &DynamicImage, out_path: &Path) -> Result<(), FileError> {
    if let Some(parent) = out_path.parent() {
        ensure_dir(parent).map_err(|e| FileError::write(parent, e))?;
    }

    let file = File::create(out_path).map_err(|e| FileError::write(out_path, e))?;
    let mut writer = BufWriter::new(file);

    let encoder =
        PngEncoder::new_with_quality(&mut writer, CompressionType::Best, FilterType::Adaptive);
    image.write_with_encoder(encoder).map_err(|e| match e {
        ImageError::IoError(io) => FileError::write(out_path, io),
        other => FileError::Encode {
            path: out_path.to_path_buf(),
            detail: other.to_string(),
        },
    })?;

    writer.flush().map_err(|e| FileError::write(out_path, e))
}
