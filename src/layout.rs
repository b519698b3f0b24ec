//! Output naming and directory helpers.
//!
//! Every output path is a pure function of the source path and the class
//! output directory:
//!
//! ```text
//! raw/invoice/2024/scan.JPG   ──▶  images/invoice/scan.png
//! raw/invoice/contract_a.pdf  ──▶  images/invoice/contract_a_p01.png
//!                                  images/invoice/contract_a_p02.png
//! ```
//!
//! Subdirectories below the class level are flattened.

use std::io;
use std::path::{Path, PathBuf};

/// Create `dir` and its parents. Succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// File stem used to derive output names; lossy for non-UTF-8 names.
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `out_dir/{stem}.png`
pub fn image_output_path(source: &Path, out_dir: &Path) -> PathBuf {
    out_dir.join(format!("{}.png", stem_of(source)))
}

/// `out_dir/{stem}_p{page:02}.png`, `page` is 1-based.
pub fn page_output_path(source: &Path, out_dir: &Path, page: usize) -> PathBuf {
    out_dir.join(format!("{}_p{:02}.png", stem_of(source), page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_name_drops_extension_and_subdirs() {
        let p = image_output_path(Path::new("raw/form/2023/q1/scan.JPEG"), Path::new("out/form"));
        assert_eq!(p, PathBuf::from("out/form/scan.png"));
    }

    #[test]
    fn page_names_are_zero_padded() {
        let src = Path::new("raw/invoice/a.pdf");
        let out = Path::new("out/invoice");
        assert_eq!(page_output_path(src, out, 1), out.join("a_p01.png"));
        assert_eq!(page_output_path(src, out, 9), out.join("a_p09.png"));
        assert_eq!(page_output_path(src, out, 99), out.join("a_p99.png"));
        assert_eq!(page_output_path(src, out, 100), out.join("a_p100.png"));
    }

    #[test]
    fn dotted_stems_keep_inner_dots() {
        let p = image_output_path(Path::new("scan.v2.final.tif"), Path::new("o"));
        assert_eq!(p, PathBuf::from("o/scan.v2.final.png"));
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let d = tmp.path().join("a/b/c");
        ensure_dir(&d).unwrap();
        ensure_dir(&d).unwrap();
        assert!(d.is_dir());
    }
}
