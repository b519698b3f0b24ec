//! File enumeration: list convertible sources below a class folder.
//!
//! Matching is by extension only, case-insensitively. Content sniffing is
//! left to the decoders, so a `.pdf` that is really a JPEG fails later with a
//! [`crate::error::FileError::PdfOpen`] rather than being silently skipped.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Raster image extensions accepted as input (lowercase, no dot).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp", "jfif", "heic",
];

/// Paginated document extensions accepted as input.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// How a source file is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// One PNG per page.
    Pdf,
    /// Exactly one PNG.
    Image,
}

impl SourceKind {
    /// Classify a path by its extension; `None` when not allow-listed.
    pub fn of(path: &Path) -> Option<Self> {
        let ext = lowercase_extension(path)?;
        if PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Image)
        } else {
            None
        }
    }
}

/// Lowercased extension without the dot.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Recursively list every allow-listed regular file under `root`, sorted by
/// full path.
///
/// Unreadable entries and dangling symlinks are skipped. A missing or empty
/// `root` yields an empty list; callers decide whether that deserves a
/// warning.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| SourceKind::of(path).is_some())
        .collect();

    files.sort();
    debug!("Discovered {} files under {}", files.len(), root.display());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"x").unwrap();
    }

    #[test]
    fn kind_by_extension_is_case_insensitive() {
        assert_eq!(SourceKind::of(Path::new("a.PDF")), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::of(Path::new("a.Png")), Some(SourceKind::Image));
        assert_eq!(SourceKind::of(Path::new("a.jfif")), Some(SourceKind::Image));
        assert_eq!(SourceKind::of(Path::new("a.HEIC")), Some(SourceKind::Image));
        assert_eq!(SourceKind::of(Path::new("a.gif")), None);
        assert_eq!(SourceKind::of(Path::new("README")), None);
        assert_eq!(SourceKind::of(Path::new(".pdf")), None);
    }

    #[test]
    fn filters_recurses_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "z.jpg");
        touch(root, "a.PDF");
        touch(root, "notes.txt");
        touch(root, "nested/deeper/m.Tiff");
        touch(root, "nested/b.webp");
        touch(root, "nested/skip.docx");
        fs::create_dir_all(root.join("dir.png")).unwrap();

        let files = list_files(root);
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(
            rel,
            vec!["a.PDF", "nested/b.webp", "nested/deeper/m.Tiff", "z.jpg"]
        );
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn empty_and_missing_roots_yield_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(list_files(tmp.path()).is_empty());
        assert!(list_files(&tmp.path().join("absent")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "real.png");
        std::os::unix::fs::symlink(tmp.path().join("gone.png"), tmp.path().join("link.png"))
            .unwrap();
        let files = list_files(tmp.path());
        assert_eq!(files, vec![tmp.path().join("real.png")]);
    }
}
