//! Dataset conversion entry points.
//!
//! [`plan`] inspects the raw tree and decides, per class, what would be
//! written without touching the output tree. [`convert_dataset`] executes
//! that plan strictly sequentially: one file is opened, converted and closed
//! before the next begins.
//!
//! ```text
//! for class in [invoice, contract, form]:
//!     raw_root/<class> missing  → warn, skip
//!     no convertible files      → warn, skip
//!     otherwise, per file:
//!         *.pdf  → out_root/<class>/<stem>_pNN.png   (one per page)
//!         image  → out_root/<class>/<stem>.png
//! ```

use crate::config::{ConversionConfig, DocumentClass, ErrorPolicy};
use crate::error::ConvertError;
use crate::job::ConversionJob;
use crate::layout::{ensure_dir, page_output_path};
use crate::output::{ClassReport, ClassStatus, ConversionReport, FileResult};
use crate::pipeline::discover::{list_files, SourceKind};
use crate::pipeline::engine;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use pdfium_render::prelude::Pdfium;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What a run would do for one class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassPlan {
    pub class: DocumentClass,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub status: ClassStatus,
    /// Jobs in sorted source order; empty unless `status` is `Ready`.
    pub jobs: Vec<ConversionJob>,
    /// Output names claimed by more than one source. The later source in
    /// sorted order overwrites the earlier one.
    pub collisions: Vec<PathBuf>,
}

/// What a run would do, class by class.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionPlan {
    pub classes: Vec<ClassPlan>,
}

impl ConversionPlan {
    pub fn total_jobs(&self) -> usize {
        self.classes.iter().map(|c| c.jobs.len()).sum()
    }

    /// Whether any job needs the PDF engine.
    pub fn needs_pdfium(&self) -> bool {
        self.classes
            .iter()
            .flat_map(|c| c.jobs.iter())
            .any(|j| j.kind() == SourceKind::Pdf)
    }
}

/// Enumerate every configured class without writing anything.
pub fn plan(config: &ConversionConfig) -> ConversionPlan {
    ConversionPlan {
        classes: config
            .classes
            .iter()
            .map(|&class| plan_class(config, class))
            .collect(),
    }
}

fn plan_class(config: &ConversionConfig, class: DocumentClass) -> ClassPlan {
    let input_dir = config.input_dir(class);
    let output_dir = config.output_dir(class);

    let (status, jobs) = if !input_dir.is_dir() {
        (ClassStatus::MissingFolder, Vec::new())
    } else {
        let jobs: Vec<ConversionJob> = list_files(&input_dir)
            .into_iter()
            .filter_map(|source| ConversionJob::new(class, source, &output_dir))
            .collect();
        if jobs.is_empty() {
            (ClassStatus::Empty, jobs)
        } else {
            (ClassStatus::Ready, jobs)
        }
    };

    let collisions = find_collisions(&jobs, &output_dir);
    ClassPlan {
        class,
        input_dir,
        output_dir,
        status,
        jobs,
        collisions,
    }
}

/// Outputs claimed twice. PDFs are keyed by their first page name, which
/// catches both `a.pdf` + `sub/a.pdf` and `a.pdf` + `a_p01.png`.
fn find_collisions(jobs: &[ConversionJob], output_dir: &std::path::Path) -> Vec<PathBuf> {
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    for job in jobs {
        let key = match job.known_output() {
            Some(p) => p.to_path_buf(),
            None => page_output_path(job.source(), output_dir, 1),
        };
        *seen.entry(key).or_default() += 1;
    }
    let mut collisions: Vec<PathBuf> = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(p, _)| p)
        .collect();
    collisions.sort();
    collisions
}

/// Convert every configured class folder under `config.raw_root` into PNGs
/// under `config.out_root`.
///
/// # Returns
/// `Ok(ConversionReport)` when the run completed, even if some files failed
/// under [`ErrorPolicy::Continue`] (check `report.failed_files()`, or call
/// [`ConversionReport::into_result`]).
///
/// # Errors
/// - [`ConvertError::PdfiumBindingFailed`] when a PDF is reached and no
///   pdfium library can be bound
/// - [`ConvertError::OutputDirFailed`] when a class output folder cannot be
///   created
/// - [`ConvertError::Aborted`] on the first file failure under
///   [`ErrorPolicy::Abort`]; earlier outputs stay on disk
pub fn convert_dataset(config: &ConversionConfig) -> Result<ConversionReport, ConvertError> {
    let total_start = Instant::now();
    info!(
        "Starting conversion: {} → {} at {} DPI",
        config.raw_root.display(),
        config.out_root.display(),
        config.dpi
    );

    if config.raw_root == config.out_root {
        warn!(
            "raw_root and out_root are both {}; PNGs are written next to their sources",
            config.raw_root.display()
        );
    }

    let callback: ProgressCallback = config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));

    // Bound on the first PDF job only, so image-only datasets never need it.
    let mut pdfium: Option<Pdfium> = None;
    let mut converted = 0usize;
    let mut classes = Vec::with_capacity(config.classes.len());

    for class_plan in plan(config).classes {
        let ClassPlan {
            class,
            input_dir,
            output_dir,
            status,
            jobs,
            collisions,
        } = class_plan;

        match status {
            ClassStatus::MissingFolder => {
                warn!("Missing folder: {}", input_dir.display());
                callback.on_class_skipped(class, &input_dir, status);
            }
            ClassStatus::Empty => {
                warn!("No files found in: {}", input_dir.display());
                callback.on_class_skipped(class, &input_dir, status);
            }
            ClassStatus::Ready => {}
        }
        if status != ClassStatus::Ready {
            classes.push(ClassReport {
                class,
                input_dir,
                output_dir,
                status,
                files: Vec::new(),
            });
            continue;
        }

        for path in &collisions {
            warn!(
                "Several {} sources map to {}; later files overwrite earlier ones",
                class,
                path.display()
            );
        }

        ensure_dir(&output_dir).map_err(|source| ConvertError::OutputDirFailed {
            path: output_dir.clone(),
            source,
        })?;

        let total = jobs.len();
        info!("Converting {}: {} files", class, total);
        callback.on_class_start(class, &input_dir, total);

        let mut files = Vec::with_capacity(total);
        for (i, job) in jobs.iter().enumerate() {
            let index = i + 1;
            callback.on_file_start(index, total, job.source());

            if job.kind() == SourceKind::Pdf && pdfium.is_none() {
                pdfium = Some(engine::bind_pdfium()?);
            }

            let file_start = Instant::now();
            let result = job.run(pdfium.as_ref(), config.dpi);
            let duration_ms = file_start.elapsed().as_millis() as u64;

            match result {
                Ok(outputs) => {
                    debug!(
                        "{} → {} file(s) in {}ms",
                        job.source().display(),
                        outputs.len(),
                        duration_ms
                    );
                    callback.on_file_complete(index, total, job.source(), outputs.len());
                    converted += 1;
                    files.push(FileResult {
                        source: job.source().to_path_buf(),
                        kind: job.kind(),
                        outputs,
                        error: None,
                        duration_ms,
                    });
                }
                Err(e) => {
                    warn!("{}", e);
                    callback.on_file_error(index, total, &e);
                    if config.error_policy == ErrorPolicy::Abort {
                        return Err(ConvertError::Aborted {
                            converted,
                            source: e,
                        });
                    }
                    files.push(FileResult {
                        source: job.source().to_path_buf(),
                        kind: job.kind(),
                        outputs: Vec::new(),
                        error: Some(e),
                        duration_ms,
                    });
                }
            }
        }

        let failed = files.iter().filter(|f| !f.is_ok()).count();
        callback.on_class_complete(class, total - failed, failed);
        classes.push(ClassReport {
            class,
            input_dir,
            output_dir,
            status,
            files,
        });
    }

    let report = ConversionReport {
        out_root: config.out_root.clone(),
        dpi: config.dpi,
        classes,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion finished: {} files → {} PNGs ({} failed) in {}ms. Output: {}",
        report.total_files(),
        report.total_outputs(),
        report.failed_files(),
        report.total_duration_ms,
        report.out_root.display()
    );
    callback.on_run_complete(&report);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileError;
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::Path;

    fn write_jpg(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(6, 4, Rgb([1, 2, 3]))
            .save_with_format(path, image::ImageFormat::Jpeg)
            .unwrap();
    }

    fn write_png(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(3, 3, Rgb([9, 9, 9])).save(path).unwrap();
    }

    fn config(root: &Path) -> ConversionConfig {
        ConversionConfig::builder()
            .raw_root(root.join("raw"))
            .out_root(root.join("out"))
            .dpi(72)
            .build()
            .unwrap()
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut v: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn plan_reports_missing_empty_and_ready() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = tmp.path().join("raw");
        write_jpg(&raw.join("invoice/b.jpg"));
        fs::create_dir_all(raw.join("form")).unwrap();
        fs::write(raw.join("form/readme.txt"), b"hi").unwrap();

        let p = plan(&config(tmp.path()));
        let statuses: Vec<_> = p.classes.iter().map(|c| (c.class, c.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (DocumentClass::Invoice, ClassStatus::Ready),
                (DocumentClass::Contract, ClassStatus::MissingFolder),
                (DocumentClass::Form, ClassStatus::Empty),
            ]
        );
        assert_eq!(p.total_jobs(), 1);
        assert!(!p.needs_pdfium());
        assert!(!tmp.path().join("out").exists(), "planning must not write");
    }

    #[test]
    fn plan_flags_colliding_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = tmp.path().join("raw");
        write_jpg(&raw.join("form/a.jpg"));
        write_png(&raw.join("form/nested/a.png"));
        write_png(&raw.join("form/b.png"));
        fs::write(raw.join("form/c.pdf"), b"%PDF-1.4").unwrap();
        write_png(&raw.join("form/c_p01.png"));

        let p = plan(&config(tmp.path()));
        let form = &p.classes[2];
        let out = tmp.path().join("out/form");
        assert_eq!(form.collisions, vec![out.join("a.png"), out.join("c_p01.png")]);
        assert!(p.needs_pdfium());
    }

    #[test]
    fn missing_class_is_skipped_and_run_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = tmp.path().join("raw");
        write_jpg(&raw.join("invoice/b.jpg"));
        write_png(&raw.join("form/deep/er/f.png"));

        let report = convert_dataset(&config(tmp.path())).unwrap();

        let out = tmp.path().join("out");
        assert_eq!(names_in(&out.join("invoice")), vec!["b.png"]);
        assert_eq!(names_in(&out.join("form")), vec!["f.png"]);
        assert!(!out.join("contract").exists());
        assert_eq!(report.total_outputs(), 2);
        assert_eq!(report.classes[1].status, ClassStatus::MissingFolder);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn rerun_over_existing_output_is_fine() {
        let tmp = tempfile::tempdir().unwrap();
        write_jpg(&tmp.path().join("raw/contract/x.jpeg"));
        let cfg = config(tmp.path());

        let first = convert_dataset(&cfg).unwrap();
        let second = convert_dataset(&cfg).unwrap();
        assert_eq!(first.total_outputs(), 1);
        assert_eq!(second.classes[1].files[0].outputs, first.classes[1].files[0].outputs);
        assert_eq!(names_in(&tmp.path().join("out/contract")), vec!["x.png"]);
    }

    #[test]
    fn in_place_run_writes_next_to_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("data");
        write_jpg(&root.join("form/scan.jpg"));

        let cfg = ConversionConfig::builder()
            .raw_root(&root)
            .out_root(&root)
            .build()
            .unwrap();

        let report = convert_dataset(&cfg).unwrap();
        assert_eq!(report.total_outputs(), 1);
        assert_eq!(names_in(&root.join("form")), vec!["scan.jpg", "scan.png"]);
    }

    #[test]
    fn continue_policy_records_failure_and_keeps_going() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = tmp.path().join("raw");
        fs::create_dir_all(raw.join("invoice")).unwrap();
        fs::write(raw.join("invoice/a_bad.jpg"), b"garbage").unwrap();
        write_png(&raw.join("invoice/b_good.png"));

        let report = convert_dataset(&config(tmp.path())).unwrap();
        assert_eq!(report.failed_files(), 1);
        assert_eq!(report.total_outputs(), 1);
        let failure = report.failures().next().unwrap();
        assert!(matches!(failure, FileError::Decode { .. }));
        assert_eq!(failure.path(), raw.join("invoice/a_bad.jpg"));
        assert_eq!(
            names_in(&tmp.path().join("out/invoice")),
            vec!["b_good.png"]
        );
    }

    #[test]
    fn abort_policy_stops_at_first_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = tmp.path().join("raw");
        write_png(&raw.join("invoice/a_good.png"));
        fs::write(raw.join("invoice/b_bad.png"), b"garbage").unwrap();
        write_png(&raw.join("invoice/c_never.png"));

        let cfg = ConversionConfig::builder()
            .raw_root(&raw)
            .out_root(tmp.path().join("out"))
            .fail_fast(true)
            .build()
            .unwrap();

        match convert_dataset(&cfg) {
            Err(ConvertError::Aborted { converted, source }) => {
                assert_eq!(converted, 1);
                assert_eq!(source.path(), raw.join("invoice/b_bad.png"));
            }
            other => panic!("expected Aborted, got {other:?}"),
        }
        // Earlier output stays, later file never ran.
        assert_eq!(
            names_in(&tmp.path().join("out/invoice")),
            vec!["a_good.png"]
        );
    }
}
