//! Configuration types for dataset conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The run is a pure function of this
//! struct: there is no process-wide state, so two runs with equal configs and
//! unchanged inputs produce the same output file names.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default raw input root.
pub const DEFAULT_RAW_ROOT: &str = "idu_data/raw";
/// Default PNG output root.
pub const DEFAULT_OUT_ROOT: &str = "idu_data/images";
/// Default PDF render resolution.
pub const DEFAULT_DPI: u32 = 300;
/// Smallest accepted DPI; anything lower would render zero-sized pages.
pub const MIN_DPI: u32 = 1;

/// Configuration for one conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use idu_images::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .raw_root("data/raw")
///     .out_root("data/images")
///     .dpi(150)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Root holding one subfolder per class. Default: `idu_data/raw`.
    pub raw_root: PathBuf,

    /// Root under which the class subfolders of PNGs are written.
    /// Default: `idu_data/images`.
    pub out_root: PathBuf,

    /// Rendering DPI used when rasterising each PDF page. Default: 300.
    ///
    /// Pages are scaled by `dpi / 72`, so a US-Letter page (612 × 792 pt)
    /// becomes 2550 × 3300 px at the default.
    pub dpi: u32,

    /// Classes to process, in order. Default: invoice, contract, form.
    pub classes: Vec<DocumentClass>,

    /// What to do when a single file fails. Default: [`ErrorPolicy::Continue`].
    pub error_policy: ErrorPolicy,

    /// Optional per-class / per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            raw_root: PathBuf::from(DEFAULT_RAW_ROOT),
            out_root: PathBuf::from(DEFAULT_OUT_ROOT),
            dpi: DEFAULT_DPI,
            classes: DocumentClass::ALL.to_vec(),
            error_policy: ErrorPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("raw_root", &self.raw_root)
            .field("out_root", &self.out_root)
            .field("dpi", &self.dpi)
            .field("classes", &self.classes)
            .field("error_policy", &self.error_policy)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// `raw_root/<class>`.
    pub fn input_dir(&self, class: DocumentClass) -> PathBuf {
        self.raw_root.join(class.as_str())
    }

    /// `out_root/<class>`.
    pub fn output_dir(&self, class: DocumentClass) -> PathBuf {
        self.out_root.join(class.as_str())
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn raw_root(mut self, path: impl AsRef<Path>) -> Self {
        self.config.raw_root = path.as_ref().to_path_buf();
        self
    }

    pub fn out_root(mut self, path: impl AsRef<Path>) -> Self {
        self.config.out_root = path.as_ref().to_path_buf();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn classes(mut self, classes: impl IntoIterator<Item = DocumentClass>) -> Self {
        self.config.classes = classes.into_iter().collect();
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    /// Shorthand for `error_policy(ErrorPolicy::Abort)` when `true`.
    pub fn fail_fast(mut self, v: bool) -> Self {
        self.config.error_policy = if v {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Continue
        };
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.dpi < MIN_DPI {
            return Err(ConvertError::InvalidConfig(format!(
                "DPI must be at least {MIN_DPI}, got {}",
                c.dpi
            )));
        }
        if c.classes.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "At least one class must be selected".into(),
            ));
        }
        for (i, class) in c.classes.iter().enumerate() {
            if c.classes[..i].contains(class) {
                return Err(ConvertError::InvalidConfig(format!(
                    "Class '{class}' listed twice"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Document category; names both the input and the output subfolder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentClass {
    Invoice,
    Contract,
    Form,
}

impl DocumentClass {
    /// Every class, in processing order.
    pub const ALL: [DocumentClass; 3] = [
        DocumentClass::Invoice,
        DocumentClass::Contract,
        DocumentClass::Form,
    ];

    /// Folder name of the class.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentClass::Invoice => "invoice",
            DocumentClass::Contract => "contract",
            DocumentClass::Form => "form",
        }
    }
}

impl fmt::Display for DocumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentClass {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invoice" => Ok(DocumentClass::Invoice),
            "contract" => Ok(DocumentClass::Contract),
            "form" => Ok(DocumentClass::Form),
            other => Err(ConvertError::InvalidConfig(format!(
                "Unknown class '{other}' (expected invoice, contract or form)"
            ))),
        }
    }
}

/// How a single failed file affects the rest of the run.
///
/// Missing and empty class folders are always skipped with a warning; this
/// only governs files that fail to open, decode or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Record the failure in the report and move on to the next file. (default)
    #[default]
    Continue,
    /// Stop at the first failure. Files converted so far stay on disk.
    Abort,
}
