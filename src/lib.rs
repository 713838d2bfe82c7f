//! dashsnap
//!
//! A headless analytics dashboard renderer. Dashboards are immutable data
//! (tables, gauges, progress rows, pie/bar/donut charts) composed into a
//! render tree, laid out, painted and rasterized off-screen, and exported as
//! a PNG snapshot of a chosen container.
//!
//! # Features
//!
//! - **Built-in dashboards**: `analytics` and `logistics`, or load your own
//!   definition from JSON/TOML
//! - **Snapshot export**: capture any container by its stable id and save it
//!   as `dashboard.png` through a pluggable sink
//! - **Safe defaults**: cross-origin images taint captures exactly like a
//!   browser canvas, and captures are bounded by a timeout
//!
//! # Example
//!
//! ```no_run
//! use dashsnap::{data::Dashboard, ExportConfig};
//!
//! # async fn run() -> dashsnap::Result<()> {
//! let config = ExportConfig {
//!     output_dir: "out".into(),
//!     ..Default::default()
//! };
//! let exporter = dashsnap::new_exporter(&Dashboard::analytics(), config).await?;
//! let notice = exporter.download_dashboard().await;
//! println!("{}", notice);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub use error::{Error, Result};

pub mod chart;
pub mod data;
pub mod dom;
pub mod export;
pub mod rendering;

pub use dom::ContainerId;
pub use export::{ExportReceipt, Exporter, FileSink, MemorySink, Notice, SaveSink, Surface};

/// Configuration for snapshot export
///
/// The defaults are a 1280×720 viewport and a
/// download named `dashboard.png` written to the current directory.
///
/// # Examples
///
/// ```
/// let cfg = dashsnap::ExportConfig::default();
/// assert_eq!(cfg.file_name, "dashboard.png");
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Viewport used for layout; pages grow taller than it when needed
    pub viewport: Viewport,
    /// How long to wait for the surface to finish a capture, in milliseconds
    pub capture_timeout_ms: u64,
    /// Name the exported image is saved under
    pub file_name: String,
    /// Directory used by the default file sink
    pub output_dir: PathBuf,
    /// Origin the page is served from; images from other origins taint captures
    pub origin: String,
}

impl ExportConfig {
    pub const DEFAULT_FILE_NAME: &'static str = "dashboard.png";
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            capture_timeout_ms: 10_000,
            file_name: Self::DEFAULT_FILE_NAME.to_string(),
            output_dir: PathBuf::from("."),
            origin: dom::Document::DEFAULT_ORIGIN.to_string(),
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// A textual snapshot of the mounted document
#[derive(Debug, Clone)]
pub struct TextSnapshot {
    /// Document title
    pub title: String,
    /// Visible text, one line per text-bearing element
    pub text: String,
    /// Document origin
    pub url: String,
}

/// Compose `dashboard`, mount it on a fresh surface and return an exporter
/// that saves into `config.output_dir`.
pub async fn new_exporter(dashboard: &data::Dashboard, config: ExportConfig) -> Result<Exporter> {
    let document = dom::compose::document_for(dashboard)?.with_origin(&config.origin)?;
    let surface = Surface::spawn();
    surface.mount(document).await?;
    let sink: Arc<dyn SaveSink> = Arc::new(FileSink::new(config.output_dir.clone()));
    Ok(Exporter::new(surface, config, sink))
}
