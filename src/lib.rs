//! Certpress Studio Engine
//!
//! A small certificate studio: a user-typed name is overlaid onto a fixed
//! certificate template at a fit-to-width font size, and the composite is
//! exported as a client-local PNG.
//!
//! # Features
//!
//! - **Raster Backend** (default): real pixel compositing via `tiny-skia`
//!   and `fontdue`, template decoding via `image`
//! - **Metrics Backend**: measurement-only, deterministic content-addressed
//!   output, used for golden tests and raster-less builds
//! - **Explicit State Machine**: every gating rule (generate, download,
//!   retry, reset) is driven by one event enum and one transition function
//!
//! # Example
//!
//! ```no_run
//! use certpress::{Studio, StudioConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> certpress::Result<()> {
//! let config = StudioConfig {
//!     output_dir: "downloads".into(),
//!     ..Default::default()
//! };
//!
//! let studio = Studio::new(config).await?;
//! studio.set_name("Jane Doe").await?;
//! studio.generate().await?;
//! let outcome = studio.download().await?;
//! println!("saved {}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod export;
pub mod rendering;
pub mod session;
pub mod sizing;
pub mod slug;
pub mod studio;

pub use rendering::Bitmap;
pub use studio::Studio;

use sizing::{SizingPolicy, TextMeasurer};

/// Configuration for the certificate studio
///
/// Paths point at deployment-provided assets; their absence or failure to
/// decode is the only external error condition the studio handles. The
/// defaults reproduce the authoritative policy variant: 4x export upscale,
/// 80% available width, 500ms settle delay, 100ms sizing debounce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Certificate background template image (PNG, WebP, or JPEG)
    pub template_path: PathBuf,
    /// Decorative hero image shown on the form stage; load failure is
    /// logged but never blocks anything
    pub hero_path: Option<PathBuf>,
    /// Font face used to draw and measure the name (raster backend)
    pub font_path: PathBuf,
    /// Directory exported certificates are saved into
    pub output_dir: PathBuf,
    /// Fixed token prefixed to every export filename
    pub filename_prefix: String,
    /// Uniform upscale factor applied to the export bitmap
    pub export_scale: u32,
    /// Delay before rasterizing, letting fonts/images finish painting
    pub settle_delay_ms: u64,
    /// Delay before the font size is recomputed after a change
    pub debounce_ms: u64,
    /// Font size bounds, step, and available-width fraction
    pub sizing: SizingPolicy,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("assets/certificate.webp"),
            hero_path: Some(PathBuf::from("assets/hero.jpg")),
            font_path: PathBuf::from("assets/Poppins-Regular.ttf"),
            output_dir: PathBuf::from("."),
            filename_prefix: "certificate".to_string(),
            export_scale: 4,
            settle_delay_ms: 500,
            debounce_ms: 100,
            sizing: SizingPolicy::default(),
        }
    }
}

impl StudioConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values no backend can work with.
    pub fn validate(&self) -> Result<()> {
        if self.export_scale == 0 || self.export_scale > 8 {
            return Err(Error::ConfigError(format!(
                "export_scale must be within 1..=8, got {}",
                self.export_scale
            )));
        }
        if !(self.sizing.width_fraction > 0.0 && self.sizing.width_fraction <= 1.0) {
            return Err(Error::ConfigError(format!(
                "width_fraction must be within (0, 1], got {}",
                self.sizing.width_fraction
            )));
        }
        if self.sizing.step_px == 0 {
            return Err(Error::ConfigError("font step must be non-zero".to_string()));
        }
        if self.sizing.min_px == 0 || self.sizing.min_px > self.sizing.max_px {
            return Err(Error::ConfigError(format!(
                "font bounds are inverted or zero: min {} max {}",
                self.sizing.min_px, self.sizing.max_px
            )));
        }
        if self.filename_prefix.is_empty() {
            return Err(Error::ConfigError("filename_prefix must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Intrinsic pixel dimensions of the loaded certificate template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateInfo {
    pub width: u32,
    pub height: u32,
}

/// Description of the certificate composite handed to a renderer: the
/// trimmed recipient name, the computed font size, and the export upscale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    pub name: String,
    pub font_px: u32,
    pub scale: u32,
}

/// Core trait for rasterization backends
///
/// This is the seam between the session/export logic and the opaque
/// "render a composite to pixels" capability. Backends own the template
/// asset and the text measurement that the fit-to-width sizer relies on.
pub trait Renderer {
    /// Create a new renderer with the given configuration
    fn new(config: StudioConfig) -> Result<Self>
    where
        Self: Sized;

    /// Load (or reload) the template asset; drives the asset-load gate
    fn load_template(&mut self) -> Result<TemplateInfo>;

    /// Intrinsic template dimensions, `None` until a load succeeded
    fn template_info(&self) -> Option<TemplateInfo>;

    /// The measurer the sizer should use with this backend
    fn measurer(&self) -> &dyn TextMeasurer;

    /// Rasterize the composite into an export-quality bitmap
    fn render(&self, composite: &Composite) -> Result<Bitmap>;
}

/// Create a new renderer with the default backend
///
/// The raster backend is used when the `raster` feature is enabled
/// (default); otherwise the measurement-only metrics backend stands in.
#[cfg(feature = "raster")]
pub fn new_renderer(config: StudioConfig) -> Result<impl Renderer + Send> {
    rendering::raster::RasterRenderer::new(config)
}

#[cfg(not(feature = "raster"))]
pub fn new_renderer(config: StudioConfig) -> Result<impl Renderer + Send> {
    rendering::metrics::MetricsRenderer::new(config)
}
