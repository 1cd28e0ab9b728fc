//! Rendering backends
//!
//! Two implementations of the [`crate::Renderer`] trait live here: the
//! pixel-accurate raster backend (feature `raster`, default) and the
//! measurement-only metrics backend used by golden tests and raster-less
//! builds.

pub mod metrics;

#[cfg(feature = "raster")]
pub mod raster;

/// An export-quality bitmap produced by a renderer.
///
/// For the raster backend `data` holds maximum-quality encoded PNG bytes.
/// The metrics backend emits a content-addressed digest instead, so golden
/// tests can compare outputs without a pixel pipeline.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}
