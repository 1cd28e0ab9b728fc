//! Export pipeline.
//!
//! Turns the certificate composite into a saved PNG file: gate on asset
//! readiness, wait out the settle delay, rasterize at the export upscale,
//! encode, and only then write the file, so a partial or corrupt download
//! can never appear on disk. The busy flag around a run is owned by the
//! studio, which clears it on every exit path.

use log::debug;
use std::path::PathBuf;
use std::time::Duration;

use crate::slug;
use crate::{Composite, Error, Renderer, Result, StudioConfig};

/// What a successful export produced.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Full path of the saved file
    pub path: PathBuf,
    /// Derived filename, `<prefix>-<slug>.png`
    pub filename: String,
    /// Output bitmap width in pixels (template width times upscale)
    pub width: u32,
    /// Output bitmap height in pixels
    pub height: u32,
}

/// Run the export pipeline once.
///
/// The rasterization runs to completion or failure; there is no timeout and
/// no cancellation, matching the synchronous-await discipline of the
/// surrounding studio.
pub async fn run<R: Renderer>(
    renderer: &R,
    name: &str,
    font_px: u32,
    config: &StudioConfig,
) -> Result<ExportOutcome> {
    renderer
        .template_info()
        .ok_or_else(|| Error::AssetError("certificate template is not ready".to_string()))?;

    if config.settle_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.settle_delay_ms)).await;
    }

    let composite = Composite {
        name: name.trim().to_string(),
        font_px,
        scale: config.export_scale,
    };
    debug!(
        "rasterizing certificate for {:?} at {}px, upscale {}x",
        composite.name, composite.font_px, composite.scale
    );
    let bitmap = renderer.render(&composite)?;

    let filename = slug::export_filename(&config.filename_prefix, name);
    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        Error::ExportError(format!(
            "failed to create {}: {}",
            config.output_dir.display(),
            e
        ))
    })?;
    let path = config.output_dir.join(&filename);
    std::fs::write(&path, &bitmap.data)
        .map_err(|e| Error::ExportError(format!("failed to save {}: {}", path.display(), e)))?;
    debug!("saved {} ({} bytes)", path.display(), bitmap.data.len());

    Ok(ExportOutcome {
        path,
        filename,
        width: bitmap.width,
        height: bitmap.height,
    })
}

/// Encode PNG bytes as a `data:` URL, for consumers that hand the image to
/// a viewer instead of the filesystem.
pub fn data_url(png: &[u8]) -> String {
    use base64::Engine as Base64Engine;
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_shape() {
        let url = data_url(b"png");
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.ends_with("cG5n"));
    }

    #[test]
    fn data_url_of_empty_payload() {
        assert_eq!(data_url(b""), "data:image/png;base64,");
    }
}
