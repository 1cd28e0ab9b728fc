//! Measurement-only backend.
//!
//! Produces no pixels. The template is checked for existence (so the
//! asset-load gate behaves identically to the raster backend) and given
//! nominal dimensions; rendering emits a content-addressed digest of the
//! composite description. Golden tests compare these digests.

use sha2::{Digest, Sha256};

use crate::rendering::Bitmap;
use crate::sizing::{HeuristicMeasurer, TextMeasurer};
use crate::{Composite, Error, Renderer, Result, StudioConfig, TemplateInfo};

/// Nominal template width when no decoder is available.
pub const NOMINAL_WIDTH: u32 = 600;
/// Nominal template height when no decoder is available.
pub const NOMINAL_HEIGHT: u32 = 450;

pub struct MetricsRenderer {
    config: StudioConfig,
    template: Option<TemplateInfo>,
    measurer: HeuristicMeasurer,
}

impl Renderer for MetricsRenderer {
    fn new(config: StudioConfig) -> Result<Self>
    where
        Self: Sized,
    {
        config.validate()?;
        Ok(Self {
            config,
            template: None,
            measurer: HeuristicMeasurer,
        })
    }

    fn load_template(&mut self) -> Result<TemplateInfo> {
        let path = &self.config.template_path;
        std::fs::metadata(path)
            .map_err(|e| Error::AssetError(format!("{}: {}", path.display(), e)))?;
        let info = TemplateInfo {
            width: NOMINAL_WIDTH,
            height: NOMINAL_HEIGHT,
        };
        self.template = Some(info);
        Ok(info)
    }

    fn template_info(&self) -> Option<TemplateInfo> {
        self.template
    }

    fn measurer(&self) -> &dyn TextMeasurer {
        &self.measurer
    }

    fn render(&self, composite: &Composite) -> Result<Bitmap> {
        let info = self
            .template
            .ok_or_else(|| Error::AssetError("certificate template is not loaded".to_string()))?;

        let descriptor = format!(
            "certpress {}x{} scale={} px={} name={}",
            info.width, info.height, composite.scale, composite.font_px, composite.name
        );
        let digest = Sha256::digest(descriptor.as_bytes());

        Ok(Bitmap {
            width: info.width * composite.scale,
            height: info.height * composite.scale,
            data: digest.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_template(path: &std::path::Path) -> StudioConfig {
        StudioConfig {
            template_path: path.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn load_fails_for_missing_template() {
        let config = config_with_template(std::path::Path::new("does/not/exist.webp"));
        let mut renderer = MetricsRenderer::new(config).unwrap();
        let err = renderer.load_template().unwrap_err();
        assert!(matches!(err, Error::AssetError(_)));
        assert!(renderer.template_info().is_none());
    }

    #[test]
    fn render_requires_a_loaded_template() {
        let config = config_with_template(std::path::Path::new("does/not/exist.webp"));
        let renderer = MetricsRenderer::new(config).unwrap();
        let composite = Composite {
            name: "Jane".to_string(),
            font_px: 42,
            scale: 4,
        };
        assert!(matches!(renderer.render(&composite), Err(Error::AssetError(_))));
    }

    #[test]
    fn digests_are_stable_and_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.webp");
        std::fs::write(&template, b"stub").unwrap();

        let mut renderer = MetricsRenderer::new(config_with_template(&template)).unwrap();
        let info = renderer.load_template().unwrap();
        assert_eq!(info.width, NOMINAL_WIDTH);

        let composite = Composite {
            name: "Jane Doe".to_string(),
            font_px: 38,
            scale: 4,
        };
        let a = renderer.render(&composite).unwrap();
        let b = renderer.render(&composite).unwrap();
        assert_eq!(a.data, b.data);
        assert_eq!(a.width, NOMINAL_WIDTH * 4);
        assert_eq!(a.height, NOMINAL_HEIGHT * 4);

        let other = Composite {
            name: "John Doe".to_string(),
            ..composite
        };
        assert_ne!(renderer.render(&other).unwrap().data, a.data);
    }
}
