//! Pixel backend.
//!
//! Decodes the certificate template with `image` (PNG, WebP, or JPEG),
//! composites it into a `tiny-skia` pixmap at the export upscale, draws the
//! recipient name from `fontdue` coverage masks centered on the template,
//! and encodes the result as maximum-quality PNG. The background stays
//! transparent wherever the template itself is transparent.

use log::warn;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, PremultipliedColorU8, Transform};

use crate::rendering::Bitmap;
use crate::sizing::TextMeasurer;
use crate::{Composite, Error, Renderer, Result, StudioConfig, TemplateInfo};

/// Ink color of the overlaid name.
const NAME_RGB: (u8, u8, u8) = (26, 26, 46);
/// Vertical anchor: the name block is centered at this fraction of the
/// template height.
const NAME_ANCHOR_Y: f32 = 0.52;

/// Measures text by summing real horizontal glyph advances.
#[derive(Debug)]
pub struct GlyphMeasurer {
    font: Arc<fontdue::Font>,
}

impl TextMeasurer for GlyphMeasurer {
    fn text_width(&self, text: &str, font_px: u32) -> f32 {
        text.chars()
            .map(|c| self.font.metrics(c, font_px as f32).advance_width)
            .sum()
    }
}

#[derive(Debug)]
pub struct RasterRenderer {
    config: StudioConfig,
    font: Arc<fontdue::Font>,
    measurer: GlyphMeasurer,
    template: Option<Pixmap>,
}

impl Renderer for RasterRenderer {
    fn new(config: StudioConfig) -> Result<Self>
    where
        Self: Sized,
    {
        config.validate()?;
        let bytes = std::fs::read(&config.font_path).map_err(|e| {
            Error::InitializationError(format!(
                "failed to read font {}: {}",
                config.font_path.display(),
                e
            ))
        })?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| {
                Error::InitializationError(format!(
                    "failed to parse font {}: {}",
                    config.font_path.display(),
                    e
                ))
            })?;
        let font = Arc::new(font);
        Ok(Self {
            measurer: GlyphMeasurer { font: font.clone() },
            font,
            template: None,
            config,
        })
    }

    fn load_template(&mut self) -> Result<TemplateInfo> {
        let path = &self.config.template_path;
        let pixmap = decode_to_pixmap(path)?;
        let info = TemplateInfo {
            width: pixmap.width(),
            height: pixmap.height(),
        };

        // Decorative hero image; its failure never gates anything
        if let Some(hero) = &self.config.hero_path {
            if let Err(e) = decode_to_pixmap(hero) {
                warn!("hero image failed to load: {}", e);
            }
        }

        self.template = Some(pixmap);
        Ok(info)
    }

    fn template_info(&self) -> Option<TemplateInfo> {
        self.template.as_ref().map(|p| TemplateInfo {
            width: p.width(),
            height: p.height(),
        })
    }

    fn measurer(&self) -> &dyn TextMeasurer {
        &self.measurer
    }

    fn render(&self, composite: &Composite) -> Result<Bitmap> {
        let template = self
            .template
            .as_ref()
            .ok_or_else(|| Error::AssetError("certificate template is not loaded".to_string()))?;

        let out_w = template.width() * composite.scale;
        let out_h = template.height() * composite.scale;
        let mut pixmap = Pixmap::new(out_w, out_h).ok_or_else(|| {
            Error::RenderError(format!("cannot allocate a {}x{} output bitmap", out_w, out_h))
        })?;

        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let scale = composite.scale as f32;
        pixmap.draw_pixmap(
            0,
            0,
            template.as_ref(),
            &paint,
            Transform::from_scale(scale, scale),
            None,
        );

        if !composite.name.is_empty() {
            self.draw_name(&mut pixmap, &composite.name, composite.font_px * composite.scale);
        }

        let data = pixmap
            .encode_png()
            .map_err(|e| Error::EncodeError(e.to_string()))?;
        Ok(Bitmap {
            width: out_w,
            height: out_h,
            data,
        })
    }
}

impl RasterRenderer {
    /// Draw `name` on one line, horizontally centered, with the text block
    /// vertically centered at the anchor fraction of the output height.
    /// A floored font size may still overflow; glyphs outside the bitmap
    /// are clipped, never wrapped.
    fn draw_name(&self, pixmap: &mut Pixmap, name: &str, font_px: u32) {
        let px = font_px as f32;
        let out_w = pixmap.width() as f32;
        let out_h = pixmap.height() as f32;

        let text_w = self.measurer.text_width(name, font_px);
        let (ascent, descent) = match self.font.horizontal_line_metrics(px) {
            Some(lm) => (lm.ascent, lm.descent),
            None => (px * 0.8, -px * 0.2),
        };
        let baseline_y = out_h * NAME_ANCHOR_Y + (ascent + descent) / 2.0;
        let mut pen_x = (out_w - text_w) / 2.0;

        let w = pixmap.width() as i32;
        let h = pixmap.height() as i32;
        let pixels = pixmap.pixels_mut();
        for ch in name.chars() {
            let (m, coverage) = self.font.rasterize(ch, px);
            let gx0 = (pen_x + m.xmin as f32).round() as i32;
            let gy0 = (baseline_y - m.ymin as f32 - m.height as f32).round() as i32;
            for row in 0..m.height {
                let y = gy0 + row as i32;
                if y < 0 || y >= h {
                    continue;
                }
                for col in 0..m.width {
                    let x = gx0 + col as i32;
                    if x < 0 || x >= w {
                        continue;
                    }
                    let cov = coverage[row * m.width + col];
                    if cov == 0 {
                        continue;
                    }
                    let idx = (y * w + x) as usize;
                    pixels[idx] = blend_ink(pixels[idx], NAME_RGB, cov);
                }
            }
            pen_x += m.advance_width;
        }
    }
}

/// Decode an image file into a premultiplied pixmap.
fn decode_to_pixmap(path: &Path) -> Result<Pixmap> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::AssetError(format!("{}: {}", path.display(), e)))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| Error::AssetError(format!("{}: {}", path.display(), e)))?;
    let rgba = decoded.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut pixmap = Pixmap::new(w, h)
        .ok_or_else(|| Error::AssetError(format!("{}: zero-sized image", path.display())))?;
    for (out, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *out = premultiply(r, g, b, a);
    }
    Ok(pixmap)
}

fn premultiply(r: u8, g: u8, b: u8, a: u8) -> PremultipliedColorU8 {
    let mul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
    PremultipliedColorU8::from_rgba(mul(r), mul(g), mul(b), a)
        .unwrap_or(PremultipliedColorU8::TRANSPARENT)
}

/// Source-over one ink pixel with `cov` as its alpha onto a premultiplied
/// destination pixel.
fn blend_ink(dst: PremultipliedColorU8, ink: (u8, u8, u8), cov: u8) -> PremultipliedColorU8 {
    let cov16 = cov as u16;
    let inv = 255 - cov16;
    let over = |i: u8, d: u8| ((i as u16 * cov16 + d as u16 * inv + 127) / 255) as u8;
    let r = over(ink.0, dst.red());
    let g = over(ink.1, dst.green());
    let b = over(ink.2, dst.blue());
    let a = ((cov16 * 255 + dst.alpha() as u16 * inv + 127) / 255) as u8;
    PremultipliedColorU8::from_rgba(r, g, b, a).unwrap_or(dst)
}
