//! Fit-to-width text sizing.
//!
//! The sizer finds the largest font size, walking down from the configured
//! maximum in fixed steps, at which a name still fits a single line inside
//! the available width of the certificate. Measurement is behind the
//! [`TextMeasurer`] trait so backends can supply real glyph advances while
//! tests use a deterministic estimate.

use serde::{Deserialize, Serialize};

/// Default maximum font size in pixels.
pub const MAX_FONT_PX: u32 = 42;
/// Default minimum (floor) font size in pixels.
pub const MIN_FONT_PX: u32 = 16;
/// Default step between candidate sizes.
pub const FONT_STEP_PX: u32 = 2;
/// Default fraction of the template width available to the name.
pub const WIDTH_FRACTION: f32 = 0.8;

/// Single-line text measurement.
///
/// The only contract is that for a fixed string the returned width is
/// monotonically non-increasing as the font size decreases, which holds for
/// any sane text layout.
pub trait TextMeasurer {
    /// Width in pixels of `text` laid out on one line at `font_px`.
    fn text_width(&self, text: &str, font_px: u32) -> f32;
}

/// Sizing policy: bounds, step, and the width fraction granted to the name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingPolicy {
    pub max_px: u32,
    pub min_px: u32,
    pub step_px: u32,
    pub width_fraction: f32,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            max_px: MAX_FONT_PX,
            min_px: MIN_FONT_PX,
            step_px: FONT_STEP_PX,
            width_fraction: WIDTH_FRACTION,
        }
    }
}

impl SizingPolicy {
    /// The width in pixels available to the name for a template of
    /// `template_width` pixels.
    pub fn available_width(&self, template_width: u32) -> f32 {
        template_width as f32 * self.width_fraction
    }
}

/// Find the largest font size at which `text` fits `available_width`.
///
/// Linear search from `policy.max_px` downward in `policy.step_px`
/// decrements. The floor is accepted even when the text still overflows at
/// that size; there is no wrapping or truncation. Empty and whitespace-only
/// text trivially fits, so the maximum is returned.
pub fn fit_font_size(
    measurer: &dyn TextMeasurer,
    text: &str,
    available_width: f32,
    policy: &SizingPolicy,
) -> u32 {
    let mut size = policy.max_px;
    while size > policy.min_px && measurer.text_width(text, size) > available_width {
        size = size.saturating_sub(policy.step_px).max(policy.min_px);
    }
    size
}

/// Deterministic per-character advance estimate.
///
/// Advances are a fraction of the font size, bucketed by rough character
/// class. Widths scale linearly with the font size, which keeps the
/// monotonicity contract trivially true. The metrics backend and the unit
/// tests use this; the raster backend measures real glyph advances instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasurer;

impl HeuristicMeasurer {
    fn advance_fraction(c: char) -> f32 {
        match c {
            ' ' => 0.28,
            'i' | 'l' | 'j' | 't' | 'f' | '.' | ',' | '\'' | '!' | '|' => 0.30,
            'm' | 'w' => 0.82,
            'M' | 'W' | '@' => 0.92,
            c if c.is_ascii_uppercase() => 0.70,
            c if c.is_ascii_digit() => 0.55,
            _ => 0.52,
        }
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn text_width(&self, text: &str, font_px: u32) -> f32 {
        let em: f32 = text.chars().map(Self::advance_fraction).sum();
        em * font_px as f32
    }
}
