//! Configuration for signing and watermarking.

use crate::geometry::Rect;
use crate::writer::TextStyle;

/// Default number of bytes reserved for the CMS signature blob.
pub const DEFAULT_SIGNATURE_RESERVE: usize = 8192;

/// Document-level settings applied by the stamping operations.
#[derive(Debug, Clone)]
pub struct StampConfig {
    /// Opacity of watermark overlays, `0.0..=1.0`.
    pub watermark_opacity: f64,

    /// Style used by `watermark_text`.
    pub text_style: TextStyle,

    /// Bytes reserved in `/Contents` for the DER-encoded signature.
    pub signature_reserve: usize,

    /// Page box assumed when a page has no resolvable `/MediaBox`.
    pub fallback_page_size: Rect,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StampConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            watermark_opacity: 1.0,
            text_style: TextStyle::default(),
            signature_reserve: DEFAULT_SIGNATURE_RESERVE,
            fallback_page_size: Rect::letter(),
        }
    }

    /// Set watermark opacity, clamped to `0.0..=1.0`.
    pub fn with_watermark_opacity(mut self, opacity: f64) -> Self {
        self.watermark_opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self
    }

    /// Set the text watermark style.
    pub fn with_text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    /// Set the signature reservation in bytes.
    pub fn with_signature_reserve(mut self, bytes: usize) -> Self {
        self.signature_reserve = bytes;
        self
    }

    /// Set the fallback page size.
    pub fn with_fallback_page_size(mut self, rect: Rect) -> Self {
        self.fallback_page_size = rect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StampConfig::new();
        assert_eq!(config.watermark_opacity, 1.0);
        assert_eq!(config.signature_reserve, DEFAULT_SIGNATURE_RESERVE);
        assert_eq!(config.fallback_page_size, Rect::letter());
    }

    #[test]
    fn test_opacity_is_clamped() {
        assert_eq!(StampConfig::new().with_watermark_opacity(1.7).watermark_opacity, 1.0);
        assert_eq!(StampConfig::new().with_watermark_opacity(-0.2).watermark_opacity, 0.0);
        assert_eq!(StampConfig::new().with_watermark_opacity(0.3).watermark_opacity, 0.3);
    }
}
