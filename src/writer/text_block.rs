//! Styled text blocks rendered as Form XObjects.
//!
//! A text watermark is drawn once as a self-contained block (optional
//! background, optional rounded border, one line of text) and then placed on
//! every page like any other shared resource.

use super::content_stream::{Color, ContentStreamBuilder};
use super::font_manager::StandardFont;
use crate::error::{Error, Result};
use crate::geometry::Size;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Fixed vertical slack added to every text block, in points.
pub const TEXT_BLOCK_SLACK: f64 = 10.0;

/// Font resource name inside the block's own resources.
const FONT_RESOURCE: &str = "F1";

/// Appearance of a text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Base-14 font used for the text
    pub font: StandardFont,
    /// Font size in points
    pub font_size: f64,
    /// Text color
    pub color: Color,
    /// Fill behind the text, none for a transparent block
    pub background: Option<Color>,
    /// Border stroke color
    pub border_color: Color,
    /// Border stroke width; zero disables the border
    pub border_width: f64,
    /// Space between border and text
    pub padding: f64,
    /// Radius of the rounded corners
    pub corner_radius: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: StandardFont::HelveticaBold,
            font_size: 48.0,
            color: Color::gray(),
            background: None,
            border_color: Color::gray(),
            border_width: 2.0,
            padding: 8.0,
            corner_radius: 6.0,
        }
    }
}

impl TextStyle {
    /// Set font and size.
    pub fn with_font(mut self, font: StandardFont, size: f64) -> Self {
        self.font = font;
        self.font_size = size;
        self
    }

    /// Set text color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the background fill.
    pub fn with_background(mut self, color: Option<Color>) -> Self {
        self.background = color;
        self
    }

    /// Set the border.
    pub fn with_border(mut self, width: f64, color: Color) -> Self {
        self.border_width = width;
        self.border_color = color;
        self
    }

    /// Set padding.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set corner radius.
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    fn validate(&self) -> Result<()> {
        let numbers = [self.font_size, self.border_width, self.padding, self.corner_radius];
        if numbers.iter().any(|v| !v.is_finite() || *v < 0.0) || self.font_size == 0.0 {
            return Err(Error::InvalidArgument(
                "text style needs a positive font size and non-negative spacing".to_string(),
            ));
        }
        Ok(())
    }
}

/// One line of styled text, measured and ready to render.
#[derive(Debug, Clone)]
pub struct TextBlock {
    text: String,
    style: TextStyle,
    size: Size,
}

impl TextBlock {
    /// Measure `text` in `style`.
    ///
    /// Width is the measured text width plus padding and border on both
    /// sides; height is the font size plus the same insets and a fixed slack.
    pub fn new(text: &str, style: &TextStyle) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::InvalidArgument("watermark text is empty".to_string()));
        }
        style.validate()?;

        let inset = 2.0 * (style.padding + style.border_width);
        let size = Size::new(
            style.font.text_width(text, style.font_size) + inset,
            style.font_size + inset + TEXT_BLOCK_SLACK,
        );

        Ok(Self {
            text: text.to_string(),
            style: style.clone(),
            size,
        })
    }

    /// Outer size of the block.
    pub fn size(&self) -> Size {
        self.size
    }

    /// The content stream drawing the block inside `[0 0 width height]`.
    pub fn content(&self) -> Result<Vec<u8>> {
        let style = &self.style;
        let half = style.border_width / 2.0;
        let (w, h) = (self.size.width, self.size.height);

        let mut builder = ContentStreamBuilder::new();
        builder.save_state();

        if let Some(background) = style.background {
            builder
                .fill_color(background)
                .rounded_rect(half, half, w - style.border_width, h - style.border_width, style.corner_radius)
                .fill();
        }

        if style.border_width > 0.0 {
            builder
                .stroke_color(style.border_color)
                .set_line_width(style.border_width)
                .rounded_rect(half, half, w - style.border_width, h - style.border_width, style.corner_radius)
                .stroke();
        }

        // Baseline sits above the descender inside the slack band.
        let inset = style.padding + style.border_width;
        let baseline = inset + TEXT_BLOCK_SLACK / 2.0 + style.font_size * 0.2;

        builder
            .fill_color(style.color)
            .begin_text()
            .set_font(FONT_RESOURCE, style.font_size)
            .text(&self.text, inset, baseline)
            .end_text()
            .restore_state();

        builder.build()
    }

    /// Write the block as a Form XObject and return its object id.
    pub fn add_to_document(&self, doc: &mut Document) -> Result<ObjectId> {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.style.font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => bbox(self.size),
            "Resources" => dictionary! {
                "Font" => dictionary! { FONT_RESOURCE => Object::Reference(font_id) },
            },
        };

        Ok(doc.add_object(Stream::new(dict, self.content()?)))
    }
}

/// `[0 0 width height]` as a PDF array.
pub(crate) fn bbox(size: Size) -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(size.width as f32),
        Object::Real(size.height as f32),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_size_formula() {
        let style = TextStyle::default()
            .with_font(StandardFont::Courier, 20.0)
            .with_padding(5.0)
            .with_border(1.0, Color::black());
        let block = TextBlock::new("ABCD", &style).unwrap();

        // Courier: 4 glyphs * 600/1000 * 20pt = 48pt
        assert!((block.size().width - (48.0 + 12.0)).abs() < 1e-9);
        assert!((block.size().height - (20.0 + 12.0 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_is_rejected() {
        assert!(matches!(
            TextBlock::new("", &TextStyle::default()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_zero_font_size_is_rejected() {
        let style = TextStyle::default().with_font(StandardFont::Helvetica, 0.0);
        assert!(TextBlock::new("x", &style).is_err());
    }

    #[test]
    fn test_content_draws_background_border_and_text() {
        let style = TextStyle::default().with_background(Some(Color::white()));
        let block = TextBlock::new("DRAFT", &style).unwrap();
        let content = String::from_utf8(block.content().unwrap()).unwrap();

        assert!(content.contains("1 1 1 rg"));
        assert!(content.contains("\nf\n"));
        assert!(content.contains("2 w"));
        assert!(content.contains("\nS\n"));
        assert!(content.contains("/F1 48 Tf"));
        assert!(content.contains("(DRAFT) Tj"));
    }

    #[test]
    fn test_borderless_block_has_no_stroke() {
        let style = TextStyle::default().with_border(0.0, Color::black());
        let block = TextBlock::new("x", &style).unwrap();
        let content = String::from_utf8(block.content().unwrap()).unwrap();
        assert!(!content.contains("\nS\n"));
    }

    #[test]
    fn test_form_xobject_has_font_resource() {
        let mut doc = Document::with_version("1.7");
        let block = TextBlock::new("Secret", &TextStyle::default()).unwrap();
        let id = block.add_to_document(&mut doc).unwrap();

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        let resources = stream.dict.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"));
    }
}
