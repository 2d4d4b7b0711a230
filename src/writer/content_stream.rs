//! PDF content stream builder.
//!
//! Builds the small drawing programs carried by overlay appearances: graphics
//! state, transforms, XObject painting, filled paths and single-line text
//! (ISO 32000-1:2008 Sections 8 and 9).

use crate::error::Result;
use std::io::Write;

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
}

impl Color {
    /// Create a color from components in `0.0..=1.0`.
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Black
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Mid gray, the default watermark text color.
    pub fn gray() -> Self {
        Self::rgb(0.5, 0.5, 0.5)
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(
            f64::from(channel(0)?) / 255.0,
            f64::from(channel(2)?) / 255.0,
            f64::from(channel(4)?) / 255.0,
        ))
    }
}

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Set transformation matrix (cm)
    Transform([f64; 6]),
    /// Set graphics state from ExtGState dictionary (gs)
    SetExtGState(String),
    /// Paint XObject (Do)
    PaintXObject(String),
    /// Set fill color RGB (rg)
    SetFillColorRGB(f64, f64, f64),
    /// Set stroke color RGB (RG)
    SetStrokeColorRGB(f64, f64, f64),
    /// Set line width (w)
    SetLineWidth(f64),
    /// Move to (m)
    MoveTo(f64, f64),
    /// Line to (l)
    LineTo(f64, f64),
    /// Curve to (c)
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Rectangle (re)
    Rectangle(f64, f64, f64, f64),
    /// Close path (h)
    ClosePath,
    /// Fill (f)
    Fill,
    /// Stroke (S)
    Stroke,
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font and size (Tf)
    SetFont(String, f64),
    /// Move text position (Td)
    MoveText(f64, f64),
    /// Show text (Tj) - literal string
    ShowText(String),
}

/// Builder for PDF content streams.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    operations: Vec<ContentStreamOp>,
    in_text_object: bool,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Operations recorded so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    // === Graphics State Methods ===

    /// Save the current graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
    }

    /// Restore the previous graphics state.
    pub fn restore_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::RestoreState)
    }

    /// Set extended graphics state (used for transparency).
    ///
    /// The `gs_name` must name an ExtGState entry in the stream's resources.
    pub fn set_ext_gstate(&mut self, gs_name: &str) -> &mut Self {
        self.op(ContentStreamOp::SetExtGState(gs_name.to_string()))
    }

    /// Apply a transformation matrix `[a b c d e f]`.
    pub fn transform(&mut self, matrix: [f64; 6]) -> &mut Self {
        self.op(ContentStreamOp::Transform(matrix))
    }

    /// Paint the named XObject.
    pub fn paint_xobject(&mut self, name: &str) -> &mut Self {
        self.op(ContentStreamOp::PaintXObject(name.to_string()))
    }

    // === Path Methods ===

    /// Set the fill color.
    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        self.op(ContentStreamOp::SetFillColorRGB(color.r, color.g, color.b))
    }

    /// Set the stroke color.
    pub fn stroke_color(&mut self, color: Color) -> &mut Self {
        self.op(ContentStreamOp::SetStrokeColorRGB(color.r, color.g, color.b))
    }

    /// Set the line width.
    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.op(ContentStreamOp::SetLineWidth(width))
    }

    /// Begin a subpath.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(ContentStreamOp::MoveTo(x, y))
    }

    /// Append a straight segment.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(ContentStreamOp::LineTo(x, y))
    }

    /// Append a cubic Bezier segment.
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> &mut Self {
        self.op(ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3))
    }

    /// Append a rectangle subpath.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.op(ContentStreamOp::Rectangle(x, y, width, height))
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) -> &mut Self {
        self.op(ContentStreamOp::ClosePath)
    }

    /// Fill the current path.
    pub fn fill(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Fill)
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) -> &mut Self {
        self.op(ContentStreamOp::Stroke)
    }

    /// Append a rounded rectangle subpath.
    ///
    /// A radius of zero produces a plain rectangle.
    pub fn rounded_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64) -> &mut Self {
        let r = radius.max(0.0).min(width / 2.0).min(height / 2.0);
        if r == 0.0 {
            return self.rect(x, y, width, height);
        }
        let k = r * 0.552_284_8;

        self.move_to(x + r, y)
            .line_to(x + width - r, y)
            .curve_to(x + width - r + k, y, x + width, y + r - k, x + width, y + r)
            .line_to(x + width, y + height - r)
            .curve_to(
                x + width,
                y + height - r + k,
                x + width - r + k,
                y + height,
                x + width - r,
                y + height,
            )
            .line_to(x + r, y + height)
            .curve_to(x + r - k, y + height, x, y + height - r + k, x, y + height - r)
            .line_to(x, y + r)
            .curve_to(x, y + r - k, x + r - k, y, x + r, y)
            .close_path()
    }

    // === Text Methods ===

    /// Begin a text object.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text_object {
            self.op(ContentStreamOp::BeginText);
            self.in_text_object = true;
        }
        self
    }

    /// End a text object.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text_object {
            self.op(ContentStreamOp::EndText);
            self.in_text_object = false;
        }
        self
    }

    /// Select a font resource and size.
    pub fn set_font(&mut self, resource_name: &str, size: f64) -> &mut Self {
        self.op(ContentStreamOp::SetFont(resource_name.to_string(), size))
    }

    /// Show `text` with its baseline origin at (`x`, `y`).
    pub fn text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        self.begin_text();
        self.op(ContentStreamOp::MoveText(x, y));
        self.op(ContentStreamOp::ShowText(text.to_string()))
    }

    /// Build the content stream to bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        for op in &self.operations {
            write_op(&mut buf, op)?;
            writeln!(buf)?;
        }

        Ok(buf)
    }
}

/// Format a number the way PDF operands are usually written: no exponent,
/// at most four decimals, no trailing zeros.
pub fn format_number(value: f64) -> String {
    let mut s = format!("{:.4}", value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

fn write_numbers<W: Write>(w: &mut W, values: &[f64]) -> std::io::Result<()> {
    for v in values {
        write!(w, "{} ", format_number(*v))?;
    }
    Ok(())
}

/// Write a single operation to the buffer.
fn write_op<W: Write>(w: &mut W, op: &ContentStreamOp) -> std::io::Result<()> {
    match op {
        ContentStreamOp::SaveState => write!(w, "q"),
        ContentStreamOp::RestoreState => write!(w, "Q"),
        ContentStreamOp::Transform(m) => {
            write_numbers(w, m)?;
            write!(w, "cm")
        },
        ContentStreamOp::SetExtGState(name) => write!(w, "/{} gs", name),
        ContentStreamOp::PaintXObject(name) => write!(w, "/{} Do", name),
        ContentStreamOp::SetFillColorRGB(r, g, b) => {
            write_numbers(w, &[*r, *g, *b])?;
            write!(w, "rg")
        },
        ContentStreamOp::SetStrokeColorRGB(r, g, b) => {
            write_numbers(w, &[*r, *g, *b])?;
            write!(w, "RG")
        },
        ContentStreamOp::SetLineWidth(width) => write!(w, "{} w", format_number(*width)),
        ContentStreamOp::MoveTo(x, y) => {
            write_numbers(w, &[*x, *y])?;
            write!(w, "m")
        },
        ContentStreamOp::LineTo(x, y) => {
            write_numbers(w, &[*x, *y])?;
            write!(w, "l")
        },
        ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3) => {
            write_numbers(w, &[*x1, *y1, *x2, *y2, *x3, *y3])?;
            write!(w, "c")
        },
        ContentStreamOp::Rectangle(x, y, width, height) => {
            write_numbers(w, &[*x, *y, *width, *height])?;
            write!(w, "re")
        },
        ContentStreamOp::ClosePath => write!(w, "h"),
        ContentStreamOp::Fill => write!(w, "f"),
        ContentStreamOp::Stroke => write!(w, "S"),
        ContentStreamOp::BeginText => write!(w, "BT"),
        ContentStreamOp::EndText => write!(w, "ET"),
        ContentStreamOp::SetFont(name, size) => write!(w, "/{} {} Tf", name, format_number(*size)),
        ContentStreamOp::MoveText(tx, ty) => {
            write_numbers(w, &[*tx, *ty])?;
            write!(w, "Td")
        },
        ContentStreamOp::ShowText(text) => {
            write!(w, "(")?;
            write_escaped_string(w, text)?;
            write!(w, ") Tj")
        },
    }
}

/// Write an escaped PDF literal string.
///
/// Characters outside Latin-1 cannot be shown with a standard encoding and
/// are replaced by `?`.
fn write_escaped_string<W: Write>(w: &mut W, text: &str) -> std::io::Result<()> {
    for ch in text.chars() {
        let byte = if (ch as u32) < 256 { ch as u32 as u8 } else { b'?' };
        match byte {
            b'(' => write!(w, "\\(")?,
            b')' => write!(w, "\\)")?,
            b'\\' => write!(w, "\\\\")?,
            b'\n' => write!(w, "\\n")?,
            b'\r' => write!(w, "\\r")?,
            b'\t' => write!(w, "\\t")?,
            _ => w.write_all(&[byte])?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(builder: &ContentStreamBuilder) -> String {
        String::from_utf8_lossy(&builder.build().unwrap()).into_owned()
    }

    #[test]
    fn test_simple_text() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .begin_text()
            .set_font("F1", 12.0)
            .text("Hello, World!", 72.0, 720.0)
            .end_text();

        let content = render(&builder);
        assert!(content.contains("BT"));
        assert!(content.contains("/F1 12 Tf"));
        assert!(content.contains("72 720 Td"));
        assert!(content.contains("(Hello, World!) Tj"));
        assert!(content.contains("ET"));
    }

    #[test]
    fn test_escapes_parentheses() {
        let mut builder = ContentStreamBuilder::new();
        builder.text("a(b)c\\", 0.0, 0.0).end_text();
        assert!(render(&builder).contains("(a\\(b\\)c\\\\) Tj"));
    }

    #[test]
    fn test_xobject_placement_program() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .save_state()
            .set_ext_gstate("GS0")
            .transform([100.0, 0.0, 0.0, 50.0, 256.0, 371.0])
            .paint_xobject("abc")
            .restore_state();

        let content = render(&builder);
        assert_eq!(content, "q\n/GS0 gs\n100 0 0 50 256 371 cm\n/abc Do\nQ\n");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(format_number(1.0e-7), "0");
        assert_eq!(format_number(612.123456), "612.1235");
    }

    #[test]
    fn test_rounded_rect_with_zero_radius_is_rectangle() {
        let mut builder = ContentStreamBuilder::new();
        builder.rounded_rect(0.0, 0.0, 10.0, 20.0, 0.0);
        assert_eq!(builder.operations(), &[ContentStreamOp::Rectangle(0.0, 0.0, 10.0, 20.0)]);
    }

    #[test]
    fn test_rounded_rect_has_four_corners() {
        let mut builder = ContentStreamBuilder::new();
        builder.rounded_rect(0.0, 0.0, 100.0, 40.0, 8.0);
        let curves = builder
            .operations()
            .iter()
            .filter(|op| matches!(op, ContentStreamOp::CurveTo(..)))
            .count();
        assert_eq!(curves, 4);
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#ffffff"), Some(Color::white()));
        assert_eq!(Color::from_hex("000000"), Some(Color::black()));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("zzzzzz"), None);
    }
}
