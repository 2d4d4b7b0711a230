//! Standard font metrics for text measurement.
//!
//! Text watermarks are drawn with one of the non-symbolic PDF Base-14 fonts,
//! which every conforming reader provides without embedding. Widths come from
//! the Adobe AFM files in units of 1/1000 em.

/// A Base-14 font usable for watermark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardFont {
    /// Helvetica
    #[default]
    Helvetica,
    /// Helvetica-Bold
    HelveticaBold,
    /// Times-Roman
    TimesRoman,
    /// Times-Bold
    TimesBold,
    /// Courier
    Courier,
    /// Courier-Bold
    CourierBold,
}

/// Width used for characters outside the metric tables.
const MISSING_WIDTH: u16 = 500;

const HELVETICA_UPPER: [u16; 26] = [
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722, 667,
    611, 722, 667, 944, 667, 667, 611,
];
const HELVETICA_LOWER: [u16; 26] = [
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500,
];
const HELVETICA_BOLD_UPPER: [u16; 26] = [
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722, 667,
    611, 722, 667, 944, 667, 667, 611,
];
const HELVETICA_BOLD_LOWER: [u16; 26] = [
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500,
];
const TIMES_UPPER: [u16; 26] = [
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667, 556,
    611, 722, 722, 944, 722, 722, 611,
];
const TIMES_LOWER: [u16; 26] = [
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333, 389,
    278, 500, 500, 722, 500, 500, 444,
];
const TIMES_BOLD_UPPER: [u16; 26] = [
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, 611, 778, 722, 556,
    667, 722, 722, 1000, 722, 722, 667,
];
const TIMES_BOLD_LOWER: [u16; 26] = [
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, 556, 556, 444, 389,
    333, 556, 500, 722, 500, 500, 444,
];

impl StandardFont {
    /// The PostScript name used as `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
        }
    }

    /// Look a font up by its PostScript name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Helvetica" => Some(StandardFont::Helvetica),
            "Helvetica-Bold" => Some(StandardFont::HelveticaBold),
            "Times-Roman" => Some(StandardFont::TimesRoman),
            "Times-Bold" => Some(StandardFont::TimesBold),
            "Courier" => Some(StandardFont::Courier),
            "Courier-Bold" => Some(StandardFont::CourierBold),
            _ => None,
        }
    }

    fn is_times(&self) -> bool {
        matches!(self, StandardFont::TimesRoman | StandardFont::TimesBold)
    }

    fn is_bold(&self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaBold | StandardFont::TimesBold | StandardFont::CourierBold
        )
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(&self, ch: char) -> u16 {
        if matches!(self, StandardFont::Courier | StandardFont::CourierBold) {
            return 600;
        }

        let (upper, lower) = match self {
            StandardFont::Helvetica => (&HELVETICA_UPPER, &HELVETICA_LOWER),
            StandardFont::HelveticaBold => (&HELVETICA_BOLD_UPPER, &HELVETICA_BOLD_LOWER),
            StandardFont::TimesRoman => (&TIMES_UPPER, &TIMES_LOWER),
            _ => (&TIMES_BOLD_UPPER, &TIMES_BOLD_LOWER),
        };

        match ch {
            'A'..='Z' => upper[(ch as u8 - b'A') as usize],
            'a'..='z' => lower[(ch as u8 - b'a') as usize],
            '0'..='9' if self.is_times() => 500,
            '0'..='9' => 556,
            _ => self.punctuation_width(ch),
        }
    }

    fn punctuation_width(&self, ch: char) -> u16 {
        let times = self.is_times();
        let bold = self.is_bold();
        match ch {
            ' ' if times => 250,
            ' ' => 278,
            '.' | ',' if times => 250,
            '.' | ',' => 278,
            ':' | ';' if bold => 333,
            ':' | ';' => 278,
            '-' | '(' | ')' | '[' | ']' => 333,
            '!' => 333,
            '?' if times => 444,
            '?' => 556,
            '\'' => 222,
            '"' => 400,
            '/' | '\\' => 278,
            '@' => 800,
            '#' | '$' | '_' => 556,
            '%' => 889,
            '&' => 722,
            '*' => 389,
            '+' | '=' | '<' | '>' | '~' => 584,
            _ => MISSING_WIDTH,
        }
    }

    /// Width of `text` in points at `font_size`.
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        f64::from(units) * font_size / 1000.0
    }
}
