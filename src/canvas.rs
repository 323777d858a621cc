// ============================================================================
// CANVAS - drawing surface used by the share card
// ============================================================================
//
// The share card only needs to measure text, fill (rounded) rectangles and
// draw text runs. `SvgCanvas` records those calls and encodes them as an SVG
// document; text width comes from a per-glyph advance table so layout can be
// computed without a font rasterizer.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Serif,
    Sans,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f32,
    pub family: Family,
    pub bold: bool,
    pub italic: bool,
}

impl Font {
    pub fn sans(size: f32) -> Self {
        Self {
            size,
            family: Family::Sans,
            bold: false,
            italic: false,
        }
    }

    pub fn serif(size: f32) -> Self {
        Self {
            size,
            family: Family::Serif,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn scaled(mut self, factor: f32) -> Self {
        self.size *= factor;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Area {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

pub trait Canvas {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn measure_text(&self, text: &str, font: Font) -> f32;
    fn fill_rect(&mut self, area: Area, color: Rgb, radius: f32);
    /// `y` is the text baseline.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: Font, color: Rgb, align: Align);
}

/// Greedy word wrap against the canvas' measured width. A single word wider
/// than `max_width` is kept whole on its own line.
pub fn wrap_text(canvas: &dyn Canvas, text: &str, font: Font, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if canvas.measure_text(&candidate, font) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Cuts `line` so that it plus an ellipsis fits in `max_width`.
pub fn ellipsize(canvas: &dyn Canvas, line: &str, font: Font, max_width: f32) -> String {
    let mut kept: Vec<char> = line.chars().collect();
    loop {
        let candidate: String = kept.iter().collect::<String>().trim_end().to_string() + "…";
        if kept.is_empty() || canvas.measure_text(&candidate, font) <= max_width {
            return candidate;
        }
        kept.pop();
    }
}

fn advance(ch: char) -> f32 {
    match ch {
        ' ' => 0.28,
        'i' | 'l' | 'j' | '.' | ',' | '\'' | '!' | '|' | ':' | ';' | 'I' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '-' | '"' | '“' | '”' | '‘' | '’' => 0.36,
        'm' | 'w' | 'M' | 'W' | '—' | '@' => 0.86,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.56,
        c if c.is_ascii() => 0.52,
        // CJK and emoji occupy roughly a full em
        c if (c as u32) >= 0x2E80 => 1.0,
        _ => 0.56,
    }
}

pub struct SvgCanvas {
    width: f32,
    height: f32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    pub const MIME: &'static str = "image/svg+xml";

    pub fn encode(&self) -> Vec<u8> {
        let mut out = String::new();
        let _ = write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = self.width,
            h = self.height
        );
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out.into_bytes()
    }
}

impl Canvas for SvgCanvas {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn measure_text(&self, text: &str, font: Font) -> f32 {
        let em: f32 = text.chars().map(advance).sum();
        let weight = if font.bold { 1.06 } else { 1.0 };
        let family = match font.family {
            Family::Serif => 1.02,
            Family::Sans => 1.0,
        };
        em * font.size * weight * family
    }

    fn fill_rect(&mut self, area: Area, color: Rgb, radius: f32) {
        let _ = writeln!(
            self.body,
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"{:.1}\" fill=\"{}\"/>",
            area.x,
            area.y,
            area.width,
            area.height,
            radius,
            color.hex()
        );
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: Font, color: Rgb, align: Align) {
        let family = match font.family {
            Family::Serif => "Georgia, 'Times New Roman', serif",
            Family::Sans => "'Helvetica Neue', Arial, sans-serif",
        };
        let anchor = match align {
            Align::Left => "start",
            Align::Center => "middle",
        };
        let _ = writeln!(
            self.body,
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-family=\"{}\" font-size=\"{:.1}\" font-weight=\"{}\" font-style=\"{}\" text-anchor=\"{}\" fill=\"{}\">{}</text>",
            x,
            y,
            family,
            font.size,
            if font.bold { "700" } else { "400" },
            if font.italic { "italic" } else { "normal" },
            anchor,
            color.hex(),
            escape_xml(text)
        );
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wrap_breaks_on_width() {
        let canvas = SvgCanvas::new(1080.0, 1080.0);
        let font = Font::sans(40.0);
        let lines = wrap_text(&canvas, "one two three four five six seven eight", font, 300.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(canvas.measure_text(line, font) <= 300.0, "{line}");
        }
        assert_eq!(lines.join(" "), "one two three four five six seven eight");
    }

    #[test]
    fn overlong_word_stays_whole() {
        let canvas = SvgCanvas::new(1080.0, 1080.0);
        let lines = wrap_text(&canvas, "a supercalifragilistic b", Font::sans(60.0), 200.0);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn newlines_force_breaks_and_blank_text_has_no_lines() {
        let canvas = SvgCanvas::new(1080.0, 1080.0);
        let lines = wrap_text(&canvas, "first\nsecond", Font::sans(20.0), 900.0);
        assert_eq!(lines, vec!["first", "second"]);
        assert!(wrap_text(&canvas, "   ", Font::sans(20.0), 900.0).is_empty());
    }

    #[test]
    fn ellipsize_fits_width() {
        let canvas = SvgCanvas::new(1080.0, 1080.0);
        let font = Font::serif(40.0);
        let cut = ellipsize(&canvas, "a rather long closing line of text", font, 250.0);
        assert!(cut.ends_with('…'));
        assert!(canvas.measure_text(&cut, font) <= 250.0);
    }

    #[test]
    fn svg_escapes_text() {
        let mut canvas = SvgCanvas::new(100.0, 100.0);
        canvas.fill_text("Health & <Body>", 0.0, 10.0, Font::sans(10.0), Rgb(0, 0, 0), Align::Left);
        let svg = String::from_utf8(canvas.encode()).unwrap();
        assert!(svg.contains("Health &amp; &lt;Body&gt;"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    proptest! {
        #[test]
        fn wrapped_lines_fit_unless_single_word(text in "[a-z]{1,12}( [a-z]{1,12}){0,30}", width in 120f32..900f32) {
            let canvas = SvgCanvas::new(1080.0, 1080.0);
            let font = Font::sans(32.0);
            let lines = wrap_text(&canvas, &text, font, width);
            for line in &lines {
                prop_assert!(canvas.measure_text(line, font) <= width || !line.contains(' '));
            }
            prop_assert_eq!(lines.join(" "), text);
        }
    }
}
