//! Color parsing
//!
//! Accepts `#RGB`, `#RRGGBB`, a small named set, and `cmyk(c%, m%, y%, k%)`.
//! Invalid input resolves to `None` so the drawing operation inherits the
//! current graphics state instead of failing.

/// A resolved fill or stroke color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// Components in 0..=1.
    Rgb(f64, f64, f64),
    /// Components in 0..=1.
    Cmyk(f64, f64, f64, f64),
}

/// Parses a color string; `None` means "leave the state alone".
pub fn parse_color(input: &str) -> Option<Color> {
    let trimmed = input.trim();

    let parsed = if let Some(hex) = trimmed.strip_prefix('#') {
        parse_hex(hex)
    } else if trimmed.starts_with("cmyk(") {
        parse_cmyk(trimmed)
    } else {
        parse_named(trimmed)
    };

    if parsed.is_none() {
        tracing::warn!(color = trimmed, "unparseable color ignored");
    }
    parsed
}

fn parse_hex(hex: &str) -> Option<Color> {
    let (r, g, b) = match hex.len() {
        3 => (
            u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?,
            u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?,
            u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?,
        ),
        6 => (
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ),
        _ => return None,
    };
    Some(Color::Rgb(
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0,
    ))
}

/// `cmyk(c%, m%, y%, k%)` with percentages 0..=100.
fn parse_cmyk(input: &str) -> Option<Color> {
    let inner = input.strip_prefix("cmyk(")?.strip_suffix(')')?;
    let mut components = [0.0f64; 4];
    let mut count = 0;
    for part in inner.split(',') {
        if count == 4 {
            return None;
        }
        let value: f64 = part.trim().trim_end_matches('%').trim().parse().ok()?;
        if !(0.0..=100.0).contains(&value) {
            return None;
        }
        components[count] = value / 100.0;
        count += 1;
    }
    if count != 4 {
        return None;
    }
    Some(Color::Cmyk(
        components[0],
        components[1],
        components[2],
        components[3],
    ))
}

fn parse_named(name: &str) -> Option<Color> {
    let rgb = match name {
        "black" => (0.0, 0.0, 0.0),
        "white" => (1.0, 1.0, 1.0),
        "red" => (1.0, 0.0, 0.0),
        "green" => (0.0, 0.5, 0.0),
        "blue" => (0.0, 0.0, 1.0),
        "gold" => (1.0, 0.84, 0.0),
        _ => return None,
    };
    Some(Color::Rgb(rgb.0, rgb.1, rgb.2))
}
