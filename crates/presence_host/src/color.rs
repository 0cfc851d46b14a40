//! Hex color decoding and contrast selection for diagnostic theming.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// 8-bit RGB triple.
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Perceived brightness class of a background color.
pub enum Brightness {
    /// Light background; dark text reads best.
    Light,
    /// Dark background; light text reads best.
    Dark,
}

impl Brightness {
    /// Returns the CSS foreground color legible on this background.
    pub const fn foreground(self) -> &'static str {
        match self {
            Self::Light => "black",
            Self::Dark => "white",
        }
    }
}

/// Decodes `#rgb`, `#rrggbb`, `rgb`, or `rrggbb` (any case). Returns `None` otherwise.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |at: usize| u8::from_str_radix(&expanded[at..at + 2], 16).ok();
    Some(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// HSP perceived brightness: `sqrt(0.299 r² + 0.587 g² + 0.114 b²)`, in `0.0..=255.0`.
pub fn perceived_brightness(rgb: Rgb) -> f64 {
    let (r, g, b) = (f64::from(rgb.r), f64::from(rgb.g), f64::from(rgb.b));
    (0.299 * r * r + 0.587 * g * g + 0.114 * b * b).sqrt()
}

/// Classifies a hex background color; brighter than `127.5` is [`Brightness::Light`].
pub fn contrast_color(hex: &str) -> Option<Brightness> {
    let hsp = perceived_brightness(hex_to_rgb(hex)?);
    Some(if hsp > 127.5 {
        Brightness::Light
    } else {
        Brightness::Dark
    })
}
