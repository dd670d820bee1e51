/// CSS color strings as used by the game server's player palette
use crate::core::error::ColorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse hex, `rgb()`/`rgba()` or a named color, case-insensitively.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let unrecognized = || ColorError::Unrecognized(input.to_string());
        let text = input.trim().to_ascii_lowercase();

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(unrecognized);
        }
        if let Some(args) = text.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
            return parse_functional(args, true).ok_or_else(unrecognized);
        }
        if let Some(args) = text.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            return parse_functional(args, false).ok_or_else(unrecognized);
        }
        named(&text).ok_or_else(unrecognized)
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_functional(args: &str, with_alpha: bool) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = if with_alpha {
        let a: f64 = parts[3].parse().ok()?;
        (a.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };
    Some(Rgba::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha))
}

fn named(name: &str) -> Option<Rgba> {
    let rgb = match name {
        "transparent" => return Some(Rgba::TRANSPARENT),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "pink" => (255, 192, 203),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "lime" => (0, 255, 0),
        "brown" => (165, 42, 42),
        "teal" => (0, 128, 128),
        "gray" | "grey" => (128, 128, 128),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "silver" => (192, 192, 192),
        "navy" => (0, 0, 128),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "gold" => (255, 215, 0),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "coral" => (255, 127, 80),
        "salmon" => (250, 128, 114),
        "crimson" => (220, 20, 60),
        "turquoise" => (64, 224, 208),
        "skyblue" => (135, 206, 235),
        "khaki" => (240, 230, 140),
        "beige" => (245, 245, 220),
        "tomato" => (255, 99, 71),
        _ => return None,
    };
    Some(Rgba::rgb(rgb.0, rgb.1, rgb.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_palette() {
        for name in [
            "red", "blue", "green", "orange", "purple", "pink", "cyan", "lime", "brown", "magenta",
            "teal", "black", "yellow",
        ] {
            assert!(Rgba::parse(name).is_ok(), "{name} should parse");
        }
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Rgba::parse("#ccc").unwrap(), Rgba::rgb(204, 204, 204));
        assert_eq!(Rgba::parse("#FF0000").unwrap(), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::parse("#00ff0080").unwrap(), Rgba::new(0, 255, 0, 128));
        assert_eq!(Rgba::parse("#0f08").unwrap(), Rgba::new(0, 255, 0, 136));
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!(Rgba::parse("rgb(1, 2, 3)").unwrap(), Rgba::rgb(1, 2, 3));
        assert_eq!(Rgba::parse("RGBA(10,20,30,0.5)").unwrap(), Rgba::new(10, 20, 30, 128));
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Rgba::parse("  Red ").unwrap(), Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            Rgba::parse("#ggg"),
            Err(ColorError::Unrecognized("#ggg".to_string()))
        );
        assert!(Rgba::parse("#12345").is_err());
        assert!(Rgba::parse("rgb(1,2)").is_err());
        assert!(Rgba::parse("notacolor").is_err());
    }
}
