//! CSS-style color strings to linear RGBA.
//!
//! Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` and a handful of named
//! colors. Components are returned in `0.0..=1.0`.

use std::fmt;

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0x00, 0x00, 0x00]),
    ("white", [0xff, 0xff, 0xff]),
    ("gray", [0x80, 0x80, 0x80]),
    ("grey", [0x80, 0x80, 0x80]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("red", [0xff, 0x00, 0x00]),
    ("green", [0x00, 0x80, 0x00]),
    ("blue", [0x00, 0x00, 0xff]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
];

/// Parse a color string into `[r, g, b, a]`.
///
/// # Errors
///
/// Returns [`ColorParseError`] for anything that is not a supported hex
/// form or a known name.
pub fn parse_color(input: &str) -> Result<[f32; 4], ColorParseError> {
    let trimmed = input.trim();
    let err = || ColorParseError(input.to_owned());

    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        // Short forms repeat each digit: #3a0 -> #33aa00.
        let (width, scale) = match hex.len() {
            3 | 4 => (1, 17),
            6 | 8 => (2, 1),
            _ => return Err(err()),
        };
        let bytes = (0..hex.len())
            .step_by(width)
            .map(|i| u8::from_str_radix(&hex[i..i + width], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| err())?
            .into_iter()
            .map(|c| c * scale)
            .collect::<Vec<u8>>();
        let alpha = bytes.get(3).copied().unwrap_or(0xff);
        return Ok(to_unit([bytes[0], bytes[1], bytes[2], alpha]));
    }

    let lower = trimmed.to_ascii_lowercase();
    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, [r, g, b])| to_unit([*r, *g, *b, 0xff]))
        .ok_or_else(err)
}

fn to_unit(rgba: [u8; 4]) -> [f32; 4] {
    rgba.map(|c| f32::from(c) / 255.0)
}

/// A color string that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized color: {:?}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn short_hex_expands() {
        let dark = parse_color("#333").unwrap();
        assert!(close(dark, [0.2, 0.2, 0.2, 1.0]));
        let light = parse_color("#ccc").unwrap();
        assert!(close(light, [0.8, 0.8, 0.8, 1.0]));
    }

    #[test]
    fn long_hex_with_alpha() {
        let c = parse_color("#ff000080").unwrap();
        assert!(close(c, [1.0, 0.0, 0.0, 128.0 / 255.0]));
        assert!(close(parse_color(" #00FF00 ").unwrap(), [0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn named_colors_are_case_insensitive() {
        assert!(close(parse_color("White").unwrap(), [1.0; 4]));
        assert_eq!(parse_color("grey"), parse_color("gray"));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#", "#12", "#12345", "#ggg", "chartreuse-ish", "333"] {
            let err = parse_color(bad).unwrap_err();
            assert_eq!(err.0, bad);
        }
    }
}
