use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{ShortsError, ShortsResult};

/// A fill color as supplied by clients.
///
/// `Transparent` is a sentinel, not a zero-alpha color: a transparent plate is never drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpec {
    Solid(Rgba8),
    Transparent,
}

impl ColorSpec {
    pub const WHITE: ColorSpec = ColorSpec::Solid(Rgba8::WHITE);

    /// Parse `transparent`, a CSS color name, `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(..)` or
    /// `rgba(..)`.
    pub fn parse(s: &str) -> ShortsResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ShortsError::validation("color must be non-empty"));
        }
        if s == "transparent" || s == "none" {
            return Ok(Self::Transparent);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map(Self::Solid);
        }
        if let Some(args) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            return parse_rgb_fn(args, true).map(Self::Solid);
        }
        if let Some(args) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            return parse_rgb_fn(args, false).map(Self::Solid);
        }
        named(&s)
            .map(Self::Solid)
            .ok_or_else(|| ShortsError::validation(format!("unknown color \"{s}\"")))
    }

    /// The solid color, or `None` for the transparent sentinel.
    pub fn solid(self) -> Option<Rgba8> {
        match self {
            Self::Solid(c) => Some(c),
            Self::Transparent => None,
        }
    }

    /// Like [`ColorSpec::parse`] but rejects the transparent sentinel.
    pub fn parse_solid(s: &str, what: &str) -> ShortsResult<Rgba8> {
        Self::parse(s)?
            .solid()
            .ok_or_else(|| ShortsError::validation(format!("{what} must not be transparent")))
    }
}

impl FromStr for ColorSpec {
    type Err = ShortsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transparent => f.write_str("transparent"),
            Self::Solid(c) => write!(f, "#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a),
        }
    }
}

impl serde::Serialize for ColorSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ColorSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(s: &str) -> ShortsResult<Rgba8> {
    fn hex_byte(pair: &str) -> ShortsResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| ShortsError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(ShortsError::validation("hex color must be ascii"));
    }

    match s.len() {
        3 => {
            let r = hex_byte(&s[0..1].repeat(2))?;
            let g = hex_byte(&s[1..2].repeat(2))?;
            let b = hex_byte(&s[2..3].repeat(2))?;
            Ok(Rgba8::opaque(r, g, b))
        }
        6 => Ok(Rgba8::opaque(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Rgba8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err(ShortsError::validation(
            "hex color must be #RGB, #RRGGBB or #RRGGBBAA",
        )),
    }
}

fn parse_rgb_fn(args: &str, with_alpha: bool) -> ShortsResult<Rgba8> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(ShortsError::validation(format!(
            "color function expects {expected} components"
        )));
    }

    let channel = |p: &str| -> ShortsResult<u8> {
        p.parse::<u8>()
            .map_err(|_| ShortsError::validation(format!("invalid color channel \"{p}\"")))
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if with_alpha {
        let v: f64 = parts[3]
            .parse()
            .map_err(|_| ShortsError::validation(format!("invalid alpha \"{}\"", parts[3])))?;
        if !(0.0..=255.0).contains(&v) {
            return Err(ShortsError::validation("alpha must be within 0..=1 or 0..=255"));
        }
        // Values up to 1 are CSS fractions; anything above is a byte value.
        if v <= 1.0 {
            (v * 255.0).round() as u8
        } else {
            v.round() as u8
        }
    } else {
        255
    };
    Ok(Rgba8::new(r, g, b, a))
}

fn named(s: &str) -> Option<Rgba8> {
    let c = match s {
        "black" => Rgba8::opaque(0, 0, 0),
        "white" => Rgba8::opaque(255, 255, 255),
        "red" => Rgba8::opaque(255, 0, 0),
        "green" => Rgba8::opaque(0, 128, 0),
        "lime" => Rgba8::opaque(0, 255, 0),
        "blue" => Rgba8::opaque(0, 0, 255),
        "yellow" => Rgba8::opaque(255, 255, 0),
        "cyan" | "aqua" => Rgba8::opaque(0, 255, 255),
        "magenta" | "fuchsia" => Rgba8::opaque(255, 0, 255),
        "gray" | "grey" => Rgba8::opaque(128, 128, 128),
        "darkgray" | "darkgrey" => Rgba8::opaque(169, 169, 169),
        "lightgray" | "lightgrey" => Rgba8::opaque(211, 211, 211),
        "silver" => Rgba8::opaque(192, 192, 192),
        "orange" => Rgba8::opaque(255, 165, 0),
        "purple" => Rgba8::opaque(128, 0, 128),
        "pink" => Rgba8::opaque(255, 192, 203),
        "brown" => Rgba8::opaque(165, 42, 42),
        "navy" => Rgba8::opaque(0, 0, 128),
        "maroon" => Rgba8::opaque(128, 0, 0),
        "olive" => Rgba8::opaque(128, 128, 0),
        "teal" => Rgba8::opaque(0, 128, 128),
        "gold" => Rgba8::opaque(255, 215, 0),
        "skyblue" => Rgba8::opaque(135, 206, 235),
        "violet" => Rgba8::opaque(238, 130, 238),
        "indigo" => Rgba8::opaque(75, 0, 130),
        "coral" => Rgba8::opaque(255, 127, 80),
        "crimson" => Rgba8::opaque(220, 20, 60),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
