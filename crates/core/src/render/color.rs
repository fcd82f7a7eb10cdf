use anyhow::{anyhow, bail};
use log::warn;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use strum::{EnumIter, EnumString};

/// An RGBA color, 8 bits per channel. Colors can be parsed from a handful of
/// common names (see [NamedColor]) or from hex codes: `#rgb`, `#rrggbb` or
/// `#rrggbbaa`.
///
/// Anything that accepts user input should go through
/// [Color::parse_or_default], so a typo in a color never kills a render.
/// Deserialization does the same.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Create a fully opaque color
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, u8::MAX)
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Parse a color, falling back to the default (black) if the text isn't
    /// a valid color. A warning is logged on fallback.
    pub fn parse_or_default(text: &str) -> Self {
        match text.parse() {
            Ok(color) => color,
            Err(err) => {
                let fallback = Self::default();
                warn!(
                    "{:#}, falling back to {}",
                    err,
                    fallback.to_html_rgb()
                );
                fallback
            }
        }
    }

    /// Parse the part of a hex color code after the `#`
    fn from_hex(hex: &str) -> anyhow::Result<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("invalid hex color #{}", hex);
        }

        // All chars are ASCII now, so byte offsets are char offsets
        let channel = |i: usize, len: usize| -> u8 {
            let value = u8::from_str_radix(&hex[i * len..(i + 1) * len], 16)
                // Can't fail, we already checked every digit
                .unwrap_or_default();
            if len == 1 {
                // #abc is shorthand for #aabbcc
                value * 17
            } else {
                value
            }
        };
        match hex.len() {
            3 => Ok(Self::rgb(channel(0, 1), channel(1, 1), channel(2, 1))),
            6 => Ok(Self::rgb(channel(0, 2), channel(1, 2), channel(2, 2))),
            8 => Ok(Self::rgba(
                channel(0, 2),
                channel(1, 2),
                channel(2, 2),
                channel(3, 2),
            )),
            n => bail!(
                "invalid hex color #{}: expected 3, 6 or 8 digits, got {}",
                hex,
                n
            ),
        }
    }

    /// Convert this color to an HTML color code, **ignoring** alpha:
    /// `#rrggbb`
    pub fn to_html_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Convert this color to an HTML color code. Alpha is only included if
    /// the color isn't fully opaque: `#rrggbb` or `#rrggbbaa`
    pub fn to_html(self) -> String {
        if self.alpha == u8::MAX {
            self.to_html_rgb()
        } else {
            format!("{}{:02x}", self.to_html_rgb(), self.alpha)
        }
    }

    /// Get the alpha channel as a fraction in `[0, 1]`
    pub fn opacity(self) -> f64 {
        self.alpha as f64 / u8::MAX as f64
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_html())
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> anyhow::Result<Self> {
        let text = text.trim().to_ascii_lowercase();
        match text.strip_prefix('#') {
            Some(hex) => Self::from_hex(hex),
            None => text
                .parse::<NamedColor>()
                .map(NamedColor::color)
                .map_err(|_| anyhow!("unknown color {:?}", text)),
        }
    }
}

/// Colors that can be referred to by name
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum NamedColor {
    Black,
    White,
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    #[strum(serialize = "gray", serialize = "grey")]
    Gray,
    Orange,
    Purple,
    Brown,
    Transparent,
}

impl NamedColor {
    pub fn color(self) -> Color {
        match self {
            Self::Black => Color::rgb(0, 0, 0),
            Self::White => Color::rgb(255, 255, 255),
            Self::Red => Color::rgb(255, 0, 0),
            // Matches CSS, where "green" is the darker half-intensity green
            Self::Green => Color::rgb(0, 128, 0),
            Self::Blue => Color::rgb(0, 0, 255),
            Self::Yellow => Color::rgb(255, 255, 0),
            Self::Cyan => Color::rgb(0, 255, 255),
            Self::Magenta => Color::rgb(255, 0, 255),
            Self::Gray => Color::rgb(128, 128, 128),
            Self::Orange => Color::rgb(255, 165, 0),
            Self::Purple => Color::rgb(128, 0, 128),
            Self::Brown => Color::rgb(165, 42, 42),
            Self::Transparent => Color::rgba(0, 0, 0, 0),
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_html())
    }
}

/// Colors are deserialized leniently: anything that isn't a valid color
/// string becomes the default color, with a warning.
impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ColorVisitor;

        impl<'de> Visitor<'de> for ColorVisitor {
            type Value = Color;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a color name or hex code")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Color::parse_or_default(value))
            }
        }

        deserializer.deserialize_str(ColorVisitor)
    }
}
