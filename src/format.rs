use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::color::Color;

/// The six supported output encodings for a color.
///
/// Formats without an alpha component discard it on emit, which makes the
/// `opacity` transform a documented no-op for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    Hex6,
    Hex8,
    Rgb,
    Rgba,
    RgbDecimal,
    RgbaDecimal,
}

pub const FORMAT_NAMES: [&str; 6] = ["hex6", "hex8", "rgb", "rgba", "rgb_decimal", "rgba_decimal"];

impl ColorFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hex6 => "hex6",
            Self::Hex8 => "hex8",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
            Self::RgbDecimal => "rgb_decimal",
            Self::RgbaDecimal => "rgba_decimal",
        }
    }

    /// Whether the encoding carries the alpha channel.
    pub fn preserves_alpha(&self) -> bool {
        matches!(self, Self::Hex8 | Self::Rgba | Self::RgbaDecimal)
    }

    /// Emit `color` in this format.
    pub fn emit(&self, color: &Color) -> String {
        let [r, g, b] = color.rgb();
        let alpha = color.alpha();
        match self {
            Self::Hex6 => format!("#{r:02x}{g:02x}{b:02x}"),
            Self::Hex8 => {
                let a = (alpha * 255.0).round_ties_even() as u8;
                format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
            }
            Self::Rgb => format!("rgb({r}, {g}, {b})"),
            Self::Rgba => format!("rgba({r}, {g}, {b}, {alpha:.2})"),
            Self::RgbDecimal => format!("{r},{g},{b}"),
            Self::RgbaDecimal => format!("{r},{g},{b},{alpha:.2}"),
        }
    }

    /// Parse a string previously emitted in this format back into channels.
    ///
    /// Returns `(r, g, b, alpha)`; alpha is 1.0 for alpha-less formats.
    pub fn parse(&self, s: &str) -> Result<(u8, u8, u8, f32)> {
        let s = s.trim();
        match self {
            Self::Hex6 => {
                let hex = expect_hex(s, 6)?;
                Ok((hex[0], hex[1], hex[2], 1.0))
            }
            Self::Hex8 => {
                let hex = expect_hex(s, 8)?;
                Ok((hex[0], hex[1], hex[2], hex[3] as f32 / 255.0))
            }
            Self::Rgb => {
                let inner = strip_call(s, "rgb")?;
                let parts = split_channels(inner, 3)?;
                Ok((parts[0], parts[1], parts[2], 1.0))
            }
            Self::Rgba => {
                let inner = strip_call(s, "rgba")?;
                let fields: Vec<&str> = inner.split(',').map(str::trim).collect();
                if fields.len() != 4 {
                    bail!("expected 4 components in rgba(), got {}", fields.len());
                }
                let rgb = parse_u8_fields(&fields[..3])?;
                let alpha: f32 = fields[3].parse().context("invalid alpha component")?;
                Ok((rgb[0], rgb[1], rgb[2], alpha))
            }
            Self::RgbDecimal => {
                let parts = split_channels(s, 3)?;
                Ok((parts[0], parts[1], parts[2], 1.0))
            }
            Self::RgbaDecimal => {
                let fields: Vec<&str> = s.split(',').map(str::trim).collect();
                if fields.len() != 4 {
                    bail!("expected 4 components, got {}", fields.len());
                }
                let rgb = parse_u8_fields(&fields[..3])?;
                let alpha: f32 = fields[3].parse().context("invalid alpha component")?;
                Ok((rgb[0], rgb[1], rgb[2], alpha))
            }
        }
    }
}

impl FromStr for ColorFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hex6" => Ok(Self::Hex6),
            "hex8" => Ok(Self::Hex8),
            "rgb" => Ok(Self::Rgb),
            "rgba" => Ok(Self::Rgba),
            "rgb_decimal" => Ok(Self::RgbDecimal),
            "rgba_decimal" => Ok(Self::RgbaDecimal),
            other => bail!(
                "'{other}' is not a supported color format (supported: {})",
                FORMAT_NAMES.join(", ")
            ),
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn expect_hex(s: &str, digits: usize) -> Result<Vec<u8>> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != digits {
        bail!("expected {digits} hex digits, got {}", hex.len());
    }
    (0..digits / 2)
        .map(|i| {
            u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .with_context(|| format!("invalid hex byte in '{s}'"))
        })
        .collect()
}

fn strip_call<'a>(s: &'a str, func: &str) -> Result<&'a str> {
    s.strip_prefix(func)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .with_context(|| format!("expected {func}(...) syntax in '{s}'"))
}

fn split_channels(s: &str, count: usize) -> Result<Vec<u8>> {
    let fields: Vec<&str> = s.split(',').map(str::trim).collect();
    if fields.len() != count {
        bail!("expected {count} components, got {}", fields.len());
    }
    parse_u8_fields(&fields)
}

fn parse_u8_fields(fields: &[&str]) -> Result<Vec<u8>> {
    fields
        .iter()
        .map(|f| f.parse::<u8>().with_context(|| format!("invalid channel '{f}'")))
        .collect()
}
