use palette::Srgb;

use crate::color::Color;
use crate::error::Diagnostics;

/// The six user-facing color transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Hue,
    Saturation,
    Brightness,
    Contrast,
    Temperature,
    Opacity,
}

impl TransformKind {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "hue" => Some(Self::Hue),
            "saturation" => Some(Self::Saturation),
            "brightness" => Some(Self::Brightness),
            "contrast" => Some(Self::Contrast),
            "temperature" => Some(Self::Temperature),
            "opacity" => Some(Self::Opacity),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Temperature => "temperature",
            Self::Opacity => "opacity",
        }
    }
}

/// A single declared transformation, as read from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub kind: TransformKind,
    pub value: f32,
}

/// A resolved set of transformations, applied in the canonical order
/// hue → saturation → brightness → contrast → temperature → opacity no
/// matter how they were declared.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformSet {
    hue: Option<f32>,
    saturation: Option<f32>,
    brightness: Option<f32>,
    contrast: Option<f32>,
    temperature: Option<f32>,
    opacity: Option<f32>,
}

impl TransformSet {
    /// Resolve declared transforms: clamp out-of-range values (with a
    /// warning), let a repeated kind overwrite the earlier one.
    pub fn resolve(entries: &[Transform], context: &str, diags: &mut Diagnostics) -> Self {
        let mut set = Self::default();
        for entry in entries {
            let value = clamp_value(entry.kind, entry.value, context, diags);
            let slot = match entry.kind {
                TransformKind::Hue => &mut set.hue,
                TransformKind::Saturation => &mut set.saturation,
                TransformKind::Brightness => &mut set.brightness,
                TransformKind::Contrast => &mut set.contrast,
                TransformKind::Temperature => &mut set.temperature,
                TransformKind::Opacity => &mut set.opacity,
            };
            if slot.is_some() {
                diags.warn(format!(
                    "{context}: '{}' declared more than once, keeping the last value",
                    entry.kind.name()
                ));
            }
            *slot = Some(value);
        }
        set
    }

    /// Apply the pipeline to `color`. Each stage re-canonicalizes into Lab.
    pub fn apply(&self, color: Color) -> Color {
        let mut current = color;

        if let Some(degrees) = self.hue {
            let alpha = current.alpha();
            let (h, s, l) = current.hsl();
            current = Color::from_hsl((h + degrees).rem_euclid(360.0), s, l).with_alpha(alpha);
        }
        if let Some(factor) = self.saturation {
            let alpha = current.alpha();
            let (h, s, l) = current.hsl();
            current = Color::from_hsl(h, (s * factor).clamp(0.0, 1.0), l).with_alpha(alpha);
        }
        if let Some(factor) = self.brightness {
            let alpha = current.alpha();
            let (h, s, l) = current.hsl();
            current = Color::from_hsl(h, s, (l * factor).clamp(0.0, 1.0)).with_alpha(alpha);
        }
        if let Some(factor) = self.contrast {
            let alpha = current.alpha();
            let srgb = current.srgb();
            let expand = |c: f32| ((c - 0.5) * factor + 0.5).clamp(0.0, 1.0);
            current = Color::from_srgb(Srgb::new(
                expand(srgb.red),
                expand(srgb.green),
                expand(srgb.blue),
            ))
            .with_alpha(alpha);
        }
        if let Some(value) = self.temperature {
            // Warming pushes a* toward red; cooling additionally pulls b*
            // toward blue.
            let db = if value < 0.0 { value * 0.3 } else { 0.0 };
            current = current.shift_ab(value * 0.6, db);
        }
        if let Some(alpha) = self.opacity {
            current = current.with_alpha(alpha);
        }

        current
    }
}

fn clamp_value(kind: TransformKind, value: f32, context: &str, diags: &mut Diagnostics) -> f32 {
    let clamped = match kind {
        // Degrees wrap rather than clamp; any value is meaningful.
        TransformKind::Hue => return value,
        TransformKind::Saturation | TransformKind::Brightness | TransformKind::Contrast => {
            value.clamp(0.0, 3.0)
        }
        TransformKind::Temperature => value.clamp(-100.0, 100.0),
        TransformKind::Opacity => value.clamp(0.0, 1.0),
    };
    if clamped != value {
        diags.warn(format!(
            "{context}: {} value {value} out of range, clamped to {clamped}",
            kind.name()
        ));
    }
    clamped
}
