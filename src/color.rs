use palette::{FromColor, Hsl, Lab, Srgb};

/// Core color type used throughout the pipeline.
///
/// The CIE Lab coordinates plus alpha are authoritative; RGB and HSL are
/// projections computed on demand. Construction from RGB or HSL immediately
/// canonicalizes into Lab, so distance and scoring always operate on the
/// same representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    lab: Lab,
    alpha: f32,
}

impl Color {
    /// Construct from 8-bit sRGB channels, fully opaque.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let srgb: Srgb<f32> = Srgb::new(r, g, b).into_format();
        Self {
            lab: Lab::from_color(srgb),
            alpha: 1.0,
        }
    }

    /// Construct directly from Lab coordinates.
    pub fn from_lab(l: f32, a: f32, b: f32) -> Self {
        Self {
            lab: Lab::new(l, a, b),
            alpha: 1.0,
        }
    }

    /// Construct from HSL (hue in degrees, s and l in [0, 1]).
    ///
    /// Canonicalizes through sRGB, so out-of-gamut inputs land on the
    /// nearest representable color.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let hsl = Hsl::new(h.rem_euclid(360.0), s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
        Self::from_srgb(Srgb::from_color(hsl))
    }

    /// Canonicalize a floating-point sRGB triple (clamped to gamut) into Lab.
    pub(crate) fn from_srgb(srgb: Srgb<f32>) -> Self {
        let clamped = Srgb::new(
            srgb.red.clamp(0.0, 1.0),
            srgb.green.clamp(0.0, 1.0),
            srgb.blue.clamp(0.0, 1.0),
        );
        Self {
            lab: Lab::from_color(clamped),
            alpha: 1.0,
        }
    }

    pub(crate) fn from_lab_raw(lab: Lab) -> Self {
        Self { lab, alpha: 1.0 }
    }

    /// Lab coordinates (L, a, b).
    pub fn lab(&self) -> (f32, f32, f32) {
        (self.lab.l, self.lab.a, self.lab.b)
    }

    /// 8-bit sRGB projection. Channels are clamped to gamut, then rounded
    /// half-to-even.
    pub fn rgb(&self) -> [u8; 3] {
        let srgb = self.srgb();
        [
            (srgb.red * 255.0).round_ties_even() as u8,
            (srgb.green * 255.0).round_ties_even() as u8,
            (srgb.blue * 255.0).round_ties_even() as u8,
        ]
    }

    /// Floating-point sRGB projection, clamped to [0, 1] per channel.
    pub(crate) fn srgb(&self) -> Srgb<f32> {
        let srgb = Srgb::from_color(self.lab);
        Srgb::new(
            srgb.red.clamp(0.0, 1.0),
            srgb.green.clamp(0.0, 1.0),
            srgb.blue.clamp(0.0, 1.0),
        )
    }

    /// HSL projection: hue in degrees [0, 360), s and l in [0, 1].
    pub fn hsl(&self) -> (f32, f32, f32) {
        let hsl = Hsl::from_color(self.srgb());
        (
            hsl.hue.into_positive_degrees().rem_euclid(360.0),
            hsl.saturation.clamp(0.0, 1.0),
            hsl.lightness.clamp(0.0, 1.0),
        )
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Replace the Lab lightness, keeping a*, b*, and alpha.
    pub fn with_lightness(self, l: f32) -> Self {
        Self {
            lab: Lab::new(l.clamp(0.0, 100.0), self.lab.a, self.lab.b),
            alpha: self.alpha,
        }
    }

    /// Shift the Lab a*/b* channels, clamped to their nominal ranges.
    pub fn shift_ab(self, da: f32, db: f32) -> Self {
        Self {
            lab: Lab::new(
                self.lab.l,
                (self.lab.a + da).clamp(-128.0, 127.0),
                (self.lab.b + db).clamp(-128.0, 127.0),
            ),
            alpha: self.alpha,
        }
    }

    /// Chroma in Lab: sqrt(a² + b²).
    pub fn chroma(&self) -> f32 {
        (self.lab.a * self.lab.a + self.lab.b * self.lab.b).sqrt()
    }

    /// Perceptual distance ΔE76 (Euclidean in Lab).
    pub fn delta_e(&self, other: &Color) -> f32 {
        delta_e(self.lab, other.lab)
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(&self) -> f32 {
        fn linearize(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let srgb = self.srgb();
        0.2126 * linearize(srgb.red) + 0.7152 * linearize(srgb.green) + 0.0722 * linearize(srgb.blue)
    }

    /// WCAG 2.0 contrast ratio between two colors.
    ///
    /// Returns a value in [1, 21]. Higher means more contrast.
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }
}

/// ΔE76 between two raw Lab points.
pub fn delta_e(a: Lab, b: Lab) -> f32 {
    ((a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)).sqrt()
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.rgb();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}
