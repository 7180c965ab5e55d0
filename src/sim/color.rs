//! HSL color-channel system and spectrum palette functions, used for both
//! the render shader's color mode and CPU-side tests.

use serde::{Deserialize, Serialize};

/// Convert HSL to RGB.
///
/// * `h` - Hue in degrees [0, 360)
/// * `s` - Saturation [0, 1]
/// * `l` - Lightness [0, 1]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());
    let (r, g, b) = if hp < 1.0 {
        (c, x, 0.0)
    } else if hp < 2.0 {
        (x, c, 0.0)
    } else if hp < 3.0 {
        (0.0, c, x)
    } else if hp < 4.0 {
        (0.0, x, c)
    } else if hp < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    let m = l - c * 0.5;
    [r + m, g + m, b + m]
}

/// Convert RGB to HSL.
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) * 0.5;
    let delta = max - min;

    if delta.abs() < 1e-6 {
        return [0.0, 0.0, l];
    }

    let s = if l < 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let h = if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [h, s, l]
}

/// A built-in hue-driven spectrum palette, selectable in place of direct
/// HSL hue when `colorSpectrum` overrides the hue channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpectrumPalette {
    #[default]
    Chrome,
    Ocean,
    Bands,
    Rainbow,
    Mono,
}

impl SpectrumPalette {
    pub fn all() -> &'static [SpectrumPalette] {
        &[
            SpectrumPalette::Chrome,
            SpectrumPalette::Ocean,
            SpectrumPalette::Bands,
            SpectrumPalette::Rainbow,
            SpectrumPalette::Mono,
        ]
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Evaluate the palette at `t` in [0, 1], returning linear RGB.
    pub fn sample(self, t: f32) -> [f32; 3] {
        let t = t.clamp(0.0, 1.0);
        match self {
            SpectrumPalette::Chrome => {
                let v = 0.5 + 0.5 * (std::f32::consts::TAU * t).cos();
                [v, v, v * 0.9 + 0.1]
            }
            SpectrumPalette::Ocean => [0.0, 0.3 + 0.4 * t, 0.5 + 0.5 * t],
            SpectrumPalette::Bands => {
                let band = (t * 6.0).floor() / 6.0;
                hsl_to_rgb(band * 360.0, 0.8, 0.5)
            }
            SpectrumPalette::Rainbow => hsl_to_rgb(t * 360.0, 1.0, 0.5),
            SpectrumPalette::Mono => [t, t, t],
        }
    }
}

/// Compose a final RGB color from the HSL channel system in §4.5: hue,
/// saturation and brightness each already mapped through their own curve.
/// When `spectrum` is `Some`, the base color comes from the palette instead
/// of direct hue, desaturated toward its own luminance by `(1 - sat)` and
/// scaled by `bright * 2`.
pub fn compose_color(hue: f32, sat: f32, bright: f32, spectrum: Option<SpectrumPalette>) -> [f32; 3] {
    match spectrum {
        None => hsl_to_rgb(hue * 360.0, sat, bright),
        Some(palette) => {
            let [r, g, b] = palette.sample(hue);
            let luminance = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            let desaturated = [
                lerp(r, luminance, 1.0 - sat),
                lerp(g, luminance, 1.0 - sat),
                lerp(b, luminance, 1.0 - sat),
            ];
            let scale = bright * 2.0;
            [
                desaturated[0] * scale,
                desaturated[1] * scale,
                desaturated[2] * scale,
            ]
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_to_rgb_primary_colors() {
        let [r, g, b] = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((r - 1.0).abs() < 0.01 && g.abs() < 0.01 && b.abs() < 0.01);

        let [r, g, b] = hsl_to_rgb(120.0, 1.0, 0.5);
        assert!(r.abs() < 0.01 && (g - 1.0).abs() < 0.01 && b.abs() < 0.01);
    }

    // Round-trip property: hslToRgb . rgbToHue preserves pure hues within 1e-3.
    #[test]
    fn hue_round_trip_preserves_pure_hues() {
        for h in [0.0, 45.0, 90.0, 180.0, 270.0, 330.0] {
            let [r, g, b] = hsl_to_rgb(h, 1.0, 0.5);
            let [h2, _, _] = rgb_to_hsl(r, g, b);
            let diff = (h2 - h).abs().min(360.0 - (h2 - h).abs());
            assert!(diff < 1e-3, "hue {h} round-tripped to {h2}");
        }
    }

    #[test]
    fn grayscale_has_zero_saturation() {
        let [h, s, l] = rgb_to_hsl(0.4, 0.4, 0.4);
        assert_eq!(s, 0.0);
        assert_eq!(h, 0.0);
        assert!((l - 0.4).abs() < 1e-4);
    }
}
