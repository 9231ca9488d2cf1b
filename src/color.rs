//! Paint colors: HSV sampling and base-color mixing

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// RGBA color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from normalized [0, 1] channels (clamped)
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        Self::rgb(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b))
    }

    /// HSB brightness: the largest channel, normalized
    pub fn brightness(self) -> f64 {
        self.r.max(self.g).max(self.b) as f64 / 255.0
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Multiply every color channel by `factor` (alpha untouched)
    pub fn scaled(self, factor: f64) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: (self.r as f64 * f).round() as u8,
            g: (self.g as f64 * f).round() as u8,
            b: (self.b as f64 * f).round() as u8,
            a: self.a,
        }
    }

    fn saturating_add(self, other: Color) -> Self {
        Self {
            r: self.r.saturating_add(other.r),
            g: self.g.saturating_add(other.g),
            b: self.b.saturating_add(other.b),
            a: self.a,
        }
    }

    fn saturating_sub(self, other: Color) -> Self {
        Self {
            r: self.r.saturating_sub(other.r),
            g: self.g.saturating_sub(other.g),
            b: self.b.saturating_sub(other.b),
            a: self.a,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[inline]
fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// HSV to RGB using the six-sector method.
/// h: [0, 1) (wraps), s: [0, 1], v: [0, 1]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Color {
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    // A hue just below zero can round up to a full turn
    let (r, g, b) = match (sector as i32).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Color::from_unit(r, g, b)
}

/// Sample a fully saturated, fully bright color.
///
/// With `preferred_hues`, a coin flip picks between a uniform hue and one of
/// the preferred ones. With a `base`, the sample is scaled by `randomness` and
/// subtracted from bright bases or added to dark ones.
pub fn generate<R: Rng + ?Sized>(
    base: Option<Color>,
    randomness: f64,
    preferred_hues: Option<&[f64]>,
    rng: &mut R,
) -> Color {
    let uniform: f64 = rng.gen();
    let hue = match preferred_hues {
        Some(hues) if !hues.is_empty() && rng.gen_bool(0.5) => {
            hues.choose(rng).copied().unwrap_or(uniform)
        },
        _ => uniform,
    };

    let sample = hsv_to_rgb(hue, 1.0, 1.0);

    match base {
        None => sample,
        Some(base) => mix(base, sample, randomness),
    }
}

/// Mix a variation into `base` without clipping toward white or black
pub fn mix(base: Color, variation: Color, randomness: f64) -> Color {
    let delta = variation.scaled(randomness);
    if base.brightness() >= 0.5 {
        base.saturating_sub(delta)
    } else {
        base.saturating_add(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hsv_sector_boundaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(hsv_to_rgb(1.0 / 6.0, 1.0, 1.0), Color::rgb(255, 255, 0));
        assert_eq!(hsv_to_rgb(2.0 / 6.0, 1.0, 1.0), Color::rgb(0, 255, 0));
        assert_eq!(hsv_to_rgb(3.0 / 6.0, 1.0, 1.0), Color::rgb(0, 255, 255));
        assert_eq!(hsv_to_rgb(4.0 / 6.0, 1.0, 1.0), Color::rgb(0, 0, 255));
        assert_eq!(hsv_to_rgb(5.0 / 6.0, 1.0, 1.0), Color::rgb(255, 0, 255));
        // Full turn wraps back to red
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_tiny_negative_hue_is_red() {
        assert_eq!(hsv_to_rgb(-1e-18, 1.0, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(hsv_to_rgb(-1e-17, 1.0, 1.0), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_hsv_desaturated_is_gray() {
        assert_eq!(hsv_to_rgb(0.3, 0.0, 0.5), Color::rgb(128, 128, 128));
        assert_eq!(hsv_to_rgb(0.7, 1.0, 0.0), Color::BLACK);
    }

    #[test]
    fn test_brightness() {
        assert_eq!(Color::WHITE.brightness(), 1.0);
        assert_eq!(Color::BLACK.brightness(), 0.0);
        assert_eq!(Color::rgb(0, 255, 0).brightness(), 1.0);
    }

    #[test]
    fn test_generate_deterministic() {
        let a = generate(None, 0.0, None, &mut StdRng::seed_from_u64(7));
        let b = generate(None, 0.0, None, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_is_fully_saturated() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let c = generate(None, 0.0, None, &mut rng);
            assert_eq!(c.r.max(c.g).max(c.b), 255);
            assert_eq!(c.r.min(c.g).min(c.b), 0);
        }
    }

    #[test]
    fn test_zero_randomness_returns_base() {
        let mut rng = StdRng::seed_from_u64(3);
        for base in [Color::rgb(200, 10, 90), Color::rgb(20, 30, 40), Color::rgba(1, 2, 3, 4)] {
            assert_eq!(generate(Some(base), 0.0, None, &mut rng), base);
        }
    }

    #[test]
    fn test_bright_base_darkens_dark_base_brightens() {
        let bright = Color::rgb(250, 250, 250);
        let dark = Color::rgb(5, 5, 5);
        let variation = Color::rgb(255, 0, 0);

        let darker = mix(bright, variation, 0.5);
        assert!(darker.r < bright.r);
        assert_eq!(darker.g, bright.g);

        let lighter = mix(dark, variation, 0.5);
        assert!(lighter.r > dark.r);
        assert_eq!(lighter.b, dark.b);
    }

    #[test]
    fn test_preferred_hues_are_used() {
        let mut rng = StdRng::seed_from_u64(99);
        let hues = [0.0];
        let reds = (0..200)
            .map(|_| generate(None, 0.0, Some(&hues), &mut rng))
            .filter(|c| *c == Color::rgb(255, 0, 0))
            .count();
        // About half come from the preferred list
        assert!(reds > 60, "only {} preferred samples", reds);
    }
}
