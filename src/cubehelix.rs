//! Cube-helix color scheme of D. A. Green, “A colour scheme for the
//! display of astronomical intensity images”, Bull. Astr. Soc. India
//! (2011) 39, 289.
//!
//! Brightness ramps linearly from black to white while the hue turns
//! around the color cube: `cycles` full turns starting at `start`
//! (0 = blue, 1 = red, 2 = green), with an amplitude scaled by
//! `saturation`.

use std::f64::consts::PI;

use crate::color::{self, Color};

/// Parameters of a cube-helix gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeHelix {
    pub start: f64,
    pub cycles: f64,
    pub saturation: f64,
}

impl Default for CubeHelix {
    /// The parameters of Green's paper: start 0.5, -1.5 cycles,
    /// saturation 1.
    fn default() -> Self { CubeHelix { start: 0.5, cycles: -1.5, saturation: 1. } }
}

impl CubeHelix {
    pub fn new(start: f64, cycles: f64, saturation: f64) -> Self {
        CubeHelix { start, cycles, saturation }
    }

    /// Color at `x` ∈ \[0, 1\] (clamped).  When `negate` is set every
    /// component is replaced by its complement `1 - v`.
    ///
    /// ```
    /// use gradient_palette::CubeHelix;
    /// let ch = CubeHelix::new(0., 1., 1.);
    /// assert_eq!(ch.interp(0., false).r, 0.);
    /// assert_eq!(ch.interp(0., true).r, 1.);
    /// ```
    pub fn interp(&self, x: f64, negate: bool) -> Color {
        let x = if x.is_nan() { 0. } else { x.clamp(0., 1.) };
        let angle = 2. * PI * (self.start / 3. + 1. + self.cycles * x);
        let amp = self.saturation * x * (1. - x) / 2.;
        let (sin, cos) = angle.sin_cos();
        let c = color::clamp(color::rgb(
            x + amp * (-0.14861 * cos + 1.78277 * sin),
            x + amp * (-0.29227 * cos - 0.90649 * sin),
            x + amp * (1.97294 * cos)));
        if negate { color::rgb(1. - c.r, 1. - c.g, 1. - c.b) } else { c }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_ramp() {
        let ch = CubeHelix::new(0., 1., 1.);
        let black = ch.interp(0., false);
        let white = ch.interp(1., false);
        assert_eq!((black.r, black.g, black.b), (0., 0., 0.));
        assert!((white.r - 1.).abs() < 1e-12 && (white.g - 1.).abs() < 1e-12
                && (white.b - 1.).abs() < 1e-12);
        let mut last = -1.;
        for i in 0 ..= 20 {
            let l = color::gray_value(&ch.interp(i as f64 / 20., false));
            assert!(l >= last - 2e-2, "luminance drops at {i}: {l} < {last}");
            last = l;
        }
    }

    #[test]
    fn stays_in_range() {
        let ch = CubeHelix::new(0.5, -1.5, 2.);
        for i in 0 ..= 100 {
            let c = ch.interp(i as f64 / 100., false);
            for v in [c.r, c.g, c.b] { assert!((0. ..= 1.).contains(&v)) }
        }
    }

    #[test]
    fn negate_complements() {
        let ch = CubeHelix::default();
        let c = ch.interp(0.3, false);
        let n = ch.interp(0.3, true);
        assert!((c.r + n.r - 1.).abs() < 1e-12 && (c.g + n.g - 1.).abs() < 1e-12
                && (c.b + n.b - 1.).abs() < 1e-12);
    }
}
