//! Parametric and discrete color gradients.
//!
//! A [`Palette`] maps a value `x` ∈ \[0, 1\] to a color with one of the
//! strategies of [`ColorType`]:
//!
//! - [`ColorType::Model`]: each channel is one of the 37 gnuplot
//!   functions of [`model`], scaled to a per channel range;
//! - [`ColorType::Defined`]: interpolation between control colors, or
//!   a list of discrete swatches when the palette is distinct;
//! - [`ColorType::Functions`]: each channel is a formula of `x`,
//!   evaluated by a [`FormulaEvaluator`];
//! - [`ColorType::CubeHelix`]: Green's [`CubeHelix`].
//!
//! Palettes are saved to and read from a small text format (see
//! [`PaletteFile`]).  Any palette is a [`ColorRange`], so it can be
//! sampled into the color types of the [`rgb`] crate.
//!
//! ```
//! use gradient_palette::{ColorRange, ColorType, Palette, color};
//! use rgb::RGB8;
//! let mut p = Palette::new();
//! p.set_color_type(ColorType::Defined);
//! p.add_defined_color(0., color::rgb(1., 0., 0.)).unwrap();
//! p.add_defined_color(1., color::rgb(0., 0., 1.)).unwrap();
//! let c: RGB8 = p.rgb(0.5);
//! assert_eq!(c, RGB8::new(128, 0, 128));
//! ```

use std::marker::PhantomData;
use rgb::{RGBA, RGB8, RGB16, RGBA8, RGBA16};

pub mod color;
mod cubehelix;
pub mod edit;
mod error;
pub mod formula;
pub mod model;
pub mod palette;
pub mod theme;

pub use color::Color;
pub use cubehelix::CubeHelix;
pub use error::{Error, Result};
pub use formula::{DisabledEvaluator, EvalError, FormulaEvaluator, NativeEvaluator};
#[cfg(feature = "lua")]
pub use formula::LuaEvaluator;
pub use palette::{
    Channel, ChannelModel, ColorModel, ColorType, DefinedColor, DefinedColors,
    ModelData, ObserverId, Palette, PaletteFile, ParseWarning, ReadReport, WrapMode,
};
pub use theme::Theme;

/// A “continuous” range of colors parametrized by reals in \[0, 1\].
pub trait ColorRange<Color> {
    /// Returns the color corresponding to `t` ∈ \[0., 1.\].
    fn rgb(&self, t: f64) -> Color;

    /// Return an iterator yielding uniform sampling of `n` points
    /// between `a` and `b` (with the bounds `a` and `b` included in
    /// the list of points) together with colors.  It is not required
    /// that `a <= b`.
    fn range(self, a: f64, b: f64, n: usize) -> Range<Self, Color>
    where Self: Sized {
        // NaN bounds give NaN positions.
        let finite = |v: f64| if v.is_infinite() { v.signum() * f64::MAX } else { v };
        Range { range: self, color: PhantomData, a: finite(a), b: finite(b),
                n, front: 0, back: n }
    }
}

/// An iterator over `n` evenly spaced positions of a [`ColorRange`],
/// yielded together with their colors.
pub struct Range<R, Color> {
    range: R,
    color: PhantomData<Color>,
    a: f64,
    b: f64,
    n: usize,
    // Positions `front .. back` remain.
    front: usize,
    back: usize,
}

impl<R, Color> Range<R, Color> where R: ColorRange<Color> {
    fn point(&self, k: usize) -> (f64, Color) {
        let last = self.n - 1;
        if k == 0 {
            return (self.a, R::rgb(&self.range, 0.))
        }
        if k == last {
            return (self.b, R::rgb(&self.range, 1.))
        }
        let t = k as f64 / last as f64;
        let x = ((last - k) as f64 * self.a + k as f64 * self.b) / last as f64;
        let x = if x.is_infinite() { (1. - t) * self.a + t * self.b } else { x };
        (x, R::rgb(&self.range, t))
    }
}

impl<R, Color> Iterator for Range<R, Color>
where R: ColorRange<Color> {
    type Item = (f64, Color);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back { return None }
        let item = self.point(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl<R, Color> ExactSizeIterator for Range<R, Color>
where R: ColorRange<Color> {
    fn len(&self) -> usize { self.back - self.front }
}

impl<R, Color> DoubleEndedIterator for Range<R, Color>
where R: ColorRange<Color> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back { return None }
        self.back -= 1;
        Some(self.point(self.back))
    }
}

/// Specifies the methods a RGB color encoding must provide.
pub trait RGBColor: Sized {
    /// Return the red, green, blue and alpha components of the color
    /// (in \[0, 1\]).
    fn to_rgba(&self) -> RGBA<f64>;

    /// Create a color from its RGBA components (in \[0, 1\], values
    /// outside are clamped by integer encodings).
    fn from_rgba(rgba: RGBA<f64>) -> Self;

    /// Convert the color to grayscale.
    ///
    /// ```
    /// use gradient_palette::RGBColor;
    /// use rgb::RGB8;
    /// assert_eq!(RGB8::new(255, 0, 0).to_gray(), RGB8::new(76, 76, 76));
    /// ```
    fn to_gray(&self) -> Self {
        let c = Self::to_rgba(self);
        let x = color::gray_value(&c);
        Self::from_rgba(RGBA { r: x, g: x, b: x, a: c.a })
    }
}

#[inline]
fn to_u8(v: f64) -> u8 { (v.clamp(0., 1.) * 255.).round() as u8 }

#[inline]
fn to_u16(v: f64) -> u16 { (v.clamp(0., 1.) * 65535.).round() as u16 }

impl RGBColor for RGBA<f64> {
    #[inline]
    fn to_rgba(&self) -> RGBA<f64> { *self }

    #[inline]
    fn from_rgba(c: RGBA<f64>) -> Self { c }
}

impl RGBColor for RGB8 {
    #[inline]
    fn to_rgba(&self) -> RGBA<f64> {
        RGBA { r: self.r as f64 / 255., g: self.g as f64 / 255.,
               b: self.b as f64 / 255., a: 1. }
    }

    #[inline]
    fn from_rgba(c: RGBA<f64>) -> Self {
        RGB8 { r: to_u8(c.r), g: to_u8(c.g), b: to_u8(c.b) }
    }
}

impl RGBColor for RGB16 {
    #[inline]
    fn to_rgba(&self) -> RGBA<f64> {
        RGBA { r: self.r as f64 / 65535., g: self.g as f64 / 65535.,
               b: self.b as f64 / 65535., a: 1. }
    }

    #[inline]
    fn from_rgba(c: RGBA<f64>) -> Self {
        RGB16 { r: to_u16(c.r), g: to_u16(c.g), b: to_u16(c.b) }
    }
}

impl RGBColor for RGBA8 {
    #[inline]
    fn to_rgba(&self) -> RGBA<f64> {
        RGBA { r: self.r as f64 / 255., g: self.g as f64 / 255.,
               b: self.b as f64 / 255., a: self.a as f64 / 255. }
    }

    #[inline]
    fn from_rgba(c: RGBA<f64>) -> Self {
        RGBA8 { r: to_u8(c.r), g: to_u8(c.g), b: to_u8(c.b), a: to_u8(c.a) }
    }
}

impl RGBColor for RGBA16 {
    #[inline]
    fn to_rgba(&self) -> RGBA<f64> {
        RGBA { r: self.r as f64 / 65535., g: self.g as f64 / 65535.,
               b: self.b as f64 / 65535., a: self.a as f64 / 65535. }
    }

    #[inline]
    fn from_rgba(c: RGBA<f64>) -> Self {
        RGBA16 { r: to_u16(c.r), g: to_u16(c.g), b: to_u16(c.b), a: to_u16(c.a) }
    }
}

impl<Color: RGBColor> ColorRange<Color> for Palette {
    /// Color of the palette at `t` (see [`Palette::get_color`]).
    fn rgb(&self, t: f64) -> Color {
        Color::from_rgba(self.get_color(t, false, false))
    }
}

impl<Color: RGBColor> ColorRange<Color> for &Palette {
    fn rgb(&self, t: f64) -> Color {
        Color::from_rgba(self.get_color(t, false, false))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_range() {
        let p = Palette::new();
        for (i, (x, c)) in (&p).range(0., 1., 11).enumerate() {
            assert!((x - 0.1 * i as f64).abs() <= 1e-15,
                    "{} ≉ {}", x, 0.1 * i as f64);
            let c1: RGB8 = p.rgb(x);
            assert_eq!(c1, c);
        }
    }

    #[test]
    fn range_ends() {
        let p = Palette::new();
        let v: Vec<(f64, RGBA8)> = (&p).range(10., -10., 3).rev().collect();
        assert_eq!(v.len(), 3);
        assert_eq!(v[0], (-10., RGBA8::new(255, 255, 0, 255)));
        assert_eq!(v[1].0, 0.);
        assert_eq!(v[2], (10., RGBA8::new(0, 0, 0, 255)));
        assert_eq!(ColorRange::<RGB8>::range(&p, 0., 1., 0).count(), 0);
    }

    #[test]
    fn range_from_both_ends() {
        let p = Palette::new();
        let mut r = ColorRange::<RGB8>::range(&p, f64::NEG_INFINITY, f64::INFINITY, 4);
        assert_eq!(r.len(), 4);
        assert_eq!(r.next_back().map(|(x, _)| x), Some(f64::MAX));
        assert_eq!(r.next().map(|(x, _)| x), Some(-f64::MAX));
        assert_eq!(r.len(), 2);
        let mid: Vec<f64> = r.map(|(x, _)| x).collect();
        assert_eq!(mid.len(), 2);
        assert!(mid.iter().all(|x| x.is_finite()));
        let mut one = ColorRange::<RGB8>::range(&p, 2., 3., 1);
        assert_eq!(one.next_back().map(|(x, _)| x), Some(2.));
        assert!(one.next().is_none());
    }

    #[test]
    fn integer_encodings() {
        let c = RGBA { r: 1.2, g: 0.5, b: -0.1, a: 1. };
        assert_eq!(RGB8::from_rgba(c), RGB8::new(255, 128, 0));
        assert_eq!(RGB16::from_rgba(c), RGB16::new(65535, 32768, 0));
        assert_eq!(RGBA16::new(0, 0, 65535, 0).to_rgba(),
                   RGBA { r: 0., g: 0., b: 1., a: 0. });
    }
}
