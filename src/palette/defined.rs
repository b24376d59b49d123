//! The control colors of [`ColorType::Defined`](crate::ColorType::Defined)
//! palettes.

use tracing::trace;

use crate::color::{self, Color};
use crate::error::{Error, Result};
use crate::palette::{ColorModel, WrapMode};

/// Amount added to a key already in use by [`DefinedColors::add`].
pub const NUDGE: f64 = 0.01;

/// Number of nudges tried before [`DefinedColors::add`] gives up.
pub const MAX_NUDGES: usize = 1000;

/// A control color at position `key`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefinedColor {
    pub key: f64,
    pub color: Color,
}

impl DefinedColor {
    pub fn new(key: f64, color: Color) -> Self { DefinedColor { key, color } }
}

/// Control colors sorted by key, with unique keys.
///
/// Keys may use any scale; [`DefinedColors::map_x`] normalizes them
/// to \[0, 1\] using the smallest and largest key.
///
/// Rows (the `i` of [`get`](Self::get), [`set`](Self::set) and
/// [`remove`](Self::remove)) and [`iter`](Self::iter) follow the
/// *view* order: when the store is inverted the colors are read in
/// reverse and each key `k` is reported as `min + max - k`.  The stored
/// keys are never rewritten.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinedColors {
    colors: Vec<DefinedColor>, // sorted by key
    min: f64,
    max: f64,
    distinct: bool,
    inverted: bool,
}

impl DefinedColors {
    pub fn new() -> Self { Self::default() }

    #[inline]
    pub fn len(&self) -> usize { self.colors.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.colors.is_empty() }

    /// Smallest key (0 when empty).
    #[inline]
    pub fn min(&self) -> f64 { self.min }

    /// Largest key (0 when empty).
    #[inline]
    pub fn max(&self) -> f64 { self.max }

    /// Whether the colors are used as distinct swatches rather than
    /// interpolated.
    #[inline]
    pub fn is_distinct(&self) -> bool { self.distinct }

    pub fn set_distinct(&mut self, distinct: bool) { self.distinct = distinct }

    #[inline]
    pub fn is_inverted(&self) -> bool { self.inverted }

    pub fn set_inverted(&mut self, inverted: bool) { self.inverted = inverted }

    fn search(&self, key: f64) -> std::result::Result<usize, usize> {
        self.colors.binary_search_by(|c| c.key.total_cmp(&key))
    }

    /// Whether a color is stored at exactly `key`.
    pub fn contains(&self, key: f64) -> bool { self.search(key).is_ok() }

    fn update_bounds(&mut self) {
        self.min = self.colors.first().map_or(0., |c| c.key);
        self.max = self.colors.last().map_or(0., |c| c.key);
    }

    /// Add `color` at `key` and return the key actually used.  The
    /// components of `color` are clamped to \[0, 1\].
    ///
    /// A key already in use is moved up by [`NUDGE`] until it is free;
    /// after [`MAX_NUDGES`] attempts the color is rejected with
    /// [`Error::DuplicateKey`].
    ///
    /// ```
    /// use gradient_palette::{color, DefinedColors};
    /// let mut d = DefinedColors::new();
    /// assert_eq!(d.add(0.5, color::gray(0.)).unwrap(), 0.5);
    /// assert!((d.add(0.5, color::gray(1.)).unwrap() - 0.51).abs() < 1e-12);
    /// ```
    pub fn add(&mut self, key: f64, color: Color) -> Result<f64> {
        if !key.is_finite() {
            return Err(Error::InvalidArgument(format!("defined color key {key}")))
        }
        let mut k = key;
        for _ in 0 ..= MAX_NUDGES {
            match self.search(k) {
                Ok(_) => k += NUDGE,
                Err(pos) => {
                    if k != key { trace!(key, nudged = k, "defined color key in use") }
                    self.colors.insert(pos, DefinedColor { key: k, color: color::clamp(color) });
                    self.update_bounds();
                    return Ok(k)
                }
            }
        }
        Err(Error::DuplicateKey(key))
    }

    /// Replace all the colors.  Nothing changes if one of them
    /// cannot be added.
    pub fn set_all(&mut self, colors: impl IntoIterator<Item = DefinedColor>)
                   -> Result<()> {
        let mut d = DefinedColors { distinct: self.distinct,
                                    inverted: self.inverted, ..Self::default() };
        for c in colors { d.add(c.key, c.color)?; }
        *self = d;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.update_bounds();
    }

    fn stored_index(&self, i: usize) -> Result<usize> {
        let len = self.len();
        if i >= len { return Err(Error::IndexOutOfRange { index: i, len }) }
        Ok(if self.inverted { len - 1 - i } else { i })
    }

    fn view(&self, c: &DefinedColor) -> DefinedColor {
        if self.inverted {
            DefinedColor { key: self.min + self.max - c.key, color: c.color }
        } else { *c }
    }

    /// The color at row `i`.
    pub fn get(&self, i: usize) -> Result<DefinedColor> {
        let j = self.stored_index(i)?;
        Ok(self.view(&self.colors[j]))
    }

    /// Replace the color at row `i`, keeping its key.  The components
    /// are clamped to \[0, 1\].
    pub fn set(&mut self, i: usize, color: Color) -> Result<()> {
        let j = self.stored_index(i)?;
        self.colors[j].color = color::clamp(color);
        Ok(())
    }

    /// Remove and return the color at row `i`.
    pub fn remove(&mut self, i: usize) -> Result<DefinedColor> {
        let j = self.stored_index(i)?;
        let c = self.view(&self.colors[j]);
        self.colors.remove(j);
        self.update_bounds();
        Ok(c)
    }

    /// The colors in view order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = DefinedColor> + '_ {
        let n = self.len();
        (0 .. n).map(move |i| {
            let j = if self.inverted { n - 1 - i } else { i };
            self.view(&self.colors[j])
        })
    }

    /// The colors as stored: ascending keys, inversion not applied.
    #[inline]
    pub fn stored(&self) -> &[DefinedColor] { &self.colors }

    /// Map a key to \[0, 1\].  Returns `x` unchanged when all keys are
    /// equal (or there are none).
    pub fn map_x(&self, x: f64) -> f64 {
        if self.max > self.min { (x - self.min) / (self.max - self.min) }
        else { x }
    }

    /// Inverse of [`map_x`](Self::map_x).
    pub fn unmap_x(&self, x: f64) -> f64 {
        if self.max > self.min { self.min + x * (self.max - self.min) }
        else { x }
    }

    /// Swatch at `x` ∈ \[0, 1\] for distinct stores: the `n` colors
    /// share the interval evenly.
    fn swatch_at(&self, x: f64) -> Option<Color> {
        let n = self.len();
        if n == 0 { return None }
        let x = if x.is_nan() { 0. } else { x.clamp(0., 1.) };
        let i = ((x * n as f64) as usize).min(n - 1);
        self.get(i).ok().map(|c| c.color)
    }

    /// Color at the normalized position `x` ∈ \[0, 1\].
    ///
    /// Distinct stores return the swatch covering `x`; otherwise the
    /// two colors whose normalized keys bracket `x` are interpolated
    /// (in HSV when `model` is [`ColorModel::Hsv`], in RGB otherwise).
    /// Outside the keys the first or last color is used.  `None` when
    /// the store is empty.
    pub fn interp(&self, x: f64, model: ColorModel) -> Option<Color> {
        if self.distinct { return self.swatch_at(x) }
        let first = self.colors.first()?;
        let x = if self.inverted { 1. - x } else { x };
        let j = match self.colors.iter().position(|c| self.map_x(c.key) >= x) {
            Some(0) => return Some(first.color),
            Some(j) => j,
            None => return self.colors.last().map(|c| c.color),
        };
        let c0 = &self.colors[j - 1];
        let c1 = &self.colors[j];
        let (x0, x1) = (self.map_x(c0.key), self.map_x(c1.key));
        let f = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0. };
        Some(color::interp(model, &c0.color, &c1.color, f))
    }

    /// Row `i` of a distinct store, wrapped into range with `wrap`.
    pub fn swatch(&self, i: i64, wrap: WrapMode) -> Option<Color> {
        if self.is_empty() { return None }
        self.get(wrap.wrap(i, self.len())).ok().map(|c| c.color)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{gray, rgb};

    fn bw() -> DefinedColors {
        let mut d = DefinedColors::new();
        d.add(0., rgb(0., 0.2, 1.)).unwrap();
        d.add(1., rgb(1., 0.8, 0.)).unwrap();
        d
    }

    #[test]
    fn nudge() {
        let mut d = DefinedColors::new();
        d.add(0.5, gray(0.1)).unwrap();
        let k = d.add(0.5, gray(0.2)).unwrap();
        assert!((k - 0.51).abs() < 1e-12);
        let k = d.add(0.5, gray(0.3)).unwrap();
        assert!((k - 0.52).abs() < 1e-12);
        assert_eq!(d.len(), 3);
        assert!(d.contains(0.5) && d.contains(k));
        assert_eq!(d.get(2).unwrap().color, gray(0.3));
    }

    #[test]
    fn nudge_gives_up() {
        let mut d = DefinedColors::new();
        for _ in 0 ..= MAX_NUDGES { d.add(0.5, gray(0.5)).unwrap(); }
        assert!(matches!(d.add(0.5, gray(0.5)), Err(Error::DuplicateKey(_))));
        assert_eq!(d.len(), MAX_NUDGES + 1);
        assert!(d.add(f64::NAN, gray(0.)).is_err());
    }

    #[test]
    fn colors_are_clamped() {
        let mut d = DefinedColors::new();
        d.add(0., rgb(1.5, -0.2, 0.5)).unwrap();
        assert_eq!(d.get(0).unwrap().color, rgb(1., 0., 0.5));
        d.set(0, Color { r: f64::NAN, g: 2., b: 0.25, a: -1. }).unwrap();
        assert_eq!(d.get(0).unwrap().color, Color { r: 0., g: 1., b: 0.25, a: 0. });
        d.set_all([DefinedColor::new(1., gray(3.))]).unwrap();
        assert_eq!(d.get(0).unwrap().color, gray(1.));
    }

    #[test]
    fn rows() {
        let mut d = bw();
        d.add(0.25, gray(0.5)).unwrap();
        assert_eq!(d.get(1).unwrap().key, 0.25);
        d.set(1, gray(0.6)).unwrap();
        assert_eq!(d.get(1).unwrap(), DefinedColor::new(0.25, gray(0.6)));
        assert!(matches!(d.get(3), Err(Error::IndexOutOfRange { index: 3, len: 3 })));
        assert!(d.set(7, gray(0.)).is_err());
        let c = d.remove(0).unwrap();
        assert_eq!(c.key, 0.);
        assert_eq!((d.min(), d.max()), (0.25, 1.));
        assert!(d.remove(2).is_err());
        d.clear();
        assert!(d.is_empty());
        assert_eq!((d.min(), d.max()), (0., 0.));
    }

    #[test]
    fn inverted_view() {
        let mut d = DefinedColors::new();
        d.add(10., gray(0.)).unwrap();
        d.add(12., gray(0.3)).unwrap();
        d.add(20., gray(1.)).unwrap();
        d.set_inverted(true);
        let keys: Vec<_> = d.iter().map(|c| c.key).collect();
        assert_eq!(keys, [10., 18., 20.]);
        assert_eq!(d.get(0).unwrap().color, gray(1.));
        // stored keys untouched
        let stored: Vec<_> = d.stored().iter().map(|c| c.key).collect();
        assert_eq!(stored, [10., 12., 20.]);
        d.set(0, gray(0.9)).unwrap();
        assert_eq!(d.stored()[2].color, gray(0.9));
        let c = d.interp(0., ColorModel::Rgb).unwrap();
        assert_eq!(c, gray(0.9));
    }

    #[test]
    fn map_unmap() {
        let mut d = DefinedColors::new();
        assert_eq!(d.map_x(0.3), 0.3);
        d.add(2., gray(0.)).unwrap();
        assert_eq!(d.map_x(0.3), 0.3);
        d.add(6., gray(1.)).unwrap();
        assert_eq!(d.map_x(3.), 0.25);
        assert_eq!(d.unmap_x(0.25), 3.);
        assert_eq!(d.unmap_x(d.map_x(5.5)), 5.5);
    }

    #[test]
    fn interpolation_has_no_overshoot() {
        let d = bw();
        let (c0, c1) = (d.get(0).unwrap().color, d.get(1).unwrap().color);
        for i in 1 .. 100 {
            let c = d.interp(i as f64 / 100., ColorModel::Rgb).unwrap();
            for (v, a, b) in [(c.r, c0.r, c1.r), (c.g, c0.g, c1.g), (c.b, c0.b, c1.b)] {
                assert!(v >= a.min(b) && v <= a.max(b), "{v} ∉ [{a}, {b}]");
            }
        }
        assert_eq!(d.interp(-1., ColorModel::Rgb).unwrap(), c0);
        assert_eq!(d.interp(2., ColorModel::Rgb).unwrap(), c1);
        assert!(DefinedColors::new().interp(0.5, ColorModel::Rgb).is_none());
    }

    #[test]
    fn distinct_swatches() {
        let mut d = DefinedColors::new();
        for i in 0 .. 4 { d.add(i as f64, gray(i as f64 / 3.)).unwrap(); }
        d.set_distinct(true);
        assert_eq!(d.interp(0.1, ColorModel::Rgb).unwrap(), gray(0.));
        assert_eq!(d.interp(0.3, ColorModel::Rgb).unwrap(), gray(1. / 3.));
        assert_eq!(d.interp(1., ColorModel::Rgb).unwrap(), gray(1.));
        assert_eq!(d.swatch(5, WrapMode::Repeat), d.swatch(1, WrapMode::Repeat));
        assert_eq!(d.swatch(9, WrapMode::None).unwrap(), gray(1.));
        assert_eq!(d.swatch(4, WrapMode::Reflect).unwrap(), gray(2. / 3.));
    }

    #[test]
    fn set_all_is_atomic() {
        let mut d = bw();
        let bad = [DefinedColor::new(0.2, gray(0.)), DefinedColor::new(f64::INFINITY, gray(0.))];
        assert!(d.set_all(bad).is_err());
        assert_eq!(d, bw());
        d.set_all([DefinedColor::new(0.3, gray(0.)), DefinedColor::new(0.3, gray(1.))]).unwrap();
        assert_eq!(d.len(), 2);
        assert!((d.max() - 0.31).abs() < 1e-12);
    }
}
