//! Interactive editing of defined colors.
//!
//! Editors plot every channel of every defined color against its
//! normalized key: the point of row `i`, channel `c` is
//! `(map_x(key), component c)`, where components are R, G, B (or H, S,
//! V for [`ColorModel::Hsv`] palettes).  In gray mode a single point
//! per color is plotted at its gray value.

use crate::color::{self, Color, Hsv};
use crate::error::Result;
use crate::palette::{ColorModel, DefinedColor, Palette};

/// Plotted point closest to a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestData {
    /// Row of the defined color (in view order).
    pub row: usize,
    /// Channel of the point (0 in gray mode).
    pub channel: usize,
    /// Normalized key of the color.
    pub x: f64,
    pub distance: f64,
    pub color: Color,
}

fn components(model: ColorModel, c: &Color) -> [f64; 3] {
    if model == ColorModel::Hsv {
        let hsv = Hsv::from_rgb(c);
        [hsv.h, hsv.s, hsv.v]
    } else {
        [c.r, c.g, c.b]
    }
}

/// Point closest to `(x, y)`, `None` if there are no defined colors.
/// Ties go to the first point found.
pub fn nearest_defined_color(palette: &Palette, (x, y): (f64, f64), gray: bool)
                             -> Option<NearestData> {
    let mut nearest: Option<NearestData> = None;
    let model = palette.color_model();
    for (row, DefinedColor { key, color }) in palette.defined_colors().iter().enumerate() {
        let kx = palette.map_defined_color_x(key);
        let ys = if gray { vec![color::gray_value(&color)] }
                 else { components(model, &color).to_vec() };
        for (channel, cy) in ys.into_iter().enumerate() {
            let distance = (x - kx).hypot(y - cy);
            if nearest.map_or(true, |n| distance < n.distance) {
                nearest = Some(NearestData { row, channel, x: kx, distance, color });
            }
        }
    }
    nearest
}

/// Shift the channel of `nearest` (all channels in gray mode) by `dy`
/// and store the result, clamped to \[0, 1\], in its row.
pub fn move_nearest_defined_color(palette: &mut Palette, nearest: &NearestData,
                                  dy: f64, gray: bool) -> Result<()> {
    let model = palette.color_model();
    let mut v = components(model, &nearest.color);
    for (i, v) in v.iter_mut().enumerate() {
        if gray || i == nearest.channel { *v += dy }
        *v = v.clamp(0., 1.);
    }
    let a = nearest.color.a;
    let color = if model == ColorModel::Hsv {
        Hsv { h: v[0], s: v[1], v: v[2], a }.to_rgb()
    } else {
        Color { r: v[0], g: v[1], b: v[2], a }
    };
    palette.set_defined_color(nearest.row, color)
}

/// Gray level of a color inserted with no neighbor to interpolate.
pub const INSERT_GRAY: f64 = 127. / 255.;

/// Add a color after `row`: halfway (in key and color) between the row
/// and the next one, or the previous one for the last row.  A single
/// color is paired with white at key 1.  An empty palette, or a `row`
/// past the end of two or more colors, gets [`INSERT_GRAY`] at 0.5.
/// Returns the key used.
pub fn insert_defined_color(palette: &mut Palette, row: usize) -> Result<f64> {
    let model = palette.color_model();
    let n = palette.num_defined_colors();
    let white = color::gray(1.);
    let (view_key, c) = if n >= 2 && row < n {
        let r = if row + 1 < n { row } else { n - 2 };
        let c1 = palette.defined_color(r)?;
        let c2 = palette.defined_color(r + 1)?;
        ((c1.key + c2.key) / 2., color::interp(model, &c1.color, &c2.color, 0.5))
    } else if n == 1 {
        let c1 = palette.defined_color(0)?;
        let x = if c1.key != 1. { (c1.key + 1.) / 2. } else { 0.5 };
        (x, color::interp(model, &c1.color, &white, 0.5))
    } else {
        return palette.add_defined_color(0.5, color::gray(INSERT_GRAY))
    };
    let d = palette.defined_colors();
    let key = if n >= 2 && d.is_inverted() { d.min() + d.max() - view_key }
              else { view_key };
    palette.add_defined_color(key, c)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{gray, rgb};
    use crate::palette::ColorType;

    fn palette() -> Palette {
        let mut p = Palette::new();
        p.set_color_type(ColorType::Defined);
        p.add_defined_color(0., rgb(1., 0., 0.)).unwrap();
        p.add_defined_color(1., rgb(0., 0.5, 1.)).unwrap();
        p
    }

    #[test]
    fn nearest() {
        let p = palette();
        let n = nearest_defined_color(&p, (0.9, 0.45), false).unwrap();
        assert_eq!((n.row, n.channel), (1, 1));
        assert_eq!(n.x, 1.);
        assert!((n.distance - 0.1f64.hypot(0.05)).abs() < 1e-12);
        let n = nearest_defined_color(&p, (0., 0.3), true).unwrap();
        assert_eq!((n.row, n.channel), (0, 0));
        assert!(nearest_defined_color(&Palette::new(), (0., 0.), false).is_none());
    }

    #[test]
    fn move_channel() {
        let mut p = palette();
        let n = nearest_defined_color(&p, (1., 0.5), false).unwrap();
        move_nearest_defined_color(&mut p, &n, 0.7, false).unwrap();
        assert_eq!(p.defined_color(1).unwrap().color, rgb(0., 1., 1.));
        let n = nearest_defined_color(&p, (0., 0.3), true).unwrap();
        move_nearest_defined_color(&mut p, &n, -0.5, true).unwrap();
        assert_eq!(p.defined_color(0).unwrap().color, rgb(0.5, 0., 0.));
    }

    #[test]
    fn insert() {
        let mut p = Palette::new();
        assert_eq!(insert_defined_color(&mut p, 0).unwrap(), 0.5);
        assert_eq!(p.defined_color(0).unwrap().color, gray(INSERT_GRAY));
        assert_eq!(insert_defined_color(&mut p, 0).unwrap(), 0.75);
        let c = p.defined_color(1).unwrap().color;
        assert!((c.r - 191. / 255.).abs() < 1e-12, "{c:?}");

        let mut p = palette();
        let k = insert_defined_color(&mut p, 1).unwrap();
        assert_eq!(k, 0.5);
        assert_eq!(p.defined_color(1).unwrap().color, rgb(0.5, 0.25, 0.5));
    }

    #[test]
    fn insert_past_end() {
        let mut p = palette();
        p.add_defined_color(0.2, rgb(0., 1., 0.)).unwrap();
        assert_eq!(insert_defined_color(&mut p, 3).unwrap(), 0.5);
        assert_eq!(p.num_defined_colors(), 4);
        assert_eq!(p.defined_color(2).unwrap().color, gray(INSERT_GRAY));
        // A single color still pairs with white.
        let mut p = Palette::new();
        p.add_defined_color(0., rgb(1., 0., 0.)).unwrap();
        assert_eq!(insert_defined_color(&mut p, 7).unwrap(), 0.5);
        assert_eq!(p.defined_color(1).unwrap().color, rgb(1., 0.5, 0.5));
    }

    #[test]
    fn insert_inverted() {
        let mut p = palette();
        p.add_defined_color(0.2, gray(0.)).unwrap();
        p.set_inverted(true);
        // View keys are 0, 0.8 and 1.
        let k = insert_defined_color(&mut p, 0).unwrap();
        assert!((k - 0.6).abs() < 1e-12);
        assert!((p.defined_color(1).unwrap().key - 0.4).abs() < 1e-12);
    }
}
