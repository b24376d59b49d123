//! Color values and the color-space arithmetic shared by the palette
//! engine.
//!
//! A [`Color`] is an [`RGBA<f64>`] whose components all lie in
//! \[0, 1\].  Conversion to the usual 8 or 16 bit encodings goes
//! through [`RGBColor`](crate::RGBColor).

use rgb::RGBA;

use crate::palette::ColorModel;

/// Color with red, green, blue and alpha components in \[0, 1\].
pub type Color = RGBA<f64>;

/// Opaque color from its red, green and blue components.
#[inline]
pub fn rgb(r: f64, g: f64, b: f64) -> Color { RGBA { r, g, b, a: 1. } }

/// Opaque gray of intensity `v`.
#[inline]
pub fn gray(v: f64) -> Color { rgb(v, v, v) }

/// Clamp every component of `c` to \[0, 1\].  NaN components become 0.
pub fn clamp(c: Color) -> Color {
    let f = |v: f64| if v.is_nan() { 0. } else { v.clamp(0., 1.) };
    RGBA { r: f(c.r), g: f(c.g), b: f(c.b), a: f(c.a) }
}

/// Luminance of `c` (ITU-R BT.601 weights).
#[inline]
pub fn gray_value(c: &Color) -> f64 { 0.299 * c.r + 0.587 * c.g + 0.114 * c.b }

/// A color in the HSV space, every component in \[0, 1\].
///
/// The hue of an achromatic color (zero saturation) is undefined and
/// stored as `-1.`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
    pub a: f64,
}

impl Hsv {
    pub fn from_rgb(c: &Color) -> Hsv {
        let max = c.r.max(c.g).max(c.b);
        let min = c.r.min(c.g).min(c.b);
        let delta = max - min;
        let s = if max > 0. { delta / max } else { 0. };
        if delta <= 0. {
            return Hsv { h: -1., s: 0., v: max, a: c.a }
        }
        let h = if c.r == max { (c.g - c.b) / delta }
                else if c.g == max { 2. + (c.b - c.r) / delta }
                else { 4. + (c.r - c.g) / delta };
        Hsv { h: (h / 6.).rem_euclid(1.), s, v: max, a: c.a }
    }

    /// Whether the hue is meaningful.
    #[inline]
    pub fn has_hue(&self) -> bool { self.h >= 0. }

    pub fn to_rgb(&self) -> Color {
        let s = self.s.clamp(0., 1.);
        let v = self.v.clamp(0., 1.);
        if !self.has_hue() || s == 0. {
            return RGBA { r: v, g: v, b: v, a: self.a }
        }
        let h6 = self.h.rem_euclid(1.) * 6.;
        let i = h6.floor();
        let f = h6 - i;
        let p = v * (1. - s);
        let q = v * (1. - s * f);
        let t = v * (1. - s * (1. - f));
        let (r, g, b) = match i as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        RGBA { r, g, b, a: self.a }
    }
}

#[inline]
fn lerp(v1: f64, v2: f64, f: f64) -> f64 { v1 * (1. - f) + v2 * f }

/// Interpolate channel-wise between two RGB colors.
pub fn interp_rgb(c1: &Color, c2: &Color, f: f64) -> Color {
    RGBA { r: lerp(c1.r, c2.r, f), g: lerp(c1.g, c2.g, f),
           b: lerp(c1.b, c2.b, f), a: lerp(c1.a, c2.a, f) }
}

/// Interpolate between two colors in HSV space.
///
/// When one end is gray its (undefined) hue is taken from the other
/// end, so a gray to color blend never sweeps through the hue circle.
///
/// ```
/// use gradient_palette::color::{self, Hsv};
/// let c = color::interp_hsv(&color::gray(0.5), &color::rgb(0., 1., 1.), 0.5);
/// assert!((Hsv::from_rgb(&c).h - 0.5).abs() < 1e-12);
/// ```
pub fn interp_hsv(c1: &Color, c2: &Color, f: f64) -> Color {
    let mut hsv1 = Hsv::from_rgb(c1);
    let mut hsv2 = Hsv::from_rgb(c2);
    match (hsv1.has_hue(), hsv2.has_hue()) {
        (false, false) => { hsv1.h = 0.; hsv2.h = 0.; }
        (false, true) => hsv1.h = hsv2.h,
        (true, false) => hsv2.h = hsv1.h,
        (true, true) => (),
    }
    Hsv { h: lerp(hsv1.h, hsv2.h, f), s: lerp(hsv1.s, hsv2.s, f),
          v: lerp(hsv1.v, hsv2.v, f), a: lerp(hsv1.a, hsv2.a, f) }.to_rgb()
}

/// Interpolate in the space matching `model`: HSV for
/// [`ColorModel::Hsv`], RGB otherwise.
pub fn interp(model: ColorModel, c1: &Color, c2: &Color, f: f64) -> Color {
    match model {
        ColorModel::Hsv => interp_hsv(c1, c2, f),
        _ => interp_rgb(c1, c2, f),
    }
}

/// Convert the triple `(a, b, c)` expressed in `model` to RGB.  The
/// result is clamped.  CMY, YIQ and XYZ follow the gnuplot formulas.
pub fn from_model(model: ColorModel, a: f64, b: f64, c: f64) -> Color {
    let rgba = match model {
        ColorModel::None | ColorModel::Rgb => rgb(a, b, c),
        ColorModel::Hsv => Hsv { h: a, s: b, v: c, a: 1. }.to_rgb(),
        ColorModel::Cmy => rgb(1. - a, 1. - b, 1. - c),
        ColorModel::Yiq => rgb(a + 0.956 * b + 0.621 * c,
                               a - 0.272 * b - 0.647 * c,
                               a - 1.105 * b + 1.702 * c),
        ColorModel::Xyz => rgb(3.240479 * a - 1.537150 * b - 0.498535 * c,
                               -0.969256 * a + 1.875992 * b + 0.041556 * c,
                               0.055648 * a - 0.204043 * b + 1.057311 * c),
    };
    clamp(rgba)
}

/// The three components of `c` in `model`, the inverse of
/// [`from_model`] for RGB, HSV and CMY.  Other models report RGB.
pub fn to_model(model: ColorModel, c: &Color) -> [f64; 3] {
    match model {
        ColorModel::Hsv => {
            let hsv = Hsv::from_rgb(c);
            [hsv.h.max(0.), hsv.s, hsv.v]
        }
        ColorModel::Cmy => [1. - c.r, 1. - c.g, 1. - c.b],
        _ => [c.r, c.g, c.b],
    }
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
pub fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !hex.is_ascii() { return None }
    let byte = |i: usize| u8::from_str_radix(&hex[i .. i + 2], 16).ok();
    let (r, g, b, a) = match hex.len() {
        3 => {
            let n = |i: usize| u8::from_str_radix(&hex[i .. i + 1], 16).ok()
                .map(|v| v * 17);
            (n(0)?, n(1)?, n(2)?, 255)
        }
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    let f = |v: u8| v as f64 / 255.;
    Some(RGBA { r: f(r), g: f(g), b: f(b), a: f(a) })
}

/// Format `c` as `#rrggbb`, or `#rrggbbaa` when not opaque.
pub fn to_hex(c: &Color) -> String {
    let c = clamp(*c);
    let q = |v: f64| (v * 255.).round() as u8;
    if q(c.a) == 255 {
        format!("#{:02x}{:02x}{:02x}", q(c.r), q(c.g), q(c.b))
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", q(c.r), q(c.g), q(c.b), q(c.a))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn close(c1: &Color, c2: &Color) -> bool {
        (c1.r - c2.r).abs() < 1e-9 && (c1.g - c2.g).abs() < 1e-9
            && (c1.b - c2.b).abs() < 1e-9 && (c1.a - c2.a).abs() < 1e-9
    }

    #[test]
    fn hsv_round_trip() {
        for c in [rgb(1., 0., 0.), rgb(0.2, 0.7, 0.4), rgb(0.9, 0.1, 0.8),
                  rgb(0., 0., 1.), gray(0.3)] {
            let back = Hsv::from_rgb(&c).to_rgb();
            assert!(close(&c, &back), "{:?} ≉ {:?}", c, back);
        }
    }

    #[test]
    fn gray_has_no_hue() {
        assert!(!Hsv::from_rgb(&gray(0.4)).has_hue());
        assert!(!Hsv::from_rgb(&rgb(0., 0., 0.)).has_hue());
        assert_eq!(Hsv::from_rgb(&rgb(0., 1., 1.)).h, 0.5);
    }

    #[test]
    fn hsv_gray_fix() {
        let c1 = gray(0.2);
        let c2 = rgb(0., 0.8, 0.8);
        for i in 1 ..= 10 {
            let f = i as f64 / 10.;
            let hsv = Hsv::from_rgb(&interp_hsv(&c1, &c2, f));
            assert!((hsv.h - 0.5).abs() < 1e-9, "hue {} at {}", hsv.h, f);
        }
    }

    #[test]
    fn rgb_interp_bounds() {
        let c = interp_rgb(&rgb(0., 0.5, 1.), &rgb(1., 0.5, 0.), 0.25);
        assert!(close(&c, &rgb(0.25, 0.5, 0.75)));
    }

    #[test]
    fn other_models() {
        assert!(close(&from_model(ColorModel::Cmy, 1., 0., 0.25),
                      &rgb(0., 1., 0.75)));
        assert!(close(&from_model(ColorModel::Yiq, 0.5, 0., 0.), &gray(0.5)));
        assert!(close(&from_model(ColorModel::Hsv, 0., 1., 1.),
                      &rgb(1., 0., 0.)));
        let w = from_model(ColorModel::Xyz, 0.9505, 1., 1.089);
        assert!((w.r - 1.).abs() < 1e-2 && (w.g - 1.).abs() < 1e-2);
    }

    #[test]
    fn hex() {
        let c = parse_hex("#ff8000").unwrap();
        assert!(close(&c, &rgb(1., 128. / 255., 0.)));
        assert_eq!(to_hex(&c), "#ff8000");
        assert_eq!(to_hex(&parse_hex("#00ff0088").unwrap()), "#00ff0088");
        assert_eq!(to_hex(&parse_hex("0f0").unwrap()), "#00ff00");
        assert!(parse_hex("#12345").is_none());
        assert!(parse_hex("zzzzzz").is_none());
    }
}
