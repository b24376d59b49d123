use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How a palette computes the color of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ColorType {
    /// No strategy: the palette is a gray ramp.
    None,
    /// Each channel is one of the numbered functions of
    /// [`model`](crate::model), scaled to the channel's range.
    #[default]
    Model,
    /// Interpolation between explicit control colors (or, when the
    /// palette is distinct, the control colors themselves).
    Defined,
    /// Each channel is a user formula of `x`.
    Functions,
    /// Green's cube-helix scheme.
    CubeHelix,
    /// Reserved for colors computed outside the palette; renders as a
    /// gray ramp.
    Custom,
}

/// The color space in which the three channels of
/// [`ColorType::Model`] and [`ColorType::Functions`] palettes are
/// interpreted.  It also selects HSV interpolation between defined
/// colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ColorModel {
    /// Treated as RGB.
    None,
    #[default]
    Rgb,
    Hsv,
    Cmy,
    Yiq,
    Xyz,
}

/// How an out of range index is brought back into `0 .. n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    /// Clamp to the first or last index.
    #[default]
    None,
    /// Start again from the first index.
    Repeat,
    /// Bounce back and forth: `0, 1, …, n-1, n-2, …, 1, 0, 1, …`.
    Reflect,
}

/// One of the three channels of a palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Position of the channel in an RGB (or HSV) triple.
    #[inline]
    pub fn index(self) -> usize { self as usize }
}

impl WrapMode {
    /// Bring `i` into `0 .. n` (`n ≥ 1`).
    ///
    /// ```
    /// use gradient_palette::WrapMode;
    /// assert_eq!(WrapMode::None.wrap(7, 5), 4);
    /// assert_eq!(WrapMode::Repeat.wrap(7, 5), 2);
    /// assert_eq!(WrapMode::Reflect.wrap(7, 5), 1);
    /// assert_eq!(WrapMode::Repeat.wrap(-1, 5), 4);
    /// ```
    pub fn wrap(self, i: i64, n: usize) -> usize {
        if n <= 1 { return 0 }
        // i128 holds any usize and twice any i64 exactly.
        let (i, n) = (i as i128, n as i128);
        let j = match self {
            WrapMode::None => i.clamp(0, n - 1),
            WrapMode::Repeat => i.rem_euclid(n),
            WrapMode::Reflect => {
                let period = 2 * (n - 1);
                let k = i.rem_euclid(period);
                if k < n { k } else { period - k }
            }
        };
        j as usize
    }
}

macro_rules! names {
    ($ty: ident, $what: literal, $($variant: ident => $name: literal),*) => {
        impl $ty {
            /// Name used in palette files.
            pub fn name(self) -> &'static str {
                match self { $( $ty::$variant => $name, )* }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Error> {
                match s {
                    $( $name => Ok($ty::$variant), )*
                    _ => Err(Error::InvalidArgument(
                        format!(concat!("unknown ", $what, " “{}”"), s))),
                }
            }
        }
    }
}

names!(ColorType, "color type",
       None => "none", Model => "model", Defined => "defined",
       Functions => "functions", CubeHelix => "cubehelix", Custom => "custom");
names!(ColorModel, "color model",
       None => "none", Rgb => "rgb", Hsv => "hsv", Cmy => "cmy", Yiq => "yiq",
       Xyz => "xyz");
names!(WrapMode, "wrap mode",
       None => "none", Repeat => "repeat", Reflect => "reflect");
names!(Channel, "channel", Red => "red", Green => "green", Blue => "blue");
