//! The catalog of channel functions used by
//! [`ColorType::Model`](crate::ColorType::Model) palettes.
//!
//! These are the classic gnuplot `rgbformulae`: 37 functions of
//! `x` ∈ \[0, 1\] indexed from 0 to 36.  Angles are in degrees.  The
//! functions return the raw formula value, which may leave \[0, 1\]
//! (`3x` reaches 3, `sin(360x)` goes negative); palettes clamp the
//! value before using it.

use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Number of model functions.
pub const NUM_MODELS: usize = 37;

const DEG: f64 = PI / 180.;

const NAMES: [&str; NUM_MODELS] = [
    "0", "0.5", "1", "x", "x^2", "x^3", "x^4", "sqrt(x)", "sqrt(sqrt(x))",
    "sin(90x)", "cos(90x)", "|x-0.5|", "(2x-1)^2", "sin(180x)",
    "|cos(180x)|", "sin(360x)", "cos(360x)", "|sin(360x)|", "|cos(360x)|",
    "|sin(720x)|", "|cos(720x)|", "3x", "3x-1", "3x-2", "|3x-1|", "|3x-2|",
    "(3x-1)/2", "(3x-2)/2", "|(3x-1)/2|", "|(3x-2)/2|", "x/0.32-0.78125",
    "2*x-0.84", "4x;1;-2x+1.84;x/0.08-11.5", "|2*x - 0.5|", "2*x",
    "2*x - 0.5", "2*x - 1",
];

/// Value of model function `ind` at `x`, `None` for an unknown index.
pub(crate) fn model_value(ind: usize, x: f64) -> Option<f64> {
    let v = match ind {
        0 => 0.,
        1 => 0.5,
        2 => 1.,
        3 => x,
        4 => x * x,
        5 => x * x * x,
        6 => x * x * x * x,
        7 => x.sqrt(),
        8 => x.sqrt().sqrt(),
        9 => (90. * x * DEG).sin(),
        10 => (90. * x * DEG).cos(),
        11 => (x - 0.5).abs(),
        12 => (2. * x - 1.) * (2. * x - 1.),
        13 => (180. * x * DEG).sin(),
        14 => (180. * x * DEG).cos().abs(),
        15 => (360. * x * DEG).sin(),
        16 => (360. * x * DEG).cos(),
        17 => (360. * x * DEG).sin().abs(),
        18 => (360. * x * DEG).cos().abs(),
        19 => (720. * x * DEG).sin().abs(),
        20 => (720. * x * DEG).cos().abs(),
        21 => 3. * x,
        22 => 3. * x - 1.,
        23 => 3. * x - 2.,
        24 => (3. * x - 1.).abs(),
        25 => (3. * x - 2.).abs(),
        26 => 1.5 * x - 0.5,
        27 => 1.5 * x - 1.,
        28 => (1.5 * x - 0.5).abs(),
        29 => (1.5 * x - 1.).abs(),
        30 => {
            if x <= 0.25 { 0. }
            else if x >= 0.57 { 1. }
            else { x / 0.32 - 0.78125 }
        }
        31 => {
            if x <= 0.42 { 0. }
            else if x >= 0.92 { 1. }
            else { 2. * x - 0.84 }
        }
        32 => {
            if x <= 0.25 { 4. * x }
            else if x <= 0.42 { 1. }
            else if x <= 0.92 { -2. * x + 1.84 }
            else { x / 0.08 - 11.5 }
        }
        33 => (2. * x - 0.5).abs(),
        34 => 2. * x,
        35 => 2. * x - 0.5,
        36 => 2. * x - 1.,
        _ => return None,
    };
    Some(v)
}

fn invalid(ind: usize) -> Error {
    Error::InvalidArgument(format!("model index {ind} not in 0..={}",
                                   NUM_MODELS - 1))
}

/// Evaluate model function `ind` at `x`.
///
/// # Example
///
/// ```
/// use gradient_palette::model::interp_model;
/// assert_eq!(interp_model(7, 0.25).unwrap(), 0.5);
/// assert!(interp_model(37, 0.5).is_err());
/// ```
pub fn interp_model(ind: usize, x: f64) -> Result<f64> {
    model_value(ind, x).ok_or_else(|| invalid(ind))
}

/// Human readable formula of model function `ind`.
pub fn model_name(ind: usize) -> Result<&'static str> {
    NAMES.get(ind).copied().ok_or_else(|| invalid(ind))
}

/// Check that `ind` names a model function.
pub(crate) fn check(ind: usize) -> Result<usize> {
    if ind < NUM_MODELS { Ok(ind) } else { Err(invalid(ind)) }
}
