//! The palette engine: maps a value `x` to a color using one of the
//! strategies of [`ColorType`].

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use image::{Rgba, RgbaImage};
use rgb::RGBA8;
use tracing::{debug, warn};

use crate::color::{self, Color};
use crate::cubehelix::CubeHelix;
use crate::error::{Error, Result};
use crate::formula::{FormulaEvaluator, NativeEvaluator};
use crate::model;
use crate::RGBColor;

mod defined;
mod file;
mod ty;

pub use defined::{DefinedColor, DefinedColors, MAX_NUDGES, NUDGE};
pub use file::{PaletteFile, ParseWarning, ReadReport};
pub use ty::{Channel, ColorModel, ColorType, WrapMode};

/// Number of colors of a palette used when no count is given.
pub const DEFAULT_NUM_COLORS: usize = 100;

#[inline]
fn unit(x: f64) -> f64 { if x.is_nan() { 0. } else { x.clamp(0., 1.) } }

/// Settings of one channel of a [`ColorType::Model`] palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelModel {
    /// Index of the function in [`model`](crate::model).
    pub model: usize,
    pub negative: bool,
    pub min: f64,
    pub max: f64,
}

impl ChannelModel {
    fn new(model: usize) -> Self {
        ChannelModel { model, negative: false, min: 0., max: 1. }
    }

    /// Channel value at `x` ∈ \[0, 1\]: the model function, clamped to
    /// \[0, 1\], scaled to `min ..= max` and complemented if negative.
    pub fn value(&self, x: f64) -> f64 {
        let v = unit(model::model_value(self.model, x).unwrap_or(0.));
        let v = self.min + (self.max - self.min) * v;
        if self.negative { 1. - v } else { v }
    }
}

/// Channel settings of [`ColorType::Model`] palettes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelData {
    pub channels: [ChannelModel; 3],
    /// Use the gray ramp `(x, x, x)` instead of the channel functions.
    pub gray: bool,
}

impl Default for ModelData {
    /// The classic gnuplot `rgbformulae 7,5,15`.
    fn default() -> Self {
        ModelData { channels: [ChannelModel::new(7), ChannelModel::new(5),
                               ChannelModel::new(15)],
                    gray: false }
    }
}

/// Handle returned by [`Palette::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// A color palette.
///
/// Every mutator notifies the observers registered with
/// [`on_change`](Self::on_change) once, after the state has changed.
pub struct Palette {
    name: String,
    desc: String,
    color_type: ColorType,
    color_model: ColorModel,
    model: ModelData,
    functions: [String; 3],
    cube_helix: CubeHelix,
    cube_negative: bool,
    defined: DefinedColors,
    default_num_colors: usize,
    evaluator: Rc<dyn FormulaEvaluator>,
    gradient: Option<RgbaImage>,
    gradient_dirty: bool,
    observers: Vec<(ObserverId, Box<dyn FnMut()>)>,
    next_observer: usize,
}

impl Default for Palette {
    fn default() -> Self { Self::new() }
}

impl Clone for Palette {
    /// Copy the palette.  The clone shares the formula evaluator and
    /// has no observers.
    fn clone(&self) -> Self {
        let mut p = Palette::with_evaluator(Rc::clone(&self.evaluator));
        p.copy_state(self);
        p
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette")
            .field("name", &self.name)
            .field("desc", &self.desc)
            .field("color_type", &self.color_type)
            .field("color_model", &self.color_model)
            .field("model", &self.model)
            .field("functions", &self.functions)
            .field("cube_helix", &self.cube_helix)
            .field("cube_negative", &self.cube_negative)
            .field("defined", &self.defined)
            .field("default_num_colors", &self.default_num_colors)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Palette {
    /// A [`ColorType::Model`] palette with the default settings,
    /// evaluating formulas with [`NativeEvaluator`].
    pub fn new() -> Self { Self::with_evaluator(Rc::new(NativeEvaluator::new())) }

    pub fn with_evaluator(evaluator: Rc<dyn FormulaEvaluator>) -> Self {
        Palette {
            name: String::new(),
            desc: String::new(),
            color_type: ColorType::default(),
            color_model: ColorModel::default(),
            model: ModelData::default(),
            functions: Default::default(),
            cube_helix: CubeHelix::default(),
            cube_negative: false,
            defined: DefinedColors::new(),
            default_num_colors: DEFAULT_NUM_COLORS,
            evaluator,
            gradient: None,
            gradient_dirty: true,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// Replace the evaluator of [`ColorType::Functions`] palettes.
    pub fn set_evaluator(&mut self, evaluator: Rc<dyn FormulaEvaluator>) {
        self.evaluator = evaluator;
        self.changed();
    }

    /// Register `f` to be called after every change of the palette.
    pub fn on_change(&mut self, f: impl FnMut() + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(f)));
        id
    }

    /// Unregister an observer.  Returns `false` if it was not registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let len = self.observers.len();
        self.observers.retain(|(i, _)| *i != id);
        self.observers.len() != len
    }

    fn notify(&mut self) {
        for (_, f) in &mut self.observers { f() }
    }

    /// The colors may have changed.
    fn changed(&mut self) {
        self.gradient_dirty = true;
        self.notify();
    }

    // Metadata.

    pub fn name(&self) -> &str { &self.name }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.notify();
    }

    pub fn desc(&self) -> &str { &self.desc }

    pub fn set_desc(&mut self, desc: impl Into<String>) {
        self.desc = desc.into();
        self.notify();
    }

    pub fn color_type(&self) -> ColorType { self.color_type }

    pub fn set_color_type(&mut self, t: ColorType) {
        self.color_type = t;
        self.changed();
    }

    pub fn color_model(&self) -> ColorModel { self.color_model }

    pub fn set_color_model(&mut self, m: ColorModel) {
        self.color_model = m;
        self.changed();
    }

    // Model palettes.

    pub fn model_data(&self) -> &ModelData { &self.model }

    /// Select the model functions of the three channels.  Nothing
    /// changes if one index is invalid.
    pub fn set_rgb_model(&mut self, r: usize, g: usize, b: usize) -> Result<()> {
        let m = [model::check(r)?, model::check(g)?, model::check(b)?];
        for (ch, m) in self.model.channels.iter_mut().zip(m) { ch.model = m }
        self.changed();
        Ok(())
    }

    pub fn model(&self, ch: Channel) -> usize { self.model.channels[ch.index()].model }

    pub fn set_model(&mut self, ch: Channel, ind: usize) -> Result<()> {
        self.model.channels[ch.index()].model = model::check(ind)?;
        self.changed();
        Ok(())
    }

    pub fn is_gray(&self) -> bool { self.model.gray }

    pub fn set_gray(&mut self, gray: bool) {
        self.model.gray = gray;
        self.changed();
    }

    pub fn is_negative(&self, ch: Channel) -> bool {
        self.model.channels[ch.index()].negative
    }

    pub fn set_negative(&mut self, ch: Channel, negative: bool) {
        self.model.channels[ch.index()].negative = negative;
        self.changed();
    }

    /// Output range `(min, max)` of a channel.
    pub fn channel_range(&self, ch: Channel) -> (f64, f64) {
        let c = &self.model.channels[ch.index()];
        (c.min, c.max)
    }

    /// Set the lower bound of a channel, clamped to \[0, max\].
    pub fn set_channel_min(&mut self, ch: Channel, min: f64) {
        let c = &mut self.model.channels[ch.index()];
        c.min = unit(min).min(c.max);
        self.changed();
    }

    /// Set the upper bound of a channel, clamped to \[min, 1\].
    pub fn set_channel_max(&mut self, ch: Channel, max: f64) {
        let c = &mut self.model.channels[ch.index()];
        c.max = unit(max).max(c.min);
        self.changed();
    }

    /// Set both bounds of a channel.  They are clamped to \[0, 1\] and
    /// swapped if needed.
    pub fn set_channel_range(&mut self, ch: Channel, min: f64, max: f64) {
        let (min, max) = (unit(min), unit(max));
        let c = &mut self.model.channels[ch.index()];
        (c.min, c.max) = if min <= max { (min, max) } else { (max, min) };
        self.changed();
    }

    // Defined colors.

    pub fn defined_colors(&self) -> &DefinedColors { &self.defined }

    pub fn num_defined_colors(&self) -> usize { self.defined.len() }

    /// Row `i` of the defined colors (in view order).
    pub fn defined_color(&self, i: usize) -> Result<DefinedColor> { self.defined.get(i) }

    pub fn is_defined_color(&self, key: f64) -> bool { self.defined.contains(key) }

    /// Add a control color.  If `key` is taken it is nudged upwards;
    /// the key actually used is returned.
    pub fn add_defined_color(&mut self, key: f64, color: Color) -> Result<f64> {
        let k = self.defined.add(key, color)?;
        self.changed();
        Ok(k)
    }

    pub fn set_defined_color(&mut self, i: usize, color: Color) -> Result<()> {
        self.defined.set(i, color)?;
        self.changed();
        Ok(())
    }

    pub fn remove_defined_color(&mut self, i: usize) -> Result<DefinedColor> {
        let c = self.defined.remove(i)?;
        self.changed();
        Ok(c)
    }

    /// Remove all the defined colors.
    pub fn reset_defined_colors(&mut self) {
        self.defined.clear();
        self.changed();
    }

    /// Replace all the defined colors at once.
    pub fn set_defined_colors(&mut self, colors: impl IntoIterator<Item = DefinedColor>)
                              -> Result<()> {
        self.defined.set_all(colors)?;
        self.changed();
        Ok(())
    }

    pub fn map_defined_color_x(&self, x: f64) -> f64 { self.defined.map_x(x) }

    pub fn unmap_defined_color_x(&self, x: f64) -> f64 { self.defined.unmap_x(x) }

    pub fn is_distinct(&self) -> bool { self.defined.is_distinct() }

    pub fn set_distinct(&mut self, distinct: bool) {
        self.defined.set_distinct(distinct);
        self.changed();
    }

    pub fn is_inverted(&self) -> bool { self.defined.is_inverted() }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.defined.set_inverted(inverted);
        self.changed();
    }

    pub fn default_num_colors(&self) -> usize { self.default_num_colors }

    /// Set the number of colors used when none is requested (at least 1).
    pub fn set_default_num_colors(&mut self, n: usize) {
        self.default_num_colors = n.max(1);
        self.changed();
    }

    // Function palettes.

    pub fn function(&self, ch: Channel) -> &str { &self.functions[ch.index()] }

    /// Set the formula of a channel.  It is stored verbatim; an empty
    /// formula uses the channel's model value.
    pub fn set_function(&mut self, ch: Channel, expression: impl Into<String>) {
        self.functions[ch.index()] = expression.into();
        self.changed();
    }

    pub fn set_functions(&mut self, r: impl Into<String>, g: impl Into<String>,
                         b: impl Into<String>) {
        self.functions = [r.into(), g.into(), b.into()];
        self.changed();
    }

    /// Check a formula with the palette's evaluator.
    pub fn check_function(&self, ch: Channel, expression: &str) -> Result<()> {
        self.evaluator.check(expression).map_err(|source| Error::Eval {
            channel: ch, expression: expression.to_string(), source })
    }

    // Cube-helix palettes.

    pub fn cube_helix(&self) -> &CubeHelix { &self.cube_helix }

    pub fn set_cube_helix(&mut self, start: f64, cycles: f64, saturation: f64) {
        self.cube_helix = CubeHelix::new(start, cycles, saturation);
        self.changed();
    }

    pub fn set_cube_helix_start(&mut self, start: f64) {
        self.cube_helix.start = start;
        self.changed();
    }

    pub fn set_cube_helix_cycles(&mut self, cycles: f64) {
        self.cube_helix.cycles = cycles;
        self.changed();
    }

    pub fn set_cube_helix_saturation(&mut self, saturation: f64) {
        self.cube_helix.saturation = saturation;
        self.changed();
    }

    pub fn is_cube_negative(&self) -> bool { self.cube_negative }

    pub fn set_cube_negative(&mut self, negative: bool) {
        self.cube_negative = negative;
        self.changed();
    }

    // Sampling.

    fn model_color(&self, x: f64) -> Color {
        if self.model.gray { return color::gray(x) }
        let [a, b, c] = self.model.channels.map(|ch| ch.value(x));
        color::from_model(self.color_model, a, b, c)
    }

    fn function_color(&self, x: f64) -> (Color, Option<Error>) {
        let mut err = None;
        let mut v = [0.; 3];
        for ch in Channel::ALL {
            let i = ch.index();
            let expression = self.functions[i].trim();
            v[i] = if expression.is_empty() {
                self.model.channels[i].value(x)
            } else {
                match self.evaluator.evaluate(expression, x) {
                    Ok(v) => unit(v),
                    Err(source) => {
                        if err.is_none() {
                            err = Some(Error::Eval {
                                channel: ch, expression: expression.to_string(),
                                source });
                        }
                        0.
                    }
                }
            };
        }
        (color::from_model(self.color_model, v[0], v[1], v[2]), err)
    }

    fn sample(&self, x: f64, scale: bool, invert: bool) -> (Color, Option<Error>) {
        let x = if scale { self.defined.map_x(x) } else { x };
        let x = unit(if invert { 1. - x } else { x });
        match self.color_type {
            ColorType::Model => (self.model_color(x), None),
            ColorType::Defined => {
                let c = self.defined.interp(x, self.color_model)
                    .map_or_else(|| color::gray(x), color::clamp);
                (c, None)
            }
            ColorType::Functions => self.function_color(x),
            ColorType::CubeHelix => (self.cube_helix.interp(x, self.cube_negative), None),
            ColorType::None | ColorType::Custom => (color::gray(x), None),
        }
    }

    /// Color at `x`.  With `scale`, `x` is first normalized by the
    /// range of the defined color keys; with `invert` it is replaced
    /// by `1 - x`.  The result is then taken at `x` clamped to \[0, 1\].
    ///
    /// Formula errors are logged and the failing channel is 0; use
    /// [`try_color`](Self::try_color) to get them.
    ///
    /// ```
    /// use gradient_palette::Palette;
    /// let p = Palette::new();
    /// let c = p.get_color(1., false, false);
    /// assert_eq!((c.r, c.g, c.b), (1., 1., 0.));
    /// ```
    pub fn get_color(&self, x: f64, scale: bool, invert: bool) -> Color {
        let (c, err) = self.sample(x, scale, invert);
        if let Some(e) = err {
            warn!(x, error = %e, "palette formula failed");
        }
        c
    }

    /// Like [`get_color`](Self::get_color) but reports the first formula
    /// error.
    pub fn try_color(&self, x: f64, scale: bool, invert: bool) -> Result<Color> {
        match self.sample(x, scale, invert) {
            (_, Some(e)) => Err(e),
            (c, None) => Ok(c),
        }
    }

    /// Color `i` of a palette of `n` colors (the number of defined
    /// colors of distinct palettes, or the
    /// [default number](Self::default_num_colors), when `n` is `None`
    /// or 0).  `i` is brought into `0 .. n` with `wrap`.  Distinct
    /// defined palettes return their swatches; the others are sampled
    /// at `i / (n - 1)`.
    pub fn indexed_color(&self, i: i64, n: Option<usize>, wrap: WrapMode) -> Color {
        let distinct = self.color_type == ColorType::Defined
            && self.defined.is_distinct() && !self.defined.is_empty();
        let n = match n {
            Some(n) if n > 0 => n,
            _ if distinct => self.defined.len(),
            _ => self.default_num_colors,
        };
        let j = wrap.wrap(i, n);
        if distinct {
            if let Some(c) = self.defined.swatch(j as i64, wrap) { return c }
        }
        let x = if n > 1 { j as f64 / (n - 1) as f64 } else { 0. };
        self.get_color(x, false, false)
    }

    /// `(x, color)` stops describing the palette as a piecewise linear
    /// gradient in RGB.  The alpha of every color is multiplied by
    /// `alpha`.
    pub fn gradient_stops(&self, alpha: f64) -> Vec<(f64, Color)> {
        let alpha = unit(alpha);
        let fade = |c: Color| Color { a: c.a * alpha, ..c };
        let d = &self.defined;
        if self.color_type == ColorType::Defined && !d.is_empty() {
            if d.is_distinct() {
                let n = d.len() as f64;
                return d.iter().enumerate()
                    .flat_map(|(i, c)| [(i as f64 / n, fade(c.color)),
                                        ((i + 1) as f64 / n, fade(c.color))])
                    .collect()
            }
            if self.color_model != ColorModel::Hsv {
                return d.iter().map(|c| (d.map_x(c.key), fade(c.color))).collect()
            }
        }
        let n = self.default_num_colors.max(2);
        (0 .. n).map(|i| {
            let x = i as f64 / (n - 1) as f64;
            (x, fade(self.get_color(x, false, false)))
        }).collect()
    }

    /// Image of the palette, `x = 0` to `x = 1` from left to right when
    /// wider than tall, from bottom to top otherwise.  The image is
    /// kept until the palette changes or another size is requested.
    pub fn gradient_image(&mut self, width: u32, height: u32) -> &RgbaImage {
        let stale = self.gradient_dirty
            || self.gradient.as_ref().map_or(true, |img| img.dimensions() != (width, height));
        if stale {
            debug!(width, height, "rendering palette gradient");
            self.gradient = Some(self.render_gradient(width, height));
            self.gradient_dirty = false;
        }
        self.gradient.get_or_insert_with(|| RgbaImage::new(width, height))
    }

    fn render_gradient(&self, width: u32, height: u32) -> RgbaImage {
        let horizontal = width >= height;
        let len = if horizontal { width } else { height };
        let colors: Vec<Rgba<u8>> = (0 .. len).map(|i| {
            let x = if len > 1 { i as f64 / (len - 1) as f64 } else { 0. };
            let x = if horizontal { x } else { 1. - x };
            let c = RGBA8::from_rgba(self.get_color(x, false, false));
            Rgba([c.r, c.g, c.b, c.a])
        }).collect();
        RgbaImage::from_fn(width, height, |px, py| {
            let i = if horizontal { px } else { py };
            colors[i as usize]
        })
    }

    // Lifecycle.

    fn copy_state(&mut self, other: &Palette) {
        self.name.clone_from(&other.name);
        self.desc.clone_from(&other.desc);
        self.color_type = other.color_type;
        self.color_model = other.color_model;
        self.model = other.model;
        self.functions.clone_from(&other.functions);
        self.cube_helix = other.cube_helix;
        self.cube_negative = other.cube_negative;
        self.defined.clone_from(&other.defined);
        self.default_num_colors = other.default_num_colors;
        self.gradient_dirty = true;
    }

    /// Make the colors of `self` those of `other`.  The evaluator and
    /// observers of `self` are kept.
    pub fn assign(&mut self, other: &Palette) {
        self.copy_state(other);
        self.changed();
    }

    /// Back to the default settings, keeping the name, description,
    /// evaluator and observers.
    pub fn unset(&mut self) {
        let mut p = Palette::with_evaluator(Rc::clone(&self.evaluator));
        p.name = std::mem::take(&mut self.name);
        p.desc = std::mem::take(&mut self.desc);
        self.copy_state(&p);
        self.changed();
    }

    // Files.

    /// All the attributes of the palette, as written to files.
    pub fn to_file(&self) -> PaletteFile {
        let ch = &self.model.channels;
        PaletteFile {
            name: Some(self.name.clone()),
            desc: Some(self.desc.clone()),
            color_type: Some(self.color_type),
            color_model: Some(self.color_model),
            models: Some(ch.map(|c| c.model)),
            gray: Some(self.model.gray),
            negative: Some(ch.map(|c| c.negative)),
            ranges: ch.map(|c| Some((c.min, c.max))),
            functions: self.functions.clone().map(Some),
            cube_helix: Some(self.cube_helix),
            cube_negative: Some(self.cube_negative),
            distinct: Some(self.defined.is_distinct()),
            inverted: Some(self.defined.is_inverted()),
            num_colors: Some(self.default_num_colors),
            colors: self.defined.stored().to_vec(),
        }
    }

    /// Set the attributes present in `file` and replace the defined
    /// colors with those of the file.  Observers are notified once.
    pub fn apply_file(&mut self, file: PaletteFile) -> Result<()> {
        self.defined.set_all(file.colors.iter().copied())?;
        if let Some(name) = file.name { self.name = name }
        if let Some(desc) = file.desc { self.desc = desc }
        match file.color_type {
            Some(t) => self.color_type = t,
            None if !file.colors.is_empty() => self.color_type = ColorType::Defined,
            None => {}
        }
        if let Some(m) = file.color_model { self.color_model = m }
        if let Some(models) = file.models {
            for (c, m) in self.model.channels.iter_mut().zip(models) { c.model = m }
        }
        if let Some(gray) = file.gray { self.model.gray = gray }
        if let Some(neg) = file.negative {
            for (c, n) in self.model.channels.iter_mut().zip(neg) { c.negative = n }
        }
        for (c, r) in self.model.channels.iter_mut().zip(file.ranges) {
            if let Some((min, max)) = r {
                let (min, max) = (unit(min), unit(max));
                (c.min, c.max) = if min <= max { (min, max) } else { (max, min) };
            }
        }
        for (f, g) in self.functions.iter_mut().zip(file.functions) {
            if let Some(g) = g { *f = g }
        }
        if let Some(ch) = file.cube_helix { self.cube_helix = ch }
        if let Some(n) = file.cube_negative { self.cube_negative = n }
        if let Some(d) = file.distinct { self.defined.set_distinct(d) }
        if let Some(i) = file.inverted { self.defined.set_inverted(i) }
        if let Some(n) = file.num_colors { self.default_num_colors = n.max(1) }
        self.changed();
        Ok(())
    }

    /// Read the palette from the text of a palette file.  Lines that
    /// cannot be understood are skipped and reported.
    pub fn read_str(&mut self, text: &str) -> ReadReport {
        let (file, mut warnings) = PaletteFile::parse(text, Some(self.evaluator.as_ref()));
        let colors = file.colors.len();
        if let Err(e) = self.apply_file(file) {
            // Keys coming from the parser are unique so this is not expected.
            warn!(error = %e, "cannot set the defined colors");
            warnings.push(ParseWarning { line: 0, text: String::new(),
                                         reason: e.to_string() });
        }
        ReadReport { colors, warnings }
    }

    /// Read the palette from a file.  See [`PaletteFile`] for the
    /// format.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<ReadReport> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let report = self.read_str(&text);
        debug!(path = %path.display(), colors = report.colors,
               warnings = report.warnings.len(), "read palette file");
        Ok(report)
    }

    /// Write the palette to a file.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut w = BufWriter::new(f);
        self.to_file().write_to(&mut w).map_err(|e| Error::io(path, e))?;
        w.flush().map_err(|e| Error::io(path, e))?;
        debug!(path = %path.display(), "saved palette file");
        Ok(())
    }
}
