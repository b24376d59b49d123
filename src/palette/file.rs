//! Text format of palette files.
//!
//! # Format
//!
//! One attribute per line; blank lines and lines starting with `#`
//! are ignored.
//!
//! ```text
//! name <text>
//! desc <text>
//! color_type model|defined|functions|cubehelix|custom|none
//! color_model rgb|hsv|cmy|yiq|xyz|none
//! model <r> <g> <b>
//! gray <0|1>
//! negative <0|1> <0|1> <0|1>
//! red_range <min> <max>            (also green_range, blue_range)
//! red_function <expression>        (also green_function, blue_function)
//! cubehelix <start> <cycles> <saturation>
//! cube_negative <0|1>
//! distinct <0|1>
//! inverted <0|1>
//! num_colors <n>
//! <key> <r> <g> <b> [<a>]          components in [0, 1]
//! <key> #rrggbb[aa]
//! ```
//!
//! A line that cannot be understood is skipped and reported as a
//! [`ParseWarning`]; reading never fails on content.

use std::fmt;
use std::io::{self, Write};

use tracing::warn;

use crate::color::{self, Color};
use crate::cubehelix::CubeHelix;
use crate::formula::FormulaEvaluator;
use crate::model;
use crate::palette::{Channel, ColorModel, ColorType, DefinedColor, DefinedColors};

/// A palette file line that was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    /// Line number, starting at 1.
    pub line: usize,
    pub text: String,
    pub reason: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} (“{}”)", self.line, self.reason, self.text)
    }
}

/// Outcome of reading a palette file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadReport {
    /// Number of defined colors read.
    pub colors: usize,
    pub warnings: Vec<ParseWarning>,
}

impl ReadReport {
    /// Whether every line was understood.
    pub fn is_clean(&self) -> bool { self.warnings.is_empty() }
}

/// The attributes set by a palette file.  Attributes absent from the
/// file are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteFile {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub color_type: Option<ColorType>,
    pub color_model: Option<ColorModel>,
    pub models: Option<[usize; 3]>,
    pub gray: Option<bool>,
    pub negative: Option<[bool; 3]>,
    pub ranges: [Option<(f64, f64)>; 3],
    pub functions: [Option<String>; 3],
    pub cube_helix: Option<CubeHelix>,
    pub cube_negative: Option<bool>,
    pub distinct: Option<bool>,
    pub inverted: Option<bool>,
    pub num_colors: Option<usize>,
    /// Defined colors in ascending key order, keys unique.
    pub colors: Vec<DefinedColor>,
}

type LineResult = std::result::Result<(), String>;

fn number(s: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("“{s}” is not a number")),
    }
}

fn flag(s: &str) -> std::result::Result<bool, String> {
    match s {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(format!("“{s}” is not a boolean")),
    }
}

fn args<'a, const N: usize>(words: &[&'a str]) -> std::result::Result<[&'a str; N], String> {
    <[&'a str; N]>::try_from(words)
        .map_err(|_| format!("expected {N} value(s), got {}", words.len()))
}

fn channel_keyword(keyword: &str, suffix: &str) -> Option<Channel> {
    let name = keyword.strip_suffix(suffix)?;
    Channel::ALL.into_iter().find(|c| c.name() == name)
}

impl PaletteFile {
    /// Parse the text of a palette file.  When `evaluator` is given,
    /// channel functions it rejects are reported (and still kept).
    pub fn parse(text: &str, evaluator: Option<&dyn FormulaEvaluator>)
                 -> (PaletteFile, Vec<ParseWarning>) {
        let mut file = PaletteFile::default();
        let mut colors = DefinedColors::new();
        let mut warnings = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') { continue }
            let r = file.parse_line(trimmed, &mut colors, evaluator);
            if let Err(reason) = r {
                warn!(line = n + 1, %reason, "skipping palette file line");
                warnings.push(ParseWarning { line: n + 1, text: trimmed.to_string(),
                                             reason });
            }
        }
        file.colors = colors.stored().to_vec();
        (file, warnings)
    }

    fn parse_line(&mut self, line: &str, colors: &mut DefinedColors,
                  evaluator: Option<&dyn FormulaEvaluator>) -> LineResult {
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };
        let words: Vec<&str> = rest.split_whitespace().collect();
        if keyword.parse::<f64>().is_ok() {
            return parse_color(keyword, &words, colors)
        }
        if let Some(ch) = channel_keyword(keyword, "_range") {
            let [min, max] = args::<2>(&words)?;
            self.ranges[ch.index()] = Some((number(min)?, number(max)?));
            return Ok(())
        }
        if let Some(ch) = channel_keyword(keyword, "_function") {
            if let (Some(ev), false) = (evaluator, rest.is_empty()) {
                if let Err(e) = ev.check(rest) {
                    self.functions[ch.index()] = Some(rest.to_string());
                    return Err(format!("{ch} function kept but invalid: {e}"))
                }
            }
            self.functions[ch.index()] = Some(rest.to_string());
            return Ok(())
        }
        match keyword {
            "name" => self.name = Some(rest.to_string()),
            "desc" => self.desc = Some(rest.to_string()),
            "color_type" => {
                let [t] = args::<1>(&words)?;
                self.color_type = Some(t.parse().map_err(|e| format!("{e}"))?);
            }
            "color_model" => {
                let [m] = args::<1>(&words)?;
                self.color_model = Some(m.parse().map_err(|e| format!("{e}"))?);
            }
            "model" => {
                let w = args::<3>(&words)?;
                let mut m = [0; 3];
                for (i, s) in w.iter().enumerate() {
                    let ind = s.parse::<usize>()
                        .map_err(|_| format!("“{s}” is not a model index"))?;
                    m[i] = model::check(ind).map_err(|e| format!("{e}"))?;
                }
                self.models = Some(m);
            }
            "gray" => self.gray = Some(flag(args::<1>(&words)?[0])?),
            "negative" => {
                let [r, g, b] = args::<3>(&words)?;
                self.negative = Some([flag(r)?, flag(g)?, flag(b)?]);
            }
            "cubehelix" => {
                let [s, c, sat] = args::<3>(&words)?;
                self.cube_helix = Some(CubeHelix::new(number(s)?, number(c)?,
                                                      number(sat)?));
            }
            "cube_negative" => self.cube_negative = Some(flag(args::<1>(&words)?[0])?),
            "distinct" => self.distinct = Some(flag(args::<1>(&words)?[0])?),
            "inverted" => self.inverted = Some(flag(args::<1>(&words)?[0])?),
            "num_colors" => {
                let [n] = args::<1>(&words)?;
                match n.parse::<usize>() {
                    Ok(n) if n > 0 => self.num_colors = Some(n),
                    _ => return Err(format!("“{n}” is not a positive count")),
                }
            }
            _ => return Err(format!("unknown keyword “{keyword}”")),
        }
        Ok(())
    }

    /// Write the file.  Absent attributes are omitted.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        let b = |v: bool| if v { 1 } else { 0 };
        writeln!(w, "# palette")?;
        if let Some(name) = self.name.as_deref().filter(|s| !s.is_empty()) {
            writeln!(w, "name {name}")?;
        }
        if let Some(desc) = self.desc.as_deref().filter(|s| !s.is_empty()) {
            writeln!(w, "desc {desc}")?;
        }
        if let Some(t) = self.color_type { writeln!(w, "color_type {t}")?; }
        if let Some(m) = self.color_model { writeln!(w, "color_model {m}")?; }
        if let Some([r, g, bl]) = self.models { writeln!(w, "model {r} {g} {bl}")?; }
        if let Some(gray) = self.gray { writeln!(w, "gray {}", b(gray))?; }
        if let Some([r, g, bl]) = self.negative {
            writeln!(w, "negative {} {} {}", b(r), b(g), b(bl))?;
        }
        for ch in Channel::ALL {
            if let Some((min, max)) = self.ranges[ch.index()] {
                writeln!(w, "{ch}_range {min} {max}")?;
            }
        }
        for ch in Channel::ALL {
            if let Some(f) = self.functions[ch.index()].as_deref().filter(|f| !f.is_empty()) {
                writeln!(w, "{ch}_function {f}")?;
            }
        }
        if let Some(ch) = self.cube_helix {
            writeln!(w, "cubehelix {} {} {}", ch.start, ch.cycles, ch.saturation)?;
        }
        if let Some(v) = self.cube_negative { writeln!(w, "cube_negative {}", b(v))?; }
        if let Some(v) = self.distinct { writeln!(w, "distinct {}", b(v))?; }
        if let Some(v) = self.inverted { writeln!(w, "inverted {}", b(v))?; }
        if let Some(n) = self.num_colors { writeln!(w, "num_colors {n}")?; }
        for c in &self.colors {
            let Color { r, g, b, a } = c.color;
            if a == 1. { writeln!(w, "{} {r} {g} {b}", c.key)?; }
            else { writeln!(w, "{} {r} {g} {b} {a}", c.key)?; }
        }
        Ok(())
    }
}

fn parse_color(key: &str, words: &[&str], colors: &mut DefinedColors) -> LineResult {
    let key = number(key)?;
    let color = match words {
        [hex] => color::parse_hex(hex)
            .ok_or_else(|| format!("“{hex}” is not a hex color"))?,
        [_, _, _] | [_, _, _, _] => {
            let mut v = [1.; 4];
            for (i, s) in words.iter().enumerate() {
                v[i] = number(s)?;
                if !(0. ..= 1.).contains(&v[i]) {
                    return Err(format!("color component {s} not in [0, 1]"))
                }
            }
            Color { r: v[0], g: v[1], b: v[2], a: v[3] }
        }
        _ => return Err(format!("expected a color after key {key}")),
    };
    colors.add(key, color).map(|_| ()).map_err(|e| format!("{e}"))
}

impl fmt::Display for PaletteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}
