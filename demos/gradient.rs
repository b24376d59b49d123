//! Writes `gradient.html` showing a selection of palettes, followed by
//! the palette files given on the command line.

use std::{env,
          io::{BufWriter, Write},
          fs::File,
          error::Error};
use gradient_palette::{color, Channel, ColorModel, ColorRange, ColorType,
                       Palette, RGBColor, WrapMode};
use rgb::RGB8;

type Err = Box<dyn Error>;

fn css_string(c: RGB8) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

fn table_of_colors(fh: &mut impl Write, colors: &[RGB8],
                   width: u32, comment: &str) -> Result<(), Err> {
    writeln!(fh, "<table style=\"border: 0px;  border-spacing: 0px\"><tr>")?;
    for &c in colors {
        writeln!(fh, "  <td style=\"width: {width}px; height: 30px; \
                      background-color: {}\"></td>",
                css_string(c))?;
    }
    writeln!(fh, "<td rowspan=\"2\" style=\"padding-left: 7px\">\
                  {comment}</td></tr><tr>")?;
    for &c in colors {
        let c = c.to_gray();
        writeln!(fh, "  <td style=\"width: {width}px; height: 12px; \
                      background-color: {}\"></td>",
                 css_string(c))?;
    }
    writeln!(fh, "</tr></table><br/>")?;
    Ok(())
}

fn palette(fh: &mut impl Write, p: &Palette, n: usize, width: u32,
           comment: &str) -> Result<(), Err> {
    let colors: Vec<RGB8> = p.range(0., 1., n).map(|(_, c)| c).collect();
    table_of_colors(fh, &colors, width, comment)
}

fn swatches(fh: &mut impl Write, p: &Palette, n: usize,
            comment: &str) -> Result<(), Err> {
    let colors: Vec<RGB8> = (0 .. n as i64)
        .map(|i| RGB8::from_rgba(p.indexed_color(i, None, WrapMode::Repeat)))
        .collect();
    table_of_colors(fh, &colors, 40, comment)
}

fn main() -> Result<(), Err> {
    let mut fh = BufWriter::new(File::create("gradient.html")?);
    writeln!(fh, "<html>\n\
                  <head>\n\
                  <title>gradient_palette: test {}</title>\n\
                  </head>\n\
                  <body>",
             env::args().next().unwrap_or_default())?;

    writeln!(fh, "<h3>Models</h3>")?;
    let mut p = Palette::new();
    for (r, g, b, comment) in [(7, 5, 15, "traditional pm3d"),
                               (3, 11, 6, "green-red-violet"),
                               (23, 28, 3, "ocean"),
                               (21, 22, 23, "hot"),
                               (30, 31, 32, "color printable on gray"),
                               (33, 13, 10, "rainbow"),
                               (34, 35, 36, "AFM hot")] {
        p.set_rgb_model(r, g, b)?;
        palette(&mut fh, &p, 150, 1, &format!("{r}, {g}, {b}: {comment}"))?;
    }
    p.set_color_model(ColorModel::Hsv);
    p.set_rgb_model(3, 2, 2)?;
    palette(&mut fh, &p, 150, 1, "3, 2, 2 in HSV")?;

    writeln!(fh, "<h3>Cube helix</h3>")?;
    let mut p = Palette::new();
    p.set_color_type(ColorType::CubeHelix);
    palette(&mut fh, &p, 150, 1, "start 0.5, -1.5 cycles")?;
    p.set_cube_helix(0., 1., 2.);
    palette(&mut fh, &p, 150, 1, "start 0, 1 cycle, saturation 2")?;
    p.set_cube_negative(true);
    palette(&mut fh, &p, 150, 1, "negated")?;

    writeln!(fh, "<h3>Defined colors</h3>")?;
    let mut p = Palette::new();
    p.set_color_type(ColorType::Defined);
    for (k, hex) in [(0., "#000004"), (0.25, "#51127c"), (0.5, "#b73779"),
                     (0.75, "#fc8961"), (1., "#fcfdbf")] {
        if let Some(c) = color::parse_hex(hex) { p.add_defined_color(k, c)?; }
    }
    palette(&mut fh, &p, 150, 1, "interpolated in RGB")?;
    p.set_color_model(ColorModel::Hsv);
    palette(&mut fh, &p, 150, 1, "interpolated in HSV")?;
    p.set_inverted(true);
    palette(&mut fh, &p, 150, 1, "inverted")?;
    p.set_distinct(true);
    swatches(&mut fh, &p, 8, "distinct, repeated")?;

    writeln!(fh, "<h3>Functions</h3>")?;
    let mut p = Palette::new();
    p.set_color_type(ColorType::Functions);
    p.set_functions("x", "4*x*(1-x)", "1-x");
    palette(&mut fh, &p, 150, 1, "x, 4x(1-x), 1-x")?;
    p.set_function(Channel::Green, "abs(sin(3*pi*x))");
    palette(&mut fh, &p, 150, 1, "x, |sin(3πx)|, 1-x")?;

    let files: Vec<String> = env::args().skip(1).collect();
    if !files.is_empty() {
        writeln!(fh, "<h3>Files</h3>")?;
    }
    for path in files {
        let mut p = Palette::new();
        let report = p.read_file(&path)?;
        for w in &report.warnings { eprintln!("{path}: {w}") }
        let comment = if p.name().is_empty() { path.clone() }
                      else { format!("{} ({path})", p.name()) };
        palette(&mut fh, &p, 150, 1, &comment)?;
    }

    writeln!(fh, "</body>\n\
                  </html>")?;
    Ok(())
}
