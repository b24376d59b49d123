use std::cell::Cell;
use std::fs;
use std::rc::Rc;

use gradient_palette::{color, edit, model, Channel, ColorModel, ColorType, Error,
                       Palette, WrapMode};
use gradient_palette::color::Hsv;
use pretty_assertions::assert_eq;

fn defined(keys: &[(f64, color::Color)]) -> Palette {
    let mut p = Palette::new();
    p.set_color_type(ColorType::Defined);
    for &(k, c) in keys { p.add_defined_color(k, c).unwrap(); }
    p
}

#[test]
fn model_functions_are_deterministic() {
    for ind in 0 .. model::NUM_MODELS {
        for i in 0 ..= 50 {
            let x = i as f64 / 50.;
            let v = model::interp_model(ind, x).unwrap();
            assert!(v.is_finite());
            assert_eq!(v.to_bits(), model::interp_model(ind, x).unwrap().to_bits());
        }
    }
}

#[test]
fn model_palette_ends() {
    let p = Palette::new();
    let ends = |x: f64| [7, 5, 15].map(|m| model::interp_model(m, x).unwrap().clamp(0., 1.));
    let c0 = p.get_color(0., false, false);
    let c1 = p.get_color(1., false, false);
    assert_eq!([c0.r, c0.g, c0.b], ends(0.));
    assert_eq!([c1.r, c1.g, c1.b], ends(1.));
}

#[test]
fn cube_helix_ends() {
    let mut p = Palette::new();
    p.set_color_type(ColorType::CubeHelix);
    p.set_cube_helix(0., 1., 1.);
    assert!(color::gray_value(&p.get_color(0., false, false)) < 1e-9);
    assert!(color::gray_value(&p.get_color(1., false, false)) > 1. - 1e-9);
}

#[test]
fn idempotent_sampling() {
    let mut p = defined(&[(0., color::rgb(0.1, 0.9, 0.3)),
                          (1., color::rgb(0.8, 0.2, 0.6))]);
    let before: Vec<_> = (0 ..= 20).map(|i| p.get_color(i as f64 / 20., false, false))
        .collect();
    p.set_desc("something else");
    p.set_name("renamed");
    let after: Vec<_> = (0 ..= 20).map(|i| p.get_color(i as f64 / 20., false, false))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn no_overshoot() {
    let (a, b) = (color::rgb(0.1, 0.9, 0.3), color::rgb(0.8, 0.2, 0.6));
    let p = defined(&[(0., a), (1., b)]);
    for i in 1 .. 100 {
        let c = p.get_color(i as f64 / 100., false, false);
        for (v, lo, hi) in [(c.r, a.r, b.r), (c.g, a.g, b.g), (c.b, a.b, b.b)] {
            assert!(v >= lo.min(hi) && v <= lo.max(hi));
        }
    }
}

#[test]
fn hsv_gray_fix() {
    let cyan = Hsv { h: 0.5, s: 1., v: 1., a: 1. }.to_rgb();
    let mut p = defined(&[(0., color::gray(0.5)), (1., cyan)]);
    p.set_color_model(ColorModel::Hsv);
    for i in 1 ..= 10 {
        let hsv = Hsv::from_rgb(&p.get_color(i as f64 / 10., false, false));
        assert!((hsv.h - 0.5).abs() < 1e-9, "hue {} at step {i}", hsv.h);
    }
}

#[test]
fn distinct_repeat() {
    let mut p = defined(&[(0., color::gray(0.)), (1., color::gray(0.25)),
                          (2., color::gray(0.5)), (3., color::gray(0.75)),
                          (4., color::gray(1.))]);
    p.set_distinct(true);
    assert_eq!(p.indexed_color(5, Some(5), WrapMode::Repeat),
               p.indexed_color(0, Some(5), WrapMode::Repeat));
    assert_eq!(p.indexed_color(-1, Some(5), WrapMode::Repeat), color::gray(1.));
}

#[test]
fn nudged_key() {
    let mut p = Palette::new();
    p.add_defined_color(0.5, color::gray(0.2)).unwrap();
    let k = p.add_defined_color(0.5, color::gray(0.8)).unwrap();
    assert!((k - 0.51).abs() < 1e-12);
    let keys: Vec<_> = p.defined_colors().iter().map(|c| c.key).collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0], 0.5);
    assert!((keys[1] - 0.51).abs() < 1e-12);
}

#[test]
fn out_of_range_rows() {
    let mut p = Palette::new();
    assert!(matches!(p.remove_defined_color(0),
                     Err(Error::IndexOutOfRange { index: 0, len: 0 })));
    assert!(matches!(p.set_model(Channel::Red, 40), Err(Error::InvalidArgument(_))));
}

#[test]
fn save_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sea.pal");
    let mut p = defined(&[(-2., color::rgb(0.1, 0.2, 0.3)),
                          (0.3, color::Color { r: 1. / 3., g: 0.7, b: 0.05, a: 0.5 }),
                          (5., color::rgb(0.9, 0.8, 0.7))]);
    p.set_name("sea");
    p.set_desc("cold colors");
    p.set_color_model(ColorModel::Hsv);
    p.set_inverted(true);
    p.set_function(Channel::Green, "x * x");
    p.set_channel_range(Channel::Blue, 0.25, 0.75);
    p.save_file(&path).unwrap();

    let mut q = Palette::new();
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    q.on_change(move || c.set(c.get() + 1));
    let report = q.read_file(&path).unwrap();
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert_eq!(report.colors, 3);
    assert_eq!(count.get(), 1);
    assert_eq!(q.to_file(), p.to_file());
    let a: Vec<_> = p.defined_colors().iter().collect();
    let b: Vec<_> = q.defined_colors().iter().collect();
    assert_eq!(a, b);
    assert_eq!(q.get_color(0.4, false, false), p.get_color(0.4, false, false));
}

#[test]
fn out_of_range_colors_survive_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bright.pal");
    let p = defined(&[(0., color::rgb(1.5, 0., 0.)), (1., color::rgb(0., 0., 1.))]);
    assert_eq!(p.defined_color(0).unwrap().color, color::rgb(1., 0., 0.));
    p.save_file(&path).unwrap();

    let mut q = Palette::new();
    let report = q.read_file(&path).unwrap();
    assert!(report.is_clean(), "{:?}", report.warnings);
    assert_eq!(report.colors, 2);
    let a: Vec<_> = p.defined_colors().iter().collect();
    let b: Vec<_> = q.defined_colors().iter().collect();
    assert_eq!(a, b);
}

#[test]
fn read_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = Palette::new();
    let err = p.read_file(dir.path().join("none.pal")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert_eq!(p.color_type(), ColorType::Model);
}

#[test]
fn read_with_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.pal");
    fs::write(&path, "# comment\n\ncolor_type cubehelix\ncubehelix 0 1\n\
                      model 1 2 3\nred_function (x\n").unwrap();
    let mut p = Palette::new();
    let report = p.read_file(&path).unwrap();
    let lines: Vec<_> = report.warnings.iter().map(|w| w.line).collect();
    assert_eq!(lines, [4, 6]);
    assert_eq!(p.color_type(), ColorType::CubeHelix);
    assert_eq!(p.model(Channel::Blue), 3);
    assert_eq!(p.function(Channel::Red), "(x");
}

#[test]
fn drag_edit() {
    let mut p = defined(&[(0., color::rgb(0.2, 0.4, 0.6)), (10., color::rgb(1., 1., 1.))]);
    let n = edit::nearest_defined_color(&p, (0.05, 0.42), false).unwrap();
    assert_eq!((n.row, n.channel), (0, 1));
    edit::move_nearest_defined_color(&mut p, &n, 0.1, false).unwrap();
    let c = p.defined_color(0).unwrap().color;
    assert!((c.g - 0.5).abs() < 1e-12);
    assert_eq!(edit::insert_defined_color(&mut p, 0).unwrap(), 5.);
    assert_eq!(p.num_defined_colors(), 3);
}
