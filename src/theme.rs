//! Themes: ordered lists of palette names.  Plots draw their `i`-th
//! series with the `i`-th palette of the theme, cycling when there are
//! more series than palettes.

use std::collections::HashMap;
use crate::error::{Error, Result};
use crate::palette::Palette;

/// Names of the palettes every built-in theme contains.
pub const NAMED_PALETTES: [&str; 11] = [
    "default", "palette1", "palette2", "set1", "set2", "set3", "plasma",
    "moreland", "distinct1", "distinct2", "green_red"];

/// An ordered list of distinct palette names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Theme {
    desc: String,
    palettes: Vec<String>,
}

impl Theme {
    pub fn new(desc: impl Into<String>) -> Self {
        Theme { desc: desc.into(), palettes: Vec::new() }
    }

    fn with_first(desc: &str, first: [&str; 3]) -> Self {
        let mut t = Theme::new(desc);
        for name in NAMED_PALETTES { t.add(name) }
        for (pos, name) in first.into_iter().enumerate() {
            if let Some(from) = t.position(name) { t.shift(from, pos) }
        }
        t
    }

    /// The built-in theme called `name` (`default`, `theme1` or `theme2`).
    ///
    /// ```
    /// use gradient_palette::Theme;
    /// let t = Theme::builtin("theme1").unwrap();
    /// assert_eq!(t.palette(0), Some("palette1"));
    /// assert_eq!(t.palette(t.len()), Some("palette1"));
    /// ```
    pub fn builtin(name: &str) -> Option<Theme> {
        match name {
            "default" => Some(Theme::with_first("Default", ["set2", "palette1", "palette2"])),
            "theme1" => Some(Theme::with_first("Theme 1", ["palette1", "palette2", "set2"])),
            "theme2" => Some(Theme::with_first("Theme 2", ["palette2", "palette1", "set2"])),
            _ => None,
        }
    }

    /// Names accepted by [`builtin`](Self::builtin).
    pub fn builtin_names() -> [&'static str; 3] { ["default", "theme1", "theme2"] }

    pub fn desc(&self) -> &str { &self.desc }

    pub fn set_desc(&mut self, desc: impl Into<String>) { self.desc = desc.into() }

    pub fn len(&self) -> usize { self.palettes.len() }

    pub fn is_empty(&self) -> bool { self.palettes.is_empty() }

    pub fn palettes(&self) -> impl Iterator<Item = &str> {
        self.palettes.iter().map(String::as_str)
    }

    /// Palette for series `i`, cycling through the list.
    pub fn palette(&self, i: usize) -> Option<&str> {
        if self.palettes.is_empty() { return None }
        Some(&self.palettes[i % self.palettes.len()])
    }

    /// The palette drawing series `i`, looked up by name in `registry`.
    /// Returns `None` for an empty theme or a name the registry lacks.
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use gradient_palette::{Palette, Theme};
    /// let t = Theme::builtin("default").unwrap();
    /// let mut registry = HashMap::new();
    /// registry.insert("set2".to_string(), Palette::new());
    /// assert!(t.resolve(0, &registry).is_some());
    /// assert!(t.resolve(1, &registry).is_none());
    /// ```
    pub fn resolve<'a>(&self, i: usize, registry: &'a HashMap<String, Palette>)
                       -> Option<&'a Palette> {
        registry.get(self.palette(i)?)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.palettes.iter().position(|p| p == name)
    }

    pub fn contains(&self, name: &str) -> bool { self.position(name).is_some() }

    /// Append `name` unless already present.
    pub fn add(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.contains(&name) { self.palettes.push(name) }
    }

    /// Returns `false` if `name` was not in the theme.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => { self.palettes.remove(i); true }
            None => false,
        }
    }

    /// Put `name` at position `i`.  A name already in the theme is
    /// moved there; otherwise it replaces the palette at `i`.
    pub fn set(&mut self, i: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.contains(&name) { return self.move_to(&name, i) }
        let len = self.len();
        match self.palettes.get_mut(i) {
            Some(p) => { *p = name; Ok(()) }
            None => Err(Error::IndexOutOfRange { index: i, len }),
        }
    }

    /// Move `name` to position `pos`, shifting the palettes in between.
    pub fn move_to(&mut self, name: &str, pos: usize) -> Result<()> {
        let len = self.len();
        if pos >= len { return Err(Error::IndexOutOfRange { index: pos, len }) }
        let from = self.position(name).ok_or_else(|| {
            Error::InvalidArgument(format!("palette “{name}” is not in the theme"))
        })?;
        self.shift(from, pos);
        Ok(())
    }

    fn shift(&mut self, from: usize, to: usize) {
        let p = self.palettes.remove(from);
        self.palettes.insert(to, p);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins() {
        let t = Theme::builtin("default").unwrap();
        assert_eq!(t.len(), NAMED_PALETTES.len());
        let first: Vec<_> = t.palettes().take(4).collect();
        assert_eq!(first, ["set2", "palette1", "palette2", "default"]);
        assert_eq!(t.desc(), "Default");
        let t = Theme::builtin("theme2").unwrap();
        assert_eq!(t.palette(1), Some("palette1"));
        assert!(Theme::builtin("theme3").is_none());
    }

    #[test]
    fn editing() {
        let mut t = Theme::new("mine");
        assert_eq!(t.palette(3), None);
        t.add("a");
        t.add("b");
        t.add("a");
        t.add("c");
        assert_eq!(t.len(), 3);
        t.move_to("c", 0).unwrap();
        assert_eq!(t.palettes().collect::<Vec<_>>(), ["c", "a", "b"]);
        t.set(2, "d").unwrap();
        t.set(0, "a").unwrap();
        assert_eq!(t.palettes().collect::<Vec<_>>(), ["a", "c", "d"]);
        assert!(matches!(t.set(3, "e"), Err(Error::IndexOutOfRange { index: 3, len: 3 })));
        assert!(matches!(t.move_to("z", 0), Err(Error::InvalidArgument(_))));
        assert!(t.remove("c"));
        assert!(!t.remove("c"));
        assert_eq!(t.palette(3), Some("d"));
    }

    #[test]
    fn resolve_cycles_through_registry() {
        let t = Theme::builtin("theme1").unwrap();
        let mut registry = HashMap::new();
        for name in ["palette1", "set2"] {
            let mut p = Palette::new();
            p.set_name(name);
            registry.insert(name.to_string(), p);
        }
        assert_eq!(t.resolve(0, &registry).map(Palette::name), Some("palette1"));
        assert!(t.resolve(1, &registry).is_none());
        assert_eq!(t.resolve(2, &registry).map(Palette::name), Some("set2"));
        assert_eq!(t.resolve(t.len(), &registry).map(Palette::name), Some("palette1"));
        assert!(Theme::new("empty").resolve(0, &registry).is_none());
    }
}
