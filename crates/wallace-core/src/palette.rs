use anyhow::{bail, Context, Result};

/// The built-in six-stripe palette.
pub const DEFAULT_COLORS: [&str; 6] = [
    "#E40303", "#FF8C00", "#FFED00", "#008026", "#24408E", "#732982",
];

/// A color with channels in 0.0..=1.0, ready to hand to cairo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
        alpha: 0.0,
    };

    /// Parse `#RRGGBB` or `#RRGGBBAA`.
    pub fn parse(spec: &str) -> Result<Self> {
        let hex = spec
            .trim()
            .strip_prefix('#')
            .with_context(|| format!("color '{}' must start with '#'", spec))?;

        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) || (hex.len() != 6 && hex.len() != 8) {
            bail!("color '{}' must be #RRGGBB or #RRGGBBAA", spec);
        }

        let channel = |i: usize| -> Result<f64> {
            let byte = u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid hex digits in color '{}'", spec))?;
            Ok(f64::from(byte) / 255.0)
        };

        Ok(Self {
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
            alpha: if hex.len() == 8 { channel(6)? } else { 1.0 },
        })
    }
}

/// Fixed list of colors with a cursor that scrolling moves around.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgba>,
    index: usize,
}

impl Palette {
    pub fn new(colors: Vec<Rgba>, initial: usize) -> Result<Self> {
        if colors.is_empty() {
            bail!("palette needs at least one color");
        }
        let index = initial % colors.len();
        Ok(Self { colors, index })
    }

    /// Build a palette from color strings as they appear in the config file.
    pub fn from_specs<S: AsRef<str>>(specs: &[S], initial: usize) -> Result<Self> {
        let colors = specs
            .iter()
            .map(|s| Rgba::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(colors, initial)
    }

    pub fn current(&self) -> Rgba {
        self.colors[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.colors.len();
    }

    pub fn prev(&mut self) {
        self.index = (self.index + self.colors.len() - 1) % self.colors.len();
    }

    /// Wheel up (negative dy) moves forward, wheel down moves back.
    /// Purely horizontal scrolling leaves the color alone.
    pub fn scroll(&mut self, dy: f64) {
        if dy < 0.0 {
            self.next();
        } else if dy > 0.0 {
            self.prev();
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        // The built-in specs are known-good.
        let colors = DEFAULT_COLORS
            .iter()
            .filter_map(|s| Rgba::parse(s).ok())
            .collect();
        Self { colors, index: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // --- parsing ---

    #[test]
    fn parse_rgb_hex() {
        let c = Rgba::parse("#FF8000").unwrap();
        assert!(approx(c.red, 1.0));
        assert!(approx(c.green, 128.0 / 255.0));
        assert!(approx(c.blue, 0.0));
        assert!(approx(c.alpha, 1.0));
    }

    #[test]
    fn parse_rgba_hex_and_lowercase() {
        let c = Rgba::parse("#00ff0080").unwrap();
        assert!(approx(c.green, 1.0));
        assert!(approx(c.alpha, 128.0 / 255.0));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(Rgba::parse("FF0000").is_err());
        assert!(Rgba::parse("#FF00").is_err());
        assert!(Rgba::parse("#GG0000").is_err());
        assert!(Rgba::parse("#ÄÄÄ").is_err());
        assert!(Rgba::parse("").is_err());
        assert!(Rgba::parse("#+F+F+F").is_err());
        assert!(Rgba::parse("#-1-1-1").is_err());
    }

    // --- palette defaults ---

    #[test]
    fn default_palette_has_six_colors_starting_with_red() {
        let p = Palette::default();
        assert_eq!(p.len(), 6);
        assert_eq!(p.index(), 0);
        assert_eq!(p.current(), Rgba::parse("#E40303").unwrap());
    }

    // --- scrolling ---

    #[test]
    fn scroll_up_advances() {
        let mut p = Palette::default();
        p.scroll(-1.0);
        assert_eq!(p.index(), 1);
        assert_eq!(p.current(), Rgba::parse("#FF8C00").unwrap());
    }

    #[test]
    fn scroll_down_from_first_wraps_to_last() {
        let mut p = Palette::default();
        p.scroll(1.0);
        assert_eq!(p.index(), 5);
        assert_eq!(p.current(), Rgba::parse("#732982").unwrap());
    }

    #[test]
    fn scroll_forward_wraps_to_first() {
        let mut p = Palette::default();
        for _ in 0..6 {
            p.scroll(-0.5);
        }
        assert_eq!(p.index(), 0);
    }

    #[test]
    fn horizontal_scroll_keeps_color() {
        let mut p = Palette::default();
        p.scroll(0.0);
        assert_eq!(p.index(), 0);
    }

    // --- construction ---

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::new(Vec::new(), 0).is_err());
        assert!(Palette::from_specs::<&str>(&[], 0).is_err());
    }

    #[test]
    fn bad_entry_is_rejected() {
        assert!(Palette::from_specs(&["#000000", "blue"], 0).is_err());
    }

    #[test]
    fn initial_index_wraps() {
        let p = Palette::from_specs(&["#000000", "#FFFFFF"], 3).unwrap();
        assert_eq!(p.index(), 1);
    }

    #[test]
    fn single_color_palette_stays_put() {
        let mut p = Palette::from_specs(&["#123456"], 0).unwrap();
        p.next();
        p.prev();
        p.prev();
        assert_eq!(p.index(), 0);
    }
}
