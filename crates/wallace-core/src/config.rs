use crate::mode::Stacking;
use crate::palette::{Palette, DEFAULT_COLORS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub brush: BrushConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    #[serde(default = "BrushConfig::default_width")]
    pub width: f64,
    #[serde(default = "BrushConfig::default_eraser_width")]
    pub eraser_width: f64,
    /// Added to both coordinates of every point so strokes line up with the
    /// crosshair hotspot.
    #[serde(default = "BrushConfig::default_offset")]
    pub offset: f64,
}

impl BrushConfig {
    fn default_width() -> f64 { 4.0 }
    fn default_eraser_width() -> f64 { 60.0 }
    fn default_offset() -> f64 { 2.0 }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            width: 4.0,
            eraser_width: 60.0,
            offset: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "PaletteConfig::default_colors")]
    pub colors: Vec<String>,
    #[serde(default)]
    pub initial: usize,
}

impl PaletteConfig {
    fn default_colors() -> Vec<String> {
        DEFAULT_COLORS.iter().map(|s| s.to_string()).collect()
    }

    pub fn build(&self) -> Result<Palette> {
        Palette::from_specs(&self.colors, self.initial).context("building palette")
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: Self::default_colors(),
            initial: 0,
        }
    }
}

/// How pointer buttons are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Separate press and release handlers per button.
    Click,
    /// One drag gesture per stroke.
    Drag,
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "click" => Ok(InputMode::Click),
            "drag" => Ok(InputMode::Drag),
            other => Err(format!("unknown input mode '{}' (expected click or drag)", other)),
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Click => f.write_str("click"),
            InputMode::Drag => f.write_str("drag"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_namespace")]
    pub namespace: String,
    #[serde(default = "WindowConfig::default_layer")]
    pub layer: Stacking,
    #[serde(default)]
    pub single_window: bool,
    #[serde(default = "WindowConfig::default_input_mode")]
    pub input_mode: InputMode,
    /// Monitor connector names (e.g. "DP-1"). Empty means every monitor.
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default = "WindowConfig::default_passthrough_opacity")]
    pub passthrough_opacity: f64,
}

impl WindowConfig {
    fn default_namespace() -> String { "wallace".into() }
    fn default_layer() -> Stacking { Stacking::Overlay }
    fn default_input_mode() -> InputMode { InputMode::Click }
    fn default_passthrough_opacity() -> f64 { 0.33 }

    /// Whether a monitor with this connector should get a window.
    pub fn wants_output(&self, connector: Option<&str>) -> bool {
        if self.outputs.is_empty() {
            return true;
        }
        connector.map_or(false, |c| self.outputs.iter().any(|o| o == c))
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            namespace: Self::default_namespace(),
            layer: Stacking::Overlay,
            single_window: false,
            input_mode: InputMode::Click,
            outputs: Vec::new(),
            passthrough_opacity: 0.33,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Listen on the control socket for wallacectl.
    #[serde(default = "ControlConfig::default_socket")]
    pub socket: bool,
}

impl ControlConfig {
    fn default_socket() -> bool { true }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { socket: true }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("wallace")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load the user config, falling back to defaults when there is none.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("parsing config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.brush.width > 0.0) {
            bail!("brush.width must be positive, got {}", self.brush.width);
        }
        if !(self.brush.eraser_width > 0.0) {
            bail!(
                "brush.eraser_width must be positive, got {}",
                self.brush.eraser_width
            );
        }
        if !(0.0..=1.0).contains(&self.window.passthrough_opacity) {
            bail!(
                "window.passthrough_opacity must be within 0..=1, got {}",
                self.window.passthrough_opacity
            );
        }
        if self.window.namespace.is_empty() {
            bail!("window.namespace must not be empty");
        }
        self.palette.build()?;
        Ok(())
    }
}

pub fn socket_path() -> PathBuf {
    // WALLACE_SOCK overrides for testing and for running several instances.
    if let Ok(path) = std::env::var("WALLACE_SOCK") {
        return PathBuf::from(path);
    }
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("wallace.sock")
}
