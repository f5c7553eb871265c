use serde::{Deserialize, Serialize};
use std::fmt;

/// Which layer-shell layer the overlay windows live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stacking {
    /// Above everything, including fullscreen clients.
    Overlay,
    /// Below normal windows, above the wallpaper.
    Bottom,
}

impl fmt::Display for Stacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stacking::Overlay => f.write_str("overlay"),
            Stacking::Bottom => f.write_str("bottom"),
        }
    }
}

/// Keyboard interactivity requested from the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardMode {
    OnDemand,
    None,
}

impl Stacking {
    /// Windows on the bottom layer never take keyboard focus.
    pub fn keyboard_mode(self) -> KeyboardMode {
        match self {
            Stacking::Overlay => KeyboardMode::OnDemand,
            Stacking::Bottom => KeyboardMode::None,
        }
    }
}

/// Application-wide overlay state shared by every window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayMode {
    pub stacking: Stacking,
    pub passthrough: bool,
}

impl OverlayMode {
    pub fn new(stacking: Stacking) -> Self {
        Self {
            stacking,
            passthrough: false,
        }
    }

    /// Keyboard mode a new window starts with. Always on-demand, whatever the
    /// layer, so Escape quits until the first layer toggle.
    pub fn initial_keyboard_mode(&self) -> KeyboardMode {
        KeyboardMode::OnDemand
    }

    /// Bottom goes back up to the overlay layer, anything else drops to bottom.
    pub fn toggle_stacking(&mut self) -> (Stacking, KeyboardMode) {
        self.stacking = match self.stacking {
            Stacking::Bottom => Stacking::Overlay,
            Stacking::Overlay => Stacking::Bottom,
        };
        (self.stacking, self.stacking.keyboard_mode())
    }

    pub fn toggle_passthrough(&mut self) -> bool {
        self.passthrough = !self.passthrough;
        self.passthrough
    }
}

impl Default for OverlayMode {
    fn default() -> Self {
        Self::new(Stacking::Overlay)
    }
}
