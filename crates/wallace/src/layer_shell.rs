use gtk4::prelude::*;
use gtk4::{cairo, gdk};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use tracing::{debug, info};
use wallace_core::config::WindowConfig;
use wallace_core::mode::{self, OverlayMode, Stacking};

/// Try to turn the window into a layer-shell surface covering `monitor`.
/// Returns true if layer-shell was successfully applied.
/// NOTE: GNOME Wayland does not support wlr-layer-shell. The window then stays a
/// regular toplevel and only one gets created.
pub fn try_init_layer_shell(
    window: &gtk4::ApplicationWindow,
    monitor: &gdk::Monitor,
    config: &WindowConfig,
) -> bool {
    if !gtk4_layer_shell::is_supported() {
        info!("layer-shell not supported on this compositor");
        return false;
    }

    window.init_layer_shell();
    window.set_namespace(&config.namespace);
    window.set_monitor(monitor);
    set_stacking(window, config.layer);
    window.set_keyboard_mode(keyboard_mode(
        OverlayMode::new(config.layer).initial_keyboard_mode(),
    ));

    window.set_anchor(Edge::Left, true);
    window.set_anchor(Edge::Top, true);

    let geometry = monitor.geometry();
    window.set_default_size(geometry.width(), geometry.height());

    info!(
        width = geometry.width(),
        height = geometry.height(),
        layer = %config.layer,
        "layer-shell initialized"
    );
    true
}

/// Move the window to the given layer, adjusting keyboard interactivity with it.
pub fn set_stacking(window: &gtk4::ApplicationWindow, stacking: Stacking) {
    let keyboard = keyboard_mode(stacking.keyboard_mode());
    let layer = match stacking {
        Stacking::Overlay => Layer::Overlay,
        Stacking::Bottom => Layer::Bottom,
    };
    window.set_keyboard_mode(keyboard);
    window.set_layer(layer);
    debug!(layer = %stacking, "stacking changed");
}

fn keyboard_mode(mode: mode::KeyboardMode) -> KeyboardMode {
    match mode {
        mode::KeyboardMode::OnDemand => KeyboardMode::OnDemand,
        mode::KeyboardMode::None => KeyboardMode::None,
    }
}

/// Accept pointer input everywhere, or nowhere when `passthrough` is set.
/// Must be called once the window has a GDK surface.
pub fn set_input_region(window: &gtk4::ApplicationWindow, passthrough: bool) {
    let Some(surface) = window.surface() else {
        debug!("window has no GDK surface yet, skipping input region");
        return;
    };

    if passthrough {
        // No rectangles: every pointer event falls through to what is below.
        surface.set_input_region(&cairo::Region::create());
    } else {
        let (width, height) = window_extent(window);
        let full = cairo::RectangleInt::new(0, 0, width, height);
        surface.set_input_region(&cairo::Region::create_rectangle(&full));
    }
}

/// Current size, falling back to the default size before the first allocation.
fn window_extent(window: &gtk4::ApplicationWindow) -> (i32, i32) {
    input_extent((window.width(), window.height()), window.default_size())
}

/// Extent of the full input region. Called again on every resize so a window
/// that grows stays clickable everywhere.
fn input_extent(current: (i32, i32), default: (i32, i32)) -> (i32, i32) {
    for (width, height) in [current, default] {
        if width > 0 && height > 0 {
            return (width, height);
        }
    }
    (16384, 16384)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_extent_follows_current_size() {
        assert_eq!(input_extent((1920, 1080), (800, 600)), (1920, 1080));
        assert_eq!(input_extent((2560, 1440), (1920, 1080)), (2560, 1440));
    }

    #[test]
    fn input_extent_uses_default_before_allocation() {
        assert_eq!(input_extent((0, 0), (800, 600)), (800, 600));
    }

    #[test]
    fn input_extent_falls_back_to_large_rect() {
        assert_eq!(input_extent((0, 0), (-1, -1)), (16384, 16384));
    }

    #[test]
    fn initial_keyboard_maps_to_on_demand() {
        let initial = OverlayMode::new(Stacking::Bottom).initial_keyboard_mode();
        assert_eq!(keyboard_mode(initial), KeyboardMode::OnDemand);
        assert_eq!(
            keyboard_mode(Stacking::Bottom.keyboard_mode()),
            KeyboardMode::None
        );
    }
}
