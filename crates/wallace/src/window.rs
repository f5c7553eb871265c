use crate::canvas::Canvas;
use crate::input;
use crate::layer_shell;
use crate::overlay::{Overlay, OverlayWindow};
use gtk4::gdk;
use gtk4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};
use wallace_core::config::Config;
use wallace_core::pen::Cursor;

/// Install the transparent window style once per display.
pub fn install_css(display: &gdk::Display, passthrough_opacity: f64) {
    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_data(&format!(
        "
        window {{ background: rgba(0, 0, 0, 0); }}
        window.pass {{ opacity: {}; }}
        * {{ margin: 0; padding: 0; border: none; border-radius: 0; }}
        ",
        passthrough_opacity,
    ));
    gtk4::style_context_add_provider_for_display(
        display,
        &css_provider,
        gtk4::STYLE_PROVIDER_PRIORITY_USER,
    );
}

/// Build, register and present one overlay window for `monitor`.
/// Returns whether it became a layer-shell surface.
pub fn build_overlay(
    app: &gtk4::Application,
    overlay: &Rc<Overlay>,
    monitor: &gdk::Monitor,
    config: &Config,
) -> bool {
    let window = gtk4::ApplicationWindow::builder()
        .application(app)
        .title("wallace")
        .decorated(false)
        .build();

    let has_layer_shell = layer_shell::try_init_layer_shell(&window, monitor, &config.window);

    let canvas = Rc::new(RefCell::new(Canvas::default()));

    let area = gtk4::DrawingArea::new();
    area.set_can_target(false);
    window.set_child(Some(&area));

    let draw_canvas = Rc::clone(&canvas);
    area.set_draw_func(move |_, cr, _, _| {
        if let Err(e) = draw_canvas.borrow().paint(cr) {
            warn!(error = %e, "painting canvas failed");
        }
    });

    let resize_canvas = Rc::clone(&canvas);
    let resize_window = window.clone();
    let resize_overlay = Rc::clone(overlay);
    area.connect_resize(move |area, width, height| {
        // Nothing to back the raster with until the window is realized.
        if area.native().and_then(|n| n.surface()).is_none() {
            return;
        }
        layer_shell::set_input_region(&resize_window, resize_overlay.passthrough());
        let mut canvas = resize_canvas.borrow_mut();
        let previous = canvas.size();
        if let Err(e) = canvas.resize(width, height) {
            warn!(error = %e, width, height, "resizing canvas failed");
            return;
        }
        debug!(?previous, width, height, "canvas resized");
    });

    let surface = overlay.add_window(
        OverlayWindow {
            window: window.clone(),
            area: area.clone(),
            canvas,
        },
        has_layer_shell,
    );

    input::attach(&window, overlay, surface, config.window.input_mode);

    area.set_cursor_from_name(Some(Cursor::Crosshair.name()));

    let realized = Rc::clone(overlay);
    window.connect_realize(move |window| {
        layer_shell::set_input_region(window, realized.passthrough());
    });

    window.present();
    window.set_visible(false);
    window.set_visible(true);
    window.set_cursor_from_name(Some(Cursor::Crosshair.name()));

    info!(
        surface,
        monitor = %monitor.connector().unwrap_or_default(),
        layer_shell = has_layer_shell,
        "overlay window created"
    );
    has_layer_shell
}

/// Create one window per selected monitor of the default display.
pub fn build_all(app: &gtk4::Application, overlay: &Rc<Overlay>, config: &Config) {
    let Some(display) = gdk::Display::default() else {
        warn!("no default display");
        app.quit();
        return;
    };

    install_css(&display, config.window.passthrough_opacity);

    let monitors = display.monitors();
    for i in 0..monitors.n_items() {
        let Some(monitor) = monitors.item(i).and_downcast::<gdk::Monitor>() else {
            continue;
        };

        let connector = monitor.connector();
        if !config.window.wants_output(connector.as_deref()) {
            debug!(monitor = ?connector, "monitor not selected, skipping");
            continue;
        }

        let has_layer_shell = build_overlay(app, overlay, &monitor, config);
        if !has_layer_shell || config.window.single_window {
            break;
        }
    }

    if overlay.window_count() == 0 {
        warn!(outputs = ?config.window.outputs, "no matching monitor, nothing to draw on");
        app.quit();
    }
}
