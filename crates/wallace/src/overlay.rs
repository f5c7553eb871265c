use crate::canvas::Canvas;
use crate::layer_shell;
use gtk4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};
use wallace_core::ipc::{ClientMsg, DaemonMsg};
use wallace_core::mode::OverlayMode;
use wallace_core::pen::{Action, Cursor, Pen, PointerEvent};

/// One full-screen window and the raster it displays.
pub struct OverlayWindow {
    pub window: gtk4::ApplicationWindow,
    pub area: gtk4::DrawingArea,
    pub canvas: Rc<RefCell<Canvas>>,
}

/// State shared by every overlay window on the GTK main thread.
pub struct Overlay {
    app: gtk4::Application,
    windows: RefCell<Vec<OverlayWindow>>,
    pen: RefCell<Pen>,
    mode: Cell<OverlayMode>,
    layer_shell: Cell<bool>,
}

impl Overlay {
    pub fn new(app: &gtk4::Application, pen: Pen, mode: OverlayMode) -> Rc<Self> {
        Rc::new(Self {
            app: app.clone(),
            windows: RefCell::new(Vec::new()),
            pen: RefCell::new(pen),
            mode: Cell::new(mode),
            layer_shell: Cell::new(false),
        })
    }

    /// Register a window; the returned index identifies it in pointer events.
    pub fn add_window(&self, window: OverlayWindow, layer_shell: bool) -> usize {
        self.layer_shell.set(layer_shell);
        let mut windows = self.windows.borrow_mut();
        windows.push(window);
        windows.len() - 1
    }

    pub fn window_count(&self) -> usize {
        self.windows.borrow().len()
    }

    pub fn passthrough(&self) -> bool {
        self.mode.get().passthrough
    }

    pub fn handle_pointer(&self, surface: usize, event: PointerEvent) {
        let actions = self.pen.borrow_mut().process_event(surface, event);
        self.apply(actions);
    }

    fn apply(&self, actions: Vec<Action>) {
        let windows = self.windows.borrow();
        for action in actions {
            match action {
                Action::Stroke { surface, stroke } => {
                    let Some(w) = windows.get(surface) else {
                        continue;
                    };
                    if let Err(e) = w.canvas.borrow_mut().stroke(&stroke) {
                        warn!(error = %e, "stroke failed");
                    }
                    w.area.queue_draw();
                }
                Action::Clear { surface } => {
                    if let Some(w) = windows.get(surface) {
                        clear_window(w);
                    }
                }
                Action::SetCursor(cursor) => set_cursor(&windows, cursor),
            }
        }
    }

    pub fn toggle_stacking(&self) -> DaemonMsg {
        if !self.layer_shell.get() {
            warn!("cannot change layer without layer-shell");
            return ack(false, "layer-shell not supported");
        }
        let mut mode = self.mode.get();
        let (stacking, _) = mode.toggle_stacking();
        self.mode.set(mode);
        for w in self.windows.borrow().iter() {
            layer_shell::set_stacking(&w.window, stacking);
        }
        info!(layer = %stacking, "layer toggled");
        ack(true, format!("layer: {}", stacking))
    }

    pub fn toggle_passthrough(&self) -> DaemonMsg {
        let mut mode = self.mode.get();
        let passthrough = mode.toggle_passthrough();
        self.mode.set(mode);
        for w in self.windows.borrow().iter() {
            layer_shell::set_input_region(&w.window, passthrough);
            if passthrough {
                w.window.add_css_class("pass");
            } else {
                w.window.remove_css_class("pass");
            }
            // Remap so the compositor picks up the new input region.
            w.window.set_visible(false);
            w.window.set_visible(true);
        }
        info!(passthrough, "passthrough toggled");
        ack(true, format!("passthrough: {}", passthrough))
    }

    pub fn clear_all(&self) -> DaemonMsg {
        for w in self.windows.borrow().iter() {
            clear_window(w);
        }
        ack(true, "cleared")
    }

    pub fn quit(&self) {
        info!("quitting");
        self.app.quit();
    }

    pub fn status(&self) -> DaemonMsg {
        let mode = self.mode.get();
        DaemonMsg::Status {
            stacking: mode.stacking,
            passthrough: mode.passthrough,
            color: self.pen.borrow().palette().index(),
            windows: self.window_count(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Run a control request from a signal or the socket.
    pub fn handle_request(&self, msg: ClientMsg) -> DaemonMsg {
        debug!(?msg, "control request");
        match msg {
            ClientMsg::ToggleLayer => self.toggle_stacking(),
            ClientMsg::TogglePassthrough => self.toggle_passthrough(),
            ClientMsg::Clear => self.clear_all(),
            ClientMsg::NextColor | ClientMsg::PrevColor => {
                let mut pen = self.pen.borrow_mut();
                if msg == ClientMsg::NextColor {
                    pen.palette_mut().next();
                } else {
                    pen.palette_mut().prev();
                }
                ack(true, format!("color: {}", pen.palette().index()))
            }
            ClientMsg::Quit => {
                self.quit();
                ack(true, "quitting")
            }
            ClientMsg::GetStatus => self.status(),
        }
    }
}

fn clear_window(w: &OverlayWindow) {
    if let Err(e) = w.canvas.borrow_mut().clear() {
        warn!(error = %e, "clear failed");
    }
    w.area.queue_draw();
}

fn set_cursor(windows: &[OverlayWindow], cursor: Cursor) {
    for w in windows {
        w.window.set_cursor_from_name(Some(cursor.name()));
    }
}

fn ack(ok: bool, message: impl Into<String>) -> DaemonMsg {
    DaemonMsg::Ack {
        ok,
        message: message.into(),
    }
}
