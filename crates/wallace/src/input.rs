use crate::overlay::Overlay;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;
use wallace_core::config::InputMode;
use wallace_core::pen::{self, Button, Point, PointerEvent};

/// Wire pointer, scroll and key controllers on `window` into the shared pen.
pub fn attach(window: &gtk4::ApplicationWindow, overlay: &Rc<Overlay>, surface: usize, mode: InputMode) {
    match mode {
        InputMode::Click => attach_click(window, overlay, surface),
        InputMode::Drag => attach_drag(window, overlay, surface),
    }
    attach_scroll(window, overlay, surface);
    attach_keys(window, overlay);
    debug!(surface, %mode, "input controllers attached");
}

/// One click gesture per button plus free pointer motion.
fn attach_click(window: &gtk4::ApplicationWindow, overlay: &Rc<Overlay>, surface: usize) {
    for code in [gdk::BUTTON_PRIMARY, gdk::BUTTON_MIDDLE, gdk::BUTTON_SECONDARY] {
        let button = Button::from_code(code);
        let gesture = gtk4::GestureClick::new();
        gesture.set_button(code);

        let o = Rc::clone(overlay);
        gesture.connect_pressed(move |_, _, x, y| {
            o.handle_pointer(
                surface,
                PointerEvent::Press {
                    button,
                    at: Point::new(x, y),
                },
            );
        });

        let o = Rc::clone(overlay);
        gesture.connect_released(move |_, _, _, _| {
            o.handle_pointer(surface, PointerEvent::Release { button });
        });

        window.add_controller(gesture);
    }

    let motion = gtk4::EventControllerMotion::new();
    let o = Rc::clone(overlay);
    motion.connect_motion(move |_, x, y| {
        o.handle_pointer(
            surface,
            PointerEvent::Motion {
                at: Point::new(x, y),
            },
        );
    });
    window.add_controller(motion);
}

/// A single drag gesture for any button; positions come as offsets from the start.
fn attach_drag(window: &gtk4::ApplicationWindow, overlay: &Rc<Overlay>, surface: usize) {
    let drag = gtk4::GestureDrag::new();
    drag.set_button(0);

    let held = Rc::new(Cell::new(Button::Primary));

    let o = Rc::clone(overlay);
    let begin_held = Rc::clone(&held);
    drag.connect_drag_begin(move |gesture, x, y| {
        let event = pen::drag_begin(gesture.current_button(), (x, y));
        if let PointerEvent::Press { button, .. } = event {
            begin_held.set(button);
        }
        o.handle_pointer(surface, event);
    });

    let o = Rc::clone(overlay);
    drag.connect_drag_update(move |gesture, dx, dy| {
        let Some(start) = gesture.start_point() else {
            return;
        };
        o.handle_pointer(surface, pen::drag_motion(start, (dx, dy)));
    });

    let o = Rc::clone(overlay);
    drag.connect_drag_end(move |_, _, _| {
        o.handle_pointer(surface, pen::drag_end(held.get()));
    });

    window.add_controller(drag);
}

fn attach_scroll(window: &gtk4::ApplicationWindow, overlay: &Rc<Overlay>, surface: usize) {
    let scroll = gtk4::EventControllerScroll::new(gtk4::EventControllerScrollFlags::BOTH_AXES);
    let o = Rc::clone(overlay);
    scroll.connect_scroll(move |_, _, dy| {
        o.handle_pointer(surface, PointerEvent::Scroll { dy });
        glib::Propagation::Proceed
    });
    window.add_controller(scroll);
}

fn attach_keys(window: &gtk4::ApplicationWindow, overlay: &Rc<Overlay>) {
    let keys = gtk4::EventControllerKey::new();
    let o = Rc::clone(overlay);
    keys.connect_key_pressed(move |_, keyval, _, _| {
        if keyval == gdk::Key::Escape {
            o.quit();
            return glib::Propagation::Stop;
        }
        glib::Propagation::Proceed
    });
    window.add_controller(keys);
}
