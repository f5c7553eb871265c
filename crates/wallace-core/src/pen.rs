use crate::config::BrushConfig;
use crate::palette::{Palette, Rgba};
use tracing::debug;

/// Pointer buttons, numbered the way GDK numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
    Other(u32),
}

impl Button {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Button::Primary,
            2 => Button::Middle,
            3 => Button::Secondary,
            other => Button::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn shifted(self, by: f64) -> Self {
        Self::new(self.x + by, self.y + by)
    }
}

/// Pointer input as seen by one overlay window, in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { button: Button, at: Point },
    Release { button: Button },
    Motion { at: Point },
    Scroll { dy: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeKind {
    /// Paint with the color using normal OVER compositing.
    Ink(Rgba),
    /// Overwrite with transparency using SOURCE compositing.
    Erase,
}

/// One straight segment with round caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub width: f64,
    pub kind: StrokeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Crosshair,
    NotAllowed,
}

impl Cursor {
    /// Name from the freedesktop cursor spec.
    pub fn name(self) -> &'static str {
        match self {
            Cursor::Crosshair => "crosshair",
            Cursor::NotAllowed => "not-allowed",
        }
    }
}

/// Drag gestures report the start point once and then offsets from it.
/// These turn them into the same events a click gesture produces.
pub fn drag_begin(button_code: u32, start: (f64, f64)) -> PointerEvent {
    PointerEvent::Press {
        button: Button::from_code(button_code),
        at: Point::new(start.0, start.1),
    }
}

pub fn drag_motion(start: (f64, f64), offset: (f64, f64)) -> PointerEvent {
    PointerEvent::Motion {
        at: Point::new(start.0 + offset.0, start.1 + offset.1),
    }
}

/// The button is the one that began the drag.
pub fn drag_end(button: Button) -> PointerEvent {
    PointerEvent::Release { button }
}

/// Things the window layer must do in response to input.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Rasterize a segment onto a window's canvas and queue a redraw.
    Stroke { surface: usize, stroke: Stroke },
    /// Wipe a window's canvas and queue a redraw.
    Clear { surface: usize },
    /// Change the cursor on every overlay window.
    SetCursor(Cursor),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    /// Primary button held.
    Drawing { surface: usize, last: Point },
    /// Secondary button held.
    Erasing { surface: usize, last: Point },
}

/// Turns pointer events into strokes. One pen is shared by all windows.
pub struct Pen {
    state: State,
    palette: Palette,
    brush: BrushConfig,
}

impl Pen {
    pub fn new(palette: Palette, brush: BrushConfig) -> Self {
        Self {
            state: State::Idle,
            palette,
            brush,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, State::Drawing { .. })
    }

    pub fn is_erasing(&self) -> bool {
        matches!(self.state, State::Erasing { .. })
    }

    pub fn process_event(&mut self, surface: usize, event: PointerEvent) -> Vec<Action> {
        match event {
            PointerEvent::Press { button, at } => self.handle_press(surface, button, at),
            PointerEvent::Release { button } => self.handle_release(button),
            PointerEvent::Motion { at } => self.handle_motion(surface, at),
            PointerEvent::Scroll { dy } => {
                self.palette.scroll(dy);
                debug!(index = self.palette.index(), "color changed");
                Vec::new()
            }
        }
    }

    fn handle_press(&mut self, surface: usize, button: Button, at: Point) -> Vec<Action> {
        match button {
            Button::Primary => {
                self.state = State::Drawing { surface, last: at };
                vec![self.segment(surface, at, at, self.ink())]
            }
            Button::Secondary => {
                self.state = State::Erasing { surface, last: at };
                vec![
                    self.segment(surface, at, at, StrokeKind::Erase),
                    Action::SetCursor(Cursor::NotAllowed),
                ]
            }
            Button::Middle => {
                debug!(surface, "clearing canvas");
                vec![Action::Clear { surface }]
            }
            Button::Other(code) => {
                debug!(code, "ignoring button");
                Vec::new()
            }
        }
    }

    fn handle_release(&mut self, button: Button) -> Vec<Action> {
        match button {
            Button::Primary => {
                if self.is_drawing() {
                    self.state = State::Idle;
                }
                Vec::new()
            }
            Button::Secondary => {
                if self.is_erasing() {
                    self.state = State::Idle;
                }
                vec![Action::SetCursor(Cursor::Crosshair)]
            }
            _ => Vec::new(),
        }
    }

    fn handle_motion(&mut self, surface: usize, at: Point) -> Vec<Action> {
        let (stroke_surface, last, kind) = match self.state {
            State::Idle => return Vec::new(),
            State::Drawing { surface, last } => (surface, last, self.ink()),
            State::Erasing { surface, last } => (surface, last, StrokeKind::Erase),
        };

        self.set_last(surface, at);

        // Coordinates of another window mean nothing here; start over.
        if stroke_surface != surface {
            debug!(from = stroke_surface, to = surface, "stroke moved to another window");
            return Vec::new();
        }

        vec![self.segment(surface, last, at, kind)]
    }

    fn set_last(&mut self, surface: usize, at: Point) {
        match &mut self.state {
            State::Drawing { surface: s, last } | State::Erasing { surface: s, last } => {
                *s = surface;
                *last = at;
            }
            State::Idle => {}
        }
    }

    fn ink(&self) -> StrokeKind {
        StrokeKind::Ink(self.palette.current())
    }

    fn segment(&self, surface: usize, from: Point, to: Point, kind: StrokeKind) -> Action {
        let width = match kind {
            StrokeKind::Ink(_) => self.brush.width,
            StrokeKind::Erase => self.brush.eraser_width,
        };
        Action::Stroke {
            surface,
            stroke: Stroke {
                from: from.shifted(self.brush.offset),
                to: to.shifted(self.brush.offset),
                width,
                kind,
            },
        }
    }
}
