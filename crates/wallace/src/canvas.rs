use anyhow::{Context, Result};
use gtk4::cairo;
use wallace_core::palette::Rgba;
use wallace_core::pen::{Stroke, StrokeKind};

/// Off-screen ARGB32 raster a window's strokes accumulate on.
#[derive(Default)]
pub struct Canvas {
    surface: Option<cairo::ImageSurface>,
}

impl Canvas {
    pub fn size(&self) -> Option<(i32, i32)> {
        self.surface.as_ref().map(|s| (s.width(), s.height()))
    }

    /// Reallocate at the new size, keeping whatever was drawn so far anchored
    /// at the top-left corner.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        if width <= 0 || height <= 0 {
            return Ok(());
        }

        let resized = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)
            .with_context(|| format!("allocating {}x{} canvas", width, height))?;

        if let Some(old) = &self.surface {
            let cr = cairo::Context::new(&resized).context("creating cairo context")?;
            cr.set_source_surface(old, 0.0, 0.0)
                .context("setting old canvas as source")?;
            cr.set_operator(cairo::Operator::Source);
            cr.paint().context("copying canvas")?;
        }

        self.surface = Some(resized);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        let Some(surface) = &self.surface else {
            return Ok(());
        };
        let cr = cairo::Context::new(surface).context("creating cairo context")?;
        set_source(&cr, Rgba::TRANSPARENT);
        cr.set_operator(cairo::Operator::Source);
        cr.paint().context("clearing canvas")?;
        Ok(())
    }

    pub fn stroke(&mut self, stroke: &Stroke) -> Result<()> {
        let Some(surface) = &self.surface else {
            return Ok(());
        };
        let cr = cairo::Context::new(surface).context("creating cairo context")?;
        cr.move_to(stroke.from.x, stroke.from.y);
        cr.line_to(stroke.to.x, stroke.to.y);
        cr.set_line_width(stroke.width);
        cr.set_line_cap(cairo::LineCap::Round);
        match stroke.kind {
            StrokeKind::Ink(color) => set_source(&cr, color),
            StrokeKind::Erase => {
                cr.set_operator(cairo::Operator::Source);
                set_source(&cr, Rgba::TRANSPARENT);
            }
        }
        cr.stroke().context("stroking segment")?;
        Ok(())
    }

    /// Composite the canvas onto a window's draw context.
    pub fn paint(&self, cr: &cairo::Context) -> Result<()> {
        let Some(surface) = &self.surface else {
            return Ok(());
        };
        cr.set_source_surface(surface, 0.0, 0.0)
            .context("setting canvas as source")?;
        cr.paint().context("painting canvas")?;
        Ok(())
    }
}

fn set_source(cr: &cairo::Context, color: Rgba) {
    cr.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallace_core::pen::Point;

    const RED: Rgba = Rgba {
        red: 1.0,
        green: 0.0,
        blue: 0.0,
        alpha: 1.0,
    };

    fn alpha_at(surface: &mut cairo::ImageSurface, x: i32, y: i32) -> u8 {
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().expect("exclusive access to surface");
        let offset = y as usize * stride + x as usize * 4;
        let pixel = u32::from_ne_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        (pixel >> 24) as u8
    }

    fn canvas_alpha(canvas: &mut Canvas, x: i32, y: i32) -> u8 {
        alpha_at(canvas.surface.as_mut().expect("canvas allocated"), x, y)
    }

    fn line(from: (f64, f64), to: (f64, f64), width: f64, kind: StrokeKind) -> Stroke {
        Stroke {
            from: Point::new(from.0, from.1),
            to: Point::new(to.0, to.1),
            width,
            kind,
        }
    }

    fn make_canvas(w: i32, h: i32) -> Canvas {
        let mut canvas = Canvas::default();
        canvas.resize(w, h).unwrap();
        canvas
    }

    #[test]
    fn new_canvas_is_transparent() {
        let mut canvas = make_canvas(16, 16);
        assert_eq!(canvas.size(), Some((16, 16)));
        assert_eq!(canvas_alpha(&mut canvas, 8, 8), 0);
    }

    #[test]
    fn unallocated_canvas_ignores_drawing() {
        let mut canvas = Canvas::default();
        assert_eq!(canvas.size(), None);
        assert!(canvas.stroke(&line((0.0, 0.0), (5.0, 5.0), 4.0, StrokeKind::Ink(RED))).is_ok());
        assert!(canvas.clear().is_ok());
    }

    #[test]
    fn non_positive_resize_is_ignored() {
        let mut canvas = make_canvas(10, 10);
        canvas.resize(0, 20).unwrap();
        assert_eq!(canvas.size(), Some((10, 10)));
    }

    #[test]
    fn ink_stroke_covers_the_line_only() {
        let mut canvas = make_canvas(64, 64);
        canvas
            .stroke(&line((2.0, 10.0), (50.0, 10.0), 4.0, StrokeKind::Ink(RED)))
            .unwrap();
        assert_eq!(canvas_alpha(&mut canvas, 20, 10), 255);
        assert_eq!(canvas_alpha(&mut canvas, 20, 30), 0);
    }

    #[test]
    fn zero_length_stroke_leaves_a_dot() {
        let mut canvas = make_canvas(32, 32);
        canvas
            .stroke(&line((12.0, 12.0), (12.0, 12.0), 4.0, StrokeKind::Ink(RED)))
            .unwrap();
        assert_eq!(canvas_alpha(&mut canvas, 12, 12), 255);
        assert_eq!(canvas_alpha(&mut canvas, 20, 20), 0);
    }

    #[test]
    fn erase_stroke_punches_transparent_hole() {
        let mut canvas = make_canvas(128, 32);
        canvas
            .stroke(&line((2.0, 10.0), (120.0, 10.0), 4.0, StrokeKind::Ink(RED)))
            .unwrap();
        canvas
            .stroke(&line((20.0, 10.0), (20.0, 10.0), 60.0, StrokeKind::Erase))
            .unwrap();
        assert_eq!(canvas_alpha(&mut canvas, 20, 10), 0);
        assert_eq!(canvas_alpha(&mut canvas, 45, 10), 0);
        assert_eq!(canvas_alpha(&mut canvas, 100, 10), 255);
    }

    #[test]
    fn clear_wipes_everything() {
        let mut canvas = make_canvas(32, 32);
        canvas
            .stroke(&line((0.0, 16.0), (32.0, 16.0), 8.0, StrokeKind::Ink(RED)))
            .unwrap();
        canvas.clear().unwrap();
        assert_eq!(canvas_alpha(&mut canvas, 16, 16), 0);
    }

    #[test]
    fn growing_keeps_drawing() {
        let mut canvas = make_canvas(20, 20);
        canvas
            .stroke(&line((5.0, 5.0), (5.0, 5.0), 4.0, StrokeKind::Ink(RED)))
            .unwrap();
        canvas.resize(40, 40).unwrap();
        assert_eq!(canvas.size(), Some((40, 40)));
        assert_eq!(canvas_alpha(&mut canvas, 5, 5), 255);
        assert_eq!(canvas_alpha(&mut canvas, 30, 30), 0);
    }

    #[test]
    fn shrinking_crops_drawing() {
        let mut canvas = make_canvas(40, 40);
        canvas
            .stroke(&line((2.0, 2.0), (2.0, 2.0), 4.0, StrokeKind::Ink(RED)))
            .unwrap();
        canvas.resize(10, 10).unwrap();
        assert_eq!(canvas.size(), Some((10, 10)));
        assert_eq!(canvas_alpha(&mut canvas, 2, 2), 255);
    }

    #[test]
    fn paint_composites_onto_target() {
        let mut canvas = make_canvas(16, 16);
        canvas
            .stroke(&line((8.0, 8.0), (8.0, 8.0), 6.0, StrokeKind::Ink(RED)))
            .unwrap();

        let mut target = cairo::ImageSurface::create(cairo::Format::ARgb32, 16, 16).unwrap();
        {
            let cr = cairo::Context::new(&target).unwrap();
            canvas.paint(&cr).unwrap();
        }
        assert_eq!(alpha_at(&mut target, 8, 8), 255);
        assert_eq!(alpha_at(&mut target, 1, 14), 0);
    }
}
