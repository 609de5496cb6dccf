//! Surface adapter trait

use bgz_core::{Bounds, Color, Vec2};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a surface. The element that owns the surface holds one
/// reference; a running effect loop borrows another until it is stopped.
pub type SurfaceRef = Rc<RefCell<dyn Surface>>;

/// How a filled primitive is colored
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient from `from` at `start` to `to` at `end`
    LinearGradient {
        start: Vec2,
        end: Vec2,
        from: Color,
        to: Color,
    },
}

impl Paint {
    /// Color of the paint at point `p`
    pub fn color_at(&self, p: Vec2) -> Color {
        match *self {
            Paint::Solid(color) => color,
            Paint::LinearGradient {
                start,
                end,
                from,
                to,
            } => {
                let axis = end - start;
                let len_sq = axis.x * axis.x + axis.y * axis.y;
                if len_sq <= f32::EPSILON {
                    return to;
                }
                let rel = p - start;
                let t = ((rel.x * axis.x + rel.y * axis.y) / len_sq).clamp(0.0, 1.0);
                from.lerp(to, t)
            }
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

/// A 2D drawing target with canvas-like semantics
///
/// Coordinates are surface pixels with the origin top-left and +y down.
/// The size may change between ticks; effects read it every tick.
pub trait Surface {
    /// Current pixel size
    fn size(&self) -> Bounds;

    /// Change the pixel size, discarding content
    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to transparent
    fn clear(&mut self);

    /// Composite `color` over the whole surface (translucent colors fade it)
    fn fill(&mut self, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);

    /// Stroke an open polyline through `points`
    fn stroke_path(&mut self, points: &[Vec2], color: Color, width: f32);

    /// Fill a closed polygon
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    /// Draw `text` with its top-left corner at `origin`, using a monospace
    /// cell of `size` pixels
    fn fill_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color);
}
