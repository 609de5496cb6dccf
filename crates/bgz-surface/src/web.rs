//! Browser canvas adapter (`web` feature)

use crate::document::{Element, ElementLookup};
use crate::surface::{Paint, Surface, SurfaceRef};
use bgz_core::{BgzError, Bounds, Color, Result, Vec2};
use bgz_runtime::{PointerState, Scheduler};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// `Surface` over a `<canvas>` 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| BgzError::SurfaceError("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| BgzError::SurfaceError("context is not CanvasRenderingContext2d".into()))?;
        Ok(Self { canvas, ctx })
    }

    fn trace(&self, points: &[Vec2]) {
        self.ctx.begin_path();
        if let Some((first, rest)) = points.split_first() {
            self.ctx.move_to(first.x as f64, first.y as f64);
            for p in rest {
                self.ctx.line_to(p.x as f64, p.y as f64);
            }
        }
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Bounds {
        Bounds::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.width as f64, size.height as f64);
    }

    fn fill(&mut self, color: Color) {
        let size = self.size();
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(0.0, 0.0, size.width as f64, size.height as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(&color.to_css()),
            Paint::LinearGradient {
                start,
                end,
                from,
                to,
            } => {
                let gradient = self.ctx.create_linear_gradient(
                    start.x as f64,
                    start.y as f64,
                    end.x as f64,
                    end.y as f64,
                );
                let stops = gradient
                    .add_color_stop(0.0, &from.to_css())
                    .and_then(|_| gradient.add_color_stop(1.0, &to.to_css()));
                if let Err(err) = stops {
                    tracing::warn!(error = ?err, "gradient stop rejected");
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
        self.ctx.begin_path();
        let arc = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius.abs() as f64,
            0.0,
            std::f64::consts::TAU,
        );
        if arc.is_ok() {
            self.ctx.fill();
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.stroke_path(&[from, to], color, width);
    }

    fn stroke_path(&mut self, points: &[Vec2], color: Color, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.trace(points);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.trace(points);
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("{size}px monospace"));
        self.ctx.set_text_baseline("top");
        if let Err(err) = self.ctx.fill_text(text, origin.x as f64, origin.y as f64) {
            tracing::warn!(error = ?err, "fill_text failed");
        }
    }
}

/// `ElementLookup` over the page's `document`.
///
/// Canvas surfaces are cached per selector, so a stopped effect can be
/// restarted on the same surface.
#[derive(Default)]
pub struct WebDocument {
    canvases: RefCell<HashMap<String, SurfaceRef>>,
}

impl WebDocument {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ElementLookup for WebDocument {
    fn query_selector(&self, selector: &str) -> Option<Element> {
        if let Some(surface) = self.canvases.borrow().get(selector) {
            return Some(Element::Canvas(surface.clone()));
        }
        let document = web_sys::window()?.document()?;
        let element = document.query_selector(selector).ok()??;
        let tag = element.tag_name().to_ascii_lowercase();
        match element.dyn_into::<HtmlCanvasElement>() {
            Ok(canvas) => match CanvasSurface::new(canvas) {
                Ok(surface) => {
                    let shared: SurfaceRef = Rc::new(RefCell::new(surface));
                    self.canvases
                        .borrow_mut()
                        .insert(selector.to_string(), shared.clone());
                    Some(Element::Canvas(shared))
                }
                Err(err) => {
                    tracing::warn!(selector, error = %err, "canvas without a 2d context");
                    Some(Element::Other { tag })
                }
            },
            Err(_) => Some(Element::Other { tag }),
        }
    }
}

/// Drive `scheduler` from `requestAnimationFrame` while it has tasks.
///
/// Pointer events should be fed into `pointer` by the page; each frame
/// takes a snapshot of it and then clears its per-frame clicks.
pub fn drive_animation_frames(scheduler: Scheduler, pointer: Rc<RefCell<PointerState>>) -> Result<()> {
    let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = slot.clone();

    *slot.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp_ms: f64| {
        let input = pointer.borrow().snapshot();
        scheduler.frame(timestamp_ms / 1000.0, &input);
        pointer.borrow_mut().end_frame();

        if scheduler.scheduled_count() == 0 {
            tracing::info!("no frame tasks left, animation frames stopped");
            return;
        }
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(err) = request_frame(callback) {
                tracing::warn!(error = %err, "requestAnimationFrame failed");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let result = match slot.borrow().as_ref() {
        Some(callback) => request_frame(callback),
        None => Ok(()),
    };
    result
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| BgzError::SurfaceError("no window".into()))?;
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(js_error)?;
    Ok(())
}

fn js_error(err: JsValue) -> BgzError {
    BgzError::SurfaceError(format!("{err:?}"))
}
