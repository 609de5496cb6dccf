//! CPU raster surface backed by an RGBA image

use crate::surface::{Paint, Surface};
use bgz_core::{BgzError, Bounds, Color, Result, Vec2};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Glyph cell is 5 columns by 7 rows
const GLYPH_COLS: u32 = 5;
const GLYPH_ROWS: u32 = 7;

/// Software rasterizer with source-over blending.
///
/// Shapes are sampled at pixel centers without anti-aliasing; text is drawn
/// as blocky per-character patterns, which is enough for glyph-rain effects.
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Encode the current content as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image
            .save_with_format(path.as_ref(), image::ImageFormat::Png)
            .map_err(|e| BgzError::ImageError(format!("{}: {e}", path.as_ref().display())))
    }

    fn blend(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let src_a = color.a.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let [dr, dg, db, da] = dst.0.map(|c| c as f32 / 255.0);
        let out_a = src_a + da * (1.0 - src_a);
        let mix = |s: f32, d: f32| {
            if out_a <= 0.0 {
                0.0
            } else {
                (s * src_a + d * da * (1.0 - src_a)) / out_a
            }
        };
        let out = Color::new(mix(color.r, dr), mix(color.g, dg), mix(color.b, db), out_a);
        *dst = Rgba(out.to_rgba8());
    }

    /// Pixel rows/columns covering `[min, max]`, clipped to the image
    fn span(&self, min: f32, max: f32, limit: u32) -> std::ops::Range<i64> {
        let lo = (min.floor() as i64).max(0);
        let hi = (max.ceil() as i64 + 1).min(limit as i64);
        lo..hi.max(lo)
    }

    fn blend_where(&mut self, min: Vec2, max: Vec2, mut shade: impl FnMut(Vec2) -> Option<Color>) {
        let xs = self.span(min.x, max.x, self.image.width());
        let ys = self.span(min.y, max.y, self.image.height());
        for y in ys {
            for x in xs.clone() {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if let Some(color) = shade(center) {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> Bounds {
        Bounds::new(self.image.width() as f32, self.image.height() as f32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn fill(&mut self, color: Color) {
        let (w, h) = (self.image.width() as i64, self.image.height() as i64);
        for y in 0..h {
            for x in 0..w {
                self.blend(x, y, color);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        let r = radius.abs();
        let extent = Vec2::new(r, r);
        self.blend_where(center - extent, center + extent, |p| {
            (p.distance(center) <= r).then(|| paint.color_at(p))
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        let half = (width / 2.0).max(0.5);
        let min = Vec2::new(from.x.min(to.x) - half, from.y.min(to.y) - half);
        let max = Vec2::new(from.x.max(to.x) + half, from.y.max(to.y) + half);
        self.blend_where(min, max, |p| {
            (distance_to_segment(p, from, to) <= half).then_some(color)
        });
    }

    fn stroke_path(&mut self, points: &[Vec2], color: Color, width: f32) {
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1], color, width);
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let (mut min, mut max) = (points[0], points[0]);
        for p in points {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        self.blend_where(min, max, |p| point_in_polygon(p, points).then_some(color));
    }

    fn fill_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color) {
        let cell_w = size * 0.6;
        let dot_w = cell_w / GLYPH_COLS as f32;
        let dot_h = size / GLYPH_ROWS as f32;
        for (i, ch) in text.chars().enumerate() {
            let mask = glyph_mask(ch);
            let left = origin.x + i as f32 * cell_w;
            for row in 0..GLYPH_ROWS {
                for col in 0..GLYPH_COLS {
                    if mask & (1 << (row * GLYPH_COLS + col)) == 0 {
                        continue;
                    }
                    let min = Vec2::new(left + col as f32 * dot_w, origin.y + row as f32 * dot_h);
                    let max = Vec2::new(min.x + dot_w, min.y + dot_h);
                    self.blend_where(min, max, |p| {
                        (p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y).then_some(color)
                    });
                }
            }
        }
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Even-odd rule
fn point_in_polygon(p: Vec2, points: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Deterministic 5x7 dot pattern for a character (FNV-1a of the code point)
fn glyph_mask(ch: char) -> u64 {
    if ch.is_whitespace() {
        return 0;
    }
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in (ch as u32).to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let bits = (1u64 << (GLYPH_COLS * GLYPH_ROWS)) - 1;
    // Never render a visible character as an empty cell
    (hash & bits) | 1 << (GLYPH_COLS * 3 + 2)
}
