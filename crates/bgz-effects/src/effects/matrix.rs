//! Glyph rain: columns of characters falling one cell per tick

use super::{interval_ms, Effect};
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Extra, Fate, Particle};
use crate::rand::ParticleRng;
use crate::simulation::{ClearMode, StepContext};
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_runtime::Schedule;
use bgz_surface::Surface;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixConfig {
    pub color: Color,
    /// Cell size in pixels; also the glyph size
    pub size: f32,
    /// Milliseconds between ticks
    pub speed: f32,
    /// Glyphs to draw from
    pub text: String,
    /// Chance per column per tick that a new drop starts
    pub density: f32,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x00ff00),
            size: 16.0,
            speed: 50.0,
            text: "01".to_string(),
            density: 0.1,
        }
    }
}

impl MatrixConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            color: reader.color("color", d.color)?,
            size: reader.at_least("size", d.size, 1.0)?,
            speed: reader.positive("speed", d.speed)?,
            text: reader.text("text", &d.text)?,
            density: reader.fraction("density", d.density)?,
        })
    }
}

pub struct Matrix {
    config: MatrixConfig,
    glyphs: Vec<char>,
}

impl Matrix {
    pub fn new(config: MatrixConfig) -> Self {
        let glyphs = config.text.chars().collect();
        Self { config, glyphs }
    }

    fn glyph(&self, rng: &mut ParticleRng) -> char {
        rng.pick(&self.glyphs).copied().unwrap_or(' ')
    }

    fn columns(&self, bounds: Bounds) -> usize {
        (bounds.width / self.config.size).ceil().max(0.0) as usize
    }

    /// A drop one cell above the top of `column`; its first tick brings it to row 0
    fn drop_in(&self, column: usize, rng: &mut ParticleRng) -> Particle {
        let size = self.config.size;
        Particle::new(
            Vec2::new(column as f32 * size, -size),
            Vec2::new(0.0, size),
            size,
            self.config.color,
        )
        .with_extra(Extra::Glyph(self.glyph(rng)))
    }
}

impl Effect for Matrix {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn initial_count(&self) -> usize {
        0
    }

    fn clear_mode(&self) -> ClearMode {
        ClearMode::Fade(Color::BLACK.with_alpha(0.05))
    }

    fn schedule(&self) -> Schedule {
        interval_ms(self.config.speed)
    }

    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let column = rng.index(self.columns(bounds));
        self.drop_in(column, rng)
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.position += p.velocity;
        if p.position.y > ctx.bounds.height {
            return Fate::Expire;
        }
        p.extra = Extra::Glyph(self.glyph(ctx.rng));
        Fate::Retain
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        let Extra::Glyph(c) = p.extra else {
            return;
        };
        let mut buf = [0u8; 4];
        surface.fill_text(c.encode_utf8(&mut buf), p.position, p.size, p.color);
    }

    fn emit(&mut self, _live: usize, ctx: &mut StepContext<'_>) {
        for column in 0..self.columns(ctx.bounds) {
            if ctx.rng.chance(self.config.density) {
                let drop = self.drop_in(column, ctx.rng);
                ctx.spawn(drop);
            }
        }
    }

    fn settings(&self) -> Options {
        to_table(&self.config)
    }
}
