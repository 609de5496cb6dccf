//! Soft-edged leaves sinking slowly

use super::Effect;
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Fate, Particle};
use crate::rand::ParticleRng;
use crate::simulation::StepContext;
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_surface::{Paint, Surface};
use serde::Serialize;

const EXIT_MARGIN: f32 = 50.0;
/// Height a fallen leaf re-enters at
const REENTRY_Y: f32 = -10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeavesConfig {
    pub color: Color,
    pub count: usize,
    /// Upper bound on the fall per tick
    pub speed: f32,
}

impl Default for LeavesConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x87ceeb),
            count: 50,
            speed: 1.0,
        }
    }
}

impl LeavesConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            color: reader.color("color", d.color)?,
            count: reader.count("count", d.count)?,
            speed: reader.non_negative("speed", d.speed)?,
        })
    }
}

pub struct Leaves {
    config: LeavesConfig,
}

impl Leaves {
    pub fn new(config: LeavesConfig) -> Self {
        Self { config }
    }
}

impl Effect for Leaves {
    fn name(&self) -> &'static str {
        "leaves"
    }

    fn initial_count(&self) -> usize {
        self.config.count
    }

    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let position = rng.point_in(bounds.width, bounds.height);
        let size = rng.range(10.0, 20.0);
        let angle = rng.range(0.0, 360.0);
        let speed = rng.next_f32() * self.config.speed;
        Particle::new(position, Vec2::new(0.0, speed), size, self.config.color)
            .with_angle(angle)
            .with_speed(speed)
    }

    /// The same leaf re-enters along the top edge, keeping its size and speed
    fn respawn(&self, old: &Particle, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let mut leaf = *old;
        leaf.position = Vec2::new(rng.next_f32() * bounds.width, REENTRY_Y);
        leaf
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.angle += ctx.rng.signed(0.025);
        p.position += p.velocity;
        if ctx.bounds.contains_with_margin(p.position, EXIT_MARGIN) {
            Fate::Retain
        } else {
            Fate::Recycle
        }
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        let paint = Paint::LinearGradient {
            start: p.position,
            end: p.position + Vec2::new(p.size, p.size),
            from: p.color.with_alpha(0.0),
            to: p.color.with_alpha(1.0),
        };
        surface.fill_circle(p.position, p.size, &paint);
    }

    fn settings(&self) -> Options {
        to_table(&self.config)
    }
}
