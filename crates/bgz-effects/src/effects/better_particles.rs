//! Particles that drift freely and get pulled toward the pointer.
//!
//! The only time-integrated effect: velocities are pixels per second and
//! every tick advances by the elapsed `dt`.

use super::{due_releases, Effect};
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Fate, Particle};
use crate::policy::bounce;
use crate::rand::ParticleRng;
use crate::simulation::StepContext;
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_surface::{Paint, Surface};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetterParticlesConfig {
    pub color: Color,
    pub size: f32,
    /// Largest initial velocity component, pixels per second
    pub speed: f32,
    /// Attraction toward the pointer (or the canvas center when the pointer
    /// is away) applies within this distance on both axes
    pub range: f32,
    /// Fraction of the offset to the pointer added to velocity each tick
    pub follow_speed: f32,
    pub max_particles: usize,
    /// Particles present when the effect starts
    pub count: usize,
    /// New particles per second
    pub emit_rate: f32,
}

impl Default for BetterParticlesConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x0078d4),
            size: 2.0,
            speed: 50.0,
            range: 100.0,
            follow_speed: 0.1,
            max_particles: 100,
            count: 0,
            emit_rate: 60.0,
        }
    }
}

impl BetterParticlesConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            color: reader.color("color", d.color)?,
            size: reader.non_negative("size", d.size)?,
            speed: reader.non_negative("speed", d.speed)?,
            range: reader.non_negative("range", d.range)?,
            follow_speed: reader.non_negative("follow_speed", d.follow_speed)?,
            max_particles: reader.count("max_particles", d.max_particles)?,
            count: reader.count("count", d.count)?,
            emit_rate: reader.non_negative("emit_rate", d.emit_rate)?,
        })
    }
}

pub struct BetterParticles {
    config: BetterParticlesConfig,
    /// Fractional particles owed by the emitter
    accumulator: f32,
}

impl BetterParticles {
    pub fn new(config: BetterParticlesConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
        }
    }
}

impl Effect for BetterParticles {
    fn name(&self) -> &'static str {
        "betterParticles"
    }

    fn initial_count(&self) -> usize {
        self.config.count.min(self.config.max_particles)
    }

    fn capacity(&self) -> usize {
        self.config.max_particles
    }

    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let speed = self.config.speed;
        Particle::new(
            rng.point_in(bounds.width, bounds.height),
            Vec2::new(rng.signed(speed), rng.signed(speed)),
            self.config.size,
            self.config.color,
        )
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        // Without a pointer over the canvas the pull comes from its center
        let target = ctx.input.pointer.unwrap_or_else(|| ctx.bounds.center());
        let offset = target - p.position;
        if offset.x.abs() <= self.config.range && offset.y.abs() <= self.config.range {
            p.velocity += offset * self.config.follow_speed;
        }
        p.position += p.velocity * ctx.dt;
        p.velocity.x = bounce(p.position.x, p.velocity.x, 0.0, ctx.bounds.width, 1.0);
        p.velocity.y = bounce(p.position.y, p.velocity.y, 0.0, ctx.bounds.height, 1.0);
        Fate::Retain
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        surface.fill_circle(p.position, p.size, &Paint::Solid(p.color));
    }

    fn emit(&mut self, live: usize, ctx: &mut StepContext<'_>) {
        self.accumulator += ctx.dt * self.config.emit_rate;
        let room = self.config.max_particles.saturating_sub(live);
        for _ in 0..due_releases(&mut self.accumulator, 1.0, room) {
            let p = self.spawn(0, ctx.rng, ctx.bounds);
            ctx.spawn(p);
        }
    }

    fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    fn settings(&self) -> Options {
        to_table(&self.config)
    }
}
