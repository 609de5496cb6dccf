//! Bubbles released from the bottom edge on a timer

use super::{due_releases, Effect};
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Fate, Particle};
use crate::rand::ParticleRng;
use crate::simulation::StepContext;
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_surface::{Paint, Surface};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubblesConfig {
    pub size: f32,
    /// Rise per tick
    pub speed: f32,
    /// Milliseconds between releases
    pub spawn_interval: f32,
    /// Bubbles present when the effect starts
    pub count: usize,
    pub max_bubbles: usize,
    pub color: Color,
}

impl Default for BubblesConfig {
    fn default() -> Self {
        Self {
            size: 20.0,
            speed: 5.0,
            spawn_interval: 1000.0,
            count: 0,
            max_bubbles: 50,
            color: Color::from_hex(0x0078d4),
        }
    }
}

impl BubblesConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        reader.alias("spawningRadius", "spawn_interval");
        Ok(Self {
            size: reader.non_negative("size", d.size)?,
            speed: reader.non_negative("speed", d.speed)?,
            spawn_interval: reader.positive("spawn_interval", d.spawn_interval)?,
            count: reader.count("count", d.count)?,
            max_bubbles: reader.count("max_bubbles", d.max_bubbles)?,
            color: reader.color("color", d.color)?,
        })
    }
}

pub struct Bubbles {
    config: BubblesConfig,
    /// Milliseconds since the last release
    since_release: f32,
}

impl Bubbles {
    pub fn new(config: BubblesConfig) -> Self {
        Self {
            config,
            since_release: 0.0,
        }
    }

    fn at_bottom(&self, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        Particle::new(
            Vec2::new(rng.next_f32() * bounds.width, bounds.height),
            Vec2::new(0.0, -self.config.speed),
            self.config.size,
            self.config.color,
        )
    }
}

impl Effect for Bubbles {
    fn name(&self) -> &'static str {
        "bubbles"
    }

    fn initial_count(&self) -> usize {
        self.config.count
    }

    fn capacity(&self) -> usize {
        self.config.max_bubbles
    }

    /// The initial set is spread over the whole height
    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let mut p = self.at_bottom(rng, bounds);
        p.position.y = rng.next_f32() * bounds.height;
        p
    }

    fn respawn(&self, _old: &Particle, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        self.at_bottom(rng, bounds)
    }

    fn advance(&self, p: &mut Particle, _ctx: &mut StepContext<'_>) -> Fate {
        p.position += p.velocity;
        if p.position.y < -p.size {
            Fate::Recycle
        } else {
            Fate::Retain
        }
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        surface.fill_circle(p.position, p.size, &Paint::Solid(p.color));
    }

    fn emit(&mut self, live: usize, ctx: &mut StepContext<'_>) {
        self.since_release += ctx.dt * 1000.0;
        let room = self.config.max_bubbles.saturating_sub(live);
        let due = due_releases(&mut self.since_release, self.config.spawn_interval, room);
        for _ in 0..due {
            let bubble = self.at_bottom(ctx.rng, ctx.bounds);
            ctx.spawn(bubble);
        }
    }

    fn reset(&mut self) {
        self.since_release = 0.0;
    }

    fn settings(&self) -> Options {
        to_table(&self.config)
    }
}
