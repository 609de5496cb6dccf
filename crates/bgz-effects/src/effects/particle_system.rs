//! Dots drifting in straight lines and bouncing off the edges

use super::Effect;
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Fate, Particle};
use crate::policy::bounce;
use crate::rand::ParticleRng;
use crate::simulation::StepContext;
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_surface::{Paint, Surface};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleSystemConfig {
    pub color: Color,
    /// Dot radius
    pub size: f32,
    pub count: usize,
    /// Largest velocity component, pixels per tick
    pub speed: f32,
    /// Fraction of speed kept after hitting an edge
    pub damping: f32,
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x0078d4),
            size: 2.0,
            count: 50,
            speed: 1.0,
            damping: 1.0,
        }
    }
}

impl ParticleSystemConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            color: reader.color("color", d.color)?,
            size: reader.non_negative("size", d.size)?,
            count: reader.count("count", d.count)?,
            speed: reader.non_negative("speed", d.speed)?,
            damping: reader.fraction("damping", d.damping)?,
        })
    }
}

pub struct ParticleSystem {
    config: ParticleSystemConfig,
}

impl ParticleSystem {
    pub fn new(config: ParticleSystemConfig) -> Self {
        Self { config }
    }
}

impl Effect for ParticleSystem {
    fn name(&self) -> &'static str {
        "particleSystem"
    }

    fn initial_count(&self) -> usize {
        self.config.count
    }

    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let speed = self.config.speed;
        let velocity = Vec2::new(rng.signed(speed), rng.signed(speed));
        Particle::new(
            rng.point_in(bounds.width, bounds.height),
            velocity,
            self.config.size,
            self.config.color,
        )
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.position += p.velocity;
        let damping = self.config.damping;
        p.velocity.x = bounce(p.position.x, p.velocity.x, 0.0, ctx.bounds.width, damping);
        p.velocity.y = bounce(p.position.y, p.velocity.y, 0.0, ctx.bounds.height, damping);
        Fate::Retain
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        surface.fill_circle(p.position, p.size, &Paint::Solid(p.color));
    }

    fn settings(&self) -> Options {
        to_table(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_options;
    use bgz_runtime::FrameInput;

    fn step(effect: &ParticleSystem, p: &mut Particle, bounds: Bounds) -> Fate {
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(3);
        let mut ctx = StepContext::new(1.0 / 60.0, bounds, &input, &mut rng);
        effect.advance(p, &mut ctx)
    }

    #[test]
    fn zero_speed_never_moves() {
        let table = parse_options("count = 5\nspeed = 0").unwrap();
        let config = ParticleSystemConfig::from_options(&mut OptionReader::new(&table)).unwrap();
        let effect = ParticleSystem::new(config);
        let bounds = Bounds::new(200.0, 100.0);
        let mut rng = ParticleRng::new(9);
        let mut p = effect.spawn(0, &mut rng, bounds);
        let start = p.position;
        for _ in 0..100 {
            step(&effect, &mut p, bounds);
        }
        assert_eq!(p.position, start);
    }

    #[test]
    fn bounces_off_right_edge() {
        let effect = ParticleSystem::new(ParticleSystemConfig::default());
        let bounds = Bounds::new(100.0, 100.0);
        let mut p = Particle::new(Vec2::new(99.5, 50.0), Vec2::new(1.0, 0.0), 2.0, Color::WHITE);
        assert_eq!(step(&effect, &mut p, bounds), Fate::Retain);
        assert_eq!(p.velocity.x, -1.0);
        step(&effect, &mut p, bounds);
        assert_eq!(p.velocity.x, -1.0);
    }

    #[test]
    fn damping_scales_reflection() {
        let table = parse_options("damping = 0.5").unwrap();
        let config = ParticleSystemConfig::from_options(&mut OptionReader::new(&table)).unwrap();
        let effect = ParticleSystem::new(config);
        let mut p = Particle::new(Vec2::new(0.5, 50.0), Vec2::new(-2.0, 0.0), 2.0, Color::WHITE);
        step(&effect, &mut p, Bounds::new(100.0, 100.0));
        assert_eq!(p.velocity.x, 1.0);
    }

    #[test]
    fn damping_above_one_rejected() {
        let table = parse_options("damping = 1.5").unwrap();
        let err = ParticleSystemConfig::from_options(&mut OptionReader::new(&table)).unwrap_err();
        assert!(err.is_config_error());
    }
}
