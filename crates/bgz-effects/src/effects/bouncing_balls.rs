//! Balls falling under gravity and bouncing off the floor and walls

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
pub struct BouncingBallsConfig {
    pub count: usize,
    /// Ball radius
    pub size: f32,
    /// Spread of the initial velocity, `[-speed/2, speed/2)` per axis
    pub speed: f32,
    /// Added to the vertical velocity every airborne tick
    pub gravity: f32,
    /// Fraction of vertical speed kept on hitting the floor
    pub bounce: f32,
    pub colors: Vec<Color>,
}

impl Default for BouncingBallsConfig {
    fn default() -> Self {
        Self {
            count: 50,
            size: 10.0,
            speed: 5.0,
            gravity: 0.2,
            bounce: 0.8,
            colors: vec![
                Color::from_hex(0xff4b4b),
                Color::from_hex(0x4be0c8),
                Color::from_hex(0xfac45e),
            ],
        }
    }
}

impl BouncingBallsConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            count: reader.count("count", d.count)?,
            size: reader.non_negative("size", d.size)?,
            speed: reader.non_negative("speed", d.speed)?,
            gravity: reader.number("gravity", d.gravity)?,
            bounce: reader.fraction("bounce", d.bounce)?,
            colors: reader.colors("colors", &d.colors)?,
        })
    }
}

pub struct BouncingBalls {
    config: BouncingBallsConfig,
}

impl BouncingBalls {
    pub fn new(config: BouncingBallsConfig) -> Self {
        Self { config }
    }
}

impl Effect for BouncingBalls {
    fn name(&self) -> &'static str {
        "bouncingBalls"
    }

    fn initial_count(&self) -> usize {
        self.config.count
    }

    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let half = self.config.speed / 2.0;
        let velocity = Vec2::new(rng.signed(half), rng.signed(half));
        let color = rng.pick(&self.config.colors).copied().unwrap_or(Color::WHITE);
        Particle::new(
            rng.point_in(bounds.width, bounds.height),
            velocity,
            self.config.size,
            color,
        )
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.position += p.velocity;

        let floor = ctx.bounds.height - p.size;
        if p.position.y > floor {
            p.position.y = floor;
            p.velocity.y = bounce(f32::INFINITY, p.velocity.y, 0.0, floor, self.config.bounce);
        } else {
            p.velocity.y += self.config.gravity;
        }
        p.velocity.x = bounce(p.position.x, p.velocity.x, p.size, ctx.bounds.width - p.size, 1.0);
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
    use bgz_runtime::FrameInput;

    fn ball(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::new(vx, vy), 10.0, Color::WHITE)
    }

    fn step(p: &mut Particle) {
        let balls = BouncingBalls::new(BouncingBallsConfig::default());
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(1);
        let mut ctx = StepContext::new(0.016, Bounds::new(200.0, 100.0), &input, &mut rng);
        assert_eq!(balls.advance(p, &mut ctx), Fate::Retain);
    }

    #[test]
    fn floor_reflects_with_damping() {
        let mut p = ball(50.0, 88.0, 0.0, 5.0);
        step(&mut p);
        assert_eq!(p.position.y, 90.0);
        assert!((p.velocity.y + 4.0).abs() < 1e-5);
    }

    #[test]
    fn airborne_balls_accelerate() {
        let mut p = ball(50.0, 20.0, 0.0, 1.0);
        step(&mut p);
        assert!((p.velocity.y - 1.2).abs() < 1e-5);
    }

    #[test]
    fn walls_reflect_without_loss() {
        let mut p = ball(188.0, 20.0, 3.0, 0.0);
        step(&mut p);
        assert_eq!(p.velocity.x, -3.0);
        let mut p = ball(12.0, 20.0, -3.0, 0.0);
        step(&mut p);
        assert_eq!(p.velocity.x, 3.0);
    }
}
