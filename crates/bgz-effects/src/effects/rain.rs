//! Streaks falling at 60 ticks per second

use super::{interval_ms, Effect, TICK_RATE};
use crate::config::{to_table, OptionReader, Options, ValueRange};
use crate::particle::{Fate, Particle};
use crate::rand::ParticleRng;
use crate::simulation::StepContext;
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_runtime::Schedule;
use bgz_surface::Surface;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainConfig {
    /// Fall speed in pixels per tick. A plain number `n` means `[n, 2n)`.
    pub speed: ValueRange,
    /// Shortest streak; streaks are up to twice as long
    pub size: f32,
    pub count: usize,
    pub color: Color,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            speed: ValueRange::new(15.0, 30.0),
            size: 20.0,
            count: 50,
            color: Color::from_hex(0x0078d4),
        }
    }
}

impl RainConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            speed: reader.range("speed", d.speed, |n| ValueRange::new(n, n * 2.0))?,
            size: reader.non_negative("size", d.size)?,
            count: reader.count("count", d.count)?,
            color: reader.color("color", d.color)?,
        })
    }
}

pub struct Rain {
    config: RainConfig,
}

impl Rain {
    pub fn new(config: RainConfig) -> Self {
        Self { config }
    }
}

impl Effect for Rain {
    fn name(&self) -> &'static str {
        "rain"
    }

    fn initial_count(&self) -> usize {
        self.config.count
    }

    fn schedule(&self) -> Schedule {
        interval_ms(1000.0 / TICK_RATE)
    }

    /// Drops start somewhere in the canvas-height band above the top edge
    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let position = Vec2::new(rng.next_f32() * bounds.width, -rng.next_f32() * bounds.height);
        let speed = self.config.speed.sample(rng);
        let length = self.config.size + rng.next_f32() * self.config.size;
        Particle::new(position, Vec2::new(0.0, speed), length, self.config.color)
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.position += p.velocity;
        if p.position.y - p.size > ctx.bounds.height {
            Fate::Recycle
        } else {
            Fate::Retain
        }
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        let tail = Vec2::new(p.position.x, p.position.y - p.size);
        surface.stroke_line(p.position, tail, p.color, 1.0);
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

    fn config(text: &str) -> Result<RainConfig> {
        let table = parse_options(text)?;
        RainConfig::from_options(&mut OptionReader::new(&table))
    }

    #[test]
    fn speed_number_becomes_range() {
        let config = config("speed = 10").unwrap();
        assert_eq!(config.speed, ValueRange::new(10.0, 20.0));
    }

    #[test]
    fn inverted_speed_range_rejected() {
        let err = config("speed = { min = 10, max = 5 }").unwrap_err();
        assert!(err.is_config_error());
        assert!(config("speed = { min = 5, max = 5 }").is_err());
        assert!(config("speed = { min = 5, max = 6 }").is_ok());
    }

    #[test]
    fn spawns_above_the_top_edge() {
        let rain = Rain::new(RainConfig::default());
        let mut rng = ParticleRng::new(11);
        let bounds = Bounds::new(300.0, 200.0);
        for _ in 0..100 {
            let p = rain.spawn(0, &mut rng, bounds);
            assert!(p.position.y <= 0.0 && p.position.y > -200.0);
            assert!((15.0..30.0).contains(&p.velocity.y));
            assert!((20.0..40.0).contains(&p.size));
        }
    }

    #[test]
    fn recycled_once_fully_below() {
        let rain = Rain::new(RainConfig::default());
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(1);
        let mut ctx = StepContext::new(1.0 / 60.0, Bounds::new(100.0, 100.0), &input, &mut rng);

        let mut p = Particle::new(Vec2::new(10.0, 110.0), Vec2::new(0.0, 10.0), 20.0, Color::WHITE);
        assert_eq!(rain.advance(&mut p, &mut ctx), Fate::Retain);
        assert_eq!(rain.advance(&mut p, &mut ctx), Fate::Recycle);
    }
}
