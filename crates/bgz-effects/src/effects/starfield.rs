//! Stars scrolling right to left over a solid sky

use super::Effect;
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Fate, Particle};
use crate::policy::wrap;
use crate::rand::ParticleRng;
use crate::simulation::{ClearMode, StepContext};
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_surface::{Paint, Surface};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarfieldConfig {
    /// Each star moves between 1 and `1 + speed` pixels per tick
    pub speed: f32,
    /// Number of stars
    pub density: usize,
    pub star_color: Color,
    pub background_color: Color,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            density: 500,
            star_color: Color::WHITE,
            background_color: Color::BLACK,
        }
    }
}

impl StarfieldConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            speed: reader.non_negative("speed", d.speed)?,
            density: reader.count("density", d.density)?,
            star_color: reader.color("star_color", d.star_color)?,
            background_color: reader.color("background_color", d.background_color)?,
        })
    }
}

pub struct Starfield {
    config: StarfieldConfig,
}

impl Starfield {
    pub fn new(config: StarfieldConfig) -> Self {
        Self { config }
    }
}

impl Effect for Starfield {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn initial_count(&self) -> usize {
        self.config.density
    }

    fn clear_mode(&self) -> ClearMode {
        ClearMode::Fill(self.config.background_color)
    }

    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let position = rng.point_in(bounds.width, bounds.height);
        let size = rng.range(0.0, 3.0);
        let speed = self.config.speed * rng.next_f32() + 1.0;
        Particle::new(position, Vec2::new(-speed, 0.0), size, self.config.star_color)
            .with_speed(speed)
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.position.x = wrap(p.position.x - p.speed, 0.0, ctx.bounds.width);
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

    #[test]
    fn star_speed_at_least_one() {
        let starfield = Starfield::new(StarfieldConfig::default());
        let mut rng = ParticleRng::new(77);
        for _ in 0..200 {
            let p = starfield.spawn(0, &mut rng, Bounds::new(50.0, 50.0));
            assert!((1.0..3.0).contains(&p.speed));
            assert!(p.size < 3.0);
        }
    }

    #[test]
    fn wraps_by_width_below_zero() {
        let starfield = Starfield::new(StarfieldConfig::default());
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(1);
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 50.0), &input, &mut rng);

        let mut star = Particle::new(Vec2::new(1.0, 10.0), Vec2::ZERO, 1.0, Color::WHITE).with_speed(2.5);
        starfield.advance(&mut star, &mut ctx);
        assert!((star.position.x - 98.5).abs() < 1e-4);
        starfield.advance(&mut star, &mut ctx);
        assert!((star.position.x - 96.0).abs() < 1e-4);
    }

    #[test]
    fn background_fills_every_tick() {
        let starfield = Starfield::new(StarfieldConfig::default());
        assert_eq!(starfield.clear_mode(), ClearMode::Fill(Color::BLACK));
    }
}
