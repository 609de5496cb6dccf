//! Confetti thrown out from the center and pushed away by the pointer

use super::Effect;
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Fate, Particle};
use crate::rand::ParticleRng;
use crate::simulation::StepContext;
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_surface::{Paint, Surface};
use serde::Serialize;

/// Pieces this far outside the canvas are replaced
const EXIT_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfettiConfig {
    pub colors: Vec<Color>,
    pub count: usize,
    /// Base speed in pixels per tick; each piece varies by up to 5 either way
    pub speed: f32,
    pub repel_radius: f32,
    /// Push per tick while inside the repel radius
    pub repel_force: f32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            colors: vec![
                Color::from_hex(0xe67e22),
                Color::from_hex(0x16a085),
                Color::from_hex(0x2e86c1),
                Color::from_hex(0x8e44ad),
            ],
            count: 50,
            speed: 4.0,
            repel_radius: 50.0,
            repel_force: 5.0,
        }
    }
}

impl ConfettiConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            colors: reader.colors("colors", &d.colors)?,
            count: reader.count("count", d.count)?,
            speed: reader.number("speed", d.speed)?,
            repel_radius: reader.non_negative("repel_radius", d.repel_radius)?,
            repel_force: reader.number("repel_force", d.repel_force)?,
        })
    }
}

pub struct Confetti {
    config: ConfettiConfig,
}

impl Confetti {
    pub fn new(config: ConfettiConfig) -> Self {
        Self { config }
    }
}

impl Effect for Confetti {
    fn name(&self) -> &'static str {
        "confetti"
    }

    fn initial_count(&self) -> usize {
        self.config.count
    }

    /// `angle` is the heading in degrees
    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let size = rng.range(10.0, 20.0);
        let angle = rng.range(0.0, 360.0);
        let speed = self.config.speed + rng.signed(5.0);
        let color = rng.pick(&self.config.colors).copied().unwrap_or(Color::WHITE);
        Particle::new(bounds.center(), Vec2::ZERO, size, color)
            .with_angle(angle)
            .with_speed(speed)
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.position += Vec2::from_angle(p.angle.to_radians()) * p.speed;
        p.angle += ctx.rng.signed(2.0);

        if let Some(pointer) = ctx.input.pointer {
            let away = p.position - pointer;
            if away.length() < self.config.repel_radius {
                let push = Vec2::from_angle(away.y.atan2(away.x));
                p.position += push * self.config.repel_force;
            }
        }

        if ctx.bounds.contains_with_margin(p.position, EXIT_MARGIN) {
            Fate::Retain
        } else {
            Fate::Recycle
        }
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        surface.fill_circle(p.position, p.size, &Paint::Solid(p.color));
    }

    /// Tops the set back up if it ever falls below `count`
    fn emit(&mut self, live: usize, ctx: &mut StepContext<'_>) {
        for _ in live..self.config.count {
            let piece = self.spawn(0, ctx.rng, ctx.bounds);
            ctx.spawn(piece);
        }
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

    fn still_piece(at: Vec2) -> Particle {
        Particle::new(at, Vec2::ZERO, 10.0, Color::WHITE)
    }

    #[test]
    fn pointer_pushes_nearby_pieces_away() {
        let confetti = Confetti::new(ConfettiConfig::default());
        let input = FrameInput::with_pointer(50.0, 50.0);
        let mut rng = ParticleRng::new(2);
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 100.0), &input, &mut rng);

        let mut near = still_piece(Vec2::new(60.0, 50.0));
        confetti.advance(&mut near, &mut ctx);
        assert!((near.position.x - 65.0).abs() < 1e-4);

        let mut far = still_piece(Vec2::new(10.0, 10.0));
        confetti.advance(&mut far, &mut ctx);
        assert_eq!(far.position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn recycled_past_margin() {
        let confetti = Confetti::new(ConfettiConfig::default());
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(2);
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 100.0), &input, &mut rng);
        let mut p = still_piece(Vec2::new(151.0, 50.0));
        assert_eq!(confetti.advance(&mut p, &mut ctx), Fate::Recycle);
        let mut p = still_piece(Vec2::new(149.0, 50.0));
        assert_eq!(confetti.advance(&mut p, &mut ctx), Fate::Retain);
    }

    #[test]
    fn spawns_at_center_with_palette_color() {
        let table = parse_options(r##"colors = ["#ff0000"]"##).unwrap();
        let confetti = Confetti::new(ConfettiConfig::from_options(&mut OptionReader::new(&table)).unwrap());
        let mut rng = ParticleRng::new(8);
        let p = confetti.spawn(0, &mut rng, Bounds::new(200.0, 100.0));
        assert_eq!(p.position, Vec2::new(100.0, 50.0));
        assert_eq!(p.color, Color::from_hex(0xff0000));
        assert!((-1.0..9.0).contains(&p.speed));
    }

    #[test]
    fn empty_palette_rejected() {
        let table = parse_options("colors = []").unwrap();
        assert!(ConfettiConfig::from_options(&mut OptionReader::new(&table)).is_err());
    }

    #[test]
    fn emit_replenishes_to_count() {
        let table = parse_options("count = 4").unwrap();
        let mut confetti = Confetti::new(ConfettiConfig::from_options(&mut OptionReader::new(&table)).unwrap());
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(2);
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 100.0), &input, &mut rng);
        confetti.emit(1, &mut ctx);
        assert_eq!(ctx.take_spawned().len(), 3);
        confetti.emit(4, &mut ctx);
        assert!(ctx.take_spawned().is_empty());
    }
}
