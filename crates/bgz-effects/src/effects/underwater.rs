//! Fish swimming in straight lines among rising bubbles

use super::Effect;
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Extra, Fate, Particle};
use crate::policy::wrap;
use crate::rand::ParticleRng;
use crate::simulation::{ClearMode, StepContext};
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_surface::{Paint, Surface};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnderwaterConfig {
    /// Number of fish
    pub count: usize,
    /// Fish swim between 1 and `1 + speed` pixels per tick
    pub speed: f32,
    pub bubble_count: usize,
    pub bubble_speed: f32,
    pub bubble_size: f32,
    pub colors: Vec<Color>,
    pub background_color: Color,
}

impl Default for UnderwaterConfig {
    fn default() -> Self {
        Self {
            count: 15,
            speed: 1.0,
            bubble_count: 30,
            bubble_speed: 1.0,
            bubble_size: 5.0,
            colors: vec![
                Color::from_hex(0x4ecdc4),
                Color::from_hex(0xc7f464),
                Color::from_hex(0xff6b6b),
                Color::from_hex(0xffa861),
            ],
            background_color: Color::from_hex(0x0d5fdd),
        }
    }
}

impl UnderwaterConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            count: reader.count("count", d.count)?,
            speed: reader.non_negative("speed", d.speed)?,
            bubble_count: reader.count("bubble_count", d.bubble_count)?,
            bubble_speed: reader.non_negative("bubble_speed", d.bubble_speed)?,
            bubble_size: reader.non_negative("bubble_size", d.bubble_size)?,
            colors: reader.colors("colors", &d.colors)?,
            background_color: reader.color("background_color", d.background_color)?,
        })
    }
}

pub struct Underwater {
    config: UnderwaterConfig,
}

impl Underwater {
    pub fn new(config: UnderwaterConfig) -> Self {
        Self { config }
    }

    fn fish(&self, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let position = rng.point_in(bounds.width, bounds.height);
        let color = rng.pick(&self.config.colors).copied().unwrap_or(Color::WHITE);
        let size = rng.range(20.0, 50.0);
        let speed = rng.next_f32() * self.config.speed + 1.0;
        let angle = rng.angle();
        let tail = [rng.range(10.0, 30.0), rng.range(10.0, 30.0), rng.range(10.0, 30.0)];
        Particle::new(position, Vec2::from_angle(angle) * speed, size, color)
            .with_angle(angle)
            .with_speed(speed)
            .with_extra(Extra::Tail(tail))
    }

    /// A bubble just below the bottom edge
    fn bubble(&self, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let x = rng.next_f32() * bounds.width;
        let size = rng.next_f32() * self.config.bubble_size + 2.0;
        let speed = rng.next_f32() * self.config.bubble_speed + 1.0;
        Particle::new(
            Vec2::new(x, bounds.height + self.config.bubble_size),
            Vec2::new(0.0, -speed),
            size,
            Color::WHITE.with_alpha(0.5),
        )
        .with_speed(speed)
        .with_extra(Extra::Bubble)
    }
}

/// `local` rotated by `angle` and moved to `origin`
fn place(origin: Vec2, angle: f32, local: Vec2) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    origin + Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos)
}

impl Effect for Underwater {
    fn name(&self) -> &'static str {
        "underwater"
    }

    fn initial_count(&self) -> usize {
        self.config.count + self.config.bubble_count
    }

    fn clear_mode(&self) -> ClearMode {
        ClearMode::Fill(self.config.background_color)
    }

    /// Fish first, then bubbles scattered over the full height
    fn spawn(&self, index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        if index < self.config.count {
            return self.fish(rng, bounds);
        }
        let mut bubble = self.bubble(rng, bounds);
        bubble.position.y = rng.next_f32() * bounds.height;
        bubble
    }

    fn respawn(&self, old: &Particle, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        match old.extra {
            Extra::Bubble => self.bubble(rng, bounds),
            _ => self.fish(rng, bounds),
        }
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.position += p.velocity;
        match p.extra {
            Extra::Bubble if p.position.y < -p.size => Fate::Recycle,
            Extra::Bubble => Fate::Retain,
            _ => {
                let margin = p.size;
                p.position.x = wrap(p.position.x, -margin, ctx.bounds.width + margin);
                p.position.y = wrap(p.position.y, -margin, ctx.bounds.height + margin);
                Fate::Retain
            }
        }
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        let Extra::Tail(tail) = p.extra else {
            surface.fill_circle(p.position, p.size, &Paint::Solid(p.color));
            return;
        };
        let at = |x: f32, y: f32| place(p.position, p.angle, Vec2::new(x, y));
        let body = [
            at(0.0, 0.0),
            at(p.size, -p.size / 2.0),
            at(p.size, p.size / 2.0),
        ];
        surface.fill_polygon(&body, p.color);
        for (i, fin) in tail.iter().enumerate() {
            let y = i as f32 * 10.0;
            let shape = [at(0.0, 0.0), at(-fin, y - 10.0), at(-fin, y)];
            surface.fill_polygon(&shape, p.color);
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
    use bgz_surface::{DrawCommand, RecordingSurface};

    fn underwater(text: &str) -> Underwater {
        let table = parse_options(text).unwrap();
        Underwater::new(UnderwaterConfig::from_options(&mut OptionReader::new(&table)).unwrap())
    }

    #[test]
    fn initial_set_is_fish_then_bubbles() {
        let scene = underwater("count = 2\nbubble_count = 3");
        let mut rng = ParticleRng::new(12);
        let bounds = Bounds::new(300.0, 200.0);
        let kinds: Vec<bool> = (0..scene.initial_count())
            .map(|i| matches!(scene.spawn(i, &mut rng, bounds).extra, Extra::Tail(_)))
            .collect();
        assert_eq!(kinds, vec![true, true, false, false, false]);
    }

    #[test]
    fn fish_wrap_around_with_margin() {
        let scene = underwater("");
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(1);
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 100.0), &input, &mut rng);

        let mut fish = Particle::new(Vec2::new(-19.0, 50.0), Vec2::new(-2.0, 0.0), 20.0, Color::WHITE)
            .with_extra(Extra::Tail([10.0; 3]));
        assert_eq!(scene.advance(&mut fish, &mut ctx), Fate::Retain);
        assert!((fish.position.x - 119.0).abs() < 1e-4);
    }

    #[test]
    fn bubbles_recycle_as_bubbles() {
        let scene = underwater("");
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(1);
        let bounds = Bounds::new(100.0, 100.0);
        let mut ctx = StepContext::new(0.016, bounds, &input, &mut rng);

        let mut bubble = Particle::new(Vec2::new(5.0, -3.0), Vec2::new(0.0, -2.0), 4.0, Color::WHITE)
            .with_extra(Extra::Bubble);
        assert_eq!(scene.advance(&mut bubble, &mut ctx), Fate::Recycle);
        let fresh = scene.respawn(&bubble, ctx.rng, bounds);
        assert_eq!(fresh.extra, Extra::Bubble);
        assert_eq!(fresh.position.y, 105.0);
    }

    #[test]
    fn fish_drawn_as_body_and_three_fins() {
        let scene = underwater("");
        let mut rng = ParticleRng::new(3);
        let fish = scene.spawn(0, &mut rng, Bounds::new(100.0, 100.0));
        let mut surface = RecordingSurface::new(100, 100);
        scene.draw(&fish, &mut surface);
        let polygons = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .count();
        assert_eq!(polygons, 4);
    }
}
