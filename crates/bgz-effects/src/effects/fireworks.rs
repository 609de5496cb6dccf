//! Rockets launched from the bottom edge that burst into falling sparks
//!
//! A rocket climbs until it reaches mid-height, bursts exactly once and is
//! removed; its sparks fall under gravity and expire after `lifespan` ticks.

use super::{due_releases, Effect};
use crate::config::{to_table, OptionReader, Options};
use crate::particle::{Extra, Fate, Particle};
use crate::policy::tick_lifespan;
use crate::rand::ParticleRng;
use crate::simulation::{ClearMode, StepContext};
use bgz_core::{Bounds, Color, Result, Vec2};
use bgz_surface::{Paint, Surface};
use serde::Serialize;

const ROCKET_RADIUS: f32 = 4.0;
const SPARK_RADIUS: f32 = 2.0;
/// Sparks start within this distance of the burst point
const BURST_RADIUS: f32 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireworksConfig {
    /// Sparks per burst
    pub count: usize,
    /// Rocket climb per tick
    pub speed: f32,
    pub gravity: f32,
    /// Divides a spark's offset from the burst point to give its velocity
    pub burst_speed: f32,
    pub colors: Vec<Color>,
    /// Spark lifetime in ticks
    pub lifespan: usize,
    /// Milliseconds between automatic launches; 0 launches on click only
    pub auto_launch: f32,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            count: 15,
            speed: 4.0,
            gravity: 0.1,
            burst_speed: 4.0,
            colors: vec![
                Color::from_hex(0xff4b4b),
                Color::from_hex(0x4be0c8),
                Color::from_hex(0xfac45e),
            ],
            lifespan: 50,
            auto_launch: 0.0,
        }
    }
}

impl FireworksConfig {
    pub fn from_options(reader: &mut OptionReader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            count: reader.count("count", d.count)?,
            speed: reader.positive("speed", d.speed)?,
            gravity: reader.number("gravity", d.gravity)?,
            burst_speed: reader.positive("burst_speed", d.burst_speed)?,
            colors: reader.colors("colors", &d.colors)?,
            lifespan: reader.count("lifespan", d.lifespan)?,
            auto_launch: reader.non_negative("auto_launch", d.auto_launch)?,
        })
    }
}

pub struct Fireworks {
    config: FireworksConfig,
    /// Milliseconds since the last automatic launch
    since_launch: f32,
}

impl Fireworks {
    pub fn new(config: FireworksConfig) -> Self {
        Self {
            config,
            since_launch: 0.0,
        }
    }

    fn color(&self, rng: &mut ParticleRng) -> Color {
        rng.pick(&self.config.colors).copied().unwrap_or(Color::WHITE)
    }

    /// A rocket rising from the bottom edge below `x`
    pub fn rocket(&self, x: f32, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        Particle::new(
            Vec2::new(x, bounds.height),
            Vec2::new(0.0, -self.config.speed),
            ROCKET_RADIUS,
            self.color(rng),
        )
        .with_extra(Extra::Rocket)
    }

    fn burst(&self, origin: Vec2, ctx: &mut StepContext<'_>) {
        let lifespan = u32::try_from(self.config.lifespan).unwrap_or(u32::MAX);
        for _ in 0..self.config.count {
            let offset = Vec2::from_angle(ctx.rng.angle()) * (ctx.rng.next_f32() * BURST_RADIUS);
            let color = self.color(ctx.rng);
            let spark = Particle::new(
                origin + offset,
                offset * (1.0 / self.config.burst_speed),
                SPARK_RADIUS,
                color,
            )
            .with_lifespan(lifespan);
            ctx.spawn(spark);
        }
    }
}

impl Effect for Fireworks {
    fn name(&self) -> &'static str {
        "fireworks"
    }

    fn initial_count(&self) -> usize {
        0
    }

    fn clear_mode(&self) -> ClearMode {
        ClearMode::Fade(Color::BLACK.with_alpha(0.2))
    }

    fn spawn(&self, _index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let x = rng.next_f32() * bounds.width;
        self.rocket(x, rng, bounds)
    }

    fn advance(&self, p: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
        p.position += p.velocity;
        if p.extra == Extra::Rocket {
            if p.position.y <= ctx.bounds.height / 2.0 {
                self.burst(p.position, ctx);
                return Fate::Expire;
            }
            return Fate::Retain;
        }

        p.velocity.y += self.config.gravity;
        if tick_lifespan(p) {
            Fate::Expire
        } else {
            Fate::Retain
        }
    }

    fn draw(&self, p: &Particle, surface: &mut dyn Surface) {
        surface.fill_circle(p.position, p.size, &Paint::Solid(p.color));
    }

    /// One rocket per click this tick, plus timed launches when enabled
    fn emit(&mut self, live: usize, ctx: &mut StepContext<'_>) {
        let input = ctx.input;
        for click in &input.clicks {
            let rocket = self.rocket(click.x, ctx.rng, ctx.bounds);
            ctx.spawn(rocket);
        }

        if self.config.auto_launch > 0.0 {
            self.since_launch += ctx.dt * 1000.0;
            let room = self.capacity().saturating_sub(live + input.clicks.len());
            for _ in 0..due_releases(&mut self.since_launch, self.config.auto_launch, room) {
                let rocket = self.spawn(0, ctx.rng, ctx.bounds);
                ctx.spawn(rocket);
            }
        }
    }

    fn reset(&mut self) {
        self.since_launch = 0.0;
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

    fn fireworks(text: &str) -> Fireworks {
        let table = parse_options(text).unwrap();
        Fireworks::new(FireworksConfig::from_options(&mut OptionReader::new(&table)).unwrap())
    }

    #[test]
    fn click_launches_rocket_from_bottom() {
        let mut fw = fireworks("");
        let input = FrameInput {
            pointer: None,
            clicks: vec![Vec2::new(30.0, 10.0)],
        };
        let mut rng = ParticleRng::new(6);
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 200.0), &input, &mut rng);
        fw.emit(0, &mut ctx);
        let spawned = ctx.take_spawned();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].position, Vec2::new(30.0, 200.0));
        assert_eq!(spawned[0].extra, Extra::Rocket);
    }

    #[test]
    fn rocket_bursts_once_at_mid_height() {
        let fw = fireworks("count = 12");
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(6);
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 200.0), &input, &mut rng);

        let mut rocket = fw.rocket(50.0, ctx.rng, Bounds::new(100.0, 200.0));
        rocket.position.y = 106.0;
        assert_eq!(fw.advance(&mut rocket, &mut ctx), Fate::Retain);
        assert!(ctx.take_spawned().is_empty());
        assert_eq!(fw.advance(&mut rocket, &mut ctx), Fate::Expire);

        let sparks = ctx.take_spawned();
        assert_eq!(sparks.len(), 12);
        for spark in &sparks {
            assert!(spark.position.distance(rocket.position) <= BURST_RADIUS);
            assert_eq!(spark.lifespan, Some(50));
            assert_eq!(spark.extra, Extra::None);
        }
    }

    #[test]
    fn sparks_expire_after_lifespan_ticks() {
        let fw = fireworks("lifespan = 3\ngravity = 0.5");
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(6);
        let mut ctx = StepContext::new(0.016, Bounds::new(100.0, 200.0), &input, &mut rng);

        let mut spark = Particle::new(Vec2::new(10.0, 10.0), Vec2::ZERO, 2.0, Color::WHITE).with_lifespan(3);
        assert_eq!(fw.advance(&mut spark, &mut ctx), Fate::Retain);
        assert_eq!(fw.advance(&mut spark, &mut ctx), Fate::Retain);
        assert_eq!(fw.advance(&mut spark, &mut ctx), Fate::Expire);
        assert!((spark.velocity.y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn auto_launch_on_timer() {
        let mut fw = fireworks("auto_launch = 500");
        let input = FrameInput::default();
        let mut rng = ParticleRng::new(6);
        let mut launched = 0;
        for _ in 0..10 {
            let mut ctx = StepContext::new(0.25, Bounds::new(100.0, 200.0), &input, &mut rng);
            fw.emit(0, &mut ctx);
            launched += ctx.take_spawned().len();
        }
        assert_eq!(launched, 5);

        fw.reset();
        let mut ctx = StepContext::new(0.25, Bounds::new(100.0, 200.0), &input, &mut rng);
        fw.emit(0, &mut ctx);
        assert!(ctx.take_spawned().is_empty());
    }

    #[test]
    fn zero_speed_rejected() {
        let table = parse_options("speed = 0").unwrap();
        assert!(FireworksConfig::from_options(&mut OptionReader::new(&table)).is_err());
    }
}
