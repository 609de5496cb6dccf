//! Per-kind particle rules and the registry mapping effect names to them

mod better_particles;
mod bouncing_balls;
mod bubbles;
mod confetti;
mod fireworks;
mod leaves;
mod matrix;
mod particle_system;
mod rain;
mod starfield;
mod underwater;
mod waves;

pub use better_particles::{BetterParticles, BetterParticlesConfig};
pub use bouncing_balls::{BouncingBalls, BouncingBallsConfig};
pub use bubbles::{Bubbles, BubblesConfig};
pub use confetti::{Confetti, ConfettiConfig};
pub use fireworks::{Fireworks, FireworksConfig};
pub use leaves::{Leaves, LeavesConfig};
pub use matrix::{Matrix, MatrixConfig};
pub use particle_system::{ParticleSystem, ParticleSystemConfig};
pub use rain::{Rain, RainConfig};
pub use starfield::{Starfield, StarfieldConfig};
pub use underwater::{Underwater, UnderwaterConfig};
pub use waves::{WaveShape, Waves, WavesConfig};

use crate::config::{OptionReader, Options};
use crate::particle::{Fate, Particle};
use crate::rand::ParticleRng;
use crate::simulation::{ClearMode, LoopSettings, StepContext};
use bgz_core::{BgzError, Bounds, Color, Result};
use bgz_runtime::Schedule;
use bgz_surface::Surface;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound on live particles for effects that do not set their own
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Ticks per second assumed by effects that run on a fixed interval
pub(crate) const TICK_RATE: f32 = 60.0;

/// The per-kind behaviour plugged into a `SimulationLoop`
pub trait Effect {
    /// Canonical (camelCase) effect name
    fn name(&self) -> &'static str;

    /// Particles seeded when the loop starts
    fn initial_count(&self) -> usize;

    /// Maximum number of live particles
    fn capacity(&self) -> usize {
        DEFAULT_CAPACITY
    }

    fn clear_mode(&self) -> ClearMode {
        ClearMode::Clear
    }

    fn schedule(&self) -> Schedule {
        Schedule::EveryFrame
    }

    /// Create particle number `index` of the initial set
    fn spawn(&self, index: usize, rng: &mut ParticleRng, bounds: Bounds) -> Particle;

    /// Replacement for a particle whose fate was `Recycle`
    fn respawn(&self, old: &Particle, rng: &mut ParticleRng, bounds: Bounds) -> Particle {
        let _ = old;
        self.spawn(0, rng, bounds)
    }

    /// Move one particle a single tick and decide what happens to it
    fn advance(&self, particle: &mut Particle, ctx: &mut StepContext<'_>) -> Fate;

    fn draw(&self, particle: &Particle, surface: &mut dyn Surface);

    /// Drawn after the clear and before any particle
    fn draw_backdrop(&self, _surface: &mut dyn Surface, _bounds: Bounds) {}

    /// Queue new particles once the live ones have been drawn
    fn emit(&mut self, _live: usize, _ctx: &mut StepContext<'_>) {}

    /// Forget emission state carried between ticks; called on every start
    fn reset(&mut self) {}

    /// Resolved options, for display
    fn settings(&self) -> Options;
}

/// Every effect the factory can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    ParticleSystem,
    Rain,
    Bubbles,
    Confetti,
    Starfield,
    Leaves,
    BouncingBalls,
    Fireworks,
    Underwater,
    BetterParticles,
    Matrix,
    Waves,
}

impl EffectKind {
    pub const ALL: [EffectKind; 12] = [
        EffectKind::ParticleSystem,
        EffectKind::Rain,
        EffectKind::Bubbles,
        EffectKind::Confetti,
        EffectKind::Starfield,
        EffectKind::Leaves,
        EffectKind::BouncingBalls,
        EffectKind::Fireworks,
        EffectKind::Underwater,
        EffectKind::BetterParticles,
        EffectKind::Matrix,
        EffectKind::Waves,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ParticleSystem => "particleSystem",
            Self::Rain => "rain",
            Self::Bubbles => "bubbles",
            Self::Confetti => "confetti",
            Self::Starfield => "starfield",
            Self::Leaves => "leaves",
            Self::BouncingBalls => "bouncingBalls",
            Self::Fireworks => "fireworks",
            Self::Underwater => "underwater",
            Self::BetterParticles => "betterParticles",
            Self::Matrix => "matrix",
            Self::Waves => "waves",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::ParticleSystem => "dots drifting and bouncing off the edges",
            Self::Rain => "falling streaks",
            Self::Bubbles => "bubbles rising from the bottom edge",
            Self::Confetti => "confetti bursting from the center, pushed away by the pointer",
            Self::Starfield => "stars scrolling left over a solid sky",
            Self::Leaves => "soft gradient leaves drifting down",
            Self::BouncingBalls => "balls falling under gravity and bouncing",
            Self::Fireworks => "rockets that burst into fading sparks on click",
            Self::Underwater => "fish swimming among rising bubbles",
            Self::BetterParticles => "particles attracted to the pointer",
            Self::Matrix => "columns of falling glyphs",
            Self::Waves => "layered sine waves",
        }
    }

    /// Validate `options` and build the effect together with its loop settings.
    /// Nothing outside the returned values is touched.
    pub fn configure(self, options: &Options) -> Result<(Box<dyn Effect>, LoopSettings)> {
        let mut reader = OptionReader::new(options);
        let effect: Box<dyn Effect> = match self {
            Self::ParticleSystem => Box::new(ParticleSystem::new(
                ParticleSystemConfig::from_options(&mut reader)?,
            )),
            Self::Rain => Box::new(Rain::new(RainConfig::from_options(&mut reader)?)),
            Self::Bubbles => Box::new(Bubbles::new(BubblesConfig::from_options(&mut reader)?)),
            Self::Confetti => Box::new(Confetti::new(ConfettiConfig::from_options(&mut reader)?)),
            Self::Starfield => {
                Box::new(Starfield::new(StarfieldConfig::from_options(&mut reader)?))
            }
            Self::Leaves => Box::new(Leaves::new(LeavesConfig::from_options(&mut reader)?)),
            Self::BouncingBalls => Box::new(BouncingBalls::new(
                BouncingBallsConfig::from_options(&mut reader)?,
            )),
            Self::Fireworks => {
                Box::new(Fireworks::new(FireworksConfig::from_options(&mut reader)?))
            }
            Self::Underwater => {
                Box::new(Underwater::new(UnderwaterConfig::from_options(&mut reader)?))
            }
            Self::BetterParticles => Box::new(BetterParticles::new(
                BetterParticlesConfig::from_options(&mut reader)?,
            )),
            Self::Matrix => Box::new(Matrix::new(MatrixConfig::from_options(&mut reader)?)),
            Self::Waves => Box::new(Waves::new(WavesConfig::from_options(&mut reader)?)),
        };
        let settings = loop_settings(&mut reader, effect.as_ref())?;
        reader.finish(self.name());
        Ok((effect, settings))
    }

    /// The effect's fully defaulted options
    pub fn describe(self) -> Result<Options> {
        let (effect, _) = self.configure(&Options::new())?;
        Ok(effect.settings())
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = BgzError;

    /// Accepts `bouncingBalls`, `bouncing_balls`, `bouncing-balls` and so on
    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|kind| normalize(kind.name()) == wanted)
            .ok_or_else(|| BgzError::UnknownEffect(s.to_string()))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Overrides shared by every effect: `clear_mode` + `clear_color`,
/// `schedule` + `interval` (milliseconds)
fn loop_settings(reader: &mut OptionReader<'_>, effect: &dyn Effect) -> Result<LoopSettings> {
    let default_mode = effect.clear_mode();
    let (mode_name, mode_color) = match default_mode {
        ClearMode::Clear => ("clear", Color::BLACK.with_alpha(0.2)),
        ClearMode::Fill(color) => ("fill", color),
        ClearMode::Fade(color) => ("fade", color),
    };
    let mode = reader.choice("clear_mode", &["clear", "fade", "fill"], mode_name)?;
    let color = reader.color("clear_color", mode_color)?;
    let clear_mode = match mode.as_str() {
        "fade" => ClearMode::Fade(color),
        "fill" => ClearMode::Fill(color),
        _ => ClearMode::Clear,
    };

    let default_schedule = effect.schedule();
    let (schedule_name, default_interval) = match default_schedule {
        Schedule::EveryFrame => ("frame", 1000.0 / TICK_RATE),
        Schedule::Interval(period) => ("interval", (period.as_secs_f64() * 1000.0) as f32),
    };
    let schedule = reader.choice("schedule", &["frame", "interval"], schedule_name)?;
    let interval = reader.positive("interval", default_interval)?;
    let schedule = match schedule.as_str() {
        "interval" => interval_ms(interval),
        _ => Schedule::EveryFrame,
    };

    Ok(LoopSettings {
        clear_mode,
        schedule,
    })
}

/// Interval schedule from a period in milliseconds, kept to microsecond precision
pub(crate) fn interval_ms(ms: f32) -> Schedule {
    Schedule::Interval(Duration::from_micros((ms as f64 * 1000.0).round() as u64))
}

/// Whole releases owed by a timer holding `elapsed` against a period of
/// `interval`, limited to `room`. Keeps only the remainder below one
/// period so the next tick starts from a bounded backlog.
pub(crate) fn due_releases(elapsed: &mut f32, interval: f32, room: usize) -> usize {
    if !elapsed.is_finite() {
        *elapsed = 0.0;
        return 0;
    }
    if *elapsed < interval {
        return 0;
    }
    let due = (*elapsed / interval).floor();
    *elapsed = elapsed.rem_euclid(interval);
    due.min(room as f32) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_options;

    #[test]
    fn due_releases_counts_whole_periods() {
        let mut elapsed = 1250.0;
        assert_eq!(due_releases(&mut elapsed, 500.0, 10), 2);
        assert_eq!(elapsed, 250.0);
        assert_eq!(due_releases(&mut elapsed, 500.0, 10), 0);
        assert_eq!(elapsed, 250.0);
    }

    #[test]
    fn due_releases_bounded_by_room_and_tiny_periods() {
        let mut elapsed = 16.7;
        let n = due_releases(&mut elapsed, 1e-7, 50);
        assert_eq!(n, 50);
        assert!(elapsed < 1e-7);

        let mut huge = 1.6e28;
        assert_eq!(due_releases(&mut huge, 1.0, 100), 100);
        assert!(huge < 1.0);

        let mut full = 3.0;
        assert_eq!(due_releases(&mut full, 1.0, 0), 0);
        assert!(full < 1.0);
    }

    #[test]
    fn names_parse_in_any_case_style() {
        assert_eq!("bouncingBalls".parse::<EffectKind>().unwrap(), EffectKind::BouncingBalls);
        assert_eq!("bouncing_balls".parse::<EffectKind>().unwrap(), EffectKind::BouncingBalls);
        assert_eq!("better-particles".parse::<EffectKind>().unwrap(), EffectKind::BetterParticles);
        assert_eq!("STARFIELD".parse::<EffectKind>().unwrap(), EffectKind::Starfield);
        assert!(matches!(
            "clouds".parse::<EffectKind>(),
            Err(BgzError::UnknownEffect(name)) if name == "clouds"
        ));
    }

    #[test]
    fn every_kind_builds_with_defaults() {
        for kind in EffectKind::ALL {
            let (effect, _) = kind.configure(&Options::new()).unwrap();
            assert_eq!(effect.name(), kind.name());
            assert!(!kind.describe().unwrap().is_empty(), "{kind} has no settings");
        }
    }

    #[test]
    fn clear_mode_override() {
        let options = parse_options(r##"clear_mode = "fill"
clear_color = "#102030""##)
        .unwrap();
        let (_, settings) = EffectKind::Rain.configure(&options).unwrap();
        assert_eq!(settings.clear_mode, ClearMode::Fill(Color::from_hex(0x102030)));

        let bad = parse_options(r#"clear_mode = "smear""#).unwrap();
        let err = EffectKind::Rain.configure(&bad).err().unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn schedule_override() {
        let options = parse_options("schedule = \"interval\"\ninterval = 100").unwrap();
        let (_, settings) = EffectKind::Leaves.configure(&options).unwrap();
        assert_eq!(settings.schedule, Schedule::Interval(Duration::from_millis(100)));

        let options = parse_options("schedule = \"frame\"").unwrap();
        let (_, settings) = EffectKind::Matrix.configure(&options).unwrap();
        assert_eq!(settings.schedule, Schedule::EveryFrame);
    }

    #[test]
    fn defaults_follow_the_effect() {
        let (_, settings) = EffectKind::Starfield.configure(&Options::new()).unwrap();
        assert_eq!(settings.clear_mode, ClearMode::Fill(Color::BLACK));
        let (_, settings) = EffectKind::Matrix.configure(&Options::new()).unwrap();
        assert_eq!(settings.schedule, Schedule::Interval(Duration::from_millis(50)));
    }
}
