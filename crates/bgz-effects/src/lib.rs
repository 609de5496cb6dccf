//! bgz Effects - Particle effects on a shared simulation loop
//!
//! Every effect is one set of particle rules run by the same loop:
//! - Options validated up front into typed per-effect configs
//! - Seeded initial particles, then advance/draw/emit once per tick
//! - Wrap, bounce, respawn and lifespan edge policies
//! - A factory that resolves the target canvas and schedules the loop,
//!   returning a handle that can stop and restart it

pub mod config;
pub mod effects;
pub mod factory;
pub mod particle;
pub mod policy;
pub mod rand;
pub mod simulation;

pub use config::{parse_options, OptionReader, Options, ValueRange};
pub use effects::{Effect, EffectKind};
pub use factory::{EffectFactory, LoopHandle, DEFAULT_SEED};
pub use particle::{Extra, Fate, Particle, ParticlePool};
pub use simulation::{ClearMode, LoopSettings, LoopState, SimulationLoop, StepContext};
