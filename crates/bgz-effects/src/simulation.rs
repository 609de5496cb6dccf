//! The shared particle loop every effect runs on

use crate::effects::Effect;
use crate::particle::{Fate, Particle, ParticlePool};
use crate::rand::ParticleRng;
use bgz_core::{BgzError, Bounds, Color, LoopId, Result};
use bgz_runtime::{FrameInput, Schedule};
use bgz_surface::SurfaceRef;

/// What happens to the surface at the start of every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearMode {
    /// Reset to transparent
    Clear,
    /// Paint an opaque background
    Fill(Color),
    /// Composite a translucent color so previous frames leave trails
    Fade(Color),
}

/// Loop-level settings: an effect's defaults, possibly overridden by options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub clear_mode: ClearMode,
    pub schedule: Schedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Everything an update rule may read or produce during one tick
pub struct StepContext<'a> {
    /// Seconds covered by this tick
    pub dt: f32,
    pub bounds: Bounds,
    pub input: &'a FrameInput,
    pub rng: &'a mut ParticleRng,
    spawned: Vec<Particle>,
}

impl<'a> StepContext<'a> {
    pub fn new(dt: f32, bounds: Bounds, input: &'a FrameInput, rng: &'a mut ParticleRng) -> Self {
        Self {
            dt,
            bounds,
            input,
            rng,
            spawned: Vec::new(),
        }
    }

    /// Queue a new particle; it joins the loop after the current pass
    pub fn spawn(&mut self, particle: Particle) {
        self.spawned.push(particle);
    }

    pub fn take_spawned(&mut self) -> Vec<Particle> {
        std::mem::take(&mut self.spawned)
    }
}

/// Owns one effect's particles and drives them tick by tick.
///
/// Particles never interact, so the in-order update within a tick has no
/// effect on the result.
pub struct SimulationLoop {
    id: LoopId,
    effect: Box<dyn Effect>,
    settings: LoopSettings,
    pool: ParticlePool,
    rng: ParticleRng,
    state: LoopState,
    surface: Option<SurfaceRef>,
    ticks: u64,
}

impl SimulationLoop {
    pub fn new(effect: Box<dyn Effect>, settings: LoopSettings, seed: u32) -> Self {
        let capacity = effect.capacity().max(effect.initial_count());
        Self {
            id: LoopId::new(),
            effect,
            settings,
            pool: ParticlePool::new(capacity),
            rng: ParticleRng::new(seed),
            state: LoopState::Idle,
            surface: None,
            ticks: 0,
        }
    }

    pub fn id(&self) -> LoopId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.effect.name()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn settings(&self) -> LoopSettings {
        self.settings
    }

    pub fn particles(&self) -> &[Particle] {
        self.pool.as_slice()
    }

    /// Ticks run since the last start
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn holds_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Seed the initial particles and begin accepting ticks.
    /// Valid from `Idle` and `Stopped`; a running loop is rejected.
    pub fn start(&mut self, surface: SurfaceRef) -> Result<()> {
        if self.state == LoopState::Running {
            return Err(BgzError::AlreadyRunning(self.id.raw()));
        }
        let bounds = surface
            .try_borrow()
            .map(|s| s.size())
            .map_err(|_| self.busy())?;

        self.pool.clear();
        self.effect.reset();
        for index in 0..self.effect.initial_count() {
            let particle = self.effect.spawn(index, &mut self.rng, bounds);
            self.pool.spawn(particle);
        }

        self.surface = Some(surface);
        self.state = LoopState::Running;
        self.ticks = 0;
        tracing::info!(
            id = %self.id,
            effect = self.effect.name(),
            particles = self.pool.len(),
            "effect started"
        );
        Ok(())
    }

    /// Stop ticking and release the surface. Returns false if the loop was
    /// not running; calling it again is harmless.
    pub fn stop(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.state = LoopState::Stopped;
        self.surface = None;
        tracing::info!(id = %self.id, effect = self.effect.name(), ticks = self.ticks, "effect stopped");
        true
    }

    /// One simulation/draw step. Does nothing unless running.
    pub fn tick(&mut self, dt: f32, input: &FrameInput) -> Result<()> {
        if self.state != LoopState::Running {
            return Ok(());
        }
        let Some(shared) = self.surface.as_ref() else {
            return Ok(());
        };
        let mut surface = shared.try_borrow_mut().map_err(|_| self.busy())?;
        let bounds = surface.size();

        // 1. clear or fade
        match self.settings.clear_mode {
            ClearMode::Clear => surface.clear(),
            ClearMode::Fill(color) | ClearMode::Fade(color) => surface.fill(color),
        }
        self.effect.draw_backdrop(&mut *surface, bounds);

        // 2. advance, recycling or expiring per fate
        let mut ctx = StepContext::new(dt, bounds, input, &mut self.rng);
        let effect = &*self.effect;
        self.pool.retain_mut(|p| match effect.advance(p, &mut ctx) {
            Fate::Retain => true,
            Fate::Recycle => {
                *p = effect.respawn(p, ctx.rng, bounds);
                true
            }
            Fate::Expire => false,
        });
        let mut dropped = 0;
        for child in ctx.take_spawned() {
            dropped += usize::from(!self.pool.spawn(child));
        }

        // 3. draw
        for p in self.pool.as_slice() {
            self.effect.draw(p, &mut *surface);
        }

        // 4. emit new particles for the next tick
        self.effect.emit(self.pool.len(), &mut ctx);
        for child in ctx.take_spawned() {
            dropped += usize::from(!self.pool.spawn(child));
        }
        if dropped > 0 {
            tracing::trace!(id = %self.id, dropped, "particle pool full");
        }

        self.ticks += 1;
        Ok(())
    }

    fn busy(&self) -> BgzError {
        BgzError::SurfaceError(format!("surface of effect loop {} is borrowed elsewhere", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::particle::Extra;
    use bgz_core::Vec2;
    use bgz_surface::{DrawCommand, Paint, RecordingSurface, Surface};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Moves right one pixel per tick; recycles past the right edge,
    /// expires particles tagged as rockets, spawns one child per click
    struct Drifter {
        count: usize,
    }

    impl Effect for Drifter {
        fn name(&self) -> &'static str {
            "drifter"
        }

        fn initial_count(&self) -> usize {
            self.count
        }

        fn spawn(&self, index: usize, _rng: &mut ParticleRng, _bounds: Bounds) -> Particle {
            Particle::new(Vec2::new(index as f32, 0.0), Vec2::new(1.0, 0.0), 1.0, Color::WHITE)
        }

        fn advance(&self, particle: &mut Particle, ctx: &mut StepContext<'_>) -> Fate {
            if particle.extra == Extra::Rocket {
                return Fate::Expire;
            }
            particle.position += particle.velocity;
            if particle.position.x > ctx.bounds.width {
                Fate::Recycle
            } else {
                Fate::Retain
            }
        }

        fn draw(&self, particle: &Particle, surface: &mut dyn Surface) {
            surface.fill_circle(particle.position, particle.size, &Paint::Solid(particle.color));
        }

        fn emit(&mut self, _live: usize, ctx: &mut StepContext<'_>) {
            let clicks = ctx.input.clicks.clone();
            for click in clicks {
                ctx.spawn(
                    Particle::new(click, Vec2::ZERO, 1.0, Color::WHITE).with_extra(Extra::Rocket),
                );
            }
        }

        fn settings(&self) -> Options {
            Options::new()
        }
    }

    fn settings(clear_mode: ClearMode) -> LoopSettings {
        LoopSettings {
            clear_mode,
            schedule: Schedule::EveryFrame,
        }
    }

    fn surface(width: u32) -> (Rc<RefCell<RecordingSurface>>, SurfaceRef) {
        let typed = Rc::new(RefCell::new(RecordingSurface::new(width, 10)));
        let shared: SurfaceRef = typed.clone();
        (typed, shared)
    }

    #[test]
    fn start_seeds_initial_count() {
        let (_, shared) = surface(100);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 7 }), settings(ClearMode::Clear), 1);
        assert_eq!(sim.state(), LoopState::Idle);
        sim.start(shared).unwrap();
        assert_eq!(sim.state(), LoopState::Running);
        assert_eq!(sim.particles().len(), 7);
    }

    #[test]
    fn double_start_rejected() {
        let (_, shared) = surface(100);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 1 }), settings(ClearMode::Clear), 1);
        sim.start(shared.clone()).unwrap();
        assert!(matches!(sim.start(shared), Err(BgzError::AlreadyRunning(_))));
    }

    #[test]
    fn tick_clears_advances_then_draws() {
        let (typed, shared) = surface(100);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 2 }), settings(ClearMode::Clear), 1);
        sim.start(shared).unwrap();
        sim.tick(1.0 / 60.0, &FrameInput::default()).unwrap();

        let commands = typed.borrow_mut().take_commands();
        assert_eq!(commands[0], DrawCommand::Clear);
        assert_eq!(commands.len(), 3);
        assert_eq!(sim.particles()[0].position, Vec2::new(1.0, 0.0));
        assert_eq!(sim.particles()[1].position, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn fade_mode_fills_translucent() {
        let (typed, shared) = surface(100);
        let fade = Color::BLACK.with_alpha(0.2);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 0 }), settings(ClearMode::Fade(fade)), 1);
        sim.start(shared).unwrap();
        sim.tick(0.016, &FrameInput::default()).unwrap();
        assert_eq!(typed.borrow().commands()[0], DrawCommand::Fill(fade));
    }

    #[test]
    fn recycle_keeps_count() {
        let (_, shared) = surface(3);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 3 }), settings(ClearMode::Clear), 1);
        sim.start(shared).unwrap();
        for _ in 0..10 {
            sim.tick(0.016, &FrameInput::default()).unwrap();
            assert_eq!(sim.particles().len(), 3);
        }
    }

    #[test]
    fn emitted_particles_join_and_expire() {
        let (_, shared) = surface(100);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 0 }), settings(ClearMode::Clear), 1);
        sim.start(shared).unwrap();

        let click = FrameInput {
            pointer: None,
            clicks: vec![Vec2::new(5.0, 5.0), Vec2::new(6.0, 6.0)],
        };
        sim.tick(0.016, &click).unwrap();
        assert_eq!(sim.particles().len(), 2);
        sim.tick(0.016, &FrameInput::default()).unwrap();
        assert!(sim.particles().is_empty());
    }

    #[test]
    fn stop_releases_surface_and_halts() {
        let (typed, shared) = surface(100);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 1 }), settings(ClearMode::Clear), 1);
        sim.start(shared).unwrap();
        assert_eq!(Rc::strong_count(&typed), 2);

        assert!(sim.stop());
        assert!(!sim.stop());
        assert!(!sim.holds_surface());
        assert_eq!(Rc::strong_count(&typed), 1);

        let before = sim.particles()[0];
        sim.tick(0.016, &FrameInput::default()).unwrap();
        assert_eq!(sim.particles()[0], before);
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn restart_reseeds() {
        let (_, shared) = surface(100);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 2 }), settings(ClearMode::Clear), 1);
        sim.start(shared.clone()).unwrap();
        sim.tick(0.016, &FrameInput::default()).unwrap();
        sim.stop();

        sim.start(shared).unwrap();
        assert_eq!(sim.state(), LoopState::Running);
        assert_eq!(sim.particles()[0].position, Vec2::ZERO);
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn busy_surface_is_an_error() {
        let (typed, shared) = surface(100);
        let mut sim = SimulationLoop::new(Box::new(Drifter { count: 1 }), settings(ClearMode::Clear), 1);
        sim.start(shared).unwrap();
        let _guard = typed.borrow_mut();
        assert!(matches!(
            sim.tick(0.016, &FrameInput::default()),
            Err(BgzError::SurfaceError(_))
        ));
    }
}
