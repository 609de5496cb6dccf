//! Effect factory and the handle controlling a started effect

use crate::config::Options;
use crate::effects::EffectKind;
use crate::particle::Particle;
use crate::simulation::{LoopState, SimulationLoop};
use bgz_core::{BgzError, LoopId, Result};
use bgz_runtime::{FrameInfo, FrameTask, Scheduler, TaskId};
use bgz_surface::{Element, ElementLookup, Surface};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Seed used when none is configured, so runs are reproducible
pub const DEFAULT_SEED: u32 = 0xDEAD_BEEF;

/// Builds effects on elements resolved through `L` and schedules them
pub struct EffectFactory<L: ElementLookup> {
    lookup: L,
    scheduler: Scheduler,
    seed: u32,
    created: u32,
}

impl<L: ElementLookup> EffectFactory<L> {
    pub fn new(lookup: L, scheduler: Scheduler) -> Self {
        Self {
            lookup,
            scheduler,
            seed: DEFAULT_SEED,
            created: 0,
        }
    }

    /// Base seed; every created effect gets its own seed derived from it
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn lookup_mut(&mut self) -> &mut L {
        &mut self.lookup
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Start effect `kind` (any case style) on the canvas matching `selector`.
    ///
    /// Checks run in order: effect name, options, element lookup, element
    /// kind. Nothing is scheduled unless every check passes.
    pub fn create_effect(&mut self, kind: &str, selector: &str, options: &Options) -> Result<LoopHandle> {
        let kind: EffectKind = kind.parse()?;
        self.create(kind, selector, options)
    }

    pub fn create(&mut self, kind: EffectKind, selector: &str, options: &Options) -> Result<LoopHandle> {
        let (effect, settings) = kind.configure(options)?;

        let element = self
            .lookup
            .query_selector(selector)
            .ok_or_else(|| BgzError::TargetNotFound(selector.to_string()))?;
        let surface = match element {
            Element::Canvas(surface) => surface,
            other => {
                return Err(BgzError::WrongElementKind {
                    selector: selector.to_string(),
                    expected: "canvas".to_string(),
                    found: other.tag().to_string(),
                })
            }
        };

        let mut sim = SimulationLoop::new(effect, settings, self.next_seed());
        let weak = Rc::downgrade(&surface);
        sim.start(surface)?;

        let handle = LoopHandle {
            id: sim.id(),
            sim: Rc::new(RefCell::new(sim)),
            scheduler: self.scheduler.clone(),
            task: Rc::new(Cell::new(None)),
            surface: weak,
        };
        handle.register();
        tracing::info!(id = %handle.id, effect = kind.name(), selector, "effect created");
        Ok(handle)
    }

    fn next_seed(&mut self) -> u32 {
        self.created = self.created.wrapping_add(1);
        self.seed ^ self.created.wrapping_mul(0x9E37_79B9)
    }
}

/// Frame task ticking one simulation loop
struct LoopTask {
    name: String,
    sim: Rc<RefCell<SimulationLoop>>,
}

impl FrameTask for LoopTask {
    fn tick(&mut self, frame: &FrameInfo<'_>) -> Result<()> {
        let mut sim = self
            .sim
            .try_borrow_mut()
            .map_err(|_| BgzError::SurfaceError(format!("{} is re-entered", self.name)))?;
        sim.tick(frame.dt as f32, frame.input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Controls one started effect.
///
/// Clones share the same loop. Dropping a handle leaves the effect running;
/// only `stop` ends it.
#[derive(Clone)]
pub struct LoopHandle {
    id: LoopId,
    sim: Rc<RefCell<SimulationLoop>>,
    scheduler: Scheduler,
    task: Rc<Cell<Option<TaskId>>>,
    surface: Weak<RefCell<dyn Surface>>,
}

impl LoopHandle {
    pub fn id(&self) -> LoopId {
        self.id
    }

    /// Cancel the recurring tick and release the surface. Idempotent, and
    /// safe to call from inside any frame task.
    pub fn stop(&self) {
        if let Some(task) = self.task.take() {
            self.scheduler.cancel(task);
        }
        match self.sim.try_borrow_mut() {
            Ok(mut sim) => {
                sim.stop();
            }
            // Called from this loop's own tick: the cancelled task never runs
            // again and the loop drops its surface on the next start
            Err(_) => tracing::debug!(id = %self.id, "stop requested while ticking"),
        }
    }

    /// Re-seed and resume a stopped effect on its original surface
    pub fn restart(&self) -> Result<()> {
        if self.state() == LoopState::Running {
            return Err(BgzError::AlreadyRunning(self.id.raw()));
        }
        let surface = self
            .surface
            .upgrade()
            .ok_or(BgzError::SurfaceReleased(self.id.raw()))?;
        self.sim.borrow_mut().start(surface)?;
        self.register();
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.sim.borrow().state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    pub fn particle_count(&self) -> usize {
        self.sim.borrow().particles().len()
    }

    /// Snapshot of the live particles
    pub fn particles(&self) -> Vec<Particle> {
        self.sim.borrow().particles().to_vec()
    }

    /// Ticks run since the last start
    pub fn tick_count(&self) -> u64 {
        self.sim.borrow().tick_count()
    }

    pub fn effect_name(&self) -> &'static str {
        self.sim.borrow().name()
    }

    /// True while a recurring tick is registered with the scheduler
    pub fn is_scheduled(&self) -> bool {
        self.task
            .get()
            .is_some_and(|task| self.scheduler.is_scheduled(task))
    }

    /// True while the loop holds a reference to its surface
    pub fn holds_surface(&self) -> bool {
        self.sim.borrow().holds_surface()
    }

    fn register(&self) {
        let (name, schedule) = {
            let sim = self.sim.borrow();
            (format!("{}#{}", sim.name(), self.id), sim.settings().schedule)
        };
        let task = LoopTask {
            name,
            sim: self.sim.clone(),
        };
        let id = self.scheduler.register(schedule, Box::new(task));
        self.task.set(Some(id));
    }
}

impl std::fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopHandle")
            .field("id", &self.id)
            .field("task", &self.task.get())
            .finish()
    }
}
