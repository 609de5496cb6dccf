//! bgz Runtime - Cooperative frame loop infrastructure
//!
//! Provides the building blocks that stand in for a host event loop:
//! - `FrameClock`: turns host timestamps into clamped frame deltas
//! - `PointerState` / `FrameInput`: pointer tracking threaded into each tick
//! - `FrameTask`: trait for work ticked by the scheduler
//! - `Scheduler`: single-threaded registry of recurring frame and interval tasks

mod clock;
mod input;
mod scheduler;
mod system;

pub use clock::FrameClock;
pub use input::{FrameInput, PointerState};
pub use scheduler::{Schedule, Scheduler, TaskId, MAX_INTERVAL_RUNS_PER_FRAME};
pub use system::{FrameInfo, FrameTask};
