//! Frame task trait

use crate::input::FrameInput;
use bgz_core::Result;

/// Per-run context handed to a task
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo<'a> {
    /// Host frame number (1-based)
    pub frame: u64,
    /// Elapsed scheduler time in seconds
    pub time: f64,
    /// Seconds covered by this run: the frame delta for per-frame tasks,
    /// the interval length for interval tasks
    pub dt: f64,
    pub input: &'a FrameInput,
}

/// Recurring work driven by the `Scheduler`
///
/// Tasks run in registration order and never block; each run returns
/// control to the host before the next one starts.
pub trait FrameTask {
    /// Called every time the task's schedule comes due
    fn tick(&mut self, frame: &FrameInfo<'_>) -> Result<()>;

    /// Human-readable name for this task
    fn name(&self) -> &str;
}
