//! Single-threaded cooperative scheduler
//!
//! Stands in for the host event loop: tasks register once and are run by
//! `Scheduler::frame` every time their schedule comes due. The scheduler is
//! a cheap `Rc` handle so loop handles can keep a reference for cancellation.

use crate::clock::FrameClock;
use crate::input::FrameInput;
use crate::system::{FrameInfo, FrameTask};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Interval tasks never run more than this many times in one frame
pub const MAX_INTERVAL_RUNS_PER_FRAME: u32 = 4;

/// When a registered task comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Once per host frame
    EveryFrame,
    /// Once per elapsed interval, measured in frame time
    Interval(Duration),
}

/// Handle to one registration
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

struct Entry {
    id: TaskId,
    schedule: Schedule,
    accumulator: f64,
    task: Box<dyn FrameTask>,
}

#[derive(Default)]
struct SchedulerInner {
    next_id: u64,
    clock: FrameClock,
    /// Entries not currently being run
    entries: Vec<Entry>,
    /// Every live registration, including entries taken out by a running frame
    registered: HashSet<TaskId>,
    /// Cancelled while their entry was taken out by a running frame
    cancelled: HashSet<TaskId>,
}

/// Registry of recurring tasks sharing one cooperative event loop
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recurring task. It first runs on the next `frame` call.
    pub fn register(&self, schedule: Schedule, task: Box<dyn FrameTask>) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TaskId(inner.next_id);
        tracing::debug!(%id, task = task.name(), ?schedule, "registered frame task");
        inner.registered.insert(id);
        inner.entries.push(Entry {
            id,
            schedule,
            accumulator: 0.0,
            task,
        });
        id
    }

    /// Deregister a task. Returns false if it was not registered.
    /// Safe to call from inside a running task.
    pub fn cancel(&self, id: TaskId) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            if !inner.registered.remove(&id) {
                return false;
            }
            match inner.entries.iter().position(|e| e.id == id) {
                Some(index) => Some(inner.entries.remove(index)),
                None => {
                    inner.cancelled.insert(id);
                    None
                }
            }
        };
        // Drop the task outside the borrow; its destructor may touch the scheduler
        drop(removed);
        tracing::debug!(%id, "cancelled frame task");
        true
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.inner.borrow().registered.contains(&id)
    }

    /// Number of live registrations
    pub fn scheduled_count(&self) -> usize {
        self.inner.borrow().registered.len()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().clock.frame_count
    }

    /// Run one host frame at timestamp `now` (seconds).
    ///
    /// A task that fails is logged and stays registered; other tasks still run.
    pub fn frame(&self, now: f64, input: &FrameInput) {
        let (mut running, frame, time, dt) = {
            let mut inner = self.inner.borrow_mut();
            inner.clock.tick(now);
            let clock = &inner.clock;
            let (frame, time, dt) = (clock.frame_count, clock.total_time, clock.delta_time);
            (std::mem::take(&mut inner.entries), frame, time, dt)
        };

        for entry in running.iter_mut() {
            let (runs, run_dt) = match entry.schedule {
                Schedule::EveryFrame => (1, dt),
                Schedule::Interval(interval) => {
                    let step = interval.as_secs_f64();
                    if step <= 0.0 {
                        (1, dt)
                    } else {
                        entry.accumulator += dt;
                        let mut runs = 0;
                        while entry.accumulator >= step && runs < MAX_INTERVAL_RUNS_PER_FRAME {
                            entry.accumulator -= step;
                            runs += 1;
                        }
                        if runs == MAX_INTERVAL_RUNS_PER_FRAME {
                            entry.accumulator = entry.accumulator.min(step);
                        }
                        (runs, step)
                    }
                }
            };

            for _ in 0..runs {
                if self.inner.borrow().cancelled.contains(&entry.id) {
                    break;
                }
                let info = FrameInfo {
                    frame,
                    time,
                    dt: run_dt,
                    input,
                };
                if let Err(err) = entry.task.tick(&info) {
                    tracing::warn!(id = %entry.id, task = entry.task.name(), error = %err, "frame task failed");
                }
            }
        }

        let dropped: Vec<Entry> = {
            let mut inner = self.inner.borrow_mut();
            let cancelled = std::mem::take(&mut inner.cancelled);
            let (kept, dropped): (Vec<Entry>, Vec<Entry>) =
                running.into_iter().partition(|e| !cancelled.contains(&e.id));
            // Tasks registered during this frame were pushed onto `entries`
            let added = std::mem::replace(&mut inner.entries, kept);
            inner.entries.extend(added);
            dropped
        };
        drop(dropped);
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("scheduled", &inner.registered.len())
            .field("frame", &inner.clock.frame_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgz_core::{BgzError, Result};
    use std::cell::Cell;

    struct Counter {
        runs: Rc<Cell<u32>>,
        fail: bool,
    }

    impl FrameTask for Counter {
        fn tick(&mut self, _frame: &FrameInfo<'_>) -> Result<()> {
            self.runs.set(self.runs.get() + 1);
            if self.fail {
                return Err(BgzError::SurfaceError("boom".into()));
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "counter"
        }
    }

    fn counter(fail: bool) -> (Rc<Cell<u32>>, Box<dyn FrameTask>) {
        let runs = Rc::new(Cell::new(0));
        (runs.clone(), Box::new(Counter { runs, fail }))
    }

    #[test]
    fn every_frame_task_runs_each_frame() {
        let scheduler = Scheduler::new();
        let (runs, task) = counter(false);
        scheduler.register(Schedule::EveryFrame, task);

        let input = FrameInput::default();
        for i in 0..3 {
            scheduler.frame(i as f64 / 60.0, &input);
        }
        assert_eq!(runs.get(), 3);
        assert_eq!(scheduler.frame_count(), 3);
    }

    #[test]
    fn cancel_is_idempotent() {
        let scheduler = Scheduler::new();
        let (runs, task) = counter(false);
        let id = scheduler.register(Schedule::EveryFrame, task);
        assert_eq!(scheduler.scheduled_count(), 1);

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.scheduled_count(), 0);

        scheduler.frame(0.0, &FrameInput::default());
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn interval_task_fires_per_elapsed_interval() {
        let scheduler = Scheduler::new();
        let (runs, task) = counter(false);
        scheduler.register(Schedule::Interval(Duration::from_millis(100)), task);

        let input = FrameInput::default();
        scheduler.frame(0.0, &input); // first frame has zero delta
        assert_eq!(runs.get(), 0);
        scheduler.frame(0.05, &input);
        assert_eq!(runs.get(), 0);
        scheduler.frame(0.1, &input);
        assert_eq!(runs.get(), 1);
        scheduler.frame(0.31, &input);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn interval_catch_up_is_bounded() {
        let scheduler = Scheduler::new();
        let (runs, task) = counter(false);
        scheduler.register(Schedule::Interval(Duration::from_millis(10)), task);

        let input = FrameInput::default();
        scheduler.frame(0.0, &input);
        scheduler.frame(0.25, &input);
        assert_eq!(runs.get(), MAX_INTERVAL_RUNS_PER_FRAME);
    }

    #[test]
    fn failing_task_does_not_affect_others() {
        let scheduler = Scheduler::new();
        let (bad_runs, bad) = counter(true);
        let (good_runs, good) = counter(false);
        scheduler.register(Schedule::EveryFrame, bad);
        scheduler.register(Schedule::EveryFrame, good);

        let input = FrameInput::default();
        scheduler.frame(0.0, &input);
        scheduler.frame(0.016, &input);
        assert_eq!(bad_runs.get(), 2);
        assert_eq!(good_runs.get(), 2);
        assert_eq!(scheduler.scheduled_count(), 2);
    }

    struct SelfCancelling {
        scheduler: Scheduler,
        id: Rc<Cell<Option<TaskId>>>,
        runs: Rc<Cell<u32>>,
    }

    impl FrameTask for SelfCancelling {
        fn tick(&mut self, _frame: &FrameInfo<'_>) -> Result<()> {
            self.runs.set(self.runs.get() + 1);
            if let Some(id) = self.id.get() {
                self.scheduler.cancel(id);
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "self-cancelling"
        }
    }

    #[test]
    fn cancel_from_inside_a_task() {
        let scheduler = Scheduler::new();
        let id_slot = Rc::new(Cell::new(None));
        let runs = Rc::new(Cell::new(0));
        let id = scheduler.register(
            Schedule::EveryFrame,
            Box::new(SelfCancelling {
                scheduler: scheduler.clone(),
                id: id_slot.clone(),
                runs: runs.clone(),
            }),
        );
        id_slot.set(Some(id));

        let input = FrameInput::default();
        scheduler.frame(0.0, &input);
        assert_eq!(scheduler.scheduled_count(), 0);
        scheduler.frame(0.016, &input);
        assert_eq!(runs.get(), 1);
    }
}
