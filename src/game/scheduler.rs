//! Deferred tasks on a logical clock
//!
//! Tasks are keyed by the run and step they were scheduled for so the
//! owner can tell a stale task from a live one when it comes due.

use crate::data::RunId;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskKey {
    pub run: RunId,
    pub step_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask<T> {
    pub due: Duration,
    pub key: TaskKey,
    pub task: T,
}

/// Pending tasks ordered by due time, ties in scheduling order
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    pending: Vec<ScheduledTask<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has elapsed on the scheduler clock
    pub fn schedule(&mut self, delay: Duration, key: TaskKey, task: T) {
        let due = self.now + delay;
        let pos = self
            .pending
            .iter()
            .position(|t| t.due > due)
            .unwrap_or(self.pending.len());
        self.pending.insert(pos, ScheduledTask { due, key, task });
    }

    /// Time from now until the earliest pending task
    pub fn until_next(&self) -> Option<Duration> {
        self.pending.first().map(|t| t.due.saturating_sub(self.now))
    }

    /// Move the clock forward
    pub fn elapse(&mut self, elapsed: Duration) {
        self.now += elapsed;
    }

    /// Remove and return every task due at or before the current time
    pub fn take_due(&mut self) -> Vec<ScheduledTask<T>> {
        let split = self
            .pending
            .iter()
            .position(|t| t.due > self.now)
            .unwrap_or(self.pending.len());
        self.pending.drain(..split).collect()
    }

    /// Drop every pending task, returning how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Drop tasks scheduled by a given run
    pub fn cancel_run(&mut self, run: RunId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.key.run != run);
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(run: RunId, step_id: u32) -> TaskKey {
        TaskKey { run, step_id }
    }

    #[test]
    fn tasks_come_due_in_time_order() {
        let run = RunId::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_secs(3), key(run, 1), "late");
        scheduler.schedule(Duration::from_secs(1), key(run, 2), "early");
        scheduler.schedule(Duration::from_secs(3), key(run, 3), "late-second");

        assert_eq!(scheduler.until_next(), Some(Duration::from_secs(1)));
        scheduler.elapse(Duration::from_secs(1));
        let due: Vec<_> = scheduler.take_due().into_iter().map(|t| t.task).collect();
        assert_eq!(due, vec!["early"]);

        scheduler.elapse(Duration::from_secs(5));
        let due: Vec<_> = scheduler.take_due().into_iter().map(|t| t.task).collect();
        assert_eq!(due, vec!["late", "late-second"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancel_run_keeps_other_runs() {
        let old = RunId::new();
        let new = RunId::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_secs(1), key(old, 1), ());
        scheduler.schedule(Duration::from_secs(1), key(new, 1), ());
        assert_eq!(scheduler.cancel_run(old), 1);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.cancel_all(), 1);
        assert_eq!(scheduler.until_next(), None);
    }
}
