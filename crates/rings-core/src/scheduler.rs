//! Periodic tasks driven from a render-loop callback instead of timer chains.
//!
//! Time only moves when [`Scheduler::advance`] is called, so several periods
//! keep their relative cadence no matter how irregular the frames are. Firings
//! are reported in registration order: register the step before anything that
//! reads its results.

use crate::constants::MAX_CATCH_UP_FIRINGS;
use crate::error::ConfigError;
use smallvec::SmallVec;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u32);

#[derive(Debug)]
struct PeriodicTask<T> {
    id: TaskId,
    period: Duration,
    accum: Duration,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: SmallVec<[PeriodicTask<T>; 4]>,
    next_id: u32,
    max_catch_up: u32,
}

impl<T: Copy> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            tasks: SmallVec::new(),
            next_id: 0,
            max_catch_up: MAX_CATCH_UP_FIRINGS,
        }
    }

    /// Caps how many firings of one task a single advance may report.
    pub fn with_max_catch_up(mut self, max_catch_up: u32) -> Self {
        self.max_catch_up = max_catch_up.max(1);
        self
    }

    pub fn register(&mut self, period: Duration, task: T) -> Result<TaskId, ConfigError> {
        if period.is_zero() {
            log::warn!("[scheduler] rejected zero period task");
            return Err(ConfigError::ZeroPeriod);
        }
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(PeriodicTask {
            id,
            period,
            accum: Duration::ZERO,
            task,
        });
        Ok(id)
    }

    /// Returns false if the task was not registered (or already cancelled).
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn period(&self, id: TaskId) -> Option<Duration> {
        self.tasks.iter().find(|t| t.id == id).map(|t| t.period)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Moves time forward by `dt`, pushing one entry per due firing.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<T>) {
        for t in self.tasks.iter_mut() {
            t.accum += dt;
            if t.accum < t.period {
                continue;
            }
            let period_ns = t.period.as_nanos();
            let accum_ns = t.accum.as_nanos();
            let due = accum_ns / period_ns;
            t.accum = Duration::from_nanos((accum_ns % period_ns) as u64);

            let run = due.min(self.max_catch_up as u128) as usize;
            if due > run as u128 {
                log::debug!(
                    "[scheduler] task {:?} dropped {} late firings",
                    t.id,
                    due - run as u128
                );
            }
            out.extend(std::iter::repeat(t.task).take(run));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_carries_into_next_advance() {
        let mut s = Scheduler::new();
        s.register(Duration::from_millis(10), 'a').unwrap();
        let mut out = Vec::new();
        s.advance(Duration::from_millis(15), &mut out);
        assert_eq!(out, vec!['a']);
        out.clear();
        s.advance(Duration::from_millis(5), &mut out);
        assert_eq!(out, vec!['a']);
    }
}
