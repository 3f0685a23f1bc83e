//! Scheduler capability
//!
//! The host offers recurring and one-shot timed tasks measured in ticks.
//! Tasks are plain data ([`ScheduledTask`]); when one comes due the host
//! routes it back to the owning unit, so a callback never holds a borrow of
//! the engine that armed it.
//!
//! Every [`TaskHandle`] carries a [`CancellationToken`]. The token is checked
//! when a due task is claimed, so a task cancelled earlier in the same tick
//! (or at any earlier point) never runs again.

use mbx_common::Location;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// What a scheduled task does when it fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Per-period countdown of the unit's active item
    Countdown(Location),
    /// Note feedback while the unit is playing
    Feedback(Location),
    /// One-shot check after an insert that starts an idle unit
    ForceStart(Location),
}

impl ScheduledTask {
    pub fn location(&self) -> &Location {
        match self {
            ScheduledTask::Countdown(loc)
            | ScheduledTask::Feedback(loc)
            | ScheduledTask::ForceStart(loc) => loc,
        }
    }
}

/// Cancellable reference to a scheduled task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    token: CancellationToken,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskHandle {}

/// Recurring/one-shot cancellable timed tasks supplied by the host
pub trait Scheduler {
    /// Run `task` every `interval_ticks`, first after one interval
    fn schedule_recurring(&mut self, interval_ticks: u64, task: ScheduledTask) -> TaskHandle;

    /// Run `task` once after `delay_ticks`
    fn schedule_once(&mut self, delay_ticks: u64, task: ScheduledTask) -> TaskHandle;

    /// Cancel `handle`; its task never runs afterwards. Cancelling twice is a no-op.
    fn cancel(&mut self, handle: &TaskHandle);
}

#[derive(Debug)]
struct Entry {
    task: ScheduledTask,
    token: CancellationToken,
    due: u64,
    interval: Option<u64>,
}

/// Single-threaded, tick-driven scheduler
///
/// Call [`advance`](Self::advance) once per host tick, then
/// [`claim`](Self::claim) each returned handle right before dispatching it.
#[derive(Debug, Default)]
pub struct TickScheduler {
    now: u64,
    next_id: u64,
    tasks: BTreeMap<u64, Entry>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of live (not cancelled, not finished) tasks
    pub fn live_tasks(&self) -> usize {
        self.tasks
            .values()
            .filter(|entry| !entry.token.is_cancelled())
            .count()
    }

    /// Live tasks matching `predicate`
    pub fn count_live(&self, predicate: impl Fn(&ScheduledTask) -> bool) -> usize {
        self.tasks
            .values()
            .filter(|entry| !entry.token.is_cancelled() && predicate(&entry.task))
            .count()
    }

    /// Move time forward one tick and return the handles now due, in
    /// scheduling order
    pub fn advance(&mut self) -> Vec<TaskHandle> {
        self.now += 1;
        let now = self.now;
        self.tasks.retain(|_, entry| !entry.token.is_cancelled());
        self.tasks
            .iter()
            .filter(|(_, entry)| entry.due <= now)
            .map(|(id, entry)| TaskHandle {
                id: *id,
                token: entry.token.clone(),
            })
            .collect()
    }

    /// Take the task behind a due handle if it is still live
    ///
    /// One-shot tasks are removed; recurring ones are re-armed for their next
    /// period. Returns `None` for a handle that was cancelled after
    /// [`advance`](Self::advance) returned it.
    pub fn claim(&mut self, handle: &TaskHandle) -> Option<ScheduledTask> {
        if handle.is_cancelled() {
            self.tasks.remove(&handle.id);
            trace!("Skipping cancelled task {}", handle.id);
            return None;
        }

        let entry = self.tasks.get_mut(&handle.id)?;
        if entry.due > self.now {
            return None;
        }

        if let Some(interval) = entry.interval {
            entry.due = self.now + interval;
            return Some(entry.task.clone());
        }
        self.tasks.remove(&handle.id).map(|entry| entry.task)
    }

    fn insert(&mut self, delay: u64, interval: Option<u64>, task: ScheduledTask) -> TaskHandle {
        self.next_id += 1;
        let id = self.next_id;
        let token = CancellationToken::new();
        trace!("Scheduling task {} ({:?}) in {} ticks", id, task, delay);
        self.tasks.insert(
            id,
            Entry {
                task,
                token: token.clone(),
                due: self.now + delay.max(1),
                interval,
            },
        );
        TaskHandle { id, token }
    }
}

impl Scheduler for TickScheduler {
    fn schedule_recurring(&mut self, interval_ticks: u64, task: ScheduledTask) -> TaskHandle {
        let interval = interval_ticks.max(1);
        self.insert(interval, Some(interval), task)
    }

    fn schedule_once(&mut self, delay_ticks: u64, task: ScheduledTask) -> TaskHandle {
        self.insert(delay_ticks, None, task)
    }

    fn cancel(&mut self, handle: &TaskHandle) {
        handle.token.cancel();
        self.tasks.remove(&handle.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new("world", 0, 64, 0)
    }

    /// Advance `n` ticks, claiming everything due; returns (tick, task) pairs
    fn run(sched: &mut TickScheduler, n: u64) -> Vec<(u64, ScheduledTask)> {
        let mut fired = Vec::new();
        for _ in 0..n {
            for handle in sched.advance() {
                if let Some(task) = sched.claim(&handle) {
                    fired.push((sched.now(), task));
                }
            }
        }
        fired
    }

    #[test]
    fn test_once_fires_after_delay() {
        let mut sched = TickScheduler::new();
        sched.schedule_once(10, ScheduledTask::ForceStart(loc()));

        let fired = run(&mut sched, 20);
        assert_eq!(fired, vec![(10, ScheduledTask::ForceStart(loc()))]);
        assert_eq!(sched.live_tasks(), 0);
    }

    #[test]
    fn test_recurring_fires_every_interval() {
        let mut sched = TickScheduler::new();
        sched.schedule_recurring(20, ScheduledTask::Countdown(loc()));

        let ticks: Vec<u64> = run(&mut sched, 65).into_iter().map(|(t, _)| t).collect();
        assert_eq!(ticks, vec![20, 40, 60]);
        assert_eq!(sched.live_tasks(), 1);
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let mut sched = TickScheduler::new();
        let handle = sched.schedule_recurring(5, ScheduledTask::Countdown(loc()));
        assert_eq!(run(&mut sched, 5).len(), 1);

        sched.cancel(&handle);
        assert!(handle.is_cancelled());
        assert!(run(&mut sched, 50).is_empty());
        assert_eq!(sched.live_tasks(), 0);
    }

    #[test]
    fn test_cancel_between_advance_and_claim() {
        let mut sched = TickScheduler::new();
        let first = sched.schedule_once(1, ScheduledTask::ForceStart(loc()));
        let second = sched.schedule_once(1, ScheduledTask::Countdown(loc()));

        let due = sched.advance();
        assert_eq!(due.len(), 2);

        // First dispatch cancels the second task in the same tick
        assert!(sched.claim(&due[0]).is_some());
        sched.cancel(&second);
        assert!(sched.claim(&due[1]).is_none());
        assert_eq!(due[0], first);
    }

    #[test]
    fn test_double_cancel_is_noop() {
        let mut sched = TickScheduler::new();
        let handle = sched.schedule_once(3, ScheduledTask::Feedback(loc()));
        sched.cancel(&handle);
        sched.cancel(&handle);
        assert_eq!(sched.live_tasks(), 0);
    }

    #[test]
    fn test_zero_delay_runs_next_tick() {
        let mut sched = TickScheduler::new();
        sched.schedule_once(0, ScheduledTask::ForceStart(loc()));
        assert_eq!(run(&mut sched, 1).len(), 1);
    }

    #[test]
    fn test_count_live_by_kind() {
        let mut sched = TickScheduler::new();
        sched.schedule_recurring(20, ScheduledTask::Countdown(loc()));
        sched.schedule_recurring(20, ScheduledTask::Feedback(loc()));
        assert_eq!(
            sched.count_live(|t| matches!(t, ScheduledTask::Countdown(_))),
            1
        );
    }

    #[test]
    fn test_task_location() {
        let task = ScheduledTask::Feedback(loc());
        assert_eq!(task.location(), &loc());
    }
}
