//! Cooperative table of repeating tasks driven by virtual wall-clock time.

use std::time::Duration;

/// Work a scheduled task performs when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TaskKind {
    /// Advances the simulation and refreshes the frame snapshot.
    Frame,
    /// Releases due wave spawns.
    Spawn,
}

/// Handle used to cancel a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct TaskId(u64);

/// A task that fired, together with the wall time it fired at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Firing {
    pub(crate) kind: TaskKind,
    pub(crate) at: Duration,
}

#[derive(Clone, Copy, Debug)]
struct Task {
    id: TaskId,
    kind: TaskKind,
    interval: Duration,
    due: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct Timers {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Timers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a task that first fires one `interval` after `now`.
    pub(crate) fn schedule(&mut self, kind: TaskKind, interval: Duration, now: Duration) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            kind,
            interval,
            due: now.saturating_add(interval),
        });
        id
    }

    /// Removes a task so it never fires again. Unknown handles are ignored.
    pub(crate) fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub(crate) fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Pops the earliest firing due at or before `until`.
    ///
    /// Ties fire in registration order. Every missed period fires, so a
    /// long advance replays each slot at its own time.
    pub(crate) fn pop_due(&mut self, until: Duration) -> Option<Firing> {
        let task = self
            .tasks
            .iter_mut()
            .filter(|task| task.due <= until)
            .min_by_key(|task| (task.due, task.id))?;

        let at = task.due;
        task.due = at.saturating_add(task.interval.max(Duration::from_nanos(1)));

        Some(Firing {
            kind: task.kind,
            at,
        })
    }
}
