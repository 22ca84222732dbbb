//! Virtual-clock task queue. Every suspension point that is a timer in the
//! browser (trigger `delay`, extension time offsets) is a scheduled task
//! here; the host drives time forward with `Engine::advance`.

use dom::{Id, Node};

use crate::binder::Action;

pub(crate) enum Task {
    /// A delayed binding firing. Timers are one-shot and re-armed per
    /// triggering event, never coalesced.
    Fire {
        target: Id,
        event: String,
        action: Action,
    },
    /// A deferred DOM edit scheduled by an extension. Dropped silently if
    /// the element has left the tree by the time it is due.
    Mutate {
        target: Id,
        mutate: Box<dyn FnOnce(&mut Node)>,
    },
}

struct Entry {
    due: u64,
    seq: u64,
    task: Task,
}

#[derive(Default)]
pub(crate) struct TimerQueue {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn schedule(&mut self, due: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { due, seq, task });
    }

    /// Pop every task due at or before `now`, ordered by (due, schedule order).
    pub fn take_due(&mut self, now: u64) -> Vec<Task> {
        let entries = std::mem::take(&mut self.entries);
        let (mut ready, pending): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.due <= now);
        self.entries = pending;
        ready.sort_by_key(|e| (e.due, e.seq));
        ready.into_iter().map(|e| e.task).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire(target: Id) -> Task {
        Task::Fire {
            target,
            event: "click".to_string(),
            action: Action::Invoke {
                handler: "h".to_string(),
            },
        }
    }

    fn target_of(task: &Task) -> Id {
        match task {
            Task::Fire { target, .. } => *target,
            Task::Mutate { target, .. } => *target,
        }
    }

    #[test]
    fn take_due_respects_due_time_and_schedule_order() {
        let mut queue = TimerQueue::default();
        queue.schedule(200, fire(Id(2)));
        queue.schedule(100, fire(Id(1)));
        queue.schedule(100, fire(Id(3)));

        assert!(queue.take_due(99).is_empty());
        let ready = queue.take_due(150);
        assert_eq!(ready.iter().map(target_of).collect::<Vec<_>>(), [Id(1), Id(3)]);
        assert_eq!(queue.len(), 1);

        let rest = queue.take_due(200);
        assert_eq!(rest.iter().map(target_of).collect::<Vec<_>>(), [Id(2)]);
    }

    #[test]
    fn tasks_fire_exactly_once() {
        let mut queue = TimerQueue::default();
        queue.schedule(10, fire(Id(1)));
        assert_eq!(queue.take_due(10).len(), 1);
        assert!(queue.take_due(10).is_empty());
    }
}
