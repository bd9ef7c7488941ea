use std::cmp::Ordering;

use geom::Duration;

/// Work scheduled to happen after a delay. Nothing runs by itself; the owner advances the clock
/// and gets back whatever came due, oldest deadline first. Tasks with the same deadline come out
/// in the order they were scheduled.
pub struct DeferredQueue<T> {
    now: Duration,
    tasks: Vec<(Duration, T)>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            tasks: Vec::new(),
        }
    }

    pub fn schedule(&mut self, delay: Duration, task: T) {
        self.tasks.push((self.now + delay, task));
    }

    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now + dt;
        let now = self.now;
        let (mut due, later): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|(deadline, _)| *deadline <= now);
        self.tasks = later;
        // Stable, so ties keep scheduling order
        due.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        due.into_iter().map(|(_, task)| task).collect()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_in_deadline_order() {
        let mut q = DeferredQueue::new();
        q.schedule(Duration::seconds(0.3), "c");
        q.schedule(Duration::seconds(0.1), "a");
        q.schedule(Duration::seconds(0.1), "b");
        assert!(q.advance(Duration::seconds(0.05)).is_empty());
        assert_eq!(q.advance(Duration::seconds(0.05)), vec!["a", "b"]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.advance(Duration::seconds(1.0)), vec!["c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn delay_is_relative_to_now() {
        let mut q = DeferredQueue::new();
        q.advance(Duration::seconds(10.0));
        q.schedule(Duration::seconds(1.0), 1);
        assert!(q.advance(Duration::seconds(0.5)).is_empty());
        assert_eq!(q.advance(Duration::seconds(0.5)), vec![1]);
    }
}
