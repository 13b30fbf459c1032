// core/timer.rs
//
// Cancelable timers on an integer millisecond clock.
//
// Nothing here reads wall-clock time. The owner advances the clock and pops
// due timers one at a time, so a handler that cancels another timer takes
// effect before that timer could fire.
//
// Usage:
//   let mut timers = TimerQueue::new();
//   let done = timers.schedule_once(2000, Tick::PourDone);
//   let target = timers.now() + 16;
//   while let Some((handle, tick)) = timers.pop_due(target) { /* handle */ }
//   timers.settle(target);

/// Handle returned when a timer is scheduled. Required to cancel it.
#[must_use = "dropping a TimerHandle makes the timer impossible to cancel"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TimerHandle,
    due_ms: u64,
    /// `Some` for repeating timers.
    period_ms: Option<u64>,
    payload: T,
}

/// A set of pending one-shot and repeating timers.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T: Copy> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// Current clock value in ms.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    fn push(&mut self, delay_ms: u64, period_ms: Option<u64>, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
            payload,
        });
        handle
    }

    /// Fire `payload` once, `delay_ms` from now.
    pub fn schedule_once(&mut self, delay_ms: u64, payload: T) -> TimerHandle {
        self.push(delay_ms, None, payload)
    }

    /// Fire `payload` every `period_ms` (at least 1 ms), starting one period from now.
    pub fn schedule_repeating(&mut self, period_ms: u64, payload: T) -> TimerHandle {
        let period = period_ms.max(1);
        self.push(period, Some(period), payload)
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was canceled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cancel everything. Returns how many timers were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Ties fire in scheduling order. Repeating timers are
    /// rescheduled one period later.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.handle.0))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[index];
        self.now_ms = self.now_ms.max(entry.due_ms);
        let fired = (entry.handle, entry.payload);
        let period_ms = entry.period_ms;
        // A repeat past the end of the clock can never fire; drop it.
        match period_ms.and_then(|period| entry.due_ms.checked_add(period)) {
            Some(next_due) => entry.due_ms = next_due,
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some(fired)
    }

    /// Move the clock forward to `until_ms` once nothing more is due.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

impl<T: Copy> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tick {
        A,
        B,
    }

    fn run(timers: &mut TimerQueue<Tick>, dt: u64) -> Vec<(u64, Tick)> {
        let target = timers.now() + dt;
        let mut fired = Vec::new();
        while let Some((_, tick)) = timers.pop_due(target) {
            fired.push((timers.now(), tick));
        }
        timers.settle(target);
        fired
    }

    #[test]
    fn one_shot_fires_once() {
        let mut timers = TimerQueue::new();
        let _handle = timers.schedule_once(100, Tick::A);
        assert!(run(&mut timers, 99).is_empty());
        assert_eq!(run(&mut timers, 1), vec![(100, Tick::A)]);
        assert!(run(&mut timers, 1000).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn repeating_fires_every_period() {
        let mut timers = TimerQueue::new();
        let _handle = timers.schedule_repeating(100, Tick::B);
        let fired = run(&mut timers, 350);
        assert_eq!(fired, vec![(100, Tick::B), (200, Tick::B), (300, Tick::B)]);
        assert_eq!(timers.now(), 350);
        assert_eq!(run(&mut timers, 50), vec![(400, Tick::B)]);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut timers = TimerQueue::new();
        let a = timers.schedule_once(100, Tick::A);
        let b = timers.schedule_repeating(50, Tick::B);
        assert!(timers.cancel(a));
        assert!(!timers.cancel(a));
        assert!(timers.cancel(b));
        assert!(run(&mut timers, 5000).is_empty());
    }

    #[test]
    fn interleaves_in_time_order() {
        let mut timers = TimerQueue::new();
        let _once = timers.schedule_once(200, Tick::A);
        let _tick = timers.schedule_repeating(100, Tick::B);
        let fired = run(&mut timers, 200);
        // Same due time: the earlier-scheduled timer first.
        assert_eq!(fired, vec![(100, Tick::B), (200, Tick::A), (200, Tick::B)]);
    }

    #[test]
    fn cancel_between_pops_takes_effect() {
        let mut timers = TimerQueue::new();
        let _first = timers.schedule_once(10, Tick::A);
        let second = timers.schedule_once(20, Tick::B);
        let (_, tick) = timers.pop_due(100).unwrap();
        assert_eq!(tick, Tick::A);
        timers.cancel(second);
        assert!(timers.pop_due(100).is_none());
    }

    #[test]
    fn far_deadlines_saturate_instead_of_wrapping() {
        let mut timers = TimerQueue::new();
        timers.settle(10);
        let far = timers.schedule_once(u64::MAX, Tick::A);
        assert!(run(&mut timers, 1_000_000).is_empty());
        assert!(timers.is_pending(far));

        timers.settle(u64::MAX - 5);
        let _repeat = timers.schedule_repeating(4, Tick::B);
        let mut fired = Vec::new();
        while let Some((_, tick)) = timers.pop_due(u64::MAX) {
            fired.push(tick);
        }
        // The repeat fires once at MAX - 1, then has no room left.
        assert_eq!(fired, vec![Tick::B, Tick::A]);
        assert!(timers.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut timers = TimerQueue::new();
        let a = timers.schedule_once(10, Tick::A);
        let _b = timers.schedule_repeating(10, Tick::B);
        assert_eq!(timers.clear(), 2);
        assert!(!timers.is_pending(a));
    }
}
