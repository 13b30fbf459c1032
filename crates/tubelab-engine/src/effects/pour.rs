use crate::core::timer::{TimerHandle, TimerQueue};

/// Timers the lab schedules. The payload tells the owner what fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabTimer {
    /// The pour finished; the chemical lands in the tube.
    PourDone,
    /// Visual pour progress step.
    PourTick,
}

/// Completion timer plus progress tick for one pour.
///
/// Both handles are held until the pour completes or is canceled, so leaving
/// the pouring state can always cancel them.
#[derive(Debug, Default)]
pub struct PourEffect {
    done: Option<TimerHandle>,
    tick: Option<TimerHandle>,
    /// Percent, 0 to 100.
    progress: f32,
    step: f32,
}

impl PourEffect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.done.is_some() || self.tick.is_some()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Start a pour. A pour already running is canceled first.
    pub fn start(
        &mut self,
        timers: &mut TimerQueue<LabTimer>,
        duration_ms: u64,
        tick_ms: u64,
        step: f32,
    ) {
        self.cancel(timers);
        self.progress = 0.0;
        self.step = step;
        self.done = Some(timers.schedule_once(duration_ms, LabTimer::PourDone));
        self.tick = Some(timers.schedule_repeating(tick_ms, LabTimer::PourTick));
    }

    /// Advance visual progress by one step, clamped at 100.
    pub fn on_tick(&mut self) {
        self.progress = (self.progress + self.step).min(100.0);
    }

    /// The completion timer fired. Stops the progress tick.
    pub fn finish(&mut self, timers: &mut TimerQueue<LabTimer>) {
        self.done = None;
        if let Some(tick) = self.tick.take() {
            timers.cancel(tick);
        }
        self.progress = 100.0;
    }

    /// Cancel any outstanding timers. Returns true if something was still pending.
    pub fn cancel(&mut self, timers: &mut TimerQueue<LabTimer>) -> bool {
        let mut canceled = false;
        for handle in [self.done.take(), self.tick.take()].into_iter().flatten() {
            canceled |= timers.cancel(handle);
        }
        self.progress = 0.0;
        canceled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_until(timers: &mut TimerQueue<LabTimer>, pour: &mut PourEffect, until: u64) -> usize {
        let mut done = 0;
        while let Some((_, timer)) = timers.pop_due(until) {
            match timer {
                LabTimer::PourTick => pour.on_tick(),
                LabTimer::PourDone => {
                    pour.finish(timers);
                    done += 1;
                }
            }
        }
        timers.settle(until);
        done
    }

    #[test]
    fn progress_ticks_then_completes() {
        let mut timers = TimerQueue::new();
        let mut pour = PourEffect::new();
        pour.start(&mut timers, 2000, 100, 5.0);
        assert_eq!(fire_until(&mut timers, &mut pour, 1000), 0);
        assert_eq!(pour.progress(), 50.0);
        assert_eq!(fire_until(&mut timers, &mut pour, 2000), 1);
        assert_eq!(pour.progress(), 100.0);
        assert!(!pour.is_running());
        assert!(timers.is_empty());
    }

    #[test]
    fn progress_clamps_at_full() {
        let mut timers = TimerQueue::new();
        let mut pour = PourEffect::new();
        pour.start(&mut timers, 5000, 100, 5.0);
        fire_until(&mut timers, &mut pour, 4000);
        assert_eq!(pour.progress(), 100.0);
    }

    #[test]
    fn cancel_leaves_no_timers() {
        let mut timers = TimerQueue::new();
        let mut pour = PourEffect::new();
        pour.start(&mut timers, 2000, 100, 5.0);
        fire_until(&mut timers, &mut pour, 500);
        assert!(pour.cancel(&mut timers));
        assert!(timers.is_empty());
        assert_eq!(fire_until(&mut timers, &mut pour, 10_000), 0);
        assert!(!pour.cancel(&mut timers));
    }

    #[test]
    fn restart_replaces_the_running_pour() {
        let mut timers = TimerQueue::new();
        let mut pour = PourEffect::new();
        pour.start(&mut timers, 2000, 100, 5.0);
        pour.start(&mut timers, 2000, 100, 5.0);
        assert_eq!(timers.len(), 2);
    }
}
