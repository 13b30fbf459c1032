/// Converts variable frame deltas (seconds) into whole milliseconds for the
/// lab's integer clock. Sub-millisecond remainders carry over to the next frame.
pub struct FrameClock {
    /// Longest span a single frame may advance, in ms.
    max_frame_ms: u64,
    /// Fractional milliseconds not yet handed out.
    carry_ms: f64,
}

impl FrameClock {
    pub fn new(max_frame_ms: u64) -> Self {
        Self {
            max_frame_ms,
            carry_ms: 0.0,
        }
    }

    /// Add frame time. Returns the whole milliseconds to advance by.
    pub fn accumulate(&mut self, frame_dt: f32) -> u64 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.carry_ms += frame_dt as f64 * 1000.0;
        // A stalled tab can deliver seconds at once; cap it like any long frame.
        self.carry_ms = self.carry_ms.min(self.max_frame_ms as f64);
        let whole = self.carry_ms.floor();
        self.carry_ms -= whole;
        whole as u64
    }

    /// Unconsumed fraction of a millisecond (0.0 to 1.0).
    pub fn carry(&self) -> f64 {
        self.carry_ms
    }

    pub fn max_frame_ms(&self) -> u64 {
        self.max_frame_ms
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(250)
    }
}
