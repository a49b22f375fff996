/// 8-bit countdown, decremented once per cycle while non-zero.
pub struct Timer {
    left: u8,
}

impl Timer {
    pub fn new() -> Timer {
        Timer { left: 0 }
    }

    /// Counts down by one. Returns whether the timer was running before the step.
    pub fn step(&mut self) -> bool {
        let running = self.left > 0;
        self.left = self.left.saturating_sub(1);
        running
    }

    pub fn get(&self) -> u8 {
        self.left
    }

    pub fn set(&mut self, ticks: u8) {
        self.left = ticks
    }
}
