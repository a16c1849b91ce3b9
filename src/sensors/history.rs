//! Five-sample rolling temperature window.
//!
//! Created lazily: the first sample fills every slot, so the mean is
//! meaningful from the very first reading.  After that it is a plain
//! FIFO, oldest first.  The mean is never cached.

/// Number of samples kept.
pub const WINDOW_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemperatureWindow {
    slots: Option<[i32; WINDOW_LEN]>,
}

impl TemperatureWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, dropping the oldest.
    pub fn push(&mut self, sample: i32) {
        match &mut self.slots {
            None => self.slots = Some([sample; WINDOW_LEN]),
            Some(slots) => {
                slots.rotate_left(1);
                slots[WINDOW_LEN - 1] = sample;
            }
        }
    }

    /// Integer mean, truncated toward zero.  `None` before the first sample.
    pub fn average(&self) -> Option<i32> {
        self.slots.map(|s| {
            let sum: i64 = s.iter().map(|&v| i64::from(v)).sum();
            // Mean of i32 values always fits an i32.
            (sum / WINDOW_LEN as i64) as i32
        })
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_none()
    }

    /// Current contents, oldest first.
    pub fn samples(&self) -> Option<&[i32; WINDOW_LEN]> {
        self.slots.as_ref()
    }
}
