use std::sync::atomic::{AtomicI8, Ordering};

/// Steps counted by the tick since the last drain.
///
/// The tick is the only writer that adds; the host is the only side that
/// resets. Both go through single atomic operations, so the host never sees a
/// half-applied update and a step is either in the drained value or still in
/// the counter, never both.
///
/// The counter saturates at the `i8` bounds. Steps beyond the bound between two
/// drains are dropped; the direction of travel is kept.
#[derive(Debug, Default)]
pub struct Accumulator {
    count: AtomicI8,
}

impl Accumulator {
    pub const fn new() -> Self {
        Self {
            count: AtomicI8::new(0),
        }
    }

    /// Add one classified step. Called from the tick only.
    pub fn add(&self, step: i8) {
        if step == 0 {
            return;
        }
        // Err means the counter is pinned at a bound; nothing to store.
        let _ = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                let next = count.saturating_add(step);
                (next != count).then_some(next)
            });
    }

    /// Current value, without resetting it.
    pub fn peek(&self) -> i8 {
        self.count.load(Ordering::Acquire)
    }

    /// Take everything counted so far and reset to zero.
    ///
    /// Returns `None` without touching the counter when nothing was counted.
    pub fn drain(&self) -> Option<i8> {
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }
        match self.count.swap(0, Ordering::AcqRel) {
            0 => None,
            delta => Some(delta),
        }
    }

    /// Drain into `delta`, returning whether anything had been counted.
    /// `delta` is set to 0 when nothing was.
    pub fn update(&self, delta: &mut i8) -> bool {
        match self.drain() {
            Some(d) => {
                *delta = d;
                true
            }
            None => {
                *delta = 0;
                false
            }
        }
    }
}
