use std::time::{Duration, Instant};

/// Ticket for a computer move that has been scheduled but not yet played.
///
/// The ticket records the session generation it was issued under. Resets and
/// mode changes bump the generation, so a ticket that outlives its game can
/// never fire against the new board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledMove {
    generation: u64,
    due_at: Instant,
}

impl ScheduledMove {
    pub fn new(generation: u64, now: Instant, delay: Duration) -> Self {
        ScheduledMove {
            generation,
            due_at: now + delay,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn due_at(&self) -> Instant {
        self.due_at
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due_at
    }
}
