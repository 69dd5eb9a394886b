//! Tick-indexed deferred transitions
//!
//! Respawn, game over, arrival steps and message expiry are queued here with the
//! clock tick they fire on, then resolved synchronously at the start of a tick.

/// A deferred state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAction {
    /// Rebuild the current level in place
    Respawn,
    /// Report the run as lost
    GameOver,
    /// Advance the landing walk by one step
    ArrivalStep,
    /// Clear the banner message if it is still the one with this serial
    ClearMessage { serial: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    due: u64,
    /// Insertion order, keeps same-tick actions FIFO
    seq: u64,
    action: TimedAction,
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire once the clock reaches `due`
    pub fn push(&mut self, due: u64, action: TimedAction) {
        log::debug!("Scheduled {:?} at tick {}", action, due);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { due, seq, action });
    }

    /// Remove and return every action due at or before `now`, in firing order
    pub fn take_due(&mut self, now: u64) -> Vec<TimedAction> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due <= now {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| (e.due, e.seq));
        due.into_iter().map(|e| e.action).collect()
    }

    /// Drop every pending action (teardown, level rebuild)
    pub fn cancel_all(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Cancelled {} pending actions", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, action: TimedAction) -> bool {
        self.entries.iter().any(|e| e.action == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_orders_by_tick_then_insertion() {
        let mut s = Schedule::new();
        s.push(10, TimedAction::Respawn);
        s.push(5, TimedAction::ArrivalStep);
        s.push(5, TimedAction::ClearMessage { serial: 1 });
        s.push(20, TimedAction::GameOver);

        assert!(s.take_due(4).is_empty());
        assert_eq!(
            s.take_due(10),
            vec![
                TimedAction::ArrivalStep,
                TimedAction::ClearMessage { serial: 1 },
                TimedAction::Respawn
            ]
        );
        assert_eq!(s.len(), 1);
        assert!(s.contains(TimedAction::GameOver));
    }

    #[test]
    fn test_cancel_all() {
        let mut s = Schedule::new();
        s.push(1, TimedAction::Respawn);
        s.cancel_all();
        assert!(s.is_empty());
        assert!(s.take_due(100).is_empty());
    }
}
