use crate::store::StoreDelta;

/// Owns the current and last-played rows and keeps them meaningful across
/// every structural change. `None` means nothing is current; the last-played
/// row survives a stop so callers can still show what was playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionTracker {
    current: Option<usize>,
    last_played: Option<usize>,
}

impl PositionTracker {
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn last_played(&self) -> Option<usize> {
        self.last_played
    }

    pub fn set_current(&mut self, row: Option<usize>) {
        self.current = row;
        if row.is_some() {
            self.last_played = row;
        }
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.last_played = None;
    }

    /// Translates both pointers through a structural change. The two rows
    /// follow the same rules independently; they can diverge because the
    /// current row may already be unset while last-played still holds.
    pub fn apply(&mut self, delta: &StoreDelta) {
        self.current = adjust(self.current, delta);
        self.last_played = adjust(self.last_played, delta);
    }
}

fn adjust(row: Option<usize>, delta: &StoreDelta) -> Option<usize> {
    let row = row?;
    match delta {
        StoreDelta::Inserted { start, count } => {
            if row >= *start {
                Some(row + count)
            } else {
                Some(row)
            }
        }
        StoreDelta::Removed { start, count } => {
            if row >= start + count {
                Some(row - count)
            } else if row >= *start {
                // The pointed-at track itself was deleted.
                None
            } else {
                Some(row)
            }
        }
        // Permutations move the track, not the slot; follow the track.
        StoreDelta::Permuted { new_index_of } => new_index_of.get(row).copied(),
    }
}
