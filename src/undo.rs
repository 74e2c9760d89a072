use crate::error::Result;
use crate::model::Track;
use crate::store::{self, ItemStore, StoreDelta};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRange {
    pub start: usize,
    pub count: usize,
    /// Captured on apply so undo can reinsert the exact tracks.
    items: Vec<Track>,
}

/// A reversible structural edit. Each variant carries exactly the data
/// needed to apply the edit forward and to reconstruct the prior sequence
/// on undo; the compiler keeps the dispatch exhaustive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert {
        tracks: Vec<Track>,
        at: Option<usize>,
    },
    Remove {
        ranges: Vec<RemoveRange>,
    },
    Move {
        /// Sorted, unique source rows.
        rows: Vec<usize>,
        dest: Option<usize>,
    },
    Reorder {
        /// `new_index_of[old_row]` = new row. Exact even with duplicate
        /// tracks, unlike capturing the item lists themselves.
        new_index_of: Vec<usize>,
        label: &'static str,
    },
}

impl Command {
    pub fn remove(start: usize, count: usize) -> Self {
        Self::Remove {
            ranges: vec![RemoveRange {
                start,
                count,
                items: Vec::new(),
            }],
        }
    }

    /// Applies the edit forward, reporting the exact changes made. Ranges
    /// of a coalesced remove replay in the order they were recorded.
    pub fn apply(&mut self, store: &mut ItemStore) -> Result<Vec<StoreDelta>> {
        match self {
            Self::Insert { tracks, at } => Ok(vec![store.insert(tracks.clone(), *at)?]),
            Self::Remove { ranges } => {
                let mut deltas = Vec::with_capacity(ranges.len());
                for range in ranges.iter_mut() {
                    let (items, delta) = store.remove(range.start, range.count)?;
                    range.items = items;
                    deltas.push(delta);
                }
                Ok(deltas)
            }
            Self::Move { rows, dest } => Ok(vec![store.move_rows(rows, *dest)?]),
            Self::Reorder { new_index_of, .. } => Ok(vec![store.reorder(new_index_of)?]),
        }
    }

    /// Applies the exact inverse of the edit.
    pub fn revert(&mut self, store: &mut ItemStore) -> Result<Vec<StoreDelta>> {
        match self {
            Self::Insert { tracks, at } => {
                let start = at.unwrap_or_else(|| store.len() - tracks.len());
                let (_, delta) = store.remove(start, tracks.len())?;
                Ok(vec![delta])
            }
            Self::Remove { ranges } => {
                // Reinsert in reverse chronological order so every start row
                // is valid again by the time it is used.
                let mut deltas = Vec::with_capacity(ranges.len());
                for range in ranges.iter_mut().rev() {
                    let items = std::mem::take(&mut range.items);
                    deltas.push(store.insert(items, Some(range.start))?);
                }
                Ok(deltas)
            }
            Self::Move { rows, dest } => {
                let dest_row = dest.unwrap_or(store.len());
                let block_start = dest_row - rows.iter().filter(|&&row| row < dest_row).count();
                Ok(vec![store.unmove_rows(block_start, rows)?])
            }
            Self::Reorder { new_index_of, .. } => {
                let inverse = store::invert_permutation(new_index_of);
                Ok(vec![store.reorder(&inverse)?])
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Insert { tracks, .. } => format!("add {} songs", tracks.len()),
            Self::Remove { ranges } => {
                let total: usize = ranges.iter().map(|range| range.count).sum();
                format!("remove {total} songs")
            }
            Self::Move { rows, .. } => format!("move {} songs", rows.len()),
            Self::Reorder { label, .. } => (*label).to_string(),
        }
    }

    /// Merges an adjacent remove into this one; hands anything else back.
    fn coalesce(&mut self, other: Command) -> Option<Command> {
        match (self, other) {
            (Self::Remove { ranges }, Self::Remove { ranges: more }) => {
                ranges.extend(more);
                None
            }
            (_, other) => Some(other),
        }
    }
}

/// Linear undo log: applied commands sit below the cursor, undone ones
/// above it. Pushing while the cursor is behind the tail discards the
/// undone tail first.
#[derive(Debug, Default)]
pub struct UndoLog {
    commands: Vec<Command>,
    cursor: usize,
}

impl UndoLog {
    pub fn push(&mut self, command: Command) {
        self.commands.truncate(self.cursor);
        let command = match self.commands.last_mut() {
            Some(top) => match top.coalesce(command) {
                None => {
                    self.cursor = self.commands.len();
                    return;
                }
                Some(rejected) => rejected,
            },
            None => command,
        };
        self.commands.push(command);
        self.cursor = self.commands.len();
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    pub fn undo_text(&self) -> Option<String> {
        let last_applied = self.cursor.checked_sub(1)?;
        self.commands.get(last_applied).map(Command::describe)
    }

    pub fn redo_text(&self) -> Option<String> {
        self.commands.get(self.cursor).map(Command::describe)
    }

    /// Moves the cursor back over the most recent applied command.
    pub fn step_back(&mut self) -> Option<&mut Command> {
        self.cursor = self.cursor.checked_sub(1)?;
        self.commands.get_mut(self.cursor)
    }

    /// Moves the cursor forward over the next undone command.
    pub fn step_forward(&mut self) -> Option<&mut Command> {
        let command = self.commands.get_mut(self.cursor)?;
        self.cursor += 1;
        Some(command)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str) -> Track {
        Track {
            title: title.to_string(),
            ..Track::default()
        }
    }

    fn store_of(titles: &[&str]) -> ItemStore {
        let mut store = ItemStore::new();
        store
            .insert(titles.iter().map(|t| track(t)).collect(), None)
            .expect("seed");
        store
    }

    fn titles(store: &ItemStore) -> Vec<&str> {
        store.tracks().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn insert_command_reverts_an_append() {
        let mut store = store_of(&["a"]);
        let mut command = Command::Insert {
            tracks: vec![track("b"), track("c")],
            at: None,
        };
        command.apply(&mut store).expect("apply");
        assert_eq!(titles(&store), vec!["a", "b", "c"]);

        command.revert(&mut store).expect("revert");
        assert_eq!(titles(&store), vec!["a"]);
    }

    #[test]
    fn remove_command_captures_items_for_undo() {
        let mut store = store_of(&["a", "b", "c"]);
        let mut command = Command::remove(1, 1);
        command.apply(&mut store).expect("apply");
        assert_eq!(titles(&store), vec!["a", "c"]);

        command.revert(&mut store).expect("revert");
        assert_eq!(titles(&store), vec!["a", "b", "c"]);

        command.apply(&mut store).expect("redo");
        assert_eq!(titles(&store), vec!["a", "c"]);
    }

    #[test]
    fn coalesced_removes_undo_in_one_step() {
        let mut store = store_of(&["a", "b", "c"]);
        let mut log = UndoLog::default();

        let mut first = Command::remove(1, 1);
        first.apply(&mut store).expect("apply");
        log.push(first);

        let mut second = Command::remove(0, 2);
        second.apply(&mut store).expect("apply");
        log.push(second);

        assert!(store.is_empty());
        assert_eq!(log.undo_text().as_deref(), Some("remove 3 songs"));

        let command = log.step_back().expect("one merged command");
        command.revert(&mut store).expect("revert");
        assert_eq!(titles(&store), vec!["a", "b", "c"]);
        assert!(!log.can_undo());
    }

    #[test]
    fn move_command_round_trips() {
        let mut store = store_of(&["a", "b", "c", "d"]);
        let mut command = Command::Move {
            rows: vec![1, 3],
            dest: Some(0),
        };
        command.apply(&mut store).expect("apply");
        assert_eq!(titles(&store), vec!["b", "d", "a", "c"]);

        command.revert(&mut store).expect("revert");
        assert_eq!(titles(&store), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn push_truncates_the_redo_tail() {
        let mut store = store_of(&[]);
        let mut log = UndoLog::default();

        let mut add = Command::Insert {
            tracks: vec![track("a")],
            at: None,
        };
        add.apply(&mut store).expect("apply");
        log.push(add);

        log.step_back()
            .expect("undoable")
            .revert(&mut store)
            .expect("revert");
        assert!(log.can_redo());

        let mut other = Command::Insert {
            tracks: vec![track("b")],
            at: None,
        };
        other.apply(&mut store).expect("apply");
        log.push(other);

        assert!(!log.can_redo());
        assert_eq!(log.undo_text().as_deref(), Some("add 1 songs"));
        assert_eq!(titles(&store), vec!["b"]);
    }

    #[test]
    fn describe_matches_edit_kind() {
        assert_eq!(
            Command::Insert {
                tracks: vec![track("a"), track("b")],
                at: None
            }
            .describe(),
            "add 2 songs"
        );
        assert_eq!(Command::remove(0, 3).describe(), "remove 3 songs");
        assert_eq!(
            Command::Move {
                rows: vec![0, 1],
                dest: None
            }
            .describe(),
            "move 2 songs"
        );
        assert_eq!(
            Command::Reorder {
                new_index_of: vec![0],
                label: "shuffle songs"
            }
            .describe(),
            "shuffle songs"
        );
    }
}
