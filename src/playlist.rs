use crate::error::{Error, Result};
use crate::index::CollectionIndex;
use crate::model::{RepeatMode, Track};
use crate::nav;
use crate::position::PositionTracker;
use crate::store::{self, ItemStore, StoreDelta};
use crate::undo::{Command, UndoLog};
use log::{debug, error, trace};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceChange {
    Inserted { start: usize, count: usize },
    Removed { start: usize, count: usize },
    Reordered,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistEvent {
    CurrentChanged {
        old: Option<usize>,
        new: Option<usize>,
    },
    SequenceChanged(SequenceChange),
}

/// The sole mutation gateway for the playlist. Every edit becomes a
/// command, is applied to the store, and the reported deltas drive the
/// collection index, the position tracker, the listeners and the undo log
/// in one pass. Reading any of those after writing another outside this
/// type breaks their consistency.
#[derive(Debug)]
pub struct Playlist {
    store: ItemStore,
    index: CollectionIndex,
    position: PositionTracker,
    log: UndoLog,
    repeat_mode: RepeatMode,
    listeners: Vec<Sender<PlaylistEvent>>,
    rng: SmallRng,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self {
            store: ItemStore::new(),
            index: CollectionIndex::default(),
            position: PositionTracker::default(),
            log: UndoLog::default(),
            repeat_mode: RepeatMode::Off,
            listeners: Vec::new(),
            rng: SmallRng::from_os_rng(),
        }
    }

    // ---- queries ----------------------------------------------------

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        self.store.tracks()
    }

    pub fn track_at(&self, row: usize) -> Result<&Track> {
        self.store.get(row).ok_or(Error::OutOfRange {
            row,
            len: self.store.len(),
        })
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.store.get(self.position.current()?)
    }

    pub fn current_row(&self) -> Option<usize> {
        self.position.current()
    }

    pub fn last_played_row(&self) -> Option<usize> {
        self.position.last_played()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
    }

    pub fn next_row(&self) -> Option<usize> {
        nav::next_row(self.store.tracks(), self.position.current(), self.repeat_mode)
    }

    pub fn previous_row(&self) -> Option<usize> {
        nav::previous_row(self.store.tracks(), self.position.current(), self.repeat_mode)
    }

    /// Rows holding tracks with the given collection id, ascending.
    pub fn collection_rows(&self, id: i64) -> Vec<usize> {
        self.index.rows(id)
    }

    pub fn collection_tracks(&self, id: i64) -> Vec<&Track> {
        self.index
            .rows(id)
            .into_iter()
            .filter_map(|row| self.store.get(row))
            .collect()
    }

    // ---- current row ------------------------------------------------

    pub fn set_current_row(&mut self, row: Option<usize>) -> Result<()> {
        if let Some(row) = row
            && row >= self.store.len()
        {
            return Err(Error::OutOfRange {
                row,
                len: self.store.len(),
            });
        }

        let old = self.position.current();
        self.position.set_current(row);
        if old != row {
            self.emit(PlaylistEvent::CurrentChanged { old, new: row });
        }
        Ok(())
    }

    // ---- edits ------------------------------------------------------

    pub fn insert(&mut self, tracks: Vec<Track>, at: Option<usize>) -> Result<()> {
        if tracks.is_empty() {
            return Ok(());
        }
        debug!("insert {} tracks at {at:?}", tracks.len());
        self.run(Command::Insert { tracks, at })
    }

    pub fn append(&mut self, tracks: Vec<Track>) -> Result<()> {
        self.insert(tracks, None)
    }

    pub fn remove(&mut self, start: usize, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        debug!("remove {count} tracks at {start}");
        self.run(Command::remove(start, count))
    }

    pub fn move_rows(&mut self, rows: &[usize], dest: Option<usize>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut rows = rows.to_vec();
        rows.sort_unstable();
        rows.dedup();
        debug!("move rows {rows:?} before {dest:?}");
        self.run(Command::Move { rows, dest })
    }

    /// Replaces the order with a permutation given as `new_order[new_row] =
    /// old_row`. Undo restores the previous order verbatim.
    pub fn reorder(&mut self, new_order: &[usize]) -> Result<()> {
        store::check_permutation(new_order, self.store.len())?;
        let new_index_of = store::invert_permutation(new_order);
        self.run(Command::Reorder {
            new_index_of,
            label: "reorder songs",
        })
    }

    /// Shuffles the whole sequence as a single undoable reorder. The track
    /// that was current stays current; only its row changes.
    pub fn shuffle(&mut self) {
        let len = self.store.len();
        if len < 2 {
            return;
        }
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);
        let new_index_of = store::invert_permutation(&order);
        self.run_permutation(new_index_of, "shuffle songs");
    }

    /// Sorts the sequence by the given comparison as a single undoable
    /// reorder. Equal tracks keep their relative order.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&Track, &Track) -> Ordering) {
        if self.store.len() < 2 {
            return;
        }
        let tracks = self.store.tracks();
        let mut order: Vec<usize> = (0..tracks.len()).collect();
        order.sort_by(|&a, &b| compare(&tracks[a], &tracks[b]));
        let new_index_of = store::invert_permutation(&order);
        self.run_permutation(new_index_of, "sort songs");
    }

    /// Removes every track as one undoable command.
    pub fn clear(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        debug!("clear {len} tracks");
        if let Err(err) = self.run(Command::remove(0, len)) {
            debug_assert!(false, "clear rejected its own range: {err}");
            error!("clear rejected its own range: {err}");
        }
    }

    /// Replaces the whole playlist outside the undo history: contents,
    /// positions and the log itself are reset.
    pub fn load_without_undo(&mut self, tracks: Vec<Track>) {
        debug!("load {} tracks, dropping history", tracks.len());
        let old = self.position.current();
        self.store.replace(tracks);
        self.position.reset();
        self.index.rebuild(self.store.tracks());
        self.log.clear();
        self.emit(PlaylistEvent::SequenceChanged(SequenceChange::Reset));
        if old.is_some() {
            self.emit(PlaylistEvent::CurrentChanged { old, new: None });
        }
    }

    // ---- undo / redo ------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn undo_text(&self) -> Option<String> {
        self.log.undo_text()
    }

    pub fn redo_text(&self) -> Option<String> {
        self.log.redo_text()
    }

    pub fn undo(&mut self) -> bool {
        let old_current = self.position.current();
        let Some(command) = self.log.step_back() else {
            return false;
        };
        trace!("undo: {}", command.describe());
        match command.revert(&mut self.store) {
            Ok(deltas) => {
                self.settle(&deltas, old_current);
                true
            }
            Err(err) => {
                debug_assert!(false, "undo could not revert: {err}");
                error!("undo could not revert: {err}");
                self.log.step_forward();
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        let old_current = self.position.current();
        let Some(command) = self.log.step_forward() else {
            return false;
        };
        trace!("redo: {}", command.describe());
        match command.apply(&mut self.store) {
            Ok(deltas) => {
                self.settle(&deltas, old_current);
                true
            }
            Err(err) => {
                debug_assert!(false, "redo could not reapply: {err}");
                error!("redo could not reapply: {err}");
                self.log.step_back();
                false
            }
        }
    }

    // ---- notifications ----------------------------------------------

    /// Hands out a channel that receives every subsequent playlist event.
    /// Dropped receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> Receiver<PlaylistEvent> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    fn emit(&mut self, event: PlaylistEvent) {
        self.listeners.retain(|listener| listener.send(event).is_ok());
    }

    // ---- command pipeline -------------------------------------------

    fn run(&mut self, mut command: Command) -> Result<()> {
        let old_current = self.position.current();
        let deltas = command.apply(&mut self.store)?;
        self.settle(&deltas, old_current);
        self.log.push(command);
        Ok(())
    }

    fn run_permutation(&mut self, new_index_of: Vec<usize>, label: &'static str) {
        if let Err(err) = self.run(Command::Reorder { new_index_of, label }) {
            debug_assert!(false, "{label}: produced an invalid permutation: {err}");
            error!("{label}: produced an invalid permutation: {err}");
        }
    }

    fn settle(&mut self, deltas: &[StoreDelta], old_current: Option<usize>) {
        for delta in deltas {
            self.position.apply(delta);
        }
        self.index.rebuild(self.store.tracks());
        debug_assert!(self.index.is_consistent(self.store.tracks()));

        for delta in deltas {
            let change = match delta {
                StoreDelta::Inserted { start, count } => SequenceChange::Inserted {
                    start: *start,
                    count: *count,
                },
                StoreDelta::Removed { start, count } => SequenceChange::Removed {
                    start: *start,
                    count: *count,
                },
                StoreDelta::Permuted { .. } => SequenceChange::Reordered,
            };
            self.emit(PlaylistEvent::SequenceChanged(change));
        }

        let new_current = self.position.current();
        if new_current != old_current {
            self.emit(PlaylistEvent::CurrentChanged {
                old: old_current,
                new: new_current,
            });
        }
    }
}
