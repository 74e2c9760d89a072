use crate::error::{Error, Result};
use crate::model::Track;

/// Exact report of what a structural mutation did, in before/after terms.
/// Downstream state (position tracker, collection index, listeners) is
/// updated from these instead of re-deriving the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreDelta {
    Inserted { start: usize, count: usize },
    Removed { start: usize, count: usize },
    /// The sequence was permuted; `new_index_of[old_row]` is the row the
    /// track previously at `old_row` now occupies.
    Permuted { new_index_of: Vec<usize> },
}

/// Ordered, index-addressable ground truth for playlist contents. Rows are
/// dense and 0-based; every failure is rejected before any mutation.
#[derive(Debug, Default)]
pub struct ItemStore {
    tracks: Vec<Track>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, row: usize) -> Option<&Track> {
        self.tracks.get(row)
    }

    /// Inserts `items` as a contiguous block before `at`; `None` appends.
    pub fn insert(&mut self, items: Vec<Track>, at: Option<usize>) -> Result<StoreDelta> {
        let len = self.tracks.len();
        let start = at.unwrap_or(len);
        if start > len {
            return Err(Error::OutOfRange { row: start, len });
        }

        let count = items.len();
        self.tracks.splice(start..start, items);
        Ok(StoreDelta::Inserted { start, count })
    }

    /// Removes `count` rows starting at `start`, returning them in order.
    pub fn remove(&mut self, start: usize, count: usize) -> Result<(Vec<Track>, StoreDelta)> {
        let len = self.tracks.len();
        let end = start
            .checked_add(count)
            .filter(|end| *end <= len)
            .ok_or(Error::BadRange { start, count, len })?;

        let removed: Vec<Track> = self.tracks.drain(start..end).collect();
        Ok((removed, StoreDelta::Removed { start, count }))
    }

    /// Moves the tracks at `rows` into a contiguous block immediately before
    /// the post-removal position of `dest` (`None` appends). Duplicate and
    /// unsorted rows are normalized first.
    pub fn move_rows(&mut self, rows: &[usize], dest: Option<usize>) -> Result<StoreDelta> {
        let len = self.tracks.len();
        let mut sources = rows.to_vec();
        sources.sort_unstable();
        sources.dedup();

        if let Some(&row) = sources.last()
            && row >= len
        {
            return Err(Error::OutOfRange { row, len });
        }
        let dest = dest.unwrap_or(len);
        if dest > len {
            return Err(Error::OutOfRange { row: dest, len });
        }

        let insert_at = dest - sources.iter().filter(|&&row| row < dest).count();
        let count = sources.len();

        let mut new_index_of = vec![usize::MAX; len];
        for (offset, &row) in sources.iter().enumerate() {
            new_index_of[row] = insert_at + offset;
        }
        let mut slot = 0;
        for row in 0..len {
            if new_index_of[row] != usize::MAX {
                continue;
            }
            if slot == insert_at {
                slot += count;
            }
            new_index_of[row] = slot;
            slot += 1;
        }

        self.permute(&new_index_of);
        Ok(StoreDelta::Permuted { new_index_of })
    }

    /// Inverse of [`move_rows`](Self::move_rows): spreads the contiguous
    /// block at `start` back to the scattered `dest_rows` (sorted, unique).
    pub fn unmove_rows(&mut self, start: usize, dest_rows: &[usize]) -> Result<StoreDelta> {
        let len = self.tracks.len();
        let count = dest_rows.len();
        if start
            .checked_add(count)
            .filter(|end| *end <= len)
            .is_none()
        {
            return Err(Error::BadRange { start, count, len });
        }
        if let Some(&row) = dest_rows.last()
            && row >= len
        {
            return Err(Error::OutOfRange { row, len });
        }

        let mut new_index_of = vec![usize::MAX; len];
        for (offset, &target) in dest_rows.iter().enumerate() {
            new_index_of[start + offset] = target;
        }

        // Survivors fill the remaining rows in order.
        let mut targets = (0..len).filter(|row| dest_rows.binary_search(row).is_err());
        for row in 0..len {
            if row >= start && row < start + count {
                continue;
            }
            let Some(target) = targets.next() else {
                return Err(Error::NotAPermutation { len });
            };
            new_index_of[row] = target;
        }

        self.permute(&new_index_of);
        Ok(StoreDelta::Permuted { new_index_of })
    }

    /// Replaces the order with the given permutation;
    /// `new_index_of[old_row]` names the new row of each track.
    pub fn reorder(&mut self, new_index_of: &[usize]) -> Result<StoreDelta> {
        check_permutation(new_index_of, self.tracks.len())?;
        self.permute(new_index_of);
        Ok(StoreDelta::Permuted {
            new_index_of: new_index_of.to_vec(),
        })
    }

    /// Wholesale replacement, outside any history. Used by non-undoable
    /// loads only.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    fn permute(&mut self, new_index_of: &[usize]) {
        let old = std::mem::take(&mut self.tracks);
        let mut pairs: Vec<(usize, Track)> = new_index_of.iter().copied().zip(old).collect();
        pairs.sort_unstable_by_key(|(new_row, _)| *new_row);
        self.tracks = pairs.into_iter().map(|(_, track)| track).collect();
    }
}

pub(crate) fn check_permutation(map: &[usize], len: usize) -> Result<()> {
    if map.len() != len {
        return Err(Error::NotAPermutation { len });
    }
    let mut seen = vec![false; len];
    for &row in map {
        if row >= len || seen[row] {
            return Err(Error::NotAPermutation { len });
        }
        seen[row] = true;
    }
    Ok(())
}

/// Inverts a valid permutation map.
pub(crate) fn invert_permutation(map: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; map.len()];
    for (from, &to) in map.iter().enumerate() {
        inverse[to] = from;
    }
    inverse
}
