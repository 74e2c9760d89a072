use crate::model::Track;
use std::collections::{BTreeSet, HashMap};

/// Maps collection ids to the set of rows currently holding a track with
/// that id. Rebuilt wholesale after every structural change; playlist sizes
/// are interactive-scale, so the rebuild is cheap and cannot drift.
#[derive(Debug, Default)]
pub struct CollectionIndex {
    rows_by_id: HashMap<i64, BTreeSet<usize>>,
}

impl CollectionIndex {
    pub fn rebuild(&mut self, tracks: &[Track]) {
        self.rows_by_id.clear();
        for (row, track) in tracks.iter().enumerate() {
            if let Some(id) = track.collection_id {
                self.rows_by_id.entry(id).or_default().insert(row);
            }
        }
    }

    pub fn clear(&mut self) {
        self.rows_by_id.clear();
    }

    /// Rows holding tracks with the given id, ascending. Unknown ids yield
    /// an empty list, never an error.
    pub fn rows(&self, id: i64) -> Vec<usize> {
        self.rows_by_id
            .get(&id)
            .map(|rows| rows.iter().copied().collect())
            .unwrap_or_default()
    }

    /// True when the index agrees with the sequence in both directions.
    pub fn is_consistent(&self, tracks: &[Track]) -> bool {
        for (id, rows) in &self.rows_by_id {
            for &row in rows {
                if tracks.get(row).and_then(|t| t.collection_id) != Some(*id) {
                    return false;
                }
            }
        }
        tracks.iter().enumerate().all(|(row, track)| {
            track.collection_id.is_none_or(|id| {
                self.rows_by_id
                    .get(&id)
                    .is_some_and(|rows| rows.contains(&row))
            })
        })
    }
}
