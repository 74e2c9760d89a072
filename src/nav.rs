use crate::model::{RepeatMode, Track};

/// Row to play after `current` under the given repeat mode. Pure; reads
/// the sequence and decides nothing about playback itself. With nothing
/// current and a non-empty sequence, playback starts at the first row.
pub fn next_row(tracks: &[Track], current: Option<usize>, mode: RepeatMode) -> Option<usize> {
    if tracks.is_empty() {
        return None;
    }
    let Some(current) = current.filter(|row| *row < tracks.len()) else {
        return Some(0);
    };

    match mode {
        RepeatMode::Off => {
            let next = current + 1;
            (next < tracks.len()).then_some(next)
        }
        RepeatMode::Track => Some(current),
        RepeatMode::Playlist => Some((current + 1) % tracks.len()),
        RepeatMode::Album => next_in_album(tracks, current),
    }
}

/// Row played before `current` under the given repeat mode.
pub fn previous_row(tracks: &[Track], current: Option<usize>, mode: RepeatMode) -> Option<usize> {
    if tracks.is_empty() {
        return None;
    }
    let current = current.filter(|row| *row < tracks.len())?;

    match mode {
        RepeatMode::Off => current.checked_sub(1),
        RepeatMode::Track => Some(current),
        RepeatMode::Playlist => Some((current + tracks.len() - 1) % tracks.len()),
        RepeatMode::Album => previous_in_album(tracks, current),
    }
}

// Album membership is metadata equality, not adjacency: the scan wraps and
// lands back on `current` only when it is the sole track of its album.
fn next_in_album(tracks: &[Track], current: usize) -> Option<usize> {
    let album = tracks[current].album.as_deref();
    let len = tracks.len();
    (1..=len)
        .map(|offset| (current + offset) % len)
        .find(|&row| tracks[row].album.as_deref() == album)
}

fn previous_in_album(tracks: &[Track], current: usize) -> Option<usize> {
    let album = tracks[current].album.as_deref();
    let len = tracks.len();
    (1..=len)
        .map(|offset| (current + len - offset) % len)
        .find(|&row| tracks[row].album.as_deref() == album)
}
