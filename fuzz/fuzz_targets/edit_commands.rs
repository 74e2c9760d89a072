#![no_main]

use libfuzzer_sys::fuzz_target;
use setlist::{Playlist, RepeatMode, Track};

fuzz_target!(|data: &[u8]| {
    let mut playlist = Playlist::new();

    let mut bytes = data.iter().copied();
    while let Some(op) = bytes.next() {
        let arg = usize::from(bytes.next().unwrap_or(0));
        match op % 10 {
            0 => {
                let tracks = (0..(arg % 4) + 1)
                    .map(|n| Track {
                        title: format!("track_{n}"),
                        collection_id: Some((n % 3) as i64),
                        ..Track::default()
                    })
                    .collect();
                let _ = playlist.insert(tracks, Some(arg % (playlist.len() + 1)));
            }
            1 => {
                let _ = playlist.remove(arg % 32, (arg / 32) + 1);
            }
            2 => {
                let rows = [arg % 16, (arg / 16) % 16];
                let _ = playlist.move_rows(&rows, None);
            }
            3 => playlist.shuffle(),
            4 => {
                let _ = playlist.set_current_row(Some(arg % 32));
            }
            5 => {
                let _ = playlist.set_current_row(None);
            }
            6 => {
                playlist.undo();
            }
            7 => {
                playlist.redo();
            }
            8 => {
                let mode = match arg % 4 {
                    0 => RepeatMode::Off,
                    1 => RepeatMode::Track,
                    2 => RepeatMode::Album,
                    _ => RepeatMode::Playlist,
                };
                playlist.set_repeat_mode(mode);
                let _ = playlist.next_row();
                let _ = playlist.previous_row();
            }
            _ => playlist.clear(),
        }

        if let Some(row) = playlist.current_row() {
            assert!(row < playlist.len());
        }
        if let Some(row) = playlist.last_played_row() {
            assert!(row < playlist.len());
        }
    }
});
