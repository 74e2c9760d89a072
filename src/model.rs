use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    Track,
    Album,
    Playlist,
}

impl RepeatMode {
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::Track,
            Self::Track => Self::Album,
            Self::Album => Self::Playlist,
            Self::Playlist => Self::Off,
        }
    }
}

/// A playable entry. A track carries no position of its own; position is
/// solely the slot it occupies in the playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Track {
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub duration_secs: u32,
    /// Stable id of the collection record this track came from, if any.
    #[serde(default)]
    pub collection_id: Option<i64>,
}
