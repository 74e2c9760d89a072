pub mod error;
pub mod index;
pub mod model;
pub mod nav;
pub mod playlist;
pub mod position;
pub mod store;
pub mod undo;

pub use crate::error::Error;
pub use crate::model::{RepeatMode, Track};
pub use crate::playlist::{Playlist, PlaylistEvent, SequenceChange};
