//! Tile cache entries and their load-state machine.
//!
//! ```text
//!            ┌──► Loaded(texture)
//! Pending ───┤
//!            └──► Failed(error)
//! ```
//!
//! Both end states are terminal: an entry never goes back to `Pending` and
//! never changes between `Loaded` and `Failed`.

use std::fmt;

use crate::coord::{TileCoord, TileKey};
use crate::error::LoadError;

/// Load state of a cached tile, carrying the texture once loaded.
#[derive(Debug)]
pub enum TileState<T> {
    /// A load request is in flight.
    Pending,
    /// The texture is available for drawing.
    Loaded(T),
    /// The load failed; the tile is never drawn.
    Failed(LoadError),
}

impl<T> TileState<T> {
    /// The state without its payload.
    pub fn load_state(&self) -> LoadState {
        match self {
            TileState::Pending => LoadState::Pending,
            TileState::Loaded(_) => LoadState::Loaded,
            TileState::Failed(_) => LoadState::Failed,
        }
    }
}

/// Payload-free view of [`TileState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Pending => write!(f, "pending"),
            LoadState::Loaded => write!(f, "loaded"),
            LoadState::Failed => write!(f, "failed"),
        }
    }
}

/// One cached tile.
///
/// Owns its texture handle; dropping the entry releases the texture.
#[derive(Debug)]
pub struct TileCacheEntry<T> {
    coord: TileCoord,
    state: TileState<T>,
    last_covered: u64,
}

impl<T> TileCacheEntry<T> {
    /// A new entry awaiting its load, first covered in `generation`.
    pub(crate) fn pending(coord: TileCoord, generation: u64) -> Self {
        Self {
            coord,
            state: TileState::Pending,
            last_covered: generation,
        }
    }

    /// The coordinate that first made this tile visible.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Cache key of this entry.
    pub fn key(&self) -> TileKey {
        self.coord.key()
    }

    pub fn state(&self) -> &TileState<T> {
        &self.state
    }

    pub fn load_state(&self) -> LoadState {
        self.state.load_state()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, TileState::Loaded(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TileState::Pending)
    }

    /// The texture, if loaded.
    pub fn texture(&self) -> Option<&T> {
        match &self.state {
            TileState::Loaded(texture) => Some(texture),
            _ => None,
        }
    }

    /// The load failure, if failed.
    pub fn error(&self) -> Option<&LoadError> {
        match &self.state {
            TileState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Visibility generation this entry was last part of the cover in.
    pub fn last_covered(&self) -> u64 {
        self.last_covered
    }

    pub(crate) fn touch(&mut self, generation: u64) {
        self.last_covered = self.last_covered.max(generation);
    }

    /// Apply a load outcome.
    ///
    /// Returns `false`, leaving the entry untouched, unless the entry is
    /// still `Pending`.
    pub(crate) fn complete(&mut self, result: Result<T, LoadError>) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.state = match result {
            Ok(texture) => TileState::Loaded(texture),
            Err(error) => TileState::Failed(error),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> TileCacheEntry<&'static str> {
        TileCacheEntry::pending(TileCoord::new(2, 1, 1, 0), 1)
    }

    #[test]
    fn test_new_entry_is_pending() {
        let entry = entry();
        assert_eq!(entry.load_state(), LoadState::Pending);
        assert!(entry.texture().is_none());
        assert!(entry.error().is_none());
        assert_eq!(entry.key().to_string(), "tile:2:1:1");
    }

    #[test]
    fn test_pending_to_loaded() {
        let mut entry = entry();
        assert!(entry.complete(Ok("T")));
        assert!(entry.is_loaded());
        assert_eq!(entry.texture(), Some(&"T"));
    }

    #[test]
    fn test_pending_to_failed() {
        let mut entry = entry();
        assert!(entry.complete(Err(LoadError::Abandoned)));
        assert_eq!(entry.load_state(), LoadState::Failed);
        assert_eq!(entry.error(), Some(&LoadError::Abandoned));
    }

    #[test]
    fn test_loaded_is_terminal() {
        let mut entry = entry();
        assert!(entry.complete(Ok("first")));
        assert!(!entry.complete(Ok("second")));
        assert!(!entry.complete(Err(LoadError::Abandoned)));
        assert_eq!(entry.texture(), Some(&"first"));
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut entry = entry();
        assert!(entry.complete(Err(LoadError::Decode("bad".into()))));
        assert!(!entry.complete(Ok("late")));
        assert_eq!(entry.load_state(), LoadState::Failed);
        assert!(entry.texture().is_none());
    }

    #[test]
    fn test_touch_never_moves_backward() {
        let mut entry = entry();
        entry.touch(5);
        entry.touch(3);
        assert_eq!(entry.last_covered(), 5);
    }

    #[test]
    fn test_load_state_display() {
        assert_eq!(LoadState::Pending.to_string(), "pending");
        assert_eq!(LoadState::Loaded.to_string(), "loaded");
        assert_eq!(LoadState::Failed.to_string(), "failed");
    }
}
