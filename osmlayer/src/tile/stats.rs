//! Tile source counters.

use std::fmt;

/// Point-in-time counters for one tile source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileSourceStats {
    /// Load requests issued since the source was created.
    pub requests_issued: u64,
    /// Loads that completed with a texture.
    pub tiles_loaded: u64,
    /// Loads that completed with an error.
    pub tiles_failed: u64,
    /// Entries removed by the cache bound.
    pub tiles_evicted: u64,
    /// Entries currently cached.
    pub cached_entries: usize,
    /// Tiles in the current cover (wrap instances counted separately).
    pub visible_tiles: usize,
}

impl TileSourceStats {
    /// Requests that have not reported an outcome yet.
    pub fn in_flight(&self) -> u64 {
        self.requests_issued
            .saturating_sub(self.tiles_loaded + self.tiles_failed)
    }
}

impl fmt::Display for TileSourceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tiles: {} visible, {} cached, {} requested, {} loaded, {} failed, {} evicted",
            self.visible_tiles,
            self.cached_entries,
            self.requests_issued,
            self.tiles_loaded,
            self.tiles_failed,
            self.tiles_evicted
        )
    }
}
