//! Tile cache and visibility tracking.

mod entry;
mod source;
mod stats;

pub use entry::{LoadState, TileCacheEntry, TileState};
pub use source::{TileSource, VisibleTile};
pub use stats::TileSourceStats;

#[cfg(test)]
pub use source::tests::{options as test_options, viewport_for, FakeHost, ManualLoader};
