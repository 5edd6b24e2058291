//! Tile source: the tile cache and the visibility driver.
//!
//! The source owns every [`TileCacheEntry`] of one layer. On each viewport
//! change it recomputes the cover, creates a `Pending` entry and issues one
//! load request per tile key it has never seen, and remembers the cover for
//! the renderer. Load outcomes arrive through a channel and are applied on the
//! source's own execution context, so the cache needs no locking.
//!
//! # Cache policy
//!
//! Entries are keyed by [`TileKey`], so world copies of a tile share one
//! texture. By default the cache only grows. With
//! [`LayerOptions::max_cached_tiles`] set, entries outside the current cover
//! are evicted least-recently-covered first; `Pending` entries are never
//! evicted, so a tile is never requested twice while a load is in flight.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::entry::{LoadState, TileCacheEntry};
use super::stats::TileSourceStats;
use crate::config::LayerOptions;
use crate::coord::{TileCoord, TileKey};
use crate::cover;
use crate::error::LoadError;
use crate::host::{CoverQuery, MapHost, Viewport};
use crate::loader::{LoadCompletion, LoadOutcome, TileLoadRequest, TileLoader};

/// A tile in the current cover together with its cache entry.
///
/// `coord` carries this instance's world copy; `entry` is shared between all
/// copies of the same tile.
#[derive(Debug)]
pub struct VisibleTile<'a, T> {
    pub coord: TileCoord,
    pub entry: &'a TileCacheEntry<T>,
}

/// Owns the tile cache of one layer and keeps it in sync with the viewport.
pub struct TileSource<L: TileLoader> {
    options: LayerOptions,
    host: Arc<dyn MapHost>,
    loader: L,
    cache: HashMap<TileKey, TileCacheEntry<L::Texture>>,
    visible: Vec<TileCoord>,
    generation: u64,
    sender: mpsc::UnboundedSender<LoadOutcome<L::Texture>>,
    receiver: mpsc::UnboundedReceiver<LoadOutcome<L::Texture>>,
    stats: TileSourceStats,
}

impl<L: TileLoader> TileSource<L> {
    /// Create an empty source.
    pub fn new(options: LayerOptions, host: Arc<dyn MapHost>, loader: L) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            options,
            host,
            loader,
            cache: HashMap::new(),
            visible: Vec::new(),
            generation: 0,
            sender,
            receiver,
            stats: TileSourceStats::default(),
        }
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    pub fn host(&self) -> &Arc<dyn MapHost> {
        &self.host
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Drop the cache, releasing every texture, and hand back the loader.
    pub fn into_loader(self) -> L {
        self.loader
    }

    /// Recompute visibility for the host's current viewport.
    ///
    /// Issues one load request per newly visible tile key and returns how
    /// many were issued. Calling it again with an unchanged viewport issues
    /// none. Tiles that left the viewport stay cached.
    pub fn on_viewport_changed(&mut self) -> usize {
        self.process_completions();

        let viewport = self.host.viewport();
        let covering = self.compute_cover(&viewport);

        self.generation += 1;
        let generation = self.generation;

        let mut requests = Vec::new();
        for coord in &covering {
            match self.cache.entry(coord.key()) {
                Entry::Occupied(mut occupied) => occupied.get_mut().touch(generation),
                Entry::Vacant(vacant) => {
                    vacant.insert(TileCacheEntry::pending(*coord, generation));
                    requests.push(*coord);
                }
            }
        }

        for coord in &requests {
            self.request(*coord);
        }
        self.visible = covering;
        self.evict();

        debug!(
            zoom = viewport.zoom,
            visible = self.visible.len(),
            requested = requests.len(),
            cached = self.cache.len(),
            "Viewport updated"
        );
        requests.len()
    }

    /// Tiles of the most recent cover, in cover order.
    ///
    /// Includes tiles that are still loading or failed; callers draw only
    /// loaded ones.
    pub fn visible_tiles(&self) -> Vec<VisibleTile<'_, L::Texture>> {
        self.visible
            .iter()
            .filter_map(|coord| {
                self.cache.get(&coord.key()).map(|entry| VisibleTile {
                    coord: *coord,
                    entry,
                })
            })
            .collect()
    }

    /// Coordinates of the most recent cover.
    pub fn visible_coords(&self) -> &[TileCoord] {
        &self.visible
    }

    /// Load completion callback.
    ///
    /// Moves the tile's entry from `Pending` to `Loaded` or `Failed` and asks
    /// the host for a repaint. Outcomes for tiles that are not cached or not
    /// pending are ignored. Returns whether the entry changed state.
    pub fn handle_load_complete(
        &mut self,
        coord: TileCoord,
        result: Result<L::Texture, LoadError>,
    ) -> bool {
        let key = coord.key();
        let Some(entry) = self.cache.get_mut(&key) else {
            debug!(key = %key, "Ignoring load outcome for uncached tile");
            return false;
        };

        if !entry.complete(result) {
            warn!(key = %key, state = %entry.load_state(), "Ignoring repeated load outcome");
            return false;
        }

        match entry.error() {
            Some(error) => {
                self.stats.tiles_failed += 1;
                warn!(key = %key, error = %error, "Tile load failed");
            }
            None => {
                self.stats.tiles_loaded += 1;
                debug!(key = %key, "Tile loaded");
            }
        }

        self.host.trigger_repaint();
        true
    }

    /// Apply every load outcome delivered so far, without waiting.
    ///
    /// Returns the number of entries that changed state.
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.receiver.try_recv() {
            if self.handle_load_complete(outcome.coord, outcome.result) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next load outcome and apply it.
    ///
    /// Returns whether an entry changed state.
    pub async fn wait_for_completion(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(outcome) => self.handle_load_complete(outcome.coord, outcome.result),
            None => false,
        }
    }

    /// The cached entry for a tile key.
    pub fn entry(&self, key: &TileKey) -> Option<&TileCacheEntry<L::Texture>> {
        self.cache.get(key)
    }

    /// Number of cached entries.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Count of cached entries in the given state.
    pub fn count_in_state(&self, state: LoadState) -> usize {
        self.cache
            .values()
            .filter(|entry| entry.load_state() == state)
            .count()
    }

    pub fn stats(&self) -> TileSourceStats {
        TileSourceStats {
            cached_entries: self.cache.len(),
            visible_tiles: self.visible.len(),
            ..self.stats
        }
    }

    fn compute_cover(&self, viewport: &Viewport) -> Vec<TileCoord> {
        let Some(floored_zoom) =
            cover::floored_zoom(viewport.zoom, self.options.min_zoom, self.options.max_zoom)
        else {
            debug!(zoom = viewport.zoom, "Unusable viewport zoom, nothing visible");
            return Vec::new();
        };

        let wrap_allowed = self.options.render_world_copies;
        let query = CoverQuery {
            floored_zoom,
            viewport: *viewport,
            wrap_allowed,
        };

        match self.host.cover_tiles(&query) {
            Some(tiles) => {
                let mut seen = HashSet::new();
                tiles
                    .into_iter()
                    .filter(|t| t.zoom == floored_zoom && (wrap_allowed || t.wrap == 0))
                    .filter(|t| match TileCoord::try_new(t.zoom, t.x, t.y, t.wrap) {
                        Ok(_) => true,
                        Err(e) => {
                            debug!(tile = %t, error = %e, "Dropping host tile outside the grid");
                            false
                        }
                    })
                    .filter(|t| seen.insert(*t))
                    .collect()
            }
            None => cover::cover(
                floored_zoom,
                cover::project_corners(&viewport.corners),
                viewport.zoom,
                wrap_allowed,
            ),
        }
    }

    fn request(&mut self, coord: TileCoord) {
        self.stats.requests_issued += 1;
        self.loader.load_tile(
            TileLoadRequest {
                coord,
                tile_size: self.options.tile_size,
            },
            LoadCompletion::new(coord, self.sender.clone()),
        );
    }

    fn evict(&mut self) {
        let Some(max) = self.options.max_cached_tiles else {
            return;
        };
        if self.cache.len() <= max {
            return;
        }

        let generation = self.generation;
        let mut candidates: Vec<(u64, TileKey)> = self
            .cache
            .iter()
            .filter(|(_, entry)| !entry.is_pending() && entry.last_covered() < generation)
            .map(|(key, entry)| (entry.last_covered(), *key))
            .collect();
        candidates.sort_unstable();

        let excess = self.cache.len() - max;
        let mut evicted = 0;
        for (_, key) in candidates.into_iter().take(excess) {
            self.cache.remove(&key);
            evicted += 1;
        }
        self.stats.tiles_evicted += evicted;

        debug!(
            evicted,
            cached = self.cache.len(),
            max,
            "Evicted tiles outside the viewport"
        );
    }
}
