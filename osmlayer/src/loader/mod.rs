//! Tile image loading.
//!
//! A [`TileLoader`] turns a tile request into a texture handle, asynchronously.
//! Each request carries a single-shot [`LoadCompletion`]; the loader reports
//! the outcome through it exactly once, from any thread, and the owning
//! [`TileSource`](crate::tile::TileSource) applies it on its own execution
//! context.
//!
//! ```text
//! TileSource ──load_tile(request, completion)──► TileLoader
//!     ▲                                              │ (async fetch + decode)
//!     └──────────── mpsc ◄── completion.complete() ──┘
//! ```

mod http;
mod url;

pub use http::{AsyncHttpClient, HttpTileLoader, ReqwestClient, TileImage};
pub use url::UrlTemplate;

#[cfg(test)]
pub use http::tests::MockHttpClient;

use tokio::sync::mpsc;
use tracing::debug;

use crate::coord::TileCoord;
use crate::error::LoadError;

/// One tile's load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLoadRequest {
    /// The tile to fetch. The world copy is irrelevant to the imagery.
    pub coord: TileCoord,
    /// Expected edge length of the decoded image in pixels.
    pub tile_size: u32,
}

/// Outcome of one load, delivered back to the tile source.
#[derive(Debug)]
pub struct LoadOutcome<T> {
    pub coord: TileCoord,
    pub result: Result<T, LoadError>,
}

/// Single-shot completion handle for one load request.
///
/// Calling [`complete`](Self::complete) consumes the handle. A handle dropped
/// without completing reports [`LoadError::Abandoned`], so every request
/// produces exactly one outcome.
#[derive(Debug)]
pub struct LoadCompletion<T> {
    coord: TileCoord,
    sender: Option<mpsc::UnboundedSender<LoadOutcome<T>>>,
}

impl<T> LoadCompletion<T> {
    pub(crate) fn new(coord: TileCoord, sender: mpsc::UnboundedSender<LoadOutcome<T>>) -> Self {
        Self {
            coord,
            sender: Some(sender),
        }
    }

    /// The tile this completion belongs to.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Report the load outcome.
    pub fn complete(mut self, result: Result<T, LoadError>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<T, LoadError>) {
        if let Some(sender) = self.sender.take() {
            let outcome = LoadOutcome {
                coord: self.coord,
                result,
            };
            if sender.send(outcome).is_err() {
                // Source was removed; the texture is simply dropped.
                debug!(key = %self.coord.key(), "Tile source gone, discarding load outcome");
            }
        }
    }
}

impl<T> Drop for LoadCompletion<T> {
    fn drop(&mut self) {
        if self.sender.is_some() {
            self.send(Err(LoadError::Abandoned));
        }
    }
}

/// Image-loading collaborator.
///
/// `load_tile` must return without blocking and arrange for `completion` to
/// be completed (or dropped) later.
pub trait TileLoader {
    /// Texture handle produced by a successful load.
    type Texture;

    /// Start loading one tile.
    fn load_tile(&self, request: TileLoadRequest, completion: LoadCompletion<Self::Texture>);
}
