//! osmlayer - Raster slippy-map tiles as a custom layer of a map viewer
//!
//! The crate computes which `z/x/y` tiles cover the viewport, loads them
//! asynchronously into a per-layer texture cache, and draws every loaded tile
//! with its own projection matrix through the host's custom-layer protocol.
//!
//! # Architecture
//!
//! ```text
//! MapHost ──viewport──► TileSource ──cover──► cover::cover
//!    ▲                      │  ▲
//!    │ repaint              │  └── LoadCompletion ◄── TileLoader (HttpTileLoader)
//!    │                      ▼
//!    └──────────── RasterTileLayer ──draw_tile(texture, matrix)──► TileRenderer
//! ```
//!
//! - [`cover`]: tiles intersecting the viewport quad, world copies included
//! - [`projection`]: per-tile matrices from the camera transform
//! - [`tile`]: cache entries, their load-state machine, and the tile source
//! - [`loader`]: the loader seam plus the HTTP implementation
//! - [`layer`]: the custom-layer protocol and the raster layer
//!
//! # Example
//!
//! ```ignore
//! use osmlayer::{HttpTileLoader, LayerOptions, RasterTileLayer};
//!
//! let options = LayerOptions::new("osm", "https://{s}.tile.example.org/{z}/{x}/{y}.png");
//! let loader = HttpTileLoader::from_options(&options, runtime.handle().clone())?;
//! let mut layer = RasterTileLayer::new(options, loader)?;
//! layer.on_add(host, &mut gpu)?;
//! ```

pub mod config;
pub mod coord;
pub mod cover;
pub mod error;
pub mod host;
pub mod layer;
pub mod loader;
pub mod logging;
pub mod projection;
pub mod tile;

pub use config::LayerOptions;
pub use coord::{LngLat, MercatorPoint, TileCoord, TileKey};
pub use error::{LayerError, LoadError};
pub use host::{CoverQuery, MapHost, Viewport};
pub use layer::{CustomLayer, RasterTileLayer, TileRenderer};
pub use loader::{
    AsyncHttpClient, HttpTileLoader, LoadCompletion, LoadOutcome, ReqwestClient, TileImage,
    TileLoadRequest, TileLoader, UrlTemplate,
};
pub use projection::CameraProjection;
pub use tile::{LoadState, TileCacheEntry, TileSource, TileSourceStats, TileState, VisibleTile};
