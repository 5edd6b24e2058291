//! Host map viewer interface.
//!
//! The layer never reaches into the viewer's internals. Everything it
//! consumes from the host goes through [`MapHost`], injected when the layer
//! is added:
//!
//! - viewport query (zoom and corner coordinates)
//! - camera projection
//! - repaint requests
//! - optionally, the host's own tile-index service and per-tile matrices

use glam::DMat4;

use crate::coord::{LngLat, TileCoord};
use crate::projection::CameraProjection;

/// The visible area of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Fractional camera zoom.
    pub zoom: f64,
    /// Corners in order: top-left, top-right, bottom-right, bottom-left.
    pub corners: [LngLat; 4],
}

impl Viewport {
    pub fn new(zoom: f64, corners: [LngLat; 4]) -> Self {
        Self { zoom, corners }
    }

    /// Axis-aligned viewport spanning the given longitude and latitude ranges.
    pub fn from_bounds(zoom: f64, west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            zoom,
            corners: [
                LngLat::new(west, north),
                LngLat::new(east, north),
                LngLat::new(east, south),
                LngLat::new(west, south),
            ],
        }
    }
}

/// Arguments of a tile-index query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverQuery {
    /// Integer zoom tiles are selected at.
    pub floored_zoom: u8,
    /// The viewport being covered.
    pub viewport: Viewport,
    /// Whether tiles from repeated world copies may be returned.
    pub wrap_allowed: bool,
}

/// Operations the layer consumes from the host map viewer.
///
/// Implementations must be cheap to call: the viewport and camera are
/// queried on every viewport change and every frame.
pub trait MapHost: Send + Sync {
    /// Current zoom and viewport corners.
    fn viewport(&self) -> Viewport;

    /// Current camera transform.
    fn camera(&self) -> CameraProjection;

    /// Ask the host to schedule another frame. Fire-and-forget.
    fn trigger_repaint(&self);

    /// Host tile-index service.
    ///
    /// Returning `None` makes the layer compute the cover itself.
    fn cover_tiles(&self, _query: &CoverQuery) -> Option<Vec<TileCoord>> {
        None
    }

    /// The host's own matrix for a tile, if its texture pipeline supplies one.
    ///
    /// Returning `None` makes the layer build the matrix itself.
    fn tile_matrix(&self, _tile: &TileCoord) -> Option<DMat4> {
        None
    }
}
