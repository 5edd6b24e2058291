//! Coordinate type definitions

use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.051128779806;
pub const MAX_LAT: f64 = 85.051128779806;

/// Zoom range supported by slippy-map tile servers
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 24;

/// Identifies one raster tile in the Web Mercator quadtree.
///
/// `wrap` counts horizontal world copies: `0` is the primary world, `-1` the
/// copy to the west, `1` the copy to the east. Two coordinates are equal only
/// if all four fields match; use [`TileCoord::key`] to compare the imagery
/// they show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level
    pub zoom: u8,
    /// X coordinate (east-west), 0 at the antimeridian
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
    /// World copy index
    pub wrap: i32,
}

impl TileCoord {
    /// Create a tile coordinate without range checks.
    pub const fn new(zoom: u8, x: u32, y: u32, wrap: i32) -> Self {
        Self { zoom, x, y, wrap }
    }

    /// Create a tile coordinate, rejecting values outside the zoom's grid.
    pub fn try_new(zoom: u8, x: u32, y: u32, wrap: i32) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let n = tiles_per_axis(zoom);
        if x >= n {
            return Err(CoordError::OutOfGrid { zoom, value: x });
        }
        if y >= n {
            return Err(CoordError::OutOfGrid { zoom, value: y });
        }
        Ok(Self { zoom, x, y, wrap })
    }

    /// Cache key for this tile, ignoring the world copy.
    #[inline]
    pub fn key(&self) -> TileKey {
        TileKey {
            zoom: self.zoom,
            x: self.x,
            y: self.y,
        }
    }

    /// Column index across world copies (`x + wrap * 2^zoom`).
    #[inline]
    pub fn unwrapped_x(&self) -> i64 {
        self.x as i64 + self.wrap as i64 * tiles_per_axis(self.zoom) as i64
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)?;
        if self.wrap != 0 {
            write!(f, "@{}", self.wrap)?;
        }
        Ok(())
    }
}

/// Cache index for a tile: `(zoom, x, y)` without the world copy.
///
/// Tiles that differ only in `wrap` show the same imagery and share one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    /// The coordinate for this key in the primary world copy.
    pub fn to_coord(&self) -> TileCoord {
        TileCoord::new(self.zoom, self.x, self.y, 0)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile:{}:{}:{}", self.zoom, self.x, self.y)
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Position in normalised Web Mercator world units.
///
/// `[0, 1]` spans one world copy; `x` grows east and `y` grows south.
/// Values of `x` outside `[0, 1]` lie in neighbouring world copies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorPoint {
    pub x: f64,
    pub y: f64,
}

impl MercatorPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Number of tiles along one axis at the given zoom.
#[inline]
pub const fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom
}

/// Coordinate errors
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Zoom level is outside valid range (0 to 24)
    InvalidZoom(u8),
    /// Tile column or row does not exist at this zoom
    OutOfGrid { zoom: u8, value: u32 },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::OutOfGrid { zoom, value } => {
                write!(
                    f,
                    "Tile index {} out of range at zoom {} (must be below {})",
                    value,
                    zoom,
                    tiles_per_axis(*zoom)
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
