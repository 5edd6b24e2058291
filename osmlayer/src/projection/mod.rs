//! Per-tile projection matrices.
//!
//! The camera matrix maps the host's pixel world (one world copy is
//! `tile_size * 2^zoom` pixels wide) into clip space. A tile's matrix
//! prepends a translate-then-scale so that the tile's unit quad, corners at
//! `(0, 0)` and `(1, 1)`, lands on the tile's footprint:
//!
//! ```text
//! M = camera · T(unwrapped_x · s, y · s, 0) · S(s, s, 1)
//! s = tile_size · 2^(camera.zoom - tile.zoom)
//! ```

use glam::{DMat4, DVec3, Mat4};

use crate::coord::{tiles_per_axis, TileCoord};

/// The host camera's current transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraProjection {
    /// Maps pixel-world coordinates to clip space.
    pub matrix: DMat4,
    /// Fractional zoom the pixel world is measured at.
    pub zoom: f64,
}

impl CameraProjection {
    pub fn new(matrix: DMat4, zoom: f64) -> Self {
        Self { matrix, zoom }
    }

    /// Width of one world copy in pixel-world units.
    #[inline]
    pub fn world_size(&self, tile_size: u32) -> f64 {
        tile_size as f64 * self.zoom.exp2()
    }
}

/// Builds the matrix mapping `tile`'s unit quad into the camera's clip space.
///
/// # Arguments
///
/// * `tile` - The tile, including its world copy
/// * `tile_size` - Tile edge length in pixels
/// * `camera` - The host camera's current transform
///
/// # Returns
///
/// `camera · T(unwrapped_x · s, y · s, 0) · S(s, s, 1)` with
/// `s = tile_size · 2^(camera.zoom - tile.zoom)`.
pub fn tile_matrix(tile: &TileCoord, tile_size: u32, camera: &CameraProjection) -> DMat4 {
    let scale = camera.world_size(tile_size) / tiles_per_axis(tile.zoom) as f64;
    let origin = DVec3::new(tile.unwrapped_x() as f64 * scale, tile.y as f64 * scale, 0.0);

    let pos = DMat4::from_translation(origin) * DMat4::from_scale(DVec3::new(scale, scale, 1.0));
    camera.matrix * pos
}

/// Single-precision variant of [`tile_matrix`] for GPU upload.
pub fn tile_matrix_f32(tile: &TileCoord, tile_size: u32, camera: &CameraProjection) -> Mat4 {
    tile_matrix(tile, tile_size, camera).as_mat4()
}
