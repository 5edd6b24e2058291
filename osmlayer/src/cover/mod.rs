//! Tile cover: which tiles intersect a viewport.
//!
//! The viewport is a convex quadrilateral in normalised Mercator units (four
//! projected corners, in order around the quad). At an integer zoom the
//! solver walks each tile row, clips the quad to that row's band and emits
//! every column the clipped extent touches.
//!
//! ```text
//!   row y   ┌──────┬──────┬──────┐
//!           │  ╱‾‾‾│‾‾‾‾‾‾│‾‾╲   │   clipped extent [min_x, max_x]
//!   row y+1 ├─╱────┼──────┼────╲─┤   → columns floor(min_x)..ceil(max_x)
//!           │╱     │      │     ╲│
//! ```
//!
//! Columns outside `[0, 2^zoom)` belong to neighbouring world copies and are
//! reported with a non-zero `wrap`.

use crate::coord::{tile_center, tiles_per_axis, LngLat, MercatorPoint, TileCoord, MAX_ZOOM};
use crate::host::Viewport;

/// Quads with a smaller area (in tile units²) are treated as empty.
const MIN_QUAD_AREA: f64 = 1e-12;

/// Computes the tiles at `floored_zoom` whose footprints intersect the quad.
///
/// # Arguments
///
/// * `floored_zoom` - Integer zoom tiles are selected at (0 to 24)
/// * `corners` - Projected viewport corners, in order around a convex quad
/// * `zoom` - Camera's fractional zoom; must be finite and non-negative
/// * `wrap_allowed` - Whether tiles of neighbouring world copies are returned
///
/// # Returns
///
/// The covering tiles ordered by distance from the quad's centroid (nearest
/// first), ties broken by `(wrap, x, y)`. Identical inputs always produce the
/// identical sequence. Degenerate input or a zoom above [`MAX_ZOOM`] yields
/// an empty vector.
pub fn cover(
    floored_zoom: u8,
    corners: [MercatorPoint; 4],
    zoom: f64,
    wrap_allowed: bool,
) -> Vec<TileCoord> {
    if floored_zoom > MAX_ZOOM
        || !zoom.is_finite()
        || zoom < 0.0
        || !corners.iter().all(MercatorPoint::is_finite)
    {
        return Vec::new();
    }

    let n = tiles_per_axis(floored_zoom);
    let scale = n as f64;
    let quad = corners.map(|c| (c.x * scale, c.y * scale));

    if quad_area(&quad) < MIN_QUAD_AREA {
        return Vec::new();
    }

    let min_y = quad.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = quad.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let row_start = min_y.floor().max(0.0) as i64;
    let row_end = max_y.ceil().min(scale) as i64;

    let mut tiles = Vec::new();
    for row in row_start..row_end {
        let Some((min_x, max_x)) = band_extent(&quad, row as f64, row as f64 + 1.0) else {
            continue;
        };

        let mut col_start = min_x.floor() as i64;
        let mut col_end = max_x.ceil() as i64;
        if col_end == col_start {
            // Quad touches this band along a vertical line only.
            col_end += 1;
        }
        if !wrap_allowed {
            col_start = col_start.max(0);
            col_end = col_end.min(n as i64);
        }

        for col in col_start..col_end {
            let wrap = col.div_euclid(n as i64);
            let x = col.rem_euclid(n as i64);
            tiles.push(TileCoord::new(floored_zoom, x as u32, row as u32, wrap as i32));
        }
    }

    let centroid = MercatorPoint::new(
        corners.iter().map(|c| c.x).sum::<f64>() / 4.0,
        corners.iter().map(|c| c.y).sum::<f64>() / 4.0,
    );
    sort_by_distance(&mut tiles, centroid);
    tiles.dedup();
    tiles
}

/// Covers a host viewport in geographic coordinates.
///
/// The floored zoom is `floor(viewport.zoom)` clamped to `[min_zoom, max_zoom]`.
pub fn cover_viewport(
    viewport: &Viewport,
    min_zoom: u8,
    max_zoom: u8,
    wrap_allowed: bool,
) -> Vec<TileCoord> {
    let Some(floored) = floored_zoom(viewport.zoom, min_zoom, max_zoom) else {
        return Vec::new();
    };
    cover(
        floored,
        project_corners(&viewport.corners),
        viewport.zoom,
        wrap_allowed,
    )
}

/// Integer zoom used for tile selection, or `None` for an unusable zoom.
///
/// The range bounds are capped at [`MAX_ZOOM`]; an inverted range resolves
/// to `max_zoom`.
pub fn floored_zoom(zoom: f64, min_zoom: u8, max_zoom: u8) -> Option<u8> {
    if !zoom.is_finite() || zoom < 0.0 {
        return None;
    }
    let max_zoom = max_zoom.min(MAX_ZOOM);
    let floored = zoom.floor().min(u8::MAX as f64) as u8;
    Some(floored.max(min_zoom).min(max_zoom))
}

/// Projects viewport corners into normalised Mercator units.
pub fn project_corners(corners: &[LngLat; 4]) -> [MercatorPoint; 4] {
    corners.map(MercatorPoint::from_lng_lat)
}

fn sort_by_distance(tiles: &mut [TileCoord], centroid: MercatorPoint) {
    tiles.sort_by(|a, b| {
        let da = distance_sq(a, centroid);
        let db = distance_sq(b, centroid);
        da.total_cmp(&db)
            .then(a.wrap.cmp(&b.wrap))
            .then(a.x.cmp(&b.x))
            .then(a.y.cmp(&b.y))
    });
}

fn distance_sq(tile: &TileCoord, centroid: MercatorPoint) -> f64 {
    let c = tile_center(tile);
    let dx = c.x - centroid.x;
    let dy = c.y - centroid.y;
    dx * dx + dy * dy
}

/// Shoelace area of the quad.
fn quad_area(quad: &[(f64, f64); 4]) -> f64 {
    let mut twice = 0.0;
    for i in 0..4 {
        let (x0, y0) = quad[i];
        let (x1, y1) = quad[(i + 1) % 4];
        twice += x0 * y1 - x1 * y0;
    }
    (twice / 2.0).abs()
}

/// Horizontal extent of the quad clipped to the band `y0 <= y <= y1`.
///
/// The quad is convex, so the extent of the clipped polygon is spanned by the
/// clipped edge endpoints.
fn band_extent(quad: &[(f64, f64); 4], y0: f64, y1: f64) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;

    for i in 0..4 {
        let (px, py) = quad[i];
        let (qx, qy) = quad[(i + 1) % 4];
        let dy = qy - py;

        let (t_min, t_max) = if dy == 0.0 {
            if py < y0 || py > y1 {
                continue;
            }
            (0.0, 1.0)
        } else {
            let ta = (y0 - py) / dy;
            let tb = (y1 - py) / dy;
            (ta.min(tb).max(0.0), ta.max(tb).min(1.0))
        };
        if t_min > t_max {
            continue;
        }

        for t in [t_min, t_max] {
            let x = px + (qx - px) * t;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
        }
    }

    (min_x <= max_x).then_some((min_x, max_x))
}
