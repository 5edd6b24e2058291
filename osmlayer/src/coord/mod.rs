//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (longitude/latitude),
//! normalised Web Mercator world coordinates and slippy-map tile coordinates.

mod types;

pub use types::{
    tiles_per_axis, CoordError, LngLat, MercatorPoint, TileCoord, TileKey, MAX_LAT, MAX_ZOOM,
    MIN_LAT, MIN_ZOOM,
};

use std::f64::consts::PI;

impl MercatorPoint {
    /// Projects geographic coordinates into normalised Web Mercator units.
    ///
    /// Latitude is clamped to the Web Mercator range. Longitude is not
    /// wrapped, so `lng = 190` lands in the eastern world copy (`x > 1`).
    #[inline]
    pub fn from_lng_lat(point: LngLat) -> Self {
        let lat = point.lat.clamp(MIN_LAT, MAX_LAT);
        let x = (point.lng + 180.0) / 360.0;

        let lat_rad = lat * PI / 180.0;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0;

        Self { x, y }
    }

    /// Inverse of [`MercatorPoint::from_lng_lat`].
    #[inline]
    pub fn to_lng_lat(&self) -> LngLat {
        let lng = self.x * 360.0 - 180.0;
        let lat_rad = (PI * (1.0 - 2.0 * self.y)).sinh().atan();
        LngLat {
            lng,
            lat: lat_rad * 180.0 / PI,
        }
    }
}

/// Returns the normalised Mercator position of a tile's northwest corner.
///
/// The world copy is included, so the result for `wrap = 1` lies in `x >= 1`.
#[inline]
pub fn tile_origin(tile: &TileCoord) -> MercatorPoint {
    let n = tiles_per_axis(tile.zoom) as f64;
    MercatorPoint {
        x: tile.unwrapped_x() as f64 / n,
        y: tile.y as f64 / n,
    }
}

/// Returns the normalised Mercator position of a tile's centre.
#[inline]
pub fn tile_center(tile: &TileCoord) -> MercatorPoint {
    let n = tiles_per_axis(tile.zoom) as f64;
    MercatorPoint {
        x: (tile.unwrapped_x() as f64 + 0.5) / n,
        y: (tile.y as f64 + 0.5) / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_equator_prime_meridian_is_world_center() {
        let p = MercatorPoint::from_lng_lat(LngLat::new(0.0, 0.0));
        assert_abs_diff_eq!(p.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_max_latitude_maps_to_top_edge() {
        let p = MercatorPoint::from_lng_lat(LngLat::new(-180.0, MAX_LAT));
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_latitude_beyond_range_is_clamped() {
        let p = MercatorPoint::from_lng_lat(LngLat::new(0.0, 89.9));
        let q = MercatorPoint::from_lng_lat(LngLat::new(0.0, MAX_LAT));
        assert_eq!(p, q);
    }

    #[test]
    fn test_longitude_is_not_wrapped() {
        let p = MercatorPoint::from_lng_lat(LngLat::new(190.0, 0.0));
        assert!(p.x > 1.0, "x {} should lie in the eastern copy", p.x);
    }

    #[test]
    fn test_tile_key_ignores_wrap() {
        let a = TileCoord::new(2, 1, 1, 0);
        let b = TileCoord::new(2, 1, 1, 1);
        assert_ne!(a, b);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().to_string(), "tile:2:1:1");
    }

    #[test]
    fn test_unwrapped_x() {
        assert_eq!(TileCoord::new(2, 3, 0, 0).unwrapped_x(), 3);
        assert_eq!(TileCoord::new(2, 3, 0, -1).unwrapped_x(), -1);
        assert_eq!(TileCoord::new(2, 0, 0, 2).unwrapped_x(), 8);
    }

    #[test]
    fn test_try_new_rejects_out_of_grid() {
        assert!(TileCoord::try_new(2, 3, 3, 0).is_ok());
        assert_eq!(
            TileCoord::try_new(2, 4, 0, 0),
            Err(CoordError::OutOfGrid { zoom: 2, value: 4 })
        );
        assert_eq!(
            TileCoord::try_new(25, 0, 0, 0),
            Err(CoordError::InvalidZoom(25))
        );
    }

    #[test]
    fn test_tile_origin_and_center() {
        let tile = TileCoord::new(1, 1, 0, 1);
        let origin = tile_origin(&tile);
        assert_abs_diff_eq!(origin.x, 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(origin.y, 0.0, epsilon = 1e-12);

        let center = tile_center(&tile);
        assert_abs_diff_eq!(center.x, 1.75, epsilon = 1e-12);
        assert_abs_diff_eq!(center.y, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(TileCoord::new(3, 4, 5, 0).to_string(), "3/4/5");
        assert_eq!(TileCoord::new(3, 4, 5, -1).to_string(), "3/4/5@-1");
        let err = CoordError::InvalidZoom(30);
        assert!(err.to_string().contains("30"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_roundtrip_property(
                lat in -85.0..85.0_f64,
                lng in -540.0..540.0_f64,
            ) {
                let p = MercatorPoint::from_lng_lat(LngLat::new(lng, lat));
                let back = p.to_lng_lat();

                prop_assert!((back.lat - lat).abs() < 1e-9, "lat {} -> {}", lat, back.lat);
                prop_assert!((back.lng - lng).abs() < 1e-9, "lng {} -> {}", lng, back.lng);
            }

            #[test]
            fn test_y_in_unit_range(
                lat in -90.0..90.0_f64,
                lng in -180.0..180.0_f64,
            ) {
                let p = MercatorPoint::from_lng_lat(LngLat::new(lng, lat));
                prop_assert!((0.0..=1.0).contains(&p.y), "y {} out of range", p.y);
            }
        }
    }
}
