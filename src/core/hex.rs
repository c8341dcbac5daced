// Hexagonal grid math (pointy-top axial coordinates)

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

const SQRT_3: f32 = 1.732_050_8;

/// Position on a hexagonal grid in axial coordinates.
///
/// The third cube coordinate is implicit: `s = -q - r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

impl AxialCoord {
    pub const ORIGIN: AxialCoord = AxialCoord { q: 0, r: 0 };

    /// Offsets of the six neighbouring hexes
    const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Number of steps between two hexes
    pub fn distance(&self, other: AxialCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        (dq + dr + ds) / 2
    }

    /// The six adjacent coordinates, counter-clockwise starting east
    pub fn neighbors(&self) -> [AxialCoord; 6] {
        Self::DIRECTIONS.map(|(dq, dr)| AxialCoord::new(self.q + dq, self.r + dr))
    }

    /// Canonical map key (`"q,r"`)
    pub fn key(&self) -> String {
        hash_coord(self.q, self.r)
    }
}

impl fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl From<(i32, i32)> for AxialCoord {
    fn from((q, r): (i32, i32)) -> Self {
        Self::new(q, r)
    }
}

/// Canonical string key for a coordinate. Injective over integer pairs.
pub fn hash_coord(q: i32, r: i32) -> String {
    format!("{},{}", q, r)
}

/// Inverse of [`hash_coord`]. Returns `None` for anything that is not `"q,r"`.
pub fn parse_coord_key(key: &str) -> Option<AxialCoord> {
    let (q, r) = key.split_once(',')?;
    Some(AxialCoord::new(q.trim().parse().ok()?, r.trim().parse().ok()?))
}

/// Convert an axial coordinate to pixel space, centred on the origin hex
pub fn axial_to_pixel(coord: AxialCoord, tile_size: f32) -> Vec2 {
    let q = coord.q as f32;
    let r = coord.r as f32;
    Vec2::new(tile_size * SQRT_3 * (q + r / 2.0), tile_size * 1.5 * r)
}

/// Number of hexes within `radius` steps of the origin: `3R² + 3R + 1`
pub fn grid_size(radius: i32) -> usize {
    if radius < 0 {
        return 0;
    }
    let r = radius as u64;
    let count = r.saturating_mul(r + 1).saturating_mul(3).saturating_add(1);
    usize::try_from(count).unwrap_or(usize::MAX)
}

/// Every coordinate within `radius` steps of the origin, ordered by `q` then `r`.
///
/// Yields `grid_size(radius)` coordinates; a negative radius yields none.
pub fn generate_axial_coordinates(radius: i32) -> Vec<AxialCoord> {
    if radius < 0 {
        return Vec::new();
    }

    let mut coords = Vec::with_capacity(grid_size(radius));

    for q in -radius..=radius {
        let r_min = (-radius).max(-q - radius);
        let r_max = radius.min(-q + radius);
        for r in r_min..=r_max {
            coords.push(AxialCoord::new(q, r));
        }
    }

    coords
}

/// Tile size plus the pixel position of the origin hex.
///
/// Anything that needs to place hexes on screen carries one of these, so
/// characters can keep their pixel position in sync on their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    pub tile_size: f32,
    pub origin: Vec2,
}

impl HexLayout {
    pub fn new(tile_size: f32, origin: Vec2) -> Self {
        Self { tile_size, origin }
    }

    /// Layout whose origin hex sits at the centre of a viewport
    pub fn centered(tile_size: f32, viewport_width: f32, viewport_height: f32) -> Self {
        Self::new(
            tile_size,
            Vec2::new(viewport_width / 2.0, viewport_height / 2.0),
        )
    }

    /// Pixel position of a hex centre
    pub fn to_pixel(&self, coord: AxialCoord) -> Vec2 {
        axial_to_pixel(coord, self.tile_size) + self.origin
    }
}

impl Default for HexLayout {
    fn default() -> Self {
        Self::new(32.0, Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn test_origin_maps_to_zero() {
        for size in [1.0, 16.0, 32.5, 100.0] {
            assert_eq!(axial_to_pixel(AxialCoord::ORIGIN, size), Vec2::ZERO);
        }
    }

    #[test]
    fn test_axial_to_pixel_values() {
        let p = axial_to_pixel(AxialCoord::new(1, 0), 10.0);
        assert_relative_eq!(p.x, 10.0 * 3f32.sqrt(), epsilon = 1e-4);
        assert_relative_eq!(p.y, 0.0);

        let p = axial_to_pixel(AxialCoord::new(0, 2), 10.0);
        assert_relative_eq!(p.x, 10.0 * 3f32.sqrt(), epsilon = 1e-4);
        assert_relative_eq!(p.y, 30.0);
    }

    #[test]
    fn test_coordinate_count() {
        for radius in 0..8 {
            let coords = generate_axial_coordinates(radius);
            assert_eq!(coords.len() as i32, 3 * radius * radius + 3 * radius + 1);
            assert_eq!(coords.len(), grid_size(radius));
        }
    }

    #[test]
    fn test_grid_size_large_radius() {
        assert_eq!(grid_size(-3), 0);
        assert_eq!(grid_size(30_000) as u64, 2_700_090_001);
        assert!(grid_size(i32::MAX) > grid_size(30_000));
    }

    #[test]
    fn test_coordinates_within_radius_and_unique() {
        let radius = 4;
        let coords = generate_axial_coordinates(radius);
        let unique: HashSet<_> = coords.iter().copied().collect();
        assert_eq!(unique.len(), coords.len());
        assert!(coords
            .iter()
            .all(|c| c.distance(AxialCoord::ORIGIN) <= radius));
    }

    #[test]
    fn test_negative_radius_is_empty() {
        assert!(generate_axial_coordinates(-1).is_empty());
        assert!(generate_axial_coordinates(-10).is_empty());
    }

    #[test]
    fn test_generation_is_reproducible() {
        assert_eq!(generate_axial_coordinates(3), generate_axial_coordinates(3));
        assert_eq!(generate_axial_coordinates(1)[0], AxialCoord::new(-1, 0));
    }

    #[test]
    fn test_hash_coord_injective() {
        let mut seen = HashSet::new();
        for q in -12..=12 {
            for r in -12..=12 {
                assert!(seen.insert(hash_coord(q, r)), "collision at {},{}", q, r);
            }
        }
    }

    #[test]
    fn test_hash_coord_roundtrip() {
        for (q, r) in [(0, 0), (-3, 7), (12, -1), (-100, -200)] {
            assert_eq!(parse_coord_key(&hash_coord(q, r)), Some(AxialCoord::new(q, r)));
        }
        assert_eq!(parse_coord_key("nope"), None);
        assert_eq!(parse_coord_key("1,x"), None);
    }

    #[test]
    fn test_distance() {
        let a = AxialCoord::new(0, 0);
        assert_eq!(a.distance(AxialCoord::new(2, -1)), 2);
        assert_eq!(a.distance(AxialCoord::new(-3, 3)), 3);
        assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let center = AxialCoord::new(2, -1);
        for n in center.neighbors() {
            assert_eq!(center.distance(n), 1);
        }
    }

    #[test]
    fn test_layout_offsets_origin() {
        let layout = HexLayout::centered(20.0, 800.0, 600.0);
        assert_eq!(layout.to_pixel(AxialCoord::ORIGIN), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_coord_serde_shape() {
        let json = serde_json::to_string(&AxialCoord::new(1, -2)).unwrap();
        assert_eq!(json, r#"{"q":1,"r":-2}"#);
    }
}
