use serde::*;
use std::cmp::Ordering;
use std::fmt;

/// A tile on the integer world grid.
///
/// Tiles order by row first (`y`, then `x`), which is the scan order used for
/// every deterministic pick in the crate.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        TileCoord { x, y }
    }

    /// Shift by `(dx, dy)`. Coordinates wrap at the `i32` bounds, so the
    /// grid behaves as a torus there and no input panics.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        TileCoord {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Chebyshev distance, the number of 8-directional steps between two tiles.
    /// Measured the short way around the wrapped grid, consistent with
    /// [`TileCoord::offset`].
    pub fn distance_to(self, other: Self) -> u32 {
        let dx = self.x.wrapping_sub(other.x).unsigned_abs();
        let dy = self.y.wrapping_sub(other.y).unsigned_abs();

        dx.max(dy)
    }

    /// True if the tiles share a full edge.
    pub fn is_orthogonal_to(self, other: Self) -> bool {
        let dx = self.x.wrapping_sub(other.x).unsigned_abs();
        let dy = self.y.wrapping_sub(other.y).unsigned_abs();

        matches!((dx, dy), (0, 1) | (1, 0))
    }

    #[inline]
    pub fn packed_repr(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    #[inline]
    pub fn from_packed(packed: u64) -> Self {
        TileCoord {
            x: (packed >> 32) as u32 as i32,
            y: (packed & 0xFFFF_FFFF) as u32 as i32,
        }
    }
}

impl Ord for TileCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for TileCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        TileCoord { x, y }
    }
}

impl std::ops::Add<(i32, i32)> for TileCoord {
    type Output = Self;
    fn add(self, other: (i32, i32)) -> Self {
        self.offset(other.0, other.1)
    }
}

impl std::ops::Sub<(i32, i32)> for TileCoord {
    type Output = Self;
    fn sub(self, other: (i32, i32)) -> Self {
        self.offset(other.0.wrapping_neg(), other.1.wrapping_neg())
    }
}

impl Serialize for TileCoord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TileCoord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(TileCoord::from_packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_repr_keeps_negative_coordinates() {
        for tile in [
            TileCoord::new(0, 0),
            TileCoord::new(-1, 7),
            TileCoord::new(250, -3),
            TileCoord::new(i32::MIN, i32::MAX),
        ] {
            assert_eq!(TileCoord::from_packed(tile.packed_repr()), tile);
        }
    }

    #[test]
    fn scan_order_is_row_major() {
        let mut tiles = vec![
            TileCoord::new(5, 1),
            TileCoord::new(0, 2),
            TileCoord::new(1, 1),
            TileCoord::new(9, 0),
        ];
        tiles.sort();
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(9, 0),
                TileCoord::new(1, 1),
                TileCoord::new(5, 1),
                TileCoord::new(0, 2),
            ]
        );
    }

    #[test]
    fn orthogonal_adjacency_excludes_diagonals() {
        let origin = TileCoord::new(10, 10);
        assert!(origin.is_orthogonal_to(TileCoord::new(10, 9)));
        assert!(origin.is_orthogonal_to(TileCoord::new(11, 10)));
        assert!(!origin.is_orthogonal_to(TileCoord::new(11, 11)));
        assert!(!origin.is_orthogonal_to(origin));
        assert_eq!(origin.distance_to(TileCoord::new(13, 8)), 3);
    }

    #[test]
    fn offsets_wrap_at_the_integer_bounds() {
        let edge = TileCoord::new(i32::MAX, i32::MIN);

        assert_eq!(edge + (1, 0), TileCoord::new(i32::MIN, i32::MIN));
        assert_eq!(edge - (0, 1), TileCoord::new(i32::MAX, i32::MAX));
        assert_eq!(edge - (i32::MIN, 0), TileCoord::new(-1, i32::MIN));

        assert!(edge.is_orthogonal_to(edge + (1, 0)));
        assert_eq!(edge.distance_to(edge + (1, 1)), 1);
        assert_eq!(
            TileCoord::new(i32::MIN, 0).distance_to(TileCoord::new(i32::MAX, 0)),
            1
        );
        assert!(!TileCoord::new(0, 0).is_orthogonal_to(TileCoord::new(i32::MIN, i32::MIN)));
    }
}
