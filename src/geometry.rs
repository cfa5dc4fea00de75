//! Stateless grid geometry over world tiles.

use crate::location::*;
use fnv::FnvHashSet;

/// Neighbor offsets for 8-directional adjacency.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// Neighbor offsets for 4-directional (cardinal) adjacency.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// The eight tiles surrounding `tile`, diagonals included.
pub fn neighbors8(tile: TileCoord) -> [TileCoord; 8] {
    NEIGHBORS_8.map(|offset| tile + offset)
}

/// The four tiles sharing an edge with `tile`.
pub fn neighbors4(tile: TileCoord) -> [TileCoord; 4] {
    NEIGHBORS_4.map(|offset| tile + offset)
}

/// Upper bound on the capacity reserved up front by [`rect_tiles`].
const RECT_PREALLOCATION_CAP: usize = 4096;

fn rect_capacity(width: i32, height: i32) -> usize {
    let area = i64::from(width.max(0)) * i64::from(height.max(0));
    usize::try_from(area)
        .unwrap_or(RECT_PREALLOCATION_CAP)
        .min(RECT_PREALLOCATION_CAP)
}

/// All tiles of the axis-aligned rectangle whose top-left corner is `origin`.
/// Non-positive dimensions yield an empty set. Tiles past the `i32` bounds
/// wrap like [`TileCoord::offset`].
pub fn rect_tiles(origin: TileCoord, width: i32, height: i32) -> FnvHashSet<TileCoord> {
    if width <= 0 || height <= 0 {
        return FnvHashSet::default();
    }

    let mut tiles =
        FnvHashSet::with_capacity_and_hasher(rect_capacity(width, height), Default::default());
    for dy in 0..height {
        for dx in 0..width {
            tiles.insert(origin.offset(dx, dy));
        }
    }
    tiles
}

/// Inclusive bounding rectangle `(min, max)` of a tile set, or `None` when empty.
pub fn bounding_rect<'a, I>(tiles: I) -> Option<(TileCoord, TileCoord)>
where
    I: IntoIterator<Item = &'a TileCoord>,
{
    tiles.into_iter().fold(None, |acc, tile| match acc {
        None => Some((*tile, *tile)),
        Some((min, max)) => Some((
            TileCoord::new(min.x.min(tile.x), min.y.min(tile.y)),
            TileCoord::new(max.x.max(tile.x), max.y.max(tile.y)),
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_distinct_and_adjacent() {
        let center = TileCoord::new(-4, 12);

        let ring: FnvHashSet<_> = neighbors8(center).into_iter().collect();
        assert_eq!(ring.len(), 8);
        assert!(ring.iter().all(|t| t.distance_to(center) == 1));

        let cross: FnvHashSet<_> = neighbors4(center).into_iter().collect();
        assert_eq!(cross.len(), 4);
        assert!(cross.iter().all(|t| t.is_orthogonal_to(center)));
        assert!(cross.is_subset(&ring));
    }

    #[test]
    fn neighbors_at_the_integer_bounds_wrap() {
        for center in [
            TileCoord::new(i32::MAX, 0),
            TileCoord::new(i32::MIN, i32::MAX),
            TileCoord::new(i32::MAX, i32::MIN),
        ] {
            let ring: FnvHashSet<_> = neighbors8(center).into_iter().collect();
            assert_eq!(ring.len(), 8);
            assert!(ring.iter().all(|t| t.distance_to(center) == 1));
            assert!(neighbors4(center).iter().all(|t| t.is_orthogonal_to(center)));
        }
        assert!(neighbors4(TileCoord::new(i32::MAX, 0)).contains(&TileCoord::new(i32::MIN, 0)));
    }

    #[test]
    fn rect_tiles_across_the_integer_bounds() {
        let tiles = rect_tiles(TileCoord::new(i32::MAX - 1, i32::MAX), 3, 2);
        assert_eq!(tiles.len(), 6);
        assert!(tiles.contains(&TileCoord::new(i32::MIN, i32::MIN)));
    }

    #[test]
    fn rect_capacity_is_bounded_for_huge_dimensions() {
        assert_eq!(rect_capacity(3, 2), 6);
        assert_eq!(rect_capacity(70_000, 70_000), RECT_PREALLOCATION_CAP);
        assert_eq!(rect_capacity(i32::MAX, i32::MAX), RECT_PREALLOCATION_CAP);
        assert_eq!(rect_capacity(-5, 9), 0);
    }

    #[test]
    fn rect_tiles_covers_exact_area() {
        let tiles = rect_tiles(TileCoord::new(100, 100), 3, 2);
        assert_eq!(tiles.len(), 6);
        assert!(tiles.contains(&TileCoord::new(102, 101)));
        assert!(!tiles.contains(&TileCoord::new(103, 100)));
        assert!(!tiles.contains(&TileCoord::new(100, 102)));
    }

    #[test]
    fn rect_tiles_with_empty_dimension_is_empty() {
        assert!(rect_tiles(TileCoord::new(0, 0), 0, 5).is_empty());
        assert!(rect_tiles(TileCoord::new(0, 0), 5, -1).is_empty());
    }

    #[test]
    fn bounding_rect_spans_all_tiles() {
        let tiles = [
            TileCoord::new(3, 9),
            TileCoord::new(-2, 4),
            TileCoord::new(7, 5),
        ];
        assert_eq!(
            bounding_rect(&tiles),
            Some((TileCoord::new(-2, 4), TileCoord::new(7, 9)))
        );
        assert_eq!(bounding_rect(&[]), None);
    }
}
