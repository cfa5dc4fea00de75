//! Perimeter and door resolution.
//!
//! The edge set is the ring of tiles outside the room that touch it
//! 8-directionally. A door candidate is an edge tile that shares a full edge
//! with an entrance hint. Exactly one candidate becomes the door; every other
//! edge tile is a wall. Entrance hints are a preference signal, so many hints
//! still yield one door.

use crate::geometry::*;
use crate::location::*;
use crate::placement::RoomInstance;
use fnv::FnvHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Resolved perimeter of one room.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perimeter {
    /// Tiles outside the room that are 8-adjacent to it.
    pub edges: FnvHashSet<TileCoord>,
    /// The single opening, always a member of `edges` when present.
    pub door: Option<TileCoord>,
}

impl Perimeter {
    /// Edge tiles other than the door, in scan order.
    pub fn wall_tiles(&self) -> Vec<TileCoord> {
        self.edges
            .iter()
            .copied()
            .filter(|t| self.is_wall(*t))
            .sorted()
            .collect()
    }

    /// The opening tiles: empty or exactly the door.
    pub fn opening_tiles(&self) -> Vec<TileCoord> {
        self.door.into_iter().collect()
    }

    /// True for edge tiles that are not the door.
    pub fn is_wall(&self, tile: TileCoord) -> bool {
        self.edges.contains(&tile) && Some(tile) != self.door
    }
}

/// The ring of tiles outside `room_tiles` that touch it 8-directionally.
pub fn edge_tiles(room_tiles: &FnvHashSet<TileCoord>) -> FnvHashSet<TileCoord> {
    room_tiles
        .iter()
        .flat_map(|t| neighbors8(*t))
        .filter(|n| !room_tiles.contains(n))
        .collect()
}

/// Edge tiles sharing a full edge with an entrance hint, in scan order.
pub fn door_candidates(
    edges: &FnvHashSet<TileCoord>,
    entrance_tiles: &FnvHashSet<TileCoord>,
) -> Vec<TileCoord> {
    edges
        .iter()
        .filter(|e| neighbors4(**e).iter().any(|n| entrance_tiles.contains(n)))
        .copied()
        .sorted()
        .collect()
}

/// Pick the door among scan-ordered candidates.
///
/// Candidates that open onto a free interior tile win. Without one, the first
/// candidate is used as-is.
pub fn select_door(
    candidates: &[TileCoord],
    room_tiles: &FnvHashSet<TileCoord>,
    occupied_tiles: &FnvHashSet<TileCoord>,
) -> Option<TileCoord> {
    let opens_onto_free_tile = |door: &&TileCoord| {
        neighbors4(**door)
            .iter()
            .any(|n| room_tiles.contains(n) && !occupied_tiles.contains(n))
    };

    candidates
        .iter()
        .find(opens_onto_free_tile)
        .or_else(|| candidates.first())
        .copied()
}

/// Compute the edge set and the single door tile.
///
/// `door` is `None` when there are no entrance hints or no hint touches the
/// edge orthogonally. Callers must treat that as a failure to seal the room.
pub fn resolve_perimeter(
    room_tiles: &FnvHashSet<TileCoord>,
    entrance_tiles: &FnvHashSet<TileCoord>,
    occupied_tiles: &FnvHashSet<TileCoord>,
) -> Perimeter {
    let edges = edge_tiles(room_tiles);
    let candidates = door_candidates(&edges, entrance_tiles);
    let door = select_door(&candidates, room_tiles, occupied_tiles);

    Perimeter { edges, door }
}

/// Convenience wrapper over [`resolve_perimeter`] for a planned room.
pub fn resolve_room(room: &RoomInstance) -> Perimeter {
    resolve_perimeter(&room.room_tiles, &room.entrance_tiles, &room.occupied_tiles)
}
