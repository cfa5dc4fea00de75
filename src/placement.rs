//! Furniture placement: maps a template's cell grid onto world tiles.

use crate::location::*;
use crate::template::*;
use fnv::{FnvHashMap, FnvHashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A furniture piece positioned in world space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedFurniture {
    pub furniture: FurnitureRef,
    /// First covered tile in scan order.
    pub anchor: TileCoord,
    /// Every tile covered by the piece, in scan order.
    pub tiles: Vec<TileCoord>,
}

/// The world-space footprint of one planned room.
///
/// `occupied_tiles` and `entrance_tiles` are always subsets of `room_tiles`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInstance {
    pub room_tiles: FnvHashSet<TileCoord>,
    pub entrance_tiles: FnvHashSet<TileCoord>,
    pub occupied_tiles: FnvHashSet<TileCoord>,
    pub furniture: Vec<PlacedFurniture>,
}

impl RoomInstance {
    /// Room tiles in scan order.
    pub fn sorted_room_tiles(&self) -> Vec<TileCoord> {
        self.room_tiles.iter().copied().sorted().collect()
    }
}

/// World position of a template's top-left cell so that the room is centered on
/// `center`. Floor division biases even dimensions toward the top-left.
pub fn anchor_from_center(center: TileCoord, width: u32, height: u32) -> TileCoord {
    center - ((width / 2) as i32, (height / 2) as i32)
}

/// Place `template` with its top-left cell at `anchor`.
///
/// Every cell joins `room_tiles`. Furnished cells also join
/// `occupied_tiles`. Entrance-flagged cells also join `entrance_tiles`.
/// Deterministic and free of host side effects.
pub fn plan_placement(template: &RoomTemplate, anchor: TileCoord) -> RoomInstance {
    let mut room = RoomInstance::default();
    let mut pieces: FnvHashMap<&FurnitureRef, Vec<TileCoord>> = FnvHashMap::default();
    let mut order: Vec<&FurnitureRef> = Vec::new();

    for ((x, y), cell) in template.cells() {
        let tile = anchor + (x as i32, y as i32);
        room.room_tiles.insert(tile);

        if cell.is_entrance() {
            room.entrance_tiles.insert(tile);
        }

        if let Cell::Occupied { furniture, .. } = cell {
            room.occupied_tiles.insert(tile);
            let tiles = pieces.entry(furniture).or_insert_with(|| {
                order.push(furniture);
                Vec::new()
            });
            tiles.push(tile);
        }
    }

    room.furniture = order
        .into_iter()
        .filter_map(|furniture| {
            let tiles = pieces.remove(furniture)?;
            Some(PlacedFurniture {
                furniture: furniture.clone(),
                anchor: tiles[0],
                tiles,
            })
        })
        .collect();

    room
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_floor_divides_dimensions() {
        let center = TileCoord::new(50, 50);
        assert_eq!(anchor_from_center(center, 3, 3), TileCoord::new(49, 49));
        assert_eq!(anchor_from_center(center, 4, 4), TileCoord::new(48, 48));
        assert_eq!(anchor_from_center(center, 1, 2), TileCoord::new(50, 49));
    }

    #[test]
    fn placement_maps_every_cell() {
        let template = RoomTemplate::from_rows(
            "study",
            &["DD.e", "....", "C..."],
            &[('D', "desk"), ('C', "chair")],
        )
        .unwrap();
        let room = plan_placement(&template, TileCoord::new(-2, 10));

        assert_eq!(room.room_tiles.len(), 12);
        assert_eq!(
            room.occupied_tiles,
            [(-2, 10), (-1, 10), (-2, 12)]
                .into_iter()
                .map(TileCoord::from)
                .collect::<FnvHashSet<_>>()
        );
        assert_eq!(
            room.entrance_tiles,
            [TileCoord::new(1, 10)].into_iter().collect::<FnvHashSet<_>>()
        );
        assert_eq!(room.room_tiles.len() - room.occupied_tiles.len(), 9);
    }

    #[test]
    fn multi_cell_furniture_is_one_placement() {
        let template =
            RoomTemplate::from_rows("x", &[".BB", ".BB", "..T"], &[('B', "bed"), ('T', "torch")])
                .unwrap();
        let room = plan_placement(&template, TileCoord::new(0, 0));

        assert_eq!(room.furniture.len(), 2);
        let bed = &room.furniture[0];
        assert_eq!(bed.furniture.def, "bed");
        assert_eq!(bed.anchor, TileCoord::new(1, 0));
        assert_eq!(bed.tiles.len(), 4);
        assert_eq!(room.furniture[1].anchor, TileCoord::new(2, 2));
    }

    #[test]
    fn placement_is_deterministic() {
        let template = RoomTemplate::from_rows("x", &["aA", "e."], &[('A', "altar")]).unwrap();
        let anchor = TileCoord::new(7, 7);
        assert_eq!(plan_placement(&template, anchor), plan_placement(&template, anchor));
    }
}
