use crate::location::*;
use crate::perimeter::*;
use crate::placement::*;
use crate::template::FurnitureRef;
use crate::visual::*;
use serde::{Deserialize, Serialize};

/// Parameters for finalizing a room. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionSpec {
    pub upgrade_level: u32,
    /// Constructor/blueprint the host builds the room from.
    pub constructor: String,
    /// Building material for walls and the door.
    pub material: String,
    #[serde(default)]
    pub degrade_level: u32,
    /// Opaque room-state payload handed through to the host.
    #[serde(default)]
    pub room_state: Option<String>,
}

impl ConstructionSpec {
    pub fn new(constructor: impl Into<String>, material: impl Into<String>) -> Self {
        ConstructionSpec {
            upgrade_level: 0,
            constructor: constructor.into(),
            material: material.into(),
            degrade_level: 0,
            room_state: None,
        }
    }

    pub fn with_upgrade_level(mut self, level: u32) -> Self {
        self.upgrade_level = level;
        self
    }

    pub fn with_degrade_level(mut self, level: u32) -> Self {
        self.degrade_level = level;
        self
    }

    pub fn with_room_state(mut self, state: impl Into<String>) -> Self {
        self.room_state = Some(state.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Plan operations (pure data, no host API)
// ---------------------------------------------------------------------------

/// An operation that the plan wants the host to perform.
///
/// The committer executes these in order; the plan itself never touches the
/// host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanOperation {
    /// Place a furniture piece at its anchor tile.
    PlaceFurniture {
        location: TileCoord,
        furniture: FurnitureRef,
    },
    /// Place a wall on a perimeter tile, if the tile allows it.
    PlaceWall { location: TileCoord },
    /// Place the room's single opening.
    PlaceOpening { location: TileCoord },
}

/// Ordered operations for a resolved room: all furniture first, then walls in
/// scan order, then the door.
///
/// Furniture must land before finalization snapshots the room.
pub fn build_operations(room: &RoomInstance, perimeter: &Perimeter) -> Vec<PlanOperation> {
    let mut ops = Vec::with_capacity(room.furniture.len() + perimeter.edges.len());

    for placed in &room.furniture {
        ops.push(PlanOperation::PlaceFurniture {
            location: placed.anchor,
            furniture: placed.furniture.clone(),
        });
    }

    for location in perimeter.wall_tiles() {
        ops.push(PlanOperation::PlaceWall { location });
    }

    if let Some(location) = perimeter.door {
        ops.push(PlanOperation::PlaceOpening { location });
    }

    ops
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A planned room with its resolved perimeter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionPlan {
    pub template_name: String,
    pub anchor: TileCoord,
    pub room: RoomInstance,
    pub perimeter: Perimeter,
}

impl ConstructionPlan {
    pub fn operations(&self) -> Vec<PlanOperation> {
        build_operations(&self.room, &self.perimeter)
    }

    pub fn door(&self) -> Option<TileCoord> {
        self.perimeter.door
    }

    pub fn wall_tiles(&self) -> Vec<TileCoord> {
        self.perimeter.wall_tiles()
    }

    /// Render the plan using a visualizer.
    pub fn visualize<V: RoomVisualizer>(&self, visualizer: &mut V) {
        for tile in self.room.sorted_room_tiles() {
            let kind = if self.room.occupied_tiles.contains(&tile) {
                TileKind::Furniture
            } else if self.room.entrance_tiles.contains(&tile) {
                TileKind::Entrance
            } else {
                TileKind::Floor
            };
            visualizer.render(tile, kind);
        }

        for tile in self.perimeter.wall_tiles() {
            visualizer.render(tile, TileKind::Wall);
        }

        if let Some(door) = self.perimeter.door {
            visualizer.render(door, TileKind::Door);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RoomTemplate;

    fn plan() -> ConstructionPlan {
        let template = RoomTemplate::from_rows("x", &["Be", ".."], &[('B', "bed")]).unwrap();
        let anchor = TileCoord::new(0, 0);
        let room = plan_placement(&template, anchor);
        let perimeter = resolve_room(&room);
        ConstructionPlan {
            template_name: template.name().to_string(),
            anchor,
            room,
            perimeter,
        }
    }

    #[test]
    fn operations_run_furniture_then_walls_then_door() {
        let plan = plan();
        let ops = plan.operations();

        assert_eq!(ops.len(), 1 + 12);
        assert!(matches!(ops[0], PlanOperation::PlaceFurniture { .. }));
        assert!(ops[1..12]
            .iter()
            .all(|op| matches!(op, PlanOperation::PlaceWall { .. })));
        assert_eq!(
            ops[12],
            PlanOperation::PlaceOpening {
                location: TileCoord::new(1, -1)
            }
        );
    }

    #[test]
    fn construction_defaults_survive_sparse_json() {
        let spec: ConstructionSpec =
            serde_json::from_str(r#"{"upgrade_level":2,"constructor":"bp","material":"wood"}"#)
                .unwrap();
        assert_eq!(spec, ConstructionSpec::new("bp", "wood").with_upgrade_level(2));
    }
}
