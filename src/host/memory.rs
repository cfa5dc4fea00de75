//! In-memory host grid for offline use and tests.
//!
//! Implements every collaborator trait over plain maps. Tiles can carry
//! [`TileFlags`] to simulate terrain or pre-existing structures, and any
//! collaborator call can be made to fail with [`MemoryHost::inject_fault`].

use super::*;
use bitflags::*;
use fnv::{FnvHashMap, FnvHashSet};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TileFlags: u8 {
        const NONE = 0;
        /// Impassable terrain or a foreign structure: nothing can be placed.
        const BLOCKED = 1;
        /// Walls cannot be placed here.
        const NO_WALL = 2;
        /// Openings cannot be placed here.
        const NO_OPENING = 4;
    }
}

/// A collaborator call that can be made to fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    Create,
    Reserve,
    PlaceFurniture,
    PlaceWall,
    PlaceOpening,
    Finalize,
}

impl FaultPoint {
    pub const ALL: [FaultPoint; 6] = [
        FaultPoint::Create,
        FaultPoint::Reserve,
        FaultPoint::PlaceFurniture,
        FaultPoint::PlaceWall,
        FaultPoint::PlaceOpening,
        FaultPoint::Finalize,
    ];
}

/// Journal entry for every mutating call the host receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    Create(String),
    Reserve(String, usize),
    Release(String),
    PlaceFurniture(TileCoord, FurnitureRef),
    PlaceWall(TileCoord),
    PlaceOpening(TileCoord),
    Finalize(String),
}

/// A room the host has finalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizedRoom {
    pub workspace: String,
    pub spec: ConstructionSpec,
    pub tiles: FnvHashSet<TileCoord>,
    pub furniture: Vec<(TileCoord, FurnitureRef)>,
}

#[derive(Default)]
pub struct MemoryHost {
    blueprints: BlueprintRegistry,
    flags: FnvHashMap<TileCoord, TileFlags>,
    entities: Vec<EntityRef>,
    furniture: FnvHashMap<TileCoord, FurnitureRef>,
    constructions: FnvHashMap<TileCoord, ConstructionRef>,
    walls: FnvHashMap<TileCoord, String>,
    openings: FnvHashMap<TileCoord, String>,
    workspaces: FnvHashMap<String, FnvHashSet<TileCoord>>,
    staged_furniture: FnvHashMap<String, Vec<(TileCoord, FurnitureRef)>>,
    reservations: FnvHashMap<TileCoord, String>,
    finalized: Vec<FinalizedRoom>,
    faults: FnvHashSet<FaultPoint>,
    journal: Vec<HostCall>,
    next_id: u64,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blueprints(blueprints: BlueprintRegistry) -> Self {
        MemoryHost {
            blueprints,
            ..Default::default()
        }
    }

    pub fn blueprints_mut(&mut self) -> &mut BlueprintRegistry {
        &mut self.blueprints
    }

    pub fn set_flags(&mut self, tile: TileCoord, flags: TileFlags) {
        self.flags.insert(tile, flags);
    }

    pub fn flags(&self, tile: TileCoord) -> TileFlags {
        self.flags.get(&tile).copied().unwrap_or(TileFlags::NONE)
    }

    pub fn add_entity(&mut self, kind: impl Into<String>, tile: TileCoord) -> u64 {
        let id = self.allocate_id();
        self.entities.push(EntityRef {
            id,
            kind: kind.into(),
            tile,
        });
        id
    }

    pub fn add_furniture(&mut self, tile: TileCoord, furniture: FurnitureRef) {
        self.furniture.insert(tile, furniture);
    }

    pub fn add_construction(&mut self, tile: TileCoord, kind: impl Into<String>) -> u64 {
        let id = self.allocate_id();
        self.constructions.insert(
            tile,
            ConstructionRef {
                id,
                kind: kind.into(),
            },
        );
        id
    }

    /// Pre-existing wall, as left behind by an earlier construction.
    pub fn add_wall(&mut self, tile: TileCoord, material: impl Into<String>) {
        self.walls.insert(tile, material.into());
    }

    /// Make every later call at `point` fail until cleared.
    pub fn inject_fault(&mut self, point: FaultPoint) {
        self.faults.insert(point);
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    pub fn has_wall(&self, tile: TileCoord) -> bool {
        self.walls.contains_key(&tile)
    }

    pub fn has_opening(&self, tile: TileCoord) -> bool {
        self.openings.contains_key(&tile)
    }

    pub fn walls(&self) -> impl Iterator<Item = &TileCoord> {
        self.walls.keys()
    }

    pub fn openings(&self) -> impl Iterator<Item = &TileCoord> {
        self.openings.keys()
    }

    pub fn furniture_at(&self, tile: TileCoord) -> Option<&FurnitureRef> {
        self.furniture.get(&tile)
    }

    pub fn finalized_rooms(&self) -> &[FinalizedRoom] {
        &self.finalized
    }

    pub fn live_workspaces(&self) -> usize {
        self.workspaces.len()
    }

    /// Name of the live workspace holding `tile`, if any.
    pub fn reserved_by(&self, tile: TileCoord) -> Option<&str> {
        self.reservations.get(&tile).map(|s| s.as_str())
    }

    pub fn journal(&self) -> &[HostCall] {
        &self.journal
    }

    pub fn release_count(&self, name: &str) -> usize {
        self.journal
            .iter()
            .filter(|c| matches!(c, HostCall::Release(n) if n == name))
            .count()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_fault(&self, point: FaultPoint) -> Result<(), HostError> {
        if self.faults.contains(&point) {
            Err(HostError::Rejected(format!("injected fault at {:?}", point)))
        } else {
            Ok(())
        }
    }

    fn is_free_for_structure(&self, tile: TileCoord) -> bool {
        !self.walls.contains_key(&tile)
            && !self.openings.contains_key(&tile)
            && !self.constructions.contains_key(&tile)
    }
}

impl BlueprintSource for MemoryHost {
    fn blueprint_lookup(&self, key: &BlueprintKey) -> Result<RoomTemplate, HostError> {
        self.blueprints.blueprint_lookup(key)
    }
}

impl WorkspaceHost for MemoryHost {
    fn workspace_create(&mut self, name: &str) -> Result<WorkspaceHandle, HostError> {
        self.check_fault(FaultPoint::Create)?;
        if self.workspaces.contains_key(name) {
            return Err(HostError::NameInUse(name.to_string()));
        }

        self.workspaces.insert(name.to_string(), FnvHashSet::default());
        self.journal.push(HostCall::Create(name.to_string()));
        Ok(WorkspaceHandle::new(name))
    }

    fn workspace_reserve(
        &mut self,
        workspace: &WorkspaceHandle,
        tiles: &[TileCoord],
    ) -> Result<(), HostError> {
        self.check_fault(FaultPoint::Reserve)?;
        let name = workspace.name();
        if !self.workspaces.contains_key(name) {
            return Err(HostError::NotFound(format!("workspace {}", name)));
        }

        if let Some(tile) = tiles
            .iter()
            .find(|t| self.reservations.get(*t).is_some_and(|owner| owner != name))
        {
            return Err(HostError::TileInUse(*tile));
        }

        for tile in tiles {
            self.reservations.insert(*tile, name.to_string());
        }
        if let Some(reserved) = self.workspaces.get_mut(name) {
            reserved.extend(tiles.iter().copied());
        }
        self.journal
            .push(HostCall::Reserve(name.to_string(), tiles.len()));
        Ok(())
    }

    fn workspace_release(&mut self, workspace: &WorkspaceHandle) {
        let name = workspace.name();
        if let Some(tiles) = self.workspaces.remove(name) {
            for tile in tiles {
                self.reservations.remove(&tile);
            }
        }
        self.staged_furniture.remove(name);
        self.journal.push(HostCall::Release(name.to_string()));
    }
}

impl FurnitureLayer for MemoryHost {
    fn furniture_place(
        &mut self,
        tile: TileCoord,
        furniture: &FurnitureRef,
        room: &WorkspaceHandle,
    ) -> Result<(), HostError> {
        self.check_fault(FaultPoint::PlaceFurniture)?;
        if self.flags(tile).contains(TileFlags::BLOCKED) {
            return Err(HostError::Rejected(format!("{} is blocked", tile)));
        }
        if self.furniture.contains_key(&tile) {
            return Err(HostError::Rejected(format!("{} already has furniture", tile)));
        }

        self.furniture.insert(tile, furniture.clone());
        self.staged_furniture
            .entry(room.name().to_string())
            .or_default()
            .push((tile, furniture.clone()));
        self.journal
            .push(HostCall::PlaceFurniture(tile, furniture.clone()));
        Ok(())
    }
}

impl StructureLayer for MemoryHost {
    fn wall_placeable(&self, tile: TileCoord) -> bool {
        !self
            .flags(tile)
            .intersects(TileFlags::BLOCKED | TileFlags::NO_WALL)
            && self.is_free_for_structure(tile)
    }

    fn wall_place(&mut self, tile: TileCoord, material: &str) -> Result<(), HostError> {
        self.check_fault(FaultPoint::PlaceWall)?;
        if !self.wall_placeable(tile) {
            return Err(HostError::Rejected(format!("wall not placeable at {}", tile)));
        }

        self.walls.insert(tile, material.to_string());
        self.journal.push(HostCall::PlaceWall(tile));
        Ok(())
    }

    fn opening_placeable(&self, tile: TileCoord) -> bool {
        !self
            .flags(tile)
            .intersects(TileFlags::BLOCKED | TileFlags::NO_OPENING)
            && self.is_free_for_structure(tile)
    }

    fn opening_place(&mut self, tile: TileCoord, material: &str) -> Result<(), HostError> {
        self.check_fault(FaultPoint::PlaceOpening)?;
        if !self.opening_placeable(tile) {
            return Err(HostError::Rejected(format!("opening not placeable at {}", tile)));
        }

        self.openings.insert(tile, material.to_string());
        self.journal.push(HostCall::PlaceOpening(tile));
        Ok(())
    }
}

impl ConstructionHost for MemoryHost {
    fn construction_finalize(
        &mut self,
        workspace: &WorkspaceHandle,
        spec: &ConstructionSpec,
    ) -> Result<(), HostError> {
        self.check_fault(FaultPoint::Finalize)?;
        let name = workspace.name();
        let tiles = self
            .workspaces
            .get(name)
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("workspace {}", name)))?;
        if tiles.is_empty() {
            return Err(HostError::Rejected(format!("workspace {} reserves no tiles", name)));
        }

        let id = self.allocate_id();
        for tile in &tiles {
            self.constructions.insert(
                *tile,
                ConstructionRef {
                    id,
                    kind: spec.constructor.clone(),
                },
            );
        }

        let furniture = self.staged_furniture.remove(name).unwrap_or_default();
        self.finalized.push(FinalizedRoom {
            workspace: name.to_string(),
            spec: spec.clone(),
            tiles,
            furniture,
        });
        self.journal.push(HostCall::Finalize(name.to_string()));
        Ok(())
    }
}

impl AreaQuery for MemoryHost {
    fn entities_in_area(&self, area: &FnvHashSet<TileCoord>) -> Vec<EntityRef> {
        self.entities
            .iter()
            .filter(|e| area.contains(&e.tile))
            .cloned()
            .collect()
    }

    fn furniture_in_area(&self, area: &FnvHashSet<TileCoord>) -> Vec<(TileCoord, FurnitureRef)> {
        let mut found: Vec<_> = self
            .furniture
            .iter()
            .filter(|(tile, _)| area.contains(tile))
            .map(|(tile, f)| (*tile, f.clone()))
            .collect();
        found.sort_by_key(|(tile, _)| *tile);
        found
    }

    fn constructions_in_area(
        &self,
        area: &FnvHashSet<TileCoord>,
    ) -> Vec<(TileCoord, ConstructionRef)> {
        let mut found: Vec<_> = self
            .constructions
            .iter()
            .filter(|(tile, _)| area.contains(tile))
            .map(|(tile, c)| (*tile, c.clone()))
            .collect();
        found.sort_by_key(|(tile, _)| *tile);
        found
    }
}
