//! Host collaborator interfaces.
//!
//! The core never touches host registries directly. Every query or mutation
//! goes through one of these narrow traits, so an in-memory grid
//! ([`memory::MemoryHost`]) can stand in for the real simulation.

pub mod memory;

use crate::error::HostError;
use crate::location::TileCoord;
use crate::plan::ConstructionSpec;
use crate::template::*;
use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-side identity of a live workspace. Doubles as the room handle passed
/// to furniture placement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceHandle {
    name: String,
}

impl WorkspaceHandle {
    pub fn new(name: impl Into<String>) -> Self {
        WorkspaceHandle { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for WorkspaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A live entity (pawn, animal, item) standing on a tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: u64,
    pub kind: String,
    pub tile: TileCoord,
}

/// An in-progress or finalized construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructionRef {
    pub id: u64,
    pub kind: String,
}

pub trait BlueprintSource {
    fn blueprint_lookup(&self, key: &BlueprintKey) -> Result<RoomTemplate, HostError>;
}

impl BlueprintSource for BlueprintRegistry {
    fn blueprint_lookup(&self, key: &BlueprintKey) -> Result<RoomTemplate, HostError> {
        self.get(key)
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("blueprint {}", key)))
    }
}

/// Named, exclusive tile reservations.
pub trait WorkspaceHost {
    /// Fails with [`HostError::NameInUse`] if a live workspace has this name.
    fn workspace_create(&mut self, name: &str) -> Result<WorkspaceHandle, HostError>;

    /// Reserve all `tiles` or none. Fails with [`HostError::TileInUse`] if any
    /// tile belongs to another live workspace.
    fn workspace_reserve(
        &mut self,
        workspace: &WorkspaceHandle,
        tiles: &[TileCoord],
    ) -> Result<(), HostError>;

    /// Drop the workspace and every reservation it holds.
    fn workspace_release(&mut self, workspace: &WorkspaceHandle);
}

pub trait FurnitureLayer {
    fn furniture_place(
        &mut self,
        tile: TileCoord,
        furniture: &FurnitureRef,
        room: &WorkspaceHandle,
    ) -> Result<(), HostError>;
}

/// Wall and opening placement on perimeter tiles.
pub trait StructureLayer {
    fn wall_placeable(&self, tile: TileCoord) -> bool;

    fn wall_place(&mut self, tile: TileCoord, material: &str) -> Result<(), HostError>;

    fn opening_placeable(&self, tile: TileCoord) -> bool;

    fn opening_place(&mut self, tile: TileCoord, material: &str) -> Result<(), HostError>;
}

pub trait ConstructionHost {
    /// Snapshot the workspace (furniture included) into a persistent room.
    fn construction_finalize(
        &mut self,
        workspace: &WorkspaceHandle,
        spec: &ConstructionSpec,
    ) -> Result<(), HostError>;
}

/// Read-only queries over live host state.
pub trait AreaQuery {
    fn entities_in_area(&self, area: &FnvHashSet<TileCoord>) -> Vec<EntityRef>;

    fn furniture_in_area(&self, area: &FnvHashSet<TileCoord>) -> Vec<(TileCoord, FurnitureRef)>;

    fn constructions_in_area(
        &self,
        area: &FnvHashSet<TileCoord>,
    ) -> Vec<(TileCoord, ConstructionRef)>;
}

/// Everything a commit needs from the host.
pub trait CommitHost: WorkspaceHost + FurnitureLayer + StructureLayer + ConstructionHost {}

impl<T> CommitHost for T where
    T: WorkspaceHost + FurnitureLayer + StructureLayer + ConstructionHost + ?Sized
{
}

/// The full collaborator surface.
pub trait Host: BlueprintSource + CommitHost + AreaQuery {}

impl<T> Host for T where T: BlueprintSource + CommitHost + AreaQuery + ?Sized {}
