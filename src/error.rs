use crate::location::TileCoord;
use crate::template::BlueprintKey;
use crate::validator::ObstructionReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure reported by a host collaborator.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum HostError {
    #[error("workspace name {0:?} is already in use")]
    NameInUse(String),
    #[error("tile {0} is already reserved by another workspace")]
    TileInUse(TileCoord),
    #[error("{0} not found")]
    NotFound(String),
    #[error("host rejected the operation: {0}")]
    Rejected(String),
}

/// The stage of a construction that failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CommitStep {
    Lookup,
    Validate,
    CreateWorkspace,
    Reserve,
    PlaceFurniture,
    PlaceWalls,
    PlaceDoor,
    Finalize,
}

impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitStep::Lookup => "blueprint lookup",
            CommitStep::Validate => "area validation",
            CommitStep::CreateWorkspace => "workspace creation",
            CommitStep::Reserve => "tile reservation",
            CommitStep::PlaceFurniture => "furniture placement",
            CommitStep::PlaceWalls => "wall placement",
            CommitStep::PlaceDoor => "door placement",
            CommitStep::Finalize => "construction finalization",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("target area is obstructed: {0}")]
    ValidationFailed(ObstructionReport),
    #[error("blueprint {0} not found")]
    BlueprintNotFound(BlueprintKey),
    #[error("workspace name {0:?} is already in use")]
    NameInUse(String),
    #[error("tile {0} is already reserved by another workspace")]
    TileInUse(TileCoord),
    #[error("no edge tile touches an entrance hint; the room cannot get a door")]
    NoDoorCandidate,
    #[error("door could not be placed at {0}")]
    DoorPlacementFailed(TileCoord),
    #[error("host error during {step}: {source}")]
    Host {
        step: CommitStep,
        #[source]
        source: HostError,
    },
}

impl ConstructionError {
    /// Lift a collaborator failure, keeping race errors as their own variants.
    pub fn from_host(step: CommitStep, source: HostError) -> Self {
        match source {
            HostError::NameInUse(name) => ConstructionError::NameInUse(name),
            HostError::TileInUse(tile) => ConstructionError::TileInUse(tile),
            source => ConstructionError::Host { step, source },
        }
    }

    /// The stage that failed.
    pub fn step(&self) -> CommitStep {
        match self {
            ConstructionError::ValidationFailed(_) => CommitStep::Validate,
            ConstructionError::BlueprintNotFound(_) => CommitStep::Lookup,
            ConstructionError::NameInUse(_) => CommitStep::CreateWorkspace,
            ConstructionError::TileInUse(_) => CommitStep::Reserve,
            ConstructionError::NoDoorCandidate => CommitStep::PlaceDoor,
            ConstructionError::DoorPlacementFailed(_) => CommitStep::PlaceDoor,
            ConstructionError::Host { step, .. } => *step,
        }
    }

    /// Host races and validation failures can succeed on a later attempt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ConstructionError::Host { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_races_keep_their_own_variant() {
        let err = ConstructionError::from_host(
            CommitStep::Reserve,
            HostError::TileInUse(TileCoord::new(3, 4)),
        );
        assert_eq!(err, ConstructionError::TileInUse(TileCoord::new(3, 4)));
        assert_eq!(err.step(), CommitStep::Reserve);
        assert!(err.is_recoverable());
    }

    #[test]
    fn opaque_host_errors_carry_the_step() {
        let err = ConstructionError::from_host(
            CommitStep::Finalize,
            HostError::Rejected("no builder".into()),
        );
        assert_eq!(err.step(), CommitStep::Finalize);
        assert!(!err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "host error during construction finalization: host rejected the operation: no builder"
        );
    }
}
