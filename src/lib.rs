pub mod committer;
pub mod config;
pub mod constants;
pub mod error;
pub mod foreman;
pub mod geometry;
pub mod host;
pub mod location;
pub mod perimeter;
pub mod placement;
pub mod plan;
pub mod template;
pub mod validator;
pub mod workspace;

pub mod visual;
pub use visual::*;

pub use committer::{commit, commit_plan, CommitReport};
pub use config::ForemanConfig;
pub use error::{CommitStep, ConstructionError, HostError};
pub use foreman::Foreman;
pub use location::TileCoord;
pub use perimeter::{resolve_perimeter, Perimeter};
pub use placement::{anchor_from_center, plan_placement, PlacedFurniture, RoomInstance};
pub use plan::{ConstructionPlan, ConstructionSpec, PlanOperation};
pub use template::{BlueprintKey, BlueprintRegistry, Cell, FurnitureRef, Rotation, RoomTemplate};
pub use validator::{check_area_clear, ObstructionReport};
pub use workspace::{Workspace, WorkspaceState};
