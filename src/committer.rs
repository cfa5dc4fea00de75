//! Applies a resolved room to the host as one transaction.
//!
//! Steps run in a fixed order; the first failure aborts the rest. The
//! workspace is released on every path, success or failure. Walls that were
//! already placed are not rolled back.

use crate::error::*;
use crate::host::*;
use crate::location::TileCoord;
use crate::perimeter::Perimeter;
use crate::plan::*;
use crate::placement::RoomInstance;
use crate::workspace::*;
use log::*;
use serde::{Deserialize, Serialize};

/// Outcome of a successful commit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub workspace: String,
    pub furniture_placed: usize,
    pub walls_placed: usize,
    /// Wall tiles the host would not accept, left as they were.
    pub walls_skipped: Vec<TileCoord>,
    pub door: Option<TileCoord>,
}

/// Commit `room` and its `perimeter` to the host.
///
/// 1. Reserve every room tile in the workspace.
/// 2. Place furniture (before finalization snapshots the room).
/// 3. Place walls on placeable wall tiles and skip the rest.
/// 4. Place the door, failing with `DoorPlacementFailed` if it cannot be placed.
/// 5. Finalize the construction with `spec`.
/// 6. Release the workspace, always.
pub fn commit<H>(
    room: &RoomInstance,
    perimeter: &Perimeter,
    spec: &ConstructionSpec,
    mut workspace: Workspace<'_, H>,
) -> Result<CommitReport, ConstructionError>
where
    H: CommitHost + ?Sized,
{
    let result = run_steps(room, perimeter, spec, &mut workspace);

    match &result {
        Ok(report) => {
            workspace.mark_committed();
            debug!(
                "Committed room in workspace '{}': {} furniture, {} walls ({} skipped), door {:?}",
                report.workspace,
                report.furniture_placed,
                report.walls_placed,
                report.walls_skipped.len(),
                report.door
            );
        }
        Err(err) => {
            workspace.mark_aborted();
            warn!(
                "Commit in workspace '{}' failed at {}: {}",
                workspace.name(),
                err.step(),
                err
            );
        }
    }

    workspace.release();
    result
}

/// Commit a [`ConstructionPlan`].
pub fn commit_plan<H>(
    plan: &ConstructionPlan,
    spec: &ConstructionSpec,
    workspace: Workspace<'_, H>,
) -> Result<CommitReport, ConstructionError>
where
    H: CommitHost + ?Sized,
{
    commit(&plan.room, &plan.perimeter, spec, workspace)
}

fn run_steps<H>(
    room: &RoomInstance,
    perimeter: &Perimeter,
    spec: &ConstructionSpec,
    workspace: &mut Workspace<'_, H>,
) -> Result<CommitReport, ConstructionError>
where
    H: CommitHost + ?Sized,
{
    workspace.reserve(room.room_tiles.iter().copied())?;

    let handle = workspace.handle().clone();
    let mut report = CommitReport {
        workspace: handle.name().to_string(),
        ..Default::default()
    };

    let host = workspace.host_mut();
    for op in build_operations(room, perimeter) {
        match op {
            PlanOperation::PlaceFurniture {
                location,
                furniture,
            } => {
                host.furniture_place(location, &furniture, &handle)
                    .map_err(|e| ConstructionError::from_host(CommitStep::PlaceFurniture, e))?;
                report.furniture_placed += 1;
            }
            PlanOperation::PlaceWall { location } => {
                if host.wall_placeable(location) {
                    host.wall_place(location, &spec.material)
                        .map_err(|e| ConstructionError::from_host(CommitStep::PlaceWalls, e))?;
                    report.walls_placed += 1;
                } else {
                    debug!("Skipping wall at {}: not placeable", location);
                    report.walls_skipped.push(location);
                }
            }
            PlanOperation::PlaceOpening { location } => {
                if !host.opening_placeable(location) {
                    return Err(ConstructionError::DoorPlacementFailed(location));
                }
                host.opening_place(location, &spec.material)
                    .map_err(|e| ConstructionError::from_host(CommitStep::PlaceDoor, e))?;
                report.door = Some(location);
            }
        }
    }

    host.construction_finalize(&handle, spec)
        .map_err(|e| ConstructionError::from_host(CommitStep::Finalize, e))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::*;
    use crate::perimeter::resolve_room;
    use crate::placement::plan_placement;
    use crate::template::RoomTemplate;
    use rstest::rstest;

    fn setup() -> (RoomInstance, Perimeter, ConstructionSpec) {
        let template =
            RoomTemplate::from_rows("x", &["BBe", "...", "..."], &[('B', "bed")]).unwrap();
        let room = plan_placement(&template, TileCoord::new(10, 10));
        let perimeter = resolve_room(&room);
        (room, perimeter, ConstructionSpec::new("bedroom", "wood"))
    }

    #[test]
    fn successful_commit_places_everything_and_releases() {
        let (room, perimeter, spec) = setup();
        let mut host = MemoryHost::new();
        let ws = Workspace::create(&mut host, "ws").unwrap();

        let report = commit(&room, &perimeter, &spec, ws).unwrap();
        assert_eq!(report.furniture_placed, 1);
        assert_eq!(report.walls_placed, 15);
        assert_eq!(report.door, Some(TileCoord::new(12, 9)));

        assert_eq!(host.release_count("ws"), 1);
        assert_eq!(host.live_workspaces(), 0);
        assert_eq!(host.finalized_rooms().len(), 1);
        assert!(host.has_opening(TileCoord::new(12, 9)));
        assert_eq!(
            host.furniture_at(TileCoord::new(10, 10)).map(|f| f.def.as_str()),
            Some("bed")
        );
    }

    #[test]
    fn unplaceable_walls_are_skipped() {
        let (room, perimeter, spec) = setup();
        let mut host = MemoryHost::new();
        host.add_wall(TileCoord::new(9, 9), "granite");
        host.set_flags(TileCoord::new(13, 12), TileFlags::NO_WALL);

        let ws = Workspace::create(&mut host, "ws").unwrap();
        let report = commit(&room, &perimeter, &spec, ws).unwrap();
        assert_eq!(report.walls_placed, 13);
        assert_eq!(
            report.walls_skipped,
            vec![TileCoord::new(9, 9), TileCoord::new(13, 12)]
        );
    }

    #[test]
    fn blocked_door_fails_after_walls() {
        let (room, perimeter, spec) = setup();
        let mut host = MemoryHost::new();
        host.set_flags(TileCoord::new(12, 9), TileFlags::NO_OPENING);

        let ws = Workspace::create(&mut host, "ws").unwrap();
        let err = commit(&room, &perimeter, &spec, ws).unwrap_err();
        assert_eq!(err, ConstructionError::DoorPlacementFailed(TileCoord::new(12, 9)));
        assert_eq!(err.step(), CommitStep::PlaceDoor);

        assert!(host.has_wall(TileCoord::new(9, 9)));
        assert!(host.finalized_rooms().is_empty());
        assert_eq!(host.release_count("ws"), 1);
    }

    #[test]
    fn finalize_failure_reports_step() {
        let (room, perimeter, spec) = setup();
        let mut host = MemoryHost::new();
        host.inject_fault(FaultPoint::Finalize);

        let ws = Workspace::create(&mut host, "ws").unwrap();
        let err = commit(&room, &perimeter, &spec, ws).unwrap_err();
        assert_eq!(err.step(), CommitStep::Finalize);
        assert_eq!(host.release_count("ws"), 1);
        assert!(host.reserved_by(TileCoord::new(10, 10)).is_none());
    }

    #[rstest]
    #[case(FaultPoint::Reserve, CommitStep::Reserve)]
    #[case(FaultPoint::PlaceFurniture, CommitStep::PlaceFurniture)]
    #[case(FaultPoint::PlaceWall, CommitStep::PlaceWalls)]
    #[case(FaultPoint::PlaceOpening, CommitStep::PlaceDoor)]
    #[case(FaultPoint::Finalize, CommitStep::Finalize)]
    fn host_failure_reports_its_step(#[case] fault: FaultPoint, #[case] step: CommitStep) {
        let (room, perimeter, spec) = setup();
        let mut host = MemoryHost::new();
        host.inject_fault(fault);

        let ws = Workspace::create(&mut host, "ws").unwrap();
        let err = commit(&room, &perimeter, &spec, ws).unwrap_err();

        assert_eq!(err.step(), step);
        assert!(matches!(err, ConstructionError::Host { .. }));
        assert_eq!(host.release_count("ws"), 1);
        assert_eq!(host.live_workspaces(), 0);
        assert!(host.finalized_rooms().is_empty());
    }

    #[test]
    fn create_failure_reports_its_step() {
        let mut host = MemoryHost::new();
        host.inject_fault(FaultPoint::Create);

        let err = Workspace::create(&mut host, "ws").err().unwrap();
        assert_eq!(err.step(), CommitStep::CreateWorkspace);
        assert_eq!(host.release_count("ws"), 0);
    }
}
