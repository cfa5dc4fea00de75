//! Public API for room construction.
//!
//! [`Foreman`] is a fluent builder over [`ForemanConfig`]. It runs the whole
//! control flow: lookup, validation, workspace acquisition, placement,
//! perimeter resolution, door policy, commit, release.

use crate::committer::*;
use crate::config::ForemanConfig;
use crate::error::*;
use crate::geometry::rect_tiles;
use crate::host::*;
use crate::location::TileCoord;
use crate::perimeter::resolve_room;
use crate::placement::*;
use crate::plan::*;
use crate::template::*;
use crate::validator::check_area_clear_with_cap;
use crate::workspace::Workspace;
use log::*;

/// Append-only builder for configuring and running constructions.
#[derive(Clone, Debug, Default)]
pub struct Foreman {
    config: ForemanConfig,
}

impl Foreman {
    /// Start with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForemanConfig) -> Self {
        Foreman { config }
    }

    /// Whether a room without a door candidate is an error (default: true).
    pub fn require_door(mut self, require: bool) -> Self {
        self.config.require_door = require;
        self
    }

    /// Whether to check the area for obstructions first (default: true).
    pub fn validate_area(mut self, validate: bool) -> Self {
        self.config.validate_area = validate;
        self
    }

    pub fn sample_cap(mut self, cap: usize) -> Self {
        self.config.sample_cap = cap;
        self
    }

    pub fn workspace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.workspace_prefix = prefix.into();
        self
    }

    pub fn config(&self) -> &ForemanConfig {
        &self.config
    }

    /// Plan a room without touching the host.
    pub fn plan(&self, template: &RoomTemplate, anchor: TileCoord) -> ConstructionPlan {
        let room = plan_placement(template, anchor);
        let perimeter = resolve_room(&room);

        ConstructionPlan {
            template_name: template.name().to_string(),
            anchor,
            room,
            perimeter,
        }
    }

    /// Look up `key` and build it centered on `center`.
    pub fn construct<H>(
        &self,
        host: &mut H,
        key: &BlueprintKey,
        center: TileCoord,
        spec: &ConstructionSpec,
    ) -> Result<CommitReport, ConstructionError>
    where
        H: Host + ?Sized,
    {
        let template = host.blueprint_lookup(key).map_err(|e| match e {
            HostError::NotFound(_) => ConstructionError::BlueprintNotFound(key.clone()),
            e => ConstructionError::from_host(CommitStep::Lookup, e),
        })?;

        let anchor = anchor_from_center(center, template.width(), template.height());
        debug!("Constructing {} centered on {} (anchor {})", key, center, anchor);

        self.construct_at(host, &template, anchor, spec)
    }

    /// Build `template` with its top-left cell at `anchor`.
    pub fn construct_at<H>(
        &self,
        host: &mut H,
        template: &RoomTemplate,
        anchor: TileCoord,
        spec: &ConstructionSpec,
    ) -> Result<CommitReport, ConstructionError>
    where
        H: CommitHost + AreaQuery + ?Sized,
    {
        if self.config.validate_area {
            let area = rect_tiles(anchor, template.width() as i32, template.height() as i32);
            let report = check_area_clear_with_cap(&*host, &area, self.config.sample_cap);
            if !report.area_is_clear() {
                warn!("Area for '{}' at {} is obstructed: {}", template.name(), anchor, report);
                return Err(ConstructionError::ValidationFailed(report));
            }
        }

        let mut workspace = Workspace::create_unique(host, &self.config.workspace_prefix)?;

        let plan = self.plan(template, anchor);
        debug!(
            "Planned '{}': {} room tiles, {} edge tiles, door {:?}",
            plan.template_name,
            plan.room.room_tiles.len(),
            plan.perimeter.edges.len(),
            plan.door()
        );

        if plan.door().is_none() && self.config.require_door {
            warn!(
                "No door candidate for '{}' at {} ({} entrance hints)",
                template.name(),
                anchor,
                plan.room.entrance_tiles.len()
            );
            workspace.mark_aborted();
            workspace.release();
            return Err(ConstructionError::NoDoorCandidate);
        }

        commit_plan(&plan, spec, workspace)
    }
}
