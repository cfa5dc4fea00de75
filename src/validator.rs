//! Advisory, point-in-time obstruction check over a candidate area.
//!
//! A clear report does not guarantee the later reservation succeeds; the host
//! remains authoritative and may still report `TileInUse`.

use crate::constants::OBSTRUCTION_SAMPLE_CAP;
use crate::host::*;
use crate::location::TileCoord;
use crate::template::FurnitureRef;
use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Count of obstructions in one category with a bounded sample for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstructions<T> {
    pub count: usize,
    pub samples: Vec<T>,
}

impl<T> Obstructions<T> {
    fn collect(items: Vec<T>, cap: usize) -> Self {
        let count = items.len();
        let samples = items.into_iter().take(cap).collect();
        Obstructions { count, samples }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<T> Default for Obstructions<T> {
    fn default() -> Self {
        Obstructions {
            count: 0,
            samples: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstructionReport {
    pub entities: Obstructions<EntityRef>,
    pub furniture: Obstructions<(TileCoord, FurnitureRef)>,
    pub constructions: Obstructions<(TileCoord, ConstructionRef)>,
}

impl ObstructionReport {
    pub fn area_is_clear(&self) -> bool {
        self.entities.is_empty() && self.furniture.is_empty() && self.constructions.is_empty()
    }
}

impl fmt::Display for ObstructionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entities, {} furniture, {} constructions",
            self.entities.count, self.furniture.count, self.constructions.count
        )?;

        if let Some(entity) = self.entities.samples.first() {
            write!(f, "; first entity {} at {}", entity.kind, entity.tile)?;
        }
        if let Some((tile, furniture)) = self.furniture.samples.first() {
            write!(f, "; first furniture {} at {}", furniture, tile)?;
        }
        if let Some((tile, construction)) = self.constructions.samples.first() {
            write!(f, "; first construction {} at {}", construction.kind, tile)?;
        }
        Ok(())
    }
}

/// Query live entities, furniture and constructions over `area`.
pub fn check_area_clear<Q>(host: &Q, area: &FnvHashSet<TileCoord>) -> ObstructionReport
where
    Q: AreaQuery + ?Sized,
{
    check_area_clear_with_cap(host, area, OBSTRUCTION_SAMPLE_CAP)
}

pub fn check_area_clear_with_cap<Q>(
    host: &Q,
    area: &FnvHashSet<TileCoord>,
    sample_cap: usize,
) -> ObstructionReport
where
    Q: AreaQuery + ?Sized,
{
    ObstructionReport {
        entities: Obstructions::collect(host.entities_in_area(area), sample_cap),
        furniture: Obstructions::collect(host.furniture_in_area(area), sample_cap),
        constructions: Obstructions::collect(host.constructions_in_area(area), sample_cap),
    }
}
