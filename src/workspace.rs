//! Scoped tile reservation.
//!
//! A [`Workspace`] owns a named host reservation for the length of one
//! construction. It moves through `Created -> Marked -> Committed | Aborted ->
//! Released`. Release happens exactly once: explicitly through
//! [`Workspace::release`], or on drop for every other exit path. A leaked
//! workspace would leave its tiles locked on the host permanently.

use crate::error::*;
use crate::host::*;
use crate::location::TileCoord;
use fnv::FnvHashSet;
use itertools::Itertools;
use log::*;
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkspaceState {
    Created,
    Marked,
    Committed,
    Aborted,
    Released,
}

/// A live reservation scope.
///
/// The workspace borrows the host mutably for its whole lifetime; later steps
/// reach the host through [`Workspace::host_mut`].
pub struct Workspace<'h, H: WorkspaceHost + ?Sized> {
    host: &'h mut H,
    handle: WorkspaceHandle,
    state: WorkspaceState,
    reserved: FnvHashSet<TileCoord>,
}

impl<'h, H: WorkspaceHost + ?Sized> Workspace<'h, H> {
    /// Create a workspace with a caller-supplied name.
    pub fn create(host: &'h mut H, name: &str) -> Result<Self, ConstructionError> {
        let handle = host
            .workspace_create(name)
            .map_err(|e| ConstructionError::from_host(CommitStep::CreateWorkspace, e))?;

        debug!("Workspace '{}' created", handle);

        Ok(Workspace {
            host,
            handle,
            state: WorkspaceState::Created,
            reserved: FnvHashSet::default(),
        })
    }

    /// Create a workspace named `{prefix}-{uuid}`.
    pub fn create_unique(host: &'h mut H, prefix: &str) -> Result<Self, ConstructionError> {
        let name = format!("{}-{}", prefix, Uuid::new_v4());
        Self::create(host, &name)
    }

    pub fn handle(&self) -> &WorkspaceHandle {
        &self.handle
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn state(&self) -> WorkspaceState {
        self.state
    }

    pub fn reserved_tiles(&self) -> &FnvHashSet<TileCoord> {
        &self.reserved
    }

    pub fn host(&self) -> &H {
        &*self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut *self.host
    }

    /// Reserve `tiles` on the host, all or nothing, in scan order.
    ///
    /// A `TileInUse` race aborts the workspace; the caller must not attempt
    /// further mutations.
    pub fn reserve<I>(&mut self, tiles: I) -> Result<(), ConstructionError>
    where
        I: IntoIterator<Item = TileCoord>,
    {
        let tiles: Vec<TileCoord> = tiles
            .into_iter()
            .filter(|t| !self.reserved.contains(t))
            .sorted()
            .dedup()
            .collect();

        match self.host.workspace_reserve(&self.handle, &tiles) {
            Ok(()) => {
                debug!("Workspace '{}' reserved {} tiles", self.handle, tiles.len());
                self.reserved.extend(tiles);
                self.state = WorkspaceState::Marked;
                Ok(())
            }
            Err(e) => {
                warn!("Workspace '{}' reservation rejected: {}", self.handle, e);
                self.state = WorkspaceState::Aborted;
                Err(ConstructionError::from_host(CommitStep::Reserve, e))
            }
        }
    }

    pub fn mark_committed(&mut self) {
        self.state = WorkspaceState::Committed;
    }

    pub fn mark_aborted(&mut self) {
        self.state = WorkspaceState::Aborted;
    }

    /// Release the reservation. Returns the state the workspace ended in
    /// (`Committed` or `Aborted`).
    pub fn release(mut self) -> WorkspaceState {
        let outcome = match self.state {
            WorkspaceState::Committed => WorkspaceState::Committed,
            _ => WorkspaceState::Aborted,
        };
        self.release_inner();
        outcome
    }

    fn release_inner(&mut self) {
        if self.state == WorkspaceState::Released {
            return;
        }

        self.host.workspace_release(&self.handle);
        debug!(
            "Workspace '{}' released ({:?}, {} tiles)",
            self.handle,
            self.state,
            self.reserved.len()
        );
        self.reserved.clear();
        self.state = WorkspaceState::Released;
    }
}

impl<H: WorkspaceHost + ?Sized> Drop for Workspace<'_, H> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;

    #[test]
    fn drop_releases_exactly_once() {
        let mut host = MemoryHost::new();
        {
            let mut ws = Workspace::create(&mut host, "kitchen").unwrap();
            ws.reserve([TileCoord::new(0, 0), TileCoord::new(1, 0)]).unwrap();
            assert_eq!(ws.state(), WorkspaceState::Marked);
        }
        assert_eq!(host.release_count("kitchen"), 1);
        assert!(host.reserved_by(TileCoord::new(0, 0)).is_none());
    }

    #[test]
    fn explicit_release_is_not_repeated_on_drop() {
        let mut host = MemoryHost::new();
        let mut ws = Workspace::create(&mut host, "kitchen").unwrap();
        ws.mark_committed();
        assert_eq!(ws.release(), WorkspaceState::Committed);
        assert_eq!(host.release_count("kitchen"), 1);
    }

    #[test]
    fn duplicate_name_is_reported() {
        let mut host = MemoryHost::new();
        host.workspace_create("kitchen").unwrap();
        let err = Workspace::create(&mut host, "kitchen").err().unwrap();
        assert_eq!(err, ConstructionError::NameInUse("kitchen".to_string()));
        assert_eq!(host.release_count("kitchen"), 0);
    }

    #[test]
    fn overlapping_reservation_aborts_without_mutation() {
        let mut host = MemoryHost::new();
        let other = host.workspace_create("other").unwrap();
        host.workspace_reserve(&other, &[TileCoord::new(1, 0)]).unwrap();

        {
            let mut ws = Workspace::create(&mut host, "mine").unwrap();
            let err = ws
                .reserve([TileCoord::new(0, 0), TileCoord::new(1, 0)])
                .unwrap_err();
            assert_eq!(err, ConstructionError::TileInUse(TileCoord::new(1, 0)));
            assert_eq!(ws.state(), WorkspaceState::Aborted);
            assert!(ws.reserved_tiles().is_empty());
        }

        assert!(host.reserved_by(TileCoord::new(0, 0)).is_none());
        assert_eq!(host.reserved_by(TileCoord::new(1, 0)), Some("other"));
        assert_eq!(host.release_count("mine"), 1);
    }

    #[test]
    fn generated_names_are_unique() {
        let mut host = MemoryHost::new();
        let a = Workspace::create_unique(&mut host, "room").unwrap();
        let a_name = a.name().to_string();
        drop(a);
        let b = Workspace::create_unique(&mut host, "room").unwrap();
        assert!(a_name.starts_with("room-"));
        assert_ne!(a_name, b.name());
    }
}
