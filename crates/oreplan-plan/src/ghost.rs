//! Ghost index and Ghost Remover.
//!
//! The ghost index stands in for the construction system's world: it holds
//! materialised placeholders keyed by slot-map ids, with a tile lookup so
//! every tile carries at most one ghost. Ghosts materialised from a plan
//! remember the bounds of the region they were planned for, so removing one
//! region never takes ghosts owned by a neighbouring plan.

use std::collections::BTreeMap;

use oreplan_core::geometry::{GridPosition, Rect};
use oreplan_core::id::PLANNER_TAG;
use oreplan_core::placeholder::{Placeholder, RemovalList};
use oreplan_core::region::Region;
use slotmap::{SecondaryMap, SlotMap, new_key_type};

new_key_type! {
    /// Identifies a ghost within a [`GhostIndex`].
    pub struct GhostId;
}

/// Errors from ghost index operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GhostError {
    #[error("tile {0:?} is occupied by another ghost")]
    Occupied(GridPosition),
    #[error("ghost is not in the index")]
    NotFound,
}

/// Materialised placeholders with a tile -> ghost lookup.
#[derive(Debug, Clone, Default)]
pub struct GhostIndex {
    ghosts: SlotMap<GhostId, Placeholder>,
    tiles: BTreeMap<GridPosition, GhostId>,
    /// Bounds of the region whose plan produced the ghost.
    owners: SecondaryMap<GhostId, Rect>,
}

impl GhostIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ghost. Fails without changing the index if any of its tiles is
    /// already taken.
    pub fn place(&mut self, placeholder: Placeholder) -> Result<GhostId, GhostError> {
        if let Some(tile) = placeholder.tiles().find(|t| self.tiles.contains_key(t)) {
            return Err(GhostError::Occupied(tile));
        }
        let tiles: Vec<GridPosition> = placeholder.tiles().collect();
        let id = self.ghosts.insert(placeholder);
        for tile in tiles {
            self.tiles.insert(tile, id);
        }
        Ok(id)
    }

    pub fn remove(&mut self, id: GhostId) -> Result<Placeholder, GhostError> {
        let placeholder = self.ghosts.remove(id).ok_or(GhostError::NotFound)?;
        self.owners.remove(id);
        for tile in placeholder.tiles() {
            self.tiles.remove(&tile);
        }
        Ok(placeholder)
    }

    /// Materialise every placeholder of the plan made for `owner`, stopping
    /// at the first clash.
    pub fn materialize<'a>(
        &mut self,
        owner: &Region,
        placeholders: impl IntoIterator<Item = &'a Placeholder>,
    ) -> Result<Vec<GhostId>, GhostError> {
        let bounds = owner.bounds();
        placeholders
            .into_iter()
            .map(|p| -> Result<GhostId, GhostError> {
                let id = self.place(p.clone())?;
                self.owners.insert(id, bounds);
                Ok(id)
            })
            .collect()
    }

    pub fn get(&self, id: GhostId) -> Option<&Placeholder> {
        self.ghosts.get(id)
    }

    /// Bounds of the region the ghost was planned for, if it came from a plan.
    pub fn owner(&self, id: GhostId) -> Option<Rect> {
        self.owners.get(id).copied()
    }

    pub fn ghost_at(&self, pos: GridPosition) -> Option<GhostId> {
        self.tiles.get(&pos).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GhostId, &Placeholder)> {
        self.ghosts.iter()
    }

    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }
}

/// Remove every planner-tagged ghost touching the region or the one-tile
/// margin around it, all kinds together.
///
/// Only ghosts belonging to the region are taken: a ghost from a plan counts
/// when that plan's region overlaps this one, any other ghost when its anchor
/// lies inside the region. The returned list is sorted by position so the
/// result does not depend on slot allocation.
pub fn remove_ghosts(index: &mut GhostIndex, region: &Region) -> RemovalList {
    let bounds = region.bounds();
    let area = bounds.expanded(1);
    let doomed: Vec<GhostId> = index
        .iter()
        .filter(|(id, p)| {
            let owned = match index.owner(*id) {
                Some(owner) => owner.intersects(&bounds),
                None => bounds.contains(p.position),
            };
            p.tag == Some(PLANNER_TAG) && p.rect().intersects(&area) && owned
        })
        .map(|(id, _)| id)
        .collect();

    let mut placeholders: Vec<Placeholder> = doomed
        .into_iter()
        .filter_map(|id| index.remove(id).ok())
        .collect();
    placeholders.sort_by_key(|p| (p.position, p.kind.class()));
    log::debug!("removed {} ghosts", placeholders.len());
    RemovalList { placeholders }
}
