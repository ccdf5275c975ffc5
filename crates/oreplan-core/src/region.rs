//! The selected area being planned: its bounds, extraction points and the
//! obstructions already standing on it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::geometry::{Footprint, GridPosition, Rect};
use crate::id::MaterialId;

/// A single extractable tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPoint {
    pub position: GridPosition,
    pub material: MaterialId,
    /// Extraction here needs a fluid input on the unit.
    pub fluid_required: bool,
}

/// What kind of thing is in the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstructionKind {
    /// Removable clutter (trees, rocks). Tagged for deconstruction.
    Clutter,
    /// A permanent structure. Overwritten only in destructive mode.
    Structure,
}

/// Something already occupying tiles of the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstruction {
    pub position: GridPosition,
    pub footprint: Footprint,
    pub kind: ObstructionKind,
}

impl Obstruction {
    pub fn rect(&self) -> Rect {
        self.footprint.rect(self.position)
    }
}

/// An axis-aligned rectangle of tiles with its extraction points.
///
/// Points and obstructions are stored in ordered maps so iteration, and
/// therefore planning, is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    bounds: Rect,
    points: BTreeMap<GridPosition, ExtractionPoint>,
    obstructions: Vec<Obstruction>,
}

impl Region {
    /// An empty region covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            points: BTreeMap::new(),
            obstructions: Vec::new(),
        }
    }

    /// Add an extraction point. Returns `false` (and ignores it) when the
    /// point lies outside the bounds.
    pub fn insert_point(&mut self, point: ExtractionPoint) -> bool {
        if !self.bounds.contains(point.position) {
            return false;
        }
        self.points.insert(point.position, point);
        true
    }

    /// Fill every tile of `rect` (clipped to the bounds) with `material`.
    pub fn fill(&mut self, rect: Rect, material: MaterialId, fluid_required: bool) {
        for position in rect.tiles() {
            self.insert_point(ExtractionPoint {
                position,
                material,
                fluid_required,
            });
        }
    }

    /// Add an obstruction. Returns `false` when it does not touch the bounds.
    pub fn insert_obstruction(&mut self, obstruction: Obstruction) -> bool {
        if !self.bounds.intersects(&obstruction.rect()) {
            return false;
        }
        self.obstructions.push(obstruction);
        true
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn point_at(&self, pos: GridPosition) -> Option<&ExtractionPoint> {
        self.points.get(&pos)
    }

    pub fn points(&self) -> impl Iterator<Item = &ExtractionPoint> {
        self.points.values()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Whether the region has no extraction points at all.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn obstructions(&self) -> &[Obstruction] {
        &self.obstructions
    }

    /// Distinct materials present, in ascending order.
    pub fn materials(&self) -> BTreeSet<MaterialId> {
        self.points.values().map(|p| p.material).collect()
    }

    /// Whether any extraction point needs fluid.
    pub fn requires_fluid(&self) -> bool {
        self.points.values().any(|p| p.fluid_required)
    }
}
