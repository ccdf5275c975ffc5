//! Placeholders: the non-functional markers a plan is made of, which an
//! external construction system later materialises.

use serde::{Deserialize, Serialize};

use crate::config::ModuleRequest;
use crate::geometry::{Direction, Footprint, GridPosition, Rect};
use crate::id::{EntityTypeId, QualityId, RemovalTag};

// ---------------------------------------------------------------------------
// Kinds and collision priority
// ---------------------------------------------------------------------------

/// Which end of an underground bridge a placeholder is, relative to flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BridgeRole {
    /// Upstream end: where the stream resurfaces before a unit's exhaust.
    Exit,
    /// Downstream end: the unit's exhaust tile, where the stream dives.
    Entry,
}

/// What a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceholderKind {
    Unit,
    Segment,
    Bridge(BridgeRole),
    PowerNode,
    Emitter,
    FluidSegment,
}

/// Collision classes, used to pick a survivor when placeholders overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlaceholderClass {
    Emitter,
    PowerNode,
    FluidSegment,
    LineSegment,
    Unit,
}

/// Collision priority, lowest first. On overlap the earlier class is dropped.
pub const COLLISION_ORDER: [PlaceholderClass; 5] = [
    PlaceholderClass::Emitter,
    PlaceholderClass::PowerNode,
    PlaceholderClass::FluidSegment,
    PlaceholderClass::LineSegment,
    PlaceholderClass::Unit,
];

impl PlaceholderClass {
    /// Rank in [`COLLISION_ORDER`]; higher survives.
    pub fn priority(self) -> usize {
        COLLISION_ORDER
            .iter()
            .position(|c| *c == self)
            .unwrap_or(0)
    }
}

impl PlaceholderKind {
    pub fn class(&self) -> PlaceholderClass {
        match self {
            PlaceholderKind::Unit => PlaceholderClass::Unit,
            PlaceholderKind::Segment | PlaceholderKind::Bridge(_) => PlaceholderClass::LineSegment,
            PlaceholderKind::PowerNode => PlaceholderClass::PowerNode,
            PlaceholderKind::Emitter => PlaceholderClass::Emitter,
            PlaceholderKind::FluidSegment => PlaceholderClass::FluidSegment,
        }
    }
}

// ---------------------------------------------------------------------------
// Placeholder
// ---------------------------------------------------------------------------

/// One entity to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub entity: EntityTypeId,
    /// Top-left tile.
    pub position: GridPosition,
    pub footprint: Footprint,
    /// Facing for units, flow for line segments; `None` for undirected kinds.
    pub direction: Option<Direction>,
    #[serde(default)]
    pub quality: Option<QualityId>,
    #[serde(default)]
    pub modules: Vec<ModuleRequest>,
    #[serde(default)]
    pub tag: Option<RemovalTag>,
}

impl Placeholder {
    /// A single-tile placeholder with no quality, modules or tag.
    pub fn tile(
        kind: PlaceholderKind,
        entity: EntityTypeId,
        position: GridPosition,
        direction: Option<Direction>,
    ) -> Self {
        Self {
            kind,
            entity,
            position,
            footprint: Footprint::single(),
            direction,
            quality: None,
            modules: Vec::new(),
            tag: None,
        }
    }

    /// The tiles this placeholder occupies.
    pub fn tiles(&self) -> impl Iterator<Item = GridPosition> + use<> {
        self.footprint.tiles(self.position)
    }

    pub fn rect(&self) -> Rect {
        self.footprint.rect(self.position)
    }
}

// ---------------------------------------------------------------------------
// Plan / RemovalList
// ---------------------------------------------------------------------------

/// Counts describing a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    pub units: usize,
    pub lines: usize,
    pub line_segments: usize,
    pub bridges: usize,
    pub power_nodes: usize,
    pub emitters: usize,
    pub fluid_segments: usize,
    /// Extraction points inside the reach of no placed unit.
    pub uncovered_points: usize,
}

/// Forward planning result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub placeholders: Vec<Placeholder>,
    /// Placeholders discarded by the collision pass.
    pub dropped_count: usize,
    /// Placeholders withheld because a permanent structure stands there.
    pub excluded_count: usize,
    /// Origins of obstructions tagged for deconstruction.
    pub deconstruct: Vec<GridPosition>,
    pub stats: PlanStats,
}

impl Plan {
    /// Placeholders of one kind, in plan order.
    pub fn of_kind(&self, kind: PlaceholderKind) -> impl Iterator<Item = &Placeholder> {
        self.placeholders.iter().filter(move |p| p.kind == kind)
    }
}

/// Reverse (ghost removal) result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalList {
    pub placeholders: Vec<Placeholder>,
}

impl RemovalList {
    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }
}
