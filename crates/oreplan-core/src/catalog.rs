//! The compatibility catalog: geometric specs for every entity type the
//! planner may be asked to place.
//!
//! Unlock gating happens upstream; the planner trusts every identifier that
//! made it into the catalog.

use std::collections::HashMap;

use crate::fixed::Fixed64;
use crate::id::EntityTypeId;

/// An extraction unit (mining drill).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSpec {
    /// Line-facing side, in tiles.
    pub width: u32,
    /// Depth away from the line, in tiles.
    pub height: u32,
    /// Side of the square extraction area centred on the footprint.
    pub reach: u32,
    pub fluid_input: bool,
    pub module_slots: u8,
}

/// A transport-line segment and its underground bridge companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpec {
    pub bridge: EntityTypeId,
    /// Furthest distance, in tiles, between a bridge's two endpoints.
    pub max_bridge_span: u32,
}

/// A power-distribution node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpec {
    /// Half-width of the square supply area around the node centre.
    pub coverage_radius: Fixed64,
    /// Maximum centre-to-centre distance for an automatic link.
    pub link_reach: Fixed64,
}

/// A square effect emitter (beacon).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterSpec {
    pub size: u32,
    /// Tiles the effect area extends past each edge of the footprint.
    pub effect_radius: u32,
    pub module_slots: u8,
}

/// What an entity type is, with its kind-specific spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Unit(UnitSpec),
    Segment(SegmentSpec),
    /// Underground endpoint belonging to a segment type.
    Bridge { segment: EntityTypeId },
    Node(NodeSpec),
    Emitter(EmitterSpec),
    FluidSegment,
    Module,
}

/// A catalog entry.
#[derive(Debug, Clone)]
pub struct EntityDef {
    pub name: String,
    pub kind: EntityKind,
}

/// Builder for constructing an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entities: Vec<EntityDef>,
    name_to_id: HashMap<String, EntityTypeId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, name: &str, kind: EntityKind) -> EntityTypeId {
        let id = EntityTypeId(self.entities.len() as u32);
        self.entities.push(EntityDef {
            name: name.to_string(),
            kind,
        });
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register an extraction unit. Returns its ID.
    pub fn register_unit(&mut self, name: &str, spec: UnitSpec) -> EntityTypeId {
        self.register(name, EntityKind::Unit(spec))
    }

    /// Register a transport line: a plain segment plus its bridge entity.
    /// Returns the segment's ID; the bridge is reachable through its spec.
    pub fn register_transport_line(
        &mut self,
        segment_name: &str,
        bridge_name: &str,
        max_bridge_span: u32,
    ) -> EntityTypeId {
        let segment = EntityTypeId(self.entities.len() as u32);
        let bridge = EntityTypeId(segment.0 + 1);
        self.register(
            segment_name,
            EntityKind::Segment(SegmentSpec {
                bridge,
                max_bridge_span,
            }),
        );
        self.register(bridge_name, EntityKind::Bridge { segment });
        segment
    }

    /// Register a power node. Returns its ID.
    pub fn register_node(&mut self, name: &str, spec: NodeSpec) -> EntityTypeId {
        self.register(name, EntityKind::Node(spec))
    }

    /// Register an effect emitter. Returns its ID.
    pub fn register_emitter(&mut self, name: &str, spec: EmitterSpec) -> EntityTypeId {
        self.register(name, EntityKind::Emitter(spec))
    }

    /// Register a fluid segment. Returns its ID.
    pub fn register_fluid_segment(&mut self, name: &str) -> EntityTypeId {
        self.register(name, EntityKind::FluidSegment)
    }

    /// Register a module. Returns its ID.
    pub fn register_module(&mut self, name: &str) -> EntityTypeId {
        self.register(name, EntityKind::Module)
    }

    /// Look up an ID registered so far.
    pub fn id_by_name(&self, name: &str) -> Option<EntityTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Freeze into an immutable catalog.
    pub fn build(self) -> Catalog {
        Catalog {
            entities: self.entities,
            name_to_id: self.name_to_id,
        }
    }
}

/// Immutable entity catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Vec<EntityDef>,
    name_to_id: HashMap<String, EntityTypeId>,
}

impl Catalog {
    pub fn get(&self, id: EntityTypeId) -> Option<&EntityDef> {
        self.entities.get(id.0 as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<EntityTypeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn name(&self, id: EntityTypeId) -> Option<&str> {
        self.get(id).map(|e| e.name.as_str())
    }

    pub fn kind(&self, id: EntityTypeId) -> Option<EntityKind> {
        self.get(id).map(|e| e.kind)
    }

    pub fn unit(&self, id: EntityTypeId) -> Option<UnitSpec> {
        match self.kind(id)? {
            EntityKind::Unit(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn segment(&self, id: EntityTypeId) -> Option<SegmentSpec> {
        match self.kind(id)? {
            EntityKind::Segment(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn node(&self, id: EntityTypeId) -> Option<NodeSpec> {
        match self.kind(id)? {
            EntityKind::Node(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn emitter(&self, id: EntityTypeId) -> Option<EmitterSpec> {
        match self.kind(id)? {
            EntityKind::Emitter(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn is_fluid_segment(&self, id: EntityTypeId) -> bool {
        matches!(self.kind(id), Some(EntityKind::FluidSegment))
    }

    pub fn is_module(&self, id: EntityTypeId) -> bool {
        matches!(self.kind(id), Some(EntityKind::Module))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
