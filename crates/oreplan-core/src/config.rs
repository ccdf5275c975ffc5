//! Planner configuration.
//!
//! A [`Configuration`] is an explicit value passed into every planning call;
//! callers that want "remembered" settings keep their own copy. Resolving it
//! against a [`Catalog`] produces a [`ResolvedConfig`] holding the concrete
//! specs the planners work from.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EmitterSpec, NodeSpec, SegmentSpec};
use crate::error::PlanError;
use crate::geometry::Direction;
use crate::id::{EntityTypeId, QualityId};

/// Upper bound on `max_emitters_per_unit`.
pub const MAX_EMITTER_CAP: u8 = 12;

/// Global packing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Footprint-pitch lattice, maximising unit count.
    #[default]
    Dense,
    /// Reach-pitch lattice, half-offset on alternate lines, fewer units.
    Staggered,
}

/// Modules to insert into a placed unit or emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRequest {
    pub module: EntityTypeId,
    pub count: u8,
}

/// Caller-supplied planner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub strategy: Strategy,
    pub flow_direction: Direction,
    pub unit_type: EntityTypeId,
    pub segment_type: EntityTypeId,
    pub node_type: EntityTypeId,
    #[serde(default)]
    pub emitter_type: Option<EntityTypeId>,
    #[serde(default)]
    pub fluid_segment_type: Option<EntityTypeId>,
    pub max_emitters_per_unit: u8,
    /// 0 means "fill up to the cap".
    #[serde(default)]
    pub preferred_emitters_per_unit: u8,
    #[serde(default)]
    pub non_destructive: bool,
    #[serde(default)]
    pub modules: Vec<ModuleRequest>,
    #[serde(default)]
    pub emitter_modules: Vec<ModuleRequest>,
    #[serde(default)]
    pub quality: Option<QualityId>,
}

impl Configuration {
    /// Dense, south-flowing configuration without emitters or fluid.
    pub fn new(unit_type: EntityTypeId, segment_type: EntityTypeId, node_type: EntityTypeId) -> Self {
        Self {
            strategy: Strategy::Dense,
            flow_direction: Direction::South,
            unit_type,
            segment_type,
            node_type,
            emitter_type: None,
            fluid_segment_type: None,
            max_emitters_per_unit: MAX_EMITTER_CAP,
            preferred_emitters_per_unit: 0,
            non_destructive: false,
            modules: Vec::new(),
            emitter_modules: Vec::new(),
            quality: None,
        }
    }

    /// Check the configuration against the catalog and pull out the specs.
    pub fn resolve(&self, catalog: &Catalog) -> Result<ResolvedConfig, PlanError> {
        if self.max_emitters_per_unit == 0 || self.max_emitters_per_unit > MAX_EMITTER_CAP {
            return Err(PlanError::incompatible(format!(
                "max_emitters_per_unit must be 1..={MAX_EMITTER_CAP}, got {}",
                self.max_emitters_per_unit
            )));
        }
        if self.preferred_emitters_per_unit > self.max_emitters_per_unit {
            return Err(PlanError::incompatible(format!(
                "preferred_emitters_per_unit {} exceeds max {}",
                self.preferred_emitters_per_unit, self.max_emitters_per_unit
            )));
        }

        let unit = catalog
            .unit(self.unit_type)
            .ok_or_else(|| wrong_kind(catalog, self.unit_type, "unit"))?;
        if unit.width == 0 || unit.height == 0 {
            return Err(PlanError::incompatible("unit footprint has a zero side"));
        }
        let segment = catalog
            .segment(self.segment_type)
            .ok_or_else(|| wrong_kind(catalog, self.segment_type, "transport segment"))?;
        if unit.width >= 3 && segment.max_bridge_span < 2 {
            return Err(PlanError::incompatible(format!(
                "bridge span {} cannot pass a power node",
                segment.max_bridge_span
            )));
        }
        let node = catalog
            .node(self.node_type)
            .ok_or_else(|| wrong_kind(catalog, self.node_type, "power node"))?;

        let emitter = match self.emitter_type {
            Some(id) => {
                let spec = catalog
                    .emitter(id)
                    .ok_or_else(|| wrong_kind(catalog, id, "emitter"))?;
                if spec.size == 0 {
                    return Err(PlanError::incompatible("emitter footprint has a zero side"));
                }
                Some((id, spec))
            }
            None => None,
        };
        if let Some(id) = self.fluid_segment_type
            && !catalog.is_fluid_segment(id)
        {
            return Err(wrong_kind(catalog, id, "fluid segment"));
        }

        check_modules(catalog, &self.modules, unit.module_slots, "unit")?;
        let emitter_slots = emitter.map(|(_, spec)| spec.module_slots).unwrap_or(0);
        check_modules(catalog, &self.emitter_modules, emitter_slots, "emitter")?;

        Ok(ResolvedConfig {
            strategy: self.strategy,
            flow: self.flow_direction,
            unit_type: self.unit_type,
            footprint: FootprintSpec {
                width: unit.width,
                height: unit.height,
                reach: unit.reach.max(unit.width).max(unit.height),
                fluid_input: unit.fluid_input,
                module_slots: unit.module_slots,
                quality: self.quality,
            },
            segment_type: self.segment_type,
            segment,
            node_type: self.node_type,
            node,
            emitter,
            fluid_segment_type: self.fluid_segment_type,
            limits: EmitterLimits {
                max: self.max_emitters_per_unit,
                preferred: self.preferred_emitters_per_unit,
            },
            non_destructive: self.non_destructive,
            modules: self.modules.clone(),
            emitter_modules: self.emitter_modules.clone(),
            quality: self.quality,
        })
    }
}

fn wrong_kind(catalog: &Catalog, id: EntityTypeId, expected: &str) -> PlanError {
    match catalog.name(id) {
        Some(name) => PlanError::incompatible(format!("'{name}' is not a {expected}")),
        None => PlanError::incompatible(format!("{expected} {id:?} is not in the catalog")),
    }
}

fn check_modules(
    catalog: &Catalog,
    modules: &[ModuleRequest],
    slots: u8,
    owner: &str,
) -> Result<(), PlanError> {
    let mut requested: u32 = 0;
    for request in modules {
        if !catalog.is_module(request.module) {
            return Err(wrong_kind(catalog, request.module, "module"));
        }
        requested += u32::from(request.count);
    }
    if requested > u32::from(slots) {
        return Err(PlanError::incompatible(format!(
            "{requested} module(s) requested for {slots} {owner} slot(s)"
        )));
    }
    Ok(())
}

/// The planning-time view of the unit being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootprintSpec {
    /// Line-facing side.
    pub width: u32,
    /// Depth away from the line.
    pub height: u32,
    /// Side of the square extraction area, never smaller than the footprint.
    pub reach: u32,
    pub fluid_input: bool,
    pub module_slots: u8,
    pub quality: Option<QualityId>,
}

impl FootprintSpec {
    /// Units this wide need underground bridging around in-lane power nodes.
    pub fn is_bridged(&self) -> bool {
        self.width >= 3
    }

    /// Along offset of the exhaust tile from the unit's upstream edge.
    pub fn exhaust_offset(&self) -> i32 {
        (self.width as i32 - 1) / 2
    }
}

/// Per-unit emitter cap and preferred target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterLimits {
    pub max: u8,
    pub preferred: u8,
}

impl EmitterLimits {
    /// The count at which a unit stops driving placement.
    pub fn target(&self) -> u8 {
        if self.preferred > 0 {
            self.preferred
        } else {
            self.max
        }
    }
}

/// A configuration checked against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub strategy: Strategy,
    pub flow: Direction,
    pub unit_type: EntityTypeId,
    pub footprint: FootprintSpec,
    pub segment_type: EntityTypeId,
    pub segment: SegmentSpec,
    pub node_type: EntityTypeId,
    pub node: NodeSpec,
    pub emitter: Option<(EntityTypeId, EmitterSpec)>,
    pub fluid_segment_type: Option<EntityTypeId>,
    pub limits: EmitterLimits,
    pub non_destructive: bool,
    pub modules: Vec<ModuleRequest>,
    pub emitter_modules: Vec<ModuleRequest>,
    pub quality: Option<QualityId>,
}
