//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::catalog::{Catalog, CatalogBuilder, EmitterSpec, NodeSpec, UnitSpec};
use crate::config::Configuration;
use crate::fixed::Fixed64;
use crate::geometry::{GridPosition, Rect};
use crate::id::{EntityTypeId, MaterialId};
use crate::region::Region;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Materials
// ===========================================================================

pub fn iron_ore() -> MaterialId {
    MaterialId(0)
}
pub fn copper_ore() -> MaterialId {
    MaterialId(1)
}
pub fn stone() -> MaterialId {
    MaterialId(2)
}
pub fn uranium_ore() -> MaterialId {
    MaterialId(3)
}

// ===========================================================================
// Standard catalog
// ===========================================================================

/// IDs of the entities in [`standard_catalog`].
#[derive(Debug, Clone, Copy)]
pub struct StandardIds {
    /// 3x3, reach 5, fluid input, 3 module slots.
    pub drill: EntityTypeId,
    /// 5x5, reach 13, fluid input, 4 module slots.
    pub big_drill: EntityTypeId,
    /// 2x2, reach 2, no fluid, no slots.
    pub burner_drill: EntityTypeId,
    /// 1x1, reach 3, no fluid, no slots.
    pub mini_drill: EntityTypeId,
    pub belt: EntityTypeId,
    pub underground: EntityTypeId,
    /// Coverage 2.5, reach 7.5.
    pub small_pole: EntityTypeId,
    /// Coverage 3.5, reach 9.
    pub medium_pole: EntityTypeId,
    /// 3x3, effect radius 3, 2 module slots.
    pub beacon: EntityTypeId,
    pub pipe: EntityTypeId,
    pub speed_module: EntityTypeId,
    pub productivity_module: EntityTypeId,
}

/// A catalog with a handful of realistic mining entities.
pub fn standard_catalog() -> (Catalog, StandardIds) {
    let mut b = CatalogBuilder::new();
    let drill = b.register_unit(
        "electric-mining-drill",
        UnitSpec {
            width: 3,
            height: 3,
            reach: 5,
            fluid_input: true,
            module_slots: 3,
        },
    );
    let belt = b.register_transport_line("transport-belt", "underground-belt", 5);
    let underground = EntityTypeId(belt.0 + 1);
    let small_pole = b.register_node(
        "small-electric-pole",
        NodeSpec {
            coverage_radius: fixed(2.5),
            link_reach: fixed(7.5),
        },
    );
    let medium_pole = b.register_node(
        "medium-electric-pole",
        NodeSpec {
            coverage_radius: fixed(3.5),
            link_reach: fixed(9.0),
        },
    );
    let big_drill = b.register_unit(
        "big-mining-drill",
        UnitSpec {
            width: 5,
            height: 5,
            reach: 13,
            fluid_input: true,
            module_slots: 4,
        },
    );
    let burner_drill = b.register_unit(
        "burner-mining-drill",
        UnitSpec {
            width: 2,
            height: 2,
            reach: 2,
            fluid_input: false,
            module_slots: 0,
        },
    );
    let mini_drill = b.register_unit(
        "mini-drill",
        UnitSpec {
            width: 1,
            height: 1,
            reach: 3,
            fluid_input: false,
            module_slots: 0,
        },
    );
    let beacon = b.register_emitter(
        "beacon",
        EmitterSpec {
            size: 3,
            effect_radius: 3,
            module_slots: 2,
        },
    );
    let pipe = b.register_fluid_segment("pipe");
    let speed_module = b.register_module("speed-module");
    let productivity_module = b.register_module("productivity-module");

    (
        b.build(),
        StandardIds {
            drill,
            big_drill,
            burner_drill,
            mini_drill,
            belt,
            underground,
            small_pole,
            medium_pole,
            beacon,
            pipe,
            speed_module,
            productivity_module,
        },
    )
}

/// Dense, south-flowing electric drill configuration with medium poles.
pub fn drill_config(ids: &StandardIds) -> Configuration {
    Configuration::new(ids.drill, ids.belt, ids.medium_pole)
}

// ===========================================================================
// Regions
// ===========================================================================

/// Rectangle from `(x, y)` spanning `width` x `height` tiles.
pub fn rect(x: i32, y: i32, width: u32, height: u32) -> Rect {
    Rect::new(
        GridPosition::new(x, y),
        GridPosition::new(x + width as i32 - 1, y + height as i32 - 1),
    )
}

/// A `width` x `height` region at the origin filled with one material.
pub fn uniform_region(width: u32, height: u32, material: MaterialId) -> Region {
    let bounds = rect(0, 0, width, height);
    let mut region = Region::new(bounds);
    region.fill(bounds, material, false);
    region
}

/// A region whose columns `x < split_x` hold `left` and the rest `right`.
pub fn split_region(
    width: u32,
    height: u32,
    split_x: i32,
    left: MaterialId,
    right: MaterialId,
) -> Region {
    let bounds = rect(0, 0, width, height);
    let mut region = Region::new(bounds);
    region.fill(rect(0, 0, split_x as u32, height), left, false);
    region.fill(
        rect(split_x, 0, width - split_x as u32, height),
        right,
        false,
    );
    region
}

/// A uniform region whose every point needs fluid.
pub fn fluid_region(width: u32, height: u32, material: MaterialId) -> Region {
    let bounds = rect(0, 0, width, height);
    let mut region = Region::new(bounds);
    region.fill(bounds, material, true);
    region
}
