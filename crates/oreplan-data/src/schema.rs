//! Serde data file structs for planner content.
//!
//! A data directory holds a `catalog` file (required) describing every
//! entity the planner may place, and an optional `presets` file of named
//! configurations. Entities and presets refer to each other by name; the
//! loader resolves names into catalog ids.

use oreplan_core::config::{MAX_EMITTER_CAP, Strategy};
use oreplan_core::geometry::Direction;
use serde::Deserialize;

// ===========================================================================
// Catalog
// ===========================================================================

/// The whole `catalog` file. Every section may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub units: Vec<UnitData>,
    #[serde(default)]
    pub transport_lines: Vec<TransportLineData>,
    #[serde(default)]
    pub power_nodes: Vec<PowerNodeData>,
    #[serde(default)]
    pub emitters: Vec<EmitterData>,
    #[serde(default)]
    pub fluid_segments: Vec<NamedData>,
    #[serde(default)]
    pub modules: Vec<NamedData>,
}

/// An extraction unit.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Defaults to the larger footprint side.
    #[serde(default)]
    pub reach: Option<u32>,
    #[serde(default)]
    pub fluid_input: bool,
    #[serde(default)]
    pub module_slots: u8,
}

/// A transport segment and the name of its underground bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportLineData {
    pub name: String,
    pub bridge: String,
    pub max_bridge_span: u32,
}

/// A power node. Distances are in tiles and converted to fixed-point on load.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerNodeData {
    pub name: String,
    pub coverage_radius: f64,
    pub link_reach: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmitterData {
    pub name: String,
    pub size: u32,
    pub effect_radius: u32,
    #[serde(default)]
    pub module_slots: u8,
}

/// An entity that needs nothing but a name.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedData {
    pub name: String,
}

// ===========================================================================
// Presets
// ===========================================================================

/// A named planner configuration. Entity references are names.
#[derive(Debug, Clone, Deserialize)]
pub struct PresetData {
    pub name: String,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_flow")]
    pub flow: Direction,
    pub unit: String,
    pub segment: String,
    pub node: String,
    #[serde(default)]
    pub emitter: Option<String>,
    #[serde(default)]
    pub fluid_segment: Option<String>,
    #[serde(default = "default_max_emitters")]
    pub max_emitters_per_unit: u8,
    #[serde(default)]
    pub preferred_emitters_per_unit: u8,
    #[serde(default)]
    pub non_destructive: bool,
    /// `(module name, count)` pairs for each unit.
    #[serde(default)]
    pub modules: Vec<(String, u8)>,
    #[serde(default)]
    pub emitter_modules: Vec<(String, u8)>,
    #[serde(default)]
    pub quality: Option<u8>,
}

fn default_flow() -> Direction {
    Direction::South
}

fn default_max_emitters() -> u8 {
    MAX_EMITTER_CAP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ron_with_missing_sections() {
        let ron_str = r#"(
            units: [(name: "drill", width: 3, height: 3, reach: Some(5), fluid_input: true)],
            fluid_segments: [(name: "pipe")],
        )"#;
        let data: CatalogData = ron::from_str(ron_str).unwrap();
        assert_eq!(data.units.len(), 1);
        assert_eq!(data.units[0].reach, Some(5));
        assert_eq!(data.units[0].module_slots, 0);
        assert!(data.transport_lines.is_empty());
        assert_eq!(data.fluid_segments[0].name, "pipe");
    }

    #[test]
    fn catalog_toml() {
        let toml_str = r#"
[[transport_lines]]
name = "belt"
bridge = "underground"
max_bridge_span = 5

[[power_nodes]]
name = "pole"
coverage_radius = 3.5
link_reach = 9.0
"#;
        let data: CatalogData = toml::from_str(toml_str).unwrap();
        assert_eq!(data.transport_lines[0].bridge, "underground");
        assert_eq!(data.power_nodes[0].link_reach, 9.0);
    }

    #[test]
    fn preset_defaults() {
        let json = r#"{"name": "basic", "unit": "drill", "segment": "belt", "node": "pole"}"#;
        let preset: PresetData = serde_json::from_str(json).unwrap();
        assert_eq!(preset.strategy, Strategy::Dense);
        assert_eq!(preset.flow, Direction::South);
        assert_eq!(preset.max_emitters_per_unit, MAX_EMITTER_CAP);
        assert!(preset.emitter.is_none());
        assert!(preset.modules.is_empty());
    }

    #[test]
    fn preset_toml() {
        let toml_str = r#"
name = "beaconed"
strategy = "Staggered"
flow = "East"
unit = "drill"
segment = "belt"
node = "pole"
emitter = "beacon"
modules = [["speed", 2]]
"#;
        let preset: PresetData = toml::from_str(toml_str).unwrap();
        assert_eq!(preset.strategy, Strategy::Staggered);
        assert_eq!(preset.flow, Direction::East);
        assert_eq!(preset.modules, vec![("speed".to_string(), 2)]);
    }
}
