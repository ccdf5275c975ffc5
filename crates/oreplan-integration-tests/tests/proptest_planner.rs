//! Property-based tests for the planner.
//!
//! Generates random single- and two-material regions under every flow
//! direction and both strategies, then checks the invariants every plan
//! must satisfy. Regions are at least seven tiles on each side and the first
//! material band is at least seven tiles wide, so every generated scenario
//! has room for a unit: a planning failure fails the property.

use std::collections::BTreeSet;

use oreplan_core::config::{Configuration, Strategy as Packing};
use oreplan_core::geometry::{Direction, GridPosition};
use oreplan_core::placeholder::{Placeholder, PlaceholderKind, Plan};
use oreplan_core::region::Region;
use oreplan_core::test_utils::*;
use oreplan_layout::{pack, route_lines};
use oreplan_plan::{GhostIndex, plan, remove_ghosts};
use oreplan_power::{covers, is_link_connected, place_power};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
struct Scenario {
    region: Region,
    flow: Direction,
    strategy: Packing,
    beacons: bool,
    cap: u8,
}

fn arb_region() -> impl Strategy<Value = Region> {
    (7..36u32, 7..36u32).prop_flat_map(|(width, height)| {
        (7..=width as i32).prop_map(move |split| {
            if split == width as i32 {
                uniform_region(width, height, iron_ore())
            } else {
                split_region(width, height, split, iron_ore(), copper_ore())
            }
        })
    })
}

fn arb_scenario() -> impl Strategy<Value = Scenario> {
    (
        arb_region(),
        0..4usize,
        any::<bool>(),
        any::<bool>(),
        1..=12u8,
    )
        .prop_map(|(region, flow, staggered, beacons, cap)| Scenario {
            region,
            flow: Direction::all()[flow],
            strategy: if staggered {
                Packing::Staggered
            } else {
                Packing::Dense
            },
            beacons,
            cap,
        })
}

fn configuration(scenario: &Scenario) -> Configuration {
    let (_, ids) = standard_catalog();
    let mut config = drill_config(&ids);
    config.flow_direction = scenario.flow;
    config.strategy = scenario.strategy;
    config.max_emitters_per_unit = scenario.cap;
    if scenario.beacons {
        config.emitter_type = Some(ids.beacon);
    }
    config
}

fn planned(scenario: &Scenario) -> Result<Plan, TestCaseError> {
    let (catalog, _) = standard_catalog();
    plan(&scenario.region, &configuration(scenario), &catalog)
        .map_err(|e| TestCaseError::fail(format!("planning failed: {e}")))
}

fn sorted(placeholders: &[Placeholder]) -> Vec<Placeholder> {
    let mut sorted = placeholders.to_vec();
    sorted.sort_by_key(|p| (p.position, p.kind.class()));
    sorted
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Identical inputs give identical plans.
    #[test]
    fn planning_is_deterministic(scenario in arb_scenario()) {
        let (catalog, _) = standard_catalog();
        let config = configuration(&scenario);
        let first = plan(&scenario.region, &config, &catalog);
        let second = plan(&scenario.region, &config, &catalog);
        prop_assert!(first.is_ok(), "planning failed: {:?}", first);
        prop_assert_eq!(first, second);
    }

    /// No two placeholders share a tile.
    #[test]
    fn placeholders_never_overlap(scenario in arb_scenario()) {
        let plan = planned(&scenario)?;
        let mut seen = BTreeSet::new();
        for placeholder in &plan.placeholders {
            for tile in placeholder.tiles() {
                prop_assert!(seen.insert(tile), "tile {:?} claimed twice", tile);
            }
        }
    }

    /// Every unit mines a single material.
    #[test]
    fn units_are_material_pure(scenario in arb_scenario()) {
        let plan = planned(&scenario)?;
        for unit in plan.of_kind(PlaceholderKind::Unit) {
            let materials: BTreeSet<_> = unit
                .tiles()
                .filter_map(|t| scenario.region.point_at(t))
                .map(|p| p.material)
                .collect();
            prop_assert!(materials.len() <= 1);
        }
    }

    /// No unit is affected by more emitters than the cap.
    #[test]
    fn emitter_cap_holds(scenario in arb_scenario()) {
        let plan = planned(&scenario)?;
        for unit in plan.of_kind(PlaceholderKind::Unit) {
            let affecting = plan
                .of_kind(PlaceholderKind::Emitter)
                .filter(|e| e.rect().expanded(3).intersects(&unit.rect()))
                .count();
            prop_assert!(affecting <= usize::from(scenario.cap));
        }
    }

    /// Every line's units are powered by one link-connected network.
    #[test]
    fn power_covers_and_connects(scenario in arb_scenario(), narrow in any::<bool>()) {
        let (catalog, ids) = standard_catalog();
        let mut config = configuration(&scenario);
        if narrow {
            config.unit_type = ids.burner_drill;
            config.node_type = ids.small_pole;
        }
        let config = config.resolve(&catalog).unwrap();
        let layout = pack(&scenario.region, &config);
        prop_assert!(!layout.is_empty());
        let anchors = place_power(&layout, config.node_type, &config.node)
            .map_err(|e| TestCaseError::fail(format!("power placement failed: {e}")))?;
        for line in &layout.lines {
            let nodes: Vec<(i32, i32)> = anchors
                .iter()
                .filter(|a| a.line == line.index)
                .map(|a| (a.u, a.v))
                .collect();
            prop_assert!(is_link_connected(&nodes, config.node.link_reach));
            for (_, unit) in layout.units_on(line.index) {
                prop_assert!(
                    nodes.iter().any(|&n| covers(n, config.node.coverage_radius, &unit.rect))
                );
            }
        }
    }

    /// Bridge exits precede their entries along the flow.
    #[test]
    fn bridges_follow_flow(scenario in arb_scenario()) {
        let (catalog, _) = standard_catalog();
        let config = configuration(&scenario).resolve(&catalog).unwrap();
        let layout = pack(&scenario.region, &config);
        let lines = route_lines(&layout);
        prop_assert!(!lines.is_empty());
        for line in lines {
            prop_assert_eq!(line.direction, scenario.flow);
            for pair in &line.bridges {
                let (_, exit_v) = layout.frame.to_canonical(pair.exit);
                let (_, entry_v) = layout.frame.to_canonical(pair.entry);
                prop_assert!(exit_v < entry_v);
            }
        }
    }

    /// Removing a plan's ghosts takes exactly those ghosts, and only once.
    #[test]
    fn removal_is_idempotent(scenario in arb_scenario()) {
        let plan = planned(&scenario)?;
        let (_, ids) = standard_catalog();
        let mut index = GhostIndex::new();
        index.materialize(&scenario.region, &plan.placeholders).unwrap();
        let foreign = Placeholder::tile(
            PlaceholderKind::Segment,
            ids.belt,
            GridPosition::new(-10, -10),
            None,
        );
        let foreign_id = index.place(foreign.clone()).unwrap();

        let removed = remove_ghosts(&mut index, &scenario.region);
        prop_assert_eq!(removed.placeholders, sorted(&plan.placeholders));
        prop_assert_eq!(index.len(), 1);
        prop_assert_eq!(index.get(foreign_id), Some(&foreign));
        prop_assert!(remove_ghosts(&mut index, &scenario.region).is_empty());
        prop_assert_eq!(index.len(), 1);
    }

    /// Points left outside every unit's reach are counted, never invented.
    #[test]
    fn uncovered_points_are_bounded(scenario in arb_scenario()) {
        let plan = planned(&scenario)?;
        prop_assert!(plan.stats.uncovered_points <= scenario.region.point_count());
        prop_assert!(plan.stats.units > 0);
    }
}
