//! End-to-end planning scenarios across every oreplan crate.
//!
//! Each test drives `oreplan_plan::plan` (or the reverse `remove_ghosts`)
//! over a small hand-built region and checks exact placements: bridge and
//! power offsets, holes left by material splits, strategy trade-offs and
//! the distinct failure kinds.

use std::fs;
use std::path::PathBuf;

use oreplan_core::config::{Configuration, Strategy};
use oreplan_core::error::PlanError;
use oreplan_core::geometry::{Direction, GridPosition};
use oreplan_core::id::PLANNER_TAG;
use oreplan_core::placeholder::{BridgeRole, Placeholder, PlaceholderKind, Plan};
use oreplan_core::region::Region;
use oreplan_core::test_utils::*;
use oreplan_plan::{GhostIndex, plan, remove_ghosts};

const EXIT: PlaceholderKind = PlaceholderKind::Bridge(BridgeRole::Exit);
const ENTRY: PlaceholderKind = PlaceholderKind::Bridge(BridgeRole::Entry);

fn at(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

fn positions(plan: &Plan, kind: PlaceholderKind) -> Vec<GridPosition> {
    plan.of_kind(kind).map(|p| p.position).collect()
}

fn drill_plan(region: &Region, flow: Direction) -> Plan {
    let (catalog, ids) = standard_catalog();
    let mut config = drill_config(&ids);
    config.flow_direction = flow;
    plan(region, &config, &catalog).unwrap()
}

// ===========================================================================
// Worked examples
// ===========================================================================

#[test]
fn three_by_three_south_bridge_and_power_offsets() {
    // Rows exhaust at y = 1 and y = 4.
    let plan = drill_plan(&uniform_region(7, 6, iron_ore()), Direction::South);
    assert_eq!(plan.stats.units, 4);
    assert_eq!(positions(&plan, EXIT), vec![at(3, 0), at(3, 3), at(3, 6)]);
    assert_eq!(positions(&plan, ENTRY), vec![at(3, 1), at(3, 4)]);
    assert_eq!(
        positions(&plan, PlaceholderKind::PowerNode),
        vec![at(3, 2), at(3, 5)]
    );
    for bridge in plan.of_kind(EXIT).chain(plan.of_kind(ENTRY)) {
        assert_eq!(bridge.direction, Some(Direction::South));
    }
}

#[test]
fn reversed_flow_mirrors_offsets() {
    let plan = drill_plan(&uniform_region(7, 6, iron_ore()), Direction::North);
    assert_eq!(positions(&plan, EXIT), vec![at(3, 5), at(3, 2), at(3, -1)]);
    assert_eq!(positions(&plan, ENTRY), vec![at(3, 4), at(3, 1)]);
    assert_eq!(
        positions(&plan, PlaceholderKind::PowerNode),
        vec![at(3, 3), at(3, 0)]
    );
    for bridge in plan.of_kind(EXIT).chain(plan.of_kind(ENTRY)) {
        assert_eq!(bridge.direction, Some(Direction::North));
    }
}

#[test]
fn material_split_leaves_one_footprint_gap() {
    let region = split_region(12, 3, 7, iron_ore(), copper_ore());
    let plan = drill_plan(&region, Direction::East);
    let xs: Vec<i32> = positions(&plan, PlaceholderKind::Unit)
        .iter()
        .map(|p| p.x)
        .collect();
    assert_eq!(xs, vec![0, 3, 9]);
    // Columns 6..=8 carry no unit.
    for unit in plan.of_kind(PlaceholderKind::Unit) {
        assert!((6..=8).all(|x| !unit.rect().contains(at(x, unit.position.y))));
    }
    // The lane keeps running through the hole.
    let lane_xs: Vec<i32> = plan
        .placeholders
        .iter()
        .filter(|p| matches!(p.kind, PlaceholderKind::Segment | PlaceholderKind::Bridge(_)))
        .map(|p| p.position.x)
        .collect();
    assert!((6..=9).all(|x| lane_xs.contains(&x)));
}

#[test]
fn staggered_yields_fewer_units_than_dense() {
    let (catalog, ids) = standard_catalog();
    let region = uniform_region(6, 6, iron_ore());
    let dense = plan(&region, &drill_config(&ids), &catalog).unwrap();

    let mut config = drill_config(&ids);
    config.strategy = Strategy::Staggered;
    let staggered = plan(&region, &config, &catalog).unwrap();
    assert!(staggered.stats.units < dense.stats.units);
}

// ===========================================================================
// Rule selection
// ===========================================================================

#[test]
fn narrow_units_use_calculated_spacing() {
    let (catalog, ids) = standard_catalog();
    let config = Configuration::new(ids.burner_drill, ids.belt, ids.small_pole);
    let plan = plan(&uniform_region(7, 20, iron_ore()), &config, &catalog).unwrap();
    assert_eq!(plan.stats.units, 20);
    assert_eq!(plan.stats.bridges, 0);
    assert_eq!(plan.stats.line_segments, 19);
    let nodes = positions(&plan, PlaceholderKind::PowerNode);
    assert_eq!(nodes.len(), 8);
    assert!(nodes.iter().all(|n| n.x == 0 || n.x == 6));
}

#[test]
fn fluid_units_get_a_pipe_behind_them() {
    let (catalog, ids) = standard_catalog();
    let mut config = drill_config(&ids);
    config.fluid_segment_type = Some(ids.pipe);
    let plan = plan(&fluid_region(9, 12, uranium_ore()), &config, &catalog).unwrap();
    assert_eq!(plan.stats.fluid_segments, 20);
    let units: Vec<&Placeholder> = plan.of_kind(PlaceholderKind::Unit).collect();
    for pipe in plan.of_kind(PlaceholderKind::FluidSegment) {
        assert_eq!(pipe.entity, ids.pipe);
        assert!(units.iter().all(|u| !u.rect().contains(pipe.position)));
    }
}

#[test]
fn unit_wide_regions_still_plan() {
    let (catalog, ids) = standard_catalog();

    let burner = Configuration::new(ids.burner_drill, ids.belt, ids.small_pole);
    let plan_2x6 = plan(&uniform_region(2, 6, iron_ore()), &burner, &catalog).unwrap();
    assert_eq!(plan_2x6.stats.units, 3);
    let nodes = positions(&plan_2x6, PlaceholderKind::PowerNode);
    assert!(!nodes.is_empty());
    assert!(nodes.iter().all(|n| n.x == -1));
    let plan_3x6 = plan(&uniform_region(3, 6, iron_ore()), &burner, &catalog).unwrap();
    assert_eq!(plan_3x6.stats.units, 3);

    let mini = Configuration::new(ids.mini_drill, ids.belt, ids.small_pole);
    let plan_1x6 = plan(&uniform_region(1, 6, iron_ore()), &mini, &catalog).unwrap();
    assert_eq!(plan_1x6.stats.units, 6);

    let mut wet = drill_config(&ids);
    wet.fluid_segment_type = Some(ids.pipe);
    let plan_wet = plan(&fluid_region(3, 6, uranium_ore()), &wet, &catalog).unwrap();
    assert_eq!(plan_wet.stats.units, 2);
    let pipes = positions(&plan_wet, PlaceholderKind::FluidSegment);
    assert_eq!(pipes, vec![at(-1, 1), at(-1, 2), at(-1, 3), at(-1, 4)]);
}

#[test]
fn emitters_respect_the_cap_end_to_end() {
    let (catalog, ids) = standard_catalog();
    let mut config = drill_config(&ids);
    config.emitter_type = Some(ids.beacon);
    config.max_emitters_per_unit = 2;
    let plan = plan(&uniform_region(30, 18, iron_ore()), &config, &catalog).unwrap();
    assert!(plan.stats.emitters > 0);
    for unit in plan.of_kind(PlaceholderKind::Unit) {
        let affecting = plan
            .of_kind(PlaceholderKind::Emitter)
            .filter(|e| e.rect().expanded(3).intersects(&unit.rect()))
            .count();
        assert!(affecting <= 2);
    }
}

// ===========================================================================
// Failures
// ===========================================================================

#[test]
fn failure_kinds_are_distinct() {
    let (catalog, ids) = standard_catalog();
    let config = drill_config(&ids);
    assert_eq!(
        plan(&Region::new(rect(0, 0, 8, 8)), &config, &catalog),
        Err(PlanError::EmptyRegion)
    );
    assert_eq!(
        plan(&uniform_region(2, 5, iron_ore()), &config, &catalog),
        Err(PlanError::NoValidPlacement)
    );

    let mut over_cap = drill_config(&ids);
    over_cap.max_emitters_per_unit = 13;
    assert!(matches!(
        plan(&uniform_region(7, 7, iron_ore()), &over_cap, &catalog),
        Err(PlanError::IncompatibleConfiguration { .. })
    ));

    let mut wrong_kind = drill_config(&ids);
    wrong_kind.node_type = ids.beacon;
    let err = plan(&uniform_region(7, 7, iron_ore()), &wrong_kind, &catalog).unwrap_err();
    assert!(err.to_string().contains("beacon"));
}

// ===========================================================================
// Ghost removal
// ===========================================================================

#[test]
fn removal_spares_foreign_and_distant_ghosts() {
    let (catalog, ids) = standard_catalog();
    let region = uniform_region(14, 12, iron_ore());
    let plan = plan(&region, &drill_config(&ids), &catalog).unwrap();

    let mut index = GhostIndex::new();
    index.materialize(&region, &plan.placeholders).unwrap();
    let foreign = index
        .place(Placeholder::tile(PlaceholderKind::Segment, ids.belt, at(-5, -5), None))
        .unwrap();
    let mut distant = Placeholder::tile(PlaceholderKind::PowerNode, ids.small_pole, at(40, 40), None);
    distant.tag = Some(PLANNER_TAG);
    let distant = index.place(distant).unwrap();

    let removed = remove_ghosts(&mut index, &region);
    assert_eq!(removed.len(), plan.placeholders.len());
    assert_eq!(index.len(), 2);
    assert!(index.get(foreign).is_some());
    assert!(index.get(distant).is_some());
    assert!(remove_ghosts(&mut index, &region).is_empty());
}

fn sorted(placeholders: &[Placeholder]) -> Vec<Placeholder> {
    let mut sorted = placeholders.to_vec();
    sorted.sort_by_key(|p| (p.position, p.kind.class()));
    sorted
}

#[test]
fn removal_leaves_the_neighbouring_plan_intact() {
    let left = uniform_region(7, 6, iron_ore());
    let mut right = Region::new(rect(7, 0, 7, 6));
    right.fill(rect(7, 0, 7, 6), iron_ore(), false);
    let left_plan = drill_plan(&left, Direction::South);
    let right_plan = drill_plan(&right, Direction::South);

    let mut index = GhostIndex::new();
    index.materialize(&left, &left_plan.placeholders).unwrap();
    index.materialize(&right, &right_plan.placeholders).unwrap();

    let removed = remove_ghosts(&mut index, &left);
    assert_eq!(removed.placeholders, sorted(&left_plan.placeholders));
    let survivors: Vec<Placeholder> = index.iter().map(|(_, p)| p.clone()).collect();
    assert_eq!(sorted(&survivors), sorted(&right_plan.placeholders));

    let removed = remove_ghosts(&mut index, &right);
    assert_eq!(removed.placeholders, sorted(&right_plan.placeholders));
    assert!(index.is_empty());
}

// ===========================================================================
// Data-driven planning
// ===========================================================================

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "oreplan_scenario_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn preset_from_data_files_plans_like_builder_catalog() {
    let dir = make_test_dir("preset");
    fs::write(
        dir.join("catalog.ron"),
        r#"(
            units: [(name: "electric-mining-drill", width: 3, height: 3, reach: Some(5), fluid_input: true, module_slots: 3)],
            transport_lines: [(name: "transport-belt", bridge: "underground-belt", max_bridge_span: 5)],
            power_nodes: [(name: "medium-electric-pole", coverage_radius: 3.5, link_reach: 9.0)],
        )"#,
    )
    .unwrap();
    fs::write(
        dir.join("presets.toml"),
        r#"
[[presets]]
name = "east"
flow = "East"
unit = "electric-mining-drill"
segment = "transport-belt"
node = "medium-electric-pole"
"#,
    )
    .unwrap();

    let data = oreplan_data::load_planner_data(&dir).unwrap();
    let region = uniform_region(15, 14, copper_ore());
    let loaded = plan(&region, &data.presets["east"], &data.catalog).unwrap();
    let built = drill_plan(&region, Direction::East);
    assert_eq!(loaded.stats, built.stats);
    let loaded_positions: Vec<_> = loaded.placeholders.iter().map(|p| (p.kind, p.position)).collect();
    let built_positions: Vec<_> = built.placeholders.iter().map(|p| (p.kind, p.position)).collect();
    assert_eq!(loaded_positions, built_positions);
    let _ = fs::remove_dir_all(&dir);
}
