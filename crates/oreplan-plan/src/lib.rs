//! Oreplan Plan -- the top-level planner entry points.
//!
//! [`plan`] runs the whole forward pipeline for one region:
//!
//! 1. resolve the configuration against the catalog,
//! 2. pack units ([`oreplan_layout::pack`]),
//! 3. route lanes, place power, lay fluid segments and fill emitter strips,
//! 4. withhold placeholders standing on structures (non-destructive mode),
//! 5. run the collision pass ([`emit::resolve_collisions`]),
//! 6. list obstructions to clear and count the plan.
//!
//! [`remove_ghosts`] is the reverse operation over a [`GhostIndex`].
//!
//! Every call builds its entity graph from scratch. Nothing is cached
//! between calls, so identical inputs give identical plans.

pub mod emit;
pub mod ghost;
pub mod obstruction;

use std::collections::BTreeSet;

use oreplan_core::catalog::Catalog;
use oreplan_core::config::{Configuration, ResolvedConfig};
use oreplan_core::error::PlanError;
use oreplan_core::geometry::GridPosition;
use oreplan_core::placeholder::{Placeholder, PlaceholderKind, Plan, PlanStats};
use oreplan_core::region::Region;
use oreplan_emitter::fill_emitters;
use oreplan_fluid::route_fluid;
use oreplan_layout::{Layout, LineTileKind, RoutedLine, pack, route_lines};
use oreplan_power::place_power;

pub use ghost::{GhostError, GhostId, GhostIndex, remove_ghosts};

/// Plan a mining grid over `region`.
pub fn plan(region: &Region, config: &Configuration, catalog: &Catalog) -> Result<Plan, PlanError> {
    if region.is_empty() {
        return Err(PlanError::EmptyRegion);
    }
    let config = config.resolve(catalog)?;
    check_fluid(region, &config)?;

    let layout = pack(region, &config);
    if layout.is_empty() {
        return Err(PlanError::NoValidPlacement);
    }

    let lines = route_lines(&layout);
    let candidates = candidates(&layout, &lines, &config)?;
    let (candidates, excluded_count) = if config.non_destructive {
        obstruction::exclude_structures(candidates, region)
    } else {
        (candidates, 0)
    };
    let collisions = emit::resolve_collisions(candidates)?;
    let placeholders = collisions.kept;
    if !placeholders.iter().any(|p| p.kind == PlaceholderKind::Unit) {
        return Err(PlanError::NoValidPlacement);
    }

    let deconstruct =
        obstruction::deconstruction_targets(&placeholders, region, !config.non_destructive);
    let stats = stats(region, &layout, &lines, &placeholders);
    log::debug!("plan: {stats:?}");
    Ok(Plan {
        placeholders,
        dropped_count: collisions.dropped,
        excluded_count,
        deconstruct,
        stats,
    })
}

fn check_fluid(region: &Region, config: &ResolvedConfig) -> Result<(), PlanError> {
    if !region.requires_fluid() {
        return Ok(());
    }
    if config.fluid_segment_type.is_none() {
        return Err(PlanError::incompatible(
            "region requires fluid but no fluid segment type is configured",
        ));
    }
    if !config.footprint.fluid_input {
        return Err(PlanError::incompatible(
            "region requires fluid but the unit has no fluid input",
        ));
    }
    Ok(())
}

/// Every placeholder the components propose, in generation order: units,
/// lanes, power, fluid, emitters.
fn candidates(
    layout: &Layout,
    lines: &[RoutedLine],
    config: &ResolvedConfig,
) -> Result<Vec<Placeholder>, PlanError> {
    let mut out = Vec::new();

    for unit in &layout.units {
        out.push(Placeholder {
            kind: PlaceholderKind::Unit,
            entity: config.unit_type,
            position: unit.position,
            footprint: unit.footprint,
            direction: Some(unit.facing),
            quality: config.quality,
            modules: config.modules.clone(),
            tag: None,
        });
    }

    for line in lines {
        for tile in &line.tiles {
            let (kind, entity) = match tile.kind {
                LineTileKind::Segment => (PlaceholderKind::Segment, config.segment_type),
                LineTileKind::Bridge(role) => (PlaceholderKind::Bridge(role), config.segment.bridge),
            };
            out.push(Placeholder::tile(
                kind,
                entity,
                tile.position,
                Some(line.direction),
            ));
        }
    }

    for node in place_power(layout, config.node_type, &config.node)? {
        out.push(Placeholder::tile(
            PlaceholderKind::PowerNode,
            node.node_type,
            node.position,
            None,
        ));
    }

    if let Some(fluid_type) = config.fluid_segment_type {
        for segment in route_fluid(layout) {
            out.push(Placeholder::tile(
                PlaceholderKind::FluidSegment,
                fluid_type,
                segment.position,
                None,
            ));
        }
    }

    if let Some((emitter_type, spec)) = config.emitter {
        let fill = fill_emitters(layout, emitter_type, &spec, config.limits);
        for anchor in fill.anchors {
            out.push(Placeholder {
                kind: PlaceholderKind::Emitter,
                entity: anchor.emitter_type,
                position: anchor.position,
                footprint: anchor.footprint,
                direction: None,
                quality: None,
                modules: config.emitter_modules.clone(),
                tag: None,
            });
        }
    }

    log::debug!("{} candidate placeholders", out.len());
    Ok(out)
}

fn stats(region: &Region, layout: &Layout, lines: &[RoutedLine], kept: &[Placeholder]) -> PlanStats {
    let count = |pred: fn(&PlaceholderKind) -> bool| kept.iter().filter(|p| pred(&p.kind)).count();

    let placed: BTreeSet<GridPosition> = kept
        .iter()
        .filter(|p| p.kind == PlaceholderKind::Unit)
        .map(|p| p.position)
        .collect();
    let reaches: Vec<_> = layout
        .units
        .iter()
        .filter(|u| placed.contains(&u.position))
        .map(|u| {
            let (origin, footprint) = layout.frame.rect_to_world(u.reach);
            footprint.rect(origin)
        })
        .collect();
    let uncovered_points = region
        .points()
        .filter(|p| !reaches.iter().any(|r| r.contains(p.position)))
        .count();

    PlanStats {
        units: placed.len(),
        lines: lines.iter().filter(|l| !l.tiles.is_empty()).count(),
        line_segments: count(|k| *k == PlaceholderKind::Segment),
        bridges: count(|k| matches!(k, PlaceholderKind::Bridge(_))),
        power_nodes: count(|k| *k == PlaceholderKind::PowerNode),
        emitters: count(|k| *k == PlaceholderKind::Emitter),
        fluid_segments: count(|k| *k == PlaceholderKind::FluidSegment),
        uncovered_points,
    }
}
