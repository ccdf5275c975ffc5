//! Emitter Filler for the oreplan layout planner.
//!
//! Fills the emitter strips the packer reserved (the leading strip and the
//! gaps between line blocks) with square effect emitters. Each strip is
//! scanned in flow order; a candidate square is taken when it would lift at
//! least one unit still short of its target without pushing any unit past
//! the cap.
//!
//! # Counting
//!
//! - A unit is affected when its footprint intersects the emitter's effect
//!   area (footprint grown by the effect radius on every side).
//! - The target is the preferred count when one is set, otherwise the cap.
//!   A unit at its target stops driving placement but may still be affected
//!   incidentally, up to the cap.
//! - Counts start at zero on every call; emitters planned by earlier calls
//!   are not seen.

use oreplan_core::catalog::EmitterSpec;
use oreplan_core::config::EmitterLimits;
use oreplan_core::geometry::{CanonicalRect, Footprint, GridPosition};
use oreplan_core::id::EntityTypeId;
use oreplan_layout::{EmitterStrip, Layout};

/// A placed emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterAnchor {
    /// Footprint in the canonical frame.
    pub rect: CanonicalRect,
    pub position: GridPosition,
    pub footprint: Footprint,
    pub emitter_type: EntityTypeId,
    /// Indices of the units this emitter affects.
    pub affected: Vec<usize>,
}

/// Result of filling every strip of a layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitterFill {
    pub anchors: Vec<EmitterAnchor>,
    /// Affecting-emitter count per unit, indexed like `Layout::units`.
    pub counts: Vec<u8>,
}

/// The effect area of an emitter whose footprint is `rect`.
pub fn effect_area(rect: &CanonicalRect, effect_radius: u32) -> CanonicalRect {
    let r = effect_radius as i32;
    CanonicalRect::new(
        rect.u - r,
        rect.v - r,
        rect.cross + 2 * effect_radius,
        rect.along + 2 * effect_radius,
    )
}

/// Fill the layout's emitter strips.
pub fn fill_emitters(
    layout: &Layout,
    emitter_type: EntityTypeId,
    spec: &EmitterSpec,
    limits: EmitterLimits,
) -> EmitterFill {
    let mut fill = EmitterFill {
        anchors: Vec::new(),
        counts: vec![0; layout.units.len()],
    };
    for strip in &layout.strips {
        fill_strip(layout, strip, emitter_type, spec, limits, &mut fill);
    }
    log::debug!(
        "placed {} emitters across {} strips",
        fill.anchors.len(),
        layout.strips.len()
    );
    fill
}

fn fill_strip(
    layout: &Layout,
    strip: &EmitterStrip,
    emitter_type: EntityTypeId,
    spec: &EmitterSpec,
    limits: EmitterLimits,
    fill: &mut EmitterFill,
) {
    let size = spec.size;
    let bounds = layout.bounds;
    let band = effect_area(
        &CanonicalRect::new(strip.u, bounds.v, strip.cross, bounds.along),
        spec.effect_radius,
    );
    let reachable: Vec<usize> = layout
        .units
        .iter()
        .enumerate()
        .filter(|(_, unit)| unit.rect.intersects(&band))
        .map(|(index, _)| index)
        .collect();
    if reachable.is_empty() {
        return;
    }

    let target = limits.target();
    let mut v = bounds.v;
    while v + size as i32 - 1 <= bounds.v_end() {
        if reachable.iter().all(|&i| fill.counts[i] >= target) {
            break;
        }
        let rect = CanonicalRect::new(strip.u, v, size, size);
        let area = effect_area(&rect, spec.effect_radius);
        let affected: Vec<usize> = reachable
            .iter()
            .copied()
            .filter(|&i| layout.units[i].rect.intersects(&area))
            .collect();
        let drives = affected.iter().any(|&i| fill.counts[i] < target);
        let legal = affected.iter().all(|&i| fill.counts[i] < limits.max);
        if !(drives && legal) {
            v += 1;
            continue;
        }

        for &i in &affected {
            fill.counts[i] += 1;
        }
        let (position, footprint) = layout.frame.rect_to_world(rect);
        fill.anchors.push(EmitterAnchor {
            rect,
            position,
            footprint,
            emitter_type,
            affected,
        });
        v += size as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oreplan_core::config::ResolvedConfig;
    use oreplan_core::geometry::Direction;
    use oreplan_core::test_utils::*;
    use oreplan_layout::{Side, pack};

    fn beacon_config(max: u8, preferred: u8) -> ResolvedConfig {
        let (catalog, ids) = standard_catalog();
        let mut config = drill_config(&ids);
        config.emitter_type = Some(ids.beacon);
        config.max_emitters_per_unit = max;
        config.preferred_emitters_per_unit = preferred;
        config.resolve(&catalog).unwrap()
    }

    fn fill(config: &ResolvedConfig, layout: &Layout) -> EmitterFill {
        let (id, spec) = config.emitter.unwrap();
        fill_emitters(layout, id, &spec, config.limits)
    }

    fn line0_a_counts(layout: &Layout, fill: &EmitterFill) -> Vec<u8> {
        layout
            .units_on(0)
            .filter(|(_, u)| u.side == Side::A)
            .map(|(i, _)| fill.counts[i])
            .collect()
    }

    #[test]
    fn leading_strip_fills_until_no_candidate_remains() {
        let config = beacon_config(12, 0);
        let layout = pack(&uniform_region(20, 9, iron_ore()), &config);
        let result = fill(&config, &layout);
        // Three emitters in each of the two strips.
        assert_eq!(result.anchors.len(), 6);
        assert_eq!(line0_a_counts(&layout, &result), vec![2, 3, 2]);
        assert_eq!(result.anchors[0].position, GridPosition::new(0, 0));
        assert_eq!(result.anchors[0].footprint, Footprint::square(3));
    }

    #[test]
    fn cap_is_never_exceeded() {
        let config = beacon_config(2, 0);
        let layout = pack(&uniform_region(20, 9, iron_ore()), &config);
        let result = fill(&config, &layout);
        assert!(result.counts.iter().all(|&c| c <= 2));
        assert_eq!(line0_a_counts(&layout, &result), vec![2, 2, 1]);
    }

    #[test]
    fn preferred_count_short_circuits() {
        let config = beacon_config(12, 1);
        let layout = pack(&uniform_region(20, 9, iron_ore()), &config);
        let preferred = fill(&config, &layout);
        let unbounded = fill(&beacon_config(12, 0), &layout);
        assert!(preferred.anchors.len() < unbounded.anchors.len());
        assert_eq!(line0_a_counts(&layout, &preferred), vec![2, 2, 1]);
    }

    #[test]
    fn affected_lists_match_counts() {
        let config = beacon_config(4, 0);
        for flow in Direction::all() {
            let layout = pack(&uniform_region(26, 21, copper_ore()), &{
                let mut c = config.clone();
                c.flow = flow;
                c
            });
            let result = fill(&config, &layout);
            let mut recount = vec![0u8; layout.units.len()];
            for anchor in &result.anchors {
                for &i in &anchor.affected {
                    recount[i] += 1;
                }
                assert!(!anchor.affected.is_empty());
            }
            assert_eq!(recount, result.counts, "{flow:?}");
            assert!(result.counts.iter().all(|&c| c <= 4));
        }
    }

    #[test]
    fn emitters_stay_off_units() {
        let config = beacon_config(12, 0);
        let layout = pack(&uniform_region(33, 15, iron_ore()), &config);
        let result = fill(&config, &layout);
        for anchor in &result.anchors {
            assert!(layout.units.iter().all(|u| !u.rect.intersects(&anchor.rect)));
        }
    }

    #[test]
    fn no_strips_no_emitters() {
        let (catalog, ids) = standard_catalog();
        let config = drill_config(&ids).resolve(&catalog).unwrap();
        let layout = pack(&uniform_region(20, 9, iron_ore()), &config);
        assert!(layout.strips.is_empty());
        let spec = catalog.emitter(ids.beacon).unwrap();
        let result = fill_emitters(&layout, ids.beacon, &spec, config.limits);
        assert!(result.anchors.is_empty());
    }
}
