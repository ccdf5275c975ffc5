//! Fluid Router for the oreplan layout planner.
//!
//! Units that mine fluid-requiring points take their fluid from the service
//! column directly behind them. For every unit column the router lays a
//! straight run of undirected single-tile fluid segments on that column,
//! from the first to the last fluid-needing unit's centre row. Segments only
//! need adjacency, so there is no bridging and no orientation.

use oreplan_core::geometry::GridPosition;
use oreplan_layout::Layout;

/// One fluid-segment tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidSegment {
    pub line: usize,
    pub u: i32,
    pub v: i32,
    pub position: GridPosition,
}

/// Lay fluid segments for every unit column holding fluid-needing units.
///
/// Columns without a reserved fluid service column get nothing.
pub fn route_fluid(layout: &Layout) -> Vec<FluidSegment> {
    let mut segments = Vec::new();
    for line in &layout.lines {
        for column in line.columns() {
            let Some(fluid_u) = column.fluid_u else {
                continue;
            };
            let rows: Vec<i32> = layout
                .units_on(line.index)
                .filter(|(_, unit)| unit.side == column.side && unit.needs_fluid)
                .map(|(_, unit)| unit.exhaust_v)
                .collect();
            let (Some(&first), Some(&last)) = (rows.iter().min(), rows.iter().max()) else {
                continue;
            };
            segments.extend((first..=last).map(|v| FluidSegment {
                line: line.index,
                u: fluid_u,
                v,
                position: layout.world(fluid_u, v),
            }));
        }
    }
    log::debug!("laid {} fluid segments", segments.len());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use oreplan_core::config::ResolvedConfig;
    use oreplan_core::geometry::Direction;
    use oreplan_core::region::Region;
    use oreplan_core::test_utils::*;
    use oreplan_layout::pack;

    fn fluid_drill(flow: Direction) -> ResolvedConfig {
        let (catalog, ids) = standard_catalog();
        let mut config = drill_config(&ids);
        config.flow_direction = flow;
        config.fluid_segment_type = Some(ids.pipe);
        config.resolve(&catalog).unwrap()
    }

    #[test]
    fn runs_behind_each_unit_column() {
        let layout = pack(&fluid_region(9, 12, uranium_ore()), &fluid_drill(Direction::South));
        let segments = route_fluid(&layout);
        assert_eq!(segments.len(), 20);
        let column_a: Vec<i32> = segments.iter().filter(|s| s.u == 0).map(|s| s.v).collect();
        assert_eq!(column_a, (1..=10).collect::<Vec<_>>());
        assert!(segments.iter().all(|s| s.u == 0 || s.u == 8));
        assert_eq!(segments[0].position, GridPosition::new(0, 1));
    }

    #[test]
    fn run_stops_at_last_fluid_unit() {
        let mut region = Region::new(rect(0, 0, 9, 12));
        region.fill(rect(0, 0, 9, 6), uranium_ore(), true);
        region.fill(rect(0, 6, 9, 6), uranium_ore(), false);
        let layout = pack(&region, &fluid_drill(Direction::South));
        let needing = layout.units.iter().filter(|u| u.needs_fluid).count();
        assert_eq!(needing, 6);
        let segments = route_fluid(&layout);
        let column_a: Vec<i32> = segments.iter().filter(|s| s.u == 0).map(|s| s.v).collect();
        assert_eq!(column_a, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn horizontal_flow_maps_to_rows() {
        let layout = pack(&fluid_region(12, 9, uranium_ore()), &fluid_drill(Direction::West));
        let segments = route_fluid(&layout);
        assert!(!segments.is_empty());
        // West flow: the A fluid column is the top row of the region.
        assert!(segments.iter().filter(|s| s.u == 0).all(|s| s.position.y == 0));
        for segment in &segments {
            assert!(layout.units.iter().all(|u| !u.rect.contains(segment.u, segment.v)));
        }
    }

    #[test]
    fn dry_regions_get_no_segments() {
        let layout = pack(&uniform_region(9, 12, iron_ore()), &fluid_drill(Direction::South));
        assert!(route_fluid(&layout).is_empty());
    }
}
