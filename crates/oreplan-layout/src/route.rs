//! Line Router: lays the lane tiles of each line.
//!
//! Rows are the distinct exhaust tiles on a lane. For units at least three
//! tiles wide the tile after each row's exhaust is kept free for a power
//! node, so the stream dives at the exhaust (`Entry`) and resurfaces two
//! tiles later (`Exit`). Narrower units get a continuous run of plain
//! segments. Roles are assigned in the canonical frame, where upstream is
//! always smaller `v`, so they come out right for every flow direction.

use std::collections::BTreeSet;

use oreplan_core::config::FootprintSpec;
use oreplan_core::geometry::{Direction, Frame, GridPosition};
use oreplan_core::placeholder::BridgeRole;

use crate::packer::{Layout, LineLayout, UnitAnchor};

/// Tiles between a bridge's dive and its resurfacing.
pub const BRIDGE_SPAN: u32 = 2;

/// What goes on one lane tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTileKind {
    Segment,
    Bridge(BridgeRole),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTile {
    /// Along coordinate in the canonical frame.
    pub v: i32,
    pub position: GridPosition,
    pub kind: LineTileKind,
}

/// The two bridge endpoints around one row, both carrying the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgePair {
    /// Upstream end, where the previous dive resurfaces.
    pub exit: GridPosition,
    /// Downstream end, on the row's exhaust tile.
    pub entry: GridPosition,
    pub direction: Direction,
}

/// A routed lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedLine {
    pub line: usize,
    pub direction: Direction,
    /// Lane tiles in flow order.
    pub tiles: Vec<LineTile>,
    pub bridges: Vec<BridgePair>,
    /// Resurfacing point after the last row.
    pub tail_exit: Option<GridPosition>,
}

impl RoutedLine {
    pub fn bridge_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| matches!(t.kind, LineTileKind::Bridge(_)))
            .count()
    }
}

/// Route one line.
///
/// # Panics
///
/// Panics if any anchor belongs to a different line.
pub fn route_line(
    frame: Frame,
    footprint: &FootprintSpec,
    line: &LineLayout,
    anchors: &[&UnitAnchor],
) -> RoutedLine {
    assert!(
        anchors.iter().all(|a| a.line == line.index),
        "anchors from another line passed to line {}",
        line.index
    );

    let direction = frame.flow();
    let rows: BTreeSet<i32> = anchors.iter().map(|a| a.exhaust_v).collect();
    let mut routed = RoutedLine {
        line: line.index,
        direction,
        tiles: Vec::new(),
        bridges: Vec::new(),
        tail_exit: None,
    };
    let push = |tiles: &mut Vec<LineTile>, v: i32, kind: LineTileKind| {
        let position = frame.to_world(line.lane_u, v);
        tiles.push(LineTile { v, position, kind });
        position
    };

    if footprint.is_bridged() {
        let span = BRIDGE_SPAN as i32;
        let mut prev: Option<i32> = None;
        for &row in &rows {
            let exit_v = prev.map_or(row - 1, |p| p + span);
            debug_assert!(exit_v < row, "rows closer than a bridge span");
            let exit = push(
                &mut routed.tiles,
                exit_v,
                LineTileKind::Bridge(BridgeRole::Exit),
            );
            for v in exit_v + 1..row {
                push(&mut routed.tiles, v, LineTileKind::Segment);
            }
            let entry = push(
                &mut routed.tiles,
                row,
                LineTileKind::Bridge(BridgeRole::Entry),
            );
            routed.bridges.push(BridgePair {
                exit,
                entry,
                direction,
            });
            prev = Some(row);
        }
        if let Some(last) = prev {
            routed.tail_exit = Some(push(
                &mut routed.tiles,
                last + span,
                LineTileKind::Bridge(BridgeRole::Exit),
            ));
        }
    } else if let (Some(&first), Some(&last)) = (rows.first(), rows.last()) {
        for v in first..=last {
            push(&mut routed.tiles, v, LineTileKind::Segment);
        }
    }

    log::trace!(
        "routed line {}: {} tiles, {} bridge pairs",
        line.index,
        routed.tiles.len(),
        routed.bridges.len()
    );
    routed
}

/// Route every line of a layout, in line order.
pub fn route_lines(layout: &Layout) -> Vec<RoutedLine> {
    layout
        .lines
        .iter()
        .map(|line| {
            let anchors: Vec<&UnitAnchor> = layout.units_on(line.index).map(|(_, u)| u).collect();
            route_line(layout.frame, &layout.footprint, line, &anchors)
        })
        .collect()
}
