//! Power Placer for the oreplan layout planner.
//!
//! Places power-node anchors for every packed line so that each unit is
//! inside some node's supply area and all nodes of a line form one
//! link-connected network.
//!
//! # Rules
//!
//! The rule is chosen once per call from the unit footprint:
//!
//! - [`PowerRule::FixedPattern`] (units at least three tiles wide): one node
//!   per row on the lane tile the router leaves free after the exhaust.
//!   Coverage does not depend on the node's radius. Where lattice holes put
//!   consecutive nodes out of link reach, relays go on free tiles beside the
//!   lane.
//! - [`PowerRule::CalculatedSpacing`] (narrower units): per unit column, a
//!   greedy chain on the power service column that places each node as far
//!   downstream as still covers the first unpowered unit, with collinear
//!   relays where the chain would break.
//!
//! Geometry the rule cannot satisfy is reported as
//! [`PlanError::IncompatibleConfiguration`].

use std::collections::VecDeque;

use oreplan_core::catalog::NodeSpec;
use oreplan_core::config::FootprintSpec;
use oreplan_core::error::PlanError;
use oreplan_core::fixed::{Fixed64, HALF_TILE, fixed64_to_f64, whole_tiles, within_reach};
use oreplan_core::geometry::{CanonicalRect, GridPosition};
use oreplan_core::id::EntityTypeId;
use oreplan_layout::{Layout, LineLayout, Side};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Node spacing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerRule {
    FixedPattern,
    CalculatedSpacing,
}

impl PowerRule {
    pub fn for_footprint(footprint: &FootprintSpec) -> Self {
        if footprint.is_bridged() {
            PowerRule::FixedPattern
        } else {
            PowerRule::CalculatedSpacing
        }
    }
}

/// A placed power node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerAnchor {
    pub line: usize,
    /// Canonical cross coordinate.
    pub u: i32,
    /// Canonical along coordinate.
    pub v: i32,
    pub position: GridPosition,
    pub node_type: EntityTypeId,
    /// The unit this node was placed for under the fixed pattern.
    pub bound_unit: Option<usize>,
    /// Added only to keep the network connected.
    pub relay: bool,
}

// ---------------------------------------------------------------------------
// Geometry checks
// ---------------------------------------------------------------------------

/// Whether a node on tile `node` supplies a footprint. The supply area is a
/// square of half-width `radius` around the node's tile centre; any overlap
/// with the footprint counts.
pub fn covers(node: (i32, i32), radius: Fixed64, rect: &CanonicalRect) -> bool {
    let overlaps = |centre: Fixed64, lo: i32, len: u32| {
        let lo_f = Fixed64::from_num(lo);
        let hi_f = Fixed64::from_num(lo + len as i32);
        centre - radius < hi_f && lo_f < centre + radius
    };
    overlaps(Fixed64::from_num(node.0) + HALF_TILE, rect.u, rect.cross)
        && overlaps(Fixed64::from_num(node.1) + HALF_TILE, rect.v, rect.along)
}

/// Whether every node can reach every other through links of at most
/// `reach`.
pub fn is_link_connected(nodes: &[(i32, i32)], reach: Fixed64) -> bool {
    if nodes.is_empty() {
        return true;
    }
    let mut seen = vec![false; nodes.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    seen[0] = true;
    queue.push_back(0);
    let mut reached = 1;

    while let Some(i) = queue.pop_front() {
        let (u, v) = nodes[i];
        for (j, &(ou, ov)) in nodes.iter().enumerate() {
            if !seen[j] && within_reach(ou - u, ov - v, reach) {
                seen[j] = true;
                reached += 1;
                queue.push_back(j);
            }
        }
    }
    reached == nodes.len()
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Place power nodes for every line of `layout`.
pub fn place_power(
    layout: &Layout,
    node_type: EntityTypeId,
    spec: &NodeSpec,
) -> Result<Vec<PowerAnchor>, PlanError> {
    let rule = PowerRule::for_footprint(&layout.footprint);
    let mut anchors = Vec::new();
    for line in &layout.lines {
        let mut placer = LinePlacer {
            layout,
            line,
            node_type,
            spec: *spec,
            anchors: Vec::new(),
        };
        match rule {
            PowerRule::FixedPattern => placer.fixed_pattern()?,
            PowerRule::CalculatedSpacing => placer.calculated_spacing()?,
        }
        placer.verify()?;
        anchors.extend(placer.anchors);
    }
    log::debug!(
        "placed {} power nodes ({} relays) under {:?}",
        anchors.len(),
        anchors.iter().filter(|a| a.relay).count(),
        rule
    );
    Ok(anchors)
}

struct LinePlacer<'a> {
    layout: &'a Layout,
    line: &'a LineLayout,
    node_type: EntityTypeId,
    spec: NodeSpec,
    anchors: Vec<PowerAnchor>,
}

impl<'a> LinePlacer<'a> {
    fn push(&mut self, u: i32, v: i32, bound_unit: Option<usize>, relay: bool) {
        self.anchors.push(PowerAnchor {
            line: self.line.index,
            u,
            v,
            position: self.layout.world(u, v),
            node_type: self.node_type,
            bound_unit,
            relay,
        });
    }

    fn reach_error(&self, from: i32, to: i32) -> PlanError {
        PlanError::incompatible(format!(
            "link reach {} cannot join power nodes at v={from} and v={to} on line {}",
            fixed64_to_f64(self.spec.link_reach),
            self.line.index
        ))
    }

    // -- Fixed pattern --

    fn fixed_pattern(&mut self) -> Result<(), PlanError> {
        let layout = self.layout;
        let line = self.line;
        let mut prev: Option<(i32, i32)> = None;
        for row in layout.rows(line.index) {
            let bound = layout
                .units_on(line.index)
                .find(|(_, unit)| unit.exhaust_v == row)
                .map(|(index, _)| index);
            let node = (line.lane_u, row + 1);
            if let Some(from) = prev {
                self.relay_beside_lane(from, node)?;
            }
            self.push(node.0, node.1, bound, false);
            prev = Some(node);
        }
        Ok(())
    }

    /// Hop from `from` towards `to` over free tiles beside the lane.
    fn relay_beside_lane(&mut self, from: (i32, i32), to: (i32, i32)) -> Result<(), PlanError> {
        let reach = self.spec.link_reach;
        let lane = self.line.lane_u;
        let mut at = from;
        while !within_reach(to.0 - at.0, to.1 - at.1, reach) {
            let next = (at.1 + 1..to.1)
                .rev()
                .flat_map(|v| [(lane - 1, v), (lane + 1, v)])
                .find(|&(u, v)| {
                    within_reach(u - at.0, v - at.1, reach)
                        && self.is_free(u, v)
                        && !self.has_node(u, v)
                })
                .ok_or_else(|| self.reach_error(from.1, to.1))?;
            self.push(next.0, next.1, None, true);
            at = next;
        }
        Ok(())
    }

    fn has_node(&self, u: i32, v: i32) -> bool {
        self.anchors.iter().any(|a| a.u == u && a.v == v)
    }

    /// Add a relay unless the tile already holds a node.
    fn push_relay(&mut self, u: i32, v: i32) {
        if !self.has_node(u, v) {
            self.push(u, v, None, true);
        }
    }

    fn is_free(&self, u: i32, v: i32) -> bool {
        let bounds = self.layout.bounds;
        u >= bounds.u - 1
            && u <= bounds.u_end() + 1
            && !self.layout.units.iter().any(|unit| unit.rect.contains(u, v))
    }

    // -- Calculated spacing --

    fn calculated_spacing(&mut self) -> Result<(), PlanError> {
        let layout = self.layout;
        let line = self.line;
        let radius = self.spec.coverage_radius;
        // Narrow footprints always reserve a power column; `verify` reports
        // any unit left unsupplied.
        let columns = line.columns().filter_map(|c| c.power_u.map(|u| (c.side, u)));
        for (side, power_u) in columns {
            let rects: Vec<CanonicalRect> = layout
                .units_on(line.index)
                .filter(|(_, unit)| unit.side == side)
                .map(|(_, unit)| unit.rect)
                .collect();

            let mut last: Option<i32> = None;
            for rect in &rects {
                if last.is_some_and(|v| covers((power_u, v), radius, rect)) {
                    continue;
                }
                let target = self.furthest_covering(rect);
                if let Some(prev) = last {
                    self.relay_along_column(power_u, prev, target)?;
                }
                self.push(power_u, target, None, false);
                last = Some(target);
            }
        }
        self.join_columns()
    }

    /// The most downstream node tile on the service column that still covers
    /// `rect`, kept inside the region.
    fn furthest_covering(&self, rect: &CanonicalRect) -> i32 {
        let limit = Fixed64::from_num(rect.v + rect.along as i32) - HALF_TILE
            + self.spec.coverage_radius;
        let v = limit.ceil().to_num::<i32>() - 1;
        v.min(self.layout.bounds.v_end()).max(rect.v)
    }

    /// Relays strictly between `from` and `to` on column `u`, each a whole
    /// link apart.
    fn relay_along_column(&mut self, u: i32, from: i32, to: i32) -> Result<(), PlanError> {
        let reach = self.spec.link_reach;
        let step = whole_tiles(reach);
        if step < 1 {
            return Err(self.reach_error(from, to));
        }
        let step = if to < from { -step } else { step };
        let mut at = from;
        while !within_reach(0, to - at, reach) {
            at += step;
            self.push_relay(u, at);
        }
        Ok(())
    }

    /// Link the two column chains of a full block if they came out apart.
    fn join_columns(&mut self) -> Result<(), PlanError> {
        let (Some(a_u), Some(b_u)) = (
            self.line.a.power_u,
            self.line.column(Side::B).and_then(|b| b.power_u),
        ) else {
            return Ok(());
        };
        let reach = self.spec.link_reach;
        let on = |u: i32| -> Vec<i32> {
            self.anchors
                .iter()
                .filter(|a| a.u == u)
                .map(|a| a.v)
                .collect()
        };
        let (a_nodes, b_nodes) = (on(a_u), on(b_u));
        let closest = a_nodes
            .iter()
            .flat_map(|&av| b_nodes.iter().map(move |&bv| (av, bv)))
            .min_by_key(|&(av, bv)| ((av - bv).abs(), av, bv));
        let Some((av, bv)) = closest else {
            return Ok(());
        };
        if within_reach(b_u - a_u, bv - av, reach) {
            return Ok(());
        }
        if !within_reach(b_u - a_u, 0, reach) {
            return Err(PlanError::incompatible(format!(
                "power service columns {} tiles apart exceed link reach {}",
                b_u - a_u,
                fixed64_to_f64(reach)
            )));
        }
        self.relay_along_column(b_u, bv, av)?;
        self.push_relay(b_u, av);
        Ok(())
    }

    // -- Verification --

    fn verify(&self) -> Result<(), PlanError> {
        let radius = self.spec.coverage_radius;
        for (index, unit) in self.layout.units_on(self.line.index) {
            if !self
                .anchors
                .iter()
                .any(|a| covers((a.u, a.v), radius, &unit.rect))
            {
                return Err(PlanError::incompatible(format!(
                    "coverage radius {} leaves unit {index} on line {} unpowered",
                    fixed64_to_f64(radius),
                    self.line.index
                )));
            }
        }
        let nodes: Vec<(i32, i32)> = self.anchors.iter().map(|a| (a.u, a.v)).collect();
        if !is_link_connected(&nodes, self.spec.link_reach) {
            return Err(PlanError::incompatible(format!(
                "power nodes on line {} are not link-connected",
                self.line.index
            )));
        }
        Ok(())
    }
}
