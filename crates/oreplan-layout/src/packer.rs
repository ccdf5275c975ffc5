//! Grid Packer: places extraction units on a lattice of line blocks.
//!
//! Blocks repeat across the cross axis (see [`crate::pattern`]); within each
//! unit column, units repeat along the flow at the strategy's pitch. A
//! lattice position is skipped when its footprint straddles two materials or
//! has no material to mine, leaving a hole without shifting its neighbours.

use std::collections::{BTreeMap, BTreeSet};

use oreplan_core::config::{FootprintSpec, ResolvedConfig};
use oreplan_core::geometry::{CanonicalRect, Direction, Footprint, Frame, GridPosition, Rect};
use oreplan_core::id::MaterialId;
use oreplan_core::region::{ExtractionPoint, Region};

use crate::pattern::{Column, CrossPattern, Packing, Services, Side};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A placed extraction unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitAnchor {
    /// Index into [`Layout::lines`].
    pub line: usize,
    pub side: Side,
    /// Footprint in the canonical frame.
    pub rect: CanonicalRect,
    /// Extraction area in the canonical frame.
    pub reach: CanonicalRect,
    /// World top-left tile.
    pub position: GridPosition,
    /// World footprint.
    pub footprint: Footprint,
    pub facing: Direction,
    pub flow: Direction,
    pub material: MaterialId,
    pub needs_fluid: bool,
    /// Along coordinate of the lane tile the unit drops onto.
    pub exhaust_v: i32,
}

impl UnitAnchor {
    pub fn world_rect(&self) -> Rect {
        self.footprint.rect(self.position)
    }
}

/// The cross-axis placement of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineLayout {
    pub index: usize,
    pub lane_u: i32,
    pub a: Column,
    /// `None` for a half block, where only column A fit the region.
    pub b: Option<Column>,
}

impl LineLayout {
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        std::iter::once(&self.a).chain(self.b.as_ref())
    }

    pub fn column(&self, side: Side) -> Option<&Column> {
        match side {
            Side::A => Some(&self.a),
            Side::B => self.b.as_ref(),
        }
    }
}

/// A column strip reserved for emitters, `cross` tiles wide starting at `u`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterStrip {
    pub u: i32,
    pub cross: u32,
}

/// Everything downstream planners need from the packer.
#[derive(Debug, Clone)]
pub struct Layout {
    pub frame: Frame,
    /// Region bounds in the canonical frame.
    pub bounds: CanonicalRect,
    pub footprint: FootprintSpec,
    pub pattern: CrossPattern,
    pub lines: Vec<LineLayout>,
    /// Anchors ordered by line, then side, then along position.
    pub units: Vec<UnitAnchor>,
    pub strips: Vec<EmitterStrip>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units on one line with their anchor indices.
    pub fn units_on(&self, line: usize) -> impl Iterator<Item = (usize, &UnitAnchor)> {
        self.units
            .iter()
            .enumerate()
            .filter(move |(_, unit)| unit.line == line)
    }

    /// Distinct exhaust rows of a line, in flow order.
    pub fn rows(&self, line: usize) -> Vec<i32> {
        self.units_on(line)
            .map(|(_, unit)| unit.exhaust_v)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// World tile of a canonical coordinate.
    pub fn world(&self, u: i32, v: i32) -> GridPosition {
        self.frame.to_world(u, v)
    }
}

// ---------------------------------------------------------------------------
// Material sampling
// ---------------------------------------------------------------------------

struct Sample {
    material: MaterialId,
    needs_fluid: bool,
}

struct MaterialSampler<'a> {
    region: &'a Region,
    frame: Frame,
    reach: u32,
    margin_u: i32,
    margin_v: i32,
}

impl<'a> MaterialSampler<'a> {
    fn new(region: &'a Region, frame: Frame, footprint: &FootprintSpec) -> Self {
        Self {
            region,
            frame,
            reach: footprint.reach,
            margin_u: (footprint.reach - footprint.height) as i32 / 2,
            margin_v: (footprint.reach - footprint.width) as i32 / 2,
        }
    }

    fn reach_of(&self, rect: CanonicalRect) -> CanonicalRect {
        CanonicalRect::new(
            rect.u - self.margin_u,
            rect.v - self.margin_v,
            self.reach,
            self.reach,
        )
    }

    fn points_in(&self, rect: CanonicalRect) -> impl Iterator<Item = &'a ExtractionPoint> + '_ {
        rect.tiles()
            .filter_map(move |(u, v)| self.region.point_at(self.frame.to_world(u, v)))
    }

    /// The material a footprint at `rect` would mine, or `None` if it may not
    /// be placed there.
    fn sample(&self, rect: CanonicalRect) -> Option<Sample> {
        let mut under = None;
        for point in self.points_in(rect) {
            match under {
                None => under = Some(point.material),
                Some(m) if m != point.material => return None,
                Some(_) => {}
            }
        }

        let reach = self.reach_of(rect);
        let material = match under {
            Some(m) => m,
            None => self.dominant(reach)?,
        };
        let needs_fluid = self
            .points_in(reach)
            .any(|p| p.material == material && p.fluid_required);
        Some(Sample {
            material,
            needs_fluid,
        })
    }

    /// Most frequent material in `rect`; ties go to the lowest id.
    fn dominant(&self, rect: CanonicalRect) -> Option<MaterialId> {
        let mut counts: BTreeMap<MaterialId, usize> = BTreeMap::new();
        for point in self.points_in(rect) {
            *counts.entry(point.material).or_default() += 1;
        }
        let mut best: Option<(MaterialId, usize)> = None;
        for (material, count) in counts {
            if best.is_none_or(|(_, n)| count > n) {
                best = Some((material, count));
            }
        }
        best.map(|(m, _)| m)
    }
}

// ---------------------------------------------------------------------------
// Packing
// ---------------------------------------------------------------------------

/// Pack extraction units into `region` under `config`.
///
/// Returns an empty layout (no units) when not a single footprint fits.
pub fn pack(region: &Region, config: &ResolvedConfig) -> Layout {
    let frame = Frame::new(config.flow);
    let bounds = frame.rect_to_canonical(region.bounds());
    let footprint = config.footprint;
    let emitter_size = config.emitter.map(|(_, spec)| spec.size).unwrap_or(0);

    let packing = Packing::for_strategy(config.strategy, &footprint, emitter_size);
    let services = Services::for_footprint(&footprint, region.requires_fluid());
    let pattern = CrossPattern::new(&footprint, services, packing.gap);
    let sampler = MaterialSampler::new(region, frame, &footprint);

    let mut layout = Layout {
        frame,
        bounds,
        footprint,
        pattern,
        lines: Vec::new(),
        units: Vec::new(),
        strips: Vec::new(),
    };

    let u_max = bounds.u_end();
    let depth = footprint.height as i32;
    let push_strip = |strips: &mut Vec<EmitterStrip>, u: i32| {
        if emitter_size > 0 && u + emitter_size as i32 - 1 <= u_max {
            strips.push(EmitterStrip {
                u,
                cross: emitter_size,
            });
        }
    };

    push_strip(&mut layout.strips, bounds.u);
    let mut start = bounds.u + emitter_size as i32;
    if pattern.column(Side::A, start).unit_u + depth - 1 > u_max {
        // No room for a unit column behind its services: drop the leading
        // strip and let the services use the one-tile margin like the lane.
        layout.strips.clear();
        start = bounds.u - services.width().min(1);
    }
    let mut block = 0;
    loop {
        let a = pattern.column(Side::A, start);
        if a.unit_u + depth - 1 > u_max {
            break;
        }
        let full = pattern.block_end(start) <= u_max;
        let lane_u = pattern.lane(start);
        let line = LineLayout {
            index: layout.lines.len(),
            lane_u,
            a,
            b: full.then(|| pattern.column(Side::B, start)),
        };

        let before = layout.units.len();
        let offset = packing.offset(block);
        for column in line.columns() {
            place_column(&mut layout, &sampler, &line, column, offset, packing.pitch);
        }
        if layout.units.len() > before {
            layout.lines.push(line);
        }

        let end = if full { pattern.block_end(start) } else { lane_u };
        push_strip(
            &mut layout.strips,
            end + 1 + (packing.gap - emitter_size) as i32 / 2,
        );
        if !full {
            break;
        }
        start += pattern.pitch();
        block += 1;
    }

    log::debug!(
        "packed {} units on {} lines ({:?}, flow {:?}, {} emitter strips)",
        layout.units.len(),
        layout.lines.len(),
        config.strategy,
        config.flow,
        layout.strips.len()
    );
    layout
}

fn place_column(
    layout: &mut Layout,
    sampler: &MaterialSampler<'_>,
    line: &LineLayout,
    column: &Column,
    offset: i32,
    pitch: u32,
) {
    let fp = layout.footprint;
    let v_max = layout.bounds.v_end();
    let mut v = layout.bounds.v + offset;
    while v + fp.width as i32 - 1 <= v_max {
        let rect = CanonicalRect::new(column.unit_u, v, fp.height, fp.width);
        if let Some(sample) = sampler.sample(rect) {
            let (position, footprint) = layout.frame.rect_to_world(rect);
            layout.units.push(UnitAnchor {
                line: line.index,
                side: column.side,
                rect,
                reach: sampler.reach_of(rect),
                position,
                footprint,
                facing: column.side.facing(&layout.frame),
                flow: layout.frame.flow(),
                material: sample.material,
                needs_fluid: sample.needs_fluid,
                exhaust_v: v + fp.exhaust_offset(),
            });
        } else {
            log::trace!("skipped lattice position u={} v={v}", column.unit_u);
        }
        v += pitch as i32;
    }
}
