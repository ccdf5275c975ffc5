//! Cross-axis geometry of a line block.
//!
//! A block is laid out along `u` as
//!
//! ```text
//! [services][A units][lane][B units][services] <gap>
//! ```
//!
//! A units face `+u`, B units face `-u`, and both drop onto the lane. The
//! service columns (fluid next to the units, power outermost) are only
//! reserved when the region or the footprint needs them.

use oreplan_core::config::{FootprintSpec, Strategy};
use oreplan_core::geometry::{Direction, Frame};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sides and services
// ---------------------------------------------------------------------------

/// Which side of the lane a unit column sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Below the lane in `u`; faces `+u`.
    A,
    /// Above the lane in `u`; faces `-u`.
    B,
}

impl Side {
    /// World direction units on this side face (towards the lane).
    pub fn facing(self, frame: &Frame) -> Direction {
        match self {
            Side::A => frame.cross_positive(),
            Side::B => frame.cross_positive().opposite(),
        }
    }
}

/// Which one-tile service columns sit behind each unit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Services {
    pub fluid: bool,
    pub power: bool,
}

impl Services {
    /// Power gets its own column only when it cannot live in the lane.
    pub fn for_footprint(footprint: &FootprintSpec, fluid: bool) -> Self {
        Self {
            fluid,
            power: !footprint.is_bridged(),
        }
    }

    /// Total width of the service columns behind one unit column.
    pub fn width(&self) -> i32 {
        i32::from(self.fluid) + i32::from(self.power)
    }
}

/// One unit column of a block, with its service columns, in canonical `u`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub side: Side,
    /// Lowest `u` of the unit footprints.
    pub unit_u: i32,
    pub fluid_u: Option<i32>,
    pub power_u: Option<i32>,
}

// ---------------------------------------------------------------------------
// Packing parameters
// ---------------------------------------------------------------------------

/// Strategy-dependent spacing, resolved once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packing {
    /// Free columns between consecutive blocks.
    pub gap: u32,
    /// Along distance between consecutive units of one column.
    pub pitch: u32,
    /// Along shift applied to odd blocks.
    pub stagger: u32,
}

impl Packing {
    pub fn for_strategy(strategy: Strategy, footprint: &FootprintSpec, emitter_size: u32) -> Self {
        match strategy {
            Strategy::Dense => Self {
                gap: emitter_size,
                pitch: footprint.width,
                stagger: 0,
            },
            Strategy::Staggered => Self {
                gap: footprint
                    .reach
                    .saturating_sub(footprint.height)
                    .max(emitter_size),
                pitch: footprint.reach.max(footprint.width),
                stagger: footprint.width / 2,
            },
        }
    }

    /// Along offset of the lattice for the `block`-th block.
    pub fn offset(&self, block: usize) -> i32 {
        if block % 2 == 1 {
            self.stagger as i32
        } else {
            0
        }
    }
}

// ---------------------------------------------------------------------------
// CrossPattern
// ---------------------------------------------------------------------------

/// Cross-axis offsets of every column in a block starting at some `u`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossPattern {
    /// Unit depth (footprint height).
    pub depth: u32,
    pub services: Services,
    pub gap: u32,
}

impl CrossPattern {
    pub fn new(footprint: &FootprintSpec, services: Services, gap: u32) -> Self {
        Self {
            depth: footprint.height,
            services,
            gap,
        }
    }

    fn depth(&self) -> i32 {
        self.depth as i32
    }

    /// Width of a full block, services included.
    pub fn block_width(&self) -> i32 {
        2 * self.services.width() + 2 * self.depth() + 1
    }

    /// Distance from one block start to the next.
    pub fn pitch(&self) -> i32 {
        self.block_width() + self.gap as i32
    }

    pub fn lane(&self, start: i32) -> i32 {
        start + self.services.width() + self.depth()
    }

    /// Last `u` of a full block.
    pub fn block_end(&self, start: i32) -> i32 {
        start + self.block_width() - 1
    }

    pub fn column(&self, side: Side, start: i32) -> Column {
        let fluid = i32::from(self.services.fluid);
        match side {
            Side::A => {
                let unit_u = start + self.services.width();
                Column {
                    side,
                    unit_u,
                    fluid_u: self.services.fluid.then_some(unit_u - 1),
                    power_u: self.services.power.then_some(unit_u - 1 - fluid),
                }
            }
            Side::B => {
                let unit_u = self.lane(start) + 1;
                let back = unit_u + self.depth();
                Column {
                    side,
                    unit_u,
                    fluid_u: self.services.fluid.then_some(back),
                    power_u: self.services.power.then_some(back + fluid),
                }
            }
        }
    }
}
