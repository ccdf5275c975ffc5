//! Tile geometry: positions, footprints, rectangles, cardinal directions and
//! the canonical flow frame every planner works in.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Positions and footprints
// ---------------------------------------------------------------------------

/// A tile position in world coordinates. `y` grows southward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// Chebyshev (chessboard) distance to another position.
    pub fn chebyshev_distance(&self, other: &GridPosition) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    /// The position `steps` tiles away in `dir`.
    pub fn step(&self, dir: Direction, steps: i32) -> GridPosition {
        let (dx, dy) = dir.offset();
        GridPosition::new(self.x + dx * steps, self.y + dy * steps)
    }
}

/// The size of an entity on the grid, in world orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    /// A 1x1 entity.
    pub fn single() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }

    /// An `n` x `n` entity.
    pub fn square(n: u32) -> Self {
        Self {
            width: n,
            height: n,
        }
    }

    /// Iterate over all tiles occupied by this footprint at the given origin.
    /// Origin is the top-left corner.
    pub fn tiles(&self, origin: GridPosition) -> impl Iterator<Item = GridPosition> + use<> {
        let w = self.width as i32;
        let h = self.height as i32;
        let ox = origin.x;
        let oy = origin.y;
        (0..h).flat_map(move |dy| (0..w).map(move |dx| GridPosition::new(ox + dx, oy + dy)))
    }

    /// The inclusive rectangle covered at `origin`.
    pub fn rect(&self, origin: GridPosition) -> Rect {
        Rect::new(
            origin,
            GridPosition::new(
                origin.x + self.width as i32 - 1,
                origin.y + self.height as i32 - 1,
            ),
        )
    }
}

// ---------------------------------------------------------------------------
// Rectangles
// ---------------------------------------------------------------------------

/// An axis-aligned, inclusive rectangle of tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub min: GridPosition,
    pub max: GridPosition,
}

impl Rect {
    /// Build a rectangle from two corners in any order.
    pub fn new(a: GridPosition, b: GridPosition) -> Self {
        Self {
            min: GridPosition::new(a.x.min(b.x), a.y.min(b.y)),
            max: GridPosition::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn width(&self) -> u32 {
        (self.max.x - self.min.x + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max.y - self.min.y + 1) as u32
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow the rectangle by `n` tiles on every side.
    pub fn expanded(&self, n: i32) -> Rect {
        Rect {
            min: GridPosition::new(self.min.x - n, self.min.y - n),
            max: GridPosition::new(self.max.x + n, self.max.y + n),
        }
    }

    /// Iterate over every tile, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = GridPosition> + use<> {
        let min = self.min;
        let max = self.max;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| GridPosition::new(x, y)))
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// Cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four cardinal directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Offset for this direction.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Whether this direction runs along the y axis.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

// ---------------------------------------------------------------------------
// Canonical flow frame
// ---------------------------------------------------------------------------

/// A rectangle in the canonical frame: `cross` tiles wide on the `u` axis
/// starting at `u`, `along` tiles long on the `v` axis starting at `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalRect {
    pub u: i32,
    pub v: i32,
    pub cross: u32,
    pub along: u32,
}

impl CanonicalRect {
    pub fn new(u: i32, v: i32, cross: u32, along: u32) -> Self {
        Self { u, v, cross, along }
    }

    /// A single canonical tile.
    pub fn tile(u: i32, v: i32) -> Self {
        Self::new(u, v, 1, 1)
    }

    pub fn u_end(&self) -> i32 {
        self.u + self.cross as i32 - 1
    }

    pub fn v_end(&self) -> i32 {
        self.v + self.along as i32 - 1
    }

    pub fn contains(&self, u: i32, v: i32) -> bool {
        u >= self.u && u <= self.u_end() && v >= self.v && v <= self.v_end()
    }

    pub fn intersects(&self, other: &CanonicalRect) -> bool {
        self.u <= other.u_end()
            && other.u <= self.u_end()
            && self.v <= other.v_end()
            && other.v <= self.v_end()
    }

    /// Iterate over every `(u, v)` tile.
    pub fn tiles(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (u0, u1, v0, v1) = (self.u, self.u_end(), self.v, self.v_end());
        (v0..=v1).flat_map(move |v| (u0..=u1).map(move |u| (u, v)))
    }
}

/// Maps between world tiles and the canonical frame of a flow direction.
///
/// | Flow  | canonical from world |
/// |-------|----------------------|
/// | South | `u = x, v = y`       |
/// | North | `u = x, v = -y`      |
/// | East  | `u = y, v = x`       |
/// | West  | `u = y, v = -x`      |
///
/// `v` always grows in the flow direction, so "upstream" and "downstream"
/// are plain integer comparisons on `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    flow: Direction,
}

impl Frame {
    pub fn new(flow: Direction) -> Self {
        Self { flow }
    }

    /// The flow direction this frame was built for.
    pub fn flow(&self) -> Direction {
        self.flow
    }

    /// Convert a world tile to canonical `(u, v)`.
    pub fn to_canonical(&self, pos: GridPosition) -> (i32, i32) {
        match self.flow {
            Direction::South => (pos.x, pos.y),
            Direction::North => (pos.x, -pos.y),
            Direction::East => (pos.y, pos.x),
            Direction::West => (pos.y, -pos.x),
        }
    }

    /// Convert canonical `(u, v)` to a world tile.
    pub fn to_world(&self, u: i32, v: i32) -> GridPosition {
        match self.flow {
            Direction::South => GridPosition::new(u, v),
            Direction::North => GridPosition::new(u, -v),
            Direction::East => GridPosition::new(v, u),
            Direction::West => GridPosition::new(-v, u),
        }
    }

    /// The world direction of the canonical `+u` axis.
    pub fn cross_positive(&self) -> Direction {
        if self.flow.is_vertical() {
            Direction::East
        } else {
            Direction::South
        }
    }

    /// Convert a canonical rectangle to its world top-left tile and footprint.
    pub fn rect_to_world(&self, rect: CanonicalRect) -> (GridPosition, Footprint) {
        let a = self.to_world(rect.u, rect.v);
        let b = self.to_world(rect.u_end(), rect.v_end());
        let world = Rect::new(a, b);
        (
            world.min,
            Footprint {
                width: world.width(),
                height: world.height(),
            },
        )
    }

    /// Canonical bounds of a world rectangle.
    pub fn rect_to_canonical(&self, rect: Rect) -> CanonicalRect {
        let (u0, v0) = self.to_canonical(rect.min);
        let (u1, v1) = self.to_canonical(rect.max);
        let (u_min, u_max) = (u0.min(u1), u0.max(u1));
        let (v_min, v_max) = (v0.min(v1), v0.max(v1));
        CanonicalRect::new(
            u_min,
            v_min,
            (u_max - u_min + 1) as u32,
            (v_max - v_min + 1) as u32,
        )
    }
}
