//! Unit packing and transport-line routing.
//!
//! [`pack`] turns a region into a [`Layout`]: unit anchors grouped into
//! lines, the service columns behind them and the strips left free for
//! emitters. Everything is computed in the canonical flow frame of
//! [`oreplan_core::geometry::Frame`] and carried into world tiles only at
//! the edges, so the four flow directions share one code path.
//!
//! [`route_lines`] then lays each line's lane: plain segments, and for wide
//! units the underground bridge pairs that step around in-lane power nodes.

pub mod packer;
pub mod pattern;
pub mod route;

pub use packer::{EmitterStrip, Layout, LineLayout, UnitAnchor, pack};
pub use pattern::{Column, CrossPattern, Packing, Services, Side};
pub use route::{BridgePair, LineTile, LineTileKind, RoutedLine, route_line, route_lines};
