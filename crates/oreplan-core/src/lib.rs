//! Oreplan Core -- shared types for the mining-grid layout planner.
//!
//! This crate holds everything the planning components agree on: tile
//! geometry and the canonical flow frame, the region being planned, the
//! entity catalog, the caller's configuration, and the placeholder/plan
//! types handed to the external construction system.
//!
//! # Canonical Flow Frame
//!
//! Layout is computed in a frame where `v` grows in the flow direction and
//! `u` is the cross axis. [`geometry::Frame`] converts between that frame and
//! world tiles, so reversing the flow direction mirrors every along-axis
//! offset without per-direction code in the planners:
//!
//! ```rust,ignore
//! let frame = Frame::new(Direction::North);
//! let world = frame.to_world(3, 10);
//! assert_eq!(frame.to_canonical(world), (3, 10));
//! ```
//!
//! # Key Types
//!
//! - [`region::Region`] -- bounded tile rectangle of extraction points and
//!   obstructions.
//! - [`catalog::Catalog`] -- immutable entity specs (frozen from a
//!   [`catalog::CatalogBuilder`]).
//! - [`config::Configuration`] -- explicit per-call planner settings.
//! - [`placeholder::Placeholder`] / [`placeholder::Plan`] -- the emitted
//!   construction plan.
//! - [`error::PlanError`] -- structured planning failures.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fixed;
pub mod geometry;
pub mod id;
pub mod placeholder;
pub mod region;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
