//! Oreplan Data -- loads catalogs and configuration presets from RON, TOML
//! or JSON files.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, PlannerData, load_planner_data};
