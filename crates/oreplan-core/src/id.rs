use serde::{Deserialize, Serialize};

/// Identifies an entity type in the catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityTypeId(pub u32);

/// Identifies a material (resource) on an extraction point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// Identifies a quality tier / variant of a placed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualityId(pub u8);

/// Tag stamped on every placeholder a planner emits, so a later removal
/// pass can find exactly those placeholders again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RemovalTag(pub u32);

/// The tag this planner stamps on its placeholders.
pub const PLANNER_TAG: RemovalTag = RemovalTag(0x4f52_4550);
