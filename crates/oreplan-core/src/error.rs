/// Errors from a planning call.
///
/// A successful plan is never empty: the two "nothing to place" outcomes are
/// reported as distinct errors so callers can word their message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The region contains no extraction points.
    #[error("region contains no extraction points")]
    EmptyRegion,
    /// No unit footprint fits without overlapping foreign material.
    #[error("no valid unit placement in region")]
    NoValidPlacement,
    /// The configuration cannot be realised with the given catalog/region.
    #[error("incompatible configuration: {reason}")]
    IncompatibleConfiguration { reason: String },
    /// The collision pass dropped too much of the plan for it to be useful.
    #[error("collision pass dropped {dropped} placeholders (limit {threshold})")]
    CollisionOverflow { dropped: usize, threshold: usize },
}

impl PlanError {
    pub fn incompatible(reason: impl Into<String>) -> Self {
        PlanError::IncompatibleConfiguration {
            reason: reason.into(),
        }
    }

    /// Whether this is one of the "nothing to place" outcomes.
    pub fn is_no_placements(&self) -> bool {
        matches!(self, PlanError::EmptyRegion | PlanError::NoValidPlacement)
    }
}
