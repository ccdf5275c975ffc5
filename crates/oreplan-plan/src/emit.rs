//! Plan Emitter collision pass.
//!
//! Candidates claim their tiles highest collision class first, in generation
//! order within a class. A candidate touching an already claimed tile is
//! dropped. Survivors keep their generation order and are stamped with the
//! planner's removal tag.

use std::collections::BTreeSet;

use oreplan_core::error::PlanError;
use oreplan_core::geometry::GridPosition;
use oreplan_core::id::PLANNER_TAG;
use oreplan_core::placeholder::Placeholder;

/// Most placeholders a pass over `total` candidates may drop.
pub fn collision_threshold(total: usize) -> usize {
    total / 10 + 4
}

/// Outcome of a collision pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collisions {
    pub kept: Vec<Placeholder>,
    pub dropped: usize,
}

/// Run the collision pass.
///
/// Fails with [`PlanError::CollisionOverflow`] when more than
/// [`collision_threshold`] candidates are dropped.
pub fn resolve_collisions(candidates: Vec<Placeholder>) -> Result<Collisions, PlanError> {
    let total = candidates.len();
    let mut order: Vec<usize> = (0..total).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(candidates[i].kind.class().priority()));

    let mut claimed: BTreeSet<GridPosition> = BTreeSet::new();
    let mut keep = vec![false; total];
    let mut dropped = 0;
    for i in order {
        let candidate = &candidates[i];
        if candidate.tiles().any(|t| claimed.contains(&t)) {
            log::trace!(
                "dropping {:?} at {:?}: tile already claimed",
                candidate.kind,
                candidate.position
            );
            dropped += 1;
            continue;
        }
        claimed.extend(candidate.tiles());
        keep[i] = true;
    }

    let threshold = collision_threshold(total);
    if dropped > threshold {
        return Err(PlanError::CollisionOverflow { dropped, threshold });
    }
    if dropped > 0 {
        log::warn!("collision pass dropped {dropped} of {total} placeholders");
    }

    let kept = candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(mut placeholder, keep)| {
            keep.then(|| {
                placeholder.tag = Some(PLANNER_TAG);
                placeholder
            })
        })
        .collect();
    Ok(Collisions { kept, dropped })
}
