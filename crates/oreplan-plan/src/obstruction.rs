//! Obstruction Marker.
//!
//! Clutter standing under a kept placeholder is listed for deconstruction.
//! Structures are listed too in destructive mode; in non-destructive mode a
//! placeholder overlapping a structure is withheld instead, and only that
//! placeholder fails.

use std::collections::BTreeSet;

use oreplan_core::geometry::GridPosition;
use oreplan_core::placeholder::Placeholder;
use oreplan_core::region::{Obstruction, ObstructionKind, Region};

fn overlaps(placeholder: &Placeholder, obstruction: &Obstruction) -> bool {
    placeholder.rect().intersects(&obstruction.rect())
}

/// Drop every candidate overlapping a permanent structure.
///
/// Returns the survivors in their original order and the number withheld.
pub fn exclude_structures(
    candidates: Vec<Placeholder>,
    region: &Region,
) -> (Vec<Placeholder>, usize) {
    let structures: Vec<&Obstruction> = region
        .obstructions()
        .iter()
        .filter(|o| o.kind == ObstructionKind::Structure)
        .collect();
    if structures.is_empty() {
        return (candidates, 0);
    }

    let before = candidates.len();
    let kept: Vec<Placeholder> = candidates
        .into_iter()
        .filter(|p| !structures.iter().any(|o| overlaps(p, o)))
        .collect();
    let excluded = before - kept.len();
    if excluded > 0 {
        log::warn!("withheld {excluded} placeholders standing on structures");
    }
    (kept, excluded)
}

/// Origins of the obstructions that must be cleared before `placeholders`
/// can be built, sorted and without repeats.
pub fn deconstruction_targets(
    placeholders: &[Placeholder],
    region: &Region,
    destructive: bool,
) -> Vec<GridPosition> {
    let targets: BTreeSet<GridPosition> = region
        .obstructions()
        .iter()
        .filter(|o| destructive || o.kind == ObstructionKind::Clutter)
        .filter(|o| placeholders.iter().any(|p| overlaps(p, o)))
        .map(|o| o.position)
        .collect();
    log::debug!("{} obstructions marked for deconstruction", targets.len());
    targets.into_iter().collect()
}
