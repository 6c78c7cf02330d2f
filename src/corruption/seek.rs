//! Automatic seek-and-move
//!
//! While corrupted the player ignores input and runs at the nearest living target.
//! Overlap queries go through [`SpatialQuery`] so the search strategy can be swapped.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::body::{CollisionLayers, Targetable};

pub type OverlapHits = SmallVec<[(Entity, Vec2); 16]>;

/// Overlap query collaborator: entities whose position lies within a circle and whose
/// layers match a mask. Iteration order of the result is unspecified.
pub trait SpatialQuery {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: u32) -> OverlapHits;
}

/// Brute-force overlap over every targetable entity.
impl SpatialQuery for Query<'_, '_, (Entity, &Transform, &CollisionLayers), With<Targetable>> {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: u32) -> OverlapHits {
        let radius_sq = radius * radius;
        self.iter()
            .filter(|(_, _, layers)| layers.matches(mask))
            .map(|(entity, transform, _)| (entity, transform.translation.truncate()))
            .filter(|(_, position)| position.distance_squared(center) <= radius_sq)
            .collect()
    }
}

/// Closest candidate by squared distance. The first candidate wins ties.
pub fn nearest_target(
    origin: Vec2,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Option<(Entity, Vec2)> {
    let mut best: Option<(Entity, Vec2, f32)> = None;
    for (entity, position) in candidates {
        let d = position.distance_squared(origin);
        if best.map_or(true, |(_, _, best_d)| d < best_d) {
            best = Some((entity, position, d));
        }
    }
    best.map(|(entity, position, _)| (entity, position))
}

/// Velocity toward `target` at `speed`, or zero without a target.
pub fn seek_velocity(origin: Vec2, target: Option<Vec2>, speed: f32) -> Vec2 {
    match target {
        Some(position) => (position - origin).normalize_or_zero() * speed,
        None => Vec2::ZERO,
    }
}

/// Pick the seek target for a player at `origin`: in radius, on the mask, not itself, alive.
pub fn find_seek_target(
    spatial: &impl SpatialQuery,
    origin: Vec2,
    radius: f32,
    mask: u32,
    seeker: Entity,
    is_alive: impl Fn(Entity) -> bool,
) -> Option<(Entity, Vec2)> {
    if radius <= 0.0 {
        return None;
    }
    let hits = spatial.overlap_circle(origin, radius, mask);
    nearest_target(
        origin,
        hits.into_iter()
            .filter(|(entity, _)| *entity != seeker && is_alive(*entity)),
    )
}
