//! Target acquisition and neighbour search.
//!
//! All functions here are pure over the poses they are handed. The caller
//! decides which poses are visible (the per-tick snapshot) and performs the
//! line-of-sight ray cast against the host; [`line_of_sight_clear`] only
//! interprets its result.

use nero_types::{AgentId, Pose, RayHit, Vec2};

use crate::config::TargetingConfig;
use crate::geometry::{bearing, distance};

/// Pick the best engageable foe for an agent standing at `requester`.
///
/// Foes whose absolute bearing exceeds the cone half-angle are discarded.
/// Among the rest the lowest `distance / cos(radians(bearing * penalty))`
/// wins; the first minimal foe in iteration order keeps the slot.
pub fn select_target<I>(requester: &Pose, foes: I, config: &TargetingConfig) -> Option<AgentId>
where
    I: IntoIterator<Item = (AgentId, Pose)>,
{
    let mut best: Option<(AgentId, f64)> = None;
    for (foe, pose) in foes {
        let fd = distance(requester.position(), pose.position());
        let fh = bearing(requester, pose.position()).abs();
        if fh > config.cone_half_angle {
            continue;
        }
        let cost = fd / (fh * config.angular_penalty).to_radians().cos();
        if best.is_none_or(|(_, current)| cost < current) {
            best = Some((foe, cost));
        }
    }
    best.map(|(foe, _)| foe)
}

/// Closest member of `candidates` to `origin`, skipping `exclude`.
/// Returns the member and its distance.
pub fn nearest<I>(origin: Vec2, exclude: AgentId, candidates: I) -> Option<(AgentId, f64)>
where
    I: IntoIterator<Item = (AgentId, Vec2)>,
{
    let mut best: Option<(AgentId, f64)> = None;
    for (candidate, position) in candidates {
        if candidate == exclude {
            continue;
        }
        let d = distance(origin, position);
        if best.is_none_or(|(_, current)| d < current) {
            best = Some((candidate, d));
        }
    }
    best
}

/// Mean position of `positions`, or `None` for an empty input.
pub fn centroid<I>(positions: I) -> Option<Vec2>
where
    I: IntoIterator<Item = Vec2>,
{
    let mut sum = Vec2::default();
    let mut count = 0.0_f64;
    for position in positions {
        sum.x += position.x;
        sum.y += position.y;
        count += 1.0;
    }
    if count > 0.0 {
        Some(Vec2::new(sum.x / count, sum.y / count))
    } else {
        None
    }
}

/// Interpret a ray cast from the shooter to `target`: the shot lands when
/// nothing was struck or the first thing struck is the target itself.
pub fn line_of_sight_clear(hits: &[RayHit], target: AgentId) -> bool {
    match hits.first() {
        None => true,
        Some(RayHit::Agent(first)) => *first == target,
        Some(RayHit::Object(_)) => false,
    }
}
