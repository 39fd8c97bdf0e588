//! Per-agent episode state machine: `Active` until a cap trips, then `Done`
//! until the next reset.

use nero_types::AgentGroup;
use serde::{Deserialize, Serialize};

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The step count reached the lifetime cap.
    StepBudget,
    /// The trainer no longer holds a live organism for this agent.
    OrganismRecycled,
    /// Accumulated damage reached the hit-point cap.
    DamageCap,
}

impl core::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::StepBudget => "step_budget",
            Self::OrganismRecycled => "organism_recycled",
            Self::DamageCap => "damage_cap",
        };
        f.write_str(label)
    }
}

/// Episode status of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeStatus {
    /// Stepping normally.
    #[default]
    Active,
    /// Ended; stays here until reset.
    Done(TerminationReason),
}

impl EpisodeStatus {
    /// Whether the episode has ended.
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Inputs to one termination check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeProgress {
    /// Unit category. Turrets never terminate.
    pub group: AgentGroup,
    /// Steps taken this episode.
    pub step: u64,
    /// Whether the trainer still holds an organism for the agent.
    pub has_organism: bool,
    /// Damage accumulated this episode.
    pub total_damage: u32,
}

/// Episode caps. A zero disables the corresponding cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeLimits {
    /// Step cap.
    pub lifetime: u64,
    /// Damage cap.
    pub hit_points: u32,
}

/// First cap that `progress` trips, checked in the order step budget,
/// organism liveness, damage.
pub const fn check_termination(
    progress: &EpisodeProgress,
    limits: &EpisodeLimits,
) -> Option<TerminationReason> {
    if progress.group.is_stationary() {
        return None;
    }
    if limits.lifetime != 0 && progress.step >= limits.lifetime {
        return Some(TerminationReason::StepBudget);
    }
    if !progress.has_organism {
        return Some(TerminationReason::OrganismRecycled);
    }
    if limits.hit_points != 0 && progress.total_damage >= limits.hit_points {
        return Some(TerminationReason::DamageCap);
    }
    None
}

/// Advance `status` with the latest check. A `Done` status never returns to
/// `Active` here; only a reset reopens it.
pub const fn advance(status: EpisodeStatus, check: Option<TerminationReason>) -> EpisodeStatus {
    match (status, check) {
        (EpisodeStatus::Done(_), _) | (EpisodeStatus::Active, None) => status,
        (EpisodeStatus::Active, Some(reason)) => EpisodeStatus::Done(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(step: u64, total_damage: u32) -> EpisodeProgress {
        EpisodeProgress {
            group: AgentGroup::Agent,
            step,
            has_organism: true,
            total_damage,
        }
    }

    const LIMITS: EpisodeLimits = EpisodeLimits {
        lifetime: 100,
        hit_points: 5,
    };

    #[test]
    fn active_under_all_caps() {
        assert_eq!(check_termination(&progress(10, 4), &LIMITS), None);
    }

    #[test]
    fn step_budget_trips_at_cap() {
        assert_eq!(check_termination(&progress(99, 0), &LIMITS), None);
        assert_eq!(
            check_termination(&progress(100, 0), &LIMITS),
            Some(TerminationReason::StepBudget)
        );
    }

    #[test]
    fn damage_cap_trips_exactly_on_reaching_total() {
        let mut status = EpisodeStatus::Active;
        for (tick, total) in [1_u32, 2, 3, 4].into_iter().enumerate() {
            status = advance(status, check_termination(&progress(tick as u64, total), &LIMITS));
            assert_eq!(status, EpisodeStatus::Active);
        }
        status = advance(status, check_termination(&progress(4, 5), &LIMITS));
        assert_eq!(status, EpisodeStatus::Done(TerminationReason::DamageCap));
    }

    #[test]
    fn missing_organism_ends_episode() {
        let p = EpisodeProgress {
            has_organism: false,
            ..progress(0, 0)
        };
        assert_eq!(
            check_termination(&p, &LIMITS),
            Some(TerminationReason::OrganismRecycled)
        );
    }

    #[test]
    fn zero_caps_disable_checks() {
        let limits = EpisodeLimits {
            lifetime: 0,
            hit_points: 0,
        };
        assert_eq!(check_termination(&progress(1_000_000, 1_000), &limits), None);
    }

    #[test]
    fn turrets_are_exempt() {
        let p = EpisodeProgress {
            group: AgentGroup::Turret,
            has_organism: false,
            ..progress(1_000, 1_000)
        };
        assert_eq!(check_termination(&p, &LIMITS), None);
    }

    #[test]
    fn done_is_sticky() {
        let done = EpisodeStatus::Done(TerminationReason::StepBudget);
        assert_eq!(advance(done, None), done);
        assert_eq!(advance(done, Some(TerminationReason::DamageCap)), done);
        assert!(done.is_done());
    }
}
