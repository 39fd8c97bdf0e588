//! The environment façade driven by the host's per-agent callbacks.
//!
//! [`NeroEnvironment`] owns the agent state map, the team registry, and the
//! per-tick snapshot. The host calls [`begin_tick`] once per tick and then,
//! for each agent, some of [`get_agent_info`], [`reset`], [`sense`],
//! [`step`], and [`is_episode_over`]. State records are created lazily on
//! the first callback that names an agent.
//!
//! Within [`step`] the order is fixed: first-step initialisation, population
//! growth, animation, reward (targeting, hit, damage drain), then the
//! kinematic update. Rewards therefore see the pose committed on the
//! previous tick.
//!
//! [`begin_tick`]: NeroEnvironment::begin_tick
//! [`get_agent_info`]: NeroEnvironment::get_agent_info
//! [`reset`]: NeroEnvironment::reset
//! [`sense`]: NeroEnvironment::sense
//! [`step`]: NeroEnvironment::step
//! [`is_episode_over`]: NeroEnvironment::is_episode_over

use std::collections::BTreeMap;

use nero_agents::geometry::{bearing, distance};
use nero_agents::{
    AgentState, DAMAGE_PER_HIT, EnvError, EnvProfile, EpisodeProgress, EpisodeStatus,
    FitnessComponents, RewardInputs, TeamRegistry, TerminationReason, advance,
    check_termination, line_of_sight_clear, zero_reward,
};
use nero_types::{
    AgentGroup, AgentHandle, AgentId, AgentInitInfo, AgentView, ENVIRONMENT_SLOTS, FeatureVector,
    MotionAction, ObjectMask,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::host::{ANIMATION_FRAME_SCALE, HostEngine, MENU_SCRIPT, RUN_ANIMATION};
use crate::sensors;
use crate::snapshot::TickSnapshot;
use crate::trainer::Trainer;

/// Object types that can block a shot.
const SHOT_BLOCKERS: ObjectMask = ObjectMask::OBSTACLE
    .union(ObjectMask::TEAM_0)
    .union(ObjectMask::TEAM_1);

/// The simulation-side environment.
pub struct NeroEnvironment<H, T> {
    profile: EnvProfile,
    info: AgentInitInfo,
    host: H,
    trainer: T,
    states: BTreeMap<AgentId, AgentState>,
    teams: TeamRegistry,
    snapshot: TickSnapshot,
    rng: StdRng,
    hits: u64,
}

impl<H: HostEngine, T: Trainer> NeroEnvironment<H, T> {
    /// Build an environment for `profile` and hand the trainer its lifetime.
    pub fn new(profile: EnvProfile, host: H, mut trainer: T, seed: u64) -> Self {
        trainer.set_lifetime(profile.lifetime);
        let info = sensors::agent_init_info(&profile);
        info!(
            lifetime = profile.lifetime,
            hit_points = profile.hit_points,
            observation_len = info.sensors.len(),
            reward_len = info.rewards.len(),
            "Environment created"
        );
        Self {
            profile,
            info,
            host,
            trainer,
            states: BTreeMap::new(),
            teams: TeamRegistry::new(),
            snapshot: TickSnapshot::default(),
            rng: StdRng::seed_from_u64(seed),
            hits: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Tick boundary
    // -----------------------------------------------------------------------

    /// Freeze every agent's committed pose for the coming tick.
    pub fn begin_tick(&mut self, tick: u64) {
        self.snapshot = TickSnapshot::capture(tick, self.states.values());
    }

    // -----------------------------------------------------------------------
    // Callbacks
    // -----------------------------------------------------------------------

    /// Declare the vector shapes for `agent` and attach its sensors.
    pub fn get_agent_info(&mut self, agent: &AgentHandle) -> Result<AgentInitInfo, EnvError> {
        self.ensure_state(agent)?;
        sensors::register_sensors(&mut self.host, &self.profile.sensors, agent);
        debug!(agent_id = %agent.id, team = %agent.team, "Sensors registered");
        Ok(self.info.clone())
    }

    /// Start a new episode for `agent`: zero damage, reopen the episode, and
    /// respawn mobile agents around the spawn point.
    pub fn reset(&mut self, agent: &AgentHandle) -> Result<bool, EnvError> {
        self.ensure_state(agent)?;
        let spawn = self.profile.spawn;
        let jitter = self.profile.spawn_jitter;
        let state = self
            .states
            .get_mut(&agent.id)
            .ok_or(EnvError::UnknownAgent { agent_id: agent.id })?;
        state.reset_episode();
        if agent.group.is_mobile() {
            state.randomize(spawn, jitter, &mut self.rng);
            let pose = state.pose;
            self.host.set_transform(agent.id, pose);
            self.snapshot.place(agent.id, pose);
        }
        debug!(agent_id = %agent.id, "Episode reset");
        Ok(true)
    }

    /// Advance `agent` by one tick and return its reward.
    ///
    /// The action must match the declared action shape; a violation aborts
    /// the step before any state changes.
    pub fn step(&mut self, agent: &AgentHandle, action: &[f64]) -> Result<FeatureVector, EnvError> {
        self.info
            .actions
            .validate(action)
            .map_err(|violation| EnvError::InvalidAction {
                agent_id: agent.id,
                violation,
            })?;
        self.ensure_state(agent)?;

        if agent.step == 0 && agent.group != AgentGroup::Turret {
            self.initialize_pose(agent)?;
            return Ok(zero_reward(&self.profile.fitness_dimensions));
        }

        if self.trainer.ready() && self.trainer.num_to_add() > 0 {
            self.trainer.add_agent();
            debug!(agent_id = %agent.id, "Requested another agent from the trainer");
        }

        let motion = MotionAction::from_vector(action);
        self.animate(agent.id, motion)?;

        let reward = self.calculate_reward(agent.id, motion)?;

        let max_speed = self.profile.max_speed;
        let pose = self.state_mut(agent.id)?.update_pose(motion, max_speed);
        self.host.set_transform(agent.id, pose);
        Ok(reward)
    }

    /// Fill the environment-owned tail of `observations` and return it.
    pub fn sense(
        &mut self,
        agent: &AgentHandle,
        mut observations: FeatureVector,
    ) -> Result<FeatureVector, EnvError> {
        if observations.len() < ENVIRONMENT_SLOTS {
            return Err(EnvError::ObservationTooShort {
                agent_id: agent.id,
                required: ENVIRONMENT_SLOTS,
                actual: observations.len(),
            });
        }
        self.ensure_state(agent)?;

        let has_target = self.target(agent.id).is_some();
        sensors::write_has_target(&mut observations, has_target);

        if !self.teams.has_other_friends(agent.id) {
            return Ok(observations);
        }

        let pose = self.state(agent.id)?.pose;
        if let Some(center) = self.snapshot.team_centroid(agent.id, &self.teams) {
            let fd = distance(pose.position(), center);
            let fh = bearing(&pose, center);
            sensors::write_team_centroid(&mut observations, fd, fh, self.profile.friend_radius);
        }
        Ok(observations)
    }

    /// Whether `agent`'s episode has ended. Once true, stays true until
    /// [`reset`](Self::reset).
    pub fn is_episode_over(&mut self, agent: &AgentHandle) -> Result<bool, EnvError> {
        self.ensure_state(agent)?;
        let has_organism = self.trainer.has_organism(agent.id);
        let limits = self.profile.limits();
        let state = self.state_mut(agent.id)?;
        let was_done = state.status.is_done();
        let progress = EpisodeProgress {
            group: agent.group,
            step: agent.step,
            has_organism,
            total_damage: state.total_damage,
        };
        state.status = advance(state.status, check_termination(&progress, &limits));
        if let (false, EpisodeStatus::Done(reason)) = (was_done, state.status) {
            log_episode_end(agent, reason, state.total_damage);
        }
        Ok(state.status.is_done())
    }

    /// Drop `agent`'s state record and team membership.
    pub fn remove_agent(&mut self, agent: AgentId) -> Result<AgentState, EnvError> {
        let state = self
            .states
            .remove(&agent)
            .ok_or(EnvError::UnknownAgent { agent_id: agent })?;
        self.teams.remove(agent);
        self.snapshot.remove(agent);
        info!(agent_id = %agent, team = %state.team, "Agent removed");
        Ok(state)
    }

    /// Release auxiliary resources.
    pub fn cleanup(&mut self) -> bool {
        self.host.stop_script(MENU_SCRIPT);
        info!(agents = self.states.len(), hits = self.hits, "Environment cleaned up");
        true
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The active environment profile.
    pub const fn profile(&self) -> &EnvProfile {
        &self.profile
    }

    /// Vector shapes declared for every agent.
    pub const fn init_info(&self) -> &AgentInitInfo {
        &self.info
    }

    /// The host engine.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host engine, mutably.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The trainer.
    pub const fn trainer(&self) -> &T {
        &self.trainer
    }

    /// The trainer, mutably.
    pub const fn trainer_mut(&mut self) -> &mut T {
        &mut self.trainer
    }

    /// Team membership.
    pub const fn teams(&self) -> &TeamRegistry {
        &self.teams
    }

    /// State record for `agent`, if one exists.
    pub fn agent(&self, agent: AgentId) -> Option<&AgentState> {
        self.states.get(&agent)
    }

    /// Presentation views of every agent, in id order.
    pub fn views(&self) -> Vec<AgentView> {
        self.states.values().map(AgentState::view).collect()
    }

    /// Confirmed hits since construction.
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Create the state record on first contact and check the team claim on
    /// every later one.
    fn ensure_state(&mut self, agent: &AgentHandle) -> Result<(), EnvError> {
        if let Some(state) = self.states.get(&agent.id) {
            if state.team != agent.team {
                return Err(EnvError::TeamMismatch {
                    agent_id: agent.id,
                    registered: state.team,
                    claimed: agent.team,
                });
            }
            return Ok(());
        }

        let mut state = AgentState::new(agent.id, agent.team, agent.group);
        if let Some(transform) = self.host.transform(agent.id) {
            state.reset_pose(transform.position(), transform.heading);
        }
        self.snapshot.place(agent.id, state.pose);
        self.teams.register(agent.id, agent.team);
        self.states.insert(agent.id, state);
        info!(
            agent_id = %agent.id,
            team = %agent.team,
            group = ?agent.group,
            "Agent state created"
        );
        Ok(())
    }

    fn state(&self, agent: AgentId) -> Result<&AgentState, EnvError> {
        self.states
            .get(&agent)
            .ok_or(EnvError::UnknownAgent { agent_id: agent })
    }

    fn state_mut(&mut self, agent: AgentId) -> Result<&mut AgentState, EnvError> {
        self.states
            .get_mut(&agent)
            .ok_or(EnvError::UnknownAgent { agent_id: agent })
    }

    /// Capture the host spawn transform as the episode start. Mobile agents
    /// also get a random whole-degree heading.
    fn initialize_pose(&mut self, agent: &AgentHandle) -> Result<(), EnvError> {
        let transform = self.host.transform(agent.id).unwrap_or_default();
        let heading = if agent.group.is_mobile() {
            f64::from(self.rng.random_range(0_u16..360))
        } else {
            transform.heading
        };
        let state = self.state_mut(agent.id)?;
        state.reset_pose(transform.position(), heading);
        let pose = state.pose;
        self.host.set_transform(agent.id, pose);
        self.snapshot.place(agent.id, pose);
        Ok(())
    }

    fn animate(&mut self, agent: AgentId, motion: MotionAction) -> Result<(), EnvError> {
        if self.state_mut(agent)?.set_animation(RUN_ANIMATION) {
            self.host.set_animation(agent, RUN_ANIMATION);
        }
        let delay = self.host.frame_delay();
        if delay > 0.0 {
            self.host
                .set_animation_speed(agent, motion.move_by * ANIMATION_FRAME_SCALE / delay);
        }
        Ok(())
    }

    /// Best engageable foe, or none when the agent has no other teammate.
    fn target(&mut self, agent: AgentId) -> Option<AgentId> {
        if !self.teams.has_other_friends(agent) {
            return None;
        }
        self.snapshot
            .target(agent, &self.teams, &self.profile.targeting)
    }

    /// Fire at the current target if the line of fire is clear. Returns
    /// whether the shot landed.
    fn engage(&mut self, agent: AgentId) -> bool {
        let Some(target) = self.target(agent) else {
            return false;
        };
        let (Some(from), Some(to)) = (self.snapshot.pose(agent), self.snapshot.pose(target))
        else {
            return false;
        };
        let hits = self
            .host
            .ray_cast(from.position(), to.position(), SHOT_BLOCKERS);
        if !line_of_sight_clear(&hits, target) {
            return false;
        }
        let Some(victim) = self.states.get_mut(&target) else {
            return false;
        };
        victim.take_hit(DAMAGE_PER_HIT);
        self.hits = self.hits.saturating_add(1);
        debug!(agent_id = %agent, target = %target, "Hit");
        true
    }

    fn calculate_reward(
        &mut self,
        agent: AgentId,
        motion: MotionAction,
    ) -> Result<FeatureVector, EnvError> {
        if !self.teams.has_other_friends(agent) {
            return Ok(zero_reward(&self.profile.fitness_dimensions));
        }

        let hit = self.engage(agent);
        let nearest_friend = self
            .snapshot
            .nearest_friend(agent, &self.teams)
            .map(|(_, d)| d);
        let nearest_foe = self
            .snapshot
            .nearest_foe(agent, &self.teams)
            .map(|(_, d)| d);
        let flag = self.profile.flag;

        let state = self.state_mut(agent)?;
        let flag_distance = distance(state.pose.position(), flag);
        let damage = state.update_damage();

        let components = FitnessComponents::compute(&RewardInputs {
            action: motion,
            nearest_friend,
            nearest_foe,
            flag_distance,
            hit,
            damage,
        });
        Ok(components.pack(&self.profile.fitness_dimensions))
    }
}

fn log_episode_end(agent: &AgentHandle, reason: TerminationReason, total_damage: u32) {
    info!(
        agent_id = %agent.id,
        team = %agent.team,
        step = agent.step,
        total_damage,
        %reason,
        "Episode over"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nero_types::{FitnessDimension, Pose, TeamId};

    use super::*;
    use crate::test_support::{RecordingHost, ScriptedTrainer};

    const EPS: f64 = 1e-9;

    type Env = NeroEnvironment<RecordingHost, ScriptedTrainer>;

    fn env_with(profile: EnvProfile) -> Env {
        NeroEnvironment::new(profile, RecordingHost::default(), ScriptedTrainer::default(), 7)
    }

    /// Place an agent on the host and return a handle past its first step.
    fn place(env: &mut Env, raw: u32, team: TeamId, pose: Pose) -> AgentHandle {
        let id = AgentId::new(raw);
        env.host_mut().set_transform(id, pose);
        let mut handle = AgentHandle::new(id, team, AgentGroup::Agent);
        handle.step = 1;
        env.get_agent_info(&handle).unwrap();
        handle
    }

    fn slot(reward: &[f64], dimension: FitnessDimension) -> f64 {
        let index = FitnessDimension::DEFAULT_LAYOUT
            .iter()
            .position(|d| *d == dimension)
            .unwrap();
        *reward.get(index).unwrap()
    }

    #[test]
    fn lifetime_handed_to_trainer() {
        let env = env_with(EnvProfile {
            lifetime: 77,
            ..EnvProfile::default()
        });
        assert_eq!(env.trainer().lifetime, 77);
    }

    #[test]
    fn invalid_action_aborts_before_state_changes() {
        let mut env = env_with(EnvProfile::default());
        let handle = AgentHandle::new(AgentId::new(1), TeamId::Zero, AgentGroup::Agent);
        assert!(matches!(
            env.step(&handle, &[0.0]),
            Err(EnvError::InvalidAction { .. })
        ));
        assert!(matches!(
            env.step(&handle, &[2.0, 0.0]),
            Err(EnvError::InvalidAction { .. })
        ));
        assert!(env.agent(handle.id).is_none());
    }

    #[test]
    fn first_step_captures_spawn_transform() {
        let mut env = env_with(EnvProfile::default());
        let id = AgentId::new(1);
        env.host_mut().set_transform(id, Pose::new(12.0, 34.0, 0.0));
        let handle = AgentHandle::new(id, TeamId::Zero, AgentGroup::Agent);

        let reward = env.step(&handle, &[1.0, 0.1]).unwrap();
        assert_eq!(reward.len(), 6);
        assert!(reward.iter().all(|v| v.abs() < EPS));

        let state = env.agent(id).unwrap();
        assert!((state.pose.x - 12.0).abs() < EPS);
        assert!((state.pose.y - 34.0).abs() < EPS);
        assert!(state.pose.heading >= 0.0 && state.pose.heading < 360.0);
        assert!((state.pose.heading - state.pose.heading.round()).abs() < EPS);
        assert_eq!(state.pose, state.prev_pose);
        assert_eq!(env.host().transforms.get(&id), Some(&state.pose));
    }

    #[test]
    fn aligned_foe_is_hit_and_damage_drains_on_its_step() {
        let mut env = env_with(EnvProfile::default());
        let shooter = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let _friend = place(&mut env, 2, TeamId::Zero, Pose::new(0.0, 3.0, 0.0));
        let f = place(&mut env, 3, TeamId::One, Pose::new(10.0, 0.0, 0.0));
        let g = place(&mut env, 4, TeamId::One, Pose::new(10.0, 1.0, 0.0));
        let _f_friend = place(&mut env, 5, TeamId::One, Pose::new(50.0, 50.0, 0.0));
        env.begin_tick(1);

        let reward = env.step(&shooter, &[0.0, 0.0]).unwrap();
        assert!((slot(&reward, FitnessDimension::HitTarget) - 1.0).abs() < EPS);
        assert!((slot(&reward, FitnessDimension::StickTogether) + 9.0).abs() < EPS);
        assert!((slot(&reward, FitnessDimension::ApproachEnemy) + 100.0).abs() < EPS);
        assert_eq!(env.agent(f.id).unwrap().curr_damage, 1);
        assert_eq!(env.agent(g.id).unwrap().curr_damage, 0);
        assert_eq!(env.hits(), 1);

        let reward = env.step(&f, &[0.0, 0.0]).unwrap();
        assert!((slot(&reward, FitnessDimension::AvoidFire) + 1.0).abs() < EPS);
        let target = env.agent(f.id).unwrap();
        assert_eq!(target.curr_damage, 0);
        assert_eq!(target.total_damage, 1);
    }

    #[test]
    fn lone_agent_gets_zero_reward_and_no_target() {
        let mut env = env_with(EnvProfile::default());
        let shooter = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let foe = place(&mut env, 2, TeamId::One, Pose::new(10.0, 0.0, 0.0));
        env.begin_tick(1);

        let reward = env.step(&shooter, &[1.0, 0.0]).unwrap();
        assert!(reward.iter().all(|v| v.abs() < EPS));
        assert_eq!(env.agent(foe.id).unwrap().curr_damage, 0);

        let obs = env.sense(&shooter, vec![0.0; 18]).unwrap();
        assert!(obs.last().is_some_and(|v| v.abs() < EPS));
    }

    #[test]
    fn blocked_line_of_fire_prevents_hit() {
        let mut env = env_with(EnvProfile::default());
        env.host_mut().blocked = true;
        let shooter = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let _friend = place(&mut env, 2, TeamId::Zero, Pose::new(0.0, 3.0, 0.0));
        let foe = place(&mut env, 3, TeamId::One, Pose::new(10.0, 0.0, 0.0));
        env.begin_tick(1);

        let reward = env.step(&shooter, &[0.0, 0.0]).unwrap();
        assert!(slot(&reward, FitnessDimension::HitTarget).abs() < EPS);
        assert_eq!(env.agent(foe.id).unwrap().curr_damage, 0);
        // The target is still reported to the sensors.
        let obs = env.sense(&shooter, vec![0.0; 18]).unwrap();
        assert!(obs.last().is_some_and(|v| (v - 1.0).abs() < EPS));
    }

    #[test]
    fn step_moves_after_reward_and_pushes_transform() {
        let mut env = env_with(EnvProfile {
            max_speed: 2.0,
            ..EnvProfile::default()
        });
        let a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let _b = place(&mut env, 2, TeamId::Zero, Pose::new(0.0, 1.0, 0.0));
        env.begin_tick(1);

        let reward = env.step(&a, &[1.0, 0.0]).unwrap();
        // Reward uses the pose before the move.
        assert!((slot(&reward, FitnessDimension::StickTogether) + 1.0).abs() < EPS);
        assert!((slot(&reward, FitnessDimension::StandGround) + 1.0).abs() < EPS);
        let pose = env.agent(a.id).unwrap().pose;
        assert!((pose.x - 2.0).abs() < EPS);
        assert_eq!(env.host().transforms.get(&a.id), Some(&pose));
        assert_eq!(
            env.host().animations.get(&a.id).map(Vec::len),
            Some(1),
            "animation set once"
        );
        let _ = env.step(&a, &[1.0, 0.0]).unwrap();
        assert_eq!(env.host().animations.get(&a.id).map(Vec::len), Some(1));
    }

    #[test]
    fn animation_speed_follows_frame_delay() {
        let mut env = env_with(EnvProfile::default());
        env.host_mut().frame_delay = 0.5;
        let a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let _ = env.step(&a, &[0.5, 0.0]).unwrap();
        let speed = env.host().animation_speeds.get(&a.id).copied().unwrap();
        assert!((speed - 28.0).abs() < EPS);
    }

    #[test]
    fn damage_cap_ends_episode_on_reaching_total() {
        let mut env = env_with(EnvProfile {
            hit_points: 5,
            lifetime: 0,
            ..EnvProfile::default()
        });
        let victim = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let _buddy = place(&mut env, 2, TeamId::Zero, Pose::new(0.0, 5.0, 0.0));

        for round in 1..=5_u32 {
            env.begin_tick(u64::from(round));
            if let Some(state) = env.states.get_mut(&victim.id) {
                state.take_hit(1);
            }
            assert!(!env.is_episode_over(&victim).unwrap());
            let _ = env.step(&victim, &[0.0, 0.0]).unwrap();
            let total = env.agent(victim.id).unwrap().total_damage;
            assert_eq!(total, round);
            assert_eq!(env.is_episode_over(&victim).unwrap(), round == 5);
        }
    }

    #[test]
    fn episode_over_is_sticky_until_reset() {
        let mut env = env_with(EnvProfile::default());
        let mut a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        env.trainer_mut().recycled.push(a.id);
        assert!(env.is_episode_over(&a).unwrap());

        // The trainer reissues, but the episode stays over until reset.
        env.trainer_mut().recycled.clear();
        assert!(env.is_episode_over(&a).unwrap());

        assert!(env.reset(&a).unwrap());
        a.step = 0;
        assert!(!env.is_episode_over(&a).unwrap());
    }

    #[test]
    fn step_budget_ends_episode() {
        let mut env = env_with(EnvProfile {
            lifetime: 3,
            ..EnvProfile::default()
        });
        let mut a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        a.step = 2;
        assert!(!env.is_episode_over(&a).unwrap());
        a.step = 3;
        assert!(env.is_episode_over(&a).unwrap());
    }

    #[test]
    fn turrets_never_finish() {
        let mut env = env_with(EnvProfile {
            lifetime: 1,
            hit_points: 1,
            ..EnvProfile::default()
        });
        let mut turret = AgentHandle::new(AgentId::new(1), TeamId::One, AgentGroup::Turret);
        turret.step = 100;
        env.trainer_mut().recycled.push(turret.id);
        assert!(!env.is_episode_over(&turret).unwrap());
    }

    #[test]
    fn reset_zeroes_damage_and_respawns_near_spawn() {
        let profile = EnvProfile::default();
        let spawn = profile.spawn;
        let mut env = env_with(profile);
        let a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 45.0));
        if let Some(state) = env.states.get_mut(&a.id) {
            state.take_hit(3);
            let _ = state.update_damage();
            state.take_hit(1);
        }

        assert!(env.reset(&a).unwrap());
        let state = env.agent(a.id).unwrap();
        assert_eq!(state.total_damage, 0);
        assert_eq!(state.curr_damage, 0);
        assert!((state.pose.x - spawn.x).abs() <= 20.0);
        assert!((state.pose.y - spawn.y).abs() <= 20.0);
        assert!((state.pose.heading - 45.0).abs() < EPS);
        assert_eq!(env.host().transforms.get(&a.id), Some(&state.pose));
    }

    #[test]
    fn sense_fills_centroid_when_close() {
        let mut env = env_with(EnvProfile::default());
        let a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let _b = place(&mut env, 2, TeamId::Zero, Pose::new(10.0, 0.0, 0.0));
        env.begin_tick(1);

        let obs = env.sense(&a, vec![0.0; 18]).unwrap();
        // Centroid (5, 0): distance 5 of 15, straight ahead.
        assert!(obs.get(15).is_some_and(|v| (v - 5.0 / 15.0).abs() < EPS));
        assert!(obs.get(16).is_some_and(|v| (v - 0.5).abs() < EPS));
        assert!(obs.get(17).is_some_and(|v| v.abs() < EPS));
    }

    #[test]
    fn sense_leaves_centroid_slots_when_far() {
        let mut env = env_with(EnvProfile::default());
        let a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let _b = place(&mut env, 2, TeamId::Zero, Pose::new(100.0, 0.0, 0.0));
        env.begin_tick(1);

        let obs = env.sense(&a, vec![0.7; 18]).unwrap();
        assert!(obs.get(15).is_some_and(|v| (v - 0.7).abs() < EPS));
        assert!(obs.get(16).is_some_and(|v| (v - 0.7).abs() < EPS));
    }

    #[test]
    fn sense_rejects_short_buffer() {
        let mut env = env_with(EnvProfile::default());
        let a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        assert!(matches!(
            env.sense(&a, vec![0.0; 2]),
            Err(EnvError::ObservationTooShort { required: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn agent_info_registers_mirrored_sensors() {
        let mut env = env_with(EnvProfile::default());
        let a = place(&mut env, 1, TeamId::One, Pose::new(0.0, 0.0, 0.0));
        let specs = env.host().sensors.get(&a.id).unwrap();
        assert_eq!(specs.len(), 15);
        assert!(specs.last().is_some_and(|s| s.mask() == ObjectMask::TEAM_0));
    }

    #[test]
    fn team_claim_must_not_change() {
        let mut env = env_with(EnvProfile::default());
        let a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        let turncoat = AgentHandle { team: TeamId::One, ..a };
        assert!(matches!(
            env.step(&turncoat, &[0.0, 0.0]),
            Err(EnvError::TeamMismatch { .. })
        ));
    }

    #[test]
    fn trainer_asked_for_more_agents_on_later_steps() {
        let mut env = env_with(EnvProfile::default());
        env.trainer_mut().wanted = 1;
        let id = AgentId::new(1);
        let mut a = AgentHandle::new(id, TeamId::Zero, AgentGroup::Agent);
        let _ = env.step(&a, &[0.0, 0.0]).unwrap();
        assert_eq!(env.trainer().added, 0, "first step only initialises");
        a.step = 1;
        let _ = env.step(&a, &[0.0, 0.0]).unwrap();
        let _ = env.step(&a, &[0.0, 0.0]).unwrap();
        assert_eq!(env.trainer().added, 1);
    }

    #[test]
    fn remove_agent_forgets_state_and_team() {
        let mut env = env_with(EnvProfile::default());
        let a = place(&mut env, 1, TeamId::Zero, Pose::new(0.0, 0.0, 0.0));
        assert!(env.remove_agent(a.id).is_ok());
        assert!(env.agent(a.id).is_none());
        assert_eq!(env.teams().team_of(a.id), None);
        assert!(matches!(
            env.remove_agent(a.id),
            Err(EnvError::UnknownAgent { .. })
        ));
    }

    #[test]
    fn cleanup_stops_menu_script() {
        let mut env = env_with(EnvProfile::default());
        assert!(env.cleanup());
        assert_eq!(env.host().stopped_scripts, vec![String::from("menu")]);
    }
}
