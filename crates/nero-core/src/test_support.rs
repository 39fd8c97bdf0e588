//! In-memory host used by unit tests.

use std::collections::BTreeMap;

use nero_types::{AgentGroup, AgentId, ObjectId, ObjectMask, Pose, RayHit, SensorSpec, TeamId, Vec2};

use crate::host::HostEngine;

/// Host that records every push and answers ray casts with a fixed wall
/// when `blocked` is set.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub transforms: BTreeMap<AgentId, Pose>,
    pub sensors: BTreeMap<AgentId, Vec<SensorSpec>>,
    pub animations: BTreeMap<AgentId, Vec<String>>,
    pub animation_speeds: BTreeMap<AgentId, f64>,
    pub stopped_scripts: Vec<String>,
    pub despawned: Vec<AgentId>,
    pub frame_delay: f64,
    pub blocked: bool,
    pub next_id: u32,
}

impl HostEngine for RecordingHost {
    fn ray_cast(&self, _from: Vec2, _to: Vec2, mask: ObjectMask) -> Vec<RayHit> {
        if self.blocked && mask.intersects(ObjectMask::OBSTACLE) {
            vec![RayHit::Object(ObjectId::new(0))]
        } else {
            Vec::new()
        }
    }

    fn transform(&self, agent: AgentId) -> Option<Pose> {
        self.transforms.get(&agent).copied()
    }

    fn set_transform(&mut self, agent: AgentId, pose: Pose) {
        self.transforms.insert(agent, pose);
    }

    fn set_animation(&mut self, agent: AgentId, animation: &str) {
        self.animations
            .entry(agent)
            .or_default()
            .push(animation.to_owned());
    }

    fn set_animation_speed(&mut self, agent: AgentId, speed: f64) {
        self.animation_speeds.insert(agent, speed);
    }

    fn frame_delay(&self) -> f64 {
        self.frame_delay
    }

    fn add_sensor(&mut self, agent: AgentId, sensor: SensorSpec) {
        self.sensors.entry(agent).or_default().push(sensor);
    }

    fn sense_channels(&self, _agent: AgentId, _observations: &mut [f64]) {}

    fn spawn_agent(&mut self, _team: TeamId, _group: AgentGroup, pose: Pose) -> AgentId {
        self.next_id = self.next_id.saturating_add(1);
        let id = AgentId::new(self.next_id);
        self.transforms.insert(id, pose);
        id
    }

    fn despawn_agent(&mut self, agent: AgentId) {
        self.transforms.remove(&agent);
        self.despawned.push(agent);
    }

    fn stop_script(&mut self, script: &str) {
        self.stopped_scripts.push(script.to_owned());
    }
}

/// Trainer whose answers are set directly by the test.
#[derive(Debug, Default)]
pub struct ScriptedTrainer {
    pub lifetime: u64,
    pub wanted: usize,
    pub added: usize,
    pub pending: usize,
    pub recycled: Vec<AgentId>,
    pub issued: Vec<AgentId>,
    pub reports: Vec<(AgentId, Vec<f64>)>,
}

impl crate::trainer::Trainer for ScriptedTrainer {
    fn set_lifetime(&mut self, lifetime: u64) {
        self.lifetime = lifetime;
    }

    fn ready(&self) -> bool {
        true
    }

    fn has_organism(&self, agent: AgentId) -> bool {
        !self.recycled.contains(&agent)
    }

    fn num_to_add(&self) -> usize {
        self.wanted.saturating_sub(self.added)
    }

    fn add_agent(&mut self) {
        self.added = self.added.saturating_add(1);
        self.pending = self.pending.saturating_add(1);
    }

    fn take_spawn_requests(&mut self) -> usize {
        std::mem::take(&mut self.pending)
    }

    fn next_organism(&mut self, agent: AgentId) {
        self.recycled.retain(|id| *id != agent);
        self.issued.push(agent);
    }

    fn report_fitness(&mut self, agent: AgentId, fitness: &[f64]) {
        self.reports.push((agent, fitness.to_vec()));
    }
}
