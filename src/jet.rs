use crate::disk::rotate_about_y;
use crate::sim::SimError;
use glam::Vec3;
use std::f32::consts::TAU;

/// Which lobe the next launched particle heads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JetDirection {
    North,
    South,
}

impl JetDirection {
    pub fn sign(self) -> f32 {
        match self {
            Self::North => 1.0,
            Self::South => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetTuning {
    pub mult: f32,
    /// Ticks between launch batches.
    pub interval: u32,
    pub enabled: bool,
    pub vertical_velocity: f32,
    pub velocity_scalar: f32,
    /// Co-rotation rate in rad/s.
    pub angular_velocity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetParticle {
    position: Vec3,
    velocity: Vec3,
    active: bool,
}

impl JetParticle {
    const DORMANT: Self = Self {
        position: Vec3::ZERO,
        velocity: Vec3::ZERO,
        active: false,
    };

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Fixed pool of jet particles launched round-robin.
///
/// Nothing is allocated after construction: once every slot has flown, each
/// launch recycles the oldest slot.
pub struct JetStream {
    particles: Vec<JetParticle>,
    next: usize,
    cooldown: u32,
    direction: JetDirection,
    tuning: JetTuning,
    rng: fastrand::Rng,
    launched: u64,
}

impl JetStream {
    pub fn new(capacity: usize, tuning: JetTuning, rng: fastrand::Rng) -> Result<Self, SimError> {
        if capacity == 0 {
            return Err(SimError::ZeroJetCapacity);
        }
        Ok(Self {
            particles: vec![JetParticle::DORMANT; capacity],
            next: 0,
            cooldown: 0,
            direction: JetDirection::North,
            tuning,
            rng,
            launched: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn direction(&self) -> JetDirection {
        self.direction
    }

    pub fn tuning(&self) -> JetTuning {
        self.tuning
    }

    pub fn set_tuning(&mut self, tuning: JetTuning) {
        self.tuning = tuning;
    }

    pub fn set_enabled(&mut self, on: bool) {
        self.tuning.enabled = on;
    }

    pub fn launched_total(&self) -> u64 {
        self.launched
    }

    pub fn particles(&self) -> &[JetParticle] {
        &self.particles
    }

    /// Render snapshot: `(position, active)` per slot.
    pub fn points(&self) -> impl Iterator<Item = (Vec3, bool)> + '_ {
        self.particles.iter().map(|p| (p.position, p.active))
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    /// `floor(mult * min(1, drive) + 1)`, between one and the pool capacity.
    pub fn launch_count(&self, drive: f32) -> usize {
        let drive = if drive.is_finite() { drive.clamp(0.0, 1.0) } else { 0.0 };
        let raw = (self.tuning.mult * drive + 1.0).floor();
        let cap = self.particles.len();
        if !(raw < cap as f32) {
            return cap;
        }
        (raw.max(1.0) as usize).min(cap)
    }

    /// Launches up to `count` particles from the cursor onward, never more than
    /// the pool holds, and returns how many were launched. The slots used are
    /// `next_index()` before the call onward, wrapping at capacity.
    pub fn launch(&mut self, count: usize) -> usize {
        let count = count.min(self.particles.len());
        for _ in 0..count {
            let idx = self.next;
            let velocity = self.launch_velocity();
            let p = &mut self.particles[idx];
            if p.active {
                // Recycled: restart from the core.
                p.position = Vec3::ZERO;
            }
            p.active = true;
            p.velocity = velocity;
            self.next = (self.next + 1) % self.particles.len();
            self.launched += 1;
        }
        count
    }

    fn launch_velocity(&mut self) -> Vec3 {
        let radius = self.rng.f32();
        let theta = self.rng.f32() * TAU;
        let dir = self.direction;
        self.direction = dir.flipped();
        let s = self.tuning.velocity_scalar;
        Vec3::new(
            radius * theta.cos() * s,
            self.tuning.vertical_velocity * dir.sign() * s,
            radius * theta.sin() * s,
        )
    }

    /// One frame: cooldown, optional launch batch, then integration of every
    /// active particle. Returns how many particles were launched.
    pub fn step(&mut self, drive: f32, dt: f32) -> usize {
        let count = self.launch_count(drive);
        self.cooldown = self.cooldown.saturating_sub(1);
        let mut launched = 0;
        if self.tuning.enabled && self.cooldown == 0 {
            launched = self.launch(count);
            self.cooldown = self.tuning.interval;
        }
        self.integrate(dt);
        launched
    }

    /// Co-rotates position and velocity about the vertical axis, then advances
    /// position along velocity.
    pub fn integrate(&mut self, dt: f32) {
        let angle = self.tuning.angular_velocity * dt;
        if !angle.is_finite() || !dt.is_finite() {
            return;
        }
        for p in self.particles.iter_mut().filter(|p| p.active) {
            let velocity = rotate_about_y(p.velocity, angle);
            let position = rotate_about_y(p.position, angle) + velocity * dt;
            if position.is_finite() && velocity.is_finite() {
                p.position = position;
                p.velocity = velocity;
            }
        }
    }
}
