use crate::audio::SPECTRUM_LEN;
use crate::gradient::{Color, ColorGradient};
use crate::sim::SimError;
use glam::{Mat3, Vec3};
use std::f32::consts::TAU;

/// One bucket per spectrum value.
pub const BUCKET_COUNT: usize = SPECTRUM_LEN;

/// Radial extent and thickness of the disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskShape {
    pub start: f32,
    pub range: f32,
    pub thickness: f32,
}

impl DiskShape {
    /// Normalized radial position, `0` at the inner edge and `1` at the outer edge.
    pub fn gradient_t(&self, radius: f32) -> f32 {
        ((radius - self.start) / self.range).clamp(0.0, 1.0)
    }

    pub fn bucket_for(&self, radius: f32) -> usize {
        let raw = ((radius - self.start) / self.range * BUCKET_COUNT as f32).floor();
        raw.clamp(0.0, (BUCKET_COUNT - 1) as f32) as usize
    }
}

/// Inverse-power-law angular velocity `speed / (dst - start + offset)^falloff`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Revolution {
    pub speed: f32,
    pub falloff: f32,
    pub offset: f32,
}

impl Revolution {
    pub fn angular_velocity(&self, dst: f32, disk_start: f32) -> f32 {
        self.speed / (dst - disk_start + self.offset).powf(self.falloff)
    }
}

/// Rotates `v` about the vertical axis through the origin. The y component is untouched.
pub fn rotate_about_y(v: Vec3, angle: f32) -> Vec3 {
    // The matrix's y row is (0, 1, 0), so y comes back bit-identical.
    Mat3::from_rotation_y(angle) * v
}

/// Where a particle starts out, in cylindrical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskPlacement {
    pub radius: f32,
    pub theta: f32,
    pub height: f32,
}

impl DiskPlacement {
    pub fn random(rng: &mut fastrand::Rng, shape: &DiskShape) -> Self {
        let theta = rng.f32() * TAU;
        let radius = shape.start + rng.f32() * shape.range;
        let height = (rng.f32() - 0.5) * shape.thickness;
        Self {
            radius,
            theta,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiskParticle {
    pub(crate) position: Vec3,
    color: Color,
    initial_height: f32,
    bucket: usize,
}

impl DiskParticle {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn initial_height(&self) -> f32 {
        self.initial_height
    }

    pub fn bucket(&self) -> usize {
        self.bucket
    }
}

/// Particle indices grouped by radial bucket. Fixed after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketTable {
    buckets: Vec<Vec<usize>>,
}

impl BucketTable {
    fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); BUCKET_COUNT],
        }
    }

    pub fn members(&self, bucket: usize) -> &[usize] {
        self.buckets.get(bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.buckets.iter().enumerate().map(|(i, b)| (i, b.as_slice()))
    }

    pub fn occupied(&self) -> usize {
        self.buckets.iter().filter(|b| !b.is_empty()).count()
    }
}

pub struct DiskField {
    shape: DiskShape,
    revolution: Revolution,
    center: Vec3,
    particles: Vec<DiskParticle>,
    buckets: BucketTable,
}

impl DiskField {
    pub fn new(
        count: usize,
        shape: DiskShape,
        revolution: Revolution,
        gradient: &ColorGradient,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, SimError> {
        let placements = (0..count)
            .map(|_| DiskPlacement::random(rng, &shape))
            .collect::<Vec<_>>();
        Self::from_placements(shape, revolution, gradient, &placements)
    }

    /// Builds the field from explicit placements instead of random ones.
    pub fn from_placements(
        shape: DiskShape,
        revolution: Revolution,
        gradient: &ColorGradient,
        placements: &[DiskPlacement],
    ) -> Result<Self, SimError> {
        if placements.is_empty() {
            return Err(SimError::ZeroDiskParticles);
        }
        if !(shape.range > 0.0) {
            return Err(SimError::InvalidValue {
                field: "disk_range",
                message: "must be > 0".to_string(),
            });
        }

        let mut buckets = BucketTable::new();
        let mut particles = Vec::with_capacity(placements.len());
        for (idx, p) in placements.iter().enumerate() {
            let bucket = shape.bucket_for(p.radius);
            buckets.buckets[bucket].push(idx);
            particles.push(DiskParticle {
                position: Vec3::new(
                    p.radius * p.theta.cos(),
                    p.height,
                    p.radius * p.theta.sin(),
                ),
                color: gradient.color_at(shape.gradient_t(p.radius)),
                initial_height: p.height,
                bucket,
            });
        }

        Ok(Self {
            shape,
            revolution,
            center: Vec3::ZERO,
            particles,
            buckets,
        })
    }

    pub fn shape(&self) -> DiskShape {
        self.shape
    }

    pub fn revolution(&self) -> Revolution {
        self.revolution
    }

    pub fn set_revolution(&mut self, revolution: Revolution) {
        self.revolution = revolution;
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[DiskParticle] {
        &self.particles
    }

    /// Render snapshot: `(position, color)` per particle.
    pub fn points(&self) -> impl Iterator<Item = (Vec3, Color)> + '_ {
        self.particles.iter().map(|p| (p.position, p.color))
    }

    pub fn buckets(&self) -> &BucketTable {
        &self.buckets
    }

    /// Advances every particle's angle around the vertical axis by `ω(dst)·dt`.
    ///
    /// Radius and height are unchanged. Particles whose step angle is not finite
    /// are left where they are.
    pub fn revolve(&mut self, dt: f32) {
        let start = self.shape.start;
        let rev = self.revolution;
        let center = self.center;
        for p in &mut self.particles {
            let rel = p.position - center;
            let angle = rev.angular_velocity(rel.length(), start) * dt;
            if !angle.is_finite() {
                continue;
            }
            p.position = center + rotate_about_y(rel, angle);
        }
    }

    /// Sets every member of `bucket` to `initial_height + lift`.
    pub(crate) fn lift_bucket(&mut self, bucket: usize, lift: f32) {
        let Self {
            particles, buckets, ..
        } = self;
        for &idx in buckets.members(bucket) {
            let p = &mut particles[idx];
            let y = p.initial_height + lift;
            if y.is_finite() {
                p.position.y = y;
            }
        }
    }
}
