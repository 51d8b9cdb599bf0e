use glam::Vec3;
use std::f32::consts::TAU;

/// Static backdrop: random points in a spherical shell, generated once.
#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    stars: Vec<Vec3>,
}

impl StarField {
    pub fn new(count: usize, inner: f32, outer: f32, rng: &mut fastrand::Rng) -> Self {
        let stars = (0..count)
            .map(|_| {
                // Uniform direction: z uniform in [-1, 1], azimuth uniform.
                let z = rng.f32() * 2.0 - 1.0;
                let phi = rng.f32() * TAU;
                let ring = (1.0 - z * z).max(0.0).sqrt();
                let r = inner + rng.f32() * (outer - inner);
                Vec3::new(ring * phi.cos(), z, ring * phi.sin()) * r
            })
            .collect();
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.stars
    }
}
