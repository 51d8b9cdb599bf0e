use crate::audio::AudioSample;
use crate::disk::{BUCKET_COUNT, DiskField};

/// Drives disk particle heights from per-bucket audio intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketMapper {
    strength: f32,
}

impl BucketMapper {
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength;
    }

    /// Overwrites every bucketed particle's height with
    /// `initial_height + sample[bucket] * strength` and returns the drive level.
    ///
    /// Heights never accumulate across frames, so a silent sample restores the
    /// baseline exactly.
    pub fn apply(&self, disk: &mut DiskField, sample: &AudioSample) -> f32 {
        for bucket in 0..BUCKET_COUNT {
            if disk.buckets().members(bucket).is_empty() {
                continue;
            }
            disk.lift_bucket(bucket, sample.get(bucket) * self.strength);
        }
        sample.drive_level()
    }
}
