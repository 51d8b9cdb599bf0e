use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Values per delivered spectrum: 64 left-channel bins then 64 right-channel bins.
pub const SPECTRUM_LEN: usize = 128;
pub const CHANNEL_BINS: usize = SPECTRUM_LEN / 2;

/// One frame of audio intensity, indexed low -> high frequency per channel.
///
/// Values are non-negative and finite; they may exceed 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSample {
    values: [f32; SPECTRUM_LEN],
}

impl Default for AudioSample {
    fn default() -> Self {
        Self::silent()
    }
}

impl AudioSample {
    pub const fn silent() -> Self {
        Self {
            values: [0.0; SPECTRUM_LEN],
        }
    }

    /// Short input is zero-padded, extra entries are ignored, and NaN/inf/negative
    /// entries become zero.
    pub fn from_slice(raw: &[f32]) -> Self {
        let mut values = [0.0f32; SPECTRUM_LEN];
        for (dst, &src) in values.iter_mut().zip(raw) {
            *dst = sanitize(src);
        }
        Self { values }
    }

    pub fn get(&self, i: usize) -> f32 {
        self.values.get(i).copied().unwrap_or(0.0)
    }

    pub fn values(&self) -> &[f32; SPECTRUM_LEN] {
        &self.values
    }

    pub fn left(&self) -> &[f32] {
        &self.values[..CHANNEL_BINS]
    }

    pub fn right(&self) -> &[f32] {
        &self.values[CHANNEL_BINS..]
    }

    /// Peak of the lowest-frequency bin of each channel.
    pub fn drive_level(&self) -> f32 {
        self.values[0].max(self.values[CHANNEL_BINS])
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Anything the simulation can poll for the most recently delivered spectrum.
pub trait AudioSource: Send + Sync {
    fn latest(&self) -> AudioSample;
}

/// A source that never delivers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silence;

impl AudioSource for Silence {
    fn latest(&self) -> AudioSample {
        AudioSample::silent()
    }
}

/// Lock-free last-write-wins slot holding the latest spectrum.
///
/// Writers never block; readers retry while a write is in flight (seqlock).
pub struct SpectrumSlot {
    seq: AtomicU64,
    values: [AtomicU32; SPECTRUM_LEN],
    deliveries: AtomicU64,
    updated_ms: AtomicU64,
}

impl Default for SpectrumSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumSlot {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            values: std::array::from_fn(|_| AtomicU32::new(0)),
            deliveries: AtomicU64::new(0),
            updated_ms: AtomicU64::new(0),
        }
    }

    /// Stores a new spectrum, replacing whatever was there.
    pub fn deliver(&self, raw: &[f32]) {
        let sample = AudioSample::from_slice(raw);
        self.seq.fetch_add(1, Ordering::Release); // odd => write in progress
        for (dst, src) in self.values.iter().zip(sample.values) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        self.seq.fetch_add(1, Ordering::Release); // even => stable
        self.deliveries.fetch_add(1, Ordering::Relaxed);
        self.updated_ms.store(now_ms(), Ordering::Relaxed);
    }

    /// Callback suitable for handing to a host audio API.
    pub fn subscriber(self: &Arc<Self>) -> impl Fn(&[f32]) + Send + Sync + 'static {
        let slot = Arc::clone(self);
        move |raw: &[f32]| slot.deliver(raw)
    }

    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    pub fn age_ms(&self) -> f32 {
        let t = self.updated_ms.load(Ordering::Relaxed);
        if t == 0 {
            return 0.0;
        }
        now_ms().saturating_sub(t) as f32
    }

    pub fn load(&self) -> AudioSample {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }

            let mut values = [0.0f32; SPECTRUM_LEN];
            for (dst, src) in values.iter_mut().zip(&self.values) {
                *dst = f32::from_bits(src.load(Ordering::Relaxed));
            }

            let v2 = self.seq.load(Ordering::Acquire);
            if v1 == v2 {
                return AudioSample { values };
            }
        }
    }
}

impl AudioSource for SpectrumSlot {
    fn latest(&self) -> AudioSample {
        self.load()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_millis(0))
        .as_millis() as u64
}
