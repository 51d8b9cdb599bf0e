use crate::audio::{AudioSample, AudioSource};
use crate::bucket::BucketMapper;
use crate::clock::SimClock;
use crate::disk::DiskField;
use crate::gradient::{ColorGradient, GradientError};
use crate::jet::JetStream;
use crate::params::SimParams;
use crate::starfield::StarField;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    ZeroDiskParticles,
    ZeroJetCapacity,
    TooFewColorStops(usize),
    InvalidValue { field: &'static str, message: String },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDiskParticles => write!(f, "disk particle count must be >= 1"),
            Self::ZeroJetCapacity => write!(f, "jet particle count must be >= 1"),
            Self::TooFewColorStops(n) => {
                write!(f, "color gradient needs at least 2 stops, got {n}")
            }
            Self::InvalidValue { field, message } => write!(f, "invalid value for {field}: {message}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<GradientError> for SimError {
    fn from(err: GradientError) -> Self {
        match err {
            GradientError::TooFewStops(n) => Self::TooFewColorStops(n),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub dt: f32,
    pub drive: f32,
    pub launched: usize,
    pub active_jets: usize,
}

/// Components that `configure` had to rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconfigured {
    pub disk: bool,
    pub jet: bool,
    pub stars: bool,
}

/// The whole per-frame simulation: disk, audio mapping, jets and clock.
pub struct Simulation {
    params: SimParams,
    clock: SimClock,
    disk: DiskField,
    mapper: BucketMapper,
    jet: JetStream,
    stars: StarField,
    audio: Arc<dyn AudioSource>,
    rng: fastrand::Rng,
    last_drive: f32,
}

impl Simulation {
    pub fn new(params: SimParams, audio: Arc<dyn AudioSource>) -> Result<Self, SimError> {
        params.validate()?;
        let mut rng = match params.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let disk = build_disk(&params, &mut rng)?;
        let jet = JetStream::new(params.jet_particle_count, params.jet_tuning(), rng.fork())?;
        let stars = build_stars(&params, &mut rng);

        info!(
            disk = disk.len(),
            buckets = disk.buckets().occupied(),
            jets = jet.capacity(),
            stars = stars.len(),
            "simulation ready"
        );

        Ok(Self {
            mapper: BucketMapper::new(params.strength),
            params,
            clock: SimClock::new(),
            disk,
            jet,
            stars,
            audio,
            rng,
            last_drive: 0.0,
        })
    }

    /// Runs one frame using the host timestamp `now` (seconds) and the most
    /// recently delivered audio sample.
    pub fn tick(&mut self, now: f64) -> TickReport {
        let dt = self.clock.tick(now);
        let sample = self.audio.latest();
        self.step(dt, &sample)
    }

    /// One frame with an explicit step and sample.
    pub fn step(&mut self, dt: f32, sample: &AudioSample) -> TickReport {
        let drive = self.mapper.apply(&mut self.disk, sample);
        self.disk.revolve(dt);
        let launched = self.jet.step(drive, dt);
        self.last_drive = drive;
        TickReport {
            dt,
            drive,
            launched,
            active_jets: self.jet.active_count(),
        }
    }

    /// Applies new options. Live options take effect immediately; particle
    /// counts, disk geometry, colors and star settings rebuild their component.
    ///
    /// Nothing changes if validation fails.
    pub fn configure(&mut self, params: SimParams) -> Result<Reconfigured, SimError> {
        params.validate()?;
        let old = &self.params;
        let mut out = Reconfigured::default();

        if params.seed != old.seed {
            if let Some(seed) = params.seed {
                self.rng.seed(seed);
            }
        }

        let disk_dirty = params.disk_particle_count != old.disk_particle_count
            || params.disk_shape() != old.disk_shape()
            || params.color_stops != old.color_stops;
        let jet_dirty = params.jet_particle_count != old.jet_particle_count;
        let stars_dirty = params.star_count != old.star_count
            || params.star_inner_radius != old.star_inner_radius
            || params.star_outer_radius != old.star_outer_radius;

        if disk_dirty {
            self.disk = build_disk(&params, &mut self.rng)?;
            out.disk = true;
        } else {
            self.disk.set_revolution(params.revolution());
        }

        if jet_dirty {
            self.jet = JetStream::new(params.jet_particle_count, params.jet_tuning(), self.rng.fork())?;
            out.jet = true;
        } else {
            self.jet.set_tuning(params.jet_tuning());
        }

        if stars_dirty {
            self.stars = build_stars(&params, &mut self.rng);
            out.stars = true;
        }

        self.mapper.set_strength(params.strength);
        self.params = params;

        if out != Reconfigured::default() {
            info!(disk = out.disk, jet = out.jet, stars = out.stars, "rebuilt components");
        } else {
            debug!("applied live options");
        }
        Ok(out)
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn disk(&self) -> &DiskField {
        &self.disk
    }

    pub fn jet(&self) -> &JetStream {
        &self.jet
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn last_drive(&self) -> f32 {
        self.last_drive
    }

    pub fn set_jet_enabled(&mut self, on: bool) {
        self.params.jet_enabled = on;
        self.jet.set_enabled(on);
    }
}

fn build_disk(params: &SimParams, rng: &mut fastrand::Rng) -> Result<DiskField, SimError> {
    let gradient = ColorGradient::new(params.color_stops.clone())?;
    DiskField::new(
        params.disk_particle_count,
        params.disk_shape(),
        params.revolution(),
        &gradient,
        rng,
    )
}

fn build_stars(params: &SimParams, rng: &mut fastrand::Rng) -> StarField {
    StarField::new(
        params.star_count,
        params.star_inner_radius,
        params.star_outer_radius,
        rng,
    )
}
