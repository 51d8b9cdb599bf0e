use crate::params::{ParamsError, SimParams};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "accretion-jet",
    version,
    about = "Audio-reactive accretion disk and jet particle simulation (headless runner)"
)]
pub struct Config {
    #[arg(long, value_enum, default_value_t = SourceMode::Synth)]
    pub source: SourceMode,

    #[arg(long, value_name = "WAV")]
    pub wav: Option<PathBuf>,

    /// `key = value` parameter file applied over the defaults.
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, default_value_t = 10.0)]
    pub seconds: f32,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub disk_particles: Option<usize>,

    #[arg(long)]
    pub jet_particles: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub no_jet: bool,

    /// Seconds between statistics log lines.
    #[arg(long, default_value_t = 1.0)]
    pub stats_interval: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceMode {
    #[value(aliases = ["none", "off"])]
    Silent,
    #[value(alias = "test")]
    Synth,
    #[value(alias = "file")]
    Wav,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fps == 0 {
            anyhow::bail!("--fps must be >= 1");
        }
        if !(self.seconds > 0.0 && self.seconds.is_finite()) {
            anyhow::bail!("--seconds must be a finite number > 0");
        }
        if !(self.stats_interval > 0.0 && self.stats_interval.is_finite()) {
            anyhow::bail!("--stats-interval must be a finite number > 0");
        }
        if self.source == SourceMode::Wav && self.wav.is_none() {
            anyhow::bail!("--source wav requires --wav <PATH>");
        }
        Ok(())
    }

    /// Defaults, then the parameter file, then command-line overrides.
    pub fn sim_params(&self) -> Result<SimParams, ParamsError> {
        let mut params = match &self.params {
            Some(path) => SimParams::load(path)?,
            None => SimParams::default(),
        };
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        if let Some(n) = self.disk_particles {
            params.disk_particle_count = n;
        }
        if let Some(n) = self.jet_particles {
            params.jet_particle_count = n;
        }
        if self.no_jet {
            params.jet_enabled = false;
        }
        Ok(params)
    }
}
