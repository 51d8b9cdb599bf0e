use crate::disk::{DiskShape, Revolution};
use crate::gradient::Color;
use crate::jet::JetTuning;
use crate::sim::SimError;
use std::fmt;
use std::path::Path;

/// Largest accepted `jet_mult`.
pub const MAX_JET_MULT: f32 = 10_000.0;

/// Every recognized simulation option, with the canonical defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SimParams {
    pub disk_start: f32,
    pub disk_range: f32,
    pub disk_thickness: f32,
    pub disk_particle_count: usize,
    pub jet_particle_count: usize,
    pub jet_mult: f32,
    /// Ticks between launch batches.
    pub jetting_interval: u32,
    pub strength: f32,
    pub jet_enabled: bool,
    pub revolution_speed: f32,
    pub revolution_falloff: f32,
    pub revolution_offset: f32,
    pub jet_vertical_velocity: f32,
    pub jet_velocity_scalar: f32,
    pub jet_angular_velocity: f32,
    pub star_count: usize,
    pub star_inner_radius: f32,
    pub star_outer_radius: f32,
    pub color_stops: Vec<Color>,
    pub seed: Option<u64>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            disk_start: 50.0,
            disk_range: 3000.0,
            disk_thickness: 10.0,
            disk_particle_count: 20_000,
            jet_particle_count: 2_000,
            jet_mult: 5.0,
            jetting_interval: 1,
            strength: 60.0,
            jet_enabled: true,
            revolution_speed: 2000.0,
            revolution_falloff: 1.7,
            revolution_offset: 50.0,
            jet_vertical_velocity: 10.0,
            jet_velocity_scalar: 40.0,
            jet_angular_velocity: 0.5,
            star_count: 2_000,
            star_inner_radius: 6_000.0,
            star_outer_radius: 9_000.0,
            color_stops: crate::gradient::ColorGradient::accretion().stops().to_vec(),
            seed: None,
        }
    }
}

impl SimParams {
    pub fn disk_shape(&self) -> DiskShape {
        DiskShape {
            start: self.disk_start,
            range: self.disk_range,
            thickness: self.disk_thickness,
        }
    }

    pub fn revolution(&self) -> Revolution {
        Revolution {
            speed: self.revolution_speed,
            falloff: self.revolution_falloff,
            offset: self.revolution_offset,
        }
    }

    pub fn jet_tuning(&self) -> JetTuning {
        JetTuning {
            mult: self.jet_mult,
            interval: self.jetting_interval,
            enabled: self.jet_enabled,
            vertical_velocity: self.jet_vertical_velocity,
            velocity_scalar: self.jet_velocity_scalar,
            angular_velocity: self.jet_angular_velocity,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.disk_particle_count == 0 {
            return Err(SimError::ZeroDiskParticles);
        }
        if self.jet_particle_count == 0 {
            return Err(SimError::ZeroJetCapacity);
        }
        if self.color_stops.len() < 2 {
            return Err(SimError::TooFewColorStops(self.color_stops.len()));
        }
        for (field, v) in [
            ("disk_start", self.disk_start),
            ("disk_range", self.disk_range),
            ("disk_thickness", self.disk_thickness),
            ("jet_mult", self.jet_mult),
            ("strength", self.strength),
            ("revolution_speed", self.revolution_speed),
            ("revolution_falloff", self.revolution_falloff),
            ("revolution_offset", self.revolution_offset),
            ("jet_vertical_velocity", self.jet_vertical_velocity),
            ("jet_velocity_scalar", self.jet_velocity_scalar),
            ("jet_angular_velocity", self.jet_angular_velocity),
            ("star_inner_radius", self.star_inner_radius),
            ("star_outer_radius", self.star_outer_radius),
        ] {
            if !v.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }
        if self.disk_start < 0.0 {
            return Err(invalid("disk_start", "must be >= 0"));
        }
        if self.disk_range <= 0.0 {
            return Err(invalid("disk_range", "must be > 0"));
        }
        if self.disk_thickness < 0.0 {
            return Err(invalid("disk_thickness", "must be >= 0"));
        }
        if self.revolution_offset <= 0.0 {
            return Err(invalid("revolution_offset", "must be > 0"));
        }
        if !(0.0..=MAX_JET_MULT).contains(&self.jet_mult) {
            return Err(invalid("jet_mult", "must be within 0..=10000"));
        }
        if self.star_inner_radius < 0.0 || self.star_outer_radius < self.star_inner_radius {
            return Err(invalid(
                "star_outer_radius",
                "star radii must satisfy 0 <= inner <= outer",
            ));
        }
        Ok(())
    }

    /// Loads overrides from a `key = value` file on top of the defaults.
    pub fn load(path: &Path) -> Result<Self, ParamsError> {
        let text = std::fs::read_to_string(path).map_err(|e| ParamsError::Io(e.to_string()))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ParamsError> {
        let mut params = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(parse_err(line_no, "expected <key>=<value>"));
            };
            params.apply(key_raw.trim(), value_raw.trim(), line_no)?;
        }
        Ok(params)
    }

    fn apply(&mut self, key: &str, value: &str, line: usize) -> Result<(), ParamsError> {
        match key {
            "disk_start" => self.disk_start = parse_f32(value, line, key)?,
            "disk_range" => self.disk_range = parse_f32(value, line, key)?,
            "disk_thickness" => self.disk_thickness = parse_f32(value, line, key)?,
            "disk_particle_count" => self.disk_particle_count = parse_usize(value, line, key)?,
            "jet_particle_count" => self.jet_particle_count = parse_usize(value, line, key)?,
            "jet_mult" => self.jet_mult = parse_f32(value, line, key)?,
            "jetting_interval" => {
                self.jetting_interval = value
                    .parse::<u32>()
                    .map_err(|_| parse_err(line, &format!("{key} must be a tick count")))?;
            }
            "strength" => self.strength = parse_f32(value, line, key)?,
            "jet_enabled" => {
                self.jet_enabled = parse_bool(value)
                    .ok_or_else(|| parse_err(line, "jet_enabled must be true/false"))?;
            }
            "revolution_speed" => self.revolution_speed = parse_f32(value, line, key)?,
            "revolution_falloff" => self.revolution_falloff = parse_f32(value, line, key)?,
            "revolution_offset" => self.revolution_offset = parse_f32(value, line, key)?,
            "jet_vertical_velocity" => self.jet_vertical_velocity = parse_f32(value, line, key)?,
            "jet_velocity_scalar" => self.jet_velocity_scalar = parse_f32(value, line, key)?,
            "jet_angular_velocity" => self.jet_angular_velocity = parse_f32(value, line, key)?,
            "star_count" => self.star_count = parse_usize(value, line, key)?,
            "star_inner_radius" => self.star_inner_radius = parse_f32(value, line, key)?,
            "star_outer_radius" => self.star_outer_radius = parse_f32(value, line, key)?,
            "color_stops" => {
                let mut stops = Vec::new();
                for part in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let c = Color::from_hex(part)
                        .ok_or_else(|| parse_err(line, &format!("bad color '{part}'")))?;
                    stops.push(c);
                }
                self.color_stops = stops;
            }
            "seed" => {
                self.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| parse_err(line, "seed must be an unsigned integer"))?,
                );
            }
            other => return Err(parse_err(line, &format!("unknown key '{other}'"))),
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: &str) -> SimError {
    SimError::InvalidValue {
        field,
        message: message.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    Io(String),
    Parse { line: usize, message: String },
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
        }
    }
}

impl std::error::Error for ParamsError {}

fn parse_err(line: usize, message: &str) -> ParamsError {
    ParamsError::Parse {
        line,
        message: message.to_string(),
    }
}

fn parse_f32(raw: &str, line: usize, key: &str) -> Result<f32, ParamsError> {
    raw.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| parse_err(line, &format!("{key} must be a finite number")))
}

fn parse_usize(raw: &str, line: usize, key: &str) -> Result<usize, ParamsError> {
    raw.replace('_', "")
        .parse::<usize>()
        .map_err(|_| parse_err(line, &format!("{key} must be a non-negative integer")))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
