use crate::audio::AudioSource;
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, SourceMode};
use crate::feed::{AudioFeed, FeedSource};
use crate::sim::Simulation;
use crate::wav;
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber, honoring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    cfg.validate()?;
    let params = cfg.sim_params().context("load simulation parameters")?;

    let source = match cfg.source {
        SourceMode::Silent => FeedSource::Silent,
        SourceMode::Synth => FeedSource::Synth,
        SourceMode::Wav => {
            let path = cfg.wav.as_deref().context("--source wav requires --wav <PATH>")?;
            let clip = wav::read(path).with_context(|| format!("read wav {}", path.display()))?;
            info!(
                path = %path.display(),
                sample_rate_hz = clip.sample_rate_hz,
                seconds = clip.duration_s(),
                "loaded wav"
            );
            FeedSource::Wav(clip)
        }
    };

    let feed = AudioFeed::start(source)
        .with_context(|| format!("start audio feed (source={:?})", cfg.source))?;
    let slot = feed.slot();
    let audio: Arc<dyn AudioSource> = slot.clone();

    let mut sim = Simulation::new(params, audio).context("build simulation")?;
    let clock = SystemClock::new();

    let run_for = Duration::try_from_secs_f32(cfg.seconds).context("--seconds out of range")?;
    let frame_target = Duration::from_secs_f32(1.0 / cfg.fps as f32);
    let stats_every =
        Duration::try_from_secs_f32(cfg.stats_interval).context("--stats-interval out of range")?;

    let start = Instant::now();
    let mut fps = FpsCounter::new();
    let mut window = StatsWindow::default();
    let mut last_stats = start;
    let mut frames = 0u64;

    while start.elapsed() < run_for {
        let frame_start = Instant::now();
        let report = sim.tick(clock.now());
        frames += 1;
        fps.tick();
        window.push(report.drive, report.launched, frame_start.elapsed());

        if last_stats.elapsed() >= stats_every {
            last_stats = Instant::now();
            info!(
                fps = format_args!("{:.1}", fps.fps()),
                drive_peak = format_args!("{:.3}", window.drive_peak),
                launched = window.launched,
                active_jets = report.active_jets,
                tick_ms = format_args!("{:.3}", window.mean_tick_ms()),
                audio_age_ms = slot.age_ms(),
                "frame stats"
            );
            window = StatsWindow::default();
        }

        // Frame pacing.
        let elapsed = frame_start.elapsed();
        if elapsed < frame_target {
            std::thread::sleep(frame_target - elapsed);
        }
    }

    info!(
        frames,
        seconds = format_args!("{:.2}", sim.clock().elapsed()),
        jets_launched = sim.jet().launched_total(),
        spectra = slot.deliveries(),
        "run finished"
    );
    drop(feed);
    Ok(())
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

#[derive(Default)]
struct StatsWindow {
    drive_peak: f32,
    launched: usize,
    ticks: u32,
    tick_time: Duration,
}

impl StatsWindow {
    fn push(&mut self, drive: f32, launched: usize, tick_time: Duration) {
        self.drive_peak = self.drive_peak.max(drive);
        self.launched += launched;
        self.ticks += 1;
        self.tick_time += tick_time;
    }

    fn mean_tick_ms(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        self.tick_time.as_secs_f64() * 1000.0 / self.ticks as f64
    }
}
