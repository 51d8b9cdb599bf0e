use crate::analyzer::{HOP, SpectrumAnalyzer, WINDOW};
use crate::audio::SpectrumSlot;
use crate::wav::WavClip;
use anyhow::Context;
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const SYNTH_RATE_HZ: u32 = 48_000;
const CHUNK_MS: u64 = 10;

type Signal = Box<dyn FnMut() -> [f32; 2] + Send>;

/// Where PCM comes from.
pub enum FeedSource {
    /// Nothing is ever delivered; the simulation sees all-zero samples.
    Silent,
    /// Procedural test signal.
    Synth,
    /// Looped file playback.
    Wav(WavClip),
}

/// Host-side audio collaborator: a paced PCM producer feeding an analyzer
/// thread through a lock-free queue, publishing spectra into a [`SpectrumSlot`].
pub struct AudioFeed {
    stop: Arc<AtomicBool>,
    threads: Vec<thread::JoinHandle<()>>,
    slot: Arc<SpectrumSlot>,
    dropped: Arc<AtomicU64>,
    pub sample_rate_hz: u32,
}

impl AudioFeed {
    pub fn start(source: FeedSource) -> anyhow::Result<Self> {
        let slot = Arc::new(SpectrumSlot::new());
        let stop = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicU64::new(0));

        let (label, sample_rate_hz, mut signal): (&str, u32, Signal) = match source {
            FeedSource::Silent => {
                info!("audio feed: silent");
                return Ok(Self {
                    stop,
                    threads: Vec::new(),
                    slot,
                    dropped,
                    sample_rate_hz: 0,
                });
            }
            FeedSource::Synth => {
                let mut synth = SynthSignal::new(SYNTH_RATE_HZ);
                let signal: Signal = Box::new(move || synth.next_frame());
                ("synth", SYNTH_RATE_HZ, signal)
            }
            FeedSource::Wav(clip) => {
                if clip.frames.is_empty() || clip.sample_rate_hz == 0 {
                    anyhow::bail!("wav had no samples");
                }
                let sr = clip.sample_rate_hz;
                let mut pos = 0usize;
                let frames = clip.frames;
                let signal: Signal = Box::new(move || {
                    let f = frames[pos];
                    pos = (pos + 1) % frames.len();
                    f
                });
                ("wav", sr, signal)
            }
        };

        let rb_capacity = (sample_rate_hz as usize).saturating_mul(2);
        let rb = HeapRb::<[f32; 2]>::new(rb_capacity);
        let (mut prod, mut cons) = rb.split();

        let producer = {
            let stop = Arc::clone(&stop);
            let dropped = Arc::clone(&dropped);
            thread::Builder::new()
                .name("audio-feed".to_string())
                .spawn(move || {
                    let chunk = (sample_rate_hz as u64 * CHUNK_MS / 1000).max(1) as usize;
                    let mut deadline = Instant::now();
                    while !stop.load(Ordering::Relaxed) {
                        let mut lost = 0u64;
                        for _ in 0..chunk {
                            if prod.try_push(signal()).is_err() {
                                lost += 1;
                            }
                        }
                        if lost > 0 {
                            dropped.fetch_add(lost, Ordering::Relaxed);
                        }
                        deadline += Duration::from_millis(CHUNK_MS);
                        let now = Instant::now();
                        if deadline > now {
                            thread::sleep(deadline - now);
                        } else {
                            deadline = now;
                        }
                    }
                })
                .context("spawn audio feed thread")?
        };

        let analyzer = {
            let stop = Arc::clone(&stop);
            let slot = Arc::clone(&slot);
            thread::Builder::new()
                .name("audio-analyzer".to_string())
                .spawn(move || analyze_loop(&mut cons, sample_rate_hz, &stop, &slot))
                .context("spawn audio analyzer thread")?
        };

        info!(source = label, sample_rate_hz, "audio feed started");
        Ok(Self {
            stop,
            threads: vec![producer, analyzer],
            slot,
            dropped,
            sample_rate_hz,
        })
    }

    pub fn slot(&self) -> Arc<SpectrumSlot> {
        Arc::clone(&self.slot)
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for AudioFeed {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        for h in self.threads.drain(..) {
            let _ = h.join();
        }
        let dropped = self.dropped_frames();
        if dropped > 0 {
            warn!(dropped, "audio queue overflowed");
        }
        debug!("audio feed stopped");
    }
}

fn analyze_loop(
    cons: &mut ringbuf::HeapCons<[f32; 2]>,
    sample_rate_hz: u32,
    stop: &AtomicBool,
    slot: &SpectrumSlot,
) {
    let n = WINDOW;
    let mut ring_l = vec![0.0f32; n];
    let mut ring_r = vec![0.0f32; n];
    let mut win_l = vec![0.0f32; n];
    let mut win_r = vec![0.0f32; n];
    let mut write_pos = 0usize;
    let mut filled = 0usize;
    let mut since_last = 0usize;
    let mut analyzer = SpectrumAnalyzer::new(sample_rate_hz);

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some([l, r]) = cons.try_pop() {
            got_any = true;
            ring_l[write_pos] = l;
            ring_r[write_pos] = r;
            write_pos = (write_pos + 1) % n;
            if filled < n {
                filled += 1;
            }
            since_last += 1;
            if filled == n && since_last >= HOP {
                since_last = 0;
                unroll(&ring_l, write_pos, &mut win_l);
                unroll(&ring_r, write_pos, &mut win_r);
                let sample = analyzer.analyze(&win_l, &win_r);
                slot.deliver(sample.values());
            }
        }

        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Copies a circular buffer into `out`, oldest sample first.
fn unroll(ring: &[f32], write_pos: usize, out: &mut [f32]) {
    let n = ring.len();
    for (i, dst) in out.iter_mut().enumerate() {
        *dst = ring[(write_pos + i) % n];
    }
}

/// 120 BPM bass pulses on both channels, a hat on the left, and a slow sweep
/// on the right.
pub struct SynthSignal {
    sr: f32,
    n: u64,
    bass_phase: f32,
    hat_phase: f32,
    sweep_phase: f32,
}

impl SynthSignal {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sr: sample_rate_hz.max(1) as f32,
            n: 0,
            bass_phase: 0.0,
            hat_phase: 0.0,
            sweep_phase: 0.0,
        }
    }

    pub fn next_frame(&mut self) -> [f32; 2] {
        let t = self.n as f64 / self.sr as f64;
        self.n += 1;

        let beat = (t / 0.5).fract() as f32;
        let env = (1.0 - beat / 0.3).max(0.0).powf(2.4);
        let off = ((t / 0.5 + 0.5).fract() < 0.05) as u8 as f32;

        let sweep = (std::f64::consts::TAU * t / 8.0).sin() as f32;
        let sweep_hz = 300.0 * 20f32.powf(0.5 + 0.5 * sweep);
        self.bass_phase = (self.bass_phase + TAU * 55.0 / self.sr) % TAU;
        self.hat_phase = (self.hat_phase + TAU * 6_000.0 / self.sr) % TAU;
        self.sweep_phase = (self.sweep_phase + TAU * sweep_hz / self.sr) % TAU;

        let bass = self.bass_phase.sin() * 0.85 * env;
        let hat = self.hat_phase.sin() * 0.2 * off;
        let tone = self.sweep_phase.sin() * 0.3;
        [(bass + hat).clamp(-1.0, 1.0), (bass + tone).clamp(-1.0, 1.0)]
    }
}
