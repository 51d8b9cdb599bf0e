use std::time::{Duration, Instant};

use accretion_jet::audio::{AudioSample, Silence, SPECTRUM_LEN};
use accretion_jet::params::SimParams;
use accretion_jet::sim::Simulation;
use anyhow::{Context, Result};
use std::sync::Arc;

struct Args {
    frames: usize,
    disk_particles: usize,
    jet_particles: usize,
    seed: u64,
    ci_smoke: bool,
    quick: bool,
    max_ms: f64,
}

fn parse_args() -> Args {
    let mut args = Args {
        frames: 600,
        disk_particles: 20_000,
        jet_particles: 2_000,
        seed: 1,
        ci_smoke: false,
        quick: false,
        max_ms: 8.0,
    };

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--frames", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.frames = n.max(1);
                }
                i += 2;
            }
            ("--disk-particles", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.disk_particles = n.max(1);
                }
                i += 2;
            }
            ("--jet-particles", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.jet_particles = n.max(1);
                }
                i += 2;
            }
            ("--seed", Some(x)) => {
                if let Ok(n) = x.parse::<u64>() {
                    args.seed = n;
                }
                i += 2;
            }
            ("--ci-smoke", Some(x)) if !x.starts_with("--") => {
                args.ci_smoke = parse_bool(x).unwrap_or(true);
                i += 2;
            }
            ("--ci-smoke", _) => {
                args.ci_smoke = true;
                i += 1;
            }
            ("--quick", Some(x)) if !x.starts_with("--") => {
                args.quick = parse_bool(x).unwrap_or(true);
                i += 2;
            }
            ("--quick", _) => {
                args.quick = true;
                i += 1;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(v) = x.parse::<f64>() {
                    args.max_ms = v.max(0.1);
                }
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    if args.quick {
        args.frames = args.frames.min(120);
    }

    args
}

fn parse_bool(s: &str) -> Option<bool> {
    let v = s.trim().to_ascii_lowercase();
    match v.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Beat-like spectrum: a decaying bass hit every 30 frames, mids and highs
/// drifting underneath.
fn synth_spectrum(step: usize) -> AudioSample {
    let t = step as f32 / 60.0;
    let hit = (1.0 - (step % 30) as f32 / 12.0).max(0.0);
    let mut raw = [0.0f32; SPECTRUM_LEN];
    for (i, v) in raw.iter_mut().enumerate() {
        let band = (i % 64) as f32 / 64.0;
        let drift = ((t * (1.3 + band * 4.0) + i as f32 * 0.37).sin() * 0.5 + 0.5) * 0.25;
        let bass = hit * (1.0 - band).powf(6.0);
        *v = drift * band + bass;
    }
    AudioSample::from_slice(&raw)
}

fn main() -> Result<()> {
    let args = parse_args();
    let params = SimParams {
        disk_particle_count: args.disk_particles,
        jet_particle_count: args.jet_particles,
        seed: Some(args.seed),
        ..SimParams::default()
    };

    let build_start = Instant::now();
    let mut sim = Simulation::new(params, Arc::new(Silence)).context("build simulation")?;
    let build_ms = build_start.elapsed().as_secs_f64() * 1000.0;

    println!(
        "simulation benchmark: frames={} disk={} jets={} quick={} build={:.2}ms",
        args.frames, args.disk_particles, args.jet_particles, args.quick, build_ms
    );

    let dt = 1.0 / 60.0;
    let mut worst = Duration::ZERO;
    let mut launched = 0usize;
    let start = Instant::now();
    for f in 0..args.frames {
        let sample = synth_spectrum(f);
        let t0 = Instant::now();
        let report = sim.step(dt, &sample);
        worst = worst.max(t0.elapsed());
        launched += report.launched;
    }
    let total = start.elapsed();

    let avg_ms = total.as_secs_f64() * 1000.0 / args.frames as f64;
    let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };
    let worst_ms = worst.as_secs_f64() * 1000.0;
    println!(
        "step: {:>8.3} ms/frame avg  {:>8.3} ms worst  {:>9.1} FPS  launched={} active_jets={}",
        avg_ms,
        worst_ms,
        fps,
        launched,
        sim.jet().active_count()
    );

    let finite = sim.disk().particles().iter().all(|p| p.position().is_finite())
        && sim.jet().particles().iter().all(|p| p.position().is_finite());

    if args.ci_smoke {
        if avg_ms > args.max_ms || !finite || launched == 0 {
            eprintln!("CI smoke: FAIL");
            if avg_ms > args.max_ms {
                eprintln!("  slow: {:.3} ms/frame > {:.3}", avg_ms, args.max_ms);
            }
            if !finite {
                eprintln!("  non-finite particle positions");
            }
            if launched == 0 {
                eprintln!("  no jet particles launched");
            }
            anyhow::bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }

    Ok(())
}
