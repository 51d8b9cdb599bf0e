use std::f32::consts::PI;
use std::fs;
use std::path::PathBuf;

use accretion_jet::feed::SynthSignal;
use accretion_jet::wav;
use anyhow::{Context, Result};

struct Args {
    out: PathBuf,
    sample_rate: u32,
}

fn parse_args() -> Args {
    let mut out = PathBuf::from("assets/test/accretion_fixture.wav");
    let mut sample_rate = 48_000u32;

    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        let v = it.next();
        match (k.as_str(), v) {
            ("--out", Some(p)) => out = PathBuf::from(p),
            ("--sample-rate", Some(v)) => {
                if let Ok(sr) = v.parse::<u32>() {
                    sample_rate = sr.clamp(8_000, 192_000);
                }
            }
            _ => {}
        }
    }

    Args { out, sample_rate }
}

fn main() -> Result<()> {
    let args = parse_args();
    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }

    let frames = make_fixture(args.sample_rate);
    wav::write_pcm16_stereo(&args.out, args.sample_rate, &frames)
        .with_context(|| format!("write {}", args.out.display()))?;

    println!("generated: {}", args.out.display());
    println!(
        "sample_rate={}Hz duration={:.2}s frames={}",
        args.sample_rate,
        frames.len() as f32 / args.sample_rate as f32,
        frames.len()
    );
    Ok(())
}

fn make_fixture(sr: u32) -> Vec<[f32; 2]> {
    let mut out = Vec::<[f32; 2]>::new();

    // 1) 2s silence: the disk should sit flat and jets fire single particles.
    push_silence(&mut out, sr, 2.0);

    // 2) 16 bass pulses at 120 BPM, alternating channels.
    for i in 0..16 {
        let side = if i % 2 == 0 { [1.0, 0.35] } else { [0.35, 1.0] };
        push_pulse(&mut out, sr, 0.060, 50.0 + i as f32 * 2.0, 0.9, side);
        push_silence(&mut out, sr, 0.440);
    }

    // 3) 8s chirp, left rising and right falling, to sweep every bucket.
    push_crossed_chirp(&mut out, sr, 8.0, 40.0, 12_000.0, 0.7);

    // 4) 8s of the live synth signal.
    let mut synth = SynthSignal::new(sr);
    let n = (8.0 * sr as f32) as usize;
    out.extend((0..n).map(|_| synth.next_frame()));

    // 5) 1s tail silence.
    push_silence(&mut out, sr, 1.0);

    out
}

fn push_silence(out: &mut Vec<[f32; 2]>, sr: u32, seconds: f32) {
    let n = (seconds.max(0.0) * sr as f32).round() as usize;
    out.resize(out.len() + n, [0.0, 0.0]);
}

fn push_pulse(out: &mut Vec<[f32; 2]>, sr: u32, seconds: f32, freq: f32, amp: f32, pan: [f32; 2]) {
    let n = (seconds.max(0.0) * sr as f32).round() as usize;
    for i in 0..n {
        let t = i as f32 / sr as f32;
        // Fast attack, short decay.
        let env = ((1.0 - t / seconds.max(1e-5)).max(0.0)).powf(2.4);
        let v = (2.0 * PI * freq * t).sin() * amp * env;
        out.push([v * pan[0], v * pan[1]]);
    }
}

fn push_crossed_chirp(out: &mut Vec<[f32; 2]>, sr: u32, seconds: f32, f0: f32, f1: f32, amp: f32) {
    let n = (seconds.max(0.0) * sr as f32).round() as usize;
    let dur = seconds.max(1e-4);
    let ratio = f1 / f0;
    let mut phase = [0.0f32; 2];
    for i in 0..n {
        let x = (i as f32 / sr as f32 / dur).clamp(0.0, 1.0);
        let up = f0 * ratio.powf(x);
        let down = f0 * ratio.powf(1.0 - x);
        phase[0] = (phase[0] + 2.0 * PI * up / sr as f32) % (2.0 * PI);
        phase[1] = (phase[1] + 2.0 * PI * down / sr as f32) % (2.0 * PI);
        out.push([phase[0].sin() * amp, phase[1].sin() * amp]);
    }
}
