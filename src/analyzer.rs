use crate::audio::{AudioSample, CHANNEL_BINS, SPECTRUM_LEN};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Samples per analysis window, per channel.
pub const WINDOW: usize = 1024;
/// Frames between successive analyses.
pub const HOP: usize = 256;

const LOW_HZ: f32 = 20.0;
const HIGH_HZ: f32 = 16_000.0;

/// Turns stereo PCM windows into 64 log-spaced bands per channel.
pub struct SpectrumAnalyzer {
    hann: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_buf: Vec<Complex<f32>>,
    mags: Vec<f32>,
    bands: Vec<(usize, usize)>,
    smoothed: [f32; SPECTRUM_LEN],
    gain: f32,
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate_hz: u32) -> Self {
        let n = WINDOW;
        let hann = (0..n)
            .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (n as f32)).cos())
            .collect::<Vec<_>>();

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);

        Self {
            hann,
            fft,
            fft_buf: vec![Complex { re: 0.0, im: 0.0 }; n],
            mags: vec![0.0f32; n / 2],
            bands: band_bins(sample_rate_hz, n),
            smoothed: [0.0; SPECTRUM_LEN],
            // A full-scale sine peaks near n/4 after the Hann window.
            gain: 4.0 / n as f32,
        }
    }

    pub fn reset(&mut self) {
        self.smoothed = [0.0; SPECTRUM_LEN];
    }

    /// Analyzes one window per channel (oldest sample first). Shorter windows are
    /// zero-padded at the front.
    pub fn analyze(&mut self, left: &[f32], right: &[f32]) -> AudioSample {
        let mut raw = [0.0f32; SPECTRUM_LEN];
        self.channel_bands(left, &mut raw[..CHANNEL_BINS]);
        self.channel_bands(right, &mut raw[CHANNEL_BINS..]);
        for (s, v) in self.smoothed.iter_mut().zip(raw) {
            *s = *s * 0.85 + v * 0.15;
        }
        AudioSample::from_slice(&self.smoothed)
    }

    fn channel_bands(&mut self, window: &[f32], out: &mut [f32]) {
        let n = self.fft_buf.len();
        let src = &window[window.len().saturating_sub(n)..];
        let pad = n - src.len();
        for (i, c) in self.fft_buf.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { src[i - pad] };
            c.re = s * self.hann[i];
            c.im = 0.0;
        }

        self.fft.process(&mut self.fft_buf);
        let half = self.mags.len();
        for (m, c) in self.mags.iter_mut().zip(self.fft_buf.iter().take(half)) {
            *m = (c.re * c.re + c.im * c.im).sqrt();
        }

        for (dst, &(lo, hi)) in out.iter_mut().zip(&self.bands) {
            let peak = self.mags[lo..hi].iter().copied().fold(0.0f32, f32::max);
            *dst = peak * self.gain;
        }
    }
}

/// `[lo, hi)` FFT bin range for each of the log-spaced bands between 20 Hz and
/// 16 kHz (or Nyquist). Every band covers at least one bin.
fn band_bins(sample_rate_hz: u32, n: usize) -> Vec<(usize, usize)> {
    let half = n / 2;
    let sr = sample_rate_hz.max(1) as f32;
    let top = HIGH_HZ.min(sr * 0.5);
    let ratio = (top / LOW_HZ).max(1.0);
    let bin_of = |hz: f32| (hz * n as f32 / sr).floor() as usize;

    (0..CHANNEL_BINS)
        .map(|k| {
            let f_lo = LOW_HZ * ratio.powf(k as f32 / CHANNEL_BINS as f32);
            let f_hi = LOW_HZ * ratio.powf((k + 1) as f32 / CHANNEL_BINS as f32);
            let lo = bin_of(f_lo).clamp(1, half - 1);
            let hi = bin_of(f_hi).clamp(lo + 1, half);
            (lo, hi)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(hz: f32, sr: f32, amp: f32) -> Vec<f32> {
        (0..WINDOW)
            .map(|i| (2.0 * PI * hz * i as f32 / sr).sin() * amp)
            .collect()
    }

    #[test]
    fn band_bins_are_ordered_and_nonempty() {
        let bands = band_bins(48_000, WINDOW);
        assert_eq!(bands.len(), CHANNEL_BINS);
        for (lo, hi) in &bands {
            assert!(lo < hi);
            assert!(*hi <= WINDOW / 2);
        }
        for w in bands.windows(2) {
            assert!(w[0].0 <= w[1].0);
        }
    }

    #[test]
    fn low_tone_on_left_lights_left_low_bands_only() {
        let mut a = SpectrumAnalyzer::new(48_000);
        let left = tone(60.0, 48_000.0, 0.9);
        let right = vec![0.0f32; WINDOW];
        let mut s = AudioSample::silent();
        for _ in 0..60 {
            s = a.analyze(&left, &right);
        }
        assert!(s.get(0) > 0.1, "left bass too quiet: {}", s.get(0));
        assert!(s.right().iter().all(|v| *v < 1e-4));
        assert!(s.drive_level() > 0.1);
    }

    #[test]
    fn high_tone_on_right_peaks_in_upper_bands() {
        let mut a = SpectrumAnalyzer::new(48_000);
        let left = vec![0.0f32; WINDOW];
        let right = tone(5_000.0, 48_000.0, 0.9);
        let mut s = AudioSample::silent();
        for _ in 0..60 {
            s = a.analyze(&left, &right);
        }
        let (peak_idx, _) = s
            .right()
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, v)| if *v > best.1 { (i, *v) } else { best });
        assert!(peak_idx > CHANNEL_BINS / 2, "peak band {peak_idx}");
        assert!(s.left().iter().all(|v| *v < 1e-4));
    }

    #[test]
    fn silence_stays_silent() {
        let mut a = SpectrumAnalyzer::new(44_100);
        let zeros = vec![0.0f32; WINDOW];
        let s = a.analyze(&zeros, &zeros);
        assert_eq!(s, AudioSample::silent());
    }
}
