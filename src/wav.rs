use std::fmt;
use std::io::Write;
use std::path::Path;

/// Decoded audio as `[left, right]` frames in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WavClip {
    pub sample_rate_hz: u32,
    pub frames: Vec<[f32; 2]>,
}

impl WavClip {
    pub fn duration_s(&self) -> f32 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.frames.len() as f32 / self.sample_rate_hz as f32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WavError {
    Io(String),
    TooSmall,
    NotRiffWave,
    InvalidFmtChunk,
    MissingDataChunk,
    InvalidChannelCount,
    Unsupported { audio_format: u16, bits: u16 },
}

impl fmt::Display for WavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::TooSmall => write!(f, "wav too small"),
            Self::NotRiffWave => write!(f, "not a RIFF/WAVE file"),
            Self::InvalidFmtChunk => write!(f, "invalid fmt chunk"),
            Self::MissingDataChunk => write!(f, "missing data chunk"),
            Self::InvalidChannelCount => write!(f, "invalid channel count"),
            Self::Unsupported { audio_format, bits } => write!(
                f,
                "unsupported wav format: audio_format={audio_format} bits={bits} (supported: PCM16, Float32)"
            ),
        }
    }
}

impl std::error::Error for WavError {}

pub fn read(path: &Path) -> Result<WavClip, WavError> {
    let bytes = std::fs::read(path).map_err(|e| WavError::Io(e.to_string()))?;
    decode(&bytes)
}

/// Mono input is copied to both channels; channels beyond the second are dropped.
pub fn decode(bytes: &[u8]) -> Result<WavClip, WavError> {
    if bytes.len() < 44 {
        return Err(WavError::TooSmall);
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::NotRiffWave);
    }

    let mut audio_format = 0u16;
    let mut channels = 0u16;
    let mut sample_rate_hz = 0u32;
    let mut bits = 0u16;
    let mut data: Option<&[u8]> = None;

    let mut pos = 12usize;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32_le(&bytes[pos + 4..pos + 8]) as usize;
        let start = pos + 8;
        let end = start.saturating_add(size);
        if end > bytes.len() {
            break;
        }

        if id == b"fmt " {
            if size < 16 {
                return Err(WavError::InvalidFmtChunk);
            }
            audio_format = u16_le(&bytes[start..start + 2]);
            channels = u16_le(&bytes[start + 2..start + 4]);
            sample_rate_hz = u32_le(&bytes[start + 4..start + 8]);
            bits = u16_le(&bytes[start + 14..start + 16]);
        } else if id == b"data" {
            data = Some(&bytes[start..end]);
        }

        pos = end + (size % 2);
    }

    let data = data.ok_or(WavError::MissingDataChunk)?;
    if channels == 0 {
        return Err(WavError::InvalidChannelCount);
    }

    let ch = channels as usize;
    let frames = match (audio_format, bits) {
        (1, 16) => collect_frames(data, ch, 2, |b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0),
        (3, 32) => collect_frames(data, ch, 4, |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        _ => return Err(WavError::Unsupported { audio_format, bits }),
    };

    Ok(WavClip {
        sample_rate_hz,
        frames,
    })
}

fn collect_frames(
    data: &[u8],
    channels: usize,
    width: usize,
    sample: impl Fn(&[u8]) -> f32,
) -> Vec<[f32; 2]> {
    data.chunks_exact(channels * width)
        .map(|frame| {
            let left = sample(&frame[..width]).clamp(-1.0, 1.0);
            let right = if channels > 1 {
                sample(&frame[width..2 * width]).clamp(-1.0, 1.0)
            } else {
                left
            };
            [left, right]
        })
        .collect()
}

fn u16_le(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn u32_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

pub fn encode_pcm16_stereo(sample_rate_hz: u32, frames: &[[f32; 2]]) -> Vec<u8> {
    let channels: u16 = 2;
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate_hz * channels as u32 * bits_per_sample as u32 / 8;
    let block_align = channels * bits_per_sample / 8;
    let data_bytes = (frames.len() * block_align as usize) as u32;
    let riff_size = 4 + 8 + 16 + 8 + data_bytes;

    let mut out = Vec::with_capacity(44 + data_bytes as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate_hz.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_bytes.to_le_bytes());
    for [l, r] in frames {
        out.extend_from_slice(&to_i16(*l).to_le_bytes());
        out.extend_from_slice(&to_i16(*r).to_le_bytes());
    }
    out
}

pub fn write_pcm16_stereo(
    path: &Path,
    sample_rate_hz: u32,
    frames: &[[f32; 2]],
) -> Result<(), WavError> {
    let bytes = encode_pcm16_stereo(sample_rate_hz, frames);
    let mut f = std::fs::File::create(path).map_err(|e| WavError::Io(e.to_string()))?;
    f.write_all(&bytes).map_err(|e| WavError::Io(e.to_string()))
}

fn to_i16(x: f32) -> i16 {
    (x.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
