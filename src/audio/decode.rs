use std::path::Path;

use crate::foundation::error::{WaveclipError, WaveclipResult};

/// Sample rate used for analysis and the export tap.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Decoded interleaved PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    /// Length in seconds.
    pub fn duration_s(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Mono sample at frame `i` (channel average), or silence past either end.
    pub fn mono_at(&self, i: i64) -> f32 {
        if i < 0 {
            return 0.0;
        }
        let ch = usize::from(self.channels);
        let Some(base) = usize::try_from(i).ok().and_then(|i| i.checked_mul(ch)) else {
            return 0.0;
        };
        match self.interleaved_f32.get(base..base + ch) {
            Some(frame) if ch > 0 => frame.iter().sum::<f32>() / ch as f32,
            _ => 0.0,
        }
    }
}

/// Decode any audio file ffmpeg understands to stereo interleaved `f32` PCM.
#[tracing::instrument]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> WaveclipResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| WaveclipError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        return Err(WaveclipError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    let interleaved_f32 = f32le_to_samples(&out.stdout)?;
    tracing::debug!(samples = interleaved_f32.len(), "audio decoded");
    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}

pub(crate) fn f32le_to_samples(bytes: &[u8]) -> WaveclipResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(WaveclipError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Write interleaved samples as raw f32le, creating parent directories.
pub(crate) fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> WaveclipResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            WaveclipError::media(format!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        WaveclipError::media(format!(
            "failed to write audio file '{}': {e}",
            out_path.display()
        ))
    })
}
