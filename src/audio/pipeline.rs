use std::path::Path;
use std::sync::Arc;

use crate::audio::analyser::{FrequencyAnalyser, beat_scale};
use crate::audio::decode::{AudioPcm, write_f32le_file};
use crate::foundation::error::WaveclipResult;

/// Per-frame analysis result.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisFrame {
    pub bins: Vec<u8>,
    /// 1.0 unless playing.
    pub beat_scale: f64,
}

/// Analysis and export tap bound to one loaded track.
///
/// Built once, on the first audio load, and rebound when the track changes.
#[derive(Debug)]
pub struct AudioPipeline {
    pcm: Arc<AudioPcm>,
    analyser: FrequencyAnalyser,
}

impl AudioPipeline {
    pub fn new(pcm: Arc<AudioPcm>) -> Self {
        Self {
            pcm,
            analyser: FrequencyAnalyser::new(),
        }
    }

    pub fn pcm(&self) -> &Arc<AudioPcm> {
        &self.pcm
    }

    /// Swap in a new track, keeping the analyser.
    pub fn rebind(&mut self, pcm: Arc<AudioPcm>) {
        self.pcm = pcm;
    }

    /// Analyse the frame at `time`. A paused element outputs silence.
    pub fn analyse(&mut self, time: f64, playing: bool) -> WaveclipResult<AnalysisFrame> {
        let bins = if playing {
            self.analyser.analyse_at(&self.pcm, time)?
        } else {
            self.analyser.analyse_silence()?
        };
        let beat = if playing { beat_scale(bins) } else { 1.0 };
        Ok(AnalysisFrame {
            bins: bins.to_vec(),
            beat_scale: beat,
        })
    }

    /// Write the track as raw f32le, padded with silence up to `min_duration_s`.
    pub fn write_export_tap(&self, path: &Path, min_duration_s: f64) -> WaveclipResult<()> {
        let ch = usize::from(self.pcm.channels.max(1));
        let want_frames = (min_duration_s.max(0.0) * f64::from(self.pcm.sample_rate)).ceil() as usize;
        let want = want_frames * ch;
        let have = &self.pcm.interleaved_f32;
        if have.len() >= want {
            return write_f32le_file(have, path);
        }
        let mut padded = Vec::with_capacity(want);
        padded.extend_from_slice(have);
        padded.resize(want, 0.0);
        tracing::debug!(
            pad_frames = (want - have.len()) / ch,
            "export tap padded with silence"
        );
        write_f32le_file(&padded, path)
    }
}
