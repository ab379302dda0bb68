use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use realfft::num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};

use crate::audio::decode::AudioPcm;
use crate::foundation::error::{WaveclipError, WaveclipResult};

pub const FFT_SIZE: usize = 1024;
pub const BIN_COUNT: usize = FFT_SIZE / 2;
pub const SMOOTHING: f32 = 0.8;
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

/// Bass bins averaged for the beat signal.
const BASS_BINS: usize = 10;
const BEAT_DEPTH: f64 = 0.3;

/// Byte frequency analyser with browser `AnalyserNode` semantics.
///
/// Blackman window, magnitude scaled by 1/N, exponential smoothing across calls, then decibels
/// mapped linearly from `[MIN_DECIBELS, MAX_DECIBELS]` onto `0..=255`.
pub struct FrequencyAnalyser {
    plan: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl FrequencyAnalyser {
    pub fn new() -> Self {
        let plan = RealFftPlanner::<f32>::new().plan_fft_forward(FFT_SIZE);
        let input = plan.make_input_vec();
        let spectrum = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();
        Self {
            plan,
            window: (0..FFT_SIZE).map(|i| blackman(i, FFT_SIZE)).collect(),
            input,
            spectrum,
            scratch,
            smoothed: vec![0.0; BIN_COUNT],
            bytes: vec![0; BIN_COUNT],
        }
    }

    /// Latest byte bins.
    pub fn bins(&self) -> &[u8] {
        &self.bytes
    }

    /// Analyse one block of time-domain samples.
    ///
    /// Short blocks are left-padded with silence; long blocks keep their most recent samples.
    pub fn analyse(&mut self, block: &[f32]) -> WaveclipResult<&[u8]> {
        let block = &block[block.len().saturating_sub(FFT_SIZE)..];
        let pad = FFT_SIZE - block.len();
        self.input[..pad].fill(0.0);
        self.input[pad..].copy_from_slice(block);
        self.run()
    }

    /// Analyse a silent block. Bins decay towards zero through smoothing.
    pub fn analyse_silence(&mut self) -> WaveclipResult<&[u8]> {
        self.input.fill(0.0);
        self.run()
    }

    /// Analyse the block ending at `time` seconds into `pcm`.
    pub fn analyse_at(&mut self, pcm: &AudioPcm, time: f64) -> WaveclipResult<&[u8]> {
        let end = (time.max(0.0) * f64::from(pcm.sample_rate)).floor() as i64;
        let start = end - FFT_SIZE as i64;
        for (slot, i) in self.input.iter_mut().zip(start..end) {
            *slot = pcm.mono_at(i);
        }
        self.run()
    }

    fn run(&mut self) -> WaveclipResult<&[u8]> {
        for (x, w) in self.input.iter_mut().zip(&self.window) {
            *x *= *w;
        }
        self.plan
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
            .map_err(|e| WaveclipError::media(format!("fft failed: {e}")))?;

        let norm = 1.0 / FFT_SIZE as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        for ((s, b), c) in self
            .smoothed
            .iter_mut()
            .zip(self.bytes.iter_mut())
            .zip(&self.spectrum)
        {
            let mag = c.norm() * norm;
            *s = SMOOTHING * *s + (1.0 - SMOOTHING) * mag;
            let db = if *s > 0.0 {
                20.0 * s.log10()
            } else {
                f32::NEG_INFINITY
            };
            let scaled = (255.0 / range) * (db - MIN_DECIBELS);
            *b = scaled.floor().clamp(0.0, 255.0) as u8;
        }
        Ok(&self.bytes)
    }
}

impl Default for FrequencyAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrequencyAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencyAnalyser")
            .field("fft_size", &FFT_SIZE)
            .finish()
    }
}

fn blackman(i: usize, n: usize) -> f32 {
    let x = i as f32 / n as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

/// Bass-driven zoom factor in `[1.0, 1.3]`. Needs at least ten bins; fewer read as silent.
pub fn beat_scale(bins: &[u8]) -> f64 {
    let Some(bass) = bins.get(..BASS_BINS) else {
        return 1.0;
    };
    let sum: u32 = bass.iter().map(|&b| u32::from(b)).sum();
    let avg = f64::from(sum) / BASS_BINS as f64;
    1.0 + (avg / 255.0) * BEAT_DEPTH
}

#[cfg(test)]
#[path = "../../tests/unit/audio/analyser.rs"]
mod tests;
