use super::*;

const RATE: u32 = 48_000;

/// Sine exactly on bin `k`.
fn tone(k: usize, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * PI * k as f32 * i as f32 / FFT_SIZE as f32).sin())
        .collect()
}

#[test]
fn silence_reads_zero() {
    let mut a = FrequencyAnalyser::new();
    let bins = a.analyse_silence().unwrap();
    assert_eq!(bins.len(), BIN_COUNT);
    assert!(bins.iter().all(|&b| b == 0));
}

#[test]
fn tone_lights_its_bin_only() {
    let mut a = FrequencyAnalyser::new();
    let block = tone(8, FFT_SIZE);
    for _ in 0..10 {
        a.analyse(&block).unwrap();
    }
    let bins = a.bins();
    assert_eq!(bins[8], 255);
    assert_eq!(bins[100], 0);
    assert_eq!(bins[400], 0);
}

#[test]
fn smoothing_decays_after_silence() {
    let mut a = FrequencyAnalyser::new();
    a.analyse(&tone(8, FFT_SIZE)).unwrap();
    let first = a.bins()[8];
    assert!(first > 0);
    for _ in 0..80 {
        a.analyse_silence().unwrap();
    }
    assert_eq!(a.bins()[8], 0);
}

#[test]
fn analyse_at_reads_window_ending_at_time() {
    let samples = tone(8, RATE as usize);
    let pcm = AudioPcm {
        sample_rate: RATE,
        channels: 1,
        interleaved_f32: samples,
    };
    let mut a = FrequencyAnalyser::new();
    assert!(a.analyse_at(&pcm, 0.0).unwrap().iter().all(|&b| b == 0));
    for _ in 0..10 {
        a.analyse_at(&pcm, 0.5).unwrap();
    }
    assert_eq!(a.bins()[8], 255);
}

#[test]
fn beat_scale_tracks_bass() {
    assert_eq!(beat_scale(&[0; BIN_COUNT]), 1.0);
    assert!((beat_scale(&[255; BIN_COUNT]) - 1.3).abs() < 1e-12);
    let mut bins = [0u8; BIN_COUNT];
    bins[..10].fill(51);
    assert!((beat_scale(&bins) - 1.06).abs() < 1e-12);
    assert_eq!(beat_scale(&[255; 4]), 1.0);
}
