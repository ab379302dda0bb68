//! Encoding sinks.
//!
//! Sinks consume captured frames in order and are driven by `capture::Recorder`.

/// `ffmpeg`-based WebM sink.
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
