//! Waveclip is a music-video compositor.
//!
//! A project stacks image and text layers over an audio track. Each frame is composed on the CPU
//! with an audio-reactive visualizer and karaoke subtitles on top, then optionally captured into
//! a WebM file through `ffmpeg`.
//!
//! - Load a [`Project`] into an [`Editor`]
//! - Drive it with [`Editor::tick`], or draw single frames with [`Editor::draw_at`]
//! - Export with [`Editor::export`] into any [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub mod animation;
pub mod audio;
/// Frame capture sessions.
pub mod capture;
pub mod editor;
/// Encoding sinks.
pub mod encode;
pub mod playback;
/// CPU compositor and its drawing primitives.
pub mod render;
/// Layer and project model.
pub mod scene;
pub mod subtitle;

pub use crate::foundation::core::{Affine, Canvas, FrameIndex, Rgb8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{WaveclipError, WaveclipResult};

pub use crate::animation::motion::AnimationType;
pub use crate::audio::decode::{AudioPcm, decode_audio_f32_stereo};
pub use crate::capture::recorder::{RenderArtifact, artifact_file_name};
pub use crate::editor::session::Editor;
pub use crate::editor::state::EditorState;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, WebmCodecs};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::playback::clock::{EventLog, HostEvent, PlaybackHost, TracingHost};
pub use crate::render::surface::FrameRGBA;
pub use crate::scene::model::{
    ImageLayer, LayerId, Project, TextLayer, TextSettings, VisualizerKind, VisualizerSettings,
};
pub use crate::scene::store::{LayerRef, LayerStore};
pub use crate::subtitle::generate::{CommandGenerator, SubtitleGenerator};
pub use crate::subtitle::timeline::{Subtitle, SubtitleTimeline};
