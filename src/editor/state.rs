use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::foundation::core::Canvas;
use crate::render::compositor::SceneRef;
use crate::scene::model::{Project, TextSettings, VisualizerSettings};
use crate::scene::store::LayerStore;
use crate::subtitle::timeline::SubtitleTimeline;

/// Aggregate root of one editing session.
///
/// Playback state lives in the session's `TimeBase`; this holds the document plus the transient
/// flags the host reads.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorState {
    pub canvas: Canvas,
    pub fps: u32,
    pub seed: u64,
    pub layers: LayerStore,
    pub subtitles: SubtitleTimeline,
    pub visualizer: VisualizerSettings,
    pub text_settings: TextSettings,
    pub fonts: BTreeMap<String, PathBuf>,
    pub(crate) audio_source: Option<PathBuf>,
    pub(crate) rendering: bool,
    pub(crate) generating_subtitles: bool,
    pub(crate) tap_sync: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::from_project(&Project::default())
    }
}

impl EditorState {
    /// Session state for a loaded project. Layers get fresh ids; audio is bound separately.
    pub fn from_project(project: &Project) -> Self {
        Self {
            canvas: project.canvas,
            fps: project.fps,
            seed: project.seed,
            layers: LayerStore::from_layers(project.images.clone(), project.text_layers.clone()),
            subtitles: SubtitleTimeline::new(project.subtitles.clone(), project.subtitle_offset),
            visualizer: project.visualizer.clone(),
            text_settings: project.text_settings.clone(),
            fonts: project.fonts.clone(),
            audio_source: None,
            rendering: false,
            generating_subtitles: false,
            tap_sync: false,
        }
    }

    pub fn to_project(&self) -> Project {
        Project {
            canvas: self.canvas,
            fps: self.fps,
            seed: self.seed,
            audio: self.audio_source.clone(),
            images: self.layers.images().to_vec(),
            text_layers: self.layers.text_layers().to_vec(),
            subtitles: self.subtitles.entries().to_vec(),
            subtitle_offset: self.subtitles.offset(),
            visualizer: self.visualizer.clone(),
            text_settings: self.text_settings.clone(),
            fonts: self.fonts.clone(),
        }
    }

    pub fn scene(&self) -> SceneRef<'_> {
        SceneRef {
            images: self.layers.images(),
            text_layers: self.layers.text_layers(),
            visualizer: &self.visualizer,
            text_settings: &self.text_settings,
            subtitles: &self.subtitles,
        }
    }

    pub fn audio_source(&self) -> Option<&PathBuf> {
        self.audio_source.as_ref()
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub fn is_generating_subtitles(&self) -> bool {
        self.generating_subtitles
    }

    /// Tap-to-sync mode: tapping a line retimes it to the current playhead.
    pub fn is_tap_sync(&self) -> bool {
        self.tap_sync
    }
}
