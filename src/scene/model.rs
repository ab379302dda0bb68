use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::animation::motion::{AnimParams, AnimationType};
use crate::foundation::core::Canvas;
use crate::foundation::error::{WaveclipError, WaveclipResult};
use crate::subtitle::timeline::Subtitle;

/// Stable identity of a layer within one editor session.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct LayerId(pub u64);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLayer {
    #[serde(default)]
    pub id: LayerId,
    /// Image file (png, jpeg, webp, ...).
    pub source: PathBuf,
    #[serde(default)]
    pub name: String,
    /// Center X in canvas pixels.
    pub x: f64,
    /// Center Y in canvas pixels.
    pub y: f64,
    #[serde(default = "one")]
    pub scale: f64,
    /// Static rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default)]
    pub animation: AnimationType,
    #[serde(default = "one")]
    pub animation_speed: f64,
    #[serde(default = "default_amp")]
    pub animation_amp: f64,
}

impl ImageLayer {
    const NAME_MAX_CHARS: usize = 15;

    /// New layer centered on `canvas`, named after the file.
    pub fn from_file(source: impl Into<PathBuf>, canvas: Canvas) -> Self {
        let source = source.into();
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().chars().take(Self::NAME_MAX_CHARS).collect())
            .unwrap_or_default();
        let center = canvas.center();
        Self {
            id: LayerId::default(),
            source,
            name,
            x: center.x,
            y: center.y,
            scale: 0.5,
            rotation: 0.0,
            opacity: 1.0,
            animation: AnimationType::None,
            animation_speed: 1.0,
            animation_amp: default_amp(),
        }
    }

    pub fn anim_params(&self) -> AnimParams {
        AnimParams::effective(self.animation_speed, self.animation_amp)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    #[serde(default)]
    pub id: LayerId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_text_layer_size")]
    pub font_size: f64,
    #[serde(default = "default_text_layer_family")]
    pub font_family: String,
    #[serde(default = "white")]
    pub color: String,
    #[serde(default = "one")]
    pub opacity: f64,
    /// Static rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "black")]
    pub shadow_color: String,
    #[serde(default)]
    pub shadow_blur: f64,
    #[serde(default)]
    pub animation: AnimationType,
    #[serde(default = "one")]
    pub animation_speed: f64,
    #[serde(default = "default_amp")]
    pub animation_amp: f64,
}

impl TextLayer {
    pub fn new_default() -> Self {
        Self {
            id: LayerId::default(),
            text: "Kinetic Text".to_string(),
            x: 640.0,
            y: 200.0,
            font_size: default_text_layer_size(),
            font_family: default_text_layer_family(),
            color: white(),
            opacity: 1.0,
            rotation: 0.0,
            shadow_color: black(),
            shadow_blur: 0.0,
            animation: AnimationType::None,
            animation_speed: 1.0,
            animation_amp: default_amp(),
        }
    }

    pub fn anim_params(&self) -> AnimParams {
        AnimParams::effective(self.animation_speed, self.animation_amp)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizerKind {
    #[default]
    Bars,
    Wave,
    Circular,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualizerSettings {
    pub enabled: bool,
    pub bar_color: String,
    #[serde(rename = "type")]
    pub kind: VisualizerKind,
    /// Horizontal center as a percentage of canvas width.
    pub x: f64,
    /// Vertical center as a percentage of canvas height.
    pub y: f64,
    pub scale: f64,
    pub sensitivity: f64,
    pub bar_count: u32,
    /// Fraction of each slot left empty, `0..=1`.
    pub gap: f64,
    /// Corner radius of bars in logical units.
    pub roundness: f64,
    /// Glow blur in pixels.
    pub shadow_blur: f64,
    pub fill_alpha: f64,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bar_color: "#22c55e".to_string(),
            kind: VisualizerKind::Bars,
            x: 50.0,
            y: 50.0,
            scale: 1.0,
            sensitivity: 1.5,
            bar_count: 40,
            gap: 0.3,
            roundness: 50.0,
            shadow_blur: 0.0,
            fill_alpha: 1.0,
        }
    }
}

/// Shared karaoke subtitle styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSettings {
    pub font_family: String,
    pub primary_font_size: f64,
    pub primary_color: String,
    pub secondary_font_size: f64,
    pub secondary_color: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            primary_font_size: 48.0,
            primary_color: "#ffffff".to_string(),
            secondary_font_size: 32.0,
            secondary_color: "#9ca3af".to_string(),
        }
    }
}

/// On-disk project file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub canvas: Canvas,
    /// Capture frame rate.
    pub fps: u32,
    /// Seed for per-frame randomized effects.
    pub seed: u64,
    pub audio: Option<PathBuf>,
    pub images: Vec<ImageLayer>,
    pub text_layers: Vec<TextLayer>,
    pub subtitles: Vec<Subtitle>,
    pub subtitle_offset: f64,
    pub visualizer: VisualizerSettings,
    pub text_settings: TextSettings,
    /// Font family name to font file.
    pub fonts: BTreeMap<String, PathBuf>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: 30,
            seed: 1,
            audio: None,
            images: Vec::new(),
            text_layers: Vec::new(),
            subtitles: Vec::new(),
            subtitle_offset: 0.0,
            visualizer: VisualizerSettings::default(),
            text_settings: TextSettings::default(),
            fonts: BTreeMap::new(),
        }
    }
}

impl Project {
    /// Load a project JSON file and resolve relative paths against its directory.
    pub fn from_path(path: &Path) -> WaveclipResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        let mut project = Self::from_json_str(&text)?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        project.resolve_paths(root);
        Ok(project)
    }

    pub fn from_json_str(text: &str) -> WaveclipResult<Self> {
        let project: Self = serde_json::from_str(text)?;
        project.validate()?;
        Ok(project)
    }

    pub fn to_json_string(&self) -> WaveclipResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> WaveclipResult<()> {
        self.canvas.validate()?;
        if self.fps == 0 {
            return Err(WaveclipError::validation("project fps must be non-zero"));
        }
        if !self.subtitle_offset.is_finite() {
            return Err(WaveclipError::validation("subtitleOffset must be finite"));
        }
        for l in &self.images {
            if !(l.x.is_finite() && l.y.is_finite() && l.scale.is_finite()) {
                return Err(WaveclipError::validation(format!(
                    "image layer '{}' has non-finite geometry",
                    l.name
                )));
            }
        }
        for l in &self.text_layers {
            if !(l.font_size.is_finite() && l.font_size > 0.0) {
                return Err(WaveclipError::validation(format!(
                    "text layer '{}' font size must be > 0",
                    l.text
                )));
            }
        }
        Ok(())
    }

    /// Make every relative path absolute under `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        if let Some(audio) = self.audio.as_mut() {
            resolve(audio);
        }
        for img in &mut self.images {
            resolve(&mut img.source);
        }
        for font in self.fonts.values_mut() {
            resolve(font);
        }
    }
}

fn one() -> f64 {
    1.0
}

fn default_amp() -> f64 {
    AnimParams::DEFAULT_AMP
}

fn default_text_layer_size() -> f64 {
    80.0
}

fn default_text_layer_family() -> String {
    "Impact, sans-serif".to_string()
}

fn white() -> String {
    "#ffffff".to_string()
}

fn black() -> String {
    "#000000".to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
