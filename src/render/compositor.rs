use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::animation::motion::{
    AnimParams, AnimationType, Motion, glitch_copies, neon_glow_blur, typewriter_visible,
    wave_offset,
};
use crate::foundation::core::{Affine, Canvas, Rgb8, Rgba8Premul, Vec2};
use crate::foundation::error::WaveclipResult;
use crate::render::bitmap::BitmapCache;
use crate::render::surface::{FrameRGBA, Glow, Surface, affine_to_cpu};
use crate::render::text::{GlyphPaint, ShapedText, TextAnchor, TextPainter};
use crate::render::visualizer;
use crate::scene::model::{ImageLayer, TextLayer, TextSettings, VisualizerSettings};
use crate::subtitle::timeline::{SubtitleTimeline, wrap_words};

const LEGIBILITY_OVERLAY: f32 = 0.2;
const GLITCH_COPY_OPACITY: f32 = 0.8;
const SUBTITLE_WRAP_RATIO: f64 = 0.9;
const SUBTITLE_LINE_HEIGHT: f64 = 1.4;
const MIN_SUBTITLE_OPACITY: f64 = 0.01;

/// Everything drawn in one frame, borrowed from the editor or a project file.
#[derive(Clone, Copy, Debug)]
pub struct SceneRef<'a> {
    pub images: &'a [ImageLayer],
    pub text_layers: &'a [TextLayer],
    pub visualizer: &'a VisualizerSettings,
    pub text_settings: &'a TextSettings,
    pub subtitles: &'a SubtitleTimeline,
}

/// Per-frame clock and analysis state.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs<'a> {
    /// Master time in seconds.
    pub time: f64,
    pub playing: bool,
    pub beat_scale: f64,
    /// Frequency bins; the visualizer is only drawn when audio is bound.
    pub spectrum: Option<&'a [u8]>,
    pub seed: u64,
}

/// Draws frames onto a reusable surface.
pub struct Compositor {
    canvas: Canvas,
    surface: Surface,
    text: TextPainter,
    bitmaps: BitmapCache,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("canvas", &self.canvas)
            .field("text", &self.text)
            .field("bitmaps", &self.bitmaps.len())
            .finish()
    }
}

impl Compositor {
    pub fn new(canvas: Canvas) -> WaveclipResult<Self> {
        Ok(Self {
            canvas,
            surface: Surface::new(canvas)?,
            text: TextPainter::new(),
            bitmaps: BitmapCache::new(),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn text_painter_mut(&mut self) -> &mut TextPainter {
        &mut self.text
    }

    pub fn bitmaps_mut(&mut self) -> &mut BitmapCache {
        &mut self.bitmaps
    }

    /// Register every `family -> file` entry of a project font table.
    pub fn register_fonts(&mut self, fonts: &BTreeMap<String, PathBuf>) -> WaveclipResult<()> {
        for (family, path) in fonts {
            self.text.register_font_file(family, path)?;
        }
        Ok(())
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn snapshot(&self) -> FrameRGBA {
        self.surface.snapshot()
    }

    /// Paint one complete frame.
    #[tracing::instrument(level = "trace", skip_all, fields(time = inputs.time, playing = inputs.playing))]
    pub fn draw_frame(
        &mut self,
        scene: &SceneRef<'_>,
        inputs: &FrameInputs<'_>,
    ) -> WaveclipResult<&Surface> {
        let Self {
            canvas,
            surface,
            text,
            bitmaps,
        } = &mut *self;

        surface.clear(Rgba8Premul::OPAQUE_BLACK);

        for layer in scene.images {
            draw_image(surface, bitmaps, layer, inputs)?;
        }
        for (index, layer) in scene.text_layers.iter().enumerate() {
            draw_text_layer(surface, text, layer, index, inputs)?;
        }
        if !scene.images.is_empty() {
            surface.fill_overlay(Rgba8Premul::OPAQUE_BLACK, LEGIBILITY_OVERLAY);
        }
        if scene.visualizer.enabled
            && let Some(bins) = inputs.spectrum
        {
            visualizer::draw(surface, *canvas, bins, scene.visualizer)?;
        }
        draw_subtitles(surface, text, *canvas, scene, inputs.time)?;

        Ok(&self.surface)
    }
}

fn layer_transform(x: f64, y: f64, scale: f64, rotation_deg: f64, m: Motion) -> Affine {
    Affine::translate((x + m.offset.x, y + m.offset.y))
        * Affine::rotate(rotation_deg.to_radians() + m.rotation)
        * Affine::scale(scale * m.scale)
}

fn layer_motion(animation: AnimationType, p: AnimParams, inputs: &FrameInputs<'_>) -> Motion {
    if inputs.playing {
        animation.motion(inputs.time, p, inputs.beat_scale)
    } else {
        Motion::default()
    }
}

fn unit_opacity(v: f64) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

fn draw_image(
    surface: &mut Surface,
    bitmaps: &mut BitmapCache,
    layer: &ImageLayer,
    inputs: &FrameInputs<'_>,
) -> WaveclipResult<()> {
    let Some(bitmap) = bitmaps.get_or_load(&layer.source) else {
        return Ok(());
    };
    let (w, h) = (f64::from(bitmap.width), f64::from(bitmap.height));
    let m = layer_motion(layer.animation, layer.anim_params(), inputs);
    let transform = layer_transform(layer.x, layer.y, layer.scale, layer.rotation, m)
        * Affine::translate((-w / 2.0, -h / 2.0));
    let paint = bitmap.paint.clone();

    surface.pass(unit_opacity(layer.opacity), None, |ctx| {
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        Ok(())
    })
}

fn fill_shaped(
    surface: &mut Surface,
    shaped: &ShapedText,
    at: Affine,
    color: Rgba8Premul,
    opacity: f32,
    glow: Option<Glow>,
) -> WaveclipResult<()> {
    surface.pass(opacity, glow, |ctx| {
        shaped.draw(ctx, at, color, GlyphPaint::Fill);
        Ok(())
    })
}

fn draw_text_layer(
    surface: &mut Surface,
    painter: &mut TextPainter,
    layer: &TextLayer,
    index: usize,
    inputs: &FrameInputs<'_>,
) -> WaveclipResult<()> {
    let params = layer.anim_params();
    let color = Rgb8::from_hex_or_white(&layer.color);
    let mut glow_color = Rgb8::from_hex_or_white(&layer.shadow_color);
    let mut glow_blur = layer.shadow_blur;
    if inputs.playing && layer.animation == AnimationType::Neon {
        glow_color = color;
        glow_blur = neon_glow_blur(inputs.time, params.speed);
    }

    let m = layer_motion(layer.animation, params, inputs);
    let origin = layer_transform(layer.x, layer.y, 1.0, layer.rotation, m);
    let glow = (glow_blur > 0.0).then_some(Glow {
        color: glow_color.premul(1.0),
        blur: glow_blur,
        offset: Vec2::ZERO,
    });
    let opacity = unit_opacity(layer.opacity);
    let fill = color.premul(1.0);
    let (family, size) = (layer.font_family.as_str(), layer.font_size);

    match layer.animation {
        AnimationType::Wave => {
            let Some(whole) = painter.shape(&layer.text, family, size, TextAnchor::Middle)? else {
                return Ok(());
            };
            let mut cursor = -whole.width() / 2.0;
            let mut chars = Vec::with_capacity(layer.text.len());
            for (i, ch) in layer.text.chars().enumerate() {
                let mut buf = [0u8; 4];
                let Some(shaped) =
                    painter.shape(ch.encode_utf8(&mut buf), family, size, TextAnchor::Middle)?
                else {
                    continue;
                };
                let w = shaped.width();
                let dy = if inputs.playing {
                    wave_offset(inputs.time, params, i)
                } else {
                    0.0
                };
                chars.push((origin * Affine::translate((cursor + w / 2.0, dy)), shaped));
                cursor += w;
            }
            surface.pass(opacity, glow, |ctx| {
                for (at, shaped) in &chars {
                    shaped.draw(ctx, *at, fill, GlyphPaint::Fill);
                }
                Ok(())
            })
        }
        AnimationType::Glitch => {
            let Some(shaped) = painter.shape(&layer.text, family, size, TextAnchor::Middle)? else {
                return Ok(());
            };
            if inputs.playing
                && let Some(copies) = glitch_copies(inputs.seed, inputs.time, index, params.amp)
            {
                for (offset, tint) in [(copies.red, Rgb8::RED), (copies.cyan, Rgb8::CYAN)] {
                    fill_shaped(
                        surface,
                        &shaped,
                        origin * Affine::translate(offset),
                        tint.premul(1.0),
                        opacity * GLITCH_COPY_OPACITY,
                        glow,
                    )?;
                }
            }
            fill_shaped(surface, &shaped, origin, fill, opacity, glow)
        }
        AnimationType::Typewriter => {
            let shown = typewriter_visible(&layer.text, inputs.time, params.speed);
            if shown.is_empty() {
                return Ok(());
            }
            let Some(shaped) = painter.shape(shown, family, size, TextAnchor::Middle)? else {
                return Ok(());
            };
            fill_shaped(surface, &shaped, origin, fill, opacity, glow)
        }
        _ => {
            let Some(shaped) = painter.shape(&layer.text, family, size, TextAnchor::Middle)? else {
                return Ok(());
            };
            fill_shaped(surface, &shaped, origin, fill, opacity, glow)
        }
    }
}

fn draw_subtitles(
    surface: &mut Surface,
    painter: &mut TextPainter,
    canvas: Canvas,
    scene: &SceneRef<'_>,
    time: f64,
) -> WaveclipResult<()> {
    let style = scene.text_settings;
    let family = style.font_family.as_str();
    let width = f64::from(canvas.width);

    for slot in scene.subtitles.resolve(time, f64::from(canvas.height), style) {
        let size = slot.font_size;
        if slot.opacity <= MIN_SUBTITLE_OPACITY || !(size.is_finite() && size > 0.0) {
            continue;
        }
        let lines = wrap_words(&slot.text, width * SUBTITLE_WRAP_RATIO, |s| {
            painter.measure(s, family, size).unwrap_or(0.0)
        });
        let line_height = size * SUBTITLE_LINE_HEIGHT;
        let start_y = slot.y - lines.len().saturating_sub(1) as f64 * line_height;
        let opacity = slot.opacity as f32;
        let fill = slot.color.premul(1.0);

        let (outline, outline_color, shadow) = if slot.is_primary() {
            (
                GlyphPaint::Stroke((size * 0.125).max(2.0)),
                Rgba8Premul::OPAQUE_BLACK,
                Some(Glow {
                    color: Rgb8::BLACK.premul(0.8),
                    blur: 8.0,
                    offset: Vec2::new(3.0, 3.0),
                }),
            )
        } else {
            (
                GlyphPaint::Stroke((size * 0.1).max(2.0)),
                Rgb8::BLACK.premul(0.5),
                None,
            )
        };

        for (i, line) in lines.iter().enumerate() {
            let Some(shaped) = painter.shape(line, family, size, TextAnchor::Bottom)? else {
                return Ok(());
            };
            let at = Affine::translate((width / 2.0, start_y + i as f64 * line_height));
            surface.pass(opacity, None, |ctx| {
                shaped.draw(ctx, at, outline_color, outline);
                Ok(())
            })?;
            fill_shaped(surface, &shaped, at, fill, opacity, shadow)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
