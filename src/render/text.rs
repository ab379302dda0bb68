use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use crate::foundation::core::{Affine, Rgba8Premul};
use crate::foundation::error::{WaveclipError, WaveclipResult};
use crate::render::surface::affine_to_cpu;

/// Brush type for Parley layouts; paint is chosen at draw time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush;

/// Vertical anchor of a line relative to the draw origin, like canvas `textBaseline`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// Middle of the em box at y = 0.
    Middle,
    /// Bottom of the em box at y = 0.
    Bottom,
}

/// Fill or outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlyphPaint {
    Fill,
    /// Round-joined outline of the given width.
    Stroke(f64),
}

struct FontFace {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Registered fonts plus the Parley contexts used to shape with them.
///
/// Family lookup takes a CSS-like list (`"Impact, sans-serif"`) and returns the first registered
/// entry; unknown lists fall back to the first font registered.
pub struct TextPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    faces: Vec<FontFace>,
    by_alias: BTreeMap<String, usize>,
    warned_no_fonts: bool,
}

impl Default for TextPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPainter")
            .field("aliases", &self.by_alias.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TextPainter {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: Vec::new(),
            by_alias: BTreeMap::new(),
            warned_no_fonts: false,
        }
    }

    pub fn has_fonts(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Register font bytes under `alias` (matched case-insensitively against CSS family lists).
    ///
    /// Returns the family name found in the font.
    pub fn register_font_bytes(&mut self, alias: &str, bytes: Vec<u8>) -> WaveclipResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            WaveclipError::validation(format!("no font families found for '{alias}'"))
        })?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| WaveclipError::validation("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        self.faces.push(FontFace {
            family: family.clone(),
            data,
        });
        let idx = self.faces.len() - 1;
        self.by_alias.insert(alias.trim().to_ascii_lowercase(), idx);
        self.by_alias
            .entry(family.to_ascii_lowercase())
            .or_insert(idx);
        tracing::debug!(alias, family = %family, "font registered");
        Ok(family)
    }

    pub fn register_font_file(&mut self, alias: &str, path: &Path) -> WaveclipResult<String> {
        let bytes = std::fs::read(path).map_err(|e| {
            WaveclipError::media(format!("failed to read font '{}': {e}", path.display()))
        })?;
        self.register_font_bytes(alias, bytes)
    }

    fn resolve(&self, css_families: &str) -> Option<usize> {
        css_families
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase())
            .find_map(|f| self.by_alias.get(&f).copied())
            .or(if self.faces.is_empty() { None } else { Some(0) })
    }

    /// Shape one line of text. `None` when no fonts are registered.
    pub fn shape(
        &mut self,
        text: &str,
        css_families: &str,
        size_px: f64,
        anchor: TextAnchor,
    ) -> WaveclipResult<Option<ShapedText>> {
        let size = size_px as f32;
        if !size.is_finite() || size <= 0.0 {
            return Err(WaveclipError::validation(
                "text size must be finite and > 0",
            ));
        }
        let Some(face_idx) = self.resolve(css_families) else {
            if !self.warned_no_fonts {
                tracing::warn!("no fonts registered; text is not drawn");
                self.warned_no_fonts = true;
            }
            return Ok(None);
        };
        let face = &self.faces[face_idx];

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);

        let (baseline, ascent, descent) = layout
            .lines()
            .next()
            .map(|l| {
                let m = l.metrics();
                (m.baseline, m.ascent, m.descent)
            })
            .unwrap_or((size, size * 0.8, size * 0.2));
        let dy = match anchor {
            TextAnchor::Middle => -(baseline - (ascent - descent) / 2.0),
            TextAnchor::Bottom => -(baseline + descent),
        };

        Ok(Some(ShapedText {
            width: f64::from(layout.width()),
            dy: f64::from(dy),
            layout,
            font: face.data.clone(),
        }))
    }

    /// Advance width of `text`, or 0 without fonts.
    pub fn measure(&mut self, text: &str, css_families: &str, size_px: f64) -> WaveclipResult<f64> {
        Ok(self
            .shape(text, css_families, size_px, TextAnchor::Middle)?
            .map_or(0.0, |s| s.width()))
    }
}

/// A shaped single line, horizontally centered on its origin.
pub struct ShapedText {
    layout: parley::Layout<TextBrush>,
    font: vello_cpu::peniko::FontData,
    width: f64,
    dy: f64,
}

impl ShapedText {
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Draw centered at the origin of `transform`.
    pub fn draw(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        transform: Affine,
        color: Rgba8Premul,
        paint: GlyphPaint,
    ) {
        let local = transform * Affine::translate((-self.width / 2.0, self.dy));
        ctx.set_transform(affine_to_cpu(local));
        ctx.set_paint(premul_to_color(color));
        if let GlyphPaint::Stroke(w) = paint {
            ctx.set_stroke(
                vello_cpu::kurbo::Stroke::new(w).with_join(vello_cpu::kurbo::Join::Round),
            );
        }
        for line in self.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                let builder = ctx
                    .glyph_run(&self.font)
                    .font_size(run.run().font_size());
                match paint {
                    GlyphPaint::Fill => builder.fill_glyphs(glyphs),
                    GlyphPaint::Stroke(_) => builder.stroke_glyphs(glyphs),
                }
            }
        }
    }
}

/// vello_cpu paints take straight-alpha colors.
pub(crate) fn premul_to_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    if c.a == 0 {
        return vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 0);
    }
    let un = |v: u8| ((u16::from(v) * 255 + u16::from(c.a) / 2) / u16::from(c.a)).min(255) as u8;
    vello_cpu::peniko::Color::from_rgba8(un(c.r), un(c.g), un(c.b), c.a)
}
