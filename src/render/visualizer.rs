use std::f64::consts::{FRAC_PI_2, TAU};

use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rgb8, Vec2};
use crate::foundation::error::WaveclipResult;
use crate::render::surface::{Glow, Surface, affine_to_cpu, bezpath_to_cpu};
use crate::render::text::premul_to_color;
use crate::scene::model::{VisualizerKind, VisualizerSettings};

/// Logical width shared by the bar and wave styles.
const SPAN: f64 = 800.0;
const BAR_BASE_HEIGHT: f64 = 25.0;
const BAR_DYNAMIC_HEIGHT: f64 = 180.0;
const DEFAULT_BARS: u32 = 40;
const RING_RADIUS: f64 = 90.0;
const RING_SPOKE_LENGTH: f64 = 150.0;
const RING_MIN_SPOKE: f64 = 4.0;
const DEFAULT_SPOKES: u32 = 64;
const WAVE_LINE_WIDTH: f64 = 3.0;
const WAVE_AMPLITUDE: f64 = 100.0;

/// Only the low 75% of the spectrum is used by bars and spokes.
fn usable_len(bins: usize) -> usize {
    (bins as f64 * 0.75).floor() as usize
}

/// One bar in logical units, centered vertically on y = 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub radius: f64,
}

pub fn bar_geometry(bins: &[u8], s: &VisualizerSettings) -> Vec<Bar> {
    let count = if s.bar_count == 0 {
        DEFAULT_BARS
    } else {
        s.bar_count
    };
    let n = f64::from(count);
    let slot = SPAN / n;
    let width = slot * (1.0 - s.gap);
    let step = usable_len(bins.len()) as f64 / n;
    (0..count)
        .map(|i| {
            let fi = f64::from(i);
            let start = (fi * step).floor() as usize;
            let end = ((fi + 1.0) * step).floor() as usize;
            let range = bins.get(start..end.min(bins.len())).unwrap_or(&[]);
            let avg = if range.is_empty() {
                0.0
            } else {
                range.iter().map(|&b| f64::from(b)).sum::<f64>() / range.len() as f64
            };
            let boosted = (avg * (1.0 + (fi / n) * 1.5)).min(255.0);
            let height = BAR_BASE_HEIGHT + (boosted / 255.0) * s.sensitivity * BAR_DYNAMIC_HEIGHT;
            Bar {
                x: -SPAN / 2.0 + fi * slot + (slot - width) / 2.0,
                width,
                height,
                radius: s.roundness.max(0.0).min(width / 2.0).min(height / 2.0),
            }
        })
        .collect()
}

/// One radial spoke as a line segment from the ring outward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spoke {
    pub from: Point,
    pub to: Point,
}

/// Spokes plus the shared stroke width.
pub fn ring_geometry(bins: &[u8], s: &VisualizerSettings) -> (Vec<Spoke>, f64) {
    let count = if s.bar_count == 0 {
        DEFAULT_SPOKES
    } else {
        s.bar_count
    };
    let n = f64::from(count);
    let gap = if s.gap == 0.0 { 0.3 } else { s.gap };
    let width = (TAU * RING_RADIUS / n * (1.0 - gap)).max(2.0);
    let step = usable_len(bins.len()) as f64 / n;
    let spokes = (0..count)
        .map(|i| {
            let fi = f64::from(i);
            let angle = fi / n * TAU - FRAC_PI_2;
            let value = bins
                .get((fi * step).floor() as usize)
                .copied()
                .map_or(0.0, f64::from);
            let amp = (value * (1.0 + (fi / n) * 0.5)).min(255.0);
            let h = ((amp / 255.0) * RING_SPOKE_LENGTH * s.sensitivity).max(RING_MIN_SPOKE);
            let (sin, cos) = angle.sin_cos();
            Spoke {
                from: Point::new(cos * RING_RADIUS, sin * RING_RADIUS),
                to: Point::new(cos * (RING_RADIUS + h), sin * (RING_RADIUS + h)),
            }
        })
        .collect();
    (spokes, width)
}

/// Polyline across the span, one vertex per bin.
pub fn wave_path(bins: &[u8], sensitivity: f64) -> BezPath {
    let mut path = BezPath::new();
    if bins.is_empty() {
        return path;
    }
    let slice = SPAN / bins.len() as f64;
    for (i, &b) in bins.iter().enumerate() {
        let x = -SPAN / 2.0 + i as f64 * slice;
        let y = (f64::from(b) / 128.0 - 1.0) * WAVE_AMPLITUDE * sensitivity;
        if i == 0 {
            path.move_to((x, y));
        } else {
            path.line_to((x, y));
        }
    }
    path
}

/// Draw the spectrum visualizer in one pass.
pub fn draw(
    surface: &mut Surface,
    canvas: Canvas,
    bins: &[u8],
    s: &VisualizerSettings,
) -> WaveclipResult<()> {
    let color = Rgb8::from_hex_or_white(&s.bar_color);
    let scale = if s.scale == 0.0 { 1.0 } else { s.scale };
    let origin = Affine::translate((
        s.x / 100.0 * f64::from(canvas.width),
        s.y / 100.0 * f64::from(canvas.height),
    )) * Affine::scale(scale);
    let glow = (s.shadow_blur > 0.0).then(|| Glow {
        color: color.premul(1.0),
        blur: s.shadow_blur,
        offset: Vec2::ZERO,
    });
    let paint = premul_to_color(color.premul(1.0));

    surface.pass(s.fill_alpha.clamp(0.0, 1.0) as f32, glow, |ctx| {
        ctx.set_transform(affine_to_cpu(origin));
        ctx.set_paint(paint);
        match s.kind {
            VisualizerKind::Bars => {
                for bar in bar_geometry(bins, s) {
                    let rr = kurbo::RoundedRect::new(
                        bar.x,
                        -bar.height / 2.0,
                        bar.x + bar.width,
                        bar.height / 2.0,
                        bar.radius,
                    );
                    let p = bezpath_to_cpu(&kurbo::Shape::to_path(&rr, 0.1));
                    ctx.fill_path(&p);
                }
            }
            VisualizerKind::Circular => {
                let (spokes, width) = ring_geometry(bins, s);
                let mut path = BezPath::new();
                for sp in spokes {
                    path.move_to(sp.from);
                    path.line_to(sp.to);
                }
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(width).with_caps(vello_cpu::kurbo::Cap::Round),
                );
                ctx.stroke_path(&bezpath_to_cpu(&path));
            }
            VisualizerKind::Wave => {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(WAVE_LINE_WIDTH));
                ctx.stroke_path(&bezpath_to_cpu(&wave_path(bins, s.sensitivity)));
            }
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/visualizer.rs"]
mod tests;
