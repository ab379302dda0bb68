use crate::foundation::core::{Affine, BezPath, Canvas, Rgba8Premul, Vec2};
use crate::foundation::error::{WaveclipError, WaveclipResult};
use crate::render::blur::{blur_rgba8_premul, shadow_kernel};
use crate::render::composite::{alpha_bounds, over_at, over_in_place, tinted_silhouette};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

/// Canvas-style shadow drawn beneath a pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub color: Rgba8Premul,
    /// `shadowBlur` in pixels.
    pub blur: f64,
    pub offset: Vec2,
}

/// Frame being built plus the scratch pixmap passes render into.
///
/// Each pass draws into a transparent scratch pixmap which is then composited over the frame,
/// so pass opacity and shadows behave like canvas `globalAlpha` and `shadowBlur`.
pub struct Surface {
    width: u16,
    height: u16,
    frame: Vec<u8>,
    scratch: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Surface {
    pub fn new(canvas: Canvas) -> WaveclipResult<Self> {
        canvas.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| WaveclipError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| WaveclipError::render("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            frame: vec![0; usize::from(width) * usize::from(height) * 4],
            scratch: vello_cpu::Pixmap::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub fn clear(&mut self, px: Rgba8Premul) {
        let px = px.to_array();
        for d in self.frame.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Composite a flat color over the whole frame.
    pub fn fill_overlay(&mut self, color: Rgba8Premul, opacity: f32) {
        let src = color.to_array();
        for d in self.frame.chunks_exact_mut(4) {
            let out = crate::render::composite::over([d[0], d[1], d[2], d[3]], src, opacity);
            d.copy_from_slice(&out);
        }
    }

    /// Run one drawing pass and composite it with `opacity`, optionally over a shadow.
    pub fn pass(
        &mut self,
        opacity: f32,
        glow: Option<Glow>,
        draw: impl FnOnce(&mut vello_cpu::RenderContext) -> WaveclipResult<()>,
    ) -> WaveclipResult<()> {
        if opacity <= 0.0 {
            return Ok(());
        }
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        draw(&mut ctx)?;
        ctx.flush();
        self.scratch.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut self.scratch);

        if let Some(glow) = glow {
            self.composite_shadow(glow, opacity)?;
        }
        over_in_place(&mut self.frame, self.scratch.data_as_u8_slice(), opacity)
    }

    fn composite_shadow(&mut self, glow: Glow, opacity: f32) -> WaveclipResult<()> {
        let Some((radius, sigma)) = shadow_kernel(glow.blur) else {
            if glow.offset == Vec2::ZERO || glow.color.a == 0 {
                return Ok(());
            }
            // Hard shadow: offset silhouette with no blur.
            return self.place_shadow(glow, 0, 1.0, opacity);
        };
        if glow.color.a == 0 {
            return Ok(());
        }
        self.place_shadow(glow, radius, sigma, opacity)
    }

    fn place_shadow(&mut self, glow: Glow, radius: u32, sigma: f32, opacity: f32) -> WaveclipResult<()> {
        let (w, h) = (self.width(), self.height());
        let src = self.scratch.data_as_u8_slice();
        let Some(bounds) = alpha_bounds(src, w, h) else {
            return Ok(());
        };
        let rect = bounds.inflate(radius, w, h);
        let silhouette = tinted_silhouette(src, w, rect, glow.color);
        let blurred = blur_rgba8_premul(&silhouette, rect.w, rect.h, radius, sigma)?;
        over_at(
            &mut self.frame,
            w,
            h,
            &blurred,
            rect.w,
            rect.h,
            i64::from(rect.x) + glow.offset.x.round() as i64,
            i64::from(rect.y) + glow.offset.y.round() as i64,
            opacity,
        );
        Ok(())
    }

    pub fn pixels(&self) -> &[u8] {
        &self.frame
    }

    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.frame.clone(),
            premultiplied: true,
        }
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let p = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(a) => out.move_to(p(a)),
            PathEl::LineTo(a) => out.line_to(p(a)),
            PathEl::QuadTo(a, b) => out.quad_to(p(a), p(b)),
            PathEl::CurveTo(a, b, c) => out.curve_to(p(a), p(b), p(c)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
