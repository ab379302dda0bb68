use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{WaveclipError, WaveclipResult};

pub type PremulRgba8 = [u8; 4];

/// Source-over of premultiplied pixels with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> WaveclipResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(WaveclipError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Pixel-space rectangle, clipped to a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Grow by `pad` on every side, clipped to `width` x `height`.
    pub fn inflate(self, pad: u32, width: u32, height: u32) -> Self {
        let x0 = self.x.saturating_sub(pad);
        let y0 = self.y.saturating_sub(pad);
        let x1 = (self.x + self.w).saturating_add(pad).min(width);
        let y1 = (self.y + self.h).saturating_add(pad).min(height);
        Self {
            x: x0,
            y: y0,
            w: x1.saturating_sub(x0),
            h: y1.saturating_sub(y0),
        }
    }
}

/// Smallest rectangle containing every pixel with non-zero alpha.
pub fn alpha_bounds(src: &[u8], width: u32, height: u32) -> Option<PixelRect> {
    let (w, h) = (width as usize, height as usize);
    let (mut x0, mut y0, mut x1, mut y1) = (usize::MAX, usize::MAX, 0usize, 0usize);
    for y in 0..h {
        let row = &src[y * w * 4..(y + 1) * w * 4];
        for (x, px) in row.chunks_exact(4).enumerate() {
            if px[3] != 0 {
                x0 = x0.min(x);
                x1 = x1.max(x);
                y0 = y0.min(y);
                y1 = y1.max(y);
            }
        }
    }
    (x0 != usize::MAX).then(|| PixelRect {
        x: x0 as u32,
        y: y0 as u32,
        w: (x1 - x0 + 1) as u32,
        h: (y1 - y0 + 1) as u32,
    })
}

/// Copy `rect` out of `src` as a tight buffer where every pixel is `color` scaled by the source
/// alpha. This is the silhouette a canvas shadow is blurred from.
pub fn tinted_silhouette(src: &[u8], width: u32, rect: PixelRect, color: Rgba8Premul) -> Vec<u8> {
    let c = color.to_array();
    let mut out = Vec::with_capacity(rect.w as usize * rect.h as usize * 4);
    for y in rect.y..rect.y + rect.h {
        let start = ((y * width + rect.x) * 4) as usize;
        let row = &src[start..start + rect.w as usize * 4];
        for px in row.chunks_exact(4) {
            let a = u16::from(px[3]);
            out.extend(c.iter().map(|&v| mul_div255(u16::from(v), a)));
        }
    }
    out
}

/// Composite a `src_w` x `src_h` buffer over `dst` with its top-left at (`x`, `y`).
///
/// Parts falling outside `dst` are dropped.
#[allow(clippy::too_many_arguments)]
pub fn over_at(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    x: i64,
    y: i64,
    opacity: f32,
) {
    for sy in 0..i64::from(src_h) {
        let dy = y + sy;
        if dy < 0 || dy >= i64::from(dst_h) {
            continue;
        }
        for sx in 0..i64::from(src_w) {
            let dx = x + sx;
            if dx < 0 || dx >= i64::from(dst_w) {
                continue;
            }
            let si = ((sy * i64::from(src_w) + sx) * 4) as usize;
            if src[si + 3] == 0 {
                continue;
            }
            let di = ((dy * i64::from(dst_w) + dx) * 4) as usize;
            let out = over(
                [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]],
                [src[si], src[si + 1], src[si + 2], src[si + 3]],
                opacity,
            );
            dst[di..di + 4].copy_from_slice(&out);
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    crate::foundation::math::mul_div255(x, y) as u8
}
