use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{WaveclipError, WaveclipResult};

/// A decoded image ready to be used as a vello_cpu paint.
#[derive(Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub paint: vello_cpu::Image,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

pub fn decode_bitmap(bytes: &[u8]) -> WaveclipResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    let pixmap = premul_bytes_to_pixmap(&rgba8_premul, width, height)?;

    Ok(Bitmap {
        width,
        height,
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> WaveclipResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| WaveclipError::media("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| WaveclipError::media("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(WaveclipError::media("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Decoded bitmaps keyed by source path.
///
/// A source that fails to load is remembered as missing, so the warning is logged once and the
/// layer is skipped on every later frame.
#[derive(Debug, Default)]
pub struct BitmapCache {
    entries: HashMap<PathBuf, Option<Bitmap>>,
}

impl BitmapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Option<&Bitmap> {
        self.entries
            .entry(path.to_path_buf())
            .or_insert_with(|| match load_bitmap(path) {
                Ok(bitmap) => {
                    tracing::debug!(
                        path = %path.display(),
                        width = bitmap.width,
                        height = bitmap.height,
                        "image loaded"
                    );
                    Some(bitmap)
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "image failed to load; layer skipped"
                    );
                    None
                }
            })
            .as_ref()
    }

    /// Insert an already decoded bitmap, e.g. from memory.
    pub fn insert(&mut self, path: impl Into<PathBuf>, bitmap: Bitmap) {
        self.entries.insert(path.into(), Some(bitmap));
    }

    pub fn forget(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_bitmap(path: &Path) -> WaveclipResult<Bitmap> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_bitmap(&bytes)
}
