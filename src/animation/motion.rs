use crate::foundation::core::Vec2;
use crate::foundation::math::unit_noise;

/// Per-layer animation kind.
///
/// Transform kinds (`spin` .. `beat-zoom`) move the whole layer. The kinetic typography kinds
/// (`typewriter`, `glitch`, `wave`, `neon`) change how text is painted and are ignored by image
/// layers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationType {
    #[default]
    None,
    Spin,
    FloatV,
    FloatH,
    Pulse,
    Wiggle,
    Typewriter,
    Glitch,
    Wave,
    Neon,
    BeatZoom,
}

/// Speed/amplitude pair after applying the editor's fallbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimParams {
    pub speed: f64,
    pub amp: f64,
}

impl AnimParams {
    pub const DEFAULT_SPEED: f64 = 1.0;
    pub const DEFAULT_AMP: f64 = 20.0;

    /// Zero or non-finite values fall back to speed 1 / amplitude 20.
    pub fn effective(speed: f64, amp: f64) -> Self {
        let pick = |v: f64, fallback: f64| {
            if v == 0.0 || !v.is_finite() {
                fallback
            } else {
                v
            }
        };
        Self {
            speed: pick(speed, Self::DEFAULT_SPEED),
            amp: pick(amp, Self::DEFAULT_AMP),
        }
    }
}

/// Transform delta produced by an animation for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Added to the layer position (pixels).
    pub offset: Vec2,
    /// Multiplies the layer scale.
    pub scale: f64,
    /// Added to the layer rotation (radians).
    pub rotation: f64,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl AnimationType {
    /// Whole-layer transform at `time` seconds.
    ///
    /// `beat_scale` is the per-frame bass signal (1.0 when silent or paused).
    pub fn motion(self, time: f64, p: AnimParams, beat_scale: f64) -> Motion {
        let mut m = Motion::default();
        match self {
            Self::Spin => m.rotation = time * p.speed,
            Self::FloatV => m.offset.y = (time * p.speed * 2.0).sin() * p.amp,
            Self::FloatH => m.offset.x = (time * p.speed * 2.0).sin() * p.amp,
            Self::Pulse => m.scale = 1.0 + (time * p.speed * 3.0).sin() * 0.01 * p.amp,
            Self::Wiggle => m.rotation = (time * p.speed * 15.0).sin() * (p.amp * 0.005),
            Self::BeatZoom => m.scale = 1.0 + (beat_scale - 1.0) * p.speed * (p.amp / 50.0),
            Self::None | Self::Typewriter | Self::Glitch | Self::Wave | Self::Neon => {}
        }
        m
    }
}

/// Characters revealed per second at speed 1.
const TYPEWRITER_CPS: f64 = 10.0;
/// Hold time after the full string is revealed, before the loop restarts.
const TYPEWRITER_PAUSE_S: f64 = 2.0;

/// Loop length for the typewriter reveal of `char_count` characters.
pub fn typewriter_loop_duration(char_count: usize, speed: f64) -> f64 {
    char_count as f64 / (TYPEWRITER_CPS * speed) + TYPEWRITER_PAUSE_S
}

/// Visible prefix of `text` at `time` for the looping typewriter reveal.
pub fn typewriter_visible(text: &str, time: f64, speed: f64) -> &str {
    let char_count = text.chars().count();
    let loop_s = typewriter_loop_duration(char_count, speed);
    let cycle = time.rem_euclid(loop_s);
    let shown = (cycle * TYPEWRITER_CPS * speed).floor().max(0.0) as usize;
    match text.char_indices().nth(shown) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Vertical offset of character `index` for the wave text effect.
pub fn wave_offset(time: f64, p: AnimParams, index: usize) -> f64 {
    ((time * p.speed * 5.0) + (index as f64 * 0.5)).sin() * p.amp
}

/// Glow blur radius for the neon effect.
pub fn neon_glow_blur(time: f64, speed: f64) -> f64 {
    20.0 + (time * speed * 10.0).sin() * 15.0
}

/// Offsets of the red and cyan ghost copies drawn on a glitch frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlitchCopies {
    pub red: Vec2,
    pub cyan: Vec2,
}

const GLITCH_TRIGGER: f64 = 0.85;

/// Roll the glitch effect for one layer on one frame.
///
/// Fires with probability ~0.15. Offsets are uniform in `[-amp/2, amp/2)` on each axis.
pub fn glitch_copies(seed: u64, time: f64, layer_index: usize, amp: f64) -> Option<GlitchCopies> {
    let t = time.to_bits();
    let layer = layer_index as u64;
    let roll = |salt: u64| unit_noise(seed, &[t, layer, salt]);
    if roll(0) <= GLITCH_TRIGGER {
        return None;
    }
    let offset = |sx: u64, sy: u64| Vec2::new((roll(sx) - 0.5) * amp, (roll(sy) - 0.5) * amp);
    Some(GlitchCopies {
        red: offset(1, 2),
        cyan: offset(3, 4),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/animation/motion.rs"]
mod tests;
