use crate::animation::ease::Ease;
use crate::foundation::core::Rgb8;
use crate::foundation::math::lerp;
use crate::scene::model::TextSettings;

/// One timed karaoke line. Times are in seconds, before the global offset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtitle {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

impl Subtitle {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
        }
    }
}

/// Lines stay matched for this long after their end.
pub const GRACE_S: f64 = 1.0;
/// Length of the slide between slots, anchored to the active line's start.
pub const TRANSITION_S: f64 = 0.5;
/// The upcoming line is previewed only when it starts within this gap.
pub const NEXT_PREVIEW_GAP_S: f64 = 15.0;

const SLOT_EXIT_FROM_BOTTOM: f64 = 350.0;
const SLOT_PREV_FROM_BOTTOM: f64 = 260.0;
const SLOT_PRIMARY_FROM_BOTTOM: f64 = 160.0;
const SLOT_NEXT_FROM_BOTTOM: f64 = 80.0;
const NEXT_SLIDE_IN: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotRole {
    Active,
    Previous,
    Exiting,
    Next,
}

/// A resolved line to paint this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SubtitleSlot {
    pub role: SlotRole,
    pub text: String,
    /// Bottom baseline of the last wrapped line, in canvas pixels.
    pub y: f64,
    pub font_size: f64,
    pub color: Rgb8,
    pub opacity: f64,
}

impl SubtitleSlot {
    /// Only the active line gets the heavy outline and drop shadow.
    pub fn is_primary(&self) -> bool {
        self.role == SlotRole::Active
    }
}

/// Sorted subtitle entries plus a global display offset.
///
/// The offset is applied on lookup only; stored entries never change when it moves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubtitleTimeline {
    entries: Vec<Subtitle>,
    offset: f64,
}

impl SubtitleTimeline {
    pub fn new(mut entries: Vec<Subtitle>, offset: f64) -> Self {
        entries.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Self { entries, offset }
    }

    pub fn entries(&self) -> &[Subtitle] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = if offset.is_finite() { offset } else { 0.0 };
    }

    /// Replace all entries (sorted by start) and reset the offset.
    pub fn replace(&mut self, entries: Vec<Subtitle>) {
        *self = Self::new(entries, 0.0);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Entry `i` with the offset applied.
    pub fn shifted(&self, i: usize) -> Option<Subtitle> {
        self.entries.get(i).map(|s| Subtitle {
            start_time: s.start_time + self.offset,
            end_time: s.end_time + self.offset,
            text: s.text.clone(),
        })
    }

    /// Edit entry `i` in place. Order is not re-established.
    pub fn update_entry(&mut self, i: usize, f: impl FnOnce(&mut Subtitle)) -> bool {
        match self.entries.get_mut(i) {
            Some(s) => {
                f(s);
                true
            }
            None => false,
        }
    }

    /// Tap-to-sync: line `i` starts now for five seconds and the previous line ends now.
    pub fn tap_sync(&mut self, i: usize, now: f64) -> bool {
        if i >= self.entries.len() {
            return false;
        }
        self.entries[i].start_time = now;
        self.entries[i].end_time = now + 5.0;
        if i > 0 {
            self.entries[i - 1].end_time = now;
        }
        true
    }

    /// Latest end time with the offset applied, if any entries exist.
    pub fn max_end(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|s| s.end_time + self.offset)
            .reduce(f64::max)
    }

    /// Index of the line shown as primary at time `t`.
    ///
    /// Among lines whose `[start, end + 1s]` window (offset applied) contains `t`, the one with
    /// the latest start wins; the earliest index wins on equal starts.
    pub fn active_index(&self, t: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, s) in self.entries.iter().enumerate() {
            let start = s.start_time + self.offset;
            let end = s.end_time + self.offset;
            let contains = t >= start && t <= end + GRACE_S;
            if contains && best.is_none_or(|(_, max_start)| s.start_time > max_start) {
                best = Some((i, s.start_time));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Lines to paint at time `t`, in paint order.
    pub fn resolve(&self, t: f64, canvas_height: f64, style: &TextSettings) -> Vec<SubtitleSlot> {
        let Some(active) = self.active_index(t) else {
            return Vec::new();
        };
        let cur = &self.entries[active];

        let exit_y = canvas_height - SLOT_EXIT_FROM_BOTTOM;
        let prev_y = canvas_height - SLOT_PREV_FROM_BOTTOM;
        let primary_y = canvas_height - SLOT_PRIMARY_FROM_BOTTOM;
        let next_y = canvas_height - SLOT_NEXT_FROM_BOTTOM;

        let since = t - (cur.start_time + self.offset);
        let transitioning = since < TRANSITION_S;
        let k = if transitioning {
            Ease::OutCubic.apply(since / TRANSITION_S)
        } else {
            1.0
        };

        let primary_color = Rgb8::from_hex_or_white(&style.primary_color);
        let secondary_color = Rgb8::from_hex_or_white(&style.secondary_color);
        let primary_size = style.primary_font_size;
        let secondary_size = style.secondary_font_size;

        let mut out = Vec::with_capacity(4);
        out.push(SubtitleSlot {
            role: SlotRole::Active,
            text: cur.text.clone(),
            y: lerp(next_y, primary_y, k),
            font_size: lerp(secondary_size, primary_size, k),
            color: secondary_color.lerp(primary_color, k),
            opacity: 1.0,
        });

        if active > 0 {
            out.push(SubtitleSlot {
                role: SlotRole::Previous,
                text: self.entries[active - 1].text.clone(),
                y: lerp(primary_y, prev_y, k),
                font_size: lerp(primary_size, secondary_size, k),
                color: primary_color.lerp(secondary_color, k),
                opacity: 1.0,
            });
        }

        if active > 1 && transitioning {
            out.push(SubtitleSlot {
                role: SlotRole::Exiting,
                text: self.entries[active - 2].text.clone(),
                y: lerp(prev_y, exit_y, k),
                font_size: secondary_size,
                color: secondary_color,
                opacity: lerp(1.0, 0.0, k),
            });
        }

        if let Some(next) = self.entries.get(active + 1)
            && next.start_time - cur.end_time < NEXT_PREVIEW_GAP_S
        {
            out.push(SubtitleSlot {
                role: SlotRole::Next,
                text: next.text.clone(),
                y: lerp(next_y + NEXT_SLIDE_IN, next_y, k),
                font_size: secondary_size,
                color: secondary_color,
                opacity: lerp(0.0, 1.0, k),
            });
        }

        out
    }
}

/// Greedy word wrap. Each line keeps the trailing space used while measuring.
///
/// A single word wider than `max_width` stays on its own line.
pub fn wrap_words(text: &str, max_width: f64, mut measure: impl FnMut(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for (n, word) in text.split(' ').enumerate() {
        let test = format!("{line}{word} ");
        if n > 0 && measure(&test) > max_width {
            lines.push(std::mem::take(&mut line));
            line = format!("{word} ");
        } else {
            line = test;
        }
    }
    lines.push(line);
    lines
}

/// Playback ceiling: the audio length, or the last subtitle end plus one second if that is later.
pub fn total_duration(audio_duration: f64, timeline: &SubtitleTimeline) -> f64 {
    let audio = if audio_duration.is_finite() {
        audio_duration.max(0.0)
    } else {
        0.0
    };
    match timeline.max_end() {
        Some(end) if end > audio => end + GRACE_S,
        _ => audio,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/subtitle/timeline.rs"]
mod tests;
