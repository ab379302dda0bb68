use serde::Deserialize as _;

use crate::subtitle::timeline::Subtitle;

/// Fallback length for lines whose end is missing or not after the start.
pub const FALLBACK_DURATION_S: f64 = 3.0;
/// Lines longer than this are considered runaway.
pub const MAX_DURATION_S: f64 = 12.0;
/// Replacement length for runaway lines.
pub const CAPPED_DURATION_S: f64 = 5.0;
/// Gaps shorter than this are closed by extending the earlier line.
pub const GAP_FILL_S: f64 = 1.0;

/// Untrusted subtitle entry as produced by a generator.
///
/// Times accept numbers or numeric strings; anything else, infinities included, reads as NaN.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubtitle {
    #[serde(default)]
    pub text: String,
    #[serde(default = "nan", deserialize_with = "lenient_seconds")]
    pub start_time: f64,
    #[serde(default = "nan", deserialize_with = "lenient_seconds")]
    pub end_time: f64,
}

fn nan() -> f64 {
    f64::NAN
}

fn lenient_seconds<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    let secs = match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(secs.filter(|t| t.is_finite()).unwrap_or(f64::NAN))
}

/// Parse a generator's JSON array output.
pub fn parse_raw(json: &str) -> serde_json::Result<Vec<RawSubtitle>> {
    serde_json::from_str(json)
}

/// Repair generated timings. No line is dropped.
///
/// - NaN start becomes 0.
/// - NaN end, or end <= start, becomes start + 3.
/// - Lines longer than 12 s are cut to 5 s.
/// - Entries are sorted by start (stable).
/// - A positive gap under 1 s to the next line is closed by moving this line's end.
pub fn sanitize(raw: Vec<RawSubtitle>) -> Vec<Subtitle> {
    let mut subs: Vec<Subtitle> = raw
        .into_iter()
        .map(|r| {
            let start = if r.start_time.is_nan() {
                0.0
            } else {
                r.start_time
            };
            let mut end = r.end_time;
            if end.is_nan() || end <= start {
                end = start + FALLBACK_DURATION_S;
            }
            if end - start > MAX_DURATION_S {
                end = start + CAPPED_DURATION_S;
            }
            Subtitle::new(start, end, r.text)
        })
        .collect();

    subs.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    for i in 1..subs.len() {
        let next_start = subs[i].start_time;
        let cur = &mut subs[i - 1];
        let gap = next_start - cur.end_time;
        if gap > 0.0 && gap < GAP_FILL_S {
            cur.end_time = next_start;
        }
    }

    tracing::debug!(count = subs.len(), "subtitles sanitized");
    subs
}

#[cfg(test)]
#[path = "../../tests/unit/subtitle/sanitize.rs"]
mod tests;
