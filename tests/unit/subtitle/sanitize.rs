use super::*;

fn raw(start: f64, end: f64, text: &str) -> RawSubtitle {
    RawSubtitle {
        text: text.to_string(),
        start_time: start,
        end_time: end,
    }
}

#[test]
fn nan_start_clamps_to_zero() {
    let out = sanitize(vec![raw(f64::NAN, 2.0, "x")]);
    assert_eq!(out[0].start_time, 0.0);
    assert_eq!(out[0].end_time, 2.0);
}

#[test]
fn bad_end_falls_back_to_three_seconds() {
    let out = sanitize(vec![raw(4.0, 4.0, "eq"), raw(10.0, f64::NAN, "nan"), raw(20.0, 1.0, "rev")]);
    assert_eq!(out[0].end_time, 7.0);
    assert_eq!(out[1].end_time, 13.0);
    assert_eq!(out[2].end_time, 23.0);
}

#[test]
fn runaway_lines_are_capped_to_five_seconds() {
    let out = sanitize(vec![raw(1.0, 13.5, "long"), raw(30.0, 42.0, "edge")]);
    assert_eq!(out[0].end_time, 6.0);
    // Exactly 12 s is kept.
    assert_eq!(out[1].end_time, 42.0);
}

#[test]
fn output_is_sorted_and_small_gaps_closed() {
    let out = sanitize(vec![
        raw(5.0, 7.0, "c"),
        raw(0.0, 2.0, "a"),
        raw(2.5, 4.0, "b"),
    ]);
    let texts: Vec<_> = out.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, ["a", "b", "c"]);
    assert_eq!(out[0].end_time, 2.5);
    // Gap of exactly 1 s stays open.
    assert_eq!(out[1].end_time, 4.0);
    for pair in out.windows(2) {
        assert!(pair[0].start_time <= pair[1].start_time);
    }
}

#[test]
fn overlaps_are_left_alone() {
    let out = sanitize(vec![raw(0.0, 3.0, "a"), raw(2.0, 4.0, "b")]);
    assert_eq!(out[0].end_time, 3.0);
}

#[test]
fn lenient_json_fields() {
    let json = r#"[
        {"text": "num", "startTime": 1, "endTime": 2},
        {"text": "str", "startTime": " 3.5 ", "endTime": "4"},
        {"text": "null", "startTime": null},
        {"startTime": "abc", "endTime": true}
    ]"#;
    let raw = parse_raw(json).unwrap();
    assert_eq!(raw[0].start_time, 1.0);
    assert_eq!(raw[1].start_time, 3.5);
    assert_eq!(raw[1].end_time, 4.0);
    assert!(raw[2].start_time.is_nan());
    assert!(raw[2].end_time.is_nan());
    assert!(raw[3].start_time.is_nan());
    assert_eq!(raw[3].text, "");

    let clean = sanitize(raw);
    assert_eq!(clean.len(), 4);
    assert!(clean.iter().all(|s| s.end_time > s.start_time));
}

#[test]
fn infinite_times_are_repaired_like_missing_ones() {
    let raw = parse_raw(
        r#"[{"text":"inf","startTime":"inf","endTime":"1e999"},
            {"text":"neg","startTime":"5","endTime":"-infinity"}]"#,
    )
    .unwrap();
    assert!(raw[0].start_time.is_nan());
    assert!(raw[0].end_time.is_nan());
    assert!(raw[1].end_time.is_nan());

    let out = sanitize(raw);
    assert_eq!((out[0].start_time, out[0].end_time), (0.0, 3.0));
    assert_eq!((out[1].start_time, out[1].end_time), (5.0, 8.0));
    let json = serde_json::to_string(&out).unwrap();
    assert!(!json.contains("null"), "{json}");
}
