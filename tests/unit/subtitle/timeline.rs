use super::*;

fn ab() -> SubtitleTimeline {
    SubtitleTimeline::new(
        vec![Subtitle::new(0.0, 5.0, "a"), Subtitle::new(5.0, 10.0, "b")],
        0.0,
    )
}

fn style() -> TextSettings {
    TextSettings::default()
}

#[test]
fn active_index_prefers_latest_start_with_grace() {
    let tl = ab();
    assert_eq!(tl.active_index(7.0), Some(1));
    assert_eq!(tl.active_index(5.5), Some(1));
    assert_eq!(tl.active_index(10.5), Some(1));
    assert_eq!(tl.active_index(11.0), Some(1));
    assert_eq!(tl.active_index(11.1), None);
    assert_eq!(tl.active_index(2.0), Some(0));
    assert_eq!(tl.active_index(-0.1), None);
}

#[test]
fn equal_starts_keep_first_index() {
    let tl = SubtitleTimeline::new(
        vec![Subtitle::new(1.0, 3.0, "x"), Subtitle::new(1.0, 4.0, "y")],
        0.0,
    );
    assert_eq!(tl.active_index(2.0), Some(0));
}

#[test]
fn offset_shifts_lookup_without_mutating_entries() {
    let mut tl = ab();
    let original = tl.entries().to_vec();
    tl.set_offset(2.0);
    assert_eq!(tl.active_index(1.0), None);
    assert_eq!(tl.active_index(7.5), Some(1));
    assert_eq!(tl.shifted(0).unwrap().start_time, 2.0);
    tl.set_offset(tl.offset() - 2.0);
    assert_eq!(tl.offset(), 0.0);
    assert_eq!(tl.entries(), original.as_slice());
}

#[test]
fn new_sorts_by_start() {
    let tl = SubtitleTimeline::new(
        vec![Subtitle::new(5.0, 6.0, "late"), Subtitle::new(1.0, 2.0, "early")],
        0.0,
    );
    assert_eq!(tl.entries()[0].text, "early");
}

#[test]
fn steady_state_slots() {
    let tl = ab();
    let slots = tl.resolve(7.0, 720.0, &style());
    assert_eq!(slots.len(), 2);

    let active = &slots[0];
    assert_eq!(active.role, SlotRole::Active);
    assert_eq!(active.text, "b");
    assert_eq!(active.y, 560.0);
    assert_eq!(active.font_size, 48.0);
    assert_eq!(active.color, Rgb8::WHITE);
    assert!(active.is_primary());

    let prev = &slots[1];
    assert_eq!(prev.role, SlotRole::Previous);
    assert_eq!(prev.y, 460.0);
    assert_eq!(prev.font_size, 32.0);
    assert_eq!(prev.color.to_hex(), "#9ca3af");
}

#[test]
fn transition_start_uses_secondary_style() {
    let tl = SubtitleTimeline::new(
        vec![
            Subtitle::new(0.0, 2.0, "one"),
            Subtitle::new(2.0, 4.0, "two"),
            Subtitle::new(4.0, 6.0, "three"),
            Subtitle::new(6.0, 8.0, "four"),
        ],
        0.0,
    );
    let slots = tl.resolve(4.0, 720.0, &style());
    let roles: Vec<_> = slots.iter().map(|s| s.role).collect();
    assert_eq!(
        roles,
        [SlotRole::Active, SlotRole::Previous, SlotRole::Exiting, SlotRole::Next]
    );
    let active = &slots[0];
    assert_eq!(active.y, 640.0);
    assert_eq!(active.font_size, 32.0);
    assert_eq!(active.color, Rgb8::parse_hex("#9ca3af").unwrap());
    assert_eq!(slots[2].opacity, 1.0);
    assert_eq!(slots[2].y, 460.0);
    assert_eq!(slots[3].opacity, 0.0);
    assert_eq!(slots[3].y, 690.0);

    // Past the window the exiting line is gone.
    let later = tl.resolve(4.6, 720.0, &style());
    assert!(later.iter().all(|s| s.role != SlotRole::Exiting));
}

#[test]
fn distant_next_line_is_hidden() {
    let tl = SubtitleTimeline::new(
        vec![Subtitle::new(0.0, 2.0, "now"), Subtitle::new(30.0, 32.0, "later")],
        0.0,
    );
    let slots = tl.resolve(1.0, 720.0, &style());
    assert_eq!(slots.len(), 1);
}

#[test]
fn tap_sync_moves_current_and_closes_previous() {
    let mut tl = ab();
    assert!(tl.tap_sync(1, 4.5));
    assert_eq!(tl.entries()[1].start_time, 4.5);
    assert_eq!(tl.entries()[1].end_time, 9.5);
    assert_eq!(tl.entries()[0].end_time, 4.5);
    assert!(!tl.tap_sync(5, 1.0));
}

#[test]
fn update_entry_edits_text() {
    let mut tl = ab();
    assert!(tl.update_entry(0, |s| s.text = "edited".into()));
    assert_eq!(tl.entries()[0].text, "edited");
    assert!(!tl.update_entry(9, |_| {}));
}

#[test]
fn total_duration_extends_past_audio_by_grace() {
    let tl = ab();
    assert_eq!(total_duration(60.0, &tl), 60.0);
    assert_eq!(total_duration(8.0, &tl), 11.0);
    assert_eq!(total_duration(0.0, &SubtitleTimeline::default()), 0.0);
    let mut shifted = ab();
    shifted.set_offset(3.0);
    assert_eq!(total_duration(10.0, &shifted), 14.0);
}

#[test]
fn wrap_words_is_greedy() {
    // Every char is 10px wide.
    let measure = |s: &str| s.chars().count() as f64 * 10.0;
    let lines = wrap_words("aaa bbb ccc", 80.0, measure);
    assert_eq!(lines, ["aaa bbb ", "ccc "]);
    let single = wrap_words("enormousword", 20.0, measure);
    assert_eq!(single, ["enormousword "]);
}
