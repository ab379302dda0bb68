use super::*;

fn loaded(duration: f64) -> (TimeBase, EventLog) {
    let mut tb = TimeBase::new();
    let mut log = EventLog::default();
    tb.set_audio(AudioTrack::new(duration), &mut log);
    (tb, log)
}

#[test]
fn loading_audio_reports_duration() {
    let (_, log) = loaded(12.5);
    assert_eq!(log.significant(), [&HostEvent::Duration(12.5)]);

    let mut tb = TimeBase::new();
    let mut log = EventLog::default();
    tb.set_audio(AudioTrack::new(0.0), &mut log);
    assert!(log.significant().is_empty());
}

#[test]
fn track_seek_clamps_and_clears_ended() {
    let mut a = AudioTrack::new(4.0);
    a.play().unwrap();
    a.advance(10.0);
    assert!(a.ended());
    assert!(a.paused());
    assert_eq!(a.position(), 4.0);
    a.seek(9.0);
    assert_eq!(a.position(), 4.0);
    assert!(!a.ended());
    a.seek(-1.0);
    assert_eq!(a.position(), 0.0);
}

#[test]
fn empty_track_refuses_to_play() {
    assert!(AudioTrack::new(0.0).play().is_err());
    assert!(AudioTrack::new(f64::NAN).play().is_err());
}

#[test]
fn play_failure_folds_back_to_not_playing() {
    let mut tb = TimeBase::new();
    let mut log = EventLog::default();
    tb.play(&mut log);
    assert!(!tb.is_playing());
    assert_eq!(log.significant(), [&HostEvent::PlayState(false)]);
}

#[test]
fn poll_follows_the_track_only_while_playing() {
    let (mut tb, mut log) = loaded(10.0);
    tb.poll(0.5);
    assert_eq!(tb.current_time(), 0.0);

    tb.play(&mut log);
    assert!(tb.is_playing());
    tb.poll(0.25);
    tb.poll(0.25);
    assert_eq!(tb.current_time(), 0.5);

    tb.pause(&mut log);
    tb.poll(1.0);
    assert_eq!(tb.current_time(), 0.5);
}

#[test]
fn poll_reports_end_of_track() {
    let (mut tb, mut log) = loaded(1.0);
    tb.play(&mut log);
    assert!(!tb.poll(0.5));
    assert!(tb.poll(0.75));
    assert_eq!(tb.current_time(), 1.0);
}

#[test]
fn stop_rewinds_and_notifies() {
    let (mut tb, mut log) = loaded(10.0);
    tb.play(&mut log);
    tb.poll(2.0);
    log.events.clear();
    tb.stop(&mut log);
    assert_eq!(tb.current_time(), 0.0);
    assert!(!tb.is_playing());
    assert_eq!(
        log.events,
        [HostEvent::PlayState(false), HostEvent::Time(0.0)]
    );
    assert_eq!(tb.audio().map(AudioTrack::position), Some(0.0));
}

#[test]
fn skip_clamps_at_zero() {
    let (mut tb, mut log) = loaded(30.0);
    tb.seek(4.0, &mut log);
    tb.skip(-10.0, &mut log);
    assert_eq!(tb.current_time(), 0.0);
    tb.skip(10.0, &mut log);
    assert_eq!(tb.current_time(), 10.0);
    assert_eq!(log.last_time(), Some(10.0));
}

#[test]
fn seek_past_audio_holds_master_time() {
    let (mut tb, mut log) = loaded(5.0);
    tb.seek(6.0, &mut log);
    assert_eq!(tb.current_time(), 6.0);
    assert_eq!(tb.audio().map(AudioTrack::position), Some(5.0));
}

#[test]
fn lock_to_moves_time_silently() {
    let (mut tb, mut log) = loaded(2.0);
    tb.play(&mut log);
    let before = log.events.len();
    tb.lock_to(0.75);
    assert_eq!(tb.current_time(), 0.75);
    assert_eq!(tb.audio().map(AudioTrack::position), Some(0.75));
    assert_eq!(log.events.len(), before);

    tb.lock_to(f64::NAN);
    assert_eq!(tb.current_time(), 0.0);
}
