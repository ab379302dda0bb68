use std::f64::consts::PI;

use super::*;

fn params(speed: f64, amp: f64) -> AnimParams {
    AnimParams::effective(speed, amp)
}

#[test]
fn animation_names_match_project_format() {
    let names = [
        (AnimationType::None, "\"none\""),
        (AnimationType::FloatV, "\"float-v\""),
        (AnimationType::FloatH, "\"float-h\""),
        (AnimationType::BeatZoom, "\"beat-zoom\""),
        (AnimationType::Typewriter, "\"typewriter\""),
    ];
    for (kind, json) in names {
        assert_eq!(serde_json::to_string(&kind).unwrap(), json);
        assert_eq!(serde_json::from_str::<AnimationType>(json).unwrap(), kind);
    }
}

#[test]
fn zero_speed_and_amp_fall_back() {
    let p = params(0.0, 0.0);
    assert_eq!(p.speed, 1.0);
    assert_eq!(p.amp, 20.0);
    let p = params(2.5, 7.0);
    assert_eq!(p.speed, 2.5);
    assert_eq!(p.amp, 7.0);
}

#[test]
fn spin_at_pi_is_half_turn_regardless_of_amp() {
    for amp in [1.0, 20.0, 500.0] {
        let m = AnimationType::Spin.motion(PI, params(1.0, amp), 1.0);
        assert_eq!(m.rotation, PI);
        assert_eq!(m.scale, 1.0);
        assert_eq!(m.offset, Vec2::ZERO);
    }
}

#[test]
fn float_moves_a_single_axis() {
    let t = PI / 4.0; // sin(t * 2) == 1
    let v = AnimationType::FloatV.motion(t, params(1.0, 30.0), 1.0);
    assert!((v.offset.y - 30.0).abs() < 1e-9);
    assert_eq!(v.offset.x, 0.0);

    let h = AnimationType::FloatH.motion(t, params(1.0, 30.0), 1.0);
    assert!((h.offset.x - 30.0).abs() < 1e-9);
    assert_eq!(h.offset.y, 0.0);
}

#[test]
fn pulse_scales_by_percent_of_amp() {
    let t = PI / 6.0; // sin(t * 3) == 1
    let m = AnimationType::Pulse.motion(t, params(1.0, 20.0), 1.0);
    assert!((m.scale - 1.2).abs() < 1e-9);
}

#[test]
fn wiggle_rotation_is_bounded_by_amp() {
    let p = params(1.0, 20.0);
    for i in 0..200 {
        let m = AnimationType::Wiggle.motion(f64::from(i) * 0.01, p, 1.0);
        assert!(m.rotation.abs() <= 20.0 * 0.005 + 1e-12);
    }
}

#[test]
fn beat_zoom_uses_amp_over_fifty() {
    let m = AnimationType::BeatZoom.motion(0.0, params(1.0, 50.0), 1.3);
    assert!((m.scale - 1.3).abs() < 1e-9);
    let m = AnimationType::BeatZoom.motion(0.0, params(2.0, 25.0), 1.3);
    assert!((m.scale - 1.3).abs() < 1e-9);
    let silent = AnimationType::BeatZoom.motion(0.0, params(2.0, 25.0), 1.0);
    assert_eq!(silent.scale, 1.0);
}

#[test]
fn kinetic_text_kinds_do_not_transform() {
    for kind in [
        AnimationType::None,
        AnimationType::Typewriter,
        AnimationType::Glitch,
        AnimationType::Wave,
        AnimationType::Neon,
    ] {
        assert_eq!(kind.motion(3.0, params(1.0, 20.0), 1.2), Motion::default());
    }
}

#[test]
fn typewriter_reveals_prefix() {
    assert_eq!(typewriter_loop_duration(5, 1.0), 2.5);
    assert_eq!(typewriter_visible("HELLO", 0.3, 1.0), "HEL");
    assert_eq!(typewriter_visible("HELLO", 0.0, 1.0), "");
    assert_eq!(typewriter_visible("HELLO", 1.0, 1.0), "HELLO");
    // 2.9 mod 2.5 ~= 0.4 => loop restarted
    assert_eq!(typewriter_visible("HELLO", 2.9, 1.0), "HEL");
}

#[test]
fn typewriter_respects_char_boundaries() {
    assert_eq!(typewriter_visible("héllo", 0.25, 1.0), "hé");
}

#[test]
fn wave_offsets_shift_by_character() {
    let p = params(1.0, 10.0);
    assert_eq!(wave_offset(0.0, p, 0), 0.0);
    let expected = (0.5f64).sin() * 10.0;
    assert!((wave_offset(0.0, p, 1) - expected).abs() < 1e-12);
}

#[test]
fn neon_blur_oscillates_between_5_and_35() {
    for i in 0..100 {
        let b = neon_glow_blur(f64::from(i) * 0.037, 1.0);
        assert!((5.0..=35.0).contains(&b));
    }
    assert_eq!(neon_glow_blur(0.0, 1.0), 20.0);
}

#[test]
fn glitch_is_deterministic_and_bounded() {
    let mut fired = 0;
    for i in 0..400 {
        let t = f64::from(i) / 30.0;
        let a = glitch_copies(42, t, 0, 20.0);
        assert_eq!(a, glitch_copies(42, t, 0, 20.0));
        if let Some(c) = a {
            fired += 1;
            for v in [c.red, c.cyan] {
                assert!(v.x.abs() <= 10.0 && v.y.abs() <= 10.0);
            }
        }
    }
    // ~15% of 400 frames
    assert!(fired > 20 && fired < 110, "fired {fired}");
}
