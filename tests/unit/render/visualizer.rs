use super::*;

use crate::foundation::core::Rgba8Premul;

fn settings(kind: VisualizerKind) -> VisualizerSettings {
    VisualizerSettings {
        kind,
        ..VisualizerSettings::default()
    }
}

#[test]
fn silent_bars_sit_on_the_base_height() {
    let bars = bar_geometry(&[0u8; 512], &settings(VisualizerKind::Bars));
    assert_eq!(bars.len(), 40);
    assert!(bars.iter().all(|b| b.height == 25.0));
}

#[test]
fn bars_are_centered_in_their_slots() {
    let s = VisualizerSettings {
        bar_count: 4,
        gap: 0.5,
        roundness: 0.0,
        ..settings(VisualizerKind::Bars)
    };
    let bars = bar_geometry(&[0u8; 512], &s);
    assert_eq!(bars[0].width, 100.0);
    assert_eq!(bars[0].x, -350.0);
    assert_eq!(bars[3].x, 250.0);
    assert_eq!(bars[0].radius, 0.0);
}

#[test]
fn loud_bars_cap_at_full_height() {
    let s = VisualizerSettings {
        sensitivity: 1.0,
        ..settings(VisualizerKind::Bars)
    };
    let bars = bar_geometry(&[255u8; 512], &s);
    assert!(bars.iter().all(|b| b.height == 205.0));
}

#[test]
fn later_bars_are_boosted() {
    let s = VisualizerSettings {
        bar_count: 2,
        sensitivity: 1.0,
        ..settings(VisualizerKind::Bars)
    };
    let bars = bar_geometry(&[100u8; 512], &s);
    assert!(bars[1].height > bars[0].height);
    assert!((bars[0].height - (25.0 + 100.0 / 255.0 * 180.0)).abs() < 1e-9);
}

#[test]
fn radius_is_clamped_to_half_the_bar() {
    let bars = bar_geometry(&[0u8; 512], &settings(VisualizerKind::Bars));
    // width 14, height 25
    assert!((bars[0].radius - 7.0).abs() < 1e-9);
}

#[test]
fn zero_bar_count_uses_defaults() {
    let s = VisualizerSettings {
        bar_count: 0,
        ..settings(VisualizerKind::Bars)
    };
    assert_eq!(bar_geometry(&[0u8; 512], &s).len(), 40);
    assert_eq!(ring_geometry(&[0u8; 512], &s).0.len(), 64);
}

#[test]
fn silent_spokes_have_minimum_length() {
    let s = VisualizerSettings {
        bar_count: 4,
        ..settings(VisualizerKind::Circular)
    };
    let (spokes, width) = ring_geometry(&[0u8; 512], &s);
    assert_eq!(spokes.len(), 4);
    assert!(width >= 2.0);
    let first = spokes[0];
    // First spoke points straight up.
    assert!(first.from.x.abs() < 1e-9);
    assert!((first.from.y + 90.0).abs() < 1e-9);
    assert!((first.to.y + 94.0).abs() < 1e-9);
}

#[test]
fn wave_spans_the_logical_width() {
    let path = wave_path(&[128u8; 4], 1.0);
    let pts: Vec<_> = path
        .elements()
        .iter()
        .filter_map(|el| match el {
            kurbo::PathEl::MoveTo(p) | kurbo::PathEl::LineTo(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(pts.len(), 4);
    assert_eq!(pts[0], Point::new(-400.0, 0.0));
    assert_eq!(pts[3].x, 200.0);
    assert!(pts.iter().all(|p| p.y == 0.0));
    assert!(wave_path(&[], 1.0).elements().is_empty());
}

#[test]
fn draw_bars_paints_the_center() {
    let canvas = Canvas {
        width: 64,
        height: 64,
    };
    let mut surface = Surface::new(canvas).unwrap();
    surface.clear(Rgba8Premul::OPAQUE_BLACK);
    let s = VisualizerSettings {
        bar_color: "#ff0000".to_string(),
        bar_count: 1,
        gap: 0.0,
        roundness: 0.0,
        scale: 0.05,
        sensitivity: 1.0,
        ..settings(VisualizerKind::Bars)
    };
    draw(&mut surface, canvas, &[255u8; 512], &s).unwrap();
    let f = surface.snapshot();
    assert_eq!(f.pixel(32, 32), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(32, 2), Some([0, 0, 0, 255]));
}
