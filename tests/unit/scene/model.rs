use super::*;

#[test]
fn image_from_file_centers_and_truncates_name() {
    let layer = ImageLayer::from_file("/photos/a_very_long_file_name.jpeg", Canvas::default());
    assert_eq!(layer.x, 640.0);
    assert_eq!(layer.y, 360.0);
    assert_eq!(layer.scale, 0.5);
    assert_eq!(layer.name, "a_very_long_fil");
    assert_eq!(layer.name.chars().count(), 15);
    assert_eq!(layer.anim_params(), AnimParams::effective(1.0, 20.0));
}

#[test]
fn default_text_layer() {
    let layer = TextLayer::new_default();
    assert_eq!(layer.text, "Kinetic Text");
    assert_eq!((layer.x, layer.y), (640.0, 200.0));
    assert_eq!(layer.font_size, 80.0);
    assert_eq!(layer.font_family, "Impact, sans-serif");
    assert_eq!(layer.shadow_blur, 0.0);
}

#[test]
fn empty_project_uses_defaults() {
    let p = Project::from_json_str("{}").unwrap();
    assert_eq!(p, Project::default());
    assert_eq!(p.visualizer.bar_count, 40);
    assert_eq!(p.visualizer.sensitivity, 1.5);
    assert_eq!(p.visualizer.kind, VisualizerKind::Bars);
    assert_eq!(p.text_settings.primary_font_size, 48.0);
    assert_eq!(p.text_settings.secondary_color, "#9ca3af");
}

#[test]
fn camel_case_fields_parse() {
    let json = r##"{
        "fps": 24,
        "subtitleOffset": -0.5,
        "visualizer": { "type": "circular", "barCount": 64, "shadowBlur": 10 },
        "textLayers": [
            { "text": "Hi", "x": 10, "y": 20, "animation": "beat-zoom", "animationAmp": 40 }
        ],
        "subtitles": [ { "startTime": 1.0, "endTime": 2.0, "text": "one" } ]
    }"##;
    let p = Project::from_json_str(json).unwrap();
    assert_eq!(p.fps, 24);
    assert_eq!(p.subtitle_offset, -0.5);
    assert_eq!(p.visualizer.kind, VisualizerKind::Circular);
    assert_eq!(p.visualizer.bar_count, 64);
    assert_eq!(p.visualizer.gap, 0.3);
    let t = &p.text_layers[0];
    assert_eq!(t.animation, AnimationType::BeatZoom);
    assert_eq!(t.animation_amp, 40.0);
    assert_eq!(t.font_size, 80.0);
    assert_eq!(p.subtitles[0].text, "one");
}

#[test]
fn invalid_projects_are_rejected() {
    assert!(Project::from_json_str(r#"{"fps": 0}"#).is_err());
    assert!(Project::from_json_str(r#"{"canvas": {"width": 0, "height": 10}}"#).is_err());
    let bad_text = r#"{"textLayers": [{"text": "x", "x": 0, "y": 0, "fontSize": 0}]}"#;
    assert!(matches!(
        Project::from_json_str(bad_text),
        Err(WaveclipError::Validation(_))
    ));
    assert!(matches!(
        Project::from_json_str("{"),
        Err(WaveclipError::Serde(_))
    ));
}

#[test]
fn relative_paths_resolve_against_root() {
    let mut p = Project {
        audio: Some(PathBuf::from("song.mp3")),
        images: vec![ImageLayer::from_file("/abs/cover.png", Canvas::default())],
        ..Project::default()
    };
    p.fonts.insert("Impact".into(), PathBuf::from("fonts/impact.ttf"));
    p.resolve_paths(Path::new("/proj"));
    assert_eq!(p.audio.as_deref(), Some(Path::new("/proj/song.mp3")));
    assert_eq!(p.images[0].source, PathBuf::from("/abs/cover.png"));
    assert_eq!(p.fonts["Impact"], PathBuf::from("/proj/fonts/impact.ttf"));
}

#[test]
fn json_round_trip_keeps_settings() {
    let mut p = Project::default();
    p.visualizer.kind = VisualizerKind::Wave;
    p.text_layers.push(TextLayer::new_default());
    let back = Project::from_json_str(&p.to_json_string().unwrap()).unwrap();
    assert_eq!(back, p);
}
