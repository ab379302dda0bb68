use std::io::Cursor;
use std::path::Path;

use super::*;

use crate::render::bitmap::decode_bitmap;
use crate::subtitle::timeline::Subtitle;

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 64,
};

fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba.repeat((w * h) as usize)).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

struct Fixture {
    images: Vec<ImageLayer>,
    text_layers: Vec<TextLayer>,
    visualizer: VisualizerSettings,
    text_settings: TextSettings,
    subtitles: SubtitleTimeline,
}

impl Fixture {
    fn new() -> Self {
        Self {
            images: Vec::new(),
            text_layers: Vec::new(),
            visualizer: VisualizerSettings::default(),
            text_settings: TextSettings::default(),
            subtitles: SubtitleTimeline::default(),
        }
    }

    fn scene(&self) -> SceneRef<'_> {
        SceneRef {
            images: &self.images,
            text_layers: &self.text_layers,
            visualizer: &self.visualizer,
            text_settings: &self.text_settings,
            subtitles: &self.subtitles,
        }
    }
}

fn inputs(time: f64, playing: bool, spectrum: Option<&[u8]>) -> FrameInputs<'_> {
    FrameInputs {
        time,
        playing,
        beat_scale: 1.0,
        spectrum,
        seed: 7,
    }
}

fn red_bar_compositor() -> Compositor {
    let mut c = Compositor::new(CANVAS).unwrap();
    let bitmap = decode_bitmap(&solid_png(8, 2, [255, 0, 0, 255])).unwrap();
    c.bitmaps_mut().insert("mem://bar.png", bitmap);
    c
}

fn red_bar_layer() -> ImageLayer {
    ImageLayer {
        scale: 1.0,
        ..ImageLayer::from_file("mem://bar.png", CANVAS)
    }
}

#[test]
fn empty_scene_is_opaque_black() {
    let mut c = Compositor::new(CANVAS).unwrap();
    let fx = Fixture::new();
    let surface = c.draw_frame(&fx.scene(), &inputs(0.0, false, None)).unwrap();
    assert!(
        surface
            .pixels()
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255])
    );
}

#[test]
fn images_are_drawn_centered_under_the_overlay() {
    let mut c = red_bar_compositor();
    let mut fx = Fixture::new();
    fx.images.push(red_bar_layer());
    c.draw_frame(&fx.scene(), &inputs(0.0, false, None)).unwrap();
    let f = c.snapshot();
    assert_eq!(f.pixel(32, 32), Some([204, 0, 0, 255]));
    assert_eq!(f.pixel(32, 40), Some([0, 0, 0, 255]));
}

#[test]
fn missing_images_are_skipped() {
    let mut c = Compositor::new(CANVAS).unwrap();
    let mut fx = Fixture::new();
    fx.images.push(ImageLayer::from_file(
        Path::new("/nonexistent/waveclip/missing.png"),
        CANVAS,
    ));
    c.draw_frame(&fx.scene(), &inputs(0.0, true, None)).unwrap();
    c.draw_frame(&fx.scene(), &inputs(0.1, true, None)).unwrap();
    assert_eq!(c.snapshot().pixel(32, 32), Some([0, 0, 0, 255]));
}

#[test]
fn animations_only_move_layers_while_playing() {
    let mut c = red_bar_compositor();
    let mut fx = Fixture::new();
    fx.images.push(ImageLayer {
        animation: AnimationType::FloatV,
        animation_amp: 10.0,
        ..red_bar_layer()
    });
    let t = std::f64::consts::FRAC_PI_4;

    c.draw_frame(&fx.scene(), &inputs(t, false, None)).unwrap();
    assert_eq!(c.snapshot().pixel(32, 32), Some([204, 0, 0, 255]));

    c.draw_frame(&fx.scene(), &inputs(t, true, None)).unwrap();
    let f = c.snapshot();
    assert_eq!(f.pixel(32, 32), Some([0, 0, 0, 255]));
    let moved = f.pixel(32, 42).unwrap();
    assert!(moved[0] > 150 && moved[1] == 0, "{moved:?}");
}

#[test]
fn zero_opacity_images_are_invisible() {
    let mut c = red_bar_compositor();
    let mut fx = Fixture::new();
    fx.images.push(ImageLayer {
        opacity: 0.0,
        ..red_bar_layer()
    });
    c.draw_frame(&fx.scene(), &inputs(0.0, false, None)).unwrap();
    assert_eq!(c.snapshot().pixel(32, 32), Some([0, 0, 0, 255]));
}

#[test]
fn visualizer_needs_a_spectrum() {
    let mut c = Compositor::new(CANVAS).unwrap();
    let fx = Fixture::new();
    let silent = [0u8; 512];

    c.draw_frame(&fx.scene(), &inputs(0.0, false, None)).unwrap();
    assert_eq!(c.snapshot().pixel(40, 32), Some([0, 0, 0, 255]));

    c.draw_frame(&fx.scene(), &inputs(0.0, false, Some(&silent)))
        .unwrap();
    let f = c.snapshot();
    // Bar 20 spans x = 35..49 on a 64 px canvas; the next one starts at 55.
    assert_eq!(f.pixel(40, 32), Some([0x22, 0xc5, 0x5e, 255]));
    assert_eq!(f.pixel(52, 32), Some([0, 0, 0, 255]));
}

#[test]
fn disabled_visualizer_is_not_drawn() {
    let mut c = Compositor::new(CANVAS).unwrap();
    let mut fx = Fixture::new();
    fx.visualizer.enabled = false;
    let silent = [0u8; 512];
    c.draw_frame(&fx.scene(), &inputs(0.0, true, Some(&silent)))
        .unwrap();
    assert_eq!(c.snapshot().pixel(40, 32), Some([0, 0, 0, 255]));
}

#[test]
fn text_without_fonts_draws_nothing() {
    let mut c = Compositor::new(CANVAS).unwrap();
    let mut fx = Fixture::new();
    fx.text_layers.push(TextLayer::new_default());
    fx.subtitles = SubtitleTimeline::new(vec![Subtitle::new(0.0, 5.0, "hello there")], 0.0);
    c.draw_frame(&fx.scene(), &inputs(1.0, true, None)).unwrap();
    assert!(
        c.surface()
            .pixels()
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255])
    );
}

#[test]
fn missing_font_files_are_reported() {
    let mut c = Compositor::new(CANVAS).unwrap();
    let mut fonts = BTreeMap::new();
    fonts.insert(
        "Impact".to_string(),
        PathBuf::from("/nonexistent/waveclip/impact.ttf"),
    );
    assert!(c.register_fonts(&fonts).is_err());
}
