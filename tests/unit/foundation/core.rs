use super::*;

#[test]
fn canvas_validation() {
    assert!(Canvas::default().validate().is_ok());
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 70_000,
            height: 10
        }
        .validate()
        .is_err()
    );
}

#[test]
fn hex_parse_accepts_both_cases_and_optional_hash() {
    assert_eq!(Rgb8::parse_hex("#22c55e").unwrap(), Rgb8::new(0x22, 0xc5, 0x5e));
    assert_eq!(Rgb8::parse_hex("9CA3AF").unwrap(), Rgb8::new(0x9c, 0xa3, 0xaf));
    assert!(Rgb8::parse_hex("#fff").is_err());
    assert!(Rgb8::parse_hex("red").is_err());
}

#[test]
fn malformed_hex_falls_back_to_white() {
    assert_eq!(Rgb8::from_hex_or_white("black"), Rgb8::WHITE);
    assert_eq!(Rgb8::from_hex_or_white("#gggggg"), Rgb8::WHITE);
}

#[test]
fn lerp_endpoints_are_exact() {
    let secondary = Rgb8::parse_hex("#9ca3af").unwrap();
    let primary = Rgb8::parse_hex("#ffffff").unwrap();
    assert_eq!(secondary.lerp(primary, 0.0), secondary);
    assert_eq!(secondary.lerp(primary, 1.0), primary);
    assert_eq!(
        Rgb8::BLACK.lerp(Rgb8::WHITE, 0.5),
        Rgb8::new(128, 128, 128)
    );
}

#[test]
fn hex_round_trip_formatting() {
    assert_eq!(Rgb8::new(0x22, 0xc5, 0x5e).to_hex(), "#22c55e");
}

#[test]
fn premul_scales_channels() {
    let p = Rgb8::WHITE.premul(0.5);
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
    assert_eq!(Rgb8::WHITE.premul(1.0).to_array(), [255, 255, 255, 255]);
}
