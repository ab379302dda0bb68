use super::*;

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
    assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
    assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(0, 255), 0);
    assert_eq!(mul_div255(255, 128), 128);
}

#[test]
fn unit_noise_is_deterministic_and_in_range() {
    let a = unit_noise(7, &[1, 2, 3]);
    let b = unit_noise(7, &[1, 2, 3]);
    assert_eq!(a, b);
    assert!((0.0..1.0).contains(&a));
    assert_ne!(unit_noise(7, &[1, 2, 3]), unit_noise(8, &[1, 2, 3]));
}

#[test]
fn unit_noise_covers_both_halves() {
    let samples: Vec<f64> = (0..256).map(|i| unit_noise(1, &[i])).collect();
    assert!(samples.iter().any(|&v| v < 0.5));
    assert!(samples.iter().any(|&v| v > 0.5));
    assert!(samples.iter().any(|&v| v > 0.85));
}
