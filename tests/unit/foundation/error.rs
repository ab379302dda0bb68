use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WaveclipError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(WaveclipError::media("x").to_string().contains("media error:"));
    assert!(WaveclipError::render("x").to_string().contains("render error:"));
    assert!(WaveclipError::encode("x").to_string().contains("encode error:"));
    assert!(
        WaveclipError::subtitle("x")
            .to_string()
            .contains("subtitle generation failed:")
    );
    assert!(
        WaveclipError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WaveclipError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde_variant() {
    let err: WaveclipError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, WaveclipError::Serde(_)));
}
