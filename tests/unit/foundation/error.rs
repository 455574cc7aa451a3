use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EngineError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        EngineError::out_of_range("x")
            .to_string()
            .contains("out of range:")
    );
    assert!(
        EngineError::disposed("x")
            .to_string()
            .contains("object disposed:")
    );
    assert!(
        EngineError::allocation("x")
            .to_string()
            .contains("allocation failed:")
    );
    assert!(
        EngineError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(EngineError::render("x").to_string().contains("render error:"));
    assert!(
        EngineError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EngineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn recoverable_classes() {
    assert!(EngineError::allocation("x").is_recoverable());
    assert!(EngineError::render("x").is_recoverable());
    assert!(!EngineError::disposed("x").is_recoverable());
    assert!(!EngineError::out_of_range("x").is_recoverable());
}
