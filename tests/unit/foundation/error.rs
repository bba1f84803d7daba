use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReplayError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReplayError::render("x").to_string().contains("render error:"));
    assert!(ReplayError::encode("x").to_string().contains("encode error:"));
    assert!(ReplayError::source("x").to_string().contains("source error:"));
    assert!(
        ReplayError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReplayError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
