use fsim_core::errors::{ErrorInfo, SimError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("pool", "GLine")
        .with_context("index", "3")
}

#[test]
fn diagram_error_surface() {
    let err = SimError::Diagram(sample_info("D001", "dangling endpoint"));
    assert_eq!(err.info().code, "D001");
    assert!(err.info().context.contains_key("pool"));
}

#[test]
fn checkpoint_error_surface() {
    let err = SimError::Checkpoint(
        sample_info("K001", "missing key").with_hint("rerun with a fresh checkpoint"),
    );
    assert_eq!(err.info().code, "K001");
    let rendered = err.to_string();
    assert!(rendered.starts_with("checkpoint error: missing key (code: K001)"));
    assert!(rendered.contains("index=3"));
    assert!(rendered.ends_with("hint: rerun with a fresh checkpoint"));
}

#[test]
fn config_error_surface() {
    let err = SimError::Config(sample_info("C001", "order too large"));
    assert_eq!(err.info().code, "C001");
}

#[test]
fn error_round_trips_through_json() {
    let err = SimError::Estimator(sample_info("E001", "duplicate name"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Estimator\""));
    let decoded: SimError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
