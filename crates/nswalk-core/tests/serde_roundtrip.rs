use nswalk_core::{cubic_cell, Configuration, ErrorInfo, NsError};

#[test]
fn configuration_round_trips_through_json() {
    let mut config = Configuration::new(
        vec![18, 18, 18],
        vec![0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 0.0, 1.5, 0.0],
        cubic_cell(9.0),
        vec![39.948; 3],
    )
    .unwrap();
    config.set_velocities(&[0.1; 9]).unwrap();
    config.attach_extra_data(2, vec![0.5; 6]).unwrap();
    config
        .attach_gmc_direction(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
        .unwrap();

    let text = serde_json::to_string(&config).unwrap();
    let restored: Configuration = serde_json::from_str(&text).unwrap();
    assert_eq!(config, restored);
    assert_eq!(restored.extra_width(), 2);
}

#[test]
fn error_payloads_serialize_with_code_and_context() {
    let err = NsError::Shape(
        ErrorInfo::new("config.positions", "bad position array")
            .with_context("expected", "9")
            .with_hint("pass a flat [n, 3] array"),
    );
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["family"], "Shape");
    assert_eq!(value["detail"]["code"], "config.positions");
    assert_eq!(value["detail"]["context"]["expected"], "9");

    let restored: NsError = serde_json::from_value(value).unwrap();
    assert_eq!(restored, err);
}
