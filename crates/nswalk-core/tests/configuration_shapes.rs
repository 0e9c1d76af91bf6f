use nswalk_core::{cubic_cell, Configuration, NsError};

fn two_atoms() -> Configuration {
    Configuration::new(
        vec![18, 18],
        vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0],
        cubic_cell(10.0),
        vec![39.948, 39.948],
    )
    .unwrap()
}

#[test]
fn rejects_mismatched_position_length() {
    let err = Configuration::new(
        vec![18, 18],
        vec![0.0; 5],
        cubic_cell(10.0),
        vec![39.948, 39.948],
    )
    .unwrap_err();
    assert!(matches!(err, NsError::Shape(_)));
}

#[test]
fn rejects_mismatched_mass_length() {
    let err = Configuration::new(
        vec![18, 18],
        vec![0.0; 6],
        cubic_cell(10.0),
        vec![39.948],
    )
    .unwrap_err();
    assert!(matches!(err, NsError::Shape(_)));
}

#[test]
fn extra_width_is_pinned_on_first_attach() {
    let mut config = two_atoms();
    config.attach_extra_data(2, vec![0.0; 4]).unwrap();
    assert_eq!(config.extra_width(), 2);

    // Same width may be re-attached; a different width is a violation.
    config.attach_extra_data(2, vec![1.0; 4]).unwrap();
    let err = config.attach_extra_data(3, vec![0.0; 6]).unwrap_err();
    assert!(matches!(err, NsError::Shape(_)));
    assert_eq!(config.extra_width(), 2);
}

#[test]
fn absent_extra_marshals_as_width_zero() {
    let config = two_atoms();
    assert_eq!(config.extra_width(), 0);
    assert!(config.extra_values().is_empty());
}

#[test]
fn extra_update_requires_prior_attach() {
    let mut config = two_atoms();
    let err = config.set_extra_values(&[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, NsError::Shape(_)));
}

#[test]
fn velocities_are_absent_until_attached() {
    let mut config = two_atoms();
    assert!(config.velocities().is_none());
    assert!(matches!(
        config.require_velocities(),
        Err(NsError::Config(_))
    ));

    config.set_velocities(&[0.1; 6]).unwrap();
    assert_eq!(config.require_velocities().unwrap().len(), 6);

    let err = config.set_velocities(&[0.1; 5]).unwrap_err();
    assert!(matches!(err, NsError::Shape(_)));
}

#[test]
fn gmc_direction_is_normalized_per_atom() {
    let mut config = two_atoms();
    config
        .attach_gmc_direction(vec![3.0, 0.0, 0.0, 0.0, 4.0, 3.0])
        .unwrap();
    let direction = config.gmc_direction().unwrap();
    for atom in 0..2 {
        let row = &direction[3 * atom..3 * atom + 3];
        let norm = (row[0] * row[0] + row[1] * row[1] + row[2] * row[2]).sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }
}

#[test]
fn zero_norm_direction_is_rejected() {
    let mut config = two_atoms();
    let err = config
        .attach_gmc_direction(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0])
        .unwrap_err();
    assert!(matches!(err, NsError::Shape(_)));
}
