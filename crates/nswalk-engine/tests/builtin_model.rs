use nswalk_core::NsError;
use nswalk_engine::{BuiltinModelBackend, LjParams, ModelBackend};

const CELL: [f64; 9] = [20.0, 0.0, 0.0, 0.0, 20.0, 0.0, 0.0, 0.0, 20.0];

fn initialized_model() -> BuiltinModelBackend {
    let mut model = BuiltinModelBackend::new();
    model.init_model(&LjParams::default().flat()).unwrap();
    model
}

fn dimer(separation: f64) -> (Vec<i32>, Vec<f64>) {
    (
        vec![18, 18],
        vec![0.0, 0.0, 0.0, separation, 0.0, 0.0],
    )
}

#[test]
fn eval_before_init_model_fails() {
    let mut model = BuiltinModelBackend::new();
    let (species, positions) = dimer(1.5);
    let err = model
        .eval_energy(&species, &positions, 0, &[], &CELL)
        .unwrap_err();
    assert!(matches!(err, NsError::Engine(_)));
}

#[test]
fn init_model_rejects_bad_parameter_vectors() {
    let mut model = BuiltinModelBackend::new();
    assert!(model.init_model(&[1.0, 1.0]).is_err());
    assert!(model.init_model(&[1.0, -1.0, 3.0]).is_err());
    assert!(model.init_model(&[1.0, 1.0, 3.0]).is_ok());
}

#[test]
fn potential_minimum_sits_near_the_well() {
    let mut model = initialized_model();
    let (species, at_minimum) = dimer(2.0f64.powf(1.0 / 6.0));
    let (_, stretched) = dimer(1.8);
    let e_min = model
        .eval_energy(&species, &at_minimum, 0, &[], &CELL)
        .unwrap();
    let e_stretched = model
        .eval_energy(&species, &stretched, 0, &[], &CELL)
        .unwrap();
    assert!(e_min < e_stretched);
    assert!(e_min < 0.0);
}

#[test]
fn energy_is_pure_with_respect_to_inputs() {
    let mut model = initialized_model();
    let (species, positions) = dimer(1.3);
    let snapshot = positions.clone();
    let first = model
        .eval_energy(&species, &positions, 0, &[], &CELL)
        .unwrap();
    let second = model
        .eval_energy(&species, &positions, 0, &[], &CELL)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(positions, snapshot);
}

#[test]
fn forces_match_negative_energy_gradient() {
    let mut model = initialized_model();
    let (species, positions) = dimer(1.4);
    let mut forces = vec![0.0; positions.len()];
    let energy = model
        .eval_forces(&species, &positions, 0, &[], &CELL, &mut forces)
        .unwrap();
    assert!(energy.is_finite());

    let h = 1e-6;
    for idx in 0..positions.len() {
        let mut plus = positions.clone();
        let mut minus = positions.clone();
        plus[idx] += h;
        minus[idx] -= h;
        let e_plus = model.eval_energy(&species, &plus, 0, &[], &CELL).unwrap();
        let e_minus = model.eval_energy(&species, &minus, 0, &[], &CELL).unwrap();
        let gradient = (e_plus - e_minus) / (2.0 * h);
        assert!(
            (forces[idx] + gradient).abs() < 1e-4,
            "component {idx}: force {} vs -gradient {}",
            forces[idx],
            -gradient
        );
    }
}

#[test]
fn forces_buffer_length_is_checked() {
    let mut model = initialized_model();
    let (species, positions) = dimer(1.4);
    let mut short = vec![0.0; 3];
    let err = model
        .eval_forces(&species, &positions, 0, &[], &CELL, &mut short)
        .unwrap_err();
    assert!(matches!(err, NsError::Shape(_)));
}

#[test]
fn uphill_move_with_zero_ceiling_is_rejected() {
    let mut model = initialized_model();
    // Pull the dimer from the well minimum inward; energy strictly rises.
    let (species, mut positions) = dimer(2.0f64.powf(1.0 / 6.0));
    let snapshot = positions.clone();
    let outcome = model
        .move_atom_1(
            &species,
            &mut positions,
            0,
            &mut [],
            &CELL,
            1,
            &[-0.2, 0.0, 0.0],
            0.0,
        )
        .unwrap();
    assert!(!outcome.accepted);
    assert!(outcome.d_e > 0.0);
    assert_eq!(positions, snapshot);
}

#[test]
fn downhill_move_is_committed_into_the_buffer() {
    let mut model = initialized_model();
    // Relax a stretched dimer towards the minimum; energy strictly drops.
    let (species, mut positions) = dimer(1.8);
    let outcome = model
        .move_atom_1(
            &species,
            &mut positions,
            0,
            &mut [],
            &CELL,
            1,
            &[-0.5, 0.0, 0.0],
            0.0,
        )
        .unwrap();
    assert!(outcome.accepted);
    assert!(outcome.d_e < 0.0);
    assert!((positions[3] - 1.3).abs() < 1e-12);
}

#[test]
fn partial_model_params_fill_in_defaults() {
    let params: LjParams = serde_json::from_str(r#"{"epsilon": 0.7}"#).unwrap();
    assert_eq!(params.epsilon, 0.7);
    assert_eq!(params.sigma, 1.0);
    assert_eq!(params.cutoff, 3.0);
    assert_eq!(LjParams::from_flat(&params.flat()).unwrap(), params);
}

#[test]
fn minimum_image_wraps_across_the_cell() {
    let mut model = initialized_model();
    let species = vec![18, 18];
    // 19.0 apart in a 20.0 cell is 1.0 apart through the boundary.
    let wrapped = vec![0.5, 0.0, 0.0, 19.5, 0.0, 0.0];
    let direct = vec![0.5, 0.0, 0.0, 1.5, 0.0, 0.0];
    let e_wrapped = model.eval_energy(&species, &wrapped, 0, &[], &CELL).unwrap();
    let e_direct = model.eval_energy(&species, &direct, 0, &[], &CELL).unwrap();
    assert!((e_wrapped - e_direct).abs() < 1e-12);
}
