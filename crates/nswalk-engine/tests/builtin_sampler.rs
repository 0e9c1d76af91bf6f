use nswalk_core::NsError;
use nswalk_engine::{
    BuiltinSamplerBackend, GmcWalkSettings, LjParams, McWalkSettings, SamplerBackend, WalkBuffers,
};

const CELL: [f64; 9] = [12.0, 0.0, 0.0, 0.0, 12.0, 0.0, 0.0, 0.0, 12.0];

fn seeded_sampler(seed: i32) -> BuiltinSamplerBackend {
    let mut sampler = BuiltinSamplerBackend::new(LjParams::default());
    sampler.set_seed(&[seed, 2, 3, 4]).unwrap();
    sampler
}

struct Arrays {
    species: Vec<i32>,
    positions: Vec<f64>,
    masses: Vec<f64>,
}

fn trimer() -> Arrays {
    Arrays {
        species: vec![18; 3],
        positions: vec![0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 0.0, 1.5, 0.0],
        masses: vec![1.0; 3],
    }
}

fn buffers<'a>(arrays: &'a mut Arrays) -> WalkBuffers<'a> {
    WalkBuffers {
        species: &arrays.species,
        positions: &mut arrays.positions,
        masses: &arrays.masses,
        extra_width: 0,
        extra: &mut [],
        cell: &CELL,
    }
}

fn mc_settings(n_steps: i32, emax: f64) -> McWalkSettings {
    McWalkSettings {
        n_steps,
        step_size_pos: 0.2,
        step_size_velo: 0.0,
        emax,
        n_dof: 3,
        fix_n: 0,
        ke_max: -1.0,
    }
}

#[test]
fn walks_require_a_seed() {
    let mut sampler = BuiltinSamplerBackend::new(LjParams::default());
    let mut velocities = vec![0.0; 9];
    let masses = vec![1.0; 3];
    let err = sampler
        .mc_atom_walk_velo(&mut velocities, &masses, 10, 0.1, 3, -1.0)
        .unwrap_err();
    assert!(matches!(err, NsError::Rng(_)));
}

#[test]
fn seed_vector_length_is_validated() {
    let mut sampler = BuiltinSamplerBackend::new(LjParams::default());
    assert!(matches!(
        sampler.set_seed(&[1, 2]),
        Err(NsError::Rng(_))
    ));
    assert_eq!(sampler.seed_width(), 4);
    assert!(sampler.set_seed(&[1, 2, 3, 4]).is_ok());
}

#[test]
fn velocity_walk_respects_the_kinetic_ceiling() {
    let mut sampler = seeded_sampler(7);
    let mut velocities = vec![0.0; 9];
    let masses = vec![1.0; 3];
    let stats = sampler
        .mc_atom_walk_velo(&mut velocities, &masses, 200, 0.3, 3, 0.5)
        .unwrap();
    assert_eq!(stats.n_try, 200);
    assert!(stats.n_accept >= 0 && stats.n_accept <= stats.n_try);
    assert!(stats.final_ke < 0.5);
    assert!(stats.final_ke >= 0.0);
}

#[test]
fn velocity_walk_without_ceiling_accepts_every_trial() {
    let mut sampler = seeded_sampler(11);
    let mut velocities = vec![0.0; 9];
    let masses = vec![1.0; 3];
    let stats = sampler
        .mc_atom_walk_velo(&mut velocities, &masses, 50, 0.3, 3, -1.0)
        .unwrap();
    assert_eq!(stats.n_accept, stats.n_try);
}

#[test]
fn mc_walk_keeps_energy_below_the_ceiling() {
    let mut sampler = seeded_sampler(3);
    let mut arrays = trimer();
    let stats = sampler
        .mc_atom_walk(buffers(&mut arrays), None, &mc_settings(300, 1.0))
        .unwrap();
    assert_eq!(stats.n_try, 300);
    assert!(stats.n_accept >= 0 && stats.n_accept <= stats.n_try);
    assert!(stats.final_e < 1.0);
}

#[test]
fn mc_walk_rejects_frozen_configurations() {
    let mut sampler = seeded_sampler(3);
    let mut arrays = trimer();
    let mut settings = mc_settings(10, 1.0);
    settings.fix_n = 3;
    let err = sampler
        .mc_atom_walk(buffers(&mut arrays), None, &settings)
        .unwrap_err();
    assert!(matches!(err, NsError::Engine(_)));
}

#[test]
fn mc_walk_velocity_step_requires_a_buffer() {
    let mut sampler = seeded_sampler(3);
    let mut arrays = trimer();
    let mut settings = mc_settings(10, 1.0);
    settings.step_size_velo = 0.1;
    let err = sampler
        .mc_atom_walk(buffers(&mut arrays), None, &settings)
        .unwrap_err();
    assert!(matches!(err, NsError::Config(_)));
}

#[test]
fn mc_walk_counts_velocity_acceptances_separately() {
    let mut sampler = seeded_sampler(19);
    let mut arrays = trimer();
    let mut velocities = vec![0.0; 9];
    let mut settings = mc_settings(100, 5.0);
    settings.step_size_velo = 0.2;
    settings.ke_max = 1.0;
    let stats = sampler
        .mc_atom_walk(buffers(&mut arrays), Some(&mut velocities), &settings)
        .unwrap();
    assert!(stats.n_accept_velo >= 0 && stats.n_accept_velo <= stats.n_try);
}

#[test]
fn identical_seeds_reproduce_identical_walks() {
    let run = |seed: i32| {
        let mut sampler = seeded_sampler(seed);
        let mut arrays = trimer();
        let stats = sampler
            .mc_atom_walk(buffers(&mut arrays), None, &mc_settings(100, 2.0))
            .unwrap();
        (stats, arrays.positions)
    };
    let (stats_a, pos_a) = run(42);
    let (stats_b, pos_b) = run(42);
    let (stats_c, pos_c) = run(43);
    assert_eq!(stats_a, stats_b);
    assert_eq!(pos_a, pos_b);
    assert!(stats_a != stats_c || pos_a != pos_c);
}

#[test]
fn gmc_walk_reports_bounded_counters() {
    let mut sampler = seeded_sampler(5);
    let mut arrays = trimer();
    let mut d_pos = vec![0.05; 9];
    let settings = GmcWalkSettings {
        n_steps: 50,
        emax: 2.0,
        no_reverse: true,
        pert_ang: 0.0,
        debug: 0,
    };
    let stats = sampler
        .gmc_atom_walk(buffers(&mut arrays), &mut d_pos, &settings)
        .unwrap();
    assert_eq!(stats.n_try, 50);
    assert!(stats.n_accept >= 0 && stats.n_accept <= stats.n_try);
    assert!(stats.final_e < 2.0);
}

#[test]
fn md_walk_approximately_conserves_total_energy() {
    let mut sampler = seeded_sampler(1);
    let mut arrays = trimer();
    let mut velocities = vec![0.05, 0.0, 0.0, -0.05, 0.0, 0.0, 0.0, 0.02, 0.0];

    let short = sampler
        .md_atom_nve_walk(buffers(&mut arrays), &mut velocities, 1, 1e-4, 0)
        .unwrap();
    let long = sampler
        .md_atom_nve_walk(buffers(&mut arrays), &mut velocities, 500, 1e-4, 0)
        .unwrap();
    assert!((short - long).abs() < 1e-4, "drift: {short} vs {long}");
}
