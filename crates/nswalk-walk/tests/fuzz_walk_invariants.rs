use nswalk_core::{cubic_cell, Configuration};
use nswalk_engine::LjParams;
use nswalk_walk::{McWalkParams, SamplerEngine, VeloWalkParams};
use proptest::prelude::*;

fn lattice_config(n_side: usize, spacing: f64) -> Configuration {
    let n = n_side * n_side * n_side;
    let mut positions = Vec::with_capacity(3 * n);
    for x in 0..n_side {
        for y in 0..n_side {
            for z in 0..n_side {
                positions.push(x as f64 * spacing);
                positions.push(y as f64 * spacing);
                positions.push(z as f64 * spacing);
            }
        }
    }
    let mut config = Configuration::new(
        vec![18; n],
        positions,
        cubic_cell(n_side as f64 * spacing + 4.0),
        vec![1.0; n],
    )
    .unwrap();
    config.set_velocities(&vec![0.0; 3 * n]).unwrap();
    config
}

proptest! {
    #[test]
    fn position_walks_respect_counters_and_ceiling(
        seed in any::<i32>(),
        n_steps in 1u32..120,
        step_size in 0.0f64..0.6,
        n_side in 2usize..4,
    ) {
        let mut config = lattice_config(n_side, 1.3);
        let mut sampler = SamplerEngine::builtin(LjParams::default());
        sampler.set_seed(&[seed, 11, 22, 33]).unwrap();
        let emax = 5.0;
        let stats = sampler
            .mc_atom_walk(
                &mut config,
                &McWalkParams { n_steps, step_size, emax, n_dof: 3, fix_n: 0 },
            )
            .unwrap();
        prop_assert_eq!(stats.n_try, n_steps);
        prop_assert!(stats.n_accept <= stats.n_try);
        prop_assert!(stats.final_e < emax);
        prop_assert!(config.positions().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn frozen_prefix_atoms_never_move(
        seed in any::<i32>(),
        fix_n in 1usize..7,
    ) {
        let mut config = lattice_config(2, 1.4);
        let frozen_before: Vec<f64> = config.positions()[..3 * fix_n].to_vec();
        let mut sampler = SamplerEngine::builtin(LjParams::default());
        sampler.set_seed(&[seed, 5, 6, 7]).unwrap();
        sampler
            .mc_atom_walk(
                &mut config,
                &McWalkParams {
                    n_steps: 80,
                    step_size: 0.3,
                    emax: 5.0,
                    n_dof: 3,
                    fix_n,
                },
            )
            .unwrap();
        prop_assert_eq!(&config.positions()[..3 * fix_n], &frozen_before[..]);
    }

    #[test]
    fn velocity_walks_never_breach_the_kinetic_ceiling(
        seed in any::<i32>(),
        n_steps in 1u32..150,
        step_size in 0.01f64..0.8,
        ke_max in 0.05f64..3.0,
    ) {
        let mut config = lattice_config(2, 1.4);
        let mut sampler = SamplerEngine::builtin(LjParams::default());
        sampler.set_seed(&[seed, 1, 2, 3]).unwrap();
        let stats = sampler
            .mc_atom_walk_velo(
                &mut config,
                &VeloWalkParams { n_steps, step_size, n_dof: 3, ke_max },
            )
            .unwrap();
        prop_assert_eq!(stats.n_try, n_steps);
        prop_assert!(stats.n_accept <= stats.n_try);
        prop_assert!(stats.final_ke < ke_max);
    }

    #[test]
    fn configuration_shapes_are_validated(
        n_atoms in 1usize..6,
        surplus in 1usize..4,
    ) {
        let good = Configuration::new(
            vec![1; n_atoms],
            vec![0.5; 3 * n_atoms],
            cubic_cell(10.0),
            vec![1.0; n_atoms],
        );
        prop_assert!(good.is_ok());

        let bad_positions = Configuration::new(
            vec![1; n_atoms],
            vec![0.5; 3 * n_atoms + surplus],
            cubic_cell(10.0),
            vec![1.0; n_atoms],
        );
        prop_assert!(bad_positions.is_err());

        let bad_masses = Configuration::new(
            vec![1; n_atoms],
            vec![0.5; 3 * n_atoms],
            cubic_cell(10.0),
            vec![1.0; n_atoms + surplus],
        );
        prop_assert!(bad_masses.is_err());
    }
}
