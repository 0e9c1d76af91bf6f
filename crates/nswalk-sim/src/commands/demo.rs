use std::error::Error;

use clap::Args;
use nswalk_core::{cubic_cell, Configuration};
use nswalk_engine::LjParams;
use nswalk_walk::{
    GmcWalkParams, KineticWalkStats, McVeloWalkParams, McWalkParams, MdWalkParams, ModelEngine,
    SamplerEngine, VeloWalkParams, WalkStats, WalkVeloStats,
};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Seed word for the deterministic demo run.
    #[arg(long, default_value_t = 2024)]
    pub seed: i32,
    /// Atoms per cube edge of the starting lattice.
    #[arg(long, default_value_t = 3)]
    pub lattice: usize,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    seed: i32,
    n_atoms: usize,
    initial_energy: f64,
    velocity_walk: KineticWalkStats,
    position_walk: WalkStats,
    combined_walk: WalkVeloStats,
    galilean_walk: WalkStats,
    nve_final_energy: f64,
    final_energy: f64,
}

pub fn run(args: &DemoArgs) -> Result<(), Box<dyn Error>> {
    let report = build_report(args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_report(args: &DemoArgs) -> Result<DemoReport, Box<dyn Error>> {
    let side = args.lattice.max(2);
    let mut config = lattice(side, 1.3)?;
    let mut model = ModelEngine::builtin(LjParams::default())?;
    let initial_energy = model.eval_energy(&config)?;
    let emax = initial_energy + 3.0;

    let mut sampler = SamplerEngine::builtin(LjParams::default());
    sampler.set_seed(&[args.seed, 1, 2, 3])?;

    let velocity_walk = sampler.mc_atom_walk_velo(
        &mut config,
        &VeloWalkParams {
            n_steps: 200,
            step_size: 0.2,
            n_dof: 3,
            ke_max: 1.0,
        },
    )?;
    let position_walk = sampler.mc_atom_walk(
        &mut config,
        &McWalkParams {
            n_steps: 400,
            step_size: 0.2,
            emax,
            n_dof: 3,
            fix_n: 0,
        },
    )?;
    let combined_walk = sampler.mc_atom_walk_with_velocities(
        &mut config,
        &McVeloWalkParams {
            n_steps: 200,
            step_size_pos: 0.15,
            step_size_velo: 0.2,
            emax,
            n_dof: 3,
            fix_n: 0,
            ke_max: Some(1.0),
        },
    )?;
    config.attach_gmc_direction(vec![1.0; 3 * config.n_atoms()])?;
    let galilean_walk = sampler.gmc_atom_walk(
        &mut config,
        &GmcWalkParams {
            n_steps: 100,
            step_size: 0.05,
            emax,
            no_reverse: true,
            pert_ang: 0.2,
            debug: 0,
        },
    )?;
    let nve_final_energy = sampler.md_atom_nve_walk(
        &mut config,
        &MdWalkParams {
            n_steps: 200,
            timestep: 1e-3,
            debug: 0,
        },
    )?;
    let final_energy = model.eval_energy(&config)?;

    Ok(DemoReport {
        seed: args.seed,
        n_atoms: config.n_atoms(),
        initial_energy,
        velocity_walk,
        position_walk,
        combined_walk,
        galilean_walk,
        nve_final_energy,
        final_energy,
    })
}

fn lattice(side: usize, spacing: f64) -> Result<Configuration, Box<dyn Error>> {
    let n = side * side * side;
    let mut positions = Vec::with_capacity(3 * n);
    for x in 0..side {
        for y in 0..side {
            for z in 0..side {
                positions.push(x as f64 * spacing);
                positions.push(y as f64 * spacing);
                positions.push(z as f64 * spacing);
            }
        }
    }
    let mut config = Configuration::new(
        vec![18; n],
        positions,
        cubic_cell(side as f64 * spacing + 4.0),
        vec![1.0; n],
    )?;
    config.set_velocities(&vec![0.0; 3 * n])?;
    Ok(config)
}
