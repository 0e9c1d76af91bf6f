//! Raw native ABI for model and sampler shared objects.
//!
//! The wire contract follows the Fortran calling convention: every scalar is
//! passed by pointer, arrays are flat row-major `f64`/`i32` buffers with an
//! explicit length argument, and exported symbols carry a trailing
//! underscore. Argument order is stable and must match the backend exactly;
//! there is no negotiation or versioning beyond the symbol names.
//!
//! Out-parameters (`final_e`, `n_try`, counters, `d_e`) are single-element
//! buffers written by the callee. Acceptance flags are `i32` with `> 0`
//! meaning accepted.

#![allow(missing_docs)]

/// Model library symbols.
pub const SYM_INIT_MODEL: &[u8] = b"nsw_init_model_\0";
pub const SYM_INIT_CONFIG: &[u8] = b"nsw_init_config_\0";
pub const SYM_EVAL_ENERGY: &[u8] = b"nsw_eval_energy_\0";
pub const SYM_EVAL_FORCES: &[u8] = b"nsw_eval_forces_\0";
pub const SYM_MOVE_ATOM_1: &[u8] = b"nsw_move_atom_1_\0";

/// Sampler library symbols.
pub const SYM_SEED_WIDTH: &[u8] = b"nsw_seed_width_\0";
pub const SYM_SET_SEED: &[u8] = b"nsw_set_seed_\0";
pub const SYM_MC_ATOM_VELO: &[u8] = b"nsw_mc_atom_velo_\0";
pub const SYM_MC_ATOM: &[u8] = b"nsw_mc_atom_\0";
pub const SYM_GMC_ATOM: &[u8] = b"nsw_gmc_atom_\0";
pub const SYM_MD_ATOM_NVE: &[u8] = b"nsw_md_atom_nve_\0";

/// `(n_params, params[n_params])`
pub type InitModelFn = unsafe extern "C" fn(*const i32, *const f64);

/// `(n, species[n], positions[n,3], cell[3,3], emax)`
pub type InitConfigFn =
    unsafe extern "C" fn(*const i32, *const i32, *const f64, *const f64, *const f64);

/// `(n, species, positions, n_extra, extra[n,n_extra], cell) -> energy`
pub type EvalEnergyFn =
    unsafe extern "C" fn(*const i32, *const i32, *const f64, *const i32, *const f64, *const f64)
        -> f64;

/// `(n, species, positions, n_extra, extra, cell, forces[n,3] out) -> energy`
pub type EvalForcesFn = unsafe extern "C" fn(
    *const i32,
    *const i32,
    *const f64,
    *const i32,
    *const f64,
    *const f64,
    *mut f64,
) -> f64;

/// `(n, species, positions io, n_extra, extra io, cell, atom, delta[3],
/// d_e_max, d_e out) -> accepted`
pub type MoveAtom1Fn = unsafe extern "C" fn(
    *const i32,
    *const i32,
    *mut f64,
    *const i32,
    *mut f64,
    *const f64,
    *const i32,
    *const f64,
    *const f64,
    *mut f64,
) -> i32;

/// `() -> width`
pub type SeedWidthFn = unsafe extern "C" fn() -> i32;

/// `(n_seed, seed[n_seed])`
pub type SetSeedFn = unsafe extern "C" fn(*const i32, *const i32);

/// `(n, velocities io, masses, n_steps, step_size, n_dof, ke_max,
/// n_try out, n_accept out, final_ke out)`
pub type McAtomVeloFn = unsafe extern "C" fn(
    *const i32,
    *mut f64,
    *const f64,
    *const i32,
    *const f64,
    *const i32,
    *const f64,
    *mut i32,
    *mut i32,
    *mut f64,
);

/// `(n, species, positions io, velocities io, masses, n_extra, extra io,
/// cell, n_steps, step_size_pos, step_size_velo, emax, n_dof, fix_n, ke_max,
/// n_try out, n_accept_pos out, n_accept_velo out, final_e out)`
pub type McAtomFn = unsafe extern "C" fn(
    *const i32,
    *const i32,
    *mut f64,
    *mut f64,
    *const f64,
    *const i32,
    *mut f64,
    *const f64,
    *const i32,
    *const f64,
    *const f64,
    *const f64,
    *const i32,
    *const i32,
    *const f64,
    *mut i32,
    *mut i32,
    *mut i32,
    *mut f64,
);

/// `(n, species, positions io, masses, n_extra, extra io, cell, n_steps,
/// emax, d_pos io, no_reverse, pert_ang, debug, n_try out, n_accept out,
/// final_e out)`
pub type GmcAtomFn = unsafe extern "C" fn(
    *const i32,
    *const i32,
    *mut f64,
    *const f64,
    *const i32,
    *mut f64,
    *const f64,
    *const i32,
    *const f64,
    *mut f64,
    *const i32,
    *const f64,
    *const i32,
    *mut i32,
    *mut i32,
    *mut f64,
);

/// `(n, species, positions io, velocities io, masses, n_extra, extra io,
/// cell, n_steps, timestep, debug, final_e out)`
pub type MdAtomNveFn = unsafe extern "C" fn(
    *const i32,
    *const i32,
    *mut f64,
    *mut f64,
    *const f64,
    *const i32,
    *mut f64,
    *const f64,
    *const i32,
    *const f64,
    *const i32,
    *mut f64,
);
