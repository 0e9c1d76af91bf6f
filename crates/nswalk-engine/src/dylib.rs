//! `libloading`-backed implementations of the backend traits.
//!
//! Each backend owns one [`Library`] for the lifetime of the process and
//! resolves symbols lazily per call. Buffers cross the boundary as raw
//! pointers following the layout documented in [`crate::abi`]; the absent
//! cases marshal the documented sentinels (a one-element dummy buffer for
//! missing velocities/auxiliary data, `0.0` velocity step, negative
//! `ke_max`). A fault inside a native call cannot be intercepted here: a
//! backend that aborts takes the process with it, which is the documented
//! failure model for this layer.

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use nswalk_core::{ErrorInfo, NsError};

use crate::abi;
use crate::backend::{
    GmcWalkSettings, McWalkSettings, ModelBackend, PosWalkStats, SamplerBackend, TrialMove,
    VeloWalkStats, WalkBuffers,
};
use crate::discover::resolve_engine_path;

fn open_library(spec: &Path) -> Result<(Library, PathBuf), NsError> {
    let path = resolve_engine_path(spec)?;
    // SAFETY: loading a shared object runs its initializers; the backend
    // contract requires engines to be side-effect free at load time.
    let library = unsafe { Library::new(&path) }.map_err(|err| {
        NsError::Engine(
            ErrorInfo::new("engine.load", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    Ok((library, path))
}

fn get_symbol<'lib, T>(
    library: &'lib Library,
    name: &'static [u8],
) -> Result<Symbol<'lib, T>, NsError> {
    // SAFETY: the symbol type aliases in `abi` describe the engine ABI; a
    // mismatched backend is undefined behavior the same way a mismatched
    // Fortran interface block would be.
    unsafe { library.get(name) }.map_err(|err| {
        NsError::Engine(
            ErrorInfo::new("engine.symbol", err.to_string())
                .with_context("symbol", String::from_utf8_lossy(&name[..name.len() - 1])),
        )
    })
}

/// Model engine loaded from a native shared object.
#[derive(Debug)]
pub struct DylibModelBackend {
    library: Library,
    path: PathBuf,
}

impl DylibModelBackend {
    /// Resolves and loads the model shared object.
    pub fn open(spec: &Path) -> Result<Self, NsError> {
        let (library, path) = open_library(spec)?;
        Ok(Self { library, path })
    }

    /// Filesystem path the backend was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelBackend for DylibModelBackend {
    fn init_model(&mut self, params: &[f64]) -> Result<(), NsError> {
        let func = get_symbol::<abi::InitModelFn>(&self.library, abi::SYM_INIT_MODEL)?;
        let n_params = params.len() as i32;
        unsafe { func(&n_params, params.as_ptr()) };
        Ok(())
    }

    fn init_config(
        &mut self,
        species: &[i32],
        positions: &[f64],
        cell: &[f64; 9],
        emax: f64,
    ) -> Result<(), NsError> {
        let func = get_symbol::<abi::InitConfigFn>(&self.library, abi::SYM_INIT_CONFIG)?;
        let n = species.len() as i32;
        unsafe {
            func(
                &n,
                species.as_ptr(),
                positions.as_ptr(),
                cell.as_ptr(),
                &emax,
            )
        };
        Ok(())
    }

    fn eval_energy(
        &mut self,
        species: &[i32],
        positions: &[f64],
        extra_width: usize,
        extra: &[f64],
        cell: &[f64; 9],
    ) -> Result<f64, NsError> {
        let func = get_symbol::<abi::EvalEnergyFn>(&self.library, abi::SYM_EVAL_ENERGY)?;
        let n = species.len() as i32;
        let n_extra = extra_width as i32;
        let dummy = [0.0f64; 1];
        let extra_ptr = if extra.is_empty() {
            dummy.as_ptr()
        } else {
            extra.as_ptr()
        };
        let energy = unsafe {
            func(
                &n,
                species.as_ptr(),
                positions.as_ptr(),
                &n_extra,
                extra_ptr,
                cell.as_ptr(),
            )
        };
        Ok(energy)
    }

    fn eval_forces(
        &mut self,
        species: &[i32],
        positions: &[f64],
        extra_width: usize,
        extra: &[f64],
        cell: &[f64; 9],
        forces: &mut [f64],
    ) -> Result<f64, NsError> {
        if forces.len() != positions.len() {
            return Err(NsError::shape(
                "engine.forces",
                positions.len(),
                forces.len(),
            ));
        }
        let func = get_symbol::<abi::EvalForcesFn>(&self.library, abi::SYM_EVAL_FORCES)?;
        let n = species.len() as i32;
        let n_extra = extra_width as i32;
        let dummy = [0.0f64; 1];
        let extra_ptr = if extra.is_empty() {
            dummy.as_ptr()
        } else {
            extra.as_ptr()
        };
        let energy = unsafe {
            func(
                &n,
                species.as_ptr(),
                positions.as_ptr(),
                &n_extra,
                extra_ptr,
                cell.as_ptr(),
                forces.as_mut_ptr(),
            )
        };
        Ok(energy)
    }

    fn move_atom_1(
        &mut self,
        species: &[i32],
        positions: &mut [f64],
        extra_width: usize,
        extra: &mut [f64],
        cell: &[f64; 9],
        atom: usize,
        delta: &[f64; 3],
        d_e_max: f64,
    ) -> Result<TrialMove, NsError> {
        let func = get_symbol::<abi::MoveAtom1Fn>(&self.library, abi::SYM_MOVE_ATOM_1)?;
        let n = species.len() as i32;
        let n_extra = extra_width as i32;
        let atom_index = atom as i32;
        let mut dummy = [0.0f64; 1];
        let extra_ptr = if extra.is_empty() {
            dummy.as_mut_ptr()
        } else {
            extra.as_mut_ptr()
        };
        let mut d_e = [0.0f64; 1];
        let accepted = unsafe {
            func(
                &n,
                species.as_ptr(),
                positions.as_mut_ptr(),
                &n_extra,
                extra_ptr,
                cell.as_ptr(),
                &atom_index,
                delta.as_ptr(),
                &d_e_max,
                d_e.as_mut_ptr(),
            )
        };
        Ok(TrialMove {
            accepted: accepted > 0,
            d_e: d_e[0],
        })
    }
}

/// Sampler engine loaded from a native shared object.
#[derive(Debug)]
pub struct DylibSamplerBackend {
    library: Library,
    path: PathBuf,
}

impl DylibSamplerBackend {
    /// Resolves and loads the sampler shared object.
    pub fn open(spec: &Path) -> Result<Self, NsError> {
        let (library, path) = open_library(spec)?;
        Ok(Self { library, path })
    }

    /// Filesystem path the backend was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SamplerBackend for DylibSamplerBackend {
    fn seed_width(&self) -> usize {
        match get_symbol::<abi::SeedWidthFn>(&self.library, abi::SYM_SEED_WIDTH) {
            Ok(func) => unsafe { func() }.max(0) as usize,
            Err(_) => 0,
        }
    }

    fn set_seed(&mut self, seed: &[i32]) -> Result<(), NsError> {
        let func = get_symbol::<abi::SetSeedFn>(&self.library, abi::SYM_SET_SEED)?;
        let n_seed = seed.len() as i32;
        unsafe { func(&n_seed, seed.as_ptr()) };
        Ok(())
    }

    fn mc_atom_walk_velo(
        &mut self,
        velocities: &mut [f64],
        masses: &[f64],
        n_steps: i32,
        step_size: f64,
        n_dof: i32,
        ke_max: f64,
    ) -> Result<VeloWalkStats, NsError> {
        let func = get_symbol::<abi::McAtomVeloFn>(&self.library, abi::SYM_MC_ATOM_VELO)?;
        let n = masses.len() as i32;
        let mut final_ke = [0.0f64; 1];
        let mut n_try = [0i32; 1];
        let mut n_accept = [0i32; 1];
        unsafe {
            func(
                &n,
                velocities.as_mut_ptr(),
                masses.as_ptr(),
                &n_steps,
                &step_size,
                &n_dof,
                &ke_max,
                n_try.as_mut_ptr(),
                n_accept.as_mut_ptr(),
                final_ke.as_mut_ptr(),
            )
        };
        Ok(VeloWalkStats {
            n_try: n_try[0],
            n_accept: n_accept[0],
            final_ke: final_ke[0],
        })
    }

    fn mc_atom_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        velocities: Option<&mut [f64]>,
        settings: &McWalkSettings,
    ) -> Result<PosWalkStats, NsError> {
        let func = get_symbol::<abi::McAtomFn>(&self.library, abi::SYM_MC_ATOM)?;
        let n = buffers.n_atoms() as i32;
        let n_extra = buffers.extra_width as i32;
        let mut extra_dummy = [0.0f64; 1];
        let extra_ptr = if buffers.extra.is_empty() {
            extra_dummy.as_mut_ptr()
        } else {
            buffers.extra.as_mut_ptr()
        };
        let mut velo_dummy = [0.0f64; 1];
        let velo_ptr = match velocities {
            Some(velo) => velo.as_mut_ptr(),
            None => velo_dummy.as_mut_ptr(),
        };
        let mut final_e = [0.0f64; 1];
        let mut n_try = [0i32; 1];
        let mut n_accept_pos = [0i32; 1];
        let mut n_accept_velo = [0i32; 1];
        unsafe {
            func(
                &n,
                buffers.species.as_ptr(),
                buffers.positions.as_mut_ptr(),
                velo_ptr,
                buffers.masses.as_ptr(),
                &n_extra,
                extra_ptr,
                buffers.cell.as_ptr(),
                &settings.n_steps,
                &settings.step_size_pos,
                &settings.step_size_velo,
                &settings.emax,
                &settings.n_dof,
                &settings.fix_n,
                &settings.ke_max,
                n_try.as_mut_ptr(),
                n_accept_pos.as_mut_ptr(),
                n_accept_velo.as_mut_ptr(),
                final_e.as_mut_ptr(),
            )
        };
        Ok(PosWalkStats {
            n_try: n_try[0],
            n_accept: n_accept_pos[0],
            n_accept_velo: n_accept_velo[0],
            final_e: final_e[0],
        })
    }

    fn gmc_atom_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        d_pos: &mut [f64],
        settings: &GmcWalkSettings,
    ) -> Result<PosWalkStats, NsError> {
        let func = get_symbol::<abi::GmcAtomFn>(&self.library, abi::SYM_GMC_ATOM)?;
        let n = buffers.n_atoms() as i32;
        let n_extra = buffers.extra_width as i32;
        let mut extra_dummy = [0.0f64; 1];
        let extra_ptr = if buffers.extra.is_empty() {
            extra_dummy.as_mut_ptr()
        } else {
            buffers.extra.as_mut_ptr()
        };
        let no_reverse = i32::from(settings.no_reverse);
        let mut final_e = [0.0f64; 1];
        let mut n_try = [0i32; 1];
        let mut n_accept = [0i32; 1];
        unsafe {
            func(
                &n,
                buffers.species.as_ptr(),
                buffers.positions.as_mut_ptr(),
                buffers.masses.as_ptr(),
                &n_extra,
                extra_ptr,
                buffers.cell.as_ptr(),
                &settings.n_steps,
                &settings.emax,
                d_pos.as_mut_ptr(),
                &no_reverse,
                &settings.pert_ang,
                &settings.debug,
                n_try.as_mut_ptr(),
                n_accept.as_mut_ptr(),
                final_e.as_mut_ptr(),
            )
        };
        Ok(PosWalkStats {
            n_try: n_try[0],
            n_accept: n_accept[0],
            n_accept_velo: 0,
            final_e: final_e[0],
        })
    }

    fn md_atom_nve_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        velocities: &mut [f64],
        n_steps: i32,
        timestep: f64,
        debug: i32,
    ) -> Result<f64, NsError> {
        let func = get_symbol::<abi::MdAtomNveFn>(&self.library, abi::SYM_MD_ATOM_NVE)?;
        let n = buffers.n_atoms() as i32;
        let n_extra = buffers.extra_width as i32;
        let mut extra_dummy = [0.0f64; 1];
        let extra_ptr = if buffers.extra.is_empty() {
            extra_dummy.as_mut_ptr()
        } else {
            buffers.extra.as_mut_ptr()
        };
        let mut final_e = [0.0f64; 1];
        unsafe {
            func(
                &n,
                buffers.species.as_ptr(),
                buffers.positions.as_mut_ptr(),
                velocities.as_mut_ptr(),
                buffers.masses.as_ptr(),
                &n_extra,
                extra_ptr,
                buffers.cell.as_ptr(),
                &n_steps,
                &timestep,
                &debug,
                final_e.as_mut_ptr(),
            )
        };
        Ok(final_e[0])
    }
}
