//! Sampler engine context: seeding and the four step families.
//!
//! Every walk follows the same commit rule: the backend runs `n_steps`
//! trials internally, and whatever trajectory endpoint it reaches is
//! authoritative, so the returned buffers are always written back into the
//! [`Configuration`] regardless of the accept counters. Auxiliary data
//! travels under the same rule. (The single-atom trial move with its
//! commit-on-accept semantics lives on [`crate::ModelEngine`].)

use nswalk_core::{Configuration, ErrorInfo, NsError};
use nswalk_engine::{
    builtin, GmcWalkSettings, LjParams, McWalkSettings, SamplerBackend, WalkBuffers,
};

use crate::params::{GmcWalkParams, McVeloWalkParams, McWalkParams, MdWalkParams, VeloWalkParams};
use crate::stats::{counter, KineticWalkStats, WalkStats, WalkVeloStats};

/// Owned context for a step-family sampler engine.
///
/// The context owns the backend's random stream through it: `set_seed`
/// installs the stream and stochastic walks refuse to run before it. Calls
/// are serialized by `&mut self`; independent contexts never interfere.
pub struct SamplerEngine {
    backend: Box<dyn SamplerBackend>,
    seeded: bool,
}

impl SamplerEngine {
    /// Wraps an already-constructed backend.
    pub fn new(backend: Box<dyn SamplerBackend>) -> Self {
        Self {
            backend,
            seeded: false,
        }
    }

    /// Creates a context over the built-in sampler bound to `params`.
    pub fn builtin(params: LjParams) -> Self {
        Self::new(Box::new(builtin::BuiltinSamplerBackend::new(params)))
    }

    /// Loads a native sampler shared object.
    #[cfg(feature = "dynamic")]
    pub fn from_shared_object(spec: &std::path::Path) -> Result<Self, NsError> {
        Ok(Self::new(Box::new(
            nswalk_engine::DylibSamplerBackend::open(spec)?,
        )))
    }

    /// Required seed-vector length of the bound backend.
    pub fn seed_width(&self) -> usize {
        self.backend.seed_width()
    }

    /// Whether a seed has been installed on this context.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Installs the random stream from an integer seed vector.
    ///
    /// The vector length must match [`seed_width`](Self::seed_width).
    /// Reseeding mid-run is legal; it only invalidates reproducibility
    /// guarantees for the calls that follow.
    pub fn set_seed(&mut self, seed: &[i32]) -> Result<(), NsError> {
        let width = self.backend.seed_width();
        if seed.len() != width {
            return Err(NsError::Rng(
                ErrorInfo::new("walk.seed_width", "seed vector has the wrong length")
                    .with_context("expected", width.to_string())
                    .with_context("actual", seed.len().to_string()),
            ));
        }
        self.backend.set_seed(seed)?;
        self.seeded = true;
        Ok(())
    }

    fn require_seeded(&self) -> Result<(), NsError> {
        if self.seeded {
            Ok(())
        } else {
            Err(NsError::Rng(
                ErrorInfo::new("walk.unseeded", "stochastic walk before set_seed")
                    .with_hint("call set_seed exactly once before the first walk"),
            ))
        }
    }

    /// MC walk purely in velocity space under the `ke_max` ceiling.
    ///
    /// The endpoint velocities are always committed.
    pub fn mc_atom_walk_velo(
        &mut self,
        config: &mut Configuration,
        params: &VeloWalkParams,
    ) -> Result<KineticWalkStats, NsError> {
        self.require_seeded()?;
        let mut velocities = config.require_velocities()?.to_vec();
        let stats = self.backend.mc_atom_walk_velo(
            &mut velocities,
            config.masses(),
            params.n_steps as i32,
            params.step_size,
            params.n_dof as i32,
            params.ke_max,
        )?;
        config.set_velocities(&velocities)?;
        Ok(KineticWalkStats {
            n_try: counter(stats.n_try),
            n_accept: counter(stats.n_accept),
            final_ke: stats.final_ke,
        })
    }

    /// Position-only MC walk under the hard `emax` ceiling.
    pub fn mc_atom_walk(
        &mut self,
        config: &mut Configuration,
        params: &McWalkParams,
    ) -> Result<WalkStats, NsError> {
        self.require_seeded()?;
        let settings = McWalkSettings {
            n_steps: params.n_steps as i32,
            step_size_pos: params.step_size,
            step_size_velo: 0.0,
            emax: params.emax,
            n_dof: params.n_dof as i32,
            fix_n: params.fix_n as i32,
            ke_max: -1.0,
        };
        let (stats, positions, extra) = {
            let mut positions = config.positions().to_vec();
            let mut extra = config.extra_values().to_vec();
            let buffers = WalkBuffers {
                species: config.species(),
                positions: &mut positions,
                masses: config.masses(),
                extra_width: config.extra_width(),
                extra: &mut extra,
                cell: config.cell(),
            };
            let stats = self.backend.mc_atom_walk(buffers, None, &settings)?;
            (stats, positions, extra)
        };
        commit_walk(config, &positions, &extra)?;
        Ok(WalkStats {
            n_try: counter(stats.n_try),
            n_accept: counter(stats.n_accept),
            final_e: stats.final_e,
        })
    }

    /// Combined position-velocity MC walk.
    ///
    /// Velocity sub-moves run under the optional kinetic ceiling; both
    /// endpoint arrays are always committed.
    pub fn mc_atom_walk_with_velocities(
        &mut self,
        config: &mut Configuration,
        params: &McVeloWalkParams,
    ) -> Result<WalkVeloStats, NsError> {
        self.require_seeded()?;
        if params.step_size_velo <= 0.0 {
            return Err(NsError::Config(ErrorInfo::new(
                "walk.step_size_velo",
                "combined walk requires a positive velocity step size",
            )));
        }
        let mut velocities = config.require_velocities()?.to_vec();
        let settings = McWalkSettings {
            n_steps: params.n_steps as i32,
            step_size_pos: params.step_size_pos,
            step_size_velo: params.step_size_velo,
            emax: params.emax,
            n_dof: params.n_dof as i32,
            fix_n: params.fix_n as i32,
            ke_max: params.ke_max.unwrap_or(-1.0),
        };
        let (stats, positions, extra) = {
            let mut positions = config.positions().to_vec();
            let mut extra = config.extra_values().to_vec();
            let buffers = WalkBuffers {
                species: config.species(),
                positions: &mut positions,
                masses: config.masses(),
                extra_width: config.extra_width(),
                extra: &mut extra,
                cell: config.cell(),
            };
            let stats = self
                .backend
                .mc_atom_walk(buffers, Some(&mut velocities), &settings)?;
            (stats, positions, extra)
        };
        commit_walk(config, &positions, &extra)?;
        config.set_velocities(&velocities)?;
        Ok(WalkVeloStats {
            n_try: counter(stats.n_try),
            n_accept_pos: counter(stats.n_accept),
            n_accept_velo: counter(stats.n_accept_velo),
            final_e: stats.final_e,
        })
    }

    /// Galilean MC walk along the configuration's persistent direction.
    ///
    /// The direction buffer enters scaled by `step_size` and is stored back
    /// re-normalized to unit norm per atom.
    pub fn gmc_atom_walk(
        &mut self,
        config: &mut Configuration,
        params: &GmcWalkParams,
    ) -> Result<WalkStats, NsError> {
        self.require_seeded()?;
        if params.step_size <= 0.0 {
            return Err(NsError::Config(ErrorInfo::new(
                "walk.gmc_step_size",
                "Galilean walk requires a positive step size",
            )));
        }
        let mut d_pos: Vec<f64> = config
            .require_gmc_direction()?
            .iter()
            .map(|d| d * params.step_size)
            .collect();
        let settings = GmcWalkSettings {
            n_steps: params.n_steps as i32,
            emax: params.emax,
            no_reverse: params.no_reverse,
            pert_ang: params.pert_ang,
            debug: params.debug,
        };
        let (stats, positions, extra) = {
            let mut positions = config.positions().to_vec();
            let mut extra = config.extra_values().to_vec();
            let buffers = WalkBuffers {
                species: config.species(),
                positions: &mut positions,
                masses: config.masses(),
                extra_width: config.extra_width(),
                extra: &mut extra,
                cell: config.cell(),
            };
            let stats = self.backend.gmc_atom_walk(buffers, &mut d_pos, &settings)?;
            (stats, positions, extra)
        };
        commit_walk(config, &positions, &extra)?;
        config.store_gmc_direction(&d_pos)?;
        Ok(WalkStats {
            n_try: counter(stats.n_try),
            n_accept: counter(stats.n_accept),
            final_e: stats.final_e,
        })
    }

    /// Deterministic NVE integration; always commits the endpoint.
    ///
    /// Returns the total (potential plus kinetic) energy at the endpoint.
    /// Consumes no randomness, so it may run before `set_seed`.
    pub fn md_atom_nve_walk(
        &mut self,
        config: &mut Configuration,
        params: &MdWalkParams,
    ) -> Result<f64, NsError> {
        if params.timestep <= 0.0 {
            return Err(NsError::Config(ErrorInfo::new(
                "walk.timestep",
                "NVE walk requires a positive timestep",
            )));
        }
        let mut velocities = config.require_velocities()?.to_vec();
        let (final_e, positions, extra) = {
            let mut positions = config.positions().to_vec();
            let mut extra = config.extra_values().to_vec();
            let buffers = WalkBuffers {
                species: config.species(),
                positions: &mut positions,
                masses: config.masses(),
                extra_width: config.extra_width(),
                extra: &mut extra,
                cell: config.cell(),
            };
            let final_e = self.backend.md_atom_nve_walk(
                buffers,
                &mut velocities,
                params.n_steps as i32,
                params.timestep,
                params.debug,
            )?;
            (final_e, positions, extra)
        };
        commit_walk(config, &positions, &extra)?;
        config.set_velocities(&velocities)?;
        Ok(final_e)
    }
}

fn commit_walk(
    config: &mut Configuration,
    positions: &[f64],
    extra: &[f64],
) -> Result<(), NsError> {
    config.set_positions(positions)?;
    if config.extra_width() > 0 {
        config.set_extra_values(extra)?;
    }
    Ok(())
}
