//! Backend traits implemented by every numerical engine.
//!
//! Two families of engines plug into the walk layer: a model backend
//! (energy/force evaluation plus the single-atom trial-move primitive) and a
//! sampler backend (whole-trajectory walks under hard ceilings). The traits
//! mirror the native call surface closely, so optional quantities appear here
//! with the documented absent sentinels (`ke_max < 0.0` disables the kinetic
//! ceiling, `step_size_velo == 0.0` disables velocity sub-moves); the public
//! walk API re-expresses them as `Option` and split operations.
//!
//! Every state-advancing call takes `&mut self`: a handle has exactly one
//! caller at a time and calls are strictly ordered by invocation order.

use nswalk_core::NsError;
use serde::{Deserialize, Serialize};

/// Outcome of a single-atom trial move reported by a model backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialMove {
    /// Whether the backend committed the move into the scratch buffers.
    pub accepted: bool,
    /// Energy change of the proposed move, reported even on rejection.
    pub d_e: f64,
}

/// Potential-model engine contract.
///
/// `init_config` must run once per distinct configuration before
/// `eval_energy`/`move_atom_1` touch it; backends may key internal
/// neighbor-list state to that call. Shape correctness is the caller's
/// responsibility: array lengths are derived from `species.len()` and
/// backends perform no defensive reshaping.
pub trait ModelBackend: Send {
    /// Passes the flat model parameter vector to the backend once.
    fn init_model(&mut self, params: &[f64]) -> Result<(), NsError>;

    /// Registers a configuration and its energy ceiling with the backend.
    fn init_config(
        &mut self,
        species: &[i32],
        positions: &[f64],
        cell: &[f64; 9],
        emax: f64,
    ) -> Result<(), NsError>;

    /// Evaluates the total energy. Pure with respect to every buffer.
    fn eval_energy(
        &mut self,
        species: &[i32],
        positions: &[f64],
        extra_width: usize,
        extra: &[f64],
        cell: &[f64; 9],
    ) -> Result<f64, NsError>;

    /// Writes forces in place and returns the matching energy.
    ///
    /// Forces and energy are mutually consistent: `forces = -grad E` at the
    /// supplied positions. `forces` must have length `3 * species.len()`.
    fn eval_forces(
        &mut self,
        species: &[i32],
        positions: &[f64],
        extra_width: usize,
        extra: &[f64],
        cell: &[f64; 9],
        forces: &mut [f64],
    ) -> Result<f64, NsError>;

    /// Proposes moving `atom` by `delta` under the hard ceiling `d_e_max`.
    ///
    /// Any move with `d_e >= d_e_max` is rejected regardless of stochastic
    /// criteria. On acceptance the backend writes the new position (and the
    /// atom's auxiliary slice) into the scratch buffers; on rejection both
    /// buffers hold their pre-call values.
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<TrialMove, NsError>;
}

/// Borrowed configuration buffers handed to a sampler walk.
///
/// `extra` is empty with `extra_width == 0` when the configuration carries no
/// auxiliary payload; a sampler must never receive a null buffer in its
/// place.
#[derive(Debug)]
pub struct WalkBuffers<'a> {
    /// Atomic numbers, immutable during the walk.
    pub species: &'a [i32],
    /// Flat `[n, 3]` positions, committed in place at the walk endpoint.
    pub positions: &'a mut [f64],
    /// Per-atom masses, immutable during the walk.
    pub masses: &'a [f64],
    /// Per-atom auxiliary width (0 when absent).
    pub extra_width: usize,
    /// Flat auxiliary values, committed alongside positions.
    pub extra: &'a mut [f64],
    /// Row-wise lattice vectors.
    pub cell: &'a [f64; 9],
}

impl WalkBuffers<'_> {
    /// Number of atoms covered by the buffers.
    pub fn n_atoms(&self) -> usize {
        self.species.len()
    }
}

/// Scalar settings for the combined MC walk, in native call order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McWalkSettings {
    /// Trial moves to run inside the backend.
    pub n_steps: i32,
    /// Half-width of the uniform position proposal.
    pub step_size_pos: f64,
    /// Velocity proposal scale; `0.0` disables velocity sub-moves.
    pub step_size_velo: f64,
    /// Hard total-energy ceiling; trials landing at or above are rejected.
    pub emax: f64,
    /// Translational degrees of freedom sampled per atom.
    pub n_dof: i32,
    /// Atoms with index below this value are frozen.
    pub fix_n: i32,
    /// Hard kinetic-energy ceiling; negative disables it.
    pub ke_max: f64,
}

/// Scalar settings for the Galilean walk, in native call order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GmcWalkSettings {
    /// Trial moves to run inside the backend.
    pub n_steps: i32,
    /// Hard total-energy ceiling.
    pub emax: f64,
    /// Disallow reflections that exactly reverse the direction.
    pub no_reverse: bool,
    /// Random perturbation angle applied after each reflection, radians.
    pub pert_ang: f64,
    /// Backend debug verbosity (0 silent).
    pub debug: i32,
}

/// Counters returned by the velocity-only MC walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VeloWalkStats {
    /// Trial moves attempted.
    pub n_try: i32,
    /// Trial moves accepted.
    pub n_accept: i32,
    /// Kinetic energy at the walk endpoint.
    pub final_ke: f64,
}

/// Counters returned by position-space walks (combined MC, GMC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PosWalkStats {
    /// Trial moves attempted.
    pub n_try: i32,
    /// Position trials accepted.
    pub n_accept: i32,
    /// Velocity trials accepted (0 when velocity sub-moves are disabled).
    pub n_accept_velo: i32,
    /// Total energy at the walk endpoint.
    pub final_e: f64,
}

/// Step-family sampler engine contract.
///
/// The sampler owns the random stream. `set_seed` installs it before any
/// stochastic walk; reseeding mid-run is legal but breaks reproducibility for
/// earlier calls only. The buffers handed to a walk are committed in place to
/// the trajectory endpoint regardless of how many individual trials were
/// accepted.
pub trait SamplerBackend: Send {
    /// Required seed-vector length of this backend.
    fn seed_width(&self) -> usize;

    /// Installs the random stream from an integer seed vector.
    fn set_seed(&mut self, seed: &[i32]) -> Result<(), NsError>;

    /// MC walk purely in velocity space under the `ke_max` ceiling.
    ///
    /// `n_dof` caps the Cartesian components sampled per atom; `ke_max < 0.0`
    /// disables the ceiling.
    fn mc_atom_walk_velo(
        &mut self,
        velocities: &mut [f64],
        masses: &[f64],
        n_steps: i32,
        step_size: f64,
        n_dof: i32,
        ke_max: f64,
    ) -> Result<VeloWalkStats, NsError>;

    /// Combined position (and optionally velocity) MC walk.
    ///
    /// `velocities` must be `Some` exactly when `settings.step_size_velo`
    /// is positive.
    fn mc_atom_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        velocities: Option<&mut [f64]>,
        settings: &McWalkSettings,
    ) -> Result<PosWalkStats, NsError>;

    /// Galilean MC walk along the persistent displacement `d_pos`.
    ///
    /// `d_pos` enters as `step_size * direction` and leaves as the
    /// (unnormalized) direction reached by the walk; the caller re-normalizes
    /// before storing it.
    fn gmc_atom_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        d_pos: &mut [f64],
        settings: &GmcWalkSettings,
    ) -> Result<PosWalkStats, NsError>;

    /// Deterministic NVE integration; always commits the endpoint.
    ///
    /// Returns the total (potential plus kinetic) energy at the endpoint.
    fn md_atom_nve_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        velocities: &mut [f64],
        n_steps: i32,
        timestep: f64,
        debug: i32,
    ) -> Result<f64, NsError>;
}
