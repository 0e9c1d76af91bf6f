//! Walk parameter schemas.
//!
//! Each step family takes a serde-friendly parameter struct so outer drivers
//! can keep walk settings in configuration files. Ceilings are always hard:
//! `emax` and `ke_max` reject any trial landing at or above them. Optional
//! quantities are `Option` here; sentinel encodings exist only at the native
//! boundary.

use serde::{Deserialize, Serialize};

/// Parameters for the velocity-only MC walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VeloWalkParams {
    /// Trial moves to run inside the backend.
    pub n_steps: u32,
    /// Velocity proposal scale.
    pub step_size: f64,
    /// Translational degrees of freedom sampled per atom.
    #[serde(default = "default_n_dof")]
    pub n_dof: u32,
    /// Hard kinetic-energy ceiling.
    pub ke_max: f64,
}

/// Parameters for the position-only MC walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McWalkParams {
    /// Trial moves to run inside the backend.
    pub n_steps: u32,
    /// Half-width of the uniform position proposal.
    pub step_size: f64,
    /// Hard total-energy ceiling.
    pub emax: f64,
    /// Translational degrees of freedom sampled per atom.
    #[serde(default = "default_n_dof")]
    pub n_dof: u32,
    /// Atoms with index below this value are frozen.
    #[serde(default)]
    pub fix_n: usize,
}

/// Parameters for the combined position-velocity MC walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McVeloWalkParams {
    /// Trial moves to run inside the backend.
    pub n_steps: u32,
    /// Half-width of the uniform position proposal.
    pub step_size_pos: f64,
    /// Velocity proposal scale; must be positive for this operation.
    pub step_size_velo: f64,
    /// Hard total-energy ceiling.
    pub emax: f64,
    /// Translational degrees of freedom sampled per atom.
    #[serde(default = "default_n_dof")]
    pub n_dof: u32,
    /// Atoms with index below this value are frozen.
    #[serde(default)]
    pub fix_n: usize,
    /// Optional hard kinetic-energy ceiling for the velocity sub-moves.
    #[serde(default)]
    pub ke_max: Option<f64>,
}

/// Parameters for the Galilean MC walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GmcWalkParams {
    /// Trial moves to run inside the backend.
    pub n_steps: u32,
    /// Displacement magnitude per unit direction.
    pub step_size: f64,
    /// Hard total-energy ceiling.
    pub emax: f64,
    /// Disallow reflections that exactly reverse the direction.
    #[serde(default = "default_no_reverse")]
    pub no_reverse: bool,
    /// Random perturbation angle applied after each reflection, radians.
    #[serde(default)]
    pub pert_ang: f64,
    /// Backend debug verbosity (0 silent).
    #[serde(default)]
    pub debug: i32,
}

/// Parameters for the NVE MD walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MdWalkParams {
    /// Integration steps to run inside the backend.
    pub n_steps: u32,
    /// Integration timestep.
    pub timestep: f64,
    /// Backend debug verbosity (0 silent).
    #[serde(default)]
    pub debug: i32,
}

fn default_n_dof() -> u32 {
    3
}

fn default_no_reverse() -> bool {
    true
}
