//! Accept/reject statistics returned to the outer driver.

use serde::{Deserialize, Serialize};

/// Statistics from a position-space walk (MC or GMC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Trial moves attempted.
    pub n_try: u32,
    /// Trial moves accepted.
    pub n_accept: u32,
    /// Total energy at the walk endpoint.
    pub final_e: f64,
}

/// Statistics from the combined position-velocity walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkVeloStats {
    /// Trial moves attempted.
    pub n_try: u32,
    /// Position trials accepted.
    pub n_accept_pos: u32,
    /// Velocity trials accepted.
    pub n_accept_velo: u32,
    /// Total energy at the walk endpoint.
    pub final_e: f64,
}

/// Statistics from the velocity-only walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticWalkStats {
    /// Trial moves attempted.
    pub n_try: u32,
    /// Trial moves accepted.
    pub n_accept: u32,
    /// Kinetic energy at the walk endpoint.
    pub final_ke: f64,
}

pub(crate) fn counter(raw: i32) -> u32 {
    raw.max(0) as u32
}
