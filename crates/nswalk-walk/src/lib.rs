#![deny(missing_docs)]

//! Orchestration layer for bounded MC/MD walks.
//!
//! This crate connects an atomic [`Configuration`](nswalk_core::Configuration)
//! to a pair of engine contexts: a [`ModelEngine`] for energetics and the
//! single-atom trial move, and a [`SamplerEngine`] for whole-trajectory walks
//! under hard energy and kinetic-energy ceilings. It builds the flat call
//! buffers, dispatches to the bound backend, and writes results back into the
//! configuration under the commit rules of each operation.

/// Model engine context and the single-atom trial move.
pub mod model;
/// Walk parameter schemas.
pub mod params;
/// Sampler engine context and the four step families.
pub mod sampler;
/// Accept/reject statistics types.
pub mod stats;

pub use model::{ForceEval, ModelEngine, SingleMoveOutcome};
pub use params::{GmcWalkParams, McVeloWalkParams, McWalkParams, MdWalkParams, VeloWalkParams};
pub use sampler::SamplerEngine;
pub use stats::{KineticWalkStats, WalkStats, WalkVeloStats};
