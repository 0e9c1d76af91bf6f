#![deny(missing_docs)]
#![doc = "Engine boundary for nswalk: the model and sampler backend traits, the raw native ABI, shared-object discovery, and the built-in Lennard-Jones reference backend."]

/// Raw native ABI symbols and function types.
pub mod abi;
/// Backend traits and the buffer/settings/statistics types they exchange.
pub mod backend;
/// Built-in Lennard-Jones reference backend.
pub mod builtin;
/// Shared-object discovery policy.
pub mod discover;
/// `libloading`-backed dynamic backends.
#[cfg(feature = "dynamic")]
pub mod dylib;

pub use backend::{
    GmcWalkSettings, McWalkSettings, ModelBackend, PosWalkStats, SamplerBackend, TrialMove,
    VeloWalkStats, WalkBuffers,
};
pub use builtin::{engine_pair, BuiltinModelBackend, BuiltinSamplerBackend, LjParams};
pub use discover::{resolve_engine_path, ENGINE_PATH_VAR};
#[cfg(feature = "dynamic")]
pub use dylib::{DylibModelBackend, DylibSamplerBackend};
