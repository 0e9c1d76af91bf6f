#![deny(missing_docs)]
#![doc = "Core types for the nswalk bounded-walk engine: structured errors, the deterministic RNG handle, and the mutable atomic configuration adapter shared by every engine call site."]

pub mod config;
pub mod errors;
pub mod rng;

pub use config::{Configuration, ExtraData};
pub use errors::{ErrorInfo, NsError};
pub use rng::{derive_substream_seed, RngHandle};

/// Convenience constructor for a cubic periodic cell of the given edge length.
pub fn cubic_cell(edge: f64) -> [f64; 9] {
    [edge, 0.0, 0.0, 0.0, edge, 0.0, 0.0, 0.0, edge]
}
