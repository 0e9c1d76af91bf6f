//! Mutable atomic configuration adapter.
//!
//! [`Configuration`] owns the per-atom arrays a walk operates on: species,
//! positions, the periodic cell, masses, and the optional velocity,
//! auxiliary-data, and Galilean-direction arrays. All arrays are flat and
//! row-major (`positions[3 * i + axis]`), which is the layout handed to
//! engine backends without copying or reshaping.
//!
//! Shape discipline lives here: constructors and setters validate every
//! array against the atom count fixed at construction, and the auxiliary
//! width is pinned the first time auxiliary data is attached. Engine call
//! sites may therefore marshal buffers without re-checking.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, NsError};

/// Per-atom auxiliary payload of fixed width.
///
/// The width is fixed for the lifetime of the owning [`Configuration`] once
/// the payload is first attached; later updates must supply `n_atoms * width`
/// values. A configuration without auxiliary data marshals width 0, never a
/// null buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraData {
    width: usize,
    values: Vec<f64>,
}

impl ExtraData {
    /// Returns the per-atom width of the payload.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the flat `[n_atoms, width]` value buffer.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Mutable simulation state for one walker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    species: Vec<i32>,
    positions: Vec<f64>,
    cell: [f64; 9],
    masses: Vec<f64>,
    velocities: Option<Vec<f64>>,
    extra: Option<ExtraData>,
    gmc_direction: Option<Vec<f64>>,
}

impl Configuration {
    /// Creates a configuration from the mandatory arrays.
    ///
    /// `positions` is flat row-major `[n, 3]`; `cell` holds the three lattice
    /// vectors row-wise. Velocities, auxiliary data, and the GMC direction
    /// start absent and are attached separately.
    pub fn new(
        species: Vec<i32>,
        positions: Vec<f64>,
        cell: [f64; 9],
        masses: Vec<f64>,
    ) -> Result<Self, NsError> {
        let n = species.len();
        if n == 0 {
            return Err(NsError::Shape(ErrorInfo::new(
                "config.empty",
                "configuration must contain at least one atom",
            )));
        }
        if positions.len() != 3 * n {
            return Err(NsError::shape("config.positions", 3 * n, positions.len()));
        }
        if masses.len() != n {
            return Err(NsError::shape("config.masses", n, masses.len()));
        }
        Ok(Self {
            species,
            positions,
            cell,
            masses,
            velocities: None,
            extra: None,
            gmc_direction: None,
        })
    }

    /// Number of atoms; invariant across all per-atom arrays.
    pub fn n_atoms(&self) -> usize {
        self.species.len()
    }

    /// Atomic numbers, immutable during stepping.
    pub fn species(&self) -> &[i32] {
        &self.species
    }

    /// Flat `[n, 3]` Cartesian coordinates.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Row-wise lattice vectors, immutable during stepping.
    pub fn cell(&self) -> &[f64; 9] {
        &self.cell
    }

    /// Per-atom masses, immutable during stepping.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Overwrites positions with a committed walk endpoint.
    pub fn set_positions(&mut self, positions: &[f64]) -> Result<(), NsError> {
        if positions.len() != self.positions.len() {
            return Err(NsError::shape(
                "config.positions",
                self.positions.len(),
                positions.len(),
            ));
        }
        self.positions.copy_from_slice(positions);
        Ok(())
    }

    /// Flat `[n, 3]` velocities, if attached.
    pub fn velocities(&self) -> Option<&[f64]> {
        self.velocities.as_deref()
    }

    /// Returns the velocities or a [`NsError::Config`] when never attached.
    ///
    /// Step families that integrate momenta call this before marshalling.
    pub fn require_velocities(&self) -> Result<&[f64], NsError> {
        self.velocities.as_deref().ok_or_else(|| {
            NsError::Config(
                ErrorInfo::new("config.no_velocities", "configuration has no velocities")
                    .with_hint("attach velocities before running a momentum walk"),
            )
        })
    }

    /// Attaches or overwrites the velocity array.
    pub fn set_velocities(&mut self, velocities: &[f64]) -> Result<(), NsError> {
        if velocities.len() != 3 * self.n_atoms() {
            return Err(NsError::shape(
                "config.velocities",
                3 * self.n_atoms(),
                velocities.len(),
            ));
        }
        match &mut self.velocities {
            Some(existing) => existing.copy_from_slice(velocities),
            None => self.velocities = Some(velocities.to_vec()),
        }
        Ok(())
    }

    /// Width of the auxiliary payload, 0 when absent.
    pub fn extra_width(&self) -> usize {
        self.extra.as_ref().map_or(0, ExtraData::width)
    }

    /// Flat auxiliary values; empty slice when absent (never null).
    pub fn extra_values(&self) -> &[f64] {
        self.extra.as_ref().map_or(&[], ExtraData::values)
    }

    /// Attaches the auxiliary payload, pinning its width.
    ///
    /// Reattaching with a different width is a contract violation: the width
    /// observed first is enforced for the configuration's lifetime.
    pub fn attach_extra_data(&mut self, width: usize, values: Vec<f64>) -> Result<(), NsError> {
        if width == 0 {
            return Err(NsError::Shape(ErrorInfo::new(
                "config.extra_width",
                "auxiliary width must be positive; omit the payload instead",
            )));
        }
        if let Some(existing) = &self.extra {
            if existing.width != width {
                return Err(NsError::shape("config.extra_width", existing.width, width));
            }
        }
        if values.len() != self.n_atoms() * width {
            return Err(NsError::shape(
                "config.extra_values",
                self.n_atoms() * width,
                values.len(),
            ));
        }
        self.extra = Some(ExtraData { width, values });
        Ok(())
    }

    /// Overwrites the auxiliary values after a committed walk.
    ///
    /// Errors when no payload was ever attached or the buffer length does not
    /// match the pinned width.
    pub fn set_extra_values(&mut self, values: &[f64]) -> Result<(), NsError> {
        match &mut self.extra {
            Some(extra) => {
                if values.len() != extra.values.len() {
                    return Err(NsError::shape(
                        "config.extra_values",
                        extra.values.len(),
                        values.len(),
                    ));
                }
                extra.values.copy_from_slice(values);
                Ok(())
            }
            None => Err(NsError::Shape(ErrorInfo::new(
                "config.extra_unattached",
                "cannot update auxiliary data that was never attached",
            ))),
        }
    }

    /// Persistent per-atom Galilean direction, if attached.
    pub fn gmc_direction(&self) -> Option<&[f64]> {
        self.gmc_direction.as_deref()
    }

    /// Returns the GMC direction or a [`NsError::Config`] when never attached.
    pub fn require_gmc_direction(&self) -> Result<&[f64], NsError> {
        self.gmc_direction.as_deref().ok_or_else(|| {
            NsError::Config(
                ErrorInfo::new("config.no_direction", "configuration has no GMC direction")
                    .with_hint("attach a direction before running a Galilean walk"),
            )
        })
    }

    /// Attaches the Galilean direction, normalizing each atom's 3-vector.
    pub fn attach_gmc_direction(&mut self, direction: Vec<f64>) -> Result<(), NsError> {
        let normalized = normalize_per_atom(direction, self.n_atoms())?;
        self.gmc_direction = Some(normalized);
        Ok(())
    }

    /// Stores the direction buffer returned by a Galilean walk.
    ///
    /// The backend returns an unnormalized displacement-direction buffer; it
    /// is re-normalized to unit Euclidean norm per atom before being stored.
    pub fn store_gmc_direction(&mut self, direction: &[f64]) -> Result<(), NsError> {
        let normalized = normalize_per_atom(direction.to_vec(), self.n_atoms())?;
        self.gmc_direction = Some(normalized);
        Ok(())
    }
}

fn normalize_per_atom(mut direction: Vec<f64>, n_atoms: usize) -> Result<Vec<f64>, NsError> {
    if direction.len() != 3 * n_atoms {
        return Err(NsError::shape(
            "config.direction",
            3 * n_atoms,
            direction.len(),
        ));
    }
    for atom in 0..n_atoms {
        let row = &mut direction[3 * atom..3 * atom + 3];
        let norm = (row[0] * row[0] + row[1] * row[1] + row[2] * row[2]).sqrt();
        if norm <= f64::EPSILON {
            return Err(NsError::Shape(
                ErrorInfo::new("config.direction_norm", "direction vector has zero norm")
                    .with_context("atom", atom.to_string()),
            ));
        }
        for value in row {
            *value /= norm;
        }
    }
    Ok(direction)
}
