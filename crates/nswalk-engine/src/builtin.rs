//! Built-in reference backend: a truncated, shifted Lennard-Jones model and
//! a matching step-family sampler.
//!
//! The pair exists so the walk layer can be exercised without a native
//! shared object: tests, benches, and the demo CLI all run against it. The
//! model is species-independent and carries no per-atom auxiliary state, so
//! auxiliary buffers pass through walks untouched. Both halves follow the
//! backend contracts exactly, ceilings included: any trial landing at or
//! above `emax`/`ke_max` is rejected.

use nswalk_core::{ErrorInfo, NsError, RngHandle};
use serde::{Deserialize, Serialize};

use crate::backend::{
    GmcWalkSettings, McWalkSettings, ModelBackend, PosWalkStats, SamplerBackend, TrialMove,
    VeloWalkStats, WalkBuffers,
};

/// Seed-vector width required by [`BuiltinSamplerBackend`].
pub const BUILTIN_SEED_WIDTH: usize = 4;

/// Lennard-Jones parameters, in the model's reduced units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LjParams {
    /// Well depth.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Zero-crossing distance.
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// Interaction cutoff radius.
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
}

fn default_epsilon() -> f64 {
    1.0
}

fn default_sigma() -> f64 {
    1.0
}

fn default_cutoff() -> f64 {
    3.0
}

impl Default for LjParams {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            sigma: default_sigma(),
            cutoff: default_cutoff(),
        }
    }
}

impl LjParams {
    /// Flattens the parameters into the `init_model` vector layout.
    pub fn flat(&self) -> [f64; 3] {
        [self.epsilon, self.sigma, self.cutoff]
    }

    /// Parses an `init_model` parameter vector.
    pub fn from_flat(params: &[f64]) -> Result<Self, NsError> {
        if params.len() != 3 {
            return Err(NsError::Engine(
                ErrorInfo::new("builtin.model_params", "expected [epsilon, sigma, cutoff]")
                    .with_context("len", params.len().to_string()),
            ));
        }
        if params[1] <= 0.0 || params[2] <= 0.0 {
            return Err(NsError::Engine(ErrorInfo::new(
                "builtin.model_params",
                "sigma and cutoff must be positive",
            )));
        }
        Ok(Self {
            epsilon: params[0],
            sigma: params[1],
            cutoff: params[2],
        })
    }
}

/// Pairwise potential math shared by the model and sampler halves.
#[derive(Debug, Clone, Copy)]
struct LjPotential {
    epsilon: f64,
    sigma2: f64,
    cutoff2: f64,
    shift: f64,
}

impl LjPotential {
    fn new(params: LjParams) -> Self {
        let sr6 = (params.sigma / params.cutoff).powi(6);
        Self {
            epsilon: params.epsilon,
            sigma2: params.sigma * params.sigma,
            cutoff2: params.cutoff * params.cutoff,
            shift: 4.0 * params.epsilon * (sr6 * sr6 - sr6),
        }
    }

    fn pair_energy(&self, r2: f64) -> f64 {
        if r2 >= self.cutoff2 {
            return 0.0;
        }
        let s6 = (self.sigma2 / r2.max(1e-12)).powi(3);
        4.0 * self.epsilon * (s6 * s6 - s6) - self.shift
    }

    /// `dU/dr / r`, used to project onto the separation vector.
    fn pair_force_factor(&self, r2: f64) -> f64 {
        if r2 >= self.cutoff2 {
            return 0.0;
        }
        let r2 = r2.max(1e-12);
        let s6 = (self.sigma2 / r2).powi(3);
        24.0 * self.epsilon * (2.0 * s6 * s6 - s6) / r2
    }

    fn total_energy(&self, positions: &[f64], geom: &CellGeometry) -> f64 {
        let n = positions.len() / 3;
        let mut energy = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let dr = geom.minimum_image(separation(positions, i, j));
                energy += self.pair_energy(norm2(&dr));
            }
        }
        energy
    }

    fn atom_energy(&self, atom: usize, positions: &[f64], geom: &CellGeometry) -> f64 {
        let n = positions.len() / 3;
        let mut energy = 0.0;
        for j in 0..n {
            if j == atom {
                continue;
            }
            let dr = geom.minimum_image(separation(positions, atom, j));
            energy += self.pair_energy(norm2(&dr));
        }
        energy
    }

    fn forces(&self, positions: &[f64], geom: &CellGeometry, forces: &mut [f64]) -> f64 {
        let n = positions.len() / 3;
        forces.fill(0.0);
        let mut energy = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let dr = geom.minimum_image(separation(positions, i, j));
                let r2 = norm2(&dr);
                energy += self.pair_energy(r2);
                let factor = self.pair_force_factor(r2);
                for axis in 0..3 {
                    forces[3 * i + axis] += factor * dr[axis];
                    forces[3 * j + axis] -= factor * dr[axis];
                }
            }
        }
        energy
    }
}

/// Periodic cell with its precomputed inverse, row-vector convention.
#[derive(Debug, Clone, Copy)]
struct CellGeometry {
    cell: [f64; 9],
    inverse: [f64; 9],
}

impl CellGeometry {
    fn new(cell: &[f64; 9]) -> Result<Self, NsError> {
        Ok(Self {
            cell: *cell,
            inverse: invert3(cell)?,
        })
    }

    /// Wraps a Cartesian separation into the nearest-image convention.
    fn minimum_image(&self, dr: [f64; 3]) -> [f64; 3] {
        let mut frac = [0.0; 3];
        for (j, value) in frac.iter_mut().enumerate() {
            *value = dr[0] * self.inverse[j] + dr[1] * self.inverse[3 + j] + dr[2] * self.inverse[6 + j];
        }
        for value in &mut frac {
            *value -= value.round();
        }
        let mut wrapped = [0.0; 3];
        for (j, value) in wrapped.iter_mut().enumerate() {
            *value =
                frac[0] * self.cell[j] + frac[1] * self.cell[3 + j] + frac[2] * self.cell[6 + j];
        }
        wrapped
    }
}

fn invert3(m: &[f64; 9]) -> Result<[f64; 9], NsError> {
    let det = m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
        + m[2] * (m[3] * m[7] - m[4] * m[6]);
    if det.abs() < 1e-12 {
        return Err(NsError::Engine(ErrorInfo::new(
            "builtin.cell_singular",
            "periodic cell matrix is singular",
        )));
    }
    let inv_det = 1.0 / det;
    Ok([
        (m[4] * m[8] - m[5] * m[7]) * inv_det,
        (m[2] * m[7] - m[1] * m[8]) * inv_det,
        (m[1] * m[5] - m[2] * m[4]) * inv_det,
        (m[5] * m[6] - m[3] * m[8]) * inv_det,
        (m[0] * m[8] - m[2] * m[6]) * inv_det,
        (m[2] * m[3] - m[0] * m[5]) * inv_det,
        (m[3] * m[7] - m[4] * m[6]) * inv_det,
        (m[1] * m[6] - m[0] * m[7]) * inv_det,
        (m[0] * m[4] - m[1] * m[3]) * inv_det,
    ])
}

fn separation(positions: &[f64], i: usize, j: usize) -> [f64; 3] {
    [
        positions[3 * i] - positions[3 * j],
        positions[3 * i + 1] - positions[3 * j + 1],
        positions[3 * i + 2] - positions[3 * j + 2],
    ]
}

fn norm2(v: &[f64; 3]) -> f64 {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}

fn kinetic_energy(velocities: &[f64], masses: &[f64]) -> f64 {
    masses
        .iter()
        .enumerate()
        .map(|(i, &mass)| {
            let v = &velocities[3 * i..3 * i + 3];
            0.5 * mass * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2])
        })
        .sum()
}

/// Reference model backend over the Lennard-Jones potential.
#[derive(Debug, Default)]
pub struct BuiltinModelBackend {
    potential: Option<LjPotential>,
    config_emax: Option<f64>,
}

impl BuiltinModelBackend {
    /// Creates an uninitialized backend; `init_model` must run before use.
    pub fn new() -> Self {
        Self::default()
    }

    fn potential(&self) -> Result<&LjPotential, NsError> {
        self.potential.as_ref().ok_or_else(|| {
            NsError::Engine(
                ErrorInfo::new("builtin.uninitialized", "model parameters not installed")
                    .with_hint("call init_model before evaluating"),
            )
        })
    }
}

impl ModelBackend for BuiltinModelBackend {
    fn init_model(&mut self, params: &[f64]) -> Result<(), NsError> {
        self.potential = Some(LjPotential::new(LjParams::from_flat(params)?));
        Ok(())
    }

    fn init_config(
        &mut self,
        _species: &[i32],
        _positions: &[f64],
        _cell: &[f64; 9],
        emax: f64,
    ) -> Result<(), NsError> {
        // No neighbor-list state to build; the ceiling is recorded so the
        // call sequence contract matches native backends.
        self.potential()?;
        self.config_emax = Some(emax);
        Ok(())
    }

    fn eval_energy(
        &mut self,
        _species: &[i32],
        positions: &[f64],
        _extra_width: usize,
        _extra: &[f64],
        cell: &[f64; 9],
    ) -> Result<f64, NsError> {
        let potential = *self.potential()?;
        let geom = CellGeometry::new(cell)?;
        Ok(potential.total_energy(positions, &geom))
    }

    fn eval_forces(
        &mut self,
        _species: &[i32],
        positions: &[f64],
        _extra_width: usize,
        _extra: &[f64],
        cell: &[f64; 9],
        forces: &mut [f64],
    ) -> Result<f64, NsError> {
        if forces.len() != positions.len() {
            return Err(NsError::shape(
                "builtin.forces",
                positions.len(),
                forces.len(),
            ));
        }
        let potential = *self.potential()?;
        let geom = CellGeometry::new(cell)?;
        Ok(potential.forces(positions, &geom, forces))
    }

    fn move_atom_1(
        &mut self,
        _species: &[i32],
        positions: &mut [f64],
        _extra_width: usize,
        _extra: &mut [f64],
        cell: &[f64; 9],
        atom: usize,
        delta: &[f64; 3],
        d_e_max: f64,
    ) -> Result<TrialMove, NsError> {
        let potential = *self.potential()?;
        let geom = CellGeometry::new(cell)?;
        let before = potential.atom_energy(atom, positions, &geom);
        let old = [
            positions[3 * atom],
            positions[3 * atom + 1],
            positions[3 * atom + 2],
        ];
        for axis in 0..3 {
            positions[3 * atom + axis] = old[axis] + delta[axis];
        }
        let d_e = potential.atom_energy(atom, positions, &geom) - before;
        if d_e < d_e_max {
            Ok(TrialMove {
                accepted: true,
                d_e,
            })
        } else {
            positions[3 * atom..3 * atom + 3].copy_from_slice(&old);
            Ok(TrialMove {
                accepted: false,
                d_e,
            })
        }
    }
}

/// Reference sampler backend sharing the Lennard-Jones potential.
#[derive(Debug)]
pub struct BuiltinSamplerBackend {
    potential: LjPotential,
    rng: Option<RngHandle>,
}

impl BuiltinSamplerBackend {
    /// Creates a sampler bound to the given model parameters.
    pub fn new(params: LjParams) -> Self {
        Self {
            potential: LjPotential::new(params),
            rng: None,
        }
    }

    fn rng_mut(&mut self) -> Result<&mut RngHandle, NsError> {
        self.rng.as_mut().ok_or_else(|| {
            NsError::Rng(
                ErrorInfo::new("builtin.unseeded", "random stream not installed")
                    .with_hint("call set_seed before running a stochastic walk"),
            )
        })
    }
}

/// Matched backend pair over shared model parameters.
///
/// The model half still requires the usual `init_model` call with
/// `params.flat()`; the sampler half is bound at construction the way a
/// native sampler library links against its model library.
pub fn engine_pair(params: LjParams) -> (BuiltinModelBackend, BuiltinSamplerBackend) {
    (
        BuiltinModelBackend::new(),
        BuiltinSamplerBackend::new(params),
    )
}

impl SamplerBackend for BuiltinSamplerBackend {
    fn seed_width(&self) -> usize {
        BUILTIN_SEED_WIDTH
    }

    fn set_seed(&mut self, seed: &[i32]) -> Result<(), NsError> {
        if seed.len() != BUILTIN_SEED_WIDTH {
            return Err(NsError::Rng(
                ErrorInfo::new("builtin.seed_width", "seed vector has the wrong length")
                    .with_context("expected", BUILTIN_SEED_WIDTH.to_string())
                    .with_context("actual", seed.len().to_string()),
            ));
        }
        self.rng = Some(RngHandle::from_seed_vector(seed));
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
        let n = masses.len();
        let n_dof = n_dof.clamp(1, 3) as usize;
        let rng = self.rng_mut()?;
        let mut n_try = 0;
        let mut n_accept = 0;
        let mut ke = kinetic_energy(velocities, masses);
        for _ in 0..n_steps.max(0) {
            n_try += 1;
            let atom = rng.index_in(0, n);
            let old = [
                velocities[3 * atom],
                velocities[3 * atom + 1],
                velocities[3 * atom + 2],
            ];
            let scale = step_size / masses[atom].sqrt();
            for axis in 0..n_dof {
                velocities[3 * atom + axis] = old[axis] + scale * rng.standard_normal();
            }
            let ke_trial = kinetic_energy(velocities, masses);
            if ke_max < 0.0 || ke_trial < ke_max {
                ke = ke_trial;
                n_accept += 1;
            } else {
                velocities[3 * atom..3 * atom + 3].copy_from_slice(&old);
            }
        }
        Ok(VeloWalkStats {
            n_try,
            n_accept,
            final_ke: ke,
        })
    }

    fn mc_atom_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        mut velocities: Option<&mut [f64]>,
        settings: &McWalkSettings,
    ) -> Result<PosWalkStats, NsError> {
        let n = buffers.n_atoms();
        let fix_n = settings.fix_n.max(0) as usize;
        if fix_n >= n {
            return Err(NsError::Engine(
                ErrorInfo::new("builtin.all_frozen", "fix_n leaves no movable atoms")
                    .with_context("fix_n", fix_n.to_string())
                    .with_context("n_atoms", n.to_string()),
            ));
        }
        if settings.step_size_velo > 0.0 && velocities.is_none() {
            return Err(NsError::Config(ErrorInfo::new(
                "builtin.velocities_missing",
                "velocity step size given without a velocity buffer",
            )));
        }
        let potential = self.potential;
        let geom = CellGeometry::new(buffers.cell)?;
        let n_dof = settings.n_dof.clamp(1, 3) as usize;
        let rng = self.rng_mut()?;
        let positions = buffers.positions;
        let mut energy = potential.total_energy(positions, &geom);
        let mut n_try = 0;
        let mut n_accept = 0;
        let mut n_accept_velo = 0;
        for _ in 0..settings.n_steps.max(0) {
            n_try += 1;
            let atom = rng.index_in(fix_n, n);
            let old = [
                positions[3 * atom],
                positions[3 * atom + 1],
                positions[3 * atom + 2],
            ];
            let before = potential.atom_energy(atom, positions, &geom);
            for axis in 0..3 {
                positions[3 * atom + axis] = old[axis] + rng.symmetric(settings.step_size_pos);
            }
            let d_e = potential.atom_energy(atom, positions, &geom) - before;
            if energy + d_e < settings.emax {
                energy += d_e;
                n_accept += 1;
            } else {
                positions[3 * atom..3 * atom + 3].copy_from_slice(&old);
            }

            if settings.step_size_velo > 0.0 {
                // velocities checked present above
                if let Some(velo) = velocities.as_deref_mut() {
                    let atom = rng.index_in(fix_n, n);
                    let old = [
                        velo[3 * atom],
                        velo[3 * atom + 1],
                        velo[3 * atom + 2],
                    ];
                    let scale = settings.step_size_velo / buffers.masses[atom].sqrt();
                    for axis in 0..n_dof {
                        velo[3 * atom + axis] = old[axis] + scale * rng.standard_normal();
                    }
                    let ke_trial = kinetic_energy(velo, buffers.masses);
                    if settings.ke_max < 0.0 || ke_trial < settings.ke_max {
                        n_accept_velo += 1;
                    } else {
                        velo[3 * atom..3 * atom + 3].copy_from_slice(&old);
                    }
                }
            }
        }
        Ok(PosWalkStats {
            n_try,
            n_accept,
            n_accept_velo,
            final_e: energy,
        })
    }

    fn gmc_atom_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        d_pos: &mut [f64],
        settings: &GmcWalkSettings,
    ) -> Result<PosWalkStats, NsError> {
        let n = buffers.n_atoms();
        if d_pos.len() != 3 * n {
            return Err(NsError::shape("builtin.d_pos", 3 * n, d_pos.len()));
        }
        let potential = self.potential;
        let geom = CellGeometry::new(buffers.cell)?;
        let rng = self.rng_mut()?;
        let positions = buffers.positions;
        let mut energy = potential.total_energy(positions, &geom);
        let mut trial = vec![0.0; positions.len()];
        let mut forces = vec![0.0; positions.len()];
        let mut n_try = 0;
        let mut n_accept = 0;
        for _ in 0..settings.n_steps.max(0) {
            n_try += 1;
            for (t, (p, d)) in trial
                .iter_mut()
                .zip(positions.iter().zip(d_pos.iter()))
            {
                *t = p + d;
            }
            let e_trial = potential.total_energy(&trial, &geom);
            if e_trial < settings.emax {
                positions.copy_from_slice(&trial);
                energy = e_trial;
                n_accept += 1;
            } else {
                let incoming: Vec<f64> = d_pos.to_vec();
                potential.forces(&trial, &geom, &mut forces);
                reflect_direction(d_pos, &forces);
                if settings.pert_ang > 0.0 {
                    perturb_direction(d_pos, settings.pert_ang, rng);
                }
                if settings.no_reverse {
                    // A reflection that exactly reverses the walk undoes the
                    // previous step; kick it off the axis instead.
                    let cosine = direction_cosine(d_pos, &incoming);
                    if cosine.is_nan() || cosine <= -1.0 + 1e-9 {
                        perturb_direction(d_pos, settings.pert_ang.max(0.1), rng);
                    }
                }
            }
        }
        Ok(PosWalkStats {
            n_try,
            n_accept,
            n_accept_velo: 0,
            final_e: energy,
        })
    }

    fn md_atom_nve_walk(
        &mut self,
        buffers: WalkBuffers<'_>,
        velocities: &mut [f64],
        n_steps: i32,
        timestep: f64,
        _debug: i32,
    ) -> Result<f64, NsError> {
        let n = buffers.n_atoms();
        if velocities.len() != 3 * n {
            return Err(NsError::shape("builtin.velocities", 3 * n, velocities.len()));
        }
        let potential = self.potential;
        let geom = CellGeometry::new(buffers.cell)?;
        let positions = buffers.positions;
        let mut forces = vec![0.0; positions.len()];
        let mut e_pot = potential.forces(positions, &geom, &mut forces);
        for _ in 0..n_steps.max(0) {
            for atom in 0..n {
                let inv_mass = 1.0 / buffers.masses[atom];
                for axis in 0..3 {
                    let idx = 3 * atom + axis;
                    velocities[idx] += 0.5 * timestep * forces[idx] * inv_mass;
                    positions[idx] += timestep * velocities[idx];
                }
            }
            e_pot = potential.forces(positions, &geom, &mut forces);
            for atom in 0..n {
                let inv_mass = 1.0 / buffers.masses[atom];
                for axis in 0..3 {
                    let idx = 3 * atom + axis;
                    velocities[idx] += 0.5 * timestep * forces[idx] * inv_mass;
                }
            }
        }
        Ok(e_pot + kinetic_energy(velocities, buffers.masses))
    }
}

/// Reflects the walk direction off the constraint surface.
///
/// The surface normal is taken from the force vector at the rejected trial
/// point; when the force vanishes the direction is reversed outright.
fn reflect_direction(d_pos: &mut [f64], forces: &[f64]) {
    let force_norm2: f64 = forces.iter().map(|f| f * f).sum();
    if force_norm2 <= f64::EPSILON {
        for d in d_pos.iter_mut() {
            *d = -*d;
        }
        return;
    }
    let inv_norm = 1.0 / force_norm2.sqrt();
    let dot: f64 = d_pos
        .iter()
        .zip(forces.iter())
        .map(|(d, f)| d * f * inv_norm)
        .sum();
    for (d, f) in d_pos.iter_mut().zip(forces.iter()) {
        *d -= 2.0 * dot * f * inv_norm;
    }
}

/// Tilts the direction by a random angle of scale `angle`, preserving norm.
fn perturb_direction(d_pos: &mut [f64], angle: f64, rng: &mut RngHandle) {
    let mag = d_pos.iter().map(|d| d * d).sum::<f64>().sqrt();
    if mag <= f64::EPSILON {
        return;
    }
    let kick = angle * mag / (d_pos.len() as f64).sqrt();
    for d in d_pos.iter_mut() {
        *d += kick * rng.standard_normal();
    }
    let new_mag = d_pos.iter().map(|d| d * d).sum::<f64>().sqrt();
    if new_mag > f64::EPSILON {
        let rescale = mag / new_mag;
        for d in d_pos.iter_mut() {
            *d *= rescale;
        }
    }
}

/// Cosine between two 3N direction vectors.
fn direction_cosine(a: &[f64], b: &[f64]) -> f64 {
    let a_norm = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    let b_norm = b.iter().map(|v| v * v).sum::<f64>().sqrt();
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
