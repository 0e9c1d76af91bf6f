//! Model engine context and the single-atom trial move.

use nswalk_core::{Configuration, ErrorInfo, NsError};
use nswalk_engine::{builtin, LjParams, ModelBackend};

/// Forces and their consistent energy for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceEval {
    /// Total energy at the evaluated positions.
    pub energy: f64,
    /// Flat `[n, 3]` forces, `-grad E`.
    pub forces: Vec<f64>,
}

/// Committed buffers of an accepted single-atom move.
#[derive(Debug, Clone, PartialEq)]
struct MovePayload {
    positions: Vec<f64>,
    extra: Option<Vec<f64>>,
}

/// Result of a single-atom trial move.
///
/// The outcome is pure with respect to the [`Configuration`] it was proposed
/// against: a rejected trial carries no buffers at all, and an accepted one
/// carries the new position/auxiliary arrays until [`apply`](Self::apply)
/// commits them.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleMoveOutcome {
    /// Whether the backend accepted the move.
    pub accepted: bool,
    /// Energy change of the proposed move, reported even on rejection.
    pub d_e: f64,
    committed: Option<MovePayload>,
}

impl SingleMoveOutcome {
    /// New positions, present only when the move was accepted.
    pub fn new_positions(&self) -> Option<&[f64]> {
        self.committed.as_ref().map(|payload| &payload.positions[..])
    }

    /// Writes the accepted buffers into the configuration.
    ///
    /// Returns whether anything was committed; a rejected outcome leaves the
    /// configuration untouched.
    pub fn apply(&self, config: &mut Configuration) -> Result<bool, NsError> {
        let Some(payload) = &self.committed else {
            return Ok(false);
        };
        config.set_positions(&payload.positions)?;
        if let Some(extra) = &payload.extra {
            config.set_extra_values(extra)?;
        }
        Ok(true)
    }
}

/// Owned context for a potential-model engine.
///
/// One context binds one backend; calls are serialized by `&mut self`, which
/// is the whole concurrency story of this layer. Hosts that want parallel
/// walks run independent contexts (or processes), never a shared one.
pub struct ModelEngine {
    backend: Box<dyn ModelBackend>,
}

impl ModelEngine {
    /// Wraps an already-constructed backend.
    pub fn new(backend: Box<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    /// Creates a context over the built-in Lennard-Jones backend.
    pub fn builtin(params: LjParams) -> Result<Self, NsError> {
        let mut engine = Self::new(Box::new(builtin::BuiltinModelBackend::new()));
        engine.init_model(&params.flat())?;
        Ok(engine)
    }

    /// Loads a native model shared object.
    #[cfg(feature = "dynamic")]
    pub fn from_shared_object(spec: &std::path::Path) -> Result<Self, NsError> {
        Ok(Self::new(Box::new(nswalk_engine::DylibModelBackend::open(
            spec,
        )?)))
    }

    /// Passes the flat model parameter vector to the backend once.
    pub fn init_model(&mut self, params: &[f64]) -> Result<(), NsError> {
        self.backend.init_model(params)
    }

    /// Registers a configuration and its energy ceiling with the backend.
    ///
    /// Must run once per distinct configuration before `eval_energy` or
    /// `move_atom_1` touch it.
    pub fn init_config(&mut self, config: &Configuration, emax: f64) -> Result<(), NsError> {
        self.backend
            .init_config(config.species(), config.positions(), config.cell(), emax)
    }

    /// Evaluates the configuration's total energy without mutating it.
    pub fn eval_energy(&mut self, config: &Configuration) -> Result<f64, NsError> {
        self.backend.eval_energy(
            config.species(),
            config.positions(),
            config.extra_width(),
            config.extra_values(),
            config.cell(),
        )
    }

    /// Evaluates forces and the consistent total energy.
    pub fn eval_forces(&mut self, config: &Configuration) -> Result<ForceEval, NsError> {
        let mut forces = vec![0.0; config.positions().len()];
        let energy = self.backend.eval_forces(
            config.species(),
            config.positions(),
            config.extra_width(),
            config.extra_values(),
            config.cell(),
            &mut forces,
        )?;
        Ok(ForceEval { energy, forces })
    }

    /// Proposes moving `atom` by `delta` under the hard ceiling `d_e_max`.
    ///
    /// The configuration is never mutated here; commit the returned outcome
    /// with [`SingleMoveOutcome::apply`].
    pub fn move_atom_1(
        &mut self,
        config: &Configuration,
        atom: usize,
        delta: [f64; 3],
        d_e_max: f64,
    ) -> Result<SingleMoveOutcome, NsError> {
        if atom >= config.n_atoms() {
            return Err(NsError::Shape(
                ErrorInfo::new("walk.atom_index", "atom index out of range")
                    .with_context("atom", atom.to_string())
                    .with_context("n_atoms", config.n_atoms().to_string()),
            ));
        }
        let mut positions = config.positions().to_vec();
        let mut extra = config.extra_values().to_vec();
        let trial = self.backend.move_atom_1(
            config.species(),
            &mut positions,
            config.extra_width(),
            &mut extra,
            config.cell(),
            atom,
            &delta,
            d_e_max,
        )?;
        let committed = trial.accepted.then(|| MovePayload {
            positions,
            extra: (config.extra_width() > 0).then_some(extra),
        });
        Ok(SingleMoveOutcome {
            accepted: trial.accepted,
            d_e: trial.d_e,
            committed,
        })
    }
}
