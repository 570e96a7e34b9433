//! Inputs and generator of a Lindblad master equation over a many-body basis.

use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    error::{ Error, Result },
    manybody::ManyBodyOperator,
    matrix::outer_prod,
};
use super::JumpOperator;

/// Largest tolerated `|H[i, j] - conj(H[j, i])|` for a Hamiltonian.
pub const HERMITIAN_TOL: f64 = 1e-10;

/// Everything an external integrator needs to evolve
/// ```text
/// dρ/dt = -i [H, ρ] + Σ_k γ_k (L_k ρ L_k† - ½ {L_k† L_k, ρ})
/// ```
/// over a fixed many-body basis.
///
/// Built by chaining `with_*` methods onto [`LindbladProblem::new`]; each
/// checks its input against the dimension of the Hamiltonian.
#[derive(Clone, Debug)]
pub struct LindbladProblem {
    hamiltonian: ManyBodyOperator,
    jumps: Vec<JumpOperator>,
    initial: Option<nd::Array2<C64>>,
    times: Vec<f64>,
}

impl LindbladProblem {
    /// Start a new problem with Hamiltonian `hamiltonian`.
    ///
    /// Fails if the Hamiltonian is not Hermitian to within [`HERMITIAN_TOL`].
    pub fn new(hamiltonian: ManyBodyOperator) -> Result<Self> {
        let dev = hamiltonian.hermitian_deviation();
        if dev > HERMITIAN_TOL { return Err(Error::NotHermitian(dev)); }
        Ok(Self { hamiltonian, jumps: Vec::new(), initial: None, times: Vec::new() })
    }

    fn check_dim(&self, context: &'static str, got: usize) -> Result<()> {
        let dim = self.dim();
        if got != dim { return Err(Error::mismatch(context, dim, got)); }
        Ok(())
    }

    /// Add a dissipation channel.
    pub fn with_jump(mut self, jump: JumpOperator) -> Result<Self> {
        self.check_dim("jump operator", jump.dim())?;
        self.jumps.push(jump);
        Ok(self)
    }

    /// Add several dissipation channels.
    pub fn with_jumps<I>(self, jumps: I) -> Result<Self>
    where I: IntoIterator<Item = JumpOperator>
    {
        jumps.into_iter().try_fold(self, |problem, jump| problem.with_jump(jump))
    }

    /// Start from the pure state `|ψ⟩⟨ψ|`, normalizing `ψ` if necessary.
    ///
    /// Fails if `psi` has the wrong length or zero norm.
    pub fn with_initial_state<S>(self, psi: &nd::ArrayBase<S, nd::Ix1>)
        -> Result<Self>
    where S: nd::Data<Elem = C64>
    {
        self.check_dim("initial state", psi.len())?;
        let norm2: f64 = psi.iter().map(|a| a.norm_sqr()).sum();
        if norm2 <= 0.0 {
            return Err(Error::Config("initial state has zero norm".into()));
        }
        let rho = outer_prod(psi, psi) / norm2;
        self.with_initial_density(rho)
    }

    /// Start from a density matrix.
    ///
    /// Fails if `rho` is not square or has the wrong size.
    pub fn with_initial_density(mut self, rho: nd::Array2<C64>) -> Result<Self> {
        let (nr, nc) = rho.dim();
        self.check_dim("initial density rows", nr)?;
        self.check_dim("initial density columns", nc)?;
        self.initial = Some(rho);
        Ok(self)
    }

    /// Set the time points at which the solution is requested.
    ///
    /// Fails if the grid is empty, contains a non-finite value, or decreases
    /// anywhere.
    pub fn with_times<I>(mut self, times: I) -> Result<Self>
    where I: IntoIterator<Item = f64>
    {
        let times: Vec<f64> = times.into_iter().collect();
        if times.is_empty() {
            return Err(Error::InvalidTimeGrid("no time points".into()));
        }
        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(Error::InvalidTimeGrid(format!("non-finite time {t}")));
        }
        if let Some(k) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::InvalidTimeGrid(format!(
                "decreasing at index {}: {} -> {}", k + 1, times[k], times[k + 1])));
        }
        self.times = times;
        debug!(
            dim = self.dim(),
            jumps = self.jumps.len(),
            points = self.times.len(),
            "assembled master-equation problem"
        );
        Ok(self)
    }

    pub fn dim(&self) -> usize { self.hamiltonian.dim() }

    pub fn hamiltonian(&self) -> &ManyBodyOperator { &self.hamiltonian }

    pub fn jump_operators(&self) -> &[JumpOperator] { &self.jumps }

    /// Rates of all dissipation channels, in the order they were added.
    pub fn rates(&self) -> Vec<f64> {
        self.jumps.iter().map(|j| j.rate()).collect()
    }

    pub fn initial_density(&self) -> Option<&nd::Array2<C64>> {
        self.initial.as_ref()
    }

    pub fn times(&self) -> &[f64] { &self.times }

    /// Evaluate the right-hand side of the master equation at `rho`.
    pub fn rhs<S>(&self, rho: &nd::ArrayBase<S, nd::Ix2>)
        -> Result<nd::Array2<C64>>
    where S: nd::Data<Elem = C64>
    {
        let (nr, nc) = rho.dim();
        self.check_dim("density matrix rows", nr)?;
        self.check_dim("density matrix columns", nc)?;
        let h = self.hamiltonian.matrix();
        let unitary = (h.dot_dense(rho) - h.dense_dot(rho)) * (-C64::i());
        Ok(
            self.jumps.iter()
                .fold(unitary, |acc, jump| acc + jump.dissipator(rho))
        )
    }

    /// Return a closure over `self` in the `f(t, ρ)` form expected by
    /// time-stepping integrators. The generator has no explicit time
    /// dependence.
    pub fn rhs_fn(&self)
        -> impl Fn(f64, &nd::Array2<C64>) -> Result<nd::Array2<C64>> + '_
    {
        move |_t: f64, rho: &nd::Array2<C64>| self.rhs(rho)
    }
}
