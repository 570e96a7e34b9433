//! Dissipation channels for the Lindblad master equation.

use std::fmt;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ Error, Result },
    manybody::ManyBodyOperator,
    matrix::{ Matrix, Storage },
};

/// A Lindblad jump operator `L` together with its rate `γ`, contributing
/// ```text
/// D[L](ρ) = γ (L ρ L† - ½ {L†L, ρ})
/// ```
/// to the generator.
#[derive(Clone)]
pub struct JumpOperator {
    operator: ManyBodyOperator,
    rate: f64,
    label: String,
    // reused on every generator evaluation, in the operator's storage
    l: Matrix,
    l_dag: Matrix,
    l_dag_l: Matrix,
}

impl fmt::Debug for JumpOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JumpOperator {{ label: {:?}, rate: {}, dim: {}, nnz: {} }}",
            self.label, self.rate, self.operator.dim(), self.operator.nnz(),
        )
    }
}

impl JumpOperator {
    /// Create a new jump operator.
    ///
    /// Fails if `rate` is negative or not finite.
    pub fn new<S>(operator: ManyBodyOperator, rate: f64, label: S)
        -> Result<Self>
    where S: Into<String>
    {
        let label = label.into();
        if !rate.is_finite() || rate < 0.0 {
            return Err(Error::InvalidRate { label, rate });
        }
        let l = operator.matrix().clone();
        let l_dag = l.adjoint();
        let l_dag_l = l_dag.matmul(&l);
        Ok(Self { operator, rate, label, l, l_dag, l_dag_l })
    }

    pub fn operator(&self) -> &ManyBodyOperator { &self.operator }

    pub fn rate(&self) -> f64 { self.rate }

    pub fn label(&self) -> &str { &self.label }

    pub fn dim(&self) -> usize { self.operator.dim() }

    pub fn storage(&self) -> Storage { self.l.storage() }

    /// Compute `D[L](ρ)`.
    ///
    /// *Panics* if `rho` is not sized for the operator.
    pub fn dissipator<S>(&self, rho: &nd::ArrayBase<S, nd::Ix2>)
        -> nd::Array2<C64>
    where S: nd::Data<Elem = C64>
    {
        if self.rate == 0.0 { return nd::Array2::zeros(rho.raw_dim()); }
        let jump = self.l_dag.dense_dot(&self.l.dot_dense(rho));
        let decay = self.l_dag_l.dot_dense(rho) + self.l_dag_l.dense_dot(rho);
        (jump - decay * 0.5) * self.rate
    }
}
