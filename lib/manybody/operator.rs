//! Operators acting on a many-body basis.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ Error, Result },
    matrix::{ Matrix, Storage },
};
use super::ManyBodyBasis;

/// A square matrix indexed by the states of a [`ManyBodyBasis`].
///
/// Entry `(i, j)` is `⟨u_i|Ã|u_j⟩`.
#[derive(Clone, Debug, PartialEq)]
pub struct ManyBodyOperator {
    matrix: Matrix,
}

impl From<Matrix> for ManyBodyOperator {
    fn from(matrix: Matrix) -> Self { Self { matrix } }
}

impl ManyBodyOperator {
    /// Wrap a dense array, converting to the requested storage.
    ///
    /// Fails if the array is not square.
    pub fn from_dense(array: nd::Array2<C64>, storage: Storage)
        -> Result<Self>
    {
        let (nr, nc) = array.dim();
        if nr != nc {
            return Err(Error::mismatch("many-body operator", nr, nc));
        }
        Ok(Self { matrix: Matrix::from_dense(array, storage) })
    }

    /// The identity on `basis`.
    pub fn identity(basis: &ManyBodyBasis) -> Self {
        Self { matrix: Matrix::identity(basis.dim(), basis.storage()) }
    }

    /// The zero operator on `basis`.
    pub fn zeros(basis: &ManyBodyBasis) -> Self {
        Self { matrix: Matrix::zeros(basis.dim(), basis.storage()) }
    }

    pub fn dim(&self) -> usize { self.matrix.dim() }

    pub fn storage(&self) -> Storage { self.matrix.storage() }

    pub fn matrix(&self) -> &Matrix { &self.matrix }

    pub fn into_matrix(self) -> Matrix { self.matrix }

    /// Get the element `⟨u_i|Ã|u_j⟩`.
    ///
    /// *Panics* if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> C64 { self.matrix.get(i, j) }

    pub fn nnz(&self) -> usize { self.matrix.nnz() }

    /// All nonzero elements in row-major order.
    pub fn entries(&self) -> Vec<((usize, usize), C64)> {
        self.matrix.entries()
    }

    pub fn to_dense(&self) -> nd::Array2<C64> { self.matrix.to_dense() }

    /// Convert to another storage form.
    pub fn into_storage(self, storage: Storage) -> Self {
        Self { matrix: self.matrix.into_storage(storage) }
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self { Self { matrix: self.matrix.adjoint() } }

    /// Largest `|Ã[i, j] - conj(Ã[j, i])|`.
    pub fn hermitian_deviation(&self) -> f64 {
        self.matrix.hermitian_deviation()
    }

    /// Return `true` if `self` equals its adjoint to within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.hermitian_deviation() <= tol
    }

    /// Multiply by a scalar.
    pub fn scaled<A>(&self, factor: A) -> Self
    where A: Into<C64>
    {
        Self { matrix: self.matrix.scaled(factor.into()) }
    }

    /// Add two operators on the same basis.
    pub fn try_add(&self, rhs: &Self) -> Result<Self> {
        self.check_dim("operator sum", rhs.dim())?;
        Ok(Self { matrix: self.matrix.sum(&rhs.matrix) })
    }

    /// Operator product `self · rhs`.
    pub fn matmul(&self, rhs: &Self) -> Result<Self> {
        self.check_dim("operator product", rhs.dim())?;
        Ok(Self { matrix: self.matrix.matmul(&rhs.matrix) })
    }

    /// Commutator `[self, rhs]`.
    pub fn commutator(&self, rhs: &Self) -> Result<Self> {
        let ab = self.matmul(rhs)?;
        let ba = rhs.matmul(self)?;
        ab.try_add(&ba.scaled(-1.0))
    }

    /// Anticommutator `{self, rhs}`.
    pub fn anti_commutator(&self, rhs: &Self) -> Result<Self> {
        let ab = self.matmul(rhs)?;
        let ba = rhs.matmul(self)?;
        ab.try_add(&ba)
    }

    /// Apply to a state vector.
    pub fn apply<S>(&self, psi: &nd::ArrayBase<S, nd::Ix1>)
        -> Result<nd::Array1<C64>>
    where S: nd::Data<Elem = C64>
    {
        self.check_dim("state vector", psi.len())?;
        Ok(self.matrix.apply(psi))
    }

    /// Expectation value `⟨ψ|Ã|ψ⟩` for a (not necessarily normalized) state
    /// vector.
    pub fn expect<S>(&self, psi: &nd::ArrayBase<S, nd::Ix1>) -> Result<C64>
    where S: nd::Data<Elem = C64>
    {
        let a_psi = self.apply(psi)?;
        Ok(psi.iter().zip(a_psi.iter()).map(|(p, ap)| p.conj() * ap).sum())
    }

    /// Expectation value `Tr(ρ Ã)` for a density matrix.
    pub fn expect_density<S>(&self, rho: &nd::ArrayBase<S, nd::Ix2>)
        -> Result<C64>
    where S: nd::Data<Elem = C64>
    {
        let (nr, nc) = rho.dim();
        self.check_dim("density matrix", nr)?;
        self.check_dim("density matrix", nc)?;
        Ok(
            self.matrix.entries().into_iter()
                .map(|((i, j), a)| a * rho[[j, i]])
                .sum()
        )
    }

    /// Check that `self` is sized for `basis`.
    pub fn check_basis(&self, basis: &ManyBodyBasis) -> Result<()> {
        self.check_dim("many-body operator", basis.dim())
    }

    fn check_dim(&self, context: &'static str, got: usize) -> Result<()> {
        (self.dim() == got).then_some(())
            .ok_or(Error::mismatch(context, self.dim(), got))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_traits::{ One, Zero };
    use crate::hilbert::SingleParticleSpace;
    use super::*;

    fn pauli_x(storage: Storage) -> ManyBodyOperator {
        ManyBodyOperator::from_dense(
            nd::array![
                [C64::zero(), C64::one()],
                [C64::one(), C64::zero()],
            ],
            storage,
        )
        .unwrap()
    }

    #[test]
    fn algebra() {
        for storage in [Storage::Dense, Storage::Sparse] {
            let x = pauli_x(storage);
            let xx = x.matmul(&x).unwrap();
            assert_eq!(xx.to_dense(), nd::Array2::<C64>::eye(2));
            assert_eq!(x.anti_commutator(&x).unwrap().to_dense(), nd::Array2::<C64>::eye(2) * 2.0);
            assert_eq!(x.commutator(&x).unwrap().nnz(), 0);
            assert!(x.is_hermitian(1e-15));
            assert_eq!(x.storage(), storage);
        }
    }

    #[test]
    fn expectations() {
        let x = pauli_x(Storage::Sparse);
        let plus = nd::array![C64::one(), C64::one()] / 2.0_f64.sqrt();
        assert_relative_eq!(x.expect(&plus).unwrap().re, 1.0, epsilon = 1e-12);

        let rho = nd::array![
            [C64::from(0.5), C64::from(0.25)],
            [C64::from(0.25), C64::from(0.5)],
        ];
        assert_relative_eq!(x.expect_density(&rho).unwrap().re, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn dimension_checks() {
        let x = pauli_x(Storage::Dense);
        assert!(matches!(
            x.apply(&nd::Array1::<C64>::zeros(3)),
            Err(Error::DimensionMismatch { expected: 2, got: 3, .. }),
        ));
        assert!(ManyBodyOperator::from_dense(
            nd::Array2::zeros((2, 3)), Storage::Dense).is_err());

        let space = SingleParticleSpace::new(3).unwrap();
        let basis = ManyBodyBasis::fermions(&space, 1).unwrap();
        assert!(x.check_basis(&basis).is_err());
        assert!(ManyBodyOperator::identity(&basis).check_basis(&basis).is_ok());
        assert_eq!(ManyBodyOperator::zeros(&basis).nnz(), 0);
    }
}
