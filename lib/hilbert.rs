//! Single-particle bases and the linear operators defined over them.
//!
//! A [`SingleParticleSpace`] is an orthonormal `N`-level basis whose states
//! are labeled by [`Mode`]s `0..N`. Operators over it are stored in the
//! [`Storage`] form chosen when the space is created.

use std::fmt;
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use crate::{
    error::{ Error, Result },
    matrix::{ Matrix, Storage },
};

/* Modes **********************************************************************/

/// Index of a single single-particle basis state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mode(pub usize);

impl Mode {
    /// Return the bare index.
    pub fn index(self) -> usize { self.0 }
}

impl From<usize> for Mode {
    fn from(k: usize) -> Self { Self(k) }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode {}", self.0)
    }
}

/* Spaces *********************************************************************/

/// An `N`-level orthonormal single-particle basis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SingleParticleSpace {
    dim: usize,
    storage: Storage,
}

impl SingleParticleSpace {
    /// Create a new `N`-level space with dense operator storage.
    ///
    /// Fails if `dim` is zero.
    pub fn new(dim: usize) -> Result<Self> {
        if dim < 1 { return Err(Error::InvalidDimension(dim)); }
        Ok(Self { dim, storage: Storage::Dense })
    }

    /// Use a different storage form for operators built over this space.
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    /// Number of levels.
    pub fn dim(&self) -> usize { self.dim }

    pub fn storage(&self) -> Storage { self.storage }

    /// Iterate over all modes in basis order.
    pub fn modes(&self) -> impl Iterator<Item = Mode> {
        (0..self.dim).map(Mode)
    }

    /// Return the index of `mode`, failing if it lies outside the space.
    pub fn check_mode(&self, mode: Mode) -> Result<usize> {
        let Mode(k) = mode;
        if k < self.dim {
            Ok(k)
        } else {
            Err(Error::IndexOutOfRange { index: k, dim: self.dim })
        }
    }

    /// Get an array representation of a particular basis state.
    pub fn basis_vector(&self, mode: Mode) -> Result<nd::Array1<C64>> {
        let k = self.check_mode(mode)?;
        Ok(
            (0..self.dim)
                .map(|j| if j == k { C64::one() } else { C64::zero() })
                .collect()
        )
    }

    /// The identity operator.
    pub fn identity(&self) -> SingleParticleOperator {
        SingleParticleOperator {
            matrix: Matrix::identity(self.dim, self.storage),
        }
    }

    /// Build the operator diagonal in this basis with the given entries, e.g.
    /// a Hamiltonian from level energies.
    ///
    /// Fails if the number of entries differs from the number of levels.
    pub fn diagonal_operator(&self, energies: &[f64])
        -> Result<SingleParticleOperator>
    {
        if energies.len() != self.dim {
            return Err(
                Error::mismatch("diagonal operator", self.dim, energies.len()));
        }
        let matrix = Matrix::from_triplets(
            self.dim,
            self.storage,
            energies.iter().enumerate()
                .map(|(k, e)| ((k, k), C64::from(*e))),
        );
        Ok(SingleParticleOperator { matrix })
    }

    /// Build `|target⟩⟨source|`, the operator taking `source` to `target`.
    ///
    /// Fails if either mode lies outside the space.
    pub fn transition_operator(&self, target: Mode, source: Mode)
        -> Result<SingleParticleOperator>
    {
        let t = self.check_mode(target)?;
        let s = self.check_mode(source)?;
        let matrix = Matrix::from_triplets(
            self.dim, self.storage, [((t, s), C64::one())]);
        Ok(SingleParticleOperator { matrix })
    }

    /// Wrap an arbitrary matrix as an operator over this space.
    ///
    /// Fails if the matrix is not `N × N`.
    pub fn operator_from_matrix(&self, matrix: nd::Array2<C64>)
        -> Result<SingleParticleOperator>
    {
        let (nr, nc) = matrix.dim();
        if nr != self.dim {
            return Err(Error::mismatch("operator rows", self.dim, nr));
        }
        if nc != self.dim {
            return Err(Error::mismatch("operator columns", self.dim, nc));
        }
        Ok(SingleParticleOperator {
            matrix: Matrix::from_dense(matrix, self.storage),
        })
    }
}

/* One-particle operators *****************************************************/

/// A linear map on a [`SingleParticleSpace`].
///
/// Entry `(s, t)` is the amplitude `⟨s|A|t⟩`.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleParticleOperator {
    matrix: Matrix,
}

impl SingleParticleOperator {
    /// Number of levels of the underlying space.
    pub fn dim(&self) -> usize { self.matrix.dim() }

    pub fn storage(&self) -> Storage { self.matrix.storage() }

    pub fn matrix(&self) -> &Matrix { &self.matrix }

    /// Get the amplitude `⟨target|A|source⟩`.
    ///
    /// *Panics* if either mode is out of range.
    pub fn get(&self, target: Mode, source: Mode) -> C64 {
        self.matrix.get(target.0, source.0)
    }

    /// All nonzero amplitudes as `((target, source), value)`.
    pub fn entries(&self) -> Vec<((Mode, Mode), C64)> {
        self.matrix.entries().into_iter()
            .map(|((s, t), a)| ((Mode(s), Mode(t)), a))
            .collect()
    }

    pub fn to_dense(&self) -> nd::Array2<C64> { self.matrix.to_dense() }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self { Self { matrix: self.matrix.adjoint() } }

    /// Return `true` if `self` equals its adjoint to within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.matrix.hermitian_deviation() <= tol
    }

    /// Multiply by a scalar.
    pub fn scaled<A>(&self, factor: A) -> Self
    where A: Into<C64>
    {
        Self { matrix: self.matrix.scaled(factor.into()) }
    }

    /// Add two operators over the same space.
    ///
    /// Fails if the dimensions differ.
    pub fn try_add(&self, rhs: &Self) -> Result<Self> {
        if self.dim() != rhs.dim() {
            return Err(Error::mismatch("operator sum", self.dim(), rhs.dim()));
        }
        Ok(Self { matrix: self.matrix.sum(&rhs.matrix) })
    }
}

/* Two-particle operators *****************************************************/

/// A linear map on the ordered two-particle product space of a
/// [`SingleParticleSpace`].
///
/// Pair `(s1, s2)` is stored at row/column `s1 * N + s2`, so that entry
/// `((s1, s2), (t1, t2))` is the amplitude `⟨s1 s2|V|t1 t2⟩`.
#[derive(Clone, Debug, PartialEq)]
pub struct TwoParticleOperator {
    dim: usize,
    matrix: Matrix,
}

impl TwoParticleOperator {
    /// Build an operator from `((s1, s2), (t1, t2), value)` amplitudes,
    /// summing repeated entries.
    ///
    /// Fails if any mode lies outside the space.
    pub fn from_entries<I>(space: &SingleParticleSpace, entries: I)
        -> Result<Self>
    where I: IntoIterator<Item = ((Mode, Mode), (Mode, Mode), C64)>
    {
        let n = space.dim();
        let triplets: Vec<((usize, usize), C64)>
            = entries.into_iter()
            .map(|((s1, s2), (t1, t2), a)| {
                let s1 = space.check_mode(s1)?;
                let s2 = space.check_mode(s2)?;
                let t1 = space.check_mode(t1)?;
                let t2 = space.check_mode(t2)?;
                Ok(((s1 * n + s2, t1 * n + t2), a))
            })
            .collect::<Result<_>>()?;
        let matrix = Matrix::from_triplets(n * n, space.storage(), triplets);
        Ok(Self { dim: n, matrix })
    }

    /// Build the density-density interaction `½ Σ_{s≠t} U[s, t] n_s n_t`
    /// from a symmetric `N × N` coupling matrix; diagonal entries of `U` give
    /// the on-site term `½ U[s, s] n_s (n_s - 1)`.
    ///
    /// Fails if `couplings` is not `N × N`.
    pub fn density_interaction(
        space: &SingleParticleSpace,
        couplings: &nd::Array2<f64>,
    ) -> Result<Self>
    {
        let n = space.dim();
        let (nr, nc) = couplings.dim();
        if nr != n || nc != n {
            return Err(Error::mismatch("interaction couplings", n, nr.max(nc)));
        }
        Self::from_entries(
            space,
            couplings.indexed_iter()
                .filter(|(_, u)| **u != 0.0)
                .map(|((s, t), u)| {
                    ((Mode(s), Mode(t)), (Mode(s), Mode(t)), C64::from(0.5 * u))
                }),
        )
    }

    /// Number of levels of the underlying single-particle space.
    pub fn dim(&self) -> usize { self.dim }

    pub fn storage(&self) -> Storage { self.matrix.storage() }

    /// All nonzero amplitudes as `((s1, s2), (t1, t2), value)`.
    pub fn entries(&self) -> Vec<((Mode, Mode), (Mode, Mode), C64)> {
        let n = self.dim;
        self.matrix.entries().into_iter()
            .map(|((row, col), a)| {
                (
                    (Mode(row / n), Mode(row % n)),
                    (Mode(col / n), Mode(col % n)),
                    a,
                )
            })
            .collect()
    }
}
