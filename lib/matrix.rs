//! Dense and sparse storage for square operator matrices, plus a few
//! matrix-level helpers shared by the single-particle, many-body, and
//! master-equation layers.

use std::collections::BTreeMap;
use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use serde::{ Deserialize, Serialize };

/// Selects how an operator's matrix is stored.
///
/// This is chosen once, when a space or basis is constructed, and inherited by
/// every operator built over it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    /// Full `ndarray` matrix.
    #[default]
    Dense,
    /// Sorted map of nonzero `(row, column)` entries.
    Sparse,
}

/* Sparse matrices ************************************************************/

/// A square matrix holding only its nonzero entries, keyed by `(row, column)`
/// in row-major order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseMatrix {
    dim: usize,
    entries: BTreeMap<(usize, usize), C64>,
}

impl SparseMatrix {
    /// Create a new all-zero matrix.
    pub fn zeros(dim: usize) -> Self {
        Self { dim, entries: BTreeMap::new() }
    }

    /// Build a matrix by summing `((row, column), value)` triplets.
    ///
    /// Entries that cancel to exactly zero are dropped. Indices must be less
    /// than `dim`.
    pub fn from_triplets<I>(dim: usize, triplets: I) -> Self
    where I: IntoIterator<Item = ((usize, usize), C64)>
    {
        let mut entries: BTreeMap<(usize, usize), C64> = BTreeMap::new();
        for ((i, j), a) in triplets.into_iter() {
            debug_assert!(i < dim && j < dim);
            *entries.entry((i, j)).or_insert_with(C64::zero) += a;
        }
        entries.retain(|_, a| !a.is_zero());
        Self { dim, entries }
    }

    /// Convert a dense array, keeping only nonzero entries.
    ///
    /// *Panics* if the array is not square.
    pub fn from_dense(array: &nd::Array2<C64>) -> Self {
        assert!(array.is_square(), "SparseMatrix::from_dense: non-square array");
        Self::from_triplets(
            array.nrows(),
            array.indexed_iter()
                .filter(|(_, a)| !a.is_zero())
                .map(|(ij, a)| (ij, *a)),
        )
    }

    pub fn dim(&self) -> usize { self.dim }

    /// Number of stored (nonzero) entries.
    pub fn nnz(&self) -> usize { self.entries.len() }

    pub fn get(&self, i: usize, j: usize) -> C64 {
        self.entries.get(&(i, j)).copied().unwrap_or_else(C64::zero)
    }

    /// Iterate over nonzero entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), C64)> + '_ {
        self.entries.iter().map(|(ij, a)| (*ij, *a))
    }

    pub fn to_dense(&self) -> nd::Array2<C64> {
        let mut array: nd::Array2<C64> = nd::Array2::zeros((self.dim, self.dim));
        self.entries.iter()
            .for_each(|((i, j), a)| { array[[*i, *j]] = *a; });
        array
    }
}

/* Storage-agnostic matrices **************************************************/

/// A square complex matrix in either dense or sparse form.
#[derive(Clone, Debug, PartialEq)]
pub enum Matrix {
    Dense(nd::Array2<C64>),
    Sparse(SparseMatrix),
}

impl Matrix {
    /// Create a new all-zero matrix.
    pub fn zeros(dim: usize, storage: Storage) -> Self {
        match storage {
            Storage::Dense => Self::Dense(nd::Array2::zeros((dim, dim))),
            Storage::Sparse => Self::Sparse(SparseMatrix::zeros(dim)),
        }
    }

    /// Create a new identity matrix.
    pub fn identity(dim: usize, storage: Storage) -> Self {
        Self::from_triplets(
            dim, storage, (0..dim).map(|k| ((k, k), C64::from(1.0))))
    }

    /// Build a matrix by summing `((row, column), value)` triplets.
    pub fn from_triplets<I>(dim: usize, storage: Storage, triplets: I) -> Self
    where I: IntoIterator<Item = ((usize, usize), C64)>
    {
        match storage {
            Storage::Dense => {
                let mut array: nd::Array2<C64> = nd::Array2::zeros((dim, dim));
                triplets.into_iter()
                    .for_each(|((i, j), a)| { array[[i, j]] += a; });
                Self::Dense(array)
            },
            Storage::Sparse => {
                Self::Sparse(SparseMatrix::from_triplets(dim, triplets))
            },
        }
    }

    /// Wrap a dense array, converting to the requested storage.
    ///
    /// *Panics* if the array is not square.
    pub fn from_dense(array: nd::Array2<C64>, storage: Storage) -> Self {
        assert!(array.is_square(), "Matrix::from_dense: non-square array");
        match storage {
            Storage::Dense => Self::Dense(array),
            Storage::Sparse => Self::Sparse(SparseMatrix::from_dense(&array)),
        }
    }

    pub fn storage(&self) -> Storage {
        match self {
            Self::Dense(_) => Storage::Dense,
            Self::Sparse(_) => Storage::Sparse,
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            Self::Dense(a) => a.nrows(),
            Self::Sparse(s) => s.dim(),
        }
    }

    pub fn get(&self, i: usize, j: usize) -> C64 {
        match self {
            Self::Dense(a) => a[[i, j]],
            Self::Sparse(s) => s.get(i, j),
        }
    }

    /// Collect all nonzero entries in row-major order.
    pub fn entries(&self) -> Vec<((usize, usize), C64)> {
        match self {
            Self::Dense(a) => {
                a.indexed_iter()
                    .filter(|(_, a)| !a.is_zero())
                    .map(|(ij, a)| (ij, *a))
                    .collect()
            },
            Self::Sparse(s) => s.iter().collect(),
        }
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        match self {
            Self::Dense(a) => a.iter().filter(|a| !a.is_zero()).count(),
            Self::Sparse(s) => s.nnz(),
        }
    }

    pub fn to_dense(&self) -> nd::Array2<C64> {
        match self {
            Self::Dense(a) => a.clone(),
            Self::Sparse(s) => s.to_dense(),
        }
    }

    /// Convert to another storage form.
    pub fn into_storage(self, storage: Storage) -> Self {
        match (self, storage) {
            (Self::Dense(a), Storage::Sparse)
                => Self::Sparse(SparseMatrix::from_dense(&a)),
            (Self::Sparse(s), Storage::Dense) => Self::Dense(s.to_dense()),
            (m, _) => m,
        }
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self {
        match self {
            Self::Dense(a) => Self::Dense(a.t().mapv(|z| z.conj())),
            Self::Sparse(s) => Self::Sparse(
                SparseMatrix::from_triplets(
                    s.dim(), s.iter().map(|((i, j), a)| ((j, i), a.conj())))
            ),
        }
    }

    /// Multiply every entry by a scalar.
    pub fn scaled(&self, factor: C64) -> Self {
        match self {
            Self::Dense(a) => Self::Dense(a * factor),
            Self::Sparse(s) => Self::Sparse(
                SparseMatrix::from_triplets(
                    s.dim(), s.iter().map(|(ij, a)| (ij, a * factor)))
            ),
        }
    }

    /// Entrywise sum. The result is sparse only if both operands are.
    ///
    /// *Panics* if the dimensions differ.
    pub fn sum(&self, rhs: &Self) -> Self {
        assert_eq!(self.dim(), rhs.dim(), "Matrix::sum: unequal dimensions");
        match (self, rhs) {
            (Self::Sparse(a), Self::Sparse(b)) => Self::Sparse(
                SparseMatrix::from_triplets(a.dim(), a.iter().chain(b.iter()))
            ),
            (lhs, rhs) => Self::Dense(lhs.to_dense() + rhs.to_dense()),
        }
    }

    /// Matrix product `self · rhs`. The result is sparse only if both operands
    /// are.
    ///
    /// *Panics* if the dimensions differ.
    pub fn matmul(&self, rhs: &Self) -> Self {
        assert_eq!(self.dim(), rhs.dim(), "Matrix::matmul: unequal dimensions");
        match (self, rhs) {
            (Self::Sparse(a), Self::Sparse(b)) => {
                let mut rows: BTreeMap<usize, Vec<(usize, C64)>>
                    = BTreeMap::new();
                b.iter()
                    .for_each(|((k, j), bkj)| {
                        rows.entry(k).or_default().push((j, bkj));
                    });
                let triplets
                    = a.iter()
                    .flat_map(|((i, k), aik)| {
                        rows.get(&k).into_iter().flatten()
                            .map(move |(j, bkj)| ((i, *j), aik * bkj))
                    });
                Self::Sparse(SparseMatrix::from_triplets(a.dim(), triplets))
            },
            (lhs, rhs) => Self::Dense(lhs.to_dense().dot(&rhs.to_dense())),
        }
    }

    /// Matrix-vector product.
    ///
    /// *Panics* if the vector length differs from the matrix dimension.
    pub fn apply<S>(&self, v: &nd::ArrayBase<S, nd::Ix1>) -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        assert_eq!(self.dim(), v.len(), "Matrix::apply: unequal dimensions");
        match self {
            Self::Dense(a) => a.dot(v),
            Self::Sparse(s) => {
                let mut w: nd::Array1<C64> = nd::Array1::zeros(s.dim());
                s.iter().for_each(|((i, j), a)| { w[i] += a * v[j]; });
                w
            },
        }
    }

    /// Left product `A X` with a dense matrix `X`.
    ///
    /// *Panics* if the row count of `x` differs from the matrix dimension.
    pub fn dot_dense<S>(&self, x: &nd::ArrayBase<S, nd::Ix2>) -> nd::Array2<C64>
    where S: nd::Data<Elem = C64>
    {
        assert_eq!(self.dim(), x.nrows(), "Matrix::dot_dense: unequal dimensions");
        match self {
            Self::Dense(a) => a.dot(x),
            Self::Sparse(s) => {
                let mut out: nd::Array2<C64>
                    = nd::Array2::zeros((s.dim(), x.ncols()));
                s.iter()
                    .for_each(|((i, k), a)| {
                        out.row_mut(i).scaled_add(a, &x.row(k));
                    });
                out
            },
        }
    }

    /// Right product `X A` with a dense matrix `X`.
    ///
    /// *Panics* if the column count of `x` differs from the matrix dimension.
    pub fn dense_dot<S>(&self, x: &nd::ArrayBase<S, nd::Ix2>) -> nd::Array2<C64>
    where S: nd::Data<Elem = C64>
    {
        assert_eq!(self.dim(), x.ncols(), "Matrix::dense_dot: unequal dimensions");
        match self {
            Self::Dense(a) => x.dot(a),
            Self::Sparse(s) => {
                let mut out: nd::Array2<C64>
                    = nd::Array2::zeros((x.nrows(), s.dim()));
                s.iter()
                    .for_each(|((k, j), a)| {
                        out.column_mut(j).scaled_add(a, &x.column(k));
                    });
                out
            },
        }
    }

    /// Largest `|A[i, j] - conj(A[j, i])|` over all entries.
    pub fn hermitian_deviation(&self) -> f64 {
        match self {
            Self::Dense(a) => {
                a.indexed_iter()
                    .map(|((i, j), aij)| (*aij - a[[j, i]].conj()).norm())
                    .fold(0.0, f64::max)
            },
            Self::Sparse(s) => {
                s.iter()
                    .map(|((i, j), aij)| (aij - s.get(j, i).conj()).norm())
                    .fold(0.0, f64::max)
            },
        }
    }
}

/* Dense helpers **************************************************************/

/// Compute the outer product `|a⟩⟨b|` of two state vectors.
pub fn outer_prod<SA, SB>(
    a: &nd::ArrayBase<SA, nd::Ix1>,
    b: &nd::ArrayBase<SB, nd::Ix1>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    let na = a.len();
    let nb = b.len();
    nd::Array2::from_shape_vec(
        (na, nb),
        a.iter().cartesian_product(b)
            .map(|(ai, bj)| *ai * bj.conj())
            .collect(),
    )
    .expect("outer_prod: error reshaping array")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> C64 { C64::new(re, im) }

    fn sample() -> nd::Array2<C64> {
        nd::array![
            [c(1.0, 0.0), c(0.0, 2.0), c(0.0, 0.0)],
            [c(0.0, 0.0), c(0.0, 0.0), c(3.0, -1.0)],
            [c(0.5, 0.0), c(0.0, 0.0), c(0.0, 0.0)],
        ]
    }

    #[test]
    fn sparse_drops_cancelled_entries() {
        let s = SparseMatrix::from_triplets(
            2,
            [((0, 1), c(1.0, 0.0)), ((0, 1), c(-1.0, 0.0)), ((1, 1), c(2.0, 0.0))],
        );
        assert_eq!(s.nnz(), 1);
        assert_eq!(s.get(1, 1), c(2.0, 0.0));
        assert_eq!(s.get(0, 1), C64::zero());
    }

    #[test]
    fn dense_and_sparse_agree() {
        let dense = Matrix::from_dense(sample(), Storage::Dense);
        let sparse = Matrix::from_dense(sample(), Storage::Sparse);
        assert_eq!(sparse.storage(), Storage::Sparse);
        assert_eq!(dense.nnz(), 4);
        assert_eq!(sparse.nnz(), 4);
        assert_eq!(dense.entries(), sparse.entries());
        assert_eq!(dense.adjoint().to_dense(), sparse.adjoint().to_dense());
        assert_eq!(
            dense.matmul(&dense).to_dense(),
            sparse.matmul(&sparse).to_dense(),
        );
        let v = nd::array![c(1.0, 0.0), c(0.0, 1.0), c(2.0, 0.0)];
        assert_eq!(dense.apply(&v), sparse.apply(&v));
    }

    #[test]
    fn mixed_storage_sum_is_dense() {
        let dense = Matrix::from_dense(sample(), Storage::Dense);
        let sparse = Matrix::identity(3, Storage::Sparse);
        let sum = dense.sum(&sparse);
        assert_eq!(sum.storage(), Storage::Dense);
        assert_eq!(sum.get(0, 0), c(2.0, 0.0));
        assert_eq!(sum.get(1, 1), c(1.0, 0.0));
        assert_eq!(sparse.sum(&sparse).storage(), Storage::Sparse);
    }

    #[test]
    fn hermitian_deviation() {
        let h = Matrix::from_triplets(
            2,
            Storage::Sparse,
            [((0, 1), c(0.0, 1.0)), ((1, 0), c(0.0, -1.0)), ((0, 0), c(2.0, 0.0))],
        );
        assert_abs_diff_eq!(h.hermitian_deviation(), 0.0);
        let m = Matrix::from_dense(sample(), Storage::Dense);
        assert!(m.hermitian_deviation() > 1.0);
    }

    #[test]
    fn outer_prod_of_states() {
        let a = nd::array![c(1.0, 0.0), c(0.0, 1.0)];
        let rho = outer_prod(&a, &a);
        assert_eq!(rho[[0, 1]], c(0.0, -1.0));
        assert_eq!(rho[[1, 0]], c(0.0, 1.0));
    }

    #[test]
    fn products_with_dense_matrices() {
        let x = nd::array![
            [c(0.0, 1.0), c(2.0, 0.0), c(0.0, 0.0)],
            [c(1.0, 0.0), c(0.0, 0.0), c(-1.0, 1.0)],
            [c(0.0, 0.0), c(3.0, 0.0), c(0.5, 0.0)],
        ];
        let a = sample();
        for storage in [Storage::Dense, Storage::Sparse] {
            let m = Matrix::from_dense(a.clone(), storage);
            assert_eq!(m.dot_dense(&x), a.dot(&x));
            assert_eq!(m.dense_dot(&x), x.dot(&a));
        }
        // non-square operands
        let col = nd::array![[c(1.0, 0.0)], [c(0.0, 1.0)], [c(2.0, 0.0)]];
        let sparse = Matrix::from_dense(a.clone(), Storage::Sparse);
        assert_eq!(sparse.dot_dense(&col), a.dot(&col));
        assert_eq!(sparse.dense_dot(&col.t()), col.t().dot(&a));
    }
}
