//! Second-quantized lifting of single- and two-particle operators into a
//! many-body basis.
//!
//! Every operator built here is a weighted sum of ladder-operator strings.
//! Each string is applied to every basis state in turn; intermediate states
//! only have to be physical (no negative occupations, no doubly occupied
//! fermionic modes), while the final state is resolved against the basis:
//! - states outside the space the basis declares (e.g. above a bosonic cap,
//!   or in a particle-number sector that was not enumerated) are dropped and
//!   counted as truncated;
//! - declared states that are missing from the enumeration are an error.

use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use rayon::prelude::*;
use tracing::trace;
use crate::{
    error::{ Error, Result },
    hilbert::{ Mode, SingleParticleOperator, TwoParticleOperator },
    matrix::Matrix,
};
use super::{ ManyBodyBasis, ManyBodyOperator, Occupation, Statistics };

/// A single creation or annihilation operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ladder {
    /// `a†_m`
    Create(Mode),
    /// `a_m`
    Destroy(Mode),
}

impl Ladder {
    pub fn mode(self) -> Mode {
        match self {
            Self::Create(m) | Self::Destroy(m) => m,
        }
    }

    fn act(self, occupation: &Occupation, statistics: Statistics)
        -> Option<(Occupation, f64)>
    {
        match self {
            Self::Create(m) => occupation.create(m.0, statistics),
            Self::Destroy(m) => occupation.annihilate(m.0, statistics),
        }
    }
}

// a coefficient and a ladder string in written order (rightmost acts first)
type Term = (C64, Vec<Ladder>);

enum Outcome {
    Vanishes,
    Truncated,
    Lands(usize, f64),
}

/// Builds [`ManyBodyOperator`]s over a borrowed [`ManyBodyBasis`].
///
/// Work is spread over basis states with `rayon` by default; the result does
/// not depend on whether it runs in parallel.
#[derive(Copy, Clone, Debug)]
pub struct Lifter<'a> {
    basis: &'a ManyBodyBasis,
    parallel: bool,
}

impl<'a> Lifter<'a> {
    pub fn new(basis: &'a ManyBodyBasis) -> Self {
        Self { basis, parallel: true }
    }

    /// Run on the calling thread only.
    pub fn serial(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn basis(&self) -> &'a ManyBodyBasis { self.basis }

    fn check_mode(&self, mode: Mode) -> Result<()> {
        let dim = self.basis.num_modes();
        (mode.0 < dim).then_some(())
            .ok_or(Error::IndexOutOfRange { index: mode.0, dim })
    }

    fn act(&self, ladders: &[Ladder], source: &Occupation) -> Result<Outcome> {
        let statistics = self.basis.statistics();
        let mut state = source.clone();
        let mut amp = 1.0;
        for ladder in ladders.iter().rev() {
            match ladder.act(&state, statistics) {
                Some((next, a)) => {
                    state = next;
                    amp *= a;
                },
                None => { return Ok(Outcome::Vanishes); },
            }
        }
        let outcome
            = match self.basis.locate(&state)? {
                Some(target) => Outcome::Lands(target, amp),
                None => Outcome::Truncated,
            };
        Ok(outcome)
    }

    fn column(&self, terms: &[Term], j: usize)
        -> Result<(Vec<((usize, usize), C64)>, usize)>
    {
        let source
            = self.basis.occupation(j)
            .ok_or(Error::IndexOutOfRange { index: j, dim: self.basis.dim() })?;
        let mut elements: Vec<((usize, usize), C64)> = Vec::new();
        let mut truncated: usize = 0;
        for (coeff, ladders) in terms.iter() {
            match self.act(ladders, source)? {
                Outcome::Lands(i, amp) => { elements.push(((i, j), coeff * amp)); },
                Outcome::Truncated => { truncated += 1; },
                Outcome::Vanishes => { },
            }
        }
        Ok((elements, truncated))
    }

    fn assemble(&self, what: &'static str, terms: Vec<Term>)
        -> Result<ManyBodyOperator>
    {
        let dim = self.basis.dim();
        let columns: Vec<(Vec<((usize, usize), C64)>, usize)>
            = if self.parallel {
                (0..dim).into_par_iter()
                    .map(|j| self.column(&terms, j))
                    .collect::<Result<_>>()?
            } else {
                (0..dim)
                    .map(|j| self.column(&terms, j))
                    .collect::<Result<_>>()?
            };
        let truncated: usize = columns.iter().map(|(_, t)| *t).sum();
        let matrix
            = Matrix::from_triplets(
                dim,
                self.basis.storage(),
                columns.into_iter().flat_map(|(elements, _)| elements),
            );
        trace!(operator = what, dim, nnz = matrix.nnz(), truncated, "lifted operator");
        Ok(matrix.into())
    }

    /// Lift a single-particle operator `A` to `Σ_{s,t} A[s, t] a†_s a_t`.
    ///
    /// Fails if `A` does not act on as many modes as the basis has.
    pub fn lift(&self, op: &SingleParticleOperator) -> Result<ManyBodyOperator> {
        if op.dim() != self.basis.num_modes() {
            return Err(Error::mismatch(
                "single-particle operator", self.basis.num_modes(), op.dim()));
        }
        let terms: Vec<Term>
            = op.entries().into_iter()
            .map(|((s, t), a)| (a, vec![Ladder::Create(s), Ladder::Destroy(t)]))
            .collect();
        self.assemble("one-body", terms)
    }

    /// Lift a two-particle operator `V` to
    /// `Σ V[(s1 s2), (t1 t2)] a†_s1 a†_s2 a_t2 a_t1`.
    ///
    /// Fails if `V` is not defined over as many modes as the basis has.
    pub fn lift_two_body(&self, op: &TwoParticleOperator)
        -> Result<ManyBodyOperator>
    {
        if op.dim() != self.basis.num_modes() {
            return Err(Error::mismatch(
                "two-particle operator", self.basis.num_modes(), op.dim()));
        }
        let terms: Vec<Term>
            = op.entries().into_iter()
            .map(|((s1, s2), (t1, t2), v)| {
                (
                    v,
                    vec![
                        Ladder::Create(s1),
                        Ladder::Create(s2),
                        Ladder::Destroy(t2),
                        Ladder::Destroy(t1),
                    ],
                )
            })
            .collect();
        self.assemble("two-body", terms)
    }

    /// Lift an arbitrary product of ladder operators, written left to right
    /// (the rightmost factor acts first).
    pub fn product(&self, ladders: &[Ladder]) -> Result<ManyBodyOperator> {
        ladders.iter().try_for_each(|l| self.check_mode(l.mode()))?;
        self.assemble("ladder product", vec![(C64::from(1.0), ladders.to_vec())])
    }

    /// `a†_mode`
    pub fn create(&self, mode: Mode) -> Result<ManyBodyOperator> {
        self.check_mode(mode)?;
        self.assemble("creation", vec![(C64::from(1.0), vec![Ladder::Create(mode)])])
    }

    /// `a_mode`
    pub fn destroy(&self, mode: Mode) -> Result<ManyBodyOperator> {
        self.check_mode(mode)?;
        self.assemble("annihilation", vec![(C64::from(1.0), vec![Ladder::Destroy(mode)])])
    }

    /// Number operator `n_mode`, or the total number operator `Σ_m n_m` if
    /// `mode` is `None`.
    pub fn number(&self, mode: Option<Mode>) -> Result<ManyBodyOperator> {
        let modes: Vec<Mode>
            = match mode {
                Some(m) => {
                    self.check_mode(m)?;
                    vec![m]
                },
                None => (0..self.basis.num_modes()).map(Mode).collect(),
            };
        let terms: Vec<Term>
            = modes.into_iter()
            .map(|m| (C64::from(1.0), vec![Ladder::Create(m), Ladder::Destroy(m)]))
            .collect();
        self.assemble("number", terms)
    }

    /// `a†_target a_source`
    pub fn transition(&self, target: Mode, source: Mode)
        -> Result<ManyBodyOperator>
    {
        self.check_mode(target)?;
        self.check_mode(source)?;
        self.assemble(
            "transition",
            vec![(C64::from(1.0), vec![Ladder::Create(target), Ladder::Destroy(source)])],
        )
    }

    /// Single-particle reduced density matrix `ρ[s, t] = ⟨ψ|a†_t a_s|ψ⟩`.
    ///
    /// The trace is the mean particle number of `ψ`.
    pub fn one_body_density<S>(&self, psi: &nd::ArrayBase<S, nd::Ix1>)
        -> Result<nd::Array2<C64>>
    where S: nd::Data<Elem = C64>
    {
        if psi.len() != self.basis.dim() {
            return Err(Error::mismatch("state vector", self.basis.dim(), psi.len()));
        }
        let n = self.basis.num_modes();
        let mut rho: nd::Array2<C64> = nd::Array2::zeros((n, n));
        for (j, source) in self.basis.states().enumerate() {
            if psi[j].is_zero() { continue; }
            for s in 0..n {
                for t in 0..n {
                    let ladders = [Ladder::Create(Mode(t)), Ladder::Destroy(Mode(s))];
                    if let Outcome::Lands(i, amp) = self.act(&ladders, source)? {
                        rho[[s, t]] += psi[i].conj() * amp * psi[j];
                    }
                }
            }
        }
        Ok(rho)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_traits::One;
    use rand::{ Rng, SeedableRng, rngs::StdRng };
    use crate::{
        hilbert::SingleParticleSpace,
        matrix::Storage,
        manybody::OccupationPolicy,
    };
    use super::*;

    fn space(n: usize) -> SingleParticleSpace {
        SingleParticleSpace::new(n).unwrap()
    }

    fn element(
        basis: &ManyBodyBasis,
        op: &ManyBodyOperator,
        target: [usize; 4],
        source: [usize; 4],
    ) -> C64
    {
        let i = basis.index_of(&target.into()).unwrap();
        let j = basis.index_of(&source.into()).unwrap();
        op.get(i, j)
    }

    fn random_hermitian(n: usize, rng: &mut StdRng) -> nd::Array2<C64> {
        let a: nd::Array2<C64>
            = nd::Array2::from_shape_fn(
                (n, n), |_| C64::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5));
        &a + &a.t().mapv(|z| z.conj())
    }

    #[test]
    fn jordan_wigner_signs() {
        let basis = ManyBodyBasis::fermions(&space(4), 2).unwrap();
        let lifter = Lifter::new(&basis);
        let t23 = lifter.transition(Mode(2), Mode(3)).unwrap();
        assert_eq!(element(&basis, &t23, [0, 1, 1, 0], [0, 1, 0, 1]), C64::one());

        let t13 = lifter.transition(Mode(1), Mode(3)).unwrap();
        assert_eq!(element(&basis, &t13, [1, 1, 0, 0], [1, 0, 0, 1]), C64::one());

        let t03 = lifter.transition(Mode(0), Mode(3)).unwrap();
        assert_eq!(element(&basis, &t03, [1, 1, 0, 0], [0, 1, 0, 1]), -C64::one());

        // the lifted single-particle transition operator agrees
        let a03 = space(4).transition_operator(Mode(0), Mode(3)).unwrap();
        assert_eq!(lifter.lift(&a03).unwrap(), t03);
    }

    #[test]
    fn boson_ladder_under_cap() {
        let basis = ManyBodyBasis::bosons_capped(&space(4), 3).unwrap();
        let a0 = Lifter::new(&basis).destroy(Mode(0)).unwrap();
        let amp = element(&basis, &a0, [2, 0, 0, 0], [3, 0, 0, 0]);
        assert_relative_eq!(amp.re, 3.0_f64.sqrt(), epsilon = 1e-14);
        assert_eq!(amp.im, 0.0);
    }

    #[test]
    fn identity_lifts_to_number() {
        let space = space(4);
        let basis = ManyBodyBasis::fermions(&space, 2).unwrap();
        let lifted = Lifter::new(&basis).lift(&space.identity()).unwrap();
        let expected = nd::Array2::<C64>::eye(basis.dim()) * 2.0;
        assert_eq!(lifted.to_dense(), expected);
        assert_eq!(Lifter::new(&basis).number(None).unwrap(), lifted);
    }

    #[test]
    fn identity_lifts_to_identity_for_one_particle() {
        let space = space(4);
        let bases = [
            ManyBodyBasis::fermions(&space, 1).unwrap(),
            ManyBodyBasis::bosons(&space, 1).unwrap(),
        ];
        for basis in bases.iter() {
            let lifted = Lifter::new(basis).lift(&space.identity()).unwrap();
            assert_eq!(lifted.to_dense(), nd::Array2::<C64>::eye(basis.dim()));
        }
    }

    #[test]
    fn hermitian_stays_hermitian() {
        let mut rng = StdRng::seed_from_u64(10546);
        let space = space(5);
        let bases = [
            ManyBodyBasis::fermions(&space, 2).unwrap(),
            ManyBodyBasis::bosons(&space, 3).unwrap(),
            ManyBodyBasis::bosons_capped(&space, 2).unwrap(),
        ];
        for basis in bases.iter() {
            let h = space.operator_from_matrix(random_hermitian(5, &mut rng)).unwrap();
            let lifted = Lifter::new(basis).lift(&h).unwrap();
            assert!(lifted.is_hermitian(1e-12), "{:?}", basis.statistics());
        }
    }

    #[test]
    fn fermion_anticommutators() {
        let space = space(3);
        let basis = ManyBodyBasis::new(
            &space,
            Statistics::Fermion,
            OccupationPolicy::NumberRange(vec![0, 1, 2, 3]),
        )
        .unwrap();
        assert_eq!(basis.dim(), 8);
        let lifter = Lifter::new(&basis);
        let eye = nd::Array2::<C64>::eye(basis.dim());
        for i in space.modes() {
            let a = lifter.destroy(i).unwrap();
            assert_eq!(lifter.create(i).unwrap(), a.adjoint());
            for j in space.modes() {
                let ad = lifter.create(j).unwrap();
                let anti = a.anti_commutator(&ad).unwrap().to_dense();
                if i == j {
                    assert_eq!(anti, eye);
                } else {
                    assert!(anti.iter().all(|z| z.is_zero()));
                }
                let aa = lifter.destroy(j).unwrap();
                assert_eq!(a.anti_commutator(&aa).unwrap().nnz(), 0);
            }
        }
    }

    #[test]
    fn boson_commutator_below_cap() {
        let basis = ManyBodyBasis::bosons_capped(&space(2), 3).unwrap();
        let lifter = Lifter::new(&basis);
        let a = lifter.destroy(Mode(0)).unwrap();
        let ad = lifter.create(Mode(0)).unwrap();
        let comm = a.commutator(&ad).unwrap();
        for (k, occ) in basis.states().enumerate() {
            let expected = if occ[0] < 3 { 1.0 } else { -3.0 };
            assert_relative_eq!(comm.get(k, k).re, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn density_interaction_is_diagonal() {
        let space = space(3);
        let basis = ManyBodyBasis::fermions(&space, 2).unwrap();
        let u = 0.75;
        let mut couplings = nd::Array2::<f64>::zeros((3, 3));
        couplings[[0, 1]] = u;
        couplings[[1, 0]] = u;
        let v = TwoParticleOperator::density_interaction(&space, &couplings).unwrap();
        let lifted = Lifter::new(&basis).lift_two_body(&v).unwrap();
        for (i, occ) in basis.states().enumerate() {
            for j in 0..basis.dim() {
                let expected = if i == j { u * (occ[0] * occ[1]) as f64 } else { 0.0 };
                assert_relative_eq!(lifted.get(i, j).re, expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn serial_and_sparse_agree() {
        let mut rng = StdRng::seed_from_u64(2718);
        let space = space(6);
        let h = space.operator_from_matrix(random_hermitian(6, &mut rng)).unwrap();
        let dense = ManyBodyBasis::fermions(&space, 3).unwrap();
        let sparse = dense.clone().with_storage(Storage::Sparse);

        let par = Lifter::new(&dense).lift(&h).unwrap();
        let ser = Lifter::new(&dense).serial().lift(&h).unwrap();
        assert_eq!(par, ser);

        let sp = Lifter::new(&sparse).lift(&h).unwrap();
        assert_eq!(sp.storage(), Storage::Sparse);
        assert_eq!(sp.to_dense(), par.to_dense());
    }

    #[test]
    fn missing_declared_state_is_fatal() {
        let space = space(3);
        let basis = ManyBodyBasis::from_occupations(
            &space, Statistics::Fermion, [[1, 0, 0], [0, 1, 0]]).unwrap();
        let lifter = Lifter::new(&basis);
        assert!(matches!(
            lifter.transition(Mode(2), Mode(0)),
            Err(Error::StateNotInBasis(occ)) if occ == vec![0, 0, 1],
        ));
        // creation leaves the declared one-particle sector: truncated
        assert_eq!(lifter.create(Mode(2)).unwrap().nnz(), 0);
        assert!(matches!(
            lifter.destroy(Mode(3)),
            Err(Error::IndexOutOfRange { index: 3, dim: 3 }),
        ));
    }

    #[test]
    fn reduced_density_trace() {
        let space = space(4);
        let basis = ManyBodyBasis::fermions(&space, 2).unwrap();
        let lifter = Lifter::new(&basis);
        let psi = basis.vector_weighted(|_, k| C64::from((k + 1) as f64))
            / ((1..=6).map(|k| (k * k) as f64).sum::<f64>()).sqrt();
        let rho = lifter.one_body_density(&psi).unwrap();
        assert_relative_eq!(rho.diag().sum().re, 2.0, epsilon = 1e-12);
        let dev = (&rho - &rho.t().mapv(|z| z.conj())).mapv(|z| z.norm()).sum();
        assert!(dev < 1e-12);
        let n1 = lifter.number(Some(Mode(1))).unwrap().expect(&psi).unwrap();
        assert_relative_eq!(rho[[1, 1]].re, n1.re, epsilon = 1e-12);
    }
}
