//! The many-body basis: an ordered, deduplicated set of occupation states with
//! constant-time lookup from state to index.

use std::hash::BuildHasherDefault;
use indexmap::IndexSet;
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use rustc_hash::FxHasher;
use tracing::debug;
use crate::{
    error::{ Error, Result },
    hilbert::SingleParticleSpace,
    matrix::{ Storage, outer_prod },
};
use super::{
    Occupation,
    OccupationPolicy,
    Statistics,
    enumerate::enumerate,
};

type StateSet = IndexSet<Occupation, BuildHasherDefault<FxHasher>>;

/// An ordered collection of unique [`Occupation`]s over a fixed number of
/// modes, sharing one exchange [`Statistics`].
///
/// The basis index of a state is its position in the enumeration. Lookups in
/// both directions are backed by a single [`IndexSet`].
#[derive(Clone, Debug)]
pub struct ManyBodyBasis {
    num_modes: usize,
    statistics: Statistics,
    policy: OccupationPolicy,
    storage: Storage,
    sectors: Vec<usize>,
    states: StateSet,
}

impl ManyBodyBasis {
    /// Enumerate a new basis over `space` according to `policy`.
    ///
    /// Operators lifted into the basis inherit the storage form of `space`.
    pub fn new(
        space: &SingleParticleSpace,
        statistics: Statistics,
        policy: OccupationPolicy,
    ) -> Result<Self>
    {
        let states = enumerate(space.dim(), statistics, &policy)?;
        let basis = Self::from_parts(space, statistics, policy, states);
        debug!(
            statistics = %basis.statistics,
            modes = basis.num_modes,
            dim = basis.dim(),
            policy = ?basis.policy,
            "enumerated many-body basis"
        );
        Ok(basis)
    }

    /// All states of `k` fermions.
    pub fn fermions(space: &SingleParticleSpace, k: usize) -> Result<Self> {
        Self::new(space, Statistics::Fermion, OccupationPolicy::FixedNumber(k))
    }

    /// All states of `k` bosons.
    pub fn bosons(space: &SingleParticleSpace, k: usize) -> Result<Self> {
        Self::new(space, Statistics::Boson, OccupationPolicy::FixedNumber(k))
    }

    /// All bosonic states with at most `max` particles in every mode.
    pub fn bosons_capped(space: &SingleParticleSpace, max: usize)
        -> Result<Self>
    {
        Self::new(
            space,
            Statistics::Boson,
            OccupationPolicy::uniform_cap(space.dim(), max),
        )
    }

    /// Build a basis from an explicit list of states, keeping the first
    /// occurrence of any repeated state.
    ///
    /// Fails if any state has the wrong number of modes or violates the
    /// exchange statistics, or if the list is empty.
    pub fn from_occupations<I, O>(
        space: &SingleParticleSpace,
        statistics: Statistics,
        occupations: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = O>,
        O: Into<Occupation>,
    {
        let states: Vec<Occupation>
            = occupations.into_iter()
            .map(|occ| {
                let occ: Occupation = occ.into();
                check_occupation(space.dim(), statistics, &occ)?;
                Ok(occ)
            })
            .collect::<Result<_>>()?;
        if states.is_empty() {
            return Err(Error::EmptyBasis("empty list of states".into()));
        }
        let basis = Self::from_parts(
            space, statistics, OccupationPolicy::Explicit, states);
        debug!(
            statistics = %basis.statistics,
            modes = basis.num_modes,
            dim = basis.dim(),
            "built many-body basis from explicit states"
        );
        Ok(basis)
    }

    fn from_parts(
        space: &SingleParticleSpace,
        statistics: Statistics,
        policy: OccupationPolicy,
        states: Vec<Occupation>,
    ) -> Self
    {
        let states: StateSet = states.into_iter().collect();
        let mut sectors: Vec<usize>
            = states.iter().map(|occ| occ.total()).collect();
        sectors.sort_unstable();
        sectors.dedup();
        Self {
            num_modes: space.dim(),
            statistics,
            policy,
            storage: space.storage(),
            sectors,
            states,
        }
    }

    /// Use a different storage form for operators lifted into this basis.
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    /// Number of basis states.
    pub fn dim(&self) -> usize { self.states.len() }

    /// Number of single-particle modes.
    pub fn num_modes(&self) -> usize { self.num_modes }

    pub fn statistics(&self) -> Statistics { self.statistics }

    pub fn policy(&self) -> &OccupationPolicy { &self.policy }

    pub fn storage(&self) -> Storage { self.storage }

    /// Distinct particle numbers present in the basis, in ascending order.
    pub fn sectors(&self) -> &[usize] { &self.sectors }

    /// Iterate over states in basis order.
    pub fn states(&self) -> impl Iterator<Item = &Occupation> + '_ {
        self.states.iter()
    }

    /// Get the state at a basis index.
    pub fn occupation(&self, index: usize) -> Option<&Occupation> {
        self.states.get_index(index)
    }

    /// Get the basis index of a state.
    pub fn index_of(&self, occupation: &Occupation) -> Option<usize> {
        self.states.get_index_of(occupation)
    }

    /// Return `true` if `occupation` is a state of the basis.
    pub fn contains(&self, occupation: &Occupation) -> bool {
        self.states.contains(occupation)
    }

    /// Return `true` if `occupation` belongs to the space this basis was
    /// declared to span, whether or not it was actually enumerated.
    ///
    /// For explicit bases, the declared space is every state with a particle
    /// number already present in the list.
    pub fn admits(&self, occupation: &Occupation) -> bool {
        occupation.num_modes() == self.num_modes
            && self.statistics.admits(occupation)
            && match &self.policy {
                OccupationPolicy::Explicit
                    => self.sectors.contains(&occupation.total()),
                policy => policy.admits(occupation),
            }
    }

    /// Check that `occupation` has the right number of modes and obeys the
    /// exchange statistics of the basis.
    pub fn validate(&self, occupation: &Occupation) -> Result<()> {
        check_occupation(self.num_modes, self.statistics, occupation)
    }

    /// Resolve the target of a ladder-operator action.
    ///
    /// Returns `Ok(None)` if the state lies outside the declared space (the
    /// matrix element is truncated), and fails if the state is declared but
    /// missing from the enumeration.
    pub(crate) fn locate(&self, occupation: &Occupation)
        -> Result<Option<usize>>
    {
        if !self.admits(occupation) { return Ok(None); }
        self.index_of(occupation)
            .map(Some)
            .ok_or_else(|| Error::StateNotInBasis(occupation.to_vec()))
    }

    /// Get the basis index of a state, failing with a descriptive error if it
    /// is malformed or absent.
    pub fn require(&self, occupation: &Occupation) -> Result<usize> {
        self.validate(occupation)?;
        self.index_of(occupation)
            .ok_or_else(|| Error::StateNotInBasis(occupation.to_vec()))
    }

    /// Get an array representation of a particular basis state.
    ///
    /// Fails if the state is malformed or not in the basis.
    pub fn basis_state_vector<O>(&self, occupation: O)
        -> Result<nd::Array1<C64>>
    where O: Into<Occupation>
    {
        let k = self.require(&occupation.into())?;
        Ok(
            (0..self.dim())
                .map(|j| if j == k { C64::one() } else { C64::zero() })
                .collect()
        )
    }

    /// Get an array representation of a linear combination of basis states,
    /// with weights determined by a weighting function.
    ///
    /// The weighting function will be passed a state and its index.
    pub fn vector_weighted<F>(&self, weights: F) -> nd::Array1<C64>
    where F: Fn(&Occupation, usize) -> C64
    {
        self.states.iter().enumerate()
            .map(|(index, occ)| weights(occ, index))
            .collect()
    }

    /// Get the projector `|u⟩⟨u|` onto a particular basis state.
    ///
    /// Fails if the state is malformed or not in the basis.
    pub fn basis_density<O>(&self, occupation: O) -> Result<nd::Array2<C64>>
    where O: Into<Occupation>
    {
        let psi = self.basis_state_vector(occupation)?;
        Ok(outer_prod(&psi, &psi))
    }

    /// Get the density matrix of a classical mixture of basis states, with
    /// weights determined by a weighting function and normalized to unit
    /// trace.
    ///
    /// Returns `None` if any weight is negative or all weights are zero.
    pub fn density_mixed<F>(&self, weights: F) -> Option<nd::Array2<C64>>
    where F: Fn(&Occupation, usize) -> f64
    {
        let p: nd::Array1<f64>
            = self.states.iter().enumerate()
            .map(|(index, occ)| weights(occ, index))
            .collect();
        let norm = p.sum();
        (p.iter().all(|pk| *pk >= 0.0) && norm > 0.0)
            .then(|| nd::Array2::from_diag(&p.mapv(|pk| C64::from(pk / norm))))
    }
}

fn check_occupation(
    num_modes: usize,
    statistics: Statistics,
    occupation: &Occupation,
) -> Result<()>
{
    if occupation.num_modes() != num_modes {
        return Err(
            Error::mismatch("occupation state", num_modes, occupation.num_modes()));
    }
    if !statistics.admits(occupation) {
        return Err(Error::invalid_occupation(
            occupation,
            format!("{statistics} modes hold at most {:?} particles",
                statistics.max_occupation()),
        ));
    }
    Ok(())
}
