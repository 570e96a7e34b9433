//! Many-body bases for indistinguishable particles and second-quantized
//! operators over them.
//!
//! A [`ManyBodyBasis`] is an ordered set of [`Occupation`]s enumerated from a
//! [`SingleParticleSpace`][crate::hilbert::SingleParticleSpace] under an
//! [`OccupationPolicy`] and an exchange [`Statistics`]. Single-particle
//! operators are lifted into [`ManyBodyOperator`]s by a [`Lifter`] through
//! ```text
//! Ã = Σ_{s,t} A[s, t] a†_s a_t
//! ```
//!
//! # Fermionic sign convention
//! Modes are ordered by ascending index (Jordan-Wigner ordering), so that
//! ```text
//! a_m  |n⟩ = (-1)^{Σ_{l<m} n_l} |n - e_m⟩
//! a†_m |n⟩ = (-1)^{Σ_{l<m} n_l} |n + e_m⟩
//! ```
//! Bosonic ladder operators carry the usual `√n` and `√(n + 1)` factors with
//! no sign.

use serde::{ Deserialize, Serialize };

pub mod occupation;
pub use occupation::Occupation;

pub mod enumerate;
pub use enumerate::{
    OccupationPolicy,
    binomial,
    boson_states,
    capped_states,
    fermion_states,
};

pub mod basis;
pub use basis::ManyBodyBasis;

pub mod operator;
pub use operator::ManyBodyOperator;

pub mod lift;
pub use lift::{ Ladder, Lifter };

/// Exchange symmetry of the particles in a many-body basis.
///
/// Stored alongside every [`ManyBodyBasis`] so that operator lifting always
/// uses the matching matrix elements and signs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistics {
    /// Any number of particles per mode; ladder elements `√n`, `√(n + 1)`.
    Boson,
    /// At most one particle per mode; ladder elements `±1`.
    Fermion,
}

impl Statistics {
    /// Largest occupation allowed in a single mode, if any.
    pub fn max_occupation(self) -> Option<usize> {
        match self {
            Self::Boson => None,
            Self::Fermion => Some(1),
        }
    }

    /// Return `true` if `occupation` satisfies the exchange-symmetry
    /// constraint (Pauli exclusion for fermions).
    pub fn admits(self, occupation: &Occupation) -> bool {
        match self.max_occupation() {
            None => true,
            Some(max) => occupation.iter().all(|n| *n <= max),
        }
    }
}

impl std::fmt::Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boson => write!(f, "boson"),
            Self::Fermion => write!(f, "fermion"),
        }
    }
}
