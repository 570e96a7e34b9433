//! Occupation-number states and the action of single ladder operators on them.

use std::{ fmt, ops::Deref };
use super::Statistics;

/// Numbers of particles in each single-particle mode.
///
/// Entry `i` is the occupation of mode `i`. The ordering derived here is the
/// plain lexicographic order on the tuple.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Occupation(Vec<usize>);

impl Occupation {
    /// Create a new occupation state.
    pub fn new(occupations: Vec<usize>) -> Self { Self(occupations) }

    /// The empty state over `num_modes` modes.
    pub fn vacuum(num_modes: usize) -> Self { Self(vec![0; num_modes]) }

    /// Number of modes.
    pub fn num_modes(&self) -> usize { self.0.len() }

    /// Total number of particles.
    pub fn total(&self) -> usize { self.0.iter().sum() }

    /// Return the occupations as a bare slice.
    pub fn as_slice(&self) -> &[usize] { &self.0 }

    /// Consume `self`, returning the bare occupations.
    pub fn into_inner(self) -> Vec<usize> { self.0 }

    // Jordan-Wigner string: sign from the particles in all lower modes
    fn parity_below(&self, mode: usize) -> f64 {
        let below: usize = self.0[..mode].iter().sum();
        if below % 2 == 0 { 1.0 } else { -1.0 }
    }

    /// Apply the annihilation operator `a_mode`, returning the new state and
    /// the matrix element, or `None` if the mode is empty.
    ///
    /// *Panics* if `mode` is out of range.
    pub fn annihilate(&self, mode: usize, statistics: Statistics)
        -> Option<(Self, f64)>
    {
        let n = self.0[mode];
        if n == 0 { return None; }
        let amp
            = match statistics {
                Statistics::Boson => (n as f64).sqrt(),
                Statistics::Fermion => self.parity_below(mode),
            };
        let mut new = self.clone();
        new.0[mode] -= 1;
        Some((new, amp))
    }

    /// Apply the creation operator `a†_mode`, returning the new state and the
    /// matrix element, or `None` if the mode is already full under Pauli
    /// exclusion.
    ///
    /// *Panics* if `mode` is out of range.
    pub fn create(&self, mode: usize, statistics: Statistics)
        -> Option<(Self, f64)>
    {
        let n = self.0[mode];
        let amp
            = match statistics {
                Statistics::Boson => ((n + 1) as f64).sqrt(),
                Statistics::Fermion if n >= 1 => { return None; },
                Statistics::Fermion => self.parity_below(mode),
            };
        let mut new = self.clone();
        new.0[mode] += 1;
        Some((new, amp))
    }
}

impl Deref for Occupation {
    type Target = [usize];

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl AsRef<[usize]> for Occupation {
    fn as_ref(&self) -> &[usize] { &self.0 }
}

impl From<Vec<usize>> for Occupation {
    fn from(occupations: Vec<usize>) -> Self { Self(occupations) }
}

impl<const N: usize> From<[usize; N]> for Occupation {
    fn from(occupations: [usize; N]) -> Self { Self(occupations.to_vec()) }
}

impl From<&[usize]> for Occupation {
    fn from(occupations: &[usize]) -> Self { Self(occupations.to_vec()) }
}

impl FromIterator<usize> for Occupation {
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = usize>
    {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Occupation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|")?;
        for n in self.0.iter() {
            write!(f, "{}", n)?;
        }
        write!(f, "⟩")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Statistics::*;

    #[test]
    fn boson_ladder_elements() {
        let occ = Occupation::from([3, 0, 1]);
        let (down, amp) = occ.annihilate(0, Boson).unwrap();
        assert_eq!(down, Occupation::from([2, 0, 1]));
        assert_eq!(amp, 3.0_f64.sqrt());

        let (up, amp) = occ.create(2, Boson).unwrap();
        assert_eq!(up, Occupation::from([3, 0, 2]));
        assert_eq!(amp, 2.0_f64.sqrt());

        assert!(occ.annihilate(1, Boson).is_none());
    }

    #[test]
    fn fermion_signs_follow_lower_modes() {
        let occ = Occupation::from([0, 1, 0, 1]);
        // one particle below mode 3
        assert_eq!(occ.annihilate(3, Fermion), Some((Occupation::from([0, 1, 0, 0]), -1.0)));
        // nothing below mode 0
        assert_eq!(occ.create(0, Fermion), Some((Occupation::from([1, 1, 0, 1]), 1.0)));
        assert_eq!(occ.create(2, Fermion), Some((Occupation::from([0, 1, 1, 1]), -1.0)));
        assert!(occ.create(1, Fermion).is_none());
        assert!(occ.annihilate(0, Fermion).is_none());
    }

    #[test]
    fn totals_and_display() {
        let occ: Occupation = [2_usize, 0, 1].into_iter().collect();
        assert_eq!(occ.total(), 3);
        assert_eq!(occ.num_modes(), 3);
        assert_eq!(occ.to_string(), "|201⟩");
        assert_eq!(Occupation::vacuum(2).as_slice(), &[0, 0]);
    }

    #[test]
    fn exclusion_check() {
        assert!(Fermion.admits(&Occupation::from([1, 0, 1])));
        assert!(!Fermion.admits(&Occupation::from([2, 0, 0])));
        assert!(Boson.admits(&Occupation::from([5, 0, 0])));
    }
}
