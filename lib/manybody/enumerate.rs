//! Enumeration of occupation-number configurations.
//!
//! Fixed-number sectors are listed in descending lexicographic order of the
//! occupation tuple, so e.g. two fermions in four modes start at `|1100⟩` and
//! end at `|0011⟩`. Per-mode-capped bosonic bases follow the ascending
//! lexicographic Cartesian-product order, starting from the vacuum.

use itertools::Itertools;
use crate::error::{ Error, Result };
use super::{ Occupation, Statistics };

/// The rule used to select the occupation states of a many-body basis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OccupationPolicy {
    /// All states with exactly this many particles.
    FixedNumber(usize),
    /// The union of several fixed-number sectors, listed by ascending total.
    NumberRange(Vec<usize>),
    /// All states with at most `max[i]` particles in mode `i`, optionally
    /// restricted to the given totals.
    PerModeCap {
        max: Vec<usize>,
        totals: Option<Vec<usize>>,
    },
    /// A caller-supplied list of states.
    Explicit,
}

impl OccupationPolicy {
    /// Shorthand for [`Self::PerModeCap`] with the same cap on all modes and no
    /// constraint on the total.
    pub fn uniform_cap(num_modes: usize, max: usize) -> Self {
        Self::PerModeCap { max: vec![max; num_modes], totals: None }
    }

    /// Return `true` if `occupation` lies in the space described by the rule.
    ///
    /// Always `false` for [`Self::Explicit`], whose extent is only known to
    /// the basis holding the list.
    pub fn admits(&self, occupation: &Occupation) -> bool {
        match self {
            Self::FixedNumber(k) => occupation.total() == *k,
            Self::NumberRange(ks) => ks.contains(&occupation.total()),
            Self::PerModeCap { max, totals } => {
                max.len() == occupation.num_modes()
                    && occupation.iter().zip(max).all(|(n, m)| n <= m)
                    && totals.as_ref()
                        .map(|ks| ks.contains(&occupation.total()))
                        .unwrap_or(true)
            },
            Self::Explicit => false,
        }
    }
}

/// Binomial coefficient `C(n, k)`, or `None` if it does not fit in a
/// `usize`.
pub fn binomial(n: usize, k: usize) -> Option<usize> {
    if k > n { return Some(0); }
    let k = k.min(n - k);
    // acc * (n - j) is always divisible by j + 1
    (0..k)
        .try_fold(1_u128, |acc, j| {
            acc.checked_mul((n - j) as u128).map(|p| p / (j as u128 + 1))
        })
        .and_then(|c| usize::try_from(c).ok())
}

/// All states of `k` fermions in `num_modes` modes.
///
/// Returns an empty list if `k > num_modes`.
pub fn fermion_states(num_modes: usize, k: usize) -> Vec<Occupation> {
    if k == 0 { return vec![Occupation::vacuum(num_modes)]; }
    (0..num_modes).combinations(k)
        .map(|occupied| {
            let mut occ = vec![0; num_modes];
            occupied.into_iter().for_each(|m| { occ[m] = 1; });
            Occupation::new(occ)
        })
        .collect()
}

/// All states of `k` bosons in `num_modes` modes.
pub fn boson_states(num_modes: usize, k: usize) -> Vec<Occupation> {
    if k == 0 { return vec![Occupation::vacuum(num_modes)]; }
    if num_modes == 0 { return Vec::new(); }
    // sorted multisets of occupied modes ↔ descending occupation tuples
    (0..num_modes).combinations_with_replacement(k)
        .map(|occupied| {
            let mut occ = vec![0; num_modes];
            occupied.into_iter().for_each(|m| { occ[m] += 1; });
            Occupation::new(occ)
        })
        .collect()
}

/// All states with `0..=max[i]` particles in each mode `i`.
pub fn capped_states(max: &[usize]) -> Vec<Occupation> {
    if max.is_empty() { return vec![Occupation::vacuum(0)]; }
    max.iter()
        .map(|m| 0..=*m)
        .multi_cartesian_product()
        .map(Occupation::new)
        .collect()
}

fn sector(num_modes: usize, statistics: Statistics, k: usize)
    -> Result<Vec<Occupation>>
{
    match statistics {
        Statistics::Fermion if k > num_modes => {
            Err(Error::EmptyBasis(
                format!("cannot place {k} fermions in {num_modes} modes")))
        },
        Statistics::Fermion => Ok(fermion_states(num_modes, k)),
        Statistics::Boson => Ok(boson_states(num_modes, k)),
    }
}

/// Enumerate the states selected by `policy`.
///
/// [`OccupationPolicy::Explicit`] has no enumeration of its own and is
/// rejected here.
pub(crate) fn enumerate(
    num_modes: usize,
    statistics: Statistics,
    policy: &OccupationPolicy,
) -> Result<Vec<Occupation>>
{
    let states: Vec<Occupation>
        = match policy {
            OccupationPolicy::FixedNumber(k)
                => sector(num_modes, statistics, *k)?,
            OccupationPolicy::NumberRange(ks) => {
                let ks: Vec<usize> = ks.iter().copied().sorted().dedup().collect();
                if ks.is_empty() {
                    return Err(Error::EmptyBasis(
                        "empty particle-number range".into()));
                }
                // sectors that cannot be filled contribute nothing
                ks.into_iter()
                    .filter(|k| {
                        !matches!(statistics, Statistics::Fermion) || *k <= num_modes
                    })
                    .map(|k| sector(num_modes, statistics, k))
                    .flatten_ok()
                    .collect::<Result<_>>()?
            },
            OccupationPolicy::PerModeCap { max, totals } => {
                if max.len() != num_modes {
                    return Err(
                        Error::mismatch("per-mode caps", num_modes, max.len()));
                }
                if let Some(nmax) = statistics.max_occupation() {
                    if max.iter().any(|m| *m > nmax) {
                        return Err(Error::invalid_occupation(
                            max,
                            format!("{statistics} caps must not exceed {nmax}"),
                        ));
                    }
                }
                capped_states(max).into_iter()
                    .filter(|occ| policy.admits(occ))
                    .collect()
            },
            OccupationPolicy::Explicit => {
                return Err(Error::EmptyBasis(
                    "explicit bases must be built from a list of states".into()));
            },
        };
    if states.is_empty() {
        return Err(Error::EmptyBasis(format!("{policy:?}")));
    }
    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomials() {
        assert_eq!(binomial(4, 2), Some(6));
        assert_eq!(binomial(10, 0), Some(1));
        assert_eq!(binomial(10, 10), Some(1));
        assert_eq!(binomial(7, 3), Some(35));
        assert_eq!(binomial(3, 5), Some(0));
        assert_eq!(binomial(60, 30), Some(118_264_581_564_861_424));
        // larger than u64 but fits in u128
        assert_eq!(binomial(100, 50), None);
        // intermediate products overflow u128
        assert_eq!(binomial(200, 100), None);
    }

    #[test]
    fn fermion_counts_and_order() {
        for n in 1..=7 {
            for k in 0..=n {
                let states = fermion_states(n, k);
                assert_eq!(Some(states.len()), binomial(n, k), "n = {n}, k = {k}");
                assert!(states.iter().all(|s| s.total() == k));
                assert!(states.iter().all(|s| s.iter().all(|x| *x <= 1)));
                assert!(states.windows(2).all(|w| w[0] > w[1]));
            }
        }
        let states = fermion_states(4, 2);
        assert_eq!(states.first(), Some(&Occupation::from([1, 1, 0, 0])));
        assert_eq!(states.last(), Some(&Occupation::from([0, 0, 1, 1])));
    }

    #[test]
    fn boson_counts_and_order() {
        for n in 1..=5 {
            for k in 0..=5 {
                let states = boson_states(n, k);
                assert_eq!(Some(states.len()), binomial(n + k - 1, k), "n = {n}, k = {k}");
                assert!(states.iter().all(|s| s.total() == k));
                assert!(states.windows(2).all(|w| w[0] > w[1]));
            }
        }
        assert_eq!(
            boson_states(2, 2),
            vec![
                Occupation::from([2, 0]),
                Occupation::from([1, 1]),
                Occupation::from([0, 2]),
            ],
        );
    }

    #[test]
    fn capped_product() {
        let states = capped_states(&[1, 2]);
        assert_eq!(states.len(), 6);
        assert_eq!(states[0], Occupation::vacuum(2));
        assert_eq!(states[5], Occupation::from([1, 2]));
        assert!(states.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn policy_enumeration() {
        let range = enumerate(
            3, Statistics::Fermion, &OccupationPolicy::NumberRange(vec![2, 0, 2]));
        let range = range.unwrap();
        assert_eq!(range.len(), 1 + 3);
        assert_eq!(range[0], Occupation::vacuum(3));

        let capped = enumerate(
            3,
            Statistics::Boson,
            &OccupationPolicy::PerModeCap { max: vec![2, 2, 2], totals: Some(vec![2]) },
        )
        .unwrap();
        assert_eq!(capped.len(), 6);
        assert!(capped.iter().all(|s| s.total() == 2));

        assert!(matches!(
            enumerate(2, Statistics::Fermion, &OccupationPolicy::FixedNumber(3)),
            Err(Error::EmptyBasis(_)),
        ));

        // a range may reach past the number of fermionic modes
        let range = enumerate(
            2, Statistics::Fermion, &OccupationPolicy::NumberRange(vec![0, 1, 2, 3]))
            .unwrap();
        assert_eq!(range.len(), 1 + 2 + 1);
        assert_eq!(range.last(), Some(&Occupation::from([1, 1])));
        assert!(matches!(
            enumerate(2, Statistics::Fermion, &OccupationPolicy::NumberRange(vec![3, 4])),
            Err(Error::EmptyBasis(_)),
        ));
        assert!(matches!(
            enumerate(2, Statistics::Fermion, &OccupationPolicy::uniform_cap(2, 2)),
            Err(Error::InvalidOccupation { .. }),
        ));
        assert!(matches!(
            enumerate(3, Statistics::Boson, &OccupationPolicy::uniform_cap(2, 2)),
            Err(Error::DimensionMismatch { .. }),
        ));
    }

    #[test]
    fn policy_membership() {
        let policy = OccupationPolicy::PerModeCap { max: vec![3, 1], totals: None };
        assert!(policy.admits(&Occupation::from([3, 1])));
        assert!(!policy.admits(&Occupation::from([4, 0])));
        assert!(!policy.admits(&Occupation::from([0, 0, 0])));
        assert!(OccupationPolicy::FixedNumber(2).admits(&Occupation::from([1, 0, 1])));
        assert!(!OccupationPolicy::Explicit.admits(&Occupation::from([1])));
    }
}
