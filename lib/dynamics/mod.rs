//! Handoff to an external master-equation solver.
//!
//! This module does no time integration. It validates and packages the
//! Hamiltonian, jump operators, initial condition, and time grid as a
//! [`LindbladProblem`], exposes the generator through
//! [`LindbladProblem::rhs`], and evaluates observables on whatever trajectory
//! the solver hands back.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::Result,
    manybody::ManyBodyOperator,
};

pub mod jump;
pub use jump::JumpOperator;

pub mod lindblad;
pub use lindblad::{ HERMITIAN_TOL, LindbladProblem };

/// Compute `Tr(ρ A)` for each observable `A`.
pub fn expectations<S>(
    observables: &[ManyBodyOperator],
    rho: &nd::ArrayBase<S, nd::Ix2>,
) -> Result<Vec<C64>>
where S: nd::Data<Elem = C64>
{
    observables.iter()
        .map(|a| a.expect_density(rho))
        .collect()
}

/// Compute `Tr(ρ(t) A)` for each observable `A` at each time `t` of a
/// trajectory.
///
/// The `(k, a)`-th entry of the result is observable `a` at time index `k`.
pub fn trajectory_expectations(
    observables: &[ManyBodyOperator],
    trajectory: &[nd::Array2<C64>],
) -> Result<nd::Array2<C64>>
{
    let mut values: nd::Array2<C64>
        = nd::Array2::zeros((trajectory.len(), observables.len()));
    for (mut row, rho) in values.outer_iter_mut().zip(trajectory) {
        for (v, a) in row.iter_mut().zip(observables) {
            *v = a.expect_density(rho)?;
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use crate::{
        error::Error,
        hilbert::SingleParticleSpace,
        manybody::{ Lifter, ManyBodyBasis },
    };
    use super::*;

    #[test]
    fn populations_along_a_trajectory() {
        let space = SingleParticleSpace::new(3).unwrap();
        let basis = ManyBodyBasis::fermions(&space, 1).unwrap();
        let lifter = Lifter::new(&basis);
        let numbers: Vec<ManyBodyOperator>
            = space.modes()
            .map(|m| lifter.number(Some(m)).unwrap())
            .collect();
        let trajectory: Vec<nd::Array2<C64>>
            = [[0, 0, 1], [0, 1, 0], [1, 0, 0]].into_iter()
            .map(|occ| basis.basis_density(occ).unwrap())
            .collect();
        let pops = trajectory_expectations(&numbers, &trajectory).unwrap();
        assert_eq!(pops.dim(), (3, 3));
        for k in 0..3 {
            for m in 0..3 {
                let expected = if m == 2 - k { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(pops[[k, m]].re, expected, epsilon = 1e-14);
            }
        }

        let total = lifter.number(None).unwrap();
        let ex = expectations(&[total, numbers[0].clone()], &trajectory[2]).unwrap();
        assert_abs_diff_eq!(ex[0].re, 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(ex[1].re, 1.0, epsilon = 1e-14);

        let wrong = vec![nd::Array2::<C64>::zeros((2, 2))];
        assert!(matches!(
            trajectory_expectations(&numbers, &wrong),
            Err(Error::DimensionMismatch { .. }),
        ));
    }
}
