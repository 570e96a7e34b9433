#![allow(dead_code, non_snake_case, non_upper_case_globals)]

//! Many-body bases and second-quantized operators for indistinguishable
//! bosons and fermions, with the pieces needed to hand a Lindblad problem to
//! an external solver.

pub mod error;
pub mod matrix;
pub mod hilbert;
pub mod manybody;
pub mod dynamics;
pub mod config;

pub use error::{ Error, Result };
pub use matrix::{ Matrix, SparseMatrix, Storage };
pub use hilbert::{
    Mode,
    SingleParticleOperator,
    SingleParticleSpace,
    TwoParticleOperator,
};
pub use manybody::{
    Ladder,
    Lifter,
    ManyBodyBasis,
    ManyBodyOperator,
    Occupation,
    OccupationPolicy,
    Statistics,
};
pub use dynamics::{ JumpOperator, LindbladProblem };
pub use config::{ ModelConfig, TimeGrid };
