#![allow(dead_code, non_snake_case, non_upper_case_globals)]

//! Assemble the cascaded-decay master equation for a few particles in a
//! ladder of levels and report the initial populations and their rates of
//! change.
//!
//! Usage: `fermion_decay [config.toml]`

use std::path::PathBuf;
use anyhow::Context;
use tracing::info;
use tracing_subscriber::{ fmt, prelude::*, EnvFilter };
use manybody_sim::{
    config::ModelConfig,
    dynamics::{ JumpOperator, LindbladProblem, expectations },
    manybody::{ Lifter, ManyBodyOperator },
};

fn init_logging() {
    let filter
        = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config_path: Option<PathBuf> = std::env::args().nth(1).map(PathBuf::from);
    let config = ModelConfig::load(config_path.as_deref())
        .context("failed to load model configuration")?;

    let space = config.space()?;
    let basis = config.basis()?;
    info!(
        statistics = %basis.statistics(),
        levels = basis.num_modes(),
        dim = basis.dim(),
        "built basis"
    );
    for (k, occ) in basis.states().enumerate() {
        println!("{:3}  {}", k, occ);
    }

    let lifter = Lifter::new(&basis);
    let H = lifter.lift(&config.hamiltonian(&space)?)?;
    let jumps: Vec<JumpOperator>
        = config.channels().into_iter()
        .map(|(target, source, rate, label)| {
            JumpOperator::new(lifter.transition(target, source)?, rate, label)
        })
        .collect::<manybody_sim::Result<_>>()?;
    for jump in jumps.iter() {
        info!(label = jump.label(), rate = jump.rate(), nnz = jump.operator().nnz(), "jump operator");
    }

    let psi0 = basis.basis_state_vector(config.initial_occupation())?;
    let problem
        = LindbladProblem::new(H)?
        .with_jumps(jumps)?
        .with_initial_state(&psi0)?
        .with_times(config.time.points())?;

    let numbers: Vec<ManyBodyOperator>
        = space.modes()
        .map(|m| lifter.number(Some(m)))
        .collect::<manybody_sim::Result<_>>()?;
    let rho0 = problem.initial_density()
        .context("initial condition was not set")?;
    let drho0 = problem.rhs(rho0)?;
    let n = expectations(&numbers, rho0)?;
    let dn = expectations(&numbers, &drho0)?;

    println!("{:>6}  {:>10}  {:>10}", "level", "<n>", "d<n>/dt");
    for (k, (nk, dnk)) in n.iter().zip(dn.iter()).enumerate() {
        println!("{:>6}  {:>10.6}  {:>+10.6}", k, nk.re, dnk.re);
    }
    let trace = drho0.diag().sum();
    info!(
        trace_rate = trace.norm(),
        points = problem.times().len(),
        "problem ready for integration"
    );

    let rho1 = lifter.one_body_density(&psi0)?;
    println!("one-body density matrix:");
    for row in rho1.outer_iter() {
        let entries: Vec<String>
            = row.iter().map(|z| format!("{:+.3}", z.re)).collect();
        println!("  [{}]", entries.join(", "));
    }

    println!("done");
    Ok(())
}
