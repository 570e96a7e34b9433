//! TOML description of a cascaded-decay model.
//!
//! The model is an `N`-level single-particle ladder with level energies
//! `E_k`, nearest-neighbor hopping `J`, decay from every level `k` to `k - 1`
//! at rate `γ`, and an optional pump from the lowest level back to the top at
//! rate `Γ`:
//! ```text
//! H = Σ_k E_k n_k + J Σ_k (a†_k a_{k+1} + a†_{k+1} a_k)
//! L_k = a†_{k-1} a_k   (rate γ),    L_pump = a†_{N-1} a_0   (rate Γ)
//! ```
//! Every field has a default, so an empty file (or none at all) gives two
//! fermions in four levels starting with the top two levels filled.

use std::path::Path;
use serde::{ Deserialize, Serialize };
use tracing::debug;
use crate::{
    error::{ Error, Result },
    hilbert::{ Mode, SingleParticleOperator, SingleParticleSpace },
    manybody::{ ManyBodyBasis, Occupation, OccupationPolicy, Statistics },
    matrix::Storage,
};

/// Main model configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Number of single-particle levels.
    pub levels: usize,
    pub statistics: Statistics,
    /// Allowed total particle numbers. May be empty only if
    /// `max_occupation` is set.
    pub particles: Vec<usize>,
    /// Per-mode cap for bosonic bases.
    pub max_occupation: Option<usize>,
    pub storage: Storage,
    /// Level energies; defaults to `0, 1, ..., N - 1`.
    pub energies: Option<Vec<f64>>,
    pub hopping: f64,
    pub decay_rate: f64,
    pub pump_rate: f64,
    /// Initial occupation; defaults to the top levels filled.
    pub initial: Option<Vec<usize>>,
    pub time: TimeGrid,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            levels: 4,
            statistics: Statistics::Fermion,
            particles: vec![2],
            max_occupation: None,
            storage: Storage::Dense,
            energies: None,
            hopping: 0.0,
            decay_rate: 1.0,
            pump_rate: 0.0,
            initial: None,
            time: TimeGrid::default(),
        }
    }
}

/// Evenly spaced output times.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeGrid {
    pub start: f64,
    pub stop: f64,
    /// Number of points, including both endpoints.
    pub steps: usize,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self { start: 0.0, stop: 10.0, steps: 201 }
    }
}

impl TimeGrid {
    /// Get the time points.
    pub fn points(&self) -> Vec<f64> {
        if self.steps <= 1 { return vec![self.start]; }
        let dt = (self.stop - self.start) / (self.steps - 1) as f64;
        (0..self.steps).map(|k| self.start + dt * k as f64).collect()
    }
}

impl ModelConfig {
    /// Load a configuration from a TOML file, or the defaults if no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                debug!(path = %path.display(), "loading model configuration");
                let content = std::fs::read_to_string(path)?;
                Self::from_toml_str(&content)
            },
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            },
        }
    }

    /// Parse and validate a configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.levels == 0 {
            return Err(Error::Config("need at least one level".into()));
        }
        if self.particles.is_empty() && self.max_occupation.is_none() {
            return Err(Error::Config(
                "`particles` may only be empty if `max_occupation` is set".into()));
        }
        if let (Statistics::Fermion, Some(m)) = (self.statistics, self.max_occupation) {
            if m > 1 {
                return Err(Error::Config(
                    format!("fermionic max_occupation must be at most 1, got {m}")));
            }
        }
        if let Some(energies) = &self.energies {
            if energies.len() != self.levels {
                return Err(Error::Config(format!(
                    "expected {} level energies, got {}",
                    self.levels, energies.len(),
                )));
            }
            if energies.iter().any(|e| !e.is_finite()) {
                return Err(Error::Config("level energies must be finite".into()));
            }
        }
        if !self.hopping.is_finite() {
            return Err(Error::Config("hopping must be finite".into()));
        }
        for (name, rate) in [("decay_rate", self.decay_rate), ("pump_rate", self.pump_rate)] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(Error::Config(
                    format!("{name} must be finite and non-negative, got {rate}")));
            }
        }
        let TimeGrid { start, stop, steps } = self.time;
        if !start.is_finite() || !stop.is_finite() || stop < start || steps == 0 {
            return Err(Error::Config(format!(
                "bad time grid: start = {start}, stop = {stop}, steps = {steps}")));
        }
        let initial = self.initial_occupation();
        if initial.num_modes() != self.levels {
            return Err(Error::Config(format!(
                "initial occupation covers {} levels, expected {}",
                initial.num_modes(), self.levels,
            )));
        }
        if !self.policy().admits(&initial) || !self.statistics.admits(&initial) {
            return Err(Error::Config(format!(
                "initial occupation {initial} lies outside the configured basis")));
        }
        Ok(())
    }

    /// The single-particle space, with the configured storage.
    pub fn space(&self) -> Result<SingleParticleSpace> {
        Ok(SingleParticleSpace::new(self.levels)?.with_storage(self.storage))
    }

    /// The enumeration rule implied by `particles` and `max_occupation`.
    pub fn policy(&self) -> OccupationPolicy {
        match (self.max_occupation, self.particles.as_slice()) {
            (Some(m), []) => OccupationPolicy::uniform_cap(self.levels, m),
            (Some(m), ks) => OccupationPolicy::PerModeCap {
                max: vec![m; self.levels],
                totals: Some(ks.to_vec()),
            },
            (None, [k]) => OccupationPolicy::FixedNumber(*k),
            (None, ks) => OccupationPolicy::NumberRange(ks.to_vec()),
        }
    }

    /// Enumerate the many-body basis.
    pub fn basis(&self) -> Result<ManyBodyBasis> {
        ManyBodyBasis::new(&self.space()?, self.statistics, self.policy())
    }

    pub fn energies(&self) -> Vec<f64> {
        self.energies.clone()
            .unwrap_or_else(|| (0..self.levels).map(|k| k as f64).collect())
    }

    /// The initial occupation, defaulting to the smallest configured particle
    /// number packed into the highest levels, each filled up to the per-mode
    /// limit (one for fermions, `max_occupation` or unbounded for bosons).
    pub fn initial_occupation(&self) -> Occupation {
        if let Some(occ) = &self.initial { return Occupation::new(occ.clone()); }
        let mut remaining = self.particles.iter().copied().min().unwrap_or(0);
        let cap
            = [self.statistics.max_occupation(), self.max_occupation]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(remaining);
        let mut occ = vec![0; self.levels];
        for n in occ.iter_mut().rev() {
            *n = remaining.min(cap);
            remaining -= *n;
        }
        Occupation::new(occ)
    }

    /// Build the single-particle Hamiltonian.
    pub fn hamiltonian(&self, space: &SingleParticleSpace)
        -> Result<SingleParticleOperator>
    {
        let mut h = space.diagonal_operator(&self.energies())?;
        if self.hopping != 0.0 {
            for k in 1..self.levels {
                let hop = space.transition_operator(Mode(k - 1), Mode(k))?;
                let hop = hop.try_add(&hop.adjoint())?.scaled(self.hopping);
                h = h.try_add(&hop)?;
            }
        }
        Ok(h)
    }

    /// List the dissipation channels as `(target, source, rate, label)`,
    /// omitting those with zero rate.
    pub fn channels(&self) -> Vec<(Mode, Mode, f64, String)> {
        let decays
            = (1..self.levels)
            .map(|k| (Mode(k - 1), Mode(k), self.decay_rate, format!("decay {k} -> {}", k - 1)));
        let pump
            = (self.levels > 1)
            .then(|| {
                let top = self.levels - 1;
                (Mode(top), Mode(0), self.pump_rate, format!("pump 0 -> {top}"))
            });
        decays.chain(pump)
            .filter(|(_, _, rate, _)| *rate > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_two_fermions_in_four_levels() {
        let config = ModelConfig::load(None).unwrap();
        assert_eq!(config.policy(), OccupationPolicy::FixedNumber(2));
        assert_eq!(config.initial_occupation(), Occupation::from([0, 0, 1, 1]));
        assert_eq!(config.energies(), vec![0.0, 1.0, 2.0, 3.0]);
        let basis = config.basis().unwrap();
        assert_eq!(basis.dim(), 6);
        let channels = config.channels();
        assert_eq!(channels.len(), 3);
        assert_eq!(channels[0].0, Mode(0));
        assert_eq!(channels[0].1, Mode(1));
        assert_eq!(config.time.points().len(), 201);
    }

    #[test]
    fn parses_partial_files() {
        let config = ModelConfig::from_toml_str(r#"
            levels = 3
            statistics = "boson"
            particles = []
            max_occupation = 2
            storage = "sparse"
            pump_rate = 0.25
            initial = [2, 0, 1]

            [time]
            stop = 1.0
            steps = 5
        "#).unwrap();
        assert_eq!(config.statistics, Statistics::Boson);
        assert_eq!(config.storage, Storage::Sparse);
        assert_eq!(config.policy(), OccupationPolicy::uniform_cap(3, 2));
        assert_eq!(config.basis().unwrap().dim(), 27);
        assert_eq!(config.time.points(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let pump = config.channels().pop().unwrap();
        assert_eq!((pump.0, pump.1, pump.2), (Mode(2), Mode(0), 0.25));
        let round = ModelConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(round, config);
    }

    #[test]
    fn rejects_inconsistent_models() {
        let bad = [
            "levels = 0",
            "particles = []",
            "energies = [0.0, 1.0]",
            "decay_rate = -1.0",
            "max_occupation = 2",
            "initial = [1, 1, 1, 0]",
            "initial = [1, 1, 0]",
            "[time]\nstart = 2.0\nstop = 1.0",
        ];
        for content in bad {
            assert!(
                matches!(ModelConfig::from_toml_str(content), Err(Error::Config(_))),
                "{content}",
            );
        }
        assert!(matches!(
            ModelConfig::from_toml_str("levels = \"four\""),
            Err(Error::Toml(_)),
        ));
        assert!(matches!(
            ModelConfig::from_toml_str("colour = 1"),
            Err(Error::Toml(_)),
        ));
    }

    #[test]
    fn default_boson_initial_state_packs_the_top_level() {
        let config = ModelConfig::from_toml_str(
            "statistics = \"boson\"\nparticles = [5]").unwrap();
        assert_eq!(config.initial_occupation(), Occupation::from([0, 0, 0, 5]));
        assert_eq!(config.initial_occupation().total(), 5);

        let capped = ModelConfig::from_toml_str(
            "statistics = \"boson\"\nparticles = [5]\nmax_occupation = 2").unwrap();
        assert_eq!(capped.initial_occupation(), Occupation::from([0, 1, 2, 2]));
        assert!(capped.basis().unwrap().contains(&capped.initial_occupation()));

        // more particles than the caps can hold
        assert!(matches!(
            ModelConfig::from_toml_str(
                "statistics = \"boson\"\nparticles = [9]\nmax_occupation = 2"),
            Err(Error::Config(_)),
        ));
    }

    #[test]
    fn hamiltonian_with_hopping() {
        let config = ModelConfig { hopping: 0.5, ..ModelConfig::default() };
        let space = config.space().unwrap();
        let h = config.hamiltonian(&space).unwrap();
        assert!(h.is_hermitian(1e-15));
        assert_eq!(h.get(Mode(1), Mode(2)).re, 0.5);
        assert_eq!(h.get(Mode(3), Mode(3)).re, 3.0);
        assert_eq!(h.get(Mode(0), Mode(2)).re, 0.0);
    }
}
