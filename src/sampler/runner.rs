//! Simulated annealing over DQM case domains.

use super::config::SamplerConfig;
use super::types::{DqmSampler, Sample, SampleSet};
use crate::dqm::DiscreteQuadraticModel;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Improvements smaller than this do not count during the descent polish.
const DESCENT_EPSILON: f64 = 1e-9;

/// In-process [`DqmSampler`] based on simulated annealing.
///
/// Each read starts from a uniformly random assignment and, at every
/// temperature level, sweeps all variables proposing a random different
/// case, accepted by the Metropolis criterion. A final greedy descent moves
/// each variable to its best case until no single change improves the
/// energy, so every returned sample is a single-variable local minimum.
///
/// # Examples
///
/// ```
/// use u_rotation::dqm::DiscreteQuadraticModel;
/// use u_rotation::sampler::{AnnealingSampler, DqmSampler, SamplerConfig};
///
/// let mut dqm = DiscreteQuadraticModel::new();
/// let a = dqm.add_variable(2);
/// let b = dqm.add_variable(2);
/// dqm.set_linear_case(a, 1, -1.0).unwrap();
/// dqm.set_linear_case(b, 1, -1.0).unwrap();
/// dqm.set_quadratic_case(a, 1, b, 1, 3.0).unwrap();
///
/// let sampler = AnnealingSampler::new(SamplerConfig::default().with_seed(1));
/// let set = sampler.sample(&dqm).unwrap();
/// assert_eq!(set.first().unwrap().energy, -1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnealingSampler {
    config: SamplerConfig,
}

impl AnnealingSampler {
    /// Creates a sampler with the given configuration.
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// The sampler configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }
}

impl DqmSampler for AnnealingSampler {
    fn sample(&self, dqm: &DiscreteQuadraticModel) -> Result<SampleSet> {
        self.config.validate().map_err(Error::InvalidConfig)?;

        let landscape = Landscape::from_model(dqm)?;
        let temperatures = self.config.temperatures();
        let base_seed = self.config.seed.unwrap_or_else(rand::random);

        let read = |r: usize| -> Result<Sample> {
            let seed = base_seed.wrapping_add(r as u64);
            let cases = anneal(&landscape, &temperatures, &self.config, seed);
            let energy = dqm.energy(&cases)?;
            tracing::debug!(read = r, seed, energy, "annealing read finished");
            Ok(Sample { cases, energy })
        };
        let samples = collect_reads(self.config.num_reads, self.config.parallel, read)?;

        let set = SampleSet::from_samples(samples);
        if let Some(best) = set.first() {
            tracing::info!(
                reads = set.len(),
                variables = dqm.num_variables(),
                best_energy = best.energy,
                "annealing finished"
            );
        }
        Ok(set)
    }
}

#[cfg(feature = "parallel")]
fn collect_reads<F>(num_reads: usize, parallel: bool, read: F) -> Result<Vec<Sample>>
where
    F: Fn(usize) -> Result<Sample> + Send + Sync,
{
    use rayon::prelude::*;

    if parallel {
        (0..num_reads).into_par_iter().map(read).collect()
    } else {
        (0..num_reads).map(read).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn collect_reads<F>(num_reads: usize, _parallel: bool, read: F) -> Result<Vec<Sample>>
where
    F: Fn(usize) -> Result<Sample>,
{
    (0..num_reads).map(read).collect()
}

/// Flattened view of a model for fast local energy evaluation.
struct Landscape {
    /// Flat index of the first case of each variable, plus an end marker.
    offsets: Vec<usize>,
    linear: Vec<f64>,
    adjacency: Vec<Vec<(usize, usize, f64)>>,
}

impl Landscape {
    fn from_model(dqm: &DiscreteQuadraticModel) -> Result<Self> {
        let n = dqm.num_variables();
        let mut offsets = Vec::with_capacity(n + 1);
        let mut linear = Vec::with_capacity(dqm.num_cases());
        offsets.push(0);
        for v in 0..n {
            let cases = dqm
                .num_cases_of(v)
                .ok_or_else(|| Error::UnknownVariable(v.to_string()))?;
            if cases == 0 {
                return Err(Error::EmptyDomain(v.to_string()));
            }
            for c in 0..cases {
                linear.push(dqm.linear_case(v, c)?);
            }
            offsets.push(linear.len());
        }
        Ok(Self {
            offsets,
            linear,
            adjacency: dqm.case_adjacency(),
        })
    }

    fn num_variables(&self) -> usize {
        self.offsets.len() - 1
    }

    fn num_cases(&self, v: usize) -> usize {
        self.offsets[v + 1] - self.offsets[v]
    }

    /// Energy contribution of `v` taking case `c`, all other variables
    /// fixed as in `state`.
    fn local(&self, state: &[usize], v: usize, c: usize) -> f64 {
        let k = self.offsets[v] + c;
        self.linear[k]
            + self.adjacency[k]
                .iter()
                .filter(|&&(u, u_case, _)| state[u] == u_case)
                .map(|&(_, _, bias)| bias)
                .sum::<f64>()
    }
}

/// One annealing read followed by greedy descent.
fn anneal(
    landscape: &Landscape,
    temperatures: &[f64],
    config: &SamplerConfig,
    seed: u64,
) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = landscape.num_variables();
    let mut state: Vec<usize> = (0..n)
        .map(|v| rng.random_range(0..landscape.num_cases(v)))
        .collect();

    for &temperature in temperatures {
        for _ in 0..config.sweeps_per_temperature {
            for v in 0..n {
                let size = landscape.num_cases(v);
                if size < 2 {
                    continue;
                }
                let current = state[v];
                let mut proposal = rng.random_range(0..size - 1);
                if proposal >= current {
                    proposal += 1;
                }

                let delta =
                    landscape.local(&state, v, proposal) - landscape.local(&state, v, current);
                let accept = delta <= 0.0 || rng.random_range(0.0..1.0) < (-delta / temperature).exp();
                if accept {
                    state[v] = proposal;
                }
            }
        }
    }

    descend(landscape, &mut state);
    state
}

/// Moves each variable to its best case until no move improves the energy.
fn descend(landscape: &Landscape, state: &mut [usize]) {
    loop {
        let mut improved = false;
        for v in 0..landscape.num_variables() {
            let current = landscape.local(state, v, state[v]);
            let mut best_case = state[v];
            let mut best = current;
            for c in 0..landscape.num_cases(v) {
                let e = landscape.local(state, v, c);
                if e < best {
                    best = e;
                    best_case = c;
                }
            }
            if best < current - DESCENT_EPSILON {
                state[v] = best_case;
                improved = true;
            }
        }
        if !improved {
            break;
        }
    }
}
