//! Integer-indexed discrete quadratic model.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A discrete quadratic model over integer-indexed variables and cases.
///
/// Variables are numbered `0..num_variables()` in insertion order. Variable
/// `v` has cases `0..num_cases_of(v)`, exactly one of which is selected in
/// any sample (one-hot). The energy of a sample is the sum of the linear
/// biases of the selected cases plus the pairwise biases between selected
/// cases of different variables. Lower energy is better.
///
/// Cases are stored in one flat array; each unordered pair of flat cases
/// carries at most one pairwise bias.
///
/// # Examples
///
/// ```
/// use u_rotation::dqm::DiscreteQuadraticModel;
///
/// let mut dqm = DiscreteQuadraticModel::new();
/// let a = dqm.add_variable(2);
/// let b = dqm.add_variable(3);
/// dqm.set_linear_case(a, 1, -1.0).unwrap();
/// dqm.set_quadratic_case(a, 1, b, 2, 4.0).unwrap();
///
/// assert_eq!(dqm.num_cases(), 5);
/// assert_eq!(dqm.energy(&[1, 0]).unwrap(), -1.0);
/// assert_eq!(dqm.energy(&[1, 2]).unwrap(), 3.0);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiscreteQuadraticModel {
    /// Flat index of the first case of each variable, plus a trailing end
    /// marker. Always non-empty.
    offsets: Vec<usize>,
    /// Linear bias per flat case.
    linear: Vec<f64>,
    /// Pairwise bias keyed by `(lower flat case, higher flat case)`.
    quadratic: BTreeMap<(usize, usize), f64>,
}

impl Default for DiscreteQuadraticModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscreteQuadraticModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            linear: Vec::new(),
            quadratic: BTreeMap::new(),
        }
    }

    /// Adds a variable with `num_cases` cases and returns its index.
    ///
    /// All linear biases of the new variable start at zero.
    pub fn add_variable(&mut self, num_cases: usize) -> usize {
        let index = self.num_variables();
        let end = self.num_cases() + num_cases;
        self.linear.resize(end, 0.0);
        self.offsets.push(end);
        index
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of cases across all variables.
    pub fn num_cases(&self) -> usize {
        self.linear.len()
    }

    /// Number of cases of variable `v`, or `None` if `v` does not exist.
    pub fn num_cases_of(&self, v: usize) -> Option<usize> {
        if v < self.num_variables() {
            Some(self.offsets[v + 1] - self.offsets[v])
        } else {
            None
        }
    }

    /// Number of case pairs with a pairwise bias.
    pub fn num_case_interactions(&self) -> usize {
        self.quadratic.len()
    }

    /// Number of variable pairs with at least one pairwise bias.
    pub fn num_variable_interactions(&self) -> usize {
        self.interactions()
            .map(|(u, _, v, _, _)| (u, v))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Sets the linear bias of case `case` of variable `v`.
    pub fn set_linear_case(&mut self, v: usize, case: usize, bias: f64) -> Result<()> {
        let k = self.flat(v, case)?;
        self.linear[k] = bias;
        Ok(())
    }

    /// Linear bias of case `case` of variable `v`.
    pub fn linear_case(&self, v: usize, case: usize) -> Result<f64> {
        Ok(self.linear[self.flat(v, case)?])
    }

    /// Sets the pairwise bias between case `u_case` of `u` and case
    /// `v_case` of `v`, replacing any previous value.
    ///
    /// The pair is undirected: `(u, u_case, v, v_case)` and
    /// `(v, v_case, u, u_case)` address the same entry.
    pub fn set_quadratic_case(
        &mut self,
        u: usize,
        u_case: usize,
        v: usize,
        v_case: usize,
        bias: f64,
    ) -> Result<()> {
        let k = self.flat(u, u_case)?;
        let m = self.flat(v, v_case)?;
        if u == v {
            return Err(Error::SelfInteraction(u.to_string()));
        }
        self.quadratic.insert((k.min(m), k.max(m)), bias);
        Ok(())
    }

    /// Pairwise bias between two cases; zero when no bias was set.
    pub fn quadratic_case(&self, u: usize, u_case: usize, v: usize, v_case: usize) -> Result<f64> {
        let k = self.flat(u, u_case)?;
        let m = self.flat(v, v_case)?;
        Ok(self
            .quadratic
            .get(&(k.min(m), k.max(m)))
            .copied()
            .unwrap_or(0.0))
    }

    /// Iterates over all pairwise biases as `(u, u_case, v, v_case, bias)`
    /// with `u < v`.
    pub fn interactions(&self) -> impl Iterator<Item = (usize, usize, usize, usize, f64)> + '_ {
        self.quadratic.iter().map(move |(&(k, m), &bias)| {
            let (u, u_case) = self.unflat(k);
            let (v, v_case) = self.unflat(m);
            (u, u_case, v, v_case, bias)
        })
    }

    /// Per flat case, the `(variable, case, bias)` triples it interacts with.
    ///
    /// Index the result with [`flat_index`](Self::flat_index).
    pub fn case_adjacency(&self) -> Vec<Vec<(usize, usize, f64)>> {
        let mut adj = vec![Vec::new(); self.num_cases()];
        for (&(k, m), &bias) in &self.quadratic {
            let (u, u_case) = self.unflat(k);
            let (v, v_case) = self.unflat(m);
            adj[k].push((v, v_case, bias));
            adj[m].push((u, u_case, bias));
        }
        adj
    }

    /// Position of case `case` of variable `v` in the flat case arrays.
    pub fn flat_index(&self, v: usize, case: usize) -> Result<usize> {
        self.flat(v, case)
    }

    /// Energy of a sample given as one selected case per variable.
    pub fn energy(&self, sample: &[usize]) -> Result<f64> {
        if sample.len() != self.num_variables() {
            return Err(Error::UnknownVariable(
                self.num_variables().min(sample.len()).to_string(),
            ));
        }
        let mut selected = Vec::with_capacity(sample.len());
        for (v, &case) in sample.iter().enumerate() {
            selected.push(self.flat(v, case)?);
        }

        let linear: f64 = selected.iter().map(|&k| self.linear[k]).sum();
        let quadratic: f64 = selected
            .iter()
            .enumerate()
            .flat_map(|(i, &k)| selected[i + 1..].iter().map(move |&m| (k.min(m), k.max(m))))
            .filter_map(|key| self.quadratic.get(&key))
            .sum();
        Ok(linear + quadratic)
    }

    fn flat(&self, v: usize, case: usize) -> Result<usize> {
        let n = self
            .num_cases_of(v)
            .ok_or_else(|| Error::UnknownVariable(v.to_string()))?;
        if case >= n {
            return Err(Error::UnknownCase {
                variable: v.to_string(),
                case: case.to_string(),
            });
        }
        Ok(self.offsets[v] + case)
    }

    fn unflat(&self, k: usize) -> (usize, usize) {
        let v = self.offsets.partition_point(|&o| o <= k) - 1;
        (v, k - self.offsets[v])
    }
}
