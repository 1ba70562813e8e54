//! Label-addressed wrapper around [`DiscreteQuadraticModel`].

use super::model::DiscreteQuadraticModel;
use crate::error::{label, Error, Result};
use crate::sampler::Sample;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Requirements for variable and case labels.
pub trait Label: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Label for T {}

/// A discrete quadratic model whose variables and cases are identified by
/// arbitrary labels instead of integers.
///
/// Owns an integer-indexed [`DiscreteQuadraticModel`] plus, per variable,
/// a forward map (`case label → index`) and a backward table
/// (`index → case label`). Case indices follow the order in which the cases
/// were supplied to [`add_variable`](Self::add_variable).
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use u_rotation::dqm::CaseLabelDqm;
///
/// let mut dqm = CaseLabelDqm::new();
/// dqm.add_variable(vec!["off", "low", "high"], "heater").unwrap();
/// dqm.add_variable(vec!["closed", "open"], "window").unwrap();
/// dqm.set_linear("heater", &"high", -2.0).unwrap();
/// dqm.set_quadratic("heater", &"high", "window", &"open", 5.0).unwrap();
///
/// let raw = HashMap::from([("heater", 2), ("window", 0)]);
/// let sample = dqm.map_sample(&raw).unwrap();
/// assert_eq!(sample["heater"], "high");
/// assert_eq!(sample["window"], "closed");
/// ```
#[derive(Debug, Clone)]
pub struct CaseLabelDqm<V, C> {
    dqm: DiscreteQuadraticModel,
    variables: Vec<V>,
    variable_index: HashMap<V, usize>,
    case_labels: Vec<Vec<C>>,
    case_index: Vec<HashMap<C, usize>>,
}

impl<V: Label, C: Label> Default for CaseLabelDqm<V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Label, C: Label> CaseLabelDqm<V, C> {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            dqm: DiscreteQuadraticModel::new(),
            variables: Vec::new(),
            variable_index: HashMap::new(),
            case_labels: Vec::new(),
            case_index: Vec::new(),
        }
    }

    /// Adds a variable whose cases are identified by `cases`.
    ///
    /// Returns the variable's index in the underlying model. On error the
    /// model is left unchanged.
    ///
    /// # Errors
    /// - [`Error::DuplicateVariable`] if `var` is already registered.
    /// - [`Error::DuplicateCase`] if two case labels are equal.
    /// - [`Error::EmptyDomain`] if `cases` is empty.
    pub fn add_variable<I>(&mut self, cases: I, var: V) -> Result<usize>
    where
        I: IntoIterator<Item = C>,
    {
        if self.variable_index.contains_key(&var) {
            return Err(Error::DuplicateVariable(label(&var)));
        }

        let cases: Vec<C> = cases.into_iter().collect();
        let forward: HashMap<C, usize> = cases
            .iter()
            .enumerate()
            .map(|(k, case)| (case.clone(), k))
            .collect();
        if forward.len() != cases.len() {
            return Err(Error::DuplicateCase(label(&var)));
        }
        if cases.is_empty() {
            return Err(Error::EmptyDomain(label(&var)));
        }

        let index = self.dqm.add_variable(cases.len());
        self.variable_index.insert(var.clone(), index);
        self.variables.push(var);
        self.case_labels.push(cases);
        self.case_index.push(forward);
        Ok(index)
    }

    /// Sets the linear bias of case `case` of `var`.
    pub fn set_linear(&mut self, var: V, case: &C, bias: f64) -> Result<()> {
        let (v, k) = self.resolve(&var, case)?;
        self.dqm.set_linear_case(v, k, bias)
    }

    /// Linear bias of case `case` of `var`.
    pub fn linear(&self, var: &V, case: &C) -> Result<f64> {
        let (v, k) = self.resolve(var, case)?;
        self.dqm.linear_case(v, k)
    }

    /// Sets the pairwise bias between case `u_case` of `u` and case `v_case`
    /// of `v`.
    ///
    /// # Errors
    /// [`Error::SelfInteraction`] if `u == v`; cases of one variable are
    /// already mutually exclusive.
    pub fn set_quadratic(&mut self, u: V, u_case: &C, v: V, v_case: &C, bias: f64) -> Result<()> {
        let (ui, uk) = self.resolve(&u, u_case)?;
        let (vi, vk) = self.resolve(&v, v_case)?;
        if ui == vi {
            return Err(Error::SelfInteraction(label(&u)));
        }
        self.dqm.set_quadratic_case(ui, uk, vi, vk, bias)
    }

    /// Pairwise bias between two cases; zero when unset.
    pub fn quadratic(&self, u: &V, u_case: &C, v: &V, v_case: &C) -> Result<f64> {
        let (ui, uk) = self.resolve(u, u_case)?;
        let (vi, vk) = self.resolve(v, v_case)?;
        self.dqm.quadratic_case(ui, uk, vi, vk)
    }

    /// Translates `variable → case index` into `variable → case label`.
    ///
    /// # Errors
    /// [`Error::UnknownVariable`] or [`Error::UnknownCase`] for entries that
    /// do not exist in the model.
    pub fn map_sample(&self, sample: &HashMap<V, usize>) -> Result<HashMap<V, C>> {
        sample
            .iter()
            .map(|(var, &k)| {
                let v = self.variable(var)?;
                let case = self.case_labels[v].get(k).ok_or_else(|| Error::UnknownCase {
                    variable: label(var),
                    case: k.to_string(),
                })?;
                Ok((var.clone(), case.clone()))
            })
            .collect()
    }

    /// Translates an index-space [`Sample`] into `variable → case index`.
    pub fn raw_sample(&self, sample: &Sample) -> Result<HashMap<V, usize>> {
        if sample.cases.len() != self.variables.len() {
            return Err(Error::UnknownVariable(
                self.variables.len().min(sample.cases.len()).to_string(),
            ));
        }
        Ok(self
            .variables
            .iter()
            .cloned()
            .zip(sample.cases.iter().copied())
            .collect())
    }

    /// Energy of a full label-space assignment.
    ///
    /// Every registered variable must be assigned.
    pub fn energy(&self, sample: &HashMap<V, C>) -> Result<f64> {
        let mut raw = Vec::with_capacity(self.variables.len());
        for (v, var) in self.variables.iter().enumerate() {
            let case = sample.get(var).ok_or_else(|| Error::UnknownCase {
                variable: label(var),
                case: "unassigned".into(),
            })?;
            let k = self.case_index[v].get(case).ok_or_else(|| Error::UnknownCase {
                variable: label(var),
                case: label(case),
            })?;
            raw.push(*k);
        }
        self.dqm.energy(&raw)
    }

    /// Index of `case` within variable `var`.
    pub fn case_index(&self, var: &V, case: &C) -> Result<usize> {
        self.resolve(var, case).map(|(_, k)| k)
    }

    /// Case labels of `var` in index order.
    pub fn cases(&self, var: &V) -> Option<&[C]> {
        self.variable_index
            .get(var)
            .map(|&v| self.case_labels[v].as_slice())
    }

    /// Variable labels in index order.
    pub fn variables(&self) -> &[V] {
        &self.variables
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.dqm.num_variables()
    }

    /// Total number of cases.
    pub fn num_cases(&self) -> usize {
        self.dqm.num_cases()
    }

    /// The integer-indexed model handed to samplers.
    pub fn dqm(&self) -> &DiscreteQuadraticModel {
        &self.dqm
    }

    fn variable(&self, var: &V) -> Result<usize> {
        self.variable_index
            .get(var)
            .copied()
            .ok_or_else(|| Error::UnknownVariable(label(var)))
    }

    fn resolve(&self, var: &V, case: &C) -> Result<(usize, usize)> {
        let v = self.variable(var)?;
        let k = self.case_index[v]
            .get(case)
            .copied()
            .ok_or_else(|| Error::UnknownCase {
                variable: label(var),
                case: label(case),
            })?;
        Ok((v, k))
    }
}

impl<V: Label> CaseLabelDqm<V, usize> {
    /// Adds a variable with `count` cases labelled `0..count`.
    pub fn add_variable_with_count(&mut self, count: usize, var: V) -> Result<usize> {
        self.add_variable(0..count, var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn weather() -> CaseLabelDqm<&'static str, Option<&'static str>> {
        let mut dqm = CaseLabelDqm::new();
        dqm.add_variable(vec![None, Some("rain"), Some("sun")], "mon")
            .unwrap();
        dqm.add_variable(vec![None, Some("sun")], "tue").unwrap();
        dqm
    }

    #[test]
    fn test_case_indices_follow_input_order() {
        let dqm = weather();
        assert_eq!(dqm.case_index(&"mon", &None).unwrap(), 0);
        assert_eq!(dqm.case_index(&"mon", &Some("rain")).unwrap(), 1);
        assert_eq!(dqm.case_index(&"mon", &Some("sun")).unwrap(), 2);
        assert_eq!(dqm.case_index(&"tue", &Some("sun")).unwrap(), 1);
        assert_eq!(dqm.num_variables(), 2);
        assert_eq!(dqm.num_cases(), 5);
    }

    #[test]
    fn test_duplicate_variable_leaves_model_unchanged() {
        let mut dqm = weather();
        let err = dqm.add_variable(vec![None], "mon").unwrap_err();
        assert_eq!(err, Error::DuplicateVariable("\"mon\"".into()));
        assert_eq!(dqm.num_variables(), 2);
        assert_eq!(dqm.num_cases(), 5);
        assert_eq!(dqm.cases(&"mon").unwrap().len(), 3);
    }

    #[test]
    fn test_duplicate_case() {
        let mut dqm = weather();
        let err = dqm
            .add_variable(vec![None, Some("sun"), Some("sun")], "wed")
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateCase(_)));
        assert_eq!(dqm.num_variables(), 2);
        assert!(dqm.cases(&"wed").is_none());
    }

    #[test]
    fn test_empty_domain() {
        let mut dqm = weather();
        assert!(matches!(
            dqm.add_variable(Vec::new(), "wed"),
            Err(Error::EmptyDomain(_))
        ));
    }

    #[test]
    fn test_count_labelled_cases() {
        let mut dqm: CaseLabelDqm<String, usize> = CaseLabelDqm::new();
        dqm.add_variable_with_count(3, "x".into()).unwrap();
        assert_eq!(dqm.cases(&"x".to_string()).unwrap(), &[0, 1, 2]);
        dqm.set_linear("x".into(), &2, 1.5).unwrap();
        assert_eq!(dqm.linear(&"x".to_string(), &2).unwrap(), 1.5);
    }

    #[test]
    fn test_unknown_labels() {
        let mut dqm = weather();
        assert!(matches!(
            dqm.set_linear("fri", &None, 1.0),
            Err(Error::UnknownVariable(_))
        ));
        assert!(matches!(
            dqm.set_linear("tue", &Some("rain"), 1.0),
            Err(Error::UnknownCase { .. })
        ));
        assert!(matches!(
            dqm.set_quadratic("mon", &Some("rain"), "tue", &Some("rain"), 1.0),
            Err(Error::UnknownCase { .. })
        ));
    }

    #[test]
    fn test_same_variable_quadratic_rejected() {
        let mut dqm = weather();
        assert!(matches!(
            dqm.set_quadratic("mon", &Some("rain"), "mon", &Some("sun"), 1.0),
            Err(Error::SelfInteraction(_))
        ));
    }

    #[test]
    fn test_biases_and_energy() {
        let mut dqm = weather();
        dqm.set_linear("mon", &Some("sun"), -2.0).unwrap();
        dqm.set_linear("tue", &Some("sun"), -1.0).unwrap();
        dqm.set_quadratic("mon", &Some("sun"), "tue", &Some("sun"), 4.0)
            .unwrap();

        assert_eq!(
            dqm.quadratic(&"tue", &Some("sun"), &"mon", &Some("sun"))
                .unwrap(),
            4.0
        );

        let both = HashMap::from([("mon", Some("sun")), ("tue", Some("sun"))]);
        assert_eq!(dqm.energy(&both).unwrap(), 1.0);

        let one = HashMap::from([("mon", Some("sun")), ("tue", None)]);
        assert_eq!(dqm.energy(&one).unwrap(), -2.0);

        let partial = HashMap::from([("mon", Some("sun"))]);
        assert!(dqm.energy(&partial).is_err());
    }

    #[test]
    fn test_map_sample_faults() {
        let dqm = weather();
        assert!(matches!(
            dqm.map_sample(&HashMap::from([("fri", 0)])),
            Err(Error::UnknownVariable(_))
        ));
        assert!(matches!(
            dqm.map_sample(&HashMap::from([("tue", 2)])),
            Err(Error::UnknownCase { .. })
        ));
    }

    #[test]
    fn test_raw_sample() {
        let dqm = weather();
        let sample = Sample {
            cases: vec![2, 1],
            energy: 0.0,
        };
        let raw = dqm.raw_sample(&sample).unwrap();
        let labels = dqm.map_sample(&raw).unwrap();
        assert_eq!(labels["mon"], Some("sun"));
        assert_eq!(labels["tue"], Some("sun"));

        let short = Sample {
            cases: vec![0],
            energy: 0.0,
        };
        assert!(dqm.raw_sample(&short).is_err());
    }

    proptest! {
        #[test]
        fn prop_map_sample_round_trip(sizes in proptest::collection::vec(1usize..6, 1..8)) {
            let mut dqm: CaseLabelDqm<usize, String> = CaseLabelDqm::new();
            for (v, &n) in sizes.iter().enumerate() {
                dqm.add_variable((0..n).map(|k| format!("c{v}_{k}")), v).unwrap();
            }
            for (v, &n) in sizes.iter().enumerate() {
                for k in 0..n {
                    let case = format!("c{v}_{k}");
                    let index = dqm.case_index(&v, &case).unwrap();
                    prop_assert_eq!(index, k);
                    let mapped = dqm.map_sample(&HashMap::from([(v, index)])).unwrap();
                    prop_assert_eq!(&mapped[&v], &case);
                }
            }
        }
    }
}
