//! Periodic constraint encoding of a crop rotation problem as a DQM.

use super::problem::{CropCase, CropId, Period, PlotId, RotationProblem, VarLabel};
use crate::dqm::CaseLabelDqm;
use crate::error::Result;
use std::collections::{BTreeMap, HashMap};

/// The label-addressed model produced by [`CropRotation::build`].
pub type RotationDqm = CaseLabelDqm<VarLabel, CropCase>;

/// A pairwise penalty between two planted cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseInteraction {
    pub u: VarLabel,
    pub u_crop: CropId,
    pub v: VarLabel,
    pub v_crop: CropId,
}

/// Size statistics of a built model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStats {
    pub variables: usize,
    pub variable_interactions: usize,
    /// Number of distinct variable pairs.
    pub max_variable_interactions: usize,
    pub cases: usize,
    pub case_interactions: usize,
    /// Number of case pairs that belong to different variables.
    pub max_case_interactions: usize,
}

/// One side of a candidate interaction: `crop` occupying `plot` at the
/// current period, `offset` periods after it was planted.
#[derive(Debug, Clone, Copy)]
struct Occupancy<'a> {
    plot: &'a str,
    crop: &'a str,
    offset: u32,
}

/// Crop rotation encoder.
///
/// Derives, once, the lookup tables the encoding needs and turns the
/// problem into a discrete quadratic model with one variable per
/// `(plot, period)`. Each variable selects either no crop or a crop planted
/// in that period.
///
/// The objective rewards occupancy: planting a crop has linear bias
/// `-grow_time`. Three constraint sets add the pairwise penalty `gamma`:
///
/// 1. a plot grows at most one crop at a time;
/// 2. a crop may not be followed on its plot, in the period right after it
///    finishes, by another member of its family;
/// 3. adjacent plots may not grow members of the same family at the same
///    time.
///
/// `gamma = 1 + max(grow_time)` exceeds the reward of any single planting,
/// so dropping a planting that violates a constraint always lowers the
/// energy.
///
/// # Examples
///
/// ```
/// use u_rotation::rotation::{Crop, CropRotation, RotationProblem};
///
/// let problem = RotationProblem::new(2)
///     .with_plot("1", Vec::<&str>::new())
///     .with_crop("x", Crop::new("y", 1, 2, 1));
/// let rotation = CropRotation::new(problem);
/// let dqm = rotation.build().unwrap();
/// assert_eq!(dqm.num_variables(), 2);
/// assert_eq!(dqm.num_cases(), 4);
/// assert_eq!(dqm.dqm().num_case_interactions(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct CropRotation {
    problem: RotationProblem,
    grow_time: HashMap<CropId, u32>,
    gamma: f64,
    /// Crops plantable in each period; index `period - 1`.
    period_crops: Vec<Vec<CropId>>,
    crop_families: BTreeMap<String, Vec<CropId>>,
    crop_offsets: Vec<(CropId, u32)>,
    neighbor_pairs: Vec<(PlotId, PlotId)>,
}

impl CropRotation {
    /// Derives the encoder tables from a validated problem.
    pub fn new(problem: RotationProblem) -> Self {
        let grow_time: HashMap<CropId, u32> = problem
            .crops
            .iter()
            .map(|(name, crop)| (name.clone(), crop.grow_time))
            .collect();
        let gamma = 1.0 + f64::from(grow_time.values().copied().max().unwrap_or(0));

        let mut period_crops = vec![Vec::new(); problem.time_units as usize];
        let mut crop_families: BTreeMap<String, Vec<CropId>> = BTreeMap::new();
        for (name, crop) in &problem.crops {
            for period in crop.planting[0]..=crop.planting[1] {
                if let Some(crops) = period
                    .checked_sub(1)
                    .and_then(|i| period_crops.get_mut(i as usize))
                {
                    crops.push(name.clone());
                }
            }
            crop_families
                .entry(crop.family.clone())
                .or_default()
                .push(name.clone());
        }

        let crop_offsets = problem
            .crops
            .iter()
            .flat_map(|(name, crop)| (0..crop.grow_time).map(move |r| (name.clone(), r)))
            .collect();

        let neighbor_pairs = problem
            .plot_adjacency
            .iter()
            .flat_map(|(plot, neighbors)| neighbors.iter().map(move |v| (plot.clone(), v.clone())))
            .collect();

        Self {
            problem,
            grow_time,
            gamma,
            period_crops,
            crop_families,
            crop_offsets,
            neighbor_pairs,
        }
    }

    /// The problem being encoded.
    pub fn problem(&self) -> &RotationProblem {
        &self.problem
    }

    /// Penalty weight of every constraint term.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Grow time of `crop`, zero for unknown crops.
    pub fn grow_time(&self, crop: &str) -> u32 {
        self.grow_time.get(crop).copied().unwrap_or(0)
    }

    /// Crops that may be planted in `period`.
    pub fn period_crops(&self, period: Period) -> &[CropId] {
        period
            .checked_sub(1)
            .and_then(|i| self.period_crops.get(i as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Crops of each family.
    pub fn crop_families(&self) -> &BTreeMap<String, Vec<CropId>> {
        &self.crop_families
    }

    /// Directed plot adjacency edges.
    pub fn neighbor_pairs(&self) -> &[(PlotId, PlotId)] {
        &self.neighbor_pairs
    }

    /// Maps any integer onto `1..=time_units`, congruent modulo
    /// `time_units`.
    ///
    /// # Panics
    /// If `time_units` is zero.
    #[inline]
    pub fn rollover(&self, period: i64) -> Period {
        let t = i64::from(self.problem.time_units);
        (1 + (period - 1).rem_euclid(t)) as Period
    }

    /// All periods of one cycle.
    pub fn periods(&self) -> impl Iterator<Item = Period> {
        1..=self.problem.time_units
    }

    /// Penalty terms between `(crop, offset)` pairs on a single plot.
    ///
    /// `crop_offsets` lists crops paired with how many periods before
    /// `period` they were planted. Pairs with equal offsets are skipped, as
    /// are pairs where either crop could not have been planted at the period
    /// its offset resolves to.
    pub fn crop_offset_pairs<'a>(
        &'a self,
        plot: &'a str,
        period: Period,
        crop_offsets: &'a [(CropId, u32)],
    ) -> impl Iterator<Item = CaseInteraction> + 'a {
        pairs(crop_offsets).filter_map(move |((c1, r1), (c2, r2))| {
            if r1 == r2 {
                return None;
            }
            self.interaction(
                period,
                Occupancy { plot, crop: c1, offset: *r1 },
                Occupancy { plot, crop: c2, offset: *r2 },
            )
        })
    }

    /// Penalty terms between `(plot, crop, offset)` triples.
    ///
    /// Same as [`crop_offset_pairs`](Self::crop_offset_pairs) across plots;
    /// pairs sharing both plot and offset are skipped.
    pub fn plot_crop_offset_pairs<'a>(
        &'a self,
        period: Period,
        plot_crop_offsets: &'a [(PlotId, CropId, u32)],
    ) -> impl Iterator<Item = CaseInteraction> + 'a {
        pairs(plot_crop_offsets).filter_map(move |((u, c1, r1), (v, c2, r2))| {
            if u == v && r1 == r2 {
                return None;
            }
            self.interaction(
                period,
                Occupancy { plot: u, crop: c1, offset: *r1 },
                Occupancy { plot: v, crop: c2, offset: *r2 },
            )
        })
    }

    /// Builds the discrete quadratic model.
    #[tracing::instrument(level = "debug", skip(self), fields(time_units = self.problem.time_units))]
    pub fn build(&self) -> Result<RotationDqm> {
        let mut dqm = RotationDqm::new();

        for period in self.periods() {
            for plot in self.problem.plot_adjacency.keys() {
                let var = VarLabel::new(plot.as_str(), period);
                let crops = self.period_crops(period);
                let cases = std::iter::once(None).chain(crops.iter().cloned().map(Some));
                dqm.add_variable(cases, var.clone())?;

                for crop in crops {
                    let reward = -f64::from(self.grow_time(crop));
                    dqm.set_linear(var.clone(), &Some(crop.clone()), reward)?;
                }
            }
        }

        // Constraint 1: one crop per plot at a time.
        for period in self.periods() {
            for plot in self.problem.plot_adjacency.keys() {
                for term in self.crop_offset_pairs(plot, period, &self.crop_offsets) {
                    self.penalize(&mut dqm, term)?;
                }
            }
        }

        // Constraint 2: no family member right after another on the same
        // plot. Offsets reach one period past the grow time. A crop may
        // follow itself.
        for period in self.periods() {
            for plot in self.problem.plot_adjacency.keys() {
                for members in self.crop_families.values() {
                    let crop_offsets: Vec<(CropId, u32)> = members
                        .iter()
                        .flat_map(|c| (0..=self.grow_time(c)).map(move |r| (c.clone(), r)))
                        .collect();
                    for term in self
                        .crop_offset_pairs(plot, period, &crop_offsets)
                        .filter(|t| t.u_crop != t.v_crop)
                    {
                        self.penalize(&mut dqm, term)?;
                    }
                }
            }
        }

        // Constraint 3: no family member on adjacent plots at the same time.
        for period in self.periods() {
            for (u, v) in &self.neighbor_pairs {
                for members in self.crop_families.values() {
                    let mut plot_crop_offsets = Vec::new();
                    for crop in members {
                        for r in 0..self.grow_time(crop) {
                            plot_crop_offsets.push((u.clone(), crop.clone(), r));
                        }
                        for r in 0..self.grow_time(crop) {
                            plot_crop_offsets.push((v.clone(), crop.clone(), r));
                        }
                    }
                    for term in self.plot_crop_offset_pairs(period, &plot_crop_offsets) {
                        self.penalize(&mut dqm, term)?;
                    }
                }
            }
        }

        let stats = self.stats(&dqm);
        tracing::debug!(
            variables = stats.variables,
            variable_interactions = stats.variable_interactions,
            variable_interaction_pct = percent(stats.variable_interactions, stats.max_variable_interactions),
            cases = stats.cases,
            case_interactions = stats.case_interactions,
            case_interaction_pct = percent(stats.case_interactions, stats.max_case_interactions),
            "built crop rotation model"
        );

        Ok(dqm)
    }

    /// Size statistics of a model built by this encoder.
    pub fn stats(&self, dqm: &RotationDqm) -> ModelStats {
        let variables = dqm.num_variables();
        let cases = dqm.num_cases();
        let same_variable_pairs: usize = self
            .periods()
            .map(|p| {
                let k = self.period_crops(p).len();
                (1 + k) * k / 2
            })
            .sum::<usize>()
            * self.problem.num_plots();

        ModelStats {
            variables,
            variable_interactions: dqm.dqm().num_variable_interactions(),
            max_variable_interactions: variables * variables.saturating_sub(1) / 2,
            cases,
            case_interactions: dqm.dqm().num_case_interactions(),
            max_case_interactions: (cases * cases.saturating_sub(1) / 2)
                .saturating_sub(same_variable_pairs),
        }
    }

    /// Whether `crop` can be planted in `period`.
    pub(crate) fn can_plant(&self, crop: &str, period: Period) -> bool {
        self.problem
            .crops
            .get(crop)
            .is_some_and(|c| c.can_plant_in(period))
    }

    fn interaction(&self, period: Period, a: Occupancy<'_>, b: Occupancy<'_>) -> Option<CaseInteraction> {
        let a_period = self.rollover(i64::from(period) - i64::from(a.offset));
        if !self.can_plant(a.crop, a_period) {
            return None;
        }
        let b_period = self.rollover(i64::from(period) - i64::from(b.offset));
        if !self.can_plant(b.crop, b_period) {
            return None;
        }
        // Both sides on one variable: already exclusive, or a crop that
        // outgrows the cycle overlapping itself.
        if a.plot == b.plot && a_period == b_period {
            return None;
        }
        Some(CaseInteraction {
            u: VarLabel::new(a.plot, a_period),
            u_crop: a.crop.to_string(),
            v: VarLabel::new(b.plot, b_period),
            v_crop: b.crop.to_string(),
        })
    }

    fn penalize(&self, dqm: &mut RotationDqm, term: CaseInteraction) -> Result<()> {
        dqm.set_quadratic(term.u, &Some(term.u_crop), term.v, &Some(term.v_crop), self.gamma)
    }
}

/// Unordered pairs of distinct positions, in enumeration order.
fn pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> + '_ {
    items
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| items[i + 1..].iter().map(move |b| (a, b)))
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::problem::Crop;
    use proptest::prelude::*;

    fn single_plot(time_units: u32) -> RotationProblem {
        RotationProblem::new(time_units).with_plot("1", Vec::<&str>::new())
    }

    fn mixed() -> RotationProblem {
        RotationProblem::new(4)
            .with_plot("1", ["2"])
            .with_plot("2", ["1", "3"])
            .with_plot("3", ["2"])
            .with_crop("a", Crop::new("f", 1, 4, 2))
            .with_crop("b", Crop::new("f", 2, 3, 1))
            .with_crop("c", Crop::new("g", 3, 4, 3))
    }

    #[test]
    fn test_rollover() {
        let rotation = CropRotation::new(single_plot(4));
        assert_eq!(rotation.rollover(1), 1);
        assert_eq!(rotation.rollover(4), 4);
        assert_eq!(rotation.rollover(5), 1);
        assert_eq!(rotation.rollover(9), 1);
        assert_eq!(rotation.rollover(0), 4);
        assert_eq!(rotation.rollover(-1), 3);
        assert_eq!(rotation.rollover(-4), 4);
    }

    proptest! {
        #[test]
        fn prop_rollover_range_and_congruence(t in 1u32..24, x in -1000i64..1000) {
            let rotation = CropRotation::new(single_plot(t));
            let r = rotation.rollover(x);
            prop_assert!(1 <= r && r <= t);
            prop_assert_eq!((x - i64::from(r)).rem_euclid(i64::from(t)), 0);
        }
    }

    #[test]
    fn test_derived_tables() {
        let rotation = CropRotation::new(mixed());
        assert_eq!(rotation.gamma(), 4.0);
        assert_eq!(rotation.period_crops(1), &["a".to_string()]);
        assert_eq!(rotation.period_crops(2), &["a".to_string(), "b".to_string()]);
        assert_eq!(
            rotation.period_crops(3),
            &["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(rotation.period_crops(5).is_empty());
        assert!(rotation.period_crops(0).is_empty());
        assert_eq!(rotation.crop_families()["f"], vec!["a", "b"]);
        assert_eq!(rotation.crop_families()["g"], vec!["c"]);
        assert_eq!(rotation.neighbor_pairs().len(), 4);
        assert_eq!(rotation.grow_time("c"), 3);
        assert_eq!(rotation.grow_time("zzz"), 0);
    }

    #[test]
    fn test_single_crop_instance() {
        let problem = single_plot(2).with_crop("x", Crop::new("y", 1, 2, 1));
        let dqm = CropRotation::new(problem).build().unwrap();
        assert_eq!(dqm.num_variables(), 2);
        assert_eq!(dqm.num_cases(), 4);
        assert_eq!(dqm.dqm().num_case_interactions(), 0);
        for period in 1..=2 {
            let var = VarLabel::new("1", period);
            assert_eq!(dqm.cases(&var).unwrap(), &[None, Some("x".to_string())]);
        }
    }

    #[test]
    fn test_variable_and_case_counts() {
        let rotation = CropRotation::new(mixed());
        let dqm = rotation.build().unwrap();

        let plots = rotation.problem().num_plots();
        assert_eq!(dqm.num_variables(), 4 * plots);
        let expected_cases: usize = rotation
            .periods()
            .map(|p| plots * (1 + rotation.period_crops(p).len()))
            .sum();
        assert_eq!(dqm.num_cases(), expected_cases);
    }

    #[test]
    fn test_no_crop_is_case_zero_and_linear_rewards() {
        let rotation = CropRotation::new(mixed());
        let dqm = rotation.build().unwrap();

        for var in dqm.variables() {
            assert_eq!(dqm.case_index(var, &None).unwrap(), 0);
            assert_eq!(dqm.linear(var, &None).unwrap(), 0.0);
        }
        let var = VarLabel::new("2", 3);
        assert_eq!(dqm.linear(&var, &Some("a".into())).unwrap(), -2.0);
        assert_eq!(dqm.linear(&var, &Some("b".into())).unwrap(), -1.0);
        assert_eq!(dqm.linear(&var, &Some("c".into())).unwrap(), -3.0);
    }

    #[test]
    fn test_self_overlap_terms() {
        let problem = single_plot(3).with_crop("a", Crop::new("f", 1, 3, 2));
        let rotation = CropRotation::new(problem);
        let dqm = rotation.build().unwrap();

        let a = Some("a".to_string());
        assert_eq!(dqm.dqm().num_case_interactions(), 3);
        for (p, q) in [(1, 2), (2, 3), (3, 1)] {
            let bias = dqm
                .quadratic(&VarLabel::new("1", p), &a, &VarLabel::new("1", q), &a)
                .unwrap();
            assert_eq!(bias, rotation.gamma());
        }
    }

    #[test]
    fn test_crop_offset_pairs_prunes() {
        let problem = single_plot(4)
            .with_crop("a", Crop::new("f", 2, 2, 2))
            .with_crop("b", Crop::new("f", 1, 4, 1));
        let rotation = CropRotation::new(problem);
        let offsets = vec![("a".to_string(), 0), ("a".to_string(), 1), ("b".to_string(), 0)];

        let terms: Vec<_> = rotation.crop_offset_pairs("1", 3, &offsets).collect();
        assert_eq!(
            terms,
            vec![CaseInteraction {
                u: VarLabel::new("1", 2),
                u_crop: "a".into(),
                v: VarLabel::new("1", 3),
                v_crop: "b".into(),
            }]
        );

        // Restartable: a second pass yields the same terms.
        assert_eq!(rotation.crop_offset_pairs("1", 3, &offsets).count(), 1);
        assert_eq!(rotation.crop_offset_pairs("1", 4, &offsets).count(), 0);
    }

    #[test]
    fn test_plot_crop_offset_pairs() {
        let problem = RotationProblem::new(3)
            .with_plot("u", ["v"])
            .with_plot("v", ["u"])
            .with_crop("a", Crop::new("f", 1, 3, 1))
            .with_crop("b", Crop::new("f", 1, 3, 1));
        let rotation = CropRotation::new(problem);

        let cross = vec![("u".to_string(), "a".to_string(), 0), ("v".to_string(), "a".to_string(), 0)];
        let terms: Vec<_> = rotation.plot_crop_offset_pairs(2, &cross).collect();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].u, VarLabel::new("u", 2));
        assert_eq!(terms[0].v, VarLabel::new("v", 2));

        let same = vec![("u".to_string(), "a".to_string(), 0), ("u".to_string(), "b".to_string(), 0)];
        assert_eq!(rotation.plot_crop_offset_pairs(2, &same).count(), 0);
    }

    #[test]
    fn test_neighbor_family_terms() {
        let problem = RotationProblem::new(3)
            .with_plot("1", ["2"])
            .with_plot("2", ["1"])
            .with_crop("a", Crop::new("f", 1, 3, 1))
            .with_crop("z", Crop::new("g", 1, 3, 1));
        let rotation = CropRotation::new(problem);
        let dqm = rotation.build().unwrap();

        let a = Some("a".to_string());
        let z = Some("z".to_string());
        let one = VarLabel::new("1", 2);
        let two = VarLabel::new("2", 2);
        assert_eq!(dqm.quadratic(&one, &a, &two, &a).unwrap(), rotation.gamma());
        assert_eq!(dqm.quadratic(&one, &a, &two, &z).unwrap(), 0.0);
        // Grow time 1 on both crops leaves only the neighbor terms.
        assert_eq!(dqm.dqm().num_case_interactions(), 6);
    }

    #[test]
    fn test_family_successor_terms() {
        let problem = single_plot(4)
            .with_crop("a", Crop::new("f", 1, 4, 1))
            .with_crop("b", Crop::new("f", 1, 4, 1));
        let rotation = CropRotation::new(problem);
        let dqm = rotation.build().unwrap();

        let a = Some("a".to_string());
        let b = Some("b".to_string());
        let first = VarLabel::new("1", 1);
        let second = VarLabel::new("1", 2);
        let third = VarLabel::new("1", 3);
        assert_eq!(dqm.quadratic(&first, &a, &second, &b).unwrap(), rotation.gamma());
        assert_eq!(dqm.quadratic(&first, &b, &second, &a).unwrap(), rotation.gamma());
        // A crop may follow itself.
        assert_eq!(dqm.quadratic(&first, &a, &second, &a).unwrap(), 0.0);
        assert_eq!(dqm.quadratic(&first, &a, &third, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_crop_longer_than_cycle() {
        let problem = single_plot(1).with_crop("a", Crop::new("f", 1, 1, 2));
        let dqm = CropRotation::new(problem).build().unwrap();
        assert_eq!(dqm.num_variables(), 1);
        assert_eq!(dqm.dqm().num_case_interactions(), 0);
    }

    #[test]
    fn test_no_crops() {
        let rotation = CropRotation::new(single_plot(3));
        assert_eq!(rotation.gamma(), 1.0);
        let dqm = rotation.build().unwrap();
        assert_eq!(dqm.num_variables(), 3);
        assert_eq!(dqm.num_cases(), 3);
    }

    #[test]
    fn test_build_is_deterministic() {
        let rotation = CropRotation::new(mixed());
        let a = rotation.build().unwrap();
        let b = rotation.build().unwrap();
        assert_eq!(a.variables(), b.variables());
        let ia: Vec<_> = a.dqm().interactions().collect();
        let ib: Vec<_> = b.dqm().interactions().collect();
        assert_eq!(ia, ib);
    }

    #[test]
    fn test_stats() {
        let problem = single_plot(3).with_crop("a", Crop::new("f", 1, 3, 2));
        let rotation = CropRotation::new(problem);
        let dqm = rotation.build().unwrap();
        let stats = rotation.stats(&dqm);

        assert_eq!(stats.variables, 3);
        assert_eq!(stats.max_variable_interactions, 3);
        assert_eq!(stats.variable_interactions, 3);
        assert_eq!(stats.cases, 6);
        assert_eq!(stats.case_interactions, 3);
        // 15 case pairs minus one same-variable pair per variable.
        assert_eq!(stats.max_case_interactions, 12);
    }
}
