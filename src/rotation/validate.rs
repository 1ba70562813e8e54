//! Direct constraint checking of a label-space assignment.

use super::encoder::CropRotation;
use super::problem::{Assignment, CropId, Period, VarLabel};
use std::fmt;

/// The three constraint sets of the rotation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintSet {
    /// A plot grows at most one crop at a time.
    Overlap = 1,
    /// No family member directly after another on the same plot.
    FamilySuccession = 2,
    /// No family member on adjacent plots at the same time.
    NeighborFamily = 3,
}

impl ConstraintSet {
    /// Constraint set number, 1 to 3.
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A constraint violated by an assignment.
///
/// `var` holds `crop`; `other_var` holds `other_crop`, which conflicts with
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub constraint: ConstraintSet,
    pub var: VarLabel,
    pub crop: CropId,
    pub other_var: VarLabel,
    pub other_crop: CropId,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constraint {} violated: {} {} {} {}",
            self.constraint, self.var, self.crop, self.other_var, self.other_crop
        )
    }
}

impl CropRotation {
    /// Checks every constraint directly against `assignment`.
    ///
    /// Violations are reported for constraint set 1, then 2, then 3, each in
    /// period order and then plot order. An empty result means the
    /// assignment is feasible. Variables missing from the assignment and
    /// crops unknown to the problem count as empty plots.
    pub fn validate(&self, assignment: &Assignment) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (var, crop) in self.occupied(assignment) {
            for r in 1..self.grow_time(crop) {
                let other_var = self.ahead(&var, r);
                if let Some(other_crop) = planted(assignment, &other_var) {
                    violations.push(Violation {
                        constraint: ConstraintSet::Overlap,
                        var: var.clone(),
                        crop: crop.clone(),
                        other_var,
                        other_crop: other_crop.clone(),
                    });
                }
            }
        }

        for (var, crop) in self.occupied(assignment) {
            for r in 1..=self.grow_time(crop) {
                let other_var = self.ahead(&var, r);
                if let Some(other_crop) = planted(assignment, &other_var) {
                    if other_crop != crop && self.same_family(crop, other_crop) {
                        violations.push(Violation {
                            constraint: ConstraintSet::FamilySuccession,
                            var: var.clone(),
                            crop: crop.clone(),
                            other_var,
                            other_crop: other_crop.clone(),
                        });
                    }
                }
            }
        }

        for (var, crop) in self.occupied(assignment) {
            let neighbors = self
                .problem()
                .plot_adjacency
                .get(&var.plot)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for r in 0..self.grow_time(crop) {
                let period = self.rollover(i64::from(var.period) + i64::from(r));
                for neighbor in neighbors {
                    let other_var = VarLabel::new(neighbor.as_str(), period);
                    if let Some(other_crop) = planted(assignment, &other_var) {
                        if self.same_family(crop, other_crop) {
                            violations.push(Violation {
                                constraint: ConstraintSet::NeighborFamily,
                                var: var.clone(),
                                crop: crop.clone(),
                                other_var,
                                other_crop: other_crop.clone(),
                            });
                        }
                    }
                }
            }
        }

        violations
    }

    /// Planted variables in period order, then plot order.
    fn occupied<'a>(
        &'a self,
        assignment: &'a Assignment,
    ) -> impl Iterator<Item = (VarLabel, &'a CropId)> + 'a {
        self.periods().flat_map(move |period| {
            self.problem().plot_adjacency.keys().filter_map(move |plot| {
                let var = VarLabel::new(plot.as_str(), period);
                let crop = planted(assignment, &var)?;
                self.problem().crops.contains_key(crop).then_some((var, crop))
            })
        })
    }

    /// The same plot `r` periods after `var`.
    fn ahead(&self, var: &VarLabel, r: u32) -> VarLabel {
        let period: Period = self.rollover(i64::from(var.period) + i64::from(r));
        VarLabel::new(var.plot.as_str(), period)
    }

    fn same_family(&self, a: &str, b: &str) -> bool {
        let crops = &self.problem().crops;
        match (crops.get(a), crops.get(b)) {
            (Some(a), Some(b)) => a.family == b.family,
            _ => false,
        }
    }
}

fn planted<'a>(assignment: &'a Assignment, var: &VarLabel) -> Option<&'a CropId> {
    assignment.get(var).and_then(Option::as_ref)
}
