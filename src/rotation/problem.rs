//! Crop rotation problem description and model labels.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plot identifier.
pub type PlotId = String;

/// Crop identifier.
pub type CropId = String;

/// A period in `1..=time_units`.
pub type Period = u32;

/// Case label of a model variable: a crop, or `None` for an empty plot.
pub type CropCase = Option<CropId>;

/// A full label-space assignment: the case selected for every variable.
pub type Assignment = HashMap<VarLabel, CropCase>;

/// A crop definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Crop {
    /// Crop family. Members of a family may not follow each other on a plot
    /// or grow on adjacent plots at the same time.
    pub family: String,
    /// Inclusive `[start, end]` range of periods in which the crop may be
    /// planted.
    pub planting: [Period; 2],
    /// Number of consecutive periods the crop occupies its plot.
    pub grow_time: u32,
}

impl Crop {
    /// Creates a crop plantable from `start` to `end` inclusive.
    pub fn new(family: impl Into<String>, start: Period, end: Period, grow_time: u32) -> Self {
        Self {
            family: family.into(),
            planting: [start, end],
            grow_time,
        }
    }

    /// Whether the crop may be planted in `period`.
    #[inline]
    pub fn can_plant_in(&self, period: Period) -> bool {
        self.planting[0] <= period && period <= self.planting[1]
    }
}

/// A crop rotation problem.
///
/// Inputs are expected to be validated: `time_units >= 1`, planting windows
/// inside `1..=time_units`, `grow_time >= 1`, adjacency symmetric without
/// self-loops and referring only to listed plots.
///
/// # Examples
///
/// ```
/// use u_rotation::rotation::{Crop, RotationProblem};
///
/// let problem = RotationProblem::new(4)
///     .with_plot("north", ["south"])
///     .with_plot("south", ["north"])
///     .with_crop("bean", Crop::new("legume", 1, 2, 2))
///     .with_crop("pea", Crop::new("legume", 2, 4, 1));
/// assert_eq!(problem.plot_adjacency.len(), 2);
/// assert_eq!(problem.crops["bean"].grow_time, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotationProblem {
    /// Number of periods in one cycle.
    pub time_units: u32,
    /// Neighbors of each plot.
    pub plot_adjacency: BTreeMap<PlotId, Vec<PlotId>>,
    /// Crop definitions.
    pub crops: BTreeMap<CropId, Crop>,
}

impl RotationProblem {
    /// Creates a problem with no plots and no crops.
    pub fn new(time_units: u32) -> Self {
        Self {
            time_units,
            plot_adjacency: BTreeMap::new(),
            crops: BTreeMap::new(),
        }
    }

    /// Adds a plot with its neighbors.
    pub fn with_plot<I, S>(mut self, plot: impl Into<PlotId>, neighbors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PlotId>,
    {
        self.plot_adjacency
            .insert(plot.into(), neighbors.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a crop.
    pub fn with_crop(mut self, name: impl Into<CropId>, crop: Crop) -> Self {
        self.crops.insert(name.into(), crop);
        self
    }

    /// Number of plots.
    pub fn num_plots(&self) -> usize {
        self.plot_adjacency.len()
    }
}

/// Model variable label: one plot in one period.
///
/// Displays as `plot,period`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarLabel {
    pub plot: PlotId,
    pub period: Period,
}

impl VarLabel {
    pub fn new(plot: impl Into<PlotId>, period: Period) -> Self {
        Self {
            plot: plot.into(),
            period,
        }
    }
}

impl fmt::Display for VarLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.plot, self.period)
    }
}
