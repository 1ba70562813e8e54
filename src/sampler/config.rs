//! Annealing sampler configuration and cooling schedules.

/// Cooling schedule for the annealing temperature.
#[derive(Debug, Clone, Copy)]
pub enum CoolingSchedule {
    /// Geometric cooling: `T_{k+1} = alpha * T_k`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Linear cooling from the initial to the minimum temperature in
    /// [`SamplerConfig::temperature_steps`] steps.
    Linear,
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.9 }
    }
}

/// Configuration for [`AnnealingSampler`](super::AnnealingSampler).
///
/// # Examples
///
/// ```
/// use u_rotation::sampler::{CoolingSchedule, SamplerConfig};
///
/// let config = SamplerConfig::default()
///     .with_num_reads(20)
///     .with_initial_temperature(5.0)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.95 })
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Number of independent annealing runs. Each yields one sample.
    pub num_reads: usize,

    /// Full passes over all variables at each temperature.
    pub sweeps_per_temperature: usize,

    /// Starting temperature. Should be on the scale of the largest bias.
    pub initial_temperature: f64,

    /// Annealing stops once the temperature falls below this.
    pub min_temperature: f64,

    /// Cooling schedule.
    pub cooling: CoolingSchedule,

    /// Number of temperature levels for [`CoolingSchedule::Linear`].
    pub temperature_steps: usize,

    /// Random seed. Read `r` is seeded with `seed + r`.
    pub seed: Option<u64>,

    /// Run reads on the rayon pool. Needs the `parallel` feature.
    pub parallel: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_reads: 10,
            sweeps_per_temperature: 10,
            initial_temperature: 10.0,
            min_temperature: 0.01,
            cooling: CoolingSchedule::default(),
            temperature_steps: 100,
            seed: None,
            parallel: false,
        }
    }
}

impl SamplerConfig {
    pub fn with_num_reads(mut self, n: usize) -> Self {
        self.num_reads = n;
        self
    }

    pub fn with_sweeps_per_temperature(mut self, n: usize) -> Self {
        self.sweeps_per_temperature = n;
        self
    }

    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_temperature_steps(mut self, n: usize) -> Self {
        self.temperature_steps = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_reads == 0 {
            return Err("num_reads must be positive".into());
        }
        if self.sweeps_per_temperature == 0 {
            return Err("sweeps_per_temperature must be positive".into());
        }
        if self.initial_temperature <= 0.0 {
            return Err("initial_temperature must be positive".into());
        }
        if self.min_temperature <= 0.0 {
            return Err("min_temperature must be positive".into());
        }
        if self.min_temperature >= self.initial_temperature {
            return Err("min_temperature must be less than initial_temperature".into());
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if alpha <= 0.0 || alpha >= 1.0 {
                    return Err(format!("geometric alpha must be in (0, 1), got {alpha}"));
                }
            }
            CoolingSchedule::Linear => {
                if self.temperature_steps == 0 {
                    return Err("linear cooling needs temperature_steps > 0".into());
                }
            }
        }
        Ok(())
    }

    /// Temperature levels visited by one read, hottest first.
    pub(crate) fn temperatures(&self) -> Vec<f64> {
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                let mut levels = Vec::new();
                let mut t = self.initial_temperature;
                while t >= self.min_temperature {
                    levels.push(t);
                    t *= alpha;
                }
                levels
            }
            CoolingSchedule::Linear => {
                let span = self.initial_temperature - self.min_temperature;
                (0..=self.temperature_steps)
                    .map(|k| {
                        self.initial_temperature - k as f64 * span / self.temperature_steps as f64
                    })
                    .collect()
            }
        }
    }
}
