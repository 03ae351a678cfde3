use crate::core::encoding::targets::TargetPolicy;
use crate::core::encoding::transforms::median;
use crate::core::models::record::ProcessConditions;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub batch_size: usize,
    pub validation_fraction: f64,
    pub patience: usize,
    pub min_delta: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![64, 32],
            learning_rate: 1e-3,
            max_epochs: 500,
            batch_size: 32,
            validation_fraction: 0.2,
            patience: 20,
            min_delta: 1e-6,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hidden_layers.contains(&0) {
            return Err(invalid("hidden_layers", "layer widths must be positive"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(invalid("learning_rate", "must be a positive number"));
        }
        if self.max_epochs == 0 {
            return Err(invalid("max_epochs", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(invalid("validation_fraction", "must lie in [0, 1)"));
        }
        if !(self.min_delta.is_finite() && self.min_delta >= 0.0) {
            return Err(invalid("min_delta", "must be a non-negative number"));
        }
        Ok(())
    }
}

/// A closed interval sampled on an evenly spaced grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingRange {
    pub min: f64,
    pub max: f64,
    pub points: usize,
}

impl SamplingRange {
    pub const fn new(min: f64, max: f64, points: usize) -> Self {
        Self { min, max, points }
    }

    pub fn linspace(&self) -> Vec<f64> {
        match self.points {
            0 => Vec::new(),
            1 => vec![self.min],
            n => {
                let step = (self.max - self.min) / (n - 1) as f64;
                (0..n).map(|i| self.min + step * i as f64).collect()
            }
        }
    }

    /// Median of the sampling grid, used as the representative value of the range.
    pub fn representative(&self) -> Option<f64> {
        median(&self.linspace())
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(invalid(name, "range bounds must be finite with min <= max"));
        }
        if self.points == 0 {
            return Err(invalid(name, "range must have at least one grid point"));
        }
        Ok(())
    }
}

/// Sampling ranges from which the fixed exploration conditions are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionsConfig {
    /// Synthesis temperature in °C.
    pub temperature: SamplingRange,
    /// Synthesis pressure in MPa.
    pub pressure: SamplingRange,
    /// Lattice parameter in Å.
    pub lattice_parameter: SamplingRange,
}

impl Default for ConditionsConfig {
    fn default() -> Self {
        Self {
            temperature: SamplingRange::new(300.0, 1200.0, 5),
            pressure: SamplingRange::new(0.5, 2.0, 5),
            lattice_parameter: SamplingRange::new(3.0, 7.0, 5),
        }
    }
}

impl ConditionsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.temperature.validate("conditions.temperature")?;
        self.pressure.validate("conditions.pressure")?;
        self.lattice_parameter.validate("conditions.lattice_parameter")
    }

    pub fn representative(&self) -> Result<ProcessConditions, ConfigError> {
        self.validate()?;
        let pick = |range: &SamplingRange, name: &'static str| {
            range
                .representative()
                .ok_or(ConfigError::MissingParameter(name))
        };
        Ok(ProcessConditions {
            temperature: pick(&self.temperature, "conditions.temperature")?,
            pressure: pick(&self.pressure, "conditions.pressure")?,
            lattice_parameter: pick(&self.lattice_parameter, "conditions.lattice_parameter")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub count: usize,
    pub max_elements: usize,
    pub exclude_observed: bool,
    pub max_attempts_per_composition: usize,
    pub seed: Option<u64>,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_elements < 2 {
            return Err(invalid("generation.max_elements", "must be at least 2"));
        }
        if self.max_attempts_per_composition == 0 {
            return Err(invalid(
                "generation.max_attempts_per_composition",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorationConfig {
    pub training: TrainingConfig,
    pub generation: GenerationConfig,
    pub conditions: ConditionsConfig,
    pub target_policy: TargetPolicy,
}

#[derive(Default)]
pub struct ExplorationConfigBuilder {
    training: Option<TrainingConfig>,
    conditions: Option<ConditionsConfig>,
    target_policy: Option<TargetPolicy>,
    count: Option<usize>,
    max_elements: Option<usize>,
    exclude_observed: Option<bool>,
    max_attempts_per_composition: Option<usize>,
    seed: Option<u64>,
}

impl ExplorationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn training(mut self, config: TrainingConfig) -> Self {
        self.training = Some(config);
        self
    }
    pub fn conditions(mut self, config: ConditionsConfig) -> Self {
        self.conditions = Some(config);
        self
    }
    pub fn target_policy(mut self, policy: TargetPolicy) -> Self {
        self.target_policy = Some(policy);
        self
    }
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
    pub fn max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = Some(max_elements);
        self
    }
    pub fn exclude_observed(mut self, exclude: bool) -> Self {
        self.exclude_observed = Some(exclude);
        self
    }
    pub fn max_attempts_per_composition(mut self, attempts: usize) -> Self {
        self.max_attempts_per_composition = Some(attempts);
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<ExplorationConfig, ConfigError> {
        let generation = GenerationConfig {
            count: self
                .count
                .ok_or(ConfigError::MissingParameter("generation.count"))?,
            max_elements: self
                .max_elements
                .ok_or(ConfigError::MissingParameter("generation.max_elements"))?,
            exclude_observed: self.exclude_observed.unwrap_or(false),
            max_attempts_per_composition: self.max_attempts_per_composition.unwrap_or(1000),
            seed: self.seed,
        };
        let config = ExplorationConfig {
            training: self.training.unwrap_or_default(),
            generation,
            conditions: self.conditions.unwrap_or_default(),
            target_policy: self.target_policy.unwrap_or_default(),
        };
        config.training.validate()?;
        config.generation.validate()?;
        config.conditions.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_conditions_use_grid_medians() {
        let conditions = ConditionsConfig::default().representative().unwrap();
        assert_eq!(conditions.temperature, 750.0);
        assert_eq!(conditions.pressure, 1.25);
        assert_eq!(conditions.lattice_parameter, 5.0);
    }

    #[test]
    fn linspace_includes_both_ends() {
        let grid = SamplingRange::new(0.5, 2.0, 5).linspace();
        assert_eq!(grid, vec![0.5, 0.875, 1.25, 1.625, 2.0]);
        assert_eq!(SamplingRange::new(1.0, 1.0, 1).linspace(), vec![1.0]);
    }

    #[test]
    fn even_grids_average_middle_points() {
        assert_eq!(SamplingRange::new(0.0, 3.0, 4).representative(), Some(1.5));
    }

    #[test]
    fn builder_requires_generation_size() {
        let result = ExplorationConfigBuilder::new().count(5).build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingParameter("generation.max_elements")
        );
    }

    #[test]
    fn builder_fills_defaults() {
        let config = ExplorationConfigBuilder::new()
            .count(5)
            .max_elements(3)
            .build()
            .unwrap();
        assert_eq!(config.training, TrainingConfig::default());
        assert_eq!(config.target_policy, TargetPolicy::Lenient);
        assert!(!config.generation.exclude_observed);
        assert_eq!(config.generation.seed, None);
    }

    #[test]
    fn builder_rejects_invalid_values() {
        let result = ExplorationConfigBuilder::new()
            .count(5)
            .max_elements(1)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "generation.max_elements",
                ..
            })
        ));

        let training = TrainingConfig {
            validation_fraction: 1.0,
            ..TrainingConfig::default()
        };
        let result = ExplorationConfigBuilder::new()
            .count(5)
            .max_elements(3)
            .training(training)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "validation_fraction",
                ..
            })
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let conditions = ConditionsConfig {
            pressure: SamplingRange::new(2.0, 0.5, 5),
            ..ConditionsConfig::default()
        };
        assert!(conditions.representative().is_err());
    }
}
