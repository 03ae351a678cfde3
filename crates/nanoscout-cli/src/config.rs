use crate::cli::ExploreArgs;
use crate::error::{CliError, Result};
use nanoscout::core::encoding::targets::TargetPolicy;
use nanoscout::engine::config as core_config;
use nanoscout::engine::error::EngineError;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_COUNT: usize = 10;
pub const DEFAULT_MAX_ELEMENTS: usize = 3;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialTrainingConfig {
    #[serde(rename = "hidden-layers")]
    hidden_layers: Option<Vec<usize>>,
    #[serde(rename = "learning-rate")]
    learning_rate: Option<f64>,
    #[serde(rename = "max-epochs")]
    max_epochs: Option<usize>,
    #[serde(rename = "batch-size")]
    batch_size: Option<usize>,
    #[serde(rename = "validation-fraction")]
    validation_fraction: Option<f64>,
    patience: Option<usize>,
    #[serde(rename = "min-delta")]
    min_delta: Option<f64>,
    seed: Option<u64>,
}

impl PartialTrainingConfig {
    fn resolve(self) -> core_config::TrainingConfig {
        let defaults = core_config::TrainingConfig::default();
        core_config::TrainingConfig {
            hidden_layers: self.hidden_layers.unwrap_or(defaults.hidden_layers),
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            max_epochs: self.max_epochs.unwrap_or(defaults.max_epochs),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            validation_fraction: self
                .validation_fraction
                .unwrap_or(defaults.validation_fraction),
            patience: self.patience.unwrap_or(defaults.patience),
            min_delta: self.min_delta.unwrap_or(defaults.min_delta),
            seed: self.seed.unwrap_or(defaults.seed),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialGenerationConfig {
    count: Option<usize>,
    #[serde(rename = "max-elements")]
    max_elements: Option<usize>,
    #[serde(rename = "exclude-observed")]
    exclude_observed: Option<bool>,
    #[serde(rename = "max-attempts")]
    max_attempts: Option<usize>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields)]
struct PartialSamplingRange {
    min: Option<f64>,
    max: Option<f64>,
    points: Option<usize>,
}

impl PartialSamplingRange {
    fn resolve(self, default: core_config::SamplingRange) -> core_config::SamplingRange {
        core_config::SamplingRange {
            min: self.min.unwrap_or(default.min),
            max: self.max.unwrap_or(default.max),
            points: self.points.unwrap_or(default.points),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialConditionsConfig {
    temperature: Option<PartialSamplingRange>,
    pressure: Option<PartialSamplingRange>,
    #[serde(rename = "lattice-parameter")]
    lattice_parameter: Option<PartialSamplingRange>,
}

impl PartialConditionsConfig {
    fn resolve(self) -> core_config::ConditionsConfig {
        let defaults = core_config::ConditionsConfig::default();
        core_config::ConditionsConfig {
            temperature: self
                .temperature
                .unwrap_or_default()
                .resolve(defaults.temperature),
            pressure: self.pressure.unwrap_or_default().resolve(defaults.pressure),
            lattice_parameter: self
                .lattice_parameter
                .unwrap_or_default()
                .resolve(defaults.lattice_parameter),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PartialTargetPolicy {
    Lenient,
    Strict,
}

impl From<PartialTargetPolicy> for TargetPolicy {
    fn from(p: PartialTargetPolicy) -> Self {
        match p {
            PartialTargetPolicy::Lenient => TargetPolicy::Lenient,
            PartialTargetPolicy::Strict => TargetPolicy::Strict,
        }
    }
}

impl FromStr for PartialTargetPolicy {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(()),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialEncodingConfig {
    #[serde(rename = "target-policy")]
    target_policy: Option<PartialTargetPolicy>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialExplorationConfig {
    training: Option<PartialTrainingConfig>,
    generation: Option<PartialGenerationConfig>,
    conditions: Option<PartialConditionsConfig>,
    encoding: Option<PartialEncodingConfig>,
}

impl PartialExplorationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &ExploreArgs) -> Result<core_config::ExplorationConfig> {
        self.apply_set_values(&args.set_values)?;

        let mut training = self.training.unwrap_or_default();
        if let Some(max_epochs) = args.max_epochs {
            training.max_epochs = Some(max_epochs);
        }

        let generation = self.generation.unwrap_or_default();
        let count = args.count.or(generation.count).unwrap_or(DEFAULT_COUNT);
        let max_elements = args
            .max_elements
            .or(generation.max_elements)
            .unwrap_or(DEFAULT_MAX_ELEMENTS);
        let exclude_observed = args.exclude_observed || generation.exclude_observed.unwrap_or(false);
        let seed = args.seed.or(generation.seed);

        let target_policy = if args.strict_targets {
            TargetPolicy::Strict
        } else {
            self.encoding
                .and_then(|e| e.target_policy)
                .map(TargetPolicy::from)
                .unwrap_or_default()
        };

        let mut builder = core_config::ExplorationConfigBuilder::new()
            .training(training.resolve())
            .conditions(self.conditions.unwrap_or_default().resolve())
            .target_policy(target_policy)
            .count(count)
            .max_elements(max_elements)
            .exclude_observed(exclude_observed)
            .seed(seed);
        if let Some(attempts) = generation.max_attempts {
            builder = builder.max_attempts_per_composition(attempts);
        }

        let config = builder
            .build()
            .map_err(|e| CliError::NanoScoutCore(EngineError::from(e)))?;
        debug!("Resolved exploration configuration: {:?}", config);
        Ok(config)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "training.learning-rate" => {
                    self.training_mut().learning_rate = Some(parse_value(key, value_str)?);
                }
                "training.max-epochs" => {
                    self.training_mut().max_epochs = Some(parse_value(key, value_str)?);
                }
                "training.batch-size" => {
                    self.training_mut().batch_size = Some(parse_value(key, value_str)?);
                }
                "training.validation-fraction" => {
                    self.training_mut().validation_fraction = Some(parse_value(key, value_str)?);
                }
                "training.patience" => {
                    self.training_mut().patience = Some(parse_value(key, value_str)?);
                }
                "training.min-delta" => {
                    self.training_mut().min_delta = Some(parse_value(key, value_str)?);
                }
                "training.seed" => {
                    self.training_mut().seed = Some(parse_value(key, value_str)?);
                }
                "training.hidden-layers" => {
                    let widths = value_str
                        .split(',')
                        .map(|w| parse_value(key, w.trim()))
                        .collect::<Result<Vec<usize>>>()?;
                    self.training_mut().hidden_layers = Some(widths);
                }
                "generation.count" => {
                    self.generation_mut().count = Some(parse_value(key, value_str)?);
                }
                "generation.max-elements" => {
                    self.generation_mut().max_elements = Some(parse_value(key, value_str)?);
                }
                "generation.exclude-observed" => {
                    self.generation_mut().exclude_observed = Some(parse_value(key, value_str)?);
                }
                "generation.max-attempts" => {
                    self.generation_mut().max_attempts = Some(parse_value(key, value_str)?);
                }
                "generation.seed" => {
                    self.generation_mut().seed = Some(parse_value(key, value_str)?);
                }
                "encoding.target-policy" => {
                    let policy = value_str.parse::<PartialTargetPolicy>().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid value for {}: '{}'. Expected 'lenient' or 'strict'.",
                            key, value_str
                        ))
                    })?;
                    self.encoding
                        .get_or_insert_with(Default::default)
                        .target_policy = Some(policy);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unknown or unsupported key for --set: {}",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn training_mut(&mut self) -> &mut PartialTrainingConfig {
        self.training.get_or_insert_with(Default::default)
    }

    fn generation_mut(&mut self) -> &mut PartialGenerationConfig {
        self.generation.get_or_insert_with(Default::default)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use nanoscout::engine::config::ConfigError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("explore.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn explore_args(extra: &[&str]) -> ExploreArgs {
        let mut argv = vec!["nanoscout", "explore", "-d", "materials.csv"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Explore(args) => args,
            other => panic!("Expected explore command, got {:?}", other),
        }
    }

    #[test]
    fn empty_config_resolves_to_defaults() {
        let config = PartialExplorationConfig::default()
            .merge_with_cli(&explore_args(&[]))
            .unwrap();

        assert_eq!(config.generation.count, DEFAULT_COUNT);
        assert_eq!(config.generation.max_elements, DEFAULT_MAX_ELEMENTS);
        assert!(!config.generation.exclude_observed);
        assert_eq!(config.generation.seed, None);
        assert_eq!(config.training, core_config::TrainingConfig::default());
        assert_eq!(config.conditions, core_config::ConditionsConfig::default());
        assert_eq!(config.target_policy, TargetPolicy::Lenient);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [training]
            hidden-layers = [16]
            learning-rate = 0.01
            patience = 5

            [generation]
            count = 4
            max-elements = 2
            exclude-observed = true
            seed = 7

            [conditions.temperature]
            min = 400.0
            max = 800.0
            points = 3

            [encoding]
            target-policy = "strict"
            "#,
        );

        let config = PartialExplorationConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&explore_args(&[]))
            .unwrap();

        assert_eq!(config.training.hidden_layers, vec![16]);
        assert_eq!(config.training.learning_rate, 0.01);
        assert_eq!(config.training.patience, 5);
        assert_eq!(config.training.max_epochs, 500);
        assert_eq!(config.generation.count, 4);
        assert_eq!(config.generation.max_elements, 2);
        assert!(config.generation.exclude_observed);
        assert_eq!(config.generation.seed, Some(7));
        assert_eq!(config.conditions.temperature.min, 400.0);
        assert_eq!(config.conditions.temperature.points, 3);
        assert_eq!(
            config.conditions.pressure,
            core_config::ConditionsConfig::default().pressure
        );
        assert_eq!(config.target_policy, TargetPolicy::Strict);
    }

    #[test]
    fn cli_overrides_set_values_which_override_file() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [generation]
            count = 4
            max-elements = 2

            [training]
            max-epochs = 100
            "#,
        );

        let args = explore_args(&[
            "-n",
            "12",
            "-S",
            "generation.count=8",
            "-S",
            "generation.max-elements=3",
            "-S",
            "training.max-epochs=50",
            "--max-epochs",
            "25",
        ]);
        let config = PartialExplorationConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.generation.count, 12);
        assert_eq!(config.generation.max_elements, 3);
        assert_eq!(config.training.max_epochs, 25);
    }

    #[test]
    fn set_values_parse_lists_and_policies() {
        let args = explore_args(&[
            "-S",
            "training.hidden-layers=8, 4",
            "-S",
            "encoding.target-policy=Strict",
        ]);
        let config = PartialExplorationConfig::default()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.training.hidden_layers, vec![8, 4]);
        assert_eq!(config.target_policy, TargetPolicy::Strict);
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        for bad in [
            "generation.count",
            "generation.count=many",
            "unknown.key=1",
            "encoding.target-policy=sloppy",
        ] {
            let result = PartialExplorationConfig::default().merge_with_cli(&explore_args(&["-S", bad]));
            assert!(
                matches!(result, Err(CliError::Config(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[generation]\nmystery = 1\n");

        let result = PartialExplorationConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn invalid_resolved_values_surface_as_config_errors() {
        let args = explore_args(&["-k", "0"]);
        let result = PartialExplorationConfig::default().merge_with_cli(&args);

        assert!(matches!(
            result,
            Err(CliError::NanoScoutCore(EngineError::Config {
                source: ConfigError::InvalidParameter { .. }
            }))
        ));
    }
}
