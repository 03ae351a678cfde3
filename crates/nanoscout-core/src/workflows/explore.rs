use crate::core::io::dataset::read_records;
use crate::core::models::prediction::PredictionRecord;
use crate::core::models::record::ProcessConditions;
use crate::engine::config::ExplorationConfig;
use crate::engine::error::EngineError;
use crate::engine::estimator::{MaterialPropertyEstimator, rank};
use crate::engine::generator::CompositionGenerator;
use crate::engine::model::{Regressor, TrainingHistory};
use crate::engine::pipeline::{DatasetSummary, FittedPipeline};
use crate::engine::progress::{Progress, ProgressReporter};
use rand::rngs::StdRng;
use rand::{SeedableRng, thread_rng};
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct ExplorationResult {
    /// Predictions ordered by descending score.
    pub predictions: Vec<PredictionRecord>,
    /// Generated compositions that could not be scored.
    pub skipped: usize,
    pub conditions: ProcessConditions,
    pub summary: DatasetSummary,
    pub history: TrainingHistory,
}

/// Reads the dataset at `dataset_path` and runs the full exploration.
#[instrument(skip_all, name = "exploration_workflow", fields(path = %dataset_path.display()))]
pub fn run(
    dataset_path: &Path,
    config: &ExplorationConfig,
    reporter: &ProgressReporter,
) -> Result<ExplorationResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Loading dataset",
    });
    let records = read_records(dataset_path)?;
    reporter.report(Progress::PhaseFinish);
    info!("Loaded {} record(s).", records.len());

    let pipeline =
        FittedPipeline::build(records, &config.training, config.target_policy, reporter)?;
    let history = pipeline.model().history().clone();
    explore_with(&pipeline, config, reporter).map(|(predictions, skipped, conditions)| {
        ExplorationResult {
            predictions,
            skipped,
            conditions,
            summary: *pipeline.summary(),
            history,
        }
    })
}

/// Generates, scores, and ranks compositions with an already fitted pipeline.
///
/// Returns the ranked predictions, the number of skipped compositions, and the
/// process conditions every hypothesis was evaluated under.
pub fn explore_with<M: Regressor>(
    pipeline: &FittedPipeline<M>,
    config: &ExplorationConfig,
    reporter: &ProgressReporter,
) -> Result<(Vec<PredictionRecord>, usize, ProcessConditions), EngineError> {
    let conditions = config.conditions.representative()?;
    let generation = &config.generation;

    reporter.report(Progress::PhaseStart {
        name: "Generating compositions",
    });
    if generation.max_elements > pipeline.vocabulary().len() {
        reporter.report(Progress::Message(format!(
            "Composition size capped at {} element(s), the vocabulary size.",
            pipeline.vocabulary().len()
        )));
    }
    let mut generator = CompositionGenerator::new(pipeline.vocabulary())
        .max_attempts_per_composition(generation.max_attempts_per_composition);
    if generation.exclude_observed {
        generator = generator.excluding(pipeline.observed_compositions().iter().cloned());
    }
    let compositions = match generation.seed {
        Some(seed) => generator.generate(
            generation.count,
            generation.max_elements,
            &mut StdRng::seed_from_u64(seed),
        ),
        None => generator.generate(
            generation.count,
            generation.max_elements,
            &mut thread_rng(),
        ),
    }?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Scoring compositions",
    });
    info!(
        "Scoring {} composition(s) at T = {} °C, P = {} MPa, a = {} Å.",
        compositions.len(),
        conditions.temperature,
        conditions.pressure,
        conditions.lattice_parameter
    );
    let estimator = MaterialPropertyEstimator::new(pipeline, conditions);
    let mut predictions = estimator.predict_all(&compositions);
    let skipped = compositions.len() - predictions.len();
    if skipped > 0 {
        reporter.report(Progress::Message(format!(
            "Skipped {} composition(s) without a finite score.",
            skipped
        )));
    }
    rank(&mut predictions);
    reporter.report(Progress::PhaseFinish);

    Ok((predictions, skipped, conditions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::targets::TargetPolicy;
    use crate::core::models::conductivity::ConductivityLabel;
    use crate::core::models::structure::StructureHypothesis;
    use crate::engine::config::{ExplorationConfigBuilder, TrainingConfig};
    use crate::engine::generator::GenerationError;
    use crate::engine::pipeline::test_support::{FnTrainer, small_dataset};
    use std::collections::HashSet;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    const DATASET: &str = "\
Compound Composition,Temperature,Pressure,Crystal Structure,Lattice Parameter,Band Gap,Conductivity
Zn + O,450,1.0,Wurtzite,3.25,3.37,Low
Ga + N,900,1.5,Hexagonal,3.19,3.4,Moderate
Zn + Ga + O,700,,,8.33,4.4,High
";

    fn config(count: usize, max_elements: usize) -> ExplorationConfig {
        ExplorationConfigBuilder::new()
            .count(count)
            .max_elements(max_elements)
            .seed(Some(17))
            .training(TrainingConfig {
                hidden_layers: vec![8],
                max_epochs: 30,
                ..TrainingConfig::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn run_produces_one_prediction_per_generated_composition() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("materials.csv");
        fs::write(&path, DATASET).unwrap();

        let result = run(&path, &config(5, 3), &ProgressReporter::new()).unwrap();

        assert_eq!(result.summary.vocabulary_size, 4);
        assert_eq!(result.predictions.len(), 5);
        assert_eq!(result.skipped, 0);
        let vocabulary = ["Ga", "N", "O", "Zn"];
        let unique: HashSet<_> = result.predictions.iter().map(|p| &p.composition).collect();
        assert_eq!(unique.len(), 5);
        for prediction in &result.predictions {
            assert!((2..=3).contains(&prediction.composition.len()));
            assert!(
                prediction
                    .composition
                    .elements()
                    .iter()
                    .all(|e| vocabulary.contains(&e.as_str()))
            );
            assert!(StructureHypothesis::ALL.contains(&prediction.structure));
            assert!(prediction.band_gap.is_finite());
            assert!(matches!(
                prediction.conductivity,
                ConductivityLabel::Known(_) | ConductivityLabel::Unknown
            ));
        }
        assert!(
            result
                .predictions
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score)
        );
        assert_eq!(result.conditions.temperature, 750.0);
    }

    #[test]
    fn run_reports_insufficient_vocabulary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("materials.csv");
        fs::write(&path, DATASET).unwrap();

        let result = run(&path, &config(50, 3), &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(EngineError::Generation {
                source: GenerationError::InsufficientVocabulary { .. }
            })
        ));
    }

    #[test]
    fn run_fails_on_missing_dataset() {
        let dir = tempdir().unwrap();
        let result = run(
            &dir.path().join("absent.csv"),
            &config(1, 2),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::Dataset { .. })));
    }

    #[test]
    fn explore_reports_size_cap_and_skipped_compositions() {
        // Every composition containing N (multi-hot slot 5) gets a non-finite band gap.
        let pipeline = FittedPipeline::build_with(
            small_dataset(),
            TargetPolicy::Lenient,
            &FnTrainer(|x| if x[5] > 0.0 { [f64::NAN, 0.0] } else { [0.2, 0.0] }),
            &ProgressReporter::new(),
        )
        .unwrap();
        // Four elements leave eight unobserved compositions; six of them contain N.
        let config = ExplorationConfigBuilder::new()
            .count(8)
            .max_elements(5)
            .exclude_observed(true)
            .seed(Some(5))
            .build()
            .unwrap();

        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::Message(msg) = event {
                sink.lock().unwrap().push(msg);
            }
        }));

        let (predictions, skipped, _) = explore_with(&pipeline, &config, &reporter).unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(skipped, 6);
        assert_eq!(
            *messages.lock().unwrap(),
            vec![
                "Composition size capped at 4 element(s), the vocabulary size.".to_string(),
                "Skipped 6 composition(s) without a finite score.".to_string(),
            ]
        );
    }

    #[test]
    fn explore_stays_quiet_when_nothing_is_capped_or_skipped() {
        let pipeline = FittedPipeline::build_with(
            small_dataset(),
            TargetPolicy::Lenient,
            &FnTrainer(|_| [0.2, 0.0]),
            &ProgressReporter::new(),
        )
        .unwrap();
        let config = ExplorationConfigBuilder::new()
            .count(3)
            .max_elements(3)
            .seed(Some(5))
            .build()
            .unwrap();

        let messages = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&messages);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::Message(msg) = event {
                sink.lock().unwrap().push(msg);
            }
        }));

        let (predictions, skipped, _) = explore_with(&pipeline, &config, &reporter).unwrap();
        assert_eq!(predictions.len(), 3);
        assert_eq!(skipped, 0);
        assert!(messages.lock().unwrap().is_empty());
    }
}
