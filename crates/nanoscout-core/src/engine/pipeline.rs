use super::config::TrainingConfig;
use super::error::EngineError;
use super::model::mlp::{MlpRegressor, MlpTrainer};
use super::model::{Regressor, Trainer};
use super::progress::{Progress, ProgressReporter};
use crate::core::encoding::features::FeatureEncoder;
use crate::core::encoding::targets::{DecodedTargets, TargetEncoder, TargetPolicy};
use crate::core::models::composition::Composition;
use crate::core::models::record::{ProcessFeatures, RawRecord, dedup_records};
use crate::core::models::structure::StructureHypothesis;
use crate::core::vocabulary::ElementVocabulary;
use itertools::Itertools;
use nalgebra::DVector;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSummary {
    pub rows_read: usize,
    pub unique_rows: usize,
    pub vocabulary_size: usize,
    pub feature_width: usize,
}

/// Fitted transforms and trained model, produced once by [`FittedPipeline::build`].
///
/// There is no way to refit or retrain an existing pipeline; every accessor and
/// prediction method borrows it immutably.
#[derive(Debug, Clone)]
pub struct FittedPipeline<M = MlpRegressor> {
    vocabulary: ElementVocabulary,
    observed: Vec<Composition>,
    features: FeatureEncoder,
    targets: TargetEncoder,
    model: M,
    summary: DatasetSummary,
}

impl FittedPipeline<MlpRegressor> {
    /// Builds a pipeline with the default MLP regressor.
    pub fn build(
        records: Vec<RawRecord>,
        training: &TrainingConfig,
        policy: TargetPolicy,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError> {
        Self::build_with(records, policy, &MlpTrainer::new(training.clone()), reporter)
    }
}

impl<M: Regressor> FittedPipeline<M> {
    /// De-duplicates `records`, fits the vocabulary and both encoders, then trains the
    /// model with `trainer`. Any failure aborts the build; no partial pipeline escapes.
    #[instrument(skip_all, name = "pipeline_build", fields(records = records.len()))]
    pub fn build_with<T>(
        records: Vec<RawRecord>,
        policy: TargetPolicy,
        trainer: &T,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError>
    where
        T: Trainer<Model = M>,
    {
        reporter.report(Progress::PhaseStart {
            name: "Encoding dataset",
        });
        let rows_read = records.len();
        let records = dedup_records(records);
        if records.len() < rows_read {
            info!(
                "Dropped {} duplicate row(s) before fitting.",
                rows_read - records.len()
            );
        }

        let vocabulary = ElementVocabulary::extract(&records)?;
        let (features, x) = FeatureEncoder::fit(&records, &vocabulary)?;
        let (targets, y) = TargetEncoder::fit(&records, policy)?;
        let observed = records
            .iter()
            .enumerate()
            .map(|(row, record)| record.process_features(row).map(|f| f.composition))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unique()
            .collect();
        reporter.report(Progress::PhaseFinish);

        let summary = DatasetSummary {
            rows_read,
            unique_rows: records.len(),
            vocabulary_size: vocabulary.len(),
            feature_width: features.width(),
        };
        info!(
            "Encoded {} unique row(s) into {} feature column(s) over {} element(s).",
            summary.unique_rows, summary.feature_width, summary.vocabulary_size
        );

        reporter.report(Progress::PhaseStart {
            name: "Training model",
        });
        let model = trainer.fit(&x, &y, reporter)?;
        reporter.report(Progress::PhaseFinish);

        let pipeline = Self {
            vocabulary,
            observed,
            features,
            targets,
            model,
            summary,
        };
        let unseen = pipeline.unseen_hypotheses();
        if !unseen.is_empty() {
            warn!(
                "Structure hypotheses absent from the training data will share the unknown code: {}.",
                unseen.iter().join(", ")
            );
        }
        Ok(pipeline)
    }

    /// Hypotheses whose label never appeared in the fitted `Crystal Structure` column.
    pub fn unseen_hypotheses(&self) -> Vec<StructureHypothesis> {
        let classes = self.features.structure_classes();
        StructureHypothesis::ALL
            .into_iter()
            .filter(|h| !classes.iter().any(|c| c == h.label()))
            .collect()
    }

    pub fn vocabulary(&self) -> &ElementVocabulary {
        &self.vocabulary
    }

    /// Distinct compositions present in the training data.
    pub fn observed_compositions(&self) -> &[Composition] {
        &self.observed
    }

    pub fn feature_encoder(&self) -> &FeatureEncoder {
        &self.features
    }

    pub fn target_encoder(&self) -> &TargetEncoder {
        &self.targets
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn summary(&self) -> &DatasetSummary {
        &self.summary
    }

    pub fn encode(&self, input: &ProcessFeatures) -> DVector<f64> {
        self.features.transform(input)
    }

    /// Encodes `input`, runs the model, and decodes the output onto natural units.
    pub fn predict(&self, input: &ProcessFeatures) -> DecodedTargets {
        let encoded = self.model.predict_one(&self.encode(input));
        self.targets.decode(&encoded)
    }
}
