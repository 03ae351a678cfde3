use super::model::Regressor;
use super::pipeline::FittedPipeline;
use crate::core::encoding::targets::DecodedTargets;
use crate::core::models::composition::Composition;
use crate::core::models::prediction::PredictionRecord;
use crate::core::models::record::ProcessConditions;
use crate::core::models::structure::StructureHypothesis;
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EstimationError {
    #[error("No structure hypothesis produced a finite score for composition '{composition}'")]
    NoValidHypothesis { composition: String },
}

/// The decoded prediction and score of one structure hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypothesisScore {
    pub structure: StructureHypothesis,
    pub targets: DecodedTargets,
    pub score: f64,
}

/// Ranking heuristic: band gap times the rounded conductivity ordinal, both on their
/// natural scales. The two quantities carry different units, so the score orders
/// candidates but has no physical meaning of its own.
pub fn score_targets(targets: &DecodedTargets) -> Option<f64> {
    targets
        .conductivity_ordinal()
        .map(|ordinal| targets.band_gap * ordinal as f64)
        .filter(|score| score.is_finite())
}

/// Keeps the highest-scoring candidate. A later candidate replaces the current best
/// only when its score is strictly greater, so ties go to the first one seen.
pub fn select_best<I>(candidates: I) -> Option<HypothesisScore>
where
    I: IntoIterator<Item = HypothesisScore>,
{
    candidates
        .into_iter()
        .fold(None, |best, candidate| match best {
            Some(current) if candidate.score > current.score => Some(candidate),
            Some(current) => Some(current),
            None => Some(candidate),
        })
}

/// Sorts predictions by descending score. The sort is stable, so equal scores keep
/// their generation order.
pub fn rank(predictions: &mut [PredictionRecord]) {
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Scores generated compositions against every [`StructureHypothesis`] under fixed
/// process conditions.
pub struct MaterialPropertyEstimator<'a, M: Regressor> {
    pipeline: &'a FittedPipeline<M>,
    conditions: ProcessConditions,
}

impl<'a, M: Regressor> MaterialPropertyEstimator<'a, M> {
    pub fn new(pipeline: &'a FittedPipeline<M>, conditions: ProcessConditions) -> Self {
        Self {
            pipeline,
            conditions,
        }
    }

    pub fn conditions(&self) -> &ProcessConditions {
        &self.conditions
    }

    /// Predicts and scores one hypothesis; `None` when the score is not finite.
    pub fn evaluate(
        &self,
        composition: &Composition,
        structure: StructureHypothesis,
    ) -> Option<HypothesisScore> {
        let input = self.conditions.features_for(composition, structure.label());
        let targets = self.pipeline.predict(&input);
        match score_targets(&targets) {
            Some(score) => Some(HypothesisScore {
                structure,
                targets,
                score,
            }),
            None => {
                debug!(
                    "Discarding hypothesis {} for {}: non-finite prediction {:?}.",
                    structure, composition, targets
                );
                None
            }
        }
    }

    pub fn estimate(&self, composition: &Composition) -> Result<PredictionRecord, EstimationError> {
        let best = select_best(
            StructureHypothesis::ALL
                .iter()
                .filter_map(|&structure| self.evaluate(composition, structure)),
        )
        .ok_or_else(|| EstimationError::NoValidHypothesis {
            composition: composition.to_string(),
        })?;

        Ok(PredictionRecord {
            composition: composition.clone(),
            structure: best.structure,
            conditions: self.conditions,
            band_gap: best.targets.band_gap,
            conductivity_value: best.targets.conductivity_value,
            conductivity: best.targets.conductivity,
            score: best.score,
        })
    }

    /// Estimates every composition in order. A composition that cannot be scored is
    /// logged and skipped without affecting the rest of the batch.
    #[instrument(level = "debug", skip_all, fields(compositions = compositions.len()))]
    pub fn predict_all(&self, compositions: &[Composition]) -> Vec<PredictionRecord> {
        compositions
            .iter()
            .filter_map(|composition| match self.estimate(composition) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping composition: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::layout::NumericSlot;
    use crate::core::encoding::targets::TargetPolicy;
    use crate::core::models::conductivity::{Conductivity, ConductivityLabel};
    use crate::engine::config::ConditionsConfig;
    use crate::engine::pipeline::test_support::{FnRegressor, FnTrainer, small_dataset};
    use crate::engine::progress::ProgressReporter;
    use nalgebra::DVector;

    fn pipeline(f: fn(&DVector<f64>) -> [f64; 2]) -> FittedPipeline<FnRegressor> {
        FittedPipeline::build_with(
            small_dataset(),
            TargetPolicy::Lenient,
            &FnTrainer(f),
            &ProgressReporter::new(),
        )
        .unwrap()
    }

    fn conditions() -> ProcessConditions {
        ConditionsConfig::default().representative().unwrap()
    }

    fn targets(band_gap: f64, conductivity_value: f64) -> DecodedTargets {
        DecodedTargets {
            band_gap,
            conductivity_value,
            conductivity: ConductivityLabel::from_decoded(conductivity_value),
        }
    }

    fn candidate(structure: StructureHypothesis, score: f64) -> HypothesisScore {
        HypothesisScore {
            structure,
            targets: targets(score, 1.0),
            score,
        }
    }

    #[test]
    fn score_multiplies_band_gap_by_rounded_ordinal() {
        assert_eq!(score_targets(&targets(2.0, 2.7)), Some(6.0));
        assert_eq!(score_targets(&targets(2.0, 1.5)), Some(2.0));
        assert_eq!(score_targets(&targets(2.0, f64::NAN)), None);
        assert_eq!(score_targets(&targets(f64::INFINITY, 2.0)), None);
    }

    #[test]
    fn select_best_prefers_strictly_greater_scores() {
        let best = select_best([
            candidate(StructureHypothesis::Wurtzite, 1.0),
            candidate(StructureHypothesis::ZincBlende, 3.0),
            candidate(StructureHypothesis::Hexagonal, 2.0),
        ])
        .unwrap();
        assert_eq!(best.structure, StructureHypothesis::ZincBlende);
    }

    #[test]
    fn select_best_keeps_first_of_tied_candidates() {
        let best = select_best([
            candidate(StructureHypothesis::Wurtzite, 2.0),
            candidate(StructureHypothesis::ZincBlende, 2.0),
            candidate(StructureHypothesis::Cubic, 2.0),
        ])
        .unwrap();
        assert_eq!(best.structure, StructureHypothesis::Wurtzite);
        assert_eq!(select_best(std::iter::empty()), None);
    }

    #[test]
    fn constant_model_ties_resolve_to_first_hypothesis() {
        let pipeline = pipeline(|_| [0.5, 0.0]);
        let estimator = MaterialPropertyEstimator::new(&pipeline, conditions());
        let record = estimator
            .estimate(&Composition::from_elements(["Zn", "N"]))
            .unwrap();
        assert_eq!(record.structure, StructureHypothesis::Wurtzite);
        assert_eq!(
            record.conductivity,
            ConductivityLabel::Known(Conductivity::Moderate)
        );
        assert_eq!(record.conditions, conditions());
    }

    #[test]
    fn structure_sensitive_model_picks_highest_scoring_hypothesis() {
        // Band gap grows with the encoded crystal structure code; classes are
        // [Hexagonal, Unknown, Wurtzite], so Wurtzite has the largest code and every
        // unseen hypothesis shares the Unknown code.
        let pipeline = pipeline(|x| [x[NumericSlot::CrystalStructure.index()], 0.0]);
        let estimator = MaterialPropertyEstimator::new(&pipeline, conditions());
        let record = estimator
            .estimate(&Composition::from_elements(["Ga", "O"]))
            .unwrap();
        assert_eq!(record.structure, StructureHypothesis::Wurtzite);
        assert!(record.score > 0.0);
    }

    #[test]
    fn predict_all_skips_compositions_without_valid_hypotheses() {
        // Slot 5 is the multi-hot column of N; poison every prediction that uses it.
        let pipeline = pipeline(|x| if x[5] > 0.0 { [f64::NAN, 0.0] } else { [0.2, 0.0] });
        let estimator = MaterialPropertyEstimator::new(&pipeline, conditions());
        let compositions = vec![
            Composition::from_elements(["Zn", "O"]),
            Composition::from_elements(["Ga", "N"]),
            Composition::from_elements(["Ga", "Zn"]),
        ];
        let records = estimator.predict_all(&compositions);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].composition, compositions[0]);
        assert_eq!(records[1].composition, compositions[2]);
        assert_eq!(
            estimator.estimate(&compositions[1]),
            Err(EstimationError::NoValidHypothesis {
                composition: "Ga + N".to_string()
            })
        );
    }

    #[test]
    fn predictions_only_use_the_fixed_hypothesis_set() {
        let pipeline = pipeline(|x| [x.sum(), x[0]]);
        let estimator = MaterialPropertyEstimator::new(&pipeline, conditions());
        let compositions = vec![
            Composition::from_elements(["Zn", "O"]),
            Composition::from_elements(["Ga", "N", "O"]),
            Composition::from_elements(["Cd", "Te"]),
        ];
        for record in estimator.predict_all(&compositions) {
            assert!(StructureHypothesis::ALL.contains(&record.structure));
        }
    }

    #[test]
    fn rank_orders_by_descending_score_stably() {
        let pipeline = pipeline(|_| [0.5, 0.0]);
        let estimator = MaterialPropertyEstimator::new(&pipeline, conditions());
        let base = estimator
            .estimate(&Composition::from_elements(["Zn", "O"]))
            .unwrap();
        let with_score = |elements: [&str; 2], score: f64| PredictionRecord {
            composition: Composition::from_elements(elements),
            score,
            ..base.clone()
        };
        let mut records = vec![
            with_score(["Zn", "O"], 1.0),
            with_score(["Ga", "N"], 3.0),
            with_score(["Ga", "O"], 1.0),
            with_score(["N", "O"], 2.0),
        ];
        rank(&mut records);
        let order: Vec<String> = records.iter().map(|r| r.composition.to_string()).collect();
        assert_eq!(order, ["Ga + N", "N + O", "O + Zn", "Ga + O"]);
    }
}
