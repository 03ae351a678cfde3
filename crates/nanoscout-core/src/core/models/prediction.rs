use super::composition::Composition;
use super::conductivity::ConductivityLabel;
use super::record::ProcessConditions;
use super::structure::StructureHypothesis;

/// The best-scoring hypothesis found for one generated composition.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub composition: Composition,
    pub structure: StructureHypothesis,
    pub conditions: ProcessConditions,
    /// Predicted band gap in eV, on the natural (decoded) scale.
    pub band_gap: f64,
    /// Decoded, unrounded conductivity value.
    pub conductivity_value: f64,
    pub conductivity: ConductivityLabel,
    pub score: f64,
}
