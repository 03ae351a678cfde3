use super::composition::Composition;
use crate::core::error::DataFormatError;
use serde::Deserialize;
use std::collections::HashSet;

/// One dataset row, exactly as read from storage.
///
/// Every measured field is optional because laboratory datasets routinely leave
/// cells blank; imputation happens later inside the fitted encoders.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct RawRecord {
    #[serde(rename = "Compound Composition")]
    pub composition: String,
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,
    #[serde(rename = "Pressure")]
    pub pressure: Option<f64>,
    #[serde(rename = "Crystal Structure")]
    pub crystal_structure: Option<String>,
    #[serde(rename = "Lattice Parameter")]
    pub lattice_parameter: Option<f64>,
    #[serde(rename = "Band Gap")]
    pub band_gap: Option<f64>,
    #[serde(rename = "Conductivity")]
    pub conductivity: Option<String>,
}

type RecordKey = (
    String,
    [Option<u64>; 4],
    Option<String>,
    Option<String>,
);

impl RawRecord {
    /// Extracts the model inputs of this row.
    ///
    /// `row` is only used to label a composition parsing failure.
    pub fn process_features(&self, row: usize) -> Result<ProcessFeatures, DataFormatError> {
        let composition = Composition::parse(&self.composition).map_err(|source| {
            DataFormatError::MalformedComposition {
                row,
                value: self.composition.clone(),
                source,
            }
        })?;
        Ok(ProcessFeatures {
            composition,
            temperature: self.temperature,
            pressure: self.pressure,
            crystal_structure: self.crystal_structure.clone(),
            lattice_parameter: self.lattice_parameter,
        })
    }

    fn key(&self) -> RecordKey {
        (
            self.composition.clone(),
            [
                self.temperature.map(f64::to_bits),
                self.pressure.map(f64::to_bits),
                self.lattice_parameter.map(f64::to_bits),
                self.band_gap.map(f64::to_bits),
            ],
            self.crystal_structure.clone(),
            self.conductivity.clone(),
        )
    }
}

/// Removes exact duplicate rows, keeping the first occurrence of each.
pub fn dedup_records(records: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.key()))
        .collect()
}

/// The inputs of the feature encoder: a composition plus its process conditions.
///
/// Built either from a dataset row or synthetically during exploration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessFeatures {
    pub composition: Composition,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub crystal_structure: Option<String>,
    pub lattice_parameter: Option<f64>,
}

/// Fixed process conditions applied to every synthetic record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessConditions {
    pub temperature: f64,
    pub pressure: f64,
    pub lattice_parameter: f64,
}

impl ProcessConditions {
    pub fn features_for(
        &self,
        composition: &Composition,
        crystal_structure: &str,
    ) -> ProcessFeatures {
        ProcessFeatures {
            composition: composition.clone(),
            temperature: Some(self.temperature),
            pressure: Some(self.pressure),
            crystal_structure: Some(crystal_structure.to_string()),
            lattice_parameter: Some(self.lattice_parameter),
        }
    }
}
