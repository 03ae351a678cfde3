use super::layout::{FeatureLayout, NumericSlot};
use super::transforms::{LabelEncoder, MedianImputer, StandardScaler};
use crate::core::error::DataFormatError;
use crate::core::models::record::{ProcessFeatures, RawRecord};
use crate::core::vocabulary::ElementVocabulary;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, instrument, trace};

/// Category standing in for a missing or unseen crystal structure.
pub const UNKNOWN_STRUCTURE: &str = "Unknown";

/// Fitted feature transforms: layout, crystal-structure codes, imputer and scaler.
///
/// Constructed only through [`FeatureEncoder::fit`]; every other method borrows
/// `self` immutably.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    layout: FeatureLayout,
    structures: LabelEncoder,
    imputer: MedianImputer,
    scaler: StandardScaler,
}

impl FeatureEncoder {
    /// Fits all feature transforms on `records` and returns the scaled feature matrix
    /// (one row per record, one column per layout slot).
    ///
    /// Callers are expected to have removed duplicate rows beforehand so that repeated
    /// measurements do not skew the medians and scaling statistics.
    ///
    /// # Errors
    ///
    /// Fails on an empty record slice, on unparsable compositions, and when a numeric
    /// process column has no observed values at all.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn fit(
        records: &[RawRecord],
        vocabulary: &ElementVocabulary,
    ) -> Result<(Self, DMatrix<f64>), DataFormatError> {
        if records.is_empty() {
            return Err(DataFormatError::EmptyDataset);
        }
        let inputs = records
            .iter()
            .enumerate()
            .map(|(row, record)| record.process_features(row))
            .collect::<Result<Vec<_>, _>>()?;

        let layout = FeatureLayout::new(vocabulary.clone());
        let structures = LabelEncoder::fit_with_fallback(
            inputs
                .iter()
                .filter_map(|input| input.crystal_structure.as_deref()),
            UNKNOWN_STRUCTURE,
        );

        let numeric_rows: Vec<Vec<Option<f64>>> = inputs
            .iter()
            .map(|input| raw_numeric(&structures, input))
            .collect();
        let imputer = MedianImputer::fit(&numeric_rows, &layout.numeric_names())?;

        let partial = PartialEncoder {
            layout: &layout,
            imputer: &imputer,
        };
        let rows: Vec<DVector<f64>> = inputs
            .iter()
            .zip(&numeric_rows)
            .map(|(input, numeric)| partial.assemble(numeric, input))
            .collect();
        let unscaled = DMatrix::from_fn(rows.len(), layout.len(), |i, j| rows[i][j]);
        let scaler = StandardScaler::fit(&unscaled);
        let encoded = scaler.transform(&unscaled);

        debug!(
            "Fitted feature encoder: {} slot(s), {} crystal structure class(es), medians {:?}",
            layout.len(),
            structures.classes().len(),
            imputer.medians()
        );

        Ok((
            Self {
                layout,
                structures,
                imputer,
                scaler,
            },
            encoded,
        ))
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn width(&self) -> usize {
        self.layout.len()
    }

    pub fn structure_classes(&self) -> &[String] {
        self.structures.classes()
    }

    pub fn medians(&self) -> &[f64] {
        self.imputer.medians()
    }

    /// Imputed but unscaled feature vector for `input`.
    ///
    /// Elements missing from the fitted vocabulary are dropped; the vector always has
    /// the fitted layout width.
    pub fn assemble(&self, input: &ProcessFeatures) -> DVector<f64> {
        let numeric = raw_numeric(&self.structures, input);
        PartialEncoder {
            layout: &self.layout,
            imputer: &self.imputer,
        }
        .assemble(&numeric, input)
    }

    /// Scaled feature vector for `input`, ready for the regression model.
    pub fn transform(&self, input: &ProcessFeatures) -> DVector<f64> {
        self.scaler.transform_vector(&self.assemble(input))
    }

    /// Undoes the standardization of an encoded vector.
    pub fn inverse_transform(&self, encoded: &DVector<f64>) -> DVector<f64> {
        self.scaler.inverse_transform_vector(encoded)
    }
}

struct PartialEncoder<'a> {
    layout: &'a FeatureLayout,
    imputer: &'a MedianImputer,
}

impl PartialEncoder<'_> {
    fn assemble(&self, numeric: &[Option<f64>], input: &ProcessFeatures) -> DVector<f64> {
        let mut vector = DVector::zeros(self.layout.len());
        for (slot, value) in NumericSlot::ALL
            .iter()
            .zip(self.imputer.transform(numeric))
        {
            vector[slot.index()] = value;
        }
        for element in input.composition.elements() {
            match self.layout.element_position(element) {
                Some(position) => vector[position] = 1.0,
                None => trace!(
                    "Ignoring element '{}' absent from the fitted vocabulary.",
                    element
                ),
            }
        }
        vector
    }
}

fn raw_numeric(structures: &LabelEncoder, input: &ProcessFeatures) -> Vec<Option<f64>> {
    let label = input
        .crystal_structure
        .as_deref()
        .unwrap_or(UNKNOWN_STRUCTURE);
    let mut numeric = vec![None; NumericSlot::ALL.len()];
    numeric[NumericSlot::Temperature.index()] = input.temperature;
    numeric[NumericSlot::Pressure.index()] = input.pressure;
    numeric[NumericSlot::CrystalStructure.index()] =
        structures.encode(label).map(|code| code as f64);
    numeric[NumericSlot::LatticeParameter.index()] = input.lattice_parameter;
    numeric
}
