use super::layout::TargetSlot;
use super::transforms::{MedianImputer, StandardScaler};
use crate::core::error::DataFormatError;
use crate::core::models::conductivity::{Conductivity, ConductivityLabel, round_ordinal};
use crate::core::models::record::RawRecord;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, instrument, warn};

/// How conductivity categories outside {Low, Moderate, High} are treated at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetPolicy {
    /// Treat them as missing values, to be imputed with the training median.
    #[default]
    Lenient,
    /// Reject the dataset.
    Strict,
}

/// Physical target values recovered from a scaled model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedTargets {
    pub band_gap: f64,
    pub conductivity_value: f64,
    pub conductivity: ConductivityLabel,
}

impl DecodedTargets {
    /// The conductivity value rounded half-down onto the ordinal scale, even when it
    /// falls outside 1..=3.
    pub fn conductivity_ordinal(&self) -> Option<i64> {
        round_ordinal(self.conductivity_value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetEncoder {
    imputer: MedianImputer,
    scaler: StandardScaler,
}

impl TargetEncoder {
    /// Fits the target imputer and scaler on `records` and returns the scaled
    /// `[band gap, conductivity]` matrix.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn fit(
        records: &[RawRecord],
        policy: TargetPolicy,
    ) -> Result<(Self, DMatrix<f64>), DataFormatError> {
        if records.is_empty() {
            return Err(DataFormatError::EmptyDataset);
        }

        let mut unrecognized = 0usize;
        let mut rows = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            let conductivity = match record.conductivity.as_deref() {
                None => None,
                Some(name) => match Conductivity::from_name(name) {
                    Some(level) => Some(f64::from(level.ordinal())),
                    None if policy == TargetPolicy::Strict => {
                        return Err(DataFormatError::UnknownConductivity {
                            row,
                            value: name.to_string(),
                        });
                    }
                    None => {
                        unrecognized += 1;
                        None
                    }
                },
            };
            rows.push(vec![record.band_gap, conductivity]);
        }
        if unrecognized > 0 {
            warn!(
                "{} row(s) carry an unrecognized conductivity category; treating them as missing.",
                unrecognized
            );
        }

        let columns: Vec<String> = TargetSlot::ALL
            .iter()
            .map(|slot| slot.name().to_string())
            .collect();
        let imputer = MedianImputer::fit(&rows, &columns)?;
        let imputed: Vec<Vec<f64>> = rows.iter().map(|row| imputer.transform(row)).collect();
        let unscaled = DMatrix::from_fn(imputed.len(), TargetSlot::ALL.len(), |i, j| imputed[i][j]);
        let scaler = StandardScaler::fit(&unscaled);
        let encoded = scaler.transform(&unscaled);

        debug!(
            "Fitted target encoder: medians {:?}, mean {:?}, scale {:?}",
            imputer.medians(),
            scaler.mean().as_slice(),
            scaler.scale().as_slice()
        );
        Ok((Self { imputer, scaler }, encoded))
    }

    /// Scaled target vector for known values; missing entries take the training medians.
    pub fn transform(
        &self,
        band_gap: Option<f64>,
        conductivity: Option<Conductivity>,
    ) -> DVector<f64> {
        let raw = self.imputer.transform(&[
            band_gap,
            conductivity.map(|level| f64::from(level.ordinal())),
        ]);
        self.scaler.transform_vector(&DVector::from_vec(raw))
    }

    /// Inverts the target scaling of one model output row.
    pub fn decode(&self, encoded: &DVector<f64>) -> DecodedTargets {
        let natural = self.scaler.inverse_transform_vector(encoded);
        let conductivity_value = natural[TargetSlot::Conductivity.index()];
        DecodedTargets {
            band_gap: natural[TargetSlot::BandGap.index()],
            conductivity_value,
            conductivity: ConductivityLabel::from_decoded(conductivity_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(band_gap: Option<f64>, conductivity: Option<&str>) -> RawRecord {
        RawRecord {
            composition: "Zn + O".to_string(),
            band_gap,
            conductivity: conductivity.map(str::to_string),
            ..Default::default()
        }
    }

    fn records() -> Vec<RawRecord> {
        vec![
            record(Some(3.37), Some("Low")),
            record(Some(1.1), Some("High")),
            record(None, Some("Moderate")),
            record(Some(2.0), None),
        ]
    }

    #[test]
    fn fit_maps_categories_and_imputes_medians() {
        let (encoder, matrix) = TargetEncoder::fit(&records(), TargetPolicy::Lenient).unwrap();
        assert_eq!(matrix.shape(), (4, 2));
        assert_eq!(encoder.imputer.medians(), &[2.0, 2.0]);

        let decoded = encoder.decode(&matrix.row(2).transpose());
        assert!((decoded.band_gap - 2.0).abs() < 1e-9);
        assert_eq!(
            decoded.conductivity,
            ConductivityLabel::Known(Conductivity::Moderate)
        );
    }

    #[test]
    fn decode_inverts_transform() {
        let (encoder, _) = TargetEncoder::fit(&records(), TargetPolicy::Lenient).unwrap();
        let decoded = encoder.decode(&encoder.transform(Some(4.2), Some(Conductivity::High)));
        assert!((decoded.band_gap - 4.2).abs() < 1e-9);
        assert!((decoded.conductivity_value - 3.0).abs() < 1e-9);
        assert_eq!(decoded.conductivity_ordinal(), Some(3));
        assert_eq!(
            decoded.conductivity,
            ConductivityLabel::Known(Conductivity::High)
        );
    }

    #[test]
    fn decode_out_of_range_conductivity_is_unknown() {
        let (encoder, _) = TargetEncoder::fit(&records(), TargetPolicy::Lenient).unwrap();
        let natural = DVector::from_vec(vec![1.0, 5.0]);
        let scaled = encoder.scaler.transform_vector(&natural);
        let decoded = encoder.decode(&scaled);
        assert_eq!(decoded.conductivity, ConductivityLabel::Unknown);
        assert_eq!(decoded.conductivity_ordinal(), Some(5));
    }

    #[test]
    fn lenient_policy_treats_unknown_category_as_missing() {
        let mut data = records();
        data.push(record(Some(2.5), Some("Metallic")));
        let (encoder, _) = TargetEncoder::fit(&data, TargetPolicy::Lenient).unwrap();
        assert_eq!(encoder.imputer.medians()[1], 2.0);
    }

    #[test]
    fn strict_policy_rejects_unknown_category() {
        let mut data = records();
        data.push(record(Some(2.5), Some("Metallic")));
        let err = TargetEncoder::fit(&data, TargetPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            DataFormatError::UnknownConductivity {
                row: 4,
                value: "Metallic".to_string()
            }
        );
    }

    #[test]
    fn fit_requires_observed_band_gaps() {
        let data = vec![record(None, Some("Low")), record(None, Some("High"))];
        assert!(matches!(
            TargetEncoder::fit(&data, TargetPolicy::Lenient),
            Err(DataFormatError::NoObservedValues { .. })
        ));
    }
}
