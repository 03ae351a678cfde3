use crate::core::models::composition::CompositionError;
use thiserror::Error;

/// Problems found while interpreting the contents of a dataset.
///
/// Row numbers are zero-based indices into the record slice handed to the
/// failing operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataFormatError {
    #[error("Required column '{0}' is missing from the dataset header")]
    MissingColumn(&'static str),

    #[error("Dataset contains no records")]
    EmptyDataset,

    #[error("Malformed composition '{value}' in row {row}: {source}")]
    MalformedComposition {
        row: usize,
        value: String,
        #[source]
        source: CompositionError,
    },

    #[error("Unknown conductivity category '{value}' in row {row}; expected Low, Moderate or High")]
    UnknownConductivity { row: usize, value: String },

    #[error("Column '{column}' has no observed values to compute a median from")]
    NoObservedValues { column: String },
}
