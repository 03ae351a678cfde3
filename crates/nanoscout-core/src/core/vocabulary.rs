use crate::core::error::DataFormatError;
use crate::core::models::composition::Composition;
use crate::core::models::record::RawRecord;
use itertools::Itertools;
use tracing::debug;

/// The closed, sorted set of element symbols observed in a dataset.
///
/// Column positions of the multi-hot element block follow this order, so any
/// composition maps onto the same columns no matter how its elements were listed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementVocabulary {
    elements: Vec<String>,
}

impl ElementVocabulary {
    /// Collects the union of all composition tokens in `records`.
    ///
    /// # Errors
    ///
    /// Fails with [`DataFormatError::EmptyDataset`] when there are no records and with
    /// [`DataFormatError::MalformedComposition`] when any composition cannot be parsed.
    pub fn extract(records: &[RawRecord]) -> Result<Self, DataFormatError> {
        if records.is_empty() {
            return Err(DataFormatError::EmptyDataset);
        }
        let mut symbols = Vec::new();
        for (row, record) in records.iter().enumerate() {
            let composition = Composition::parse(&record.composition).map_err(|source| {
                DataFormatError::MalformedComposition {
                    row,
                    value: record.composition.clone(),
                    source,
                }
            })?;
            symbols.extend(composition.elements().iter().cloned());
        }
        let vocabulary = Self::from_symbols(symbols);
        debug!(
            "Extracted element vocabulary of {} symbol(s): {:?}",
            vocabulary.len(),
            vocabulary.elements
        );
        Ok(vocabulary)
    }

    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: symbols.into_iter().map(Into::into).sorted().dedup().collect(),
        }
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn index_of(&self, element: &str) -> Option<usize> {
        self.elements
            .binary_search_by(|probe| probe.as_str().cmp(element))
            .ok()
    }

    pub fn contains(&self, element: &str) -> bool {
        self.index_of(element).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(compositions: &[&str]) -> Vec<RawRecord> {
        compositions
            .iter()
            .map(|c| RawRecord {
                composition: c.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn extract_returns_sorted_unique_symbols() {
        let vocabulary =
            ElementVocabulary::extract(&records(&["Zn + O", "Ga + N", "Zn + Ga + O"])).unwrap();
        assert_eq!(vocabulary.elements(), &["Ga", "N", "O", "Zn"]);
    }

    #[test]
    fn index_of_follows_sorted_order() {
        let vocabulary = ElementVocabulary::from_symbols(["Zn", "O", "Ga", "N"]);
        assert_eq!(vocabulary.index_of("Ga"), Some(0));
        assert_eq!(vocabulary.index_of("Zn"), Some(3));
        assert_eq!(vocabulary.index_of("Cd"), None);
    }

    #[test]
    fn extract_fails_on_empty_dataset() {
        assert_eq!(
            ElementVocabulary::extract(&[]),
            Err(DataFormatError::EmptyDataset)
        );
    }

    #[test]
    fn extract_fails_on_blank_composition() {
        let result = ElementVocabulary::extract(&records(&["Zn + O", ""]));
        assert!(matches!(
            result,
            Err(DataFormatError::MalformedComposition { row: 1, .. })
        ));
    }
}
