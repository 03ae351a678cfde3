use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// Token separating element symbols in a composition string, e.g. `"Zn + O"`.
pub const COMPOSITION_SEPARATOR: char = '+';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("composition string is empty")]
    Empty,
    #[error("composition contains an empty element token")]
    EmptyToken,
}

/// A canonical set of element symbols.
///
/// Elements are kept sorted and de-duplicated, so two compositions compare equal
/// whenever they name the same elements, regardless of the order in which those
/// elements were listed or selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Composition {
    elements: Vec<String>,
}

impl Composition {
    /// Parses a separator-joined composition string such as `"Zn + Ga + O"`.
    ///
    /// Whitespace around each token is ignored. Repeated elements collapse into one.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::Empty`] for a blank string and
    /// [`CompositionError::EmptyToken`] when a separator is not surrounded by symbols
    /// (for example `"Zn + "`).
    pub fn parse(value: &str) -> Result<Self, CompositionError> {
        if value.trim().is_empty() {
            return Err(CompositionError::Empty);
        }
        let tokens: Vec<&str> = value.split(COMPOSITION_SEPARATOR).map(str::trim).collect();
        if tokens.iter().any(|token| token.is_empty()) {
            return Err(CompositionError::EmptyToken);
        }
        Ok(Self::from_elements(tokens))
    }

    pub fn from_elements<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements = elements
            .into_iter()
            .map(Into::into)
            .sorted()
            .dedup()
            .collect();
        Self { elements }
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

    pub fn contains(&self, element: &str) -> bool {
        self.elements
            .binary_search_by(|probe| probe.as_str().cmp(element))
            .is_ok()
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.elements.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sorts_and_trims_elements() {
        let composition = Composition::parse("Zn + Ga +O").unwrap();
        assert_eq!(composition.elements(), &["Ga", "O", "Zn"]);
    }

    #[test]
    fn parse_is_independent_of_element_order() {
        let a = Composition::parse("Zn + O").unwrap();
        let b = Composition::parse("O + Zn").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_collapses_repeated_elements() {
        let composition = Composition::parse("O + Zn + O").unwrap();
        assert_eq!(composition.len(), 2);
    }

    #[test]
    fn parse_rejects_blank_input() {
        assert_eq!(Composition::parse("   "), Err(CompositionError::Empty));
    }

    #[test]
    fn parse_rejects_dangling_separator() {
        assert_eq!(
            Composition::parse("Zn + "),
            Err(CompositionError::EmptyToken)
        );
    }

    #[test]
    fn display_joins_with_spaced_separator() {
        let composition = Composition::from_elements(["O", "Ga", "N"]);
        assert_eq!(composition.to_string(), "Ga + N + O");
        assert!(composition.contains("N"));
        assert!(!composition.contains("Zn"));
    }
}
