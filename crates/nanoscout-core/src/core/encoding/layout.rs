use crate::core::vocabulary::ElementVocabulary;
use std::ops::Range;

/// Scalar process slots at the head of every feature vector, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericSlot {
    Temperature,
    Pressure,
    CrystalStructure,
    LatticeParameter,
}

impl NumericSlot {
    pub const ALL: [NumericSlot; 4] = [
        Self::Temperature,
        Self::Pressure,
        Self::CrystalStructure,
        Self::LatticeParameter,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::Pressure => 1,
            Self::CrystalStructure => 2,
            Self::LatticeParameter => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Pressure => "Pressure",
            Self::CrystalStructure => "Crystal Structure",
            Self::LatticeParameter => "Lattice Parameter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureSlot {
    Numeric(NumericSlot),
    Element(String),
}

impl FeatureSlot {
    pub fn name(&self) -> String {
        match self {
            Self::Numeric(slot) => slot.name().to_string(),
            Self::Element(symbol) => format!("element:{symbol}"),
        }
    }
}

/// The ordered description of a feature vector, computed once at fit time.
///
/// Layout: the four [`NumericSlot`]s followed by one multi-hot slot per vocabulary
/// element in vocabulary order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    slots: Vec<FeatureSlot>,
    vocabulary: ElementVocabulary,
}

impl FeatureLayout {
    pub fn new(vocabulary: ElementVocabulary) -> Self {
        let slots = NumericSlot::ALL
            .into_iter()
            .map(FeatureSlot::Numeric)
            .chain(
                vocabulary
                    .elements()
                    .iter()
                    .cloned()
                    .map(FeatureSlot::Element),
            )
            .collect();
        Self { slots, vocabulary }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn vocabulary(&self) -> &ElementVocabulary {
        &self.vocabulary
    }

    pub fn numeric_names(&self) -> Vec<String> {
        NumericSlot::ALL
            .iter()
            .map(|slot| slot.name().to_string())
            .collect()
    }

    pub fn element_range(&self) -> Range<usize> {
        NumericSlot::ALL.len()..self.slots.len()
    }

    /// Vector index of an element's multi-hot slot, or `None` for elements outside
    /// the fitted vocabulary.
    pub fn element_position(&self, element: &str) -> Option<usize> {
        self.vocabulary
            .index_of(element)
            .map(|offset| NumericSlot::ALL.len() + offset)
    }
}

/// Slots of the target vector, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSlot {
    BandGap,
    Conductivity,
}

impl TargetSlot {
    pub const ALL: [TargetSlot; 2] = [Self::BandGap, Self::Conductivity];

    pub fn index(self) -> usize {
        match self {
            Self::BandGap => 0,
            Self::Conductivity => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BandGap => "Band Gap",
            Self::Conductivity => "Conductivity",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_slot_indices_match_declaration_order() {
        for (position, slot) in NumericSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), position);
        }
        for (position, slot) in TargetSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), position);
        }
    }

    #[test]
    fn layout_appends_elements_after_numeric_slots() {
        let layout = FeatureLayout::new(ElementVocabulary::from_symbols(["Zn", "O", "Ga"]));
        assert_eq!(layout.len(), 7);
        assert_eq!(layout.element_range(), 4..7);
        assert_eq!(layout.element_position("Ga"), Some(4));
        assert_eq!(layout.element_position("Zn"), Some(6));
        assert_eq!(layout.element_position("Cd"), None);

        let names: Vec<String> = layout.slots().iter().map(FeatureSlot::name).collect();
        assert_eq!(
            names,
            [
                "Temperature",
                "Pressure",
                "Crystal Structure",
                "Lattice Parameter",
                "element:Ga",
                "element:O",
                "element:Zn"
            ]
        );
    }
}
