use phf::phf_map;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Conductivity {
    Low,
    Moderate,
    High,
}

static CONDUCTIVITY_BY_NAME: phf::Map<&'static str, Conductivity> = phf_map! {
    "Low" => Conductivity::Low,
    "Moderate" => Conductivity::Moderate,
    "High" => Conductivity::High,
};

impl Conductivity {
    /// Looks up a category by its exact dataset spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        CONDUCTIVITY_BY_NAME.get(name).copied()
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Moderate => 2,
            Self::High => 3,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            1 => Some(Self::Low),
            2 => Some(Self::Moderate),
            3 => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Conductivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounds a decoded conductivity value onto the ordinal scale.
///
/// Halves round down, so `(0.5, 1.5]` maps to 1, `(1.5, 2.5]` to 2 and so on.
/// Non-finite inputs have no ordinal.
pub fn round_ordinal(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    Some((value - 0.5).ceil() as i64)
}

/// A conductivity class recovered from a model prediction.
///
/// Predictions that round outside the ordinal scale are a legitimate outcome of model
/// uncertainty and are carried as [`ConductivityLabel::Unknown`] rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConductivityLabel {
    Known(Conductivity),
    Unknown,
}

impl ConductivityLabel {
    pub fn from_decoded(value: f64) -> Self {
        round_ordinal(value)
            .and_then(Conductivity::from_ordinal)
            .map_or(Self::Unknown, Self::Known)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Known(level) => level.as_str(),
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConductivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
