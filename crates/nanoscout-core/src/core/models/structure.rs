use std::fmt;

/// Crystal structures tried for every generated composition, in iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureHypothesis {
    Wurtzite,
    ZincBlende,
    Hexagonal,
    Cubic,
}

impl StructureHypothesis {
    /// The fixed hypothesis set. Order matters: ties are resolved in favor of the
    /// hypothesis that appears first here.
    pub const ALL: [StructureHypothesis; 4] = [
        Self::Wurtzite,
        Self::ZincBlende,
        Self::Hexagonal,
        Self::Cubic,
    ];

    /// The label used for this structure in the dataset's `Crystal Structure` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Wurtzite => "Wurtzite",
            Self::ZincBlende => "Zinc Blende",
            Self::Hexagonal => "Hexagonal",
            Self::Cubic => "Cubic",
        }
    }
}

impl fmt::Display for StructureHypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
