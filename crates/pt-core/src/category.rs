//! The closed set of component categories a power-train graph is built from.

use core::fmt;
use core::str::FromStr;

use crate::error::PtError;

/// Category of a component type.
///
/// The category drives the cross-cutting views (which instances consume
/// energy) and which instances may take part in an equilibrium cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Category {
    Source,
    Storage,
    Bus,
    Converter,
    MechanicalLink,
    Load,
    Propulsor,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Source,
        Category::Storage,
        Category::Bus,
        Category::Converter,
        Category::MechanicalLink,
        Category::Load,
        Category::Propulsor,
    ];

    /// Snake-case name, as used in descriptions and generated variable names.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Source => "source",
            Category::Storage => "storage",
            Category::Bus => "bus",
            Category::Converter => "converter",
            Category::MechanicalLink => "mechanical_link",
            Category::Load => "load",
            Category::Propulsor => "propulsor",
        }
    }

    /// Sources and storage are the instances whose consumption is aggregated.
    pub fn consumes_energy(self) -> bool {
        matches!(self, Category::Source | Category::Storage)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = PtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| PtError::UnknownCategory(s.to_string()))
    }
}
