//! Service packages: per-acre pricing and effort for a drawn work area.

#[cfg(test)]
#[path = "package_test.rs"]
mod package_test;

use serde::{Deserialize, Serialize};

/// Clearing intensity the operator quotes a drawn area at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServicePackage {
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
    Max,
}

/// Cost and time for one area under one package.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkEstimate {
    /// Dollars.
    pub cost: f64,
    pub hours: f64,
}

impl ServicePackage {
    pub const ALL: [Self; 5] = [Self::Small, Self::Medium, Self::Large, Self::XLarge, Self::Max];

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Small => "Understory Mulching",
            Self::Medium => "Standard Mulching",
            Self::Large => "Heavy Mulching",
            Self::XLarge => "Thick Brush",
            Self::Max => "Land Clearing",
        }
    }

    /// Dollars per acre.
    #[must_use]
    pub fn price_per_acre(self) -> f64 {
        match self {
            Self::Small => 800.0,
            Self::Medium => 1200.0,
            Self::Large => 1600.0,
            Self::XLarge => 2200.0,
            Self::Max => 3500.0,
        }
    }

    #[must_use]
    pub fn hours_per_acre(self) -> f64 {
        match self {
            Self::Small => 0.5,
            Self::Medium => 0.75,
            Self::Large => 1.0,
            Self::XLarge => 1.5,
            Self::Max => 2.5,
        }
    }

    #[must_use]
    pub fn estimate(self, acres: f64) -> WorkEstimate {
        WorkEstimate { cost: acres * self.price_per_acre(), hours: acres * self.hours_per_acre() }
    }
}

impl std::str::FromStr for ServicePackage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "xlarge" => Ok(Self::XLarge),
            "max" => Ok(Self::Max),
            other => Err(format!("unknown service package '{other}' (expected small, medium, large, xlarge, max)")),
        }
    }
}
