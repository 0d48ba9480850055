//! Display units for measurements.
//!
//! Measurements are stored in canonical units (feet for distances, acres for
//! areas). These enums convert to and from whatever the operator has chosen
//! to look at.

#[cfg(test)]
#[path = "units_test.rs"]
mod units_test;

use serde::{Deserialize, Serialize};

use crate::consts::{HECTARES_PER_ACRE, METERS_PER_FOOT, SQ_FEET_PER_ACRE, SQ_METERS_PER_ACRE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Feet,
    Meters,
    Yards,
}

impl DistanceUnit {
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Feet => "ft",
            Self::Meters => "m",
            Self::Yards => "yd",
        }
    }

    /// Convert a value in feet into this unit.
    #[must_use]
    pub fn from_feet(self, feet: f64) -> f64 {
        match self {
            Self::Feet => feet,
            Self::Meters => feet * METERS_PER_FOOT,
            Self::Yards => feet / 3.0,
        }
    }

    /// Convert a value in this unit back into feet.
    #[must_use]
    pub fn to_feet(self, value: f64) -> f64 {
        match self {
            Self::Feet => value,
            Self::Meters => value / METERS_PER_FOOT,
            Self::Yards => value * 3.0,
        }
    }

    /// One decimal place plus the abbreviation, e.g. `"412.3 ft"`.
    #[must_use]
    pub fn format(self, feet: f64) -> String {
        format!("{:.1} {}", self.from_feet(feet), self.abbreviation())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    #[default]
    Acres,
    Hectares,
    SquareFeet,
    SquareMeters,
}

impl AreaUnit {
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Acres => "ac",
            Self::Hectares => "ha",
            Self::SquareFeet => "sq ft",
            Self::SquareMeters => "sq m",
        }
    }

    /// Convert a value in acres into this unit.
    #[must_use]
    pub fn from_acres(self, acres: f64) -> f64 {
        match self {
            Self::Acres => acres,
            Self::Hectares => acres * HECTARES_PER_ACRE,
            Self::SquareFeet => acres * SQ_FEET_PER_ACRE,
            Self::SquareMeters => acres * SQ_METERS_PER_ACRE,
        }
    }

    /// Convert a value in this unit back into acres.
    #[must_use]
    pub fn to_acres(self, value: f64) -> f64 {
        match self {
            Self::Acres => value,
            Self::Hectares => value / HECTARES_PER_ACRE,
            Self::SquareFeet => value / SQ_FEET_PER_ACRE,
            Self::SquareMeters => value / SQ_METERS_PER_ACRE,
        }
    }

    /// Two decimal places plus the abbreviation, e.g. `"3.06 ac"`.
    #[must_use]
    pub fn format(self, acres: f64) -> String {
        format!("{:.2} {}", self.from_acres(acres), self.abbreviation())
    }
}
