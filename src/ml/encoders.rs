//! Categorical vocabularies accepted by the models.
//!
//! Values are matched exactly (case-sensitive). [`encode`] falls back to the
//! first entry of a vocabulary for anything unknown; [`parse`] keeps the
//! distinction for checks that must not fire on unknown values.

use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum MaterialType {
    #[default]
    Glass,
    Plastic,
    Metal,
    Ceramic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum Fragility {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum Recyclable {
    #[default]
    No,
    Yes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum TransportMode {
    #[default]
    Land,
    Air,
    Sea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum PackagingPreference {
    #[default]
    Cardboard,
    Plastic,
    Biodegradable,
}

impl PackagingPreference {
    /// kg CO2 per purchase for this packaging
    pub fn emission_factor(self) -> f64 {
        match self {
            Self::Biodegradable => 0.5,
            Self::Cardboard => 1.2,
            Self::Plastic => 2.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Positive => 1.2,
            Self::Negative => 0.8,
            Self::Neutral => 1.0,
        }
    }
}

/// Exact match against a vocabulary, `None` when unknown.
pub fn parse<T: FromStr>(value: &str) -> Option<T> {
    T::from_str(value).ok()
}

/// Exact match against a vocabulary, falling back to its default entry.
pub fn encode<T: FromStr + Default>(value: &str) -> T {
    parse(value).unwrap_or_default()
}
