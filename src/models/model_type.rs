use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

/// The four sustainability models served by the API.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelType {
    Packaging,
    Carbon,
    Product,
    Esg,
}

impl ModelType {
    /// Parses a wire value, rejecting anything outside the fixed set.
    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        Self::from_str(value)
            .map_err(|_| ServiceError::ValidationError(format!("Invalid model type: {}", value)))
    }

    /// All model types in their canonical order.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_wire_values() {
        assert_eq!(ModelType::parse("esg").unwrap(), ModelType::Esg);
        assert_eq!(ModelType::parse("packaging").unwrap(), ModelType::Packaging);
        assert_eq!(ModelType::Carbon.to_string(), "carbon");
    }

    #[test]
    fn rejects_unknown_model_type() {
        let err = ModelType::parse("weather").unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
        assert!(ModelType::parse("ESG").is_err());
    }

    #[test]
    fn all_lists_four_models() {
        assert_eq!(
            ModelType::all(),
            vec![
                ModelType::Packaging,
                ModelType::Carbon,
                ModelType::Product,
                ModelType::Esg
            ]
        );
    }
}
