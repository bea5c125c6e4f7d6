//! JSON Schema validation of the published artifact.
//!
//! The schema (draft 7) is embedded at compile time from
//! `schemas/shelters-artifact.json`. Consumers of the static API rely on the
//! exact field names and nesting it describes, so every artifact is checked
//! before it is written.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use shelters::validation::validate_artifact_value;
//!
//! let artifact = json!({
//!     "version": "1.0",
//!     "updatedAt": "2024-01-01T00:00:00.000Z",
//!     "shelters": [],
//!     "shelterTypes": []
//! });
//! assert!(validate_artifact_value(&artifact).is_ok());
//! ```

use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::models::PublishedArtifact;

const ARTIFACT_SCHEMA: &str = include_str!("../../schemas/shelters-artifact.json");

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check: true when `data` matches `schema`.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// The embedded artifact schema.
pub fn artifact_schema() -> ValidationResult<Value> {
    serde_json::from_str(ARTIFACT_SCHEMA).map_err(|e| ValidationError::InvalidSchema(e.to_string()))
}

/// Validate raw JSON (e.g. a file on disk) against the artifact schema.
pub fn validate_artifact_value(data: &Value) -> ValidationResult<()> {
    let schema = artifact_schema()?;
    validate(&schema, data).map_err(|errors| ValidationError::SchemaError { errors })
}

/// Validate an artifact about to be published.
pub fn validate_artifact(artifact: &PublishedArtifact) -> ValidationResult<()> {
    let data = serde_json::to_value(artifact)?;
    validate_artifact_value(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Dataset, Shelter, ShelterType};
    use serde_json::json;

    fn artifact() -> PublishedArtifact {
        PublishedArtifact::new(
            "1.2".to_string(),
            "2024-01-01T00:00:00.000Z".to_string(),
            Dataset {
                shelters: vec![Shelter {
                    type_id: 0,
                    name: "千葉小学校".to_string(),
                    address: "千葉市中央区".to_string(),
                    postal_code: "260-0001".to_string(),
                    coordinate: Coordinate::new(35.6, f64::NAN),
                }],
                shelter_types: vec![ShelterType {
                    id: 0,
                    name: "指定避難所".to_string(),
                    description: String::new(),
                }],
            },
        )
    }

    #[test]
    fn test_schema_loads() {
        let schema = artifact_schema().unwrap();
        assert!(schema.get("properties").is_some());
    }

    #[test]
    fn test_valid_artifact() {
        // NaN serializes as null, which the schema allows
        assert!(validate_artifact(&artifact()).is_ok());
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut bad = artifact();
        bad.version = "1".to_string();
        assert!(validate_artifact(&bad).is_err());
    }

    #[test]
    fn test_wrong_field_names_rejected() {
        let data = json!({
            "version": "1.0",
            "updated_at": "2024-01-01T00:00:00.000Z",
            "shelters": [],
            "shelterTypes": []
        });
        let err = validate_artifact_value(&data).unwrap_err();
        match err {
            ValidationError::SchemaError { errors } => assert!(!errors.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_is_valid() {
        let schema = artifact_schema().unwrap();
        let data = serde_json::to_value(artifact()).unwrap();
        assert!(is_valid(&schema, &data));
        assert!(!is_valid(&schema, &json!({ "version": "1.0" })));
    }
}
