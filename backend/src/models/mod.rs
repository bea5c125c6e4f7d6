//! Domain models for the published shelter API.
//!
//! - [`ShelterType`] - Category of evacuation facility
//! - [`Shelter`] - One facility with address and location
//! - [`Coordinate`] - Latitude/longitude pair
//! - [`PublishedArtifact`] - The versioned JSON document consumers download
//! - [`Dataset`] - The two collections derived from one source fetch
//!
//! Field names follow the published JSON exactly (camelCase).

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Shelter Type
// =============================================================================

/// Category label for an evacuation facility.
///
/// `id` is the position in the catalog, assigned in first-seen order. It is
/// only stable within one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShelterType {
    pub id: u32,
    pub name: String,
    pub description: String,
}

// =============================================================================
// Shelter
// =============================================================================

/// Location of a facility.
///
/// Unparseable source coordinates are kept as `NaN`. serde_json writes
/// non-finite floats as `null`, so `null` is read back as `NaN`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(deserialize_with = "nullable_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components are real numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Field-wise equality where two `NaN`s count as equal.
    pub fn same_as(&self, other: &Coordinate) -> bool {
        same_f64(self.latitude, other.latitude) && same_f64(self.longitude, other.longitude)
    }
}

fn same_f64(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// One evacuation facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    /// Index into the shelter type catalog
    #[serde(rename = "type")]
    pub type_id: u32,
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub coordinate: Coordinate,
}

impl Shelter {
    /// Deep equality on every field, coordinates included.
    pub fn same_as(&self, other: &Shelter) -> bool {
        self.type_id == other.type_id
            && self.name == other.name
            && self.address == other.address
            && self.postal_code == other.postal_code
            && self.coordinate.same_as(&other.coordinate)
    }
}

// =============================================================================
// Dataset & Artifact
// =============================================================================

/// Collections derived from one source fetch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub shelters: Vec<Shelter>,
    pub shelter_types: Vec<ShelterType>,
}

/// The published JSON document.
///
/// Read back as the previous generation, written as the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedArtifact {
    /// `"<major>.<minor>"`
    pub version: String,
    /// ISO-8601 UTC timestamp of the last content change
    pub updated_at: String,
    pub shelters: Vec<Shelter>,
    pub shelter_types: Vec<ShelterType>,
}

impl PublishedArtifact {
    pub fn new(version: String, updated_at: String, dataset: Dataset) -> Self {
        Self {
            version,
            updated_at,
            shelters: dataset.shelters,
            shelter_types: dataset.shelter_types,
        }
    }
}
