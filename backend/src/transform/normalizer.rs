//! Normalize source rows into the shelter type catalog and shelter list.
//!
//! ```text
//! Source rows                          →  Dataset
//! ┌──────────────────────────────┐       ┌──────────────────────────┐
//! │ 指定避難所, 千葉小学校, 35.6 │       │ shelterTypes:            │
//! │ 指定避難所, 千葉中学校, 35.7 │  →    │   0 指定避難所           │
//! │ 広域避難場所, 青葉の森, 35.5 │       │   1 広域避難場所         │
//! │ (empty),     稲毛公園,  35.6 │       │ shelters: 3 (1 dropped)  │
//! └──────────────────────────────┘       └──────────────────────────┘
//! ```
//!
//! Rows without a category or a facility name are dropped. Coordinates that
//! don't parse, or parse to an infinity, are kept as `NaN`.

use std::collections::HashMap;

use crate::models::{Coordinate, Dataset, Shelter, ShelterType};
use crate::parser::SourceRow;

/// A row that was left out of the shelter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 0-based index into the source rows
    pub row: usize,
    pub missing_fields: Vec<&'static str>,
}

/// What normalization had to work around
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    /// Rows dropped for a missing category or facility name
    pub skipped: Vec<SkippedRow>,
    /// Rows kept with a coordinate that didn't parse
    pub non_finite: Vec<usize>,
}

impl NormalizeReport {
    pub fn summary(&self) -> String {
        format!(
            "{} rows dropped, {} rows with unparseable coordinates",
            self.skipped.len(),
            self.non_finite.len()
        )
    }
}

/// Build both collections from the source rows.
pub fn normalize(rows: &[SourceRow]) -> (Dataset, NormalizeReport) {
    let shelter_types = extract_shelter_types(rows);
    let (shelters, report) = extract_shelters(rows, &shelter_types);

    (Dataset { shelters, shelter_types }, report)
}

/// Collect distinct categories in first-seen order.
///
/// The first description seen for a category wins.
pub fn extract_shelter_types(rows: &[SourceRow]) -> Vec<ShelterType> {
    let mut types: Vec<ShelterType> = Vec::new();

    for row in rows {
        let Some(category) = non_empty(&row.category) else {
            continue;
        };
        if types.iter().any(|t| t.name == category) {
            continue;
        }
        types.push(ShelterType {
            id: types.len() as u32,
            name: category.to_string(),
            description: row.category_definition.clone().unwrap_or_default(),
        });
    }

    types
}

/// Build the shelter list against an existing type catalog.
pub fn extract_shelters(
    rows: &[SourceRow],
    shelter_types: &[ShelterType],
) -> (Vec<Shelter>, NormalizeReport) {
    let index: HashMap<&str, u32> = shelter_types
        .iter()
        .map(|t| (t.name.as_str(), t.id))
        .collect();

    let mut report = NormalizeReport::default();
    let mut shelters = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let category = non_empty(&row.category);
        let name = non_empty(&row.facility_name);

        let (Some(category), Some(name)) = (category, name) else {
            let mut missing_fields = Vec::new();
            if category.is_none() {
                missing_fields.push("種別");
            }
            if name.is_none() {
                missing_fields.push("施設等の名称");
            }
            report.skipped.push(SkippedRow { row: i, missing_fields });
            continue;
        };

        // Present whenever the catalog was built from the same rows
        let Some(&type_id) = index.get(category) else {
            report.skipped.push(SkippedRow { row: i, missing_fields: vec!["種別"] });
            continue;
        };

        let coordinate = Coordinate::new(
            parse_coordinate(row.latitude.as_deref()),
            parse_coordinate(row.longitude.as_deref()),
        );
        if !coordinate.is_finite() {
            report.non_finite.push(i);
        }

        shelters.push(Shelter {
            type_id,
            name: name.to_string(),
            address: row.address.clone().unwrap_or_default(),
            postal_code: row.postal_code.clone().unwrap_or_default(),
            coordinate,
        });
    }

    (shelters, report)
}

/// Parse a decimal coordinate, `NaN` when absent, invalid or not finite.
///
/// `inf` and overflowing values like `1e400` would be written as `null`
/// and read back as `NaN`, so they are `NaN` from the start.
pub fn parse_coordinate(text: Option<&str>) -> f64 {
    text.map(str::trim)
        .and_then(|t| t.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, definition: &str, name: &str, lat: &str, lon: &str) -> SourceRow {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        SourceRow {
            category: opt(category),
            category_definition: opt(definition),
            facility_name: opt(name),
            address: Some("千葉市中央区千葉港1-1".to_string()),
            sub_address: None,
            latitude: opt(lat),
            longitude: opt(lon),
            postal_code: Some("260-8722".to_string()),
        }
    }

    #[test]
    fn test_example_rows() {
        let rows = vec![
            row("指定避難所", "災害時の避難先", "A", "35.6", "139.7"),
            row("", "", "B", "35.6", "139.7"),
        ];

        let (dataset, report) = normalize(&rows);

        assert_eq!(dataset.shelter_types.len(), 1);
        assert_eq!(dataset.shelter_types[0].name, "指定避難所");
        assert_eq!(dataset.shelters.len(), 1);
        assert_eq!(dataset.shelters[0].name, "A");
        assert_eq!(dataset.shelters[0].coordinate.latitude, 35.6);
        assert_eq!(dataset.shelters[0].coordinate.longitude, 139.7);
        assert_eq!(dataset.shelters[0].postal_code, "260-8722");
        assert_eq!(report.skipped, vec![SkippedRow { row: 1, missing_fields: vec!["種別"] }]);
    }

    #[test]
    fn test_duplicate_categories_first_description_wins() {
        let rows = vec![
            row("指定避難所", "first", "A", "35.6", "140.1"),
            row("指定緊急避難場所", "other", "B", "35.6", "140.1"),
            row("指定避難所", "second", "C", "35.6", "140.1"),
        ];

        let types = extract_shelter_types(&rows);

        assert_eq!(types.len(), 2);
        assert_eq!(types[0], ShelterType { id: 0, name: "指定避難所".into(), description: "first".into() });
        assert_eq!(types[1].id, 1);
        assert_eq!(types[1].name, "指定緊急避難場所");
    }

    #[test]
    fn test_every_type_reference_is_valid() {
        let rows = vec![
            row("c", "", "A", "1", "2"),
            row("a", "", "B", "1", "2"),
            row("b", "", "", "1", "2"),
            row("a", "", "C", "1", "2"),
            row("d", "", "D", "x", "2"),
        ];

        let (dataset, _) = normalize(&rows);

        for shelter in &dataset.shelters {
            let t = &dataset.shelter_types[shelter.type_id as usize];
            assert_eq!(t.id, shelter.type_id);
        }
        assert_eq!(dataset.shelters[1].type_id, 1);
        assert_eq!(dataset.shelters[2].type_id, 1);
    }

    #[test]
    fn test_rows_missing_name_or_category_are_dropped() {
        let rows = vec![
            row("指定避難所", "", "", "35.6", "140.1"),
            row("", "", "", "", ""),
            row("", "desc", "C", "35.6", "140.1"),
            SourceRow::default(),
        ];

        let (dataset, report) = normalize(&rows);

        assert!(dataset.shelters.is_empty());
        // A row with only a category still contributes a type
        assert_eq!(dataset.shelter_types.len(), 1);
        assert_eq!(report.skipped.len(), 4);
        assert_eq!(report.skipped[1].missing_fields, vec!["種別", "施設等の名称"]);
    }

    #[test]
    fn test_unparseable_coordinates_become_nan() {
        let rows = vec![row("指定避難所", "", "A", "北緯35度", "")];

        let (dataset, report) = normalize(&rows);

        assert_eq!(dataset.shelters.len(), 1);
        assert!(dataset.shelters[0].coordinate.latitude.is_nan());
        assert!(dataset.shelters[0].coordinate.longitude.is_nan());
        assert_eq!(report.non_finite, vec![0]);
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(Some("35.6073")), 35.6073);
        assert_eq!(parse_coordinate(Some(" 140.1 ")), 140.1);
        assert_eq!(parse_coordinate(Some("-0.5")), -0.5);
        assert!(parse_coordinate(Some("35,6")).is_nan());
        assert!(parse_coordinate(Some("")).is_nan());
        assert!(parse_coordinate(None).is_nan());
    }

    #[test]
    fn test_infinite_coordinates_become_nan() {
        assert!(parse_coordinate(Some("1e400")).is_nan());
        assert!(parse_coordinate(Some("-1e400")).is_nan());
        assert!(parse_coordinate(Some("inf")).is_nan());
        assert!(parse_coordinate(Some("Infinity")).is_nan());

        let (dataset, report) = normalize(&[row("指定避難所", "", "A", "1e400", "140.1")]);
        assert!(dataset.shelters[0].coordinate.latitude.is_nan());
        assert_eq!(dataset.shelters[0].coordinate.longitude, 140.1);
        assert_eq!(report.non_finite, vec![0]);
    }

    #[test]
    fn test_missing_address_fields_become_empty() {
        let mut source = row("指定避難所", "", "A", "35.6", "140.1");
        source.address = None;
        source.postal_code = None;

        let (dataset, _) = normalize(&[source]);

        assert_eq!(dataset.shelters[0].address, "");
        assert_eq!(dataset.shelters[0].postal_code, "");
    }
}
