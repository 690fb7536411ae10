// 📋 Registry Records - Sparse vehicle descriptions
// Field names and presence vary by manufacturer; nothing here is required.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::vin::Vin;

// ============================================================================
// RECOGNIZED FIELDS
// ============================================================================

/// Registry fields the attribute extractor reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordField {
    Make,
    Model,
    DriveType,
    Trim,
    BodyClass,
    Doors,
    Series,
    Series2,
    DisplacementL,
    EngineCylinders,
    FuelTypePrimary,
    FuelTypeSecondary,
    BatteryKWh,
    TransmissionStyle,
    Turbo,
}

impl RecordField {
    pub const ALL: [RecordField; 15] = [
        RecordField::Make,
        RecordField::Model,
        RecordField::DriveType,
        RecordField::Trim,
        RecordField::BodyClass,
        RecordField::Doors,
        RecordField::Series,
        RecordField::Series2,
        RecordField::DisplacementL,
        RecordField::EngineCylinders,
        RecordField::FuelTypePrimary,
        RecordField::FuelTypeSecondary,
        RecordField::BatteryKWh,
        RecordField::TransmissionStyle,
        RecordField::Turbo,
    ];

    /// Key as the registry spells it
    pub fn key(&self) -> &'static str {
        match self {
            RecordField::Make => "Make",
            RecordField::Model => "Model",
            RecordField::DriveType => "DriveType",
            RecordField::Trim => "Trim",
            RecordField::BodyClass => "BodyClass",
            RecordField::Doors => "Doors",
            RecordField::Series => "Series",
            RecordField::Series2 => "Series2",
            RecordField::DisplacementL => "DisplacementL",
            RecordField::EngineCylinders => "EngineCylinders",
            RecordField::FuelTypePrimary => "FuelTypePrimary",
            RecordField::FuelTypeSecondary => "FuelTypeSecondary",
            RecordField::BatteryKWh => "BatteryKWh",
            RecordField::TransmissionStyle => "TransmissionStyle",
            RecordField::Turbo => "Turbo",
        }
    }

    pub fn from_key(key: &str) -> Option<RecordField> {
        RecordField::ALL.iter().copied().find(|field| field.key() == key)
    }
}

// ============================================================================
// VEHICLE RECORD
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    fields: HashMap<String, String>,
}

impl VehicleRecord {
    pub fn new() -> Self {
        VehicleRecord::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn set(&mut self, field: RecordField, value: impl Into<String>) {
        self.insert(field.key(), value);
    }

    /// Trimmed value of a recognized field. Empty and whitespace-only values
    /// count as absent.
    pub fn get(&self, field: RecordField) -> Option<&str> {
        self.get_key(field.key())
    }

    pub fn get_key(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a registry decode response: `{"Results": [{ "Make": "...", ... }]}`.
    /// Only the first result is used. Nulls become empty strings, other
    /// scalars their JSON text.
    pub fn from_registry_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).context("Failed to parse registry JSON")?;

        let first = value
            .get("Results")
            .and_then(|results| results.as_array())
            .ok_or_else(|| anyhow!("registry response has no Results array"))?
            .first()
            .ok_or_else(|| anyhow!("registry response has an empty Results array"))?;

        let object = first
            .as_object()
            .ok_or_else(|| anyhow!("registry result is not an object"))?;

        let fields = object
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s.trim_end().to_string(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect();

        Ok(VehicleRecord { fields })
    }

    /// Fill in decodes the registry is known to leave blank.
    ///
    /// Honda does not report the turbo flag for the Civic 1.5 L turbo,
    /// which it codes as FC1/FC3 at positions 4-6.
    pub fn fill_missing_decodes(&mut self, vin: &Vin) {
        let is_honda = self
            .get(RecordField::Make)
            .map_or(false, |make| make.eq_ignore_ascii_case("HONDA"));

        if is_honda && self.get(RecordField::Turbo).is_none() {
            let line: String = vin.vds().chars().take(3).collect();
            if line == "FC1" || line == "FC3" {
                log::debug!("{}: filling Turbo=Yes for Honda line {}", vin, line);
                self.set(RecordField::Turbo, "Yes");
            }
        }
    }
}

impl FromIterator<(String, String)> for VehicleRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        VehicleRecord {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<String, String>> for VehicleRecord {
    fn from(fields: HashMap<String, String>) -> Self {
        VehicleRecord { fields }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_round_trip() {
        for field in RecordField::ALL {
            assert_eq!(RecordField::from_key(field.key()), Some(field));
        }
        assert_eq!(RecordField::from_key("ErrorCode"), None);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let mut record = VehicleRecord::new();
        record.set(RecordField::Trim, "   ");
        record.set(RecordField::Series, "");
        record.set(RecordField::Model, " Civic ");

        assert_eq!(record.get(RecordField::Trim), None);
        assert_eq!(record.get(RecordField::Series), None);
        assert_eq!(record.get(RecordField::Doors), None);
        assert_eq!(record.get(RecordField::Model), Some("Civic"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_from_registry_json() {
        let json = r#"{
            "Count": 1,
            "Results": [{
                "Make": "HONDA",
                "Model": "Civic ",
                "Doors": 4,
                "Turbo": null,
                "DisplacementL": "1.5"
            }]
        }"#;
        let record = VehicleRecord::from_registry_json(json).unwrap();
        assert_eq!(record.get(RecordField::Make), Some("HONDA"));
        assert_eq!(record.get_key("Model"), Some("Civic"));
        assert_eq!(record.get(RecordField::Doors), Some("4"));
        assert_eq!(record.get(RecordField::Turbo), None);
        assert_eq!(record.get(RecordField::DisplacementL), Some("1.5"));
    }

    #[test]
    fn test_from_registry_json_rejects_malformed() {
        assert!(VehicleRecord::from_registry_json("not json").is_err());
        assert!(VehicleRecord::from_registry_json(r#"{"Count": 0}"#).is_err());
        assert!(VehicleRecord::from_registry_json(r#"{"Results": []}"#).is_err());
        assert!(VehicleRecord::from_registry_json(r#"{"Results": ["x"]}"#).is_err());
    }

    #[test]
    fn test_honda_turbo_fill() {
        let vin = Vin::new("19XFC1F7XGE028370");
        let mut record: VehicleRecord = [("Make".to_string(), "HONDA".to_string())]
            .into_iter()
            .collect();
        record.fill_missing_decodes(&vin);
        assert_eq!(record.get(RecordField::Turbo), Some("Yes"));
    }

    #[test]
    fn test_honda_turbo_fill_leaves_other_lines_alone() {
        // FC2 is the naturally aspirated Civic
        let vin = Vin::new("19XFC2F58GE223856");
        let mut record = VehicleRecord::new();
        record.set(RecordField::Make, "HONDA");
        record.fill_missing_decodes(&vin);
        assert_eq!(record.get(RecordField::Turbo), None);

        // Reported value wins
        let vin = Vin::new("19XFC1F7XGE028370");
        let mut record = VehicleRecord::new();
        record.set(RecordField::Make, "HONDA");
        record.set(RecordField::Turbo, "No");
        record.fill_missing_decodes(&vin);
        assert_eq!(record.get(RecordField::Turbo), Some("No"));
    }
}
