// 🏛️ Attribute Extractor - Registry record → matching tokens
// Turns a sparse registry description into the ordered list of descriptor
// tokens the fuzzy matcher scores catalog labels against.

use crate::record::{RecordField, VehicleRecord};
use crate::remodel::RemodelTable;
use crate::vin::DecodedVehicle;

/// Model years after this get a FWD/2WD default when drive type is unknown
const DRIVE_DEFAULT_AFTER_YEAR: u16 = 1990;

/// Truck payload classes and the numeric trim the catalog uses for them
const TRUCK_CLASSES: [(&str, &str); 3] = [
    ("1/2 ton", "1500"),
    ("3/4 ton", "2500"),
    ("1 ton", "3500"),
];

// ============================================================================
// EXTRACTOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct AttributeExtractor {
    remodel: RemodelTable,

    /// Makes whose trim/series text names a truck class ("1/2 ton")
    truck_class_makes: Vec<String>,
}

impl AttributeExtractor {
    pub fn new() -> Self {
        AttributeExtractor {
            remodel: RemodelTable::default(),
            truck_class_makes: ["Chevrolet", "GMC", "Dodge", "Ram"]
                .iter()
                .map(|make| make.to_string())
                .collect(),
        }
    }

    pub fn with_remodel(mut self, remodel: RemodelTable) -> Self {
        self.remodel = remodel;
        self
    }

    pub fn with_truck_class_make(mut self, make: impl Into<String>) -> Self {
        self.truck_class_makes.push(make.into());
        self
    }

    pub fn remodel(&self) -> &RemodelTable {
        &self.remodel
    }

    /// Registry model name rewritten into catalog spelling
    pub fn remodeled_model(
        &self,
        vehicle: &DecodedVehicle,
        record: &VehicleRecord,
    ) -> Option<String> {
        record
            .get(RecordField::Model)
            .map(|model| self.remodel.apply(&vehicle.make, model))
            .filter(|model| !model.is_empty())
    }

    /// Ordered descriptor tokens. Duplicates are kept; they add weight.
    pub fn extract(&self, vehicle: &DecodedVehicle, record: &VehicleRecord) -> Vec<String> {
        let mut tokens = Vec::new();

        if let Some(model) = self.remodeled_model(vehicle, record) {
            tokens.push(model);
        }

        self.push_drive(&mut tokens, vehicle, record);

        if let Some(trim) = record.get(RecordField::Trim) {
            tokens.extend(trim.split_whitespace().map(String::from));
            self.push_truck_class(&mut tokens, vehicle, trim);
        }

        if let Some(body) = record.get(RecordField::BodyClass) {
            tokens.extend(
                body.split('/')
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty())
                    .map(String::from),
            );
        }

        if let Some(doors) = record.get(RecordField::Doors) {
            tokens.push(format!("{}Dr", doors));
            tokens.push(format!("{}-Door", doors));
        }

        if let Some(series) = record.get(RecordField::Series) {
            self.push_series(&mut tokens, vehicle, series);
        }

        if let Some(series2) = record.get(RecordField::Series2) {
            tokens.push(series2.to_string());
            tokens.extend(
                series2
                    .split('/')
                    .flat_map(str::split_whitespace)
                    .filter(|word| *word != "AWD")
                    .map(String::from),
            );
        }

        if let Some(displacement) = record.get(RecordField::DisplacementL) {
            tokens.push(format!("{} L", displacement));
            if !displacement.contains('.') {
                tokens.push(format!("{}.0 L", displacement));
            }
        }

        if let Some(cylinders) = record.get(RecordField::EngineCylinders) {
            tokens.push(format!("{} cyl", cylinders));
        }

        let flex_fuel = [RecordField::FuelTypePrimary, RecordField::FuelTypeSecondary]
            .iter()
            .filter_map(|field| record.get(*field))
            .any(|fuel| fuel.contains("FFV") || fuel.contains("E85"));
        if flex_fuel {
            tokens.push("FFV".to_string());
        }

        if let Some(battery) = record.get(RecordField::BatteryKWh) {
            tokens.push(format!("{} kW-hr", battery));
        }

        if let Some(transmission) = record.get(RecordField::TransmissionStyle) {
            if transmission.contains("CVT") || transmission.contains("Continuously") {
                tokens.push("CVT".to_string());
                tokens.push("Variable".to_string());
            } else if transmission.contains("Manual") {
                tokens.push("MAN".to_string());
            } else {
                tokens.push("AUTO".to_string());
            }
        }

        if record.get(RecordField::Turbo).map_or(false, |turbo| turbo.contains("Yes")) {
            tokens.push("Turbo".to_string());
        }

        log::debug!("{}: {} attribute tokens {:?}", vehicle.vin, tokens.len(), tokens);
        tokens
    }

    // ========================================================================
    // STEPS
    // ========================================================================

    fn push_drive(
        &self,
        tokens: &mut Vec<String>,
        vehicle: &DecodedVehicle,
        record: &VehicleRecord,
    ) {
        let drive = record.get(RecordField::DriveType).unwrap_or("");

        let found: &[&str] = if drive.contains("AWD") {
            &["AWD"]
        } else if drive.contains("4WD") || drive.contains("4x4") {
            &["4WD"]
        } else if drive.contains("Front") || drive.contains("FWD") {
            &["FWD", "2WD"]
        } else if drive.contains("Rear") || drive.contains("RWD") {
            &["RWD", "2WD"]
        } else if drive.contains("4x2") || drive.contains("2WD") {
            &["2WD"]
        } else if vehicle.year.map_or(false, |year| year > DRIVE_DEFAULT_AFTER_YEAR) {
            &["FWD", "2WD"]
        } else {
            &[]
        };

        tokens.extend(found.iter().map(|token| token.to_string()));
    }

    fn push_truck_class(&self, tokens: &mut Vec<String>, vehicle: &DecodedVehicle, text: &str) {
        if !self.truck_class_makes.iter().any(|make| *make == vehicle.make) {
            return;
        }
        let lower = text.to_lowercase();
        if let Some((_, trim)) = TRUCK_CLASSES.iter().find(|(class, _)| lower.contains(class)) {
            tokens.push(trim.to_string());
        }
    }

    fn push_series(&self, tokens: &mut Vec<String>, vehicle: &DecodedVehicle, series: &str) {
        // A lone letter would match almost any label, so it has to stand alone
        if series.chars().count() == 1 {
            tokens.push(format!(" {} ", series));
            return;
        }

        // A one-word series comes out three times: raw, word and compact
        tokens.push(series.to_string());
        tokens.extend(series.split_whitespace().map(String::from));
        self.push_truck_class(tokens, vehicle, series);
        tokens.push(series.split_whitespace().collect());
    }
}

impl Default for AttributeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract with the default remodel table and truck-class makes
pub fn extract_attributes(vehicle: &DecodedVehicle, record: &VehicleRecord) -> Vec<String> {
    AttributeExtractor::default().extract(vehicle, record)
}

// ============================================================================
// TESTS
// ============================================================================
