// VIN Reconciler - Core Library
// Decodes VINs and matches them to fuel-economy catalog entries

pub mod error;
pub mod checksum;
pub mod tables;         // Reference tables: WMI, year codes, regions
pub mod vin;
pub mod rules;          // Make override chain
pub mod record;         // Registry records
pub mod remodel;        // Registry → catalog model spelling
pub mod attributes;     // Record → matching tokens
pub mod matcher;        // Fuzzy label matching
pub mod catalog;
pub mod reconciliation; // Decode + extract + match pipeline

// Re-export commonly used types
pub use error::VinError;
pub use checksum::{check_digit, is_vin_char, transliterate};
pub use tables::Region;
pub use vin::{DecodedVehicle, ValidityIssue, Vin};
pub use rules::{strip_market_suffixes, MakeRule, MakeRuleChain};
pub use record::{RecordField, VehicleRecord};
pub use remodel::{RemodelRule, RemodelTable};
pub use attributes::{extract_attributes, AttributeExtractor};
pub use matcher::{fuzzy_match, score_label, Candidate, FuzzyMatcher, MatchResult};
pub use catalog::{Catalog, CatalogEntry, CsvCatalog};
pub use reconciliation::{
    MatchOutcome, Reconciler, ReconcilerConfig, ReconciliationReport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
