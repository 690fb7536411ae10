// ⚖️ Reconciliation Pipeline - VIN + registry record → catalog entry
// Decode, extract attribute tokens, pick the catalog model, then its option.
//
// Ambiguity is a result, not an error: the report says which stage stopped
// short and why.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::attributes::AttributeExtractor;
use crate::catalog::{Catalog, CatalogEntry};
use crate::matcher::{Candidate, FuzzyMatcher, MatchResult};
use crate::record::VehicleRecord;
use crate::vin::Vin;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Catalog years to try, relative to the decoded model year, in order.
    /// The catalog can lag the newest model year.
    #[serde(default = "default_year_offsets")]
    pub year_offsets: Vec<i32>,

    /// Model labels must contain the registry model name (retried without
    /// it when nothing matches)
    #[serde(default = "default_require_model_substring")]
    pub require_model_substring: bool,
}

fn default_year_offsets() -> Vec<i32> {
    vec![0, -1]
}

fn default_require_model_substring() -> bool {
    true
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        ReconcilerConfig {
            year_offsets: default_year_offsets(),
            require_model_substring: default_require_model_substring(),
        }
    }
}

impl ReconcilerConfig {
    /// Load config from JSON file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read reconciler config: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse reconciler config JSON")
    }
}

// ============================================================================
// MATCH OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Exactly one candidate won
    Unique { id: String, label: String },

    /// Several candidates tied on score and label length
    Ambiguous { ids: Vec<String> },

    /// Nothing scored, or the stage never ran
    NoMatch,
}

impl MatchOutcome {
    pub fn from_result(result: &MatchResult, candidates: &[Candidate]) -> Self {
        match result.ids.as_slice() {
            [] => MatchOutcome::NoMatch,
            [id] => {
                let label = candidates
                    .iter()
                    .find(|candidate| candidate.id == *id)
                    .map(|candidate| candidate.label.clone())
                    .unwrap_or_default();
                MatchOutcome::Unique {
                    id: id.clone(),
                    label,
                }
            }
            ids => MatchOutcome::Ambiguous { ids: ids.to_vec() },
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, MatchOutcome::Unique { .. })
    }

    pub fn unique_id(&self) -> Option<&str> {
        match self {
            MatchOutcome::Unique { id, .. } => Some(id),
            _ => None,
        }
    }
}

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub vin: String,
    pub make: String,

    /// Decoded model year
    pub year: Option<u16>,

    /// Catalog year the models came from
    pub year_used: Option<u16>,

    pub attributes: Vec<String>,
    pub model: MatchOutcome,
    pub trim: MatchOutcome,

    /// Catalog row for a unique trim
    pub entry: Option<CatalogEntry>,

    pub catalog_source: String,
    pub reconciled_at: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn is_resolved(&self) -> bool {
        self.trim.is_unique()
    }

    pub fn summary(&self) -> String {
        let describe = |outcome: &MatchOutcome| match outcome {
            MatchOutcome::Unique { label, .. } => format!("'{}'", label),
            MatchOutcome::Ambiguous { ids } => format!("{} tied", ids.len()),
            MatchOutcome::NoMatch => "no match".to_string(),
        };
        format!(
            "Reconciliation for {} ({} {}): model {}, trim {}, catalog year {}",
            self.vin,
            self.year.map_or("?".to_string(), |y| y.to_string()),
            self.make,
            describe(&self.model),
            describe(&self.trim),
            self.year_used.map_or("-".to_string(), |y| y.to_string()),
        )
    }
}

// ============================================================================
// RECONCILER
// ============================================================================

pub struct Reconciler {
    config: ReconcilerConfig,
    extractor: AttributeExtractor,
    matcher: FuzzyMatcher,
}

impl Reconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Reconciler {
            config,
            extractor: AttributeExtractor::default(),
            matcher: FuzzyMatcher::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: AttributeExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Match one vehicle into the catalog. Only catalog failures are errors.
    pub fn reconcile(
        &self,
        vin: &Vin,
        record: &VehicleRecord,
        catalog: &dyn Catalog,
    ) -> Result<ReconciliationReport> {
        let vehicle = vin.decode();

        let mut record = record.clone();
        record.fill_missing_decodes(vin);

        let attributes = self.extractor.extract(&vehicle, &record);
        let model_name = self.extractor.remodeled_model(&vehicle, &record);

        let mut report = ReconciliationReport {
            vin: vehicle.vin.clone(),
            make: vehicle.make.clone(),
            year: vehicle.year,
            year_used: None,
            attributes,
            model: MatchOutcome::NoMatch,
            trim: MatchOutcome::NoMatch,
            entry: None,
            catalog_source: catalog.source().to_string(),
            reconciled_at: Utc::now(),
        };

        let Some(year) = vehicle.year else {
            log::debug!("{}: no model year, skipping catalog", vehicle.vin);
            return Ok(report);
        };

        let Some((year_used, models)) = self.find_models(catalog, year, &vehicle.make)? else {
            log::debug!("{}: catalog has no {} models near {}", vehicle.vin, vehicle.make, year);
            return Ok(report);
        };
        report.year_used = Some(year_used);

        // Model stage
        let must_contain = model_name
            .as_deref()
            .filter(|_| self.config.require_model_substring);
        let mut result = self.matcher.best(must_contain, &report.attributes, &models);
        if result.is_empty() && must_contain.is_some() {
            log::debug!(
                "{}: no model label contains {:?}, retrying open",
                vehicle.vin,
                must_contain
            );
            result = self.matcher.best(None, &report.attributes, &models);
        }
        report.model = MatchOutcome::from_result(&result, &models);

        // Trim stage
        if let MatchOutcome::Unique { id: model, .. } = &report.model {
            let options = catalog
                .options(year_used, &vehicle.make, model)
                .with_context(|| {
                    format!(
                        "Failed to fetch options for {} {} {}",
                        year_used, vehicle.make, model
                    )
                })?;
            let result = self.matcher.best(None, &report.attributes, &options);
            report.trim = MatchOutcome::from_result(&result, &options);
        }

        report.entry = report.trim.unique_id().and_then(|id| catalog.entry(id));

        log::info!("{}", report.summary());
        Ok(report)
    }

    /// First year offset whose model list is non-empty
    fn find_models(
        &self,
        catalog: &dyn Catalog,
        year: u16,
        make: &str,
    ) -> Result<Option<(u16, Vec<Candidate>)>> {
        for offset in &self.config.year_offsets {
            let Some(try_year) = i32::from(year)
                .checked_add(*offset)
                .and_then(|y| u16::try_from(y).ok())
            else {
                continue;
            };
            let models = catalog
                .models(try_year, make)
                .with_context(|| format!("Failed to fetch models for {} {}", try_year, make))?;
            if !models.is_empty() {
                if try_year != year {
                    log::debug!("{} {}: using catalog year {}", make, year, try_year);
                }
                return Ok(Some((try_year, models)));
            }
        }
        Ok(None)
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcilerConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CsvCatalog;
    use crate::record::RecordField;
    use std::io::Write;

    const CIVIC_CATALOG: &str = "\
id,year,make,model,trim,city_mpg,highway_mpg,co2_tailpipe_gpm
36801,2016,Honda,Civic,Auto (variable gears) 4 cyl 2.0 L,31,41,250
36802,2016,Honda,Civic,Auto (variable gears) 4 cyl 1.5 L Turbo,31,42,245
36803,2016,Honda,Civic,Man 6-spd 4 cyl 2.0 L,27,40,272
36810,2016,Honda,Accord,Auto (variable gears) 4 cyl 2.4 L,27,37,
36900,2015,Ford,Fusion FWD,Auto (S6) 4 cyl 2.5 L,22,34,
36901,2015,Ford,Fusion AWD,Auto (S6) 4 cyl 2.0 L Turbo,22,31,
";

    fn catalog() -> CsvCatalog {
        CsvCatalog::from_reader(CIVIC_CATALOG.as_bytes()).unwrap()
    }

    fn civic_record() -> VehicleRecord {
        let mut record = VehicleRecord::new();
        record.set(RecordField::Make, "HONDA");
        record.set(RecordField::Model, "Civic");
        record.set(RecordField::DisplacementL, "1.5");
        record.set(RecordField::EngineCylinders, "4");
        record.set(RecordField::TransmissionStyle, "Continuously Variable Transmission (CVT)");
        record
    }

    #[test]
    fn test_civic_turbo_resolves() {
        // FC1 line: the registry leaves Turbo blank, filled in before extraction
        let vin = Vin::new("19XFC1F7XGE028370");
        let report = Reconciler::default()
            .reconcile(&vin, &civic_record(), &catalog())
            .unwrap();

        assert_eq!(report.year_used, Some(2016));
        assert_eq!(
            report.model,
            MatchOutcome::Unique {
                id: "Civic".to_string(),
                label: "Civic".to_string()
            }
        );
        assert_eq!(report.trim.unique_id(), Some("36802"));
        assert!(report.is_resolved());
        assert_eq!(report.entry.as_ref().unwrap().highway_mpg, Some(42.0));
        assert!(report.attributes.contains(&"Turbo".to_string()));
    }

    #[test]
    fn test_falls_back_to_previous_catalog_year() {
        // 2016 Fusion, catalog only has 2015
        let vin = Vin::new("3FA6P0K95GR305754");
        let mut record = VehicleRecord::new();
        record.set(RecordField::Model, "Fusion");
        record.set(RecordField::DriveType, "AWD/All-Wheel Drive");

        let report = Reconciler::default().reconcile(&vin, &record, &catalog()).unwrap();
        assert_eq!(report.year, Some(2016));
        assert_eq!(report.year_used, Some(2015));
        assert_eq!(report.model.unique_id(), Some("Fusion AWD"));
    }

    #[test]
    fn test_no_year_offsets_left_means_no_match() {
        let vin = Vin::new("3FA6P0K95GR305754");
        let config = ReconcilerConfig {
            year_offsets: vec![0],
            require_model_substring: true,
        };
        let report = Reconciler::new(config)
            .reconcile(&vin, &VehicleRecord::new(), &catalog())
            .unwrap();
        assert_eq!(report.year_used, None);
        assert_eq!(report.model, MatchOutcome::NoMatch);
        assert_eq!(report.trim, MatchOutcome::NoMatch);
        assert!(!report.is_resolved());
    }

    #[test]
    fn test_out_of_range_year_offsets_are_skipped() {
        let vin = Vin::new("19XFC1F7XGE028370");
        let config = ReconcilerConfig {
            year_offsets: vec![i32::MAX, i32::MIN, -3000, 0],
            require_model_substring: true,
        };
        let report = Reconciler::new(config)
            .reconcile(&vin, &civic_record(), &catalog())
            .unwrap();
        assert_eq!(report.year_used, Some(2016));
        assert_eq!(report.model.unique_id(), Some("Civic"));

        let config: ReconcilerConfig =
            serde_json::from_str(r#"{"year_offsets":[2147483647]}"#).unwrap();
        let report = Reconciler::new(config)
            .reconcile(&vin, &civic_record(), &catalog())
            .unwrap();
        assert_eq!(report.year_used, None);
        assert_eq!(report.model, MatchOutcome::NoMatch);
    }

    #[test]
    fn test_unknown_year_yields_no_match() {
        // Position 10 'U' has no model year
        let vin = Vin::new("19XFC2F58UE223856");
        assert_eq!(vin.year(), None);
        let report = Reconciler::default()
            .reconcile(&vin, &civic_record(), &catalog())
            .unwrap();
        assert_eq!(report.model, MatchOutcome::NoMatch);
        assert_eq!(report.year_used, None);
    }

    #[test]
    fn test_model_substring_retry() {
        // Registry says "Civic Hybrid"; no label contains it, open retry finds Civic
        let vin = Vin::new("19XFC2F58GE223856");
        let mut record = VehicleRecord::new();
        record.set(RecordField::Model, "Civic Hybrid");
        record.set(RecordField::Trim, "Civic");

        let report = Reconciler::default().reconcile(&vin, &record, &catalog()).unwrap();
        assert_eq!(report.model.unique_id(), Some("Civic"));
    }

    #[test]
    fn test_ambiguous_trim_is_not_an_error() {
        // Same score, same label length
        let data = "\
id,year,make,model,trim,city_mpg,highway_mpg,co2_tailpipe_gpm
1,2016,Honda,Civic,4 cyl A,,,
2,2016,Honda,Civic,4 cyl B,,,
";
        let catalog = CsvCatalog::from_reader(data.as_bytes()).unwrap();
        let vin = Vin::new("19XFC2F58GE223856");
        let mut record = VehicleRecord::new();
        record.set(RecordField::Model, "Civic");
        record.set(RecordField::EngineCylinders, "4");

        let report = Reconciler::default().reconcile(&vin, &record, &catalog).unwrap();
        assert!(report.model.is_unique());
        assert_eq!(
            report.trim,
            MatchOutcome::Ambiguous {
                ids: vec!["1".to_string(), "2".to_string()]
            }
        );
        assert!(report.entry.is_none());
    }

    struct FailingCatalog;

    impl Catalog for FailingCatalog {
        fn models(&self, _year: u16, _make: &str) -> Result<Vec<Candidate>> {
            Err(anyhow::anyhow!("catalog service unavailable"))
        }

        fn options(&self, _year: u16, _make: &str, _model: &str) -> Result<Vec<Candidate>> {
            Ok(Vec::new())
        }

        fn entry(&self, _id: &str) -> Option<CatalogEntry> {
            None
        }
    }

    #[test]
    fn test_catalog_errors_propagate_with_context() {
        let vin = Vin::new("19XFC2F58GE223856");
        let err = Reconciler::default()
            .reconcile(&vin, &civic_record(), &FailingCatalog)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to fetch models for 2016 Honda"));
        assert_eq!(err.root_cause().to_string(), "catalog service unavailable");
    }

    #[test]
    fn test_config_from_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"year_offsets": [0, -1, 1]}}"#).unwrap();

        let config = ReconcilerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.year_offsets, vec![0, -1, 1]);
        assert!(config.require_model_substring);

        assert!(ReconcilerConfig::from_file("/nonexistent/config.json").is_err());
    }

    #[test]
    fn test_report_summary() {
        let vin = Vin::new("19XFC1F7XGE028370");
        let report = Reconciler::default()
            .reconcile(&vin, &civic_record(), &catalog())
            .unwrap();
        let summary = report.summary();
        assert!(summary.contains("19XFC1F7XGE028370"));
        assert!(summary.contains("2016 Honda"));
        assert!(summary.contains("1.5 L Turbo"));
    }
}
