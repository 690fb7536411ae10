// 📚 Catalog - The fuel-economy catalog the decoded vehicle is matched into
// The trait is the seam for any catalog backend; CsvCatalog reads a local export.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::matcher::Candidate;

// ============================================================================
// CORE TYPES
// ============================================================================

/// One catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub year: u16,
    pub make: String,
    pub model: String,
    pub trim: String,

    #[serde(default)]
    pub city_mpg: Option<f64>,

    #[serde(default)]
    pub highway_mpg: Option<f64>,

    /// Tailpipe CO2, grams per mile
    #[serde(default)]
    pub co2_tailpipe_gpm: Option<f64>,
}

/// Catalog - menu-style access: models for a year and make, then the
/// options (trims) of one model.
pub trait Catalog: Send + Sync {
    /// Model labels for a year and make. Candidate id is the label itself.
    fn models(&self, year: u16, make: &str) -> Result<Vec<Candidate>>;

    /// Options of one model. Candidate id is the entry id, label the trim.
    fn options(&self, year: u16, make: &str, model: &str) -> Result<Vec<Candidate>>;

    /// Full entry for an option id
    fn entry(&self, id: &str) -> Option<CatalogEntry>;

    /// Where the data came from (for reports and logs)
    fn source(&self) -> &str {
        "catalog"
    }
}

// ============================================================================
// CSV CATALOG
// ============================================================================

/// Catalog loaded from CSV with header
/// `id,year,make,model,trim,city_mpg,highway_mpg,co2_tailpipe_gpm`.
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<String, usize>,
    by_make_model_year: HashMap<String, usize>,
    source: String,
}

impl CsvCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())
            .with_context(|| format!("Failed to open catalog CSV: {:?}", path.as_ref()))?;
        let mut catalog = CsvCatalog::from_reader(file)?;
        catalog.source = path.as_ref().display().to_string();
        Ok(catalog)
    }

    /// Rows that fail to deserialize are skipped with a warning
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        rdr.headers().context("Failed to read catalog CSV header")?;

        let mut entries = Vec::new();
        for (line, result) in rdr.deserialize::<CatalogEntry>().enumerate() {
            match result {
                Ok(entry) => entries.push(entry),
                Err(err) => log::warn!("skipping catalog row {}: {}", line + 2, err),
            }
        }

        Ok(CsvCatalog::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_make_model_year = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            by_id.entry(entry.id.clone()).or_insert(idx);
            by_make_model_year
                .entry(lookup_key(&entry.make, &entry.model, entry.year))
                .or_insert(idx);
        }

        log::debug!("catalog loaded: {} entries", entries.len());

        CsvCatalog {
            entries,
            by_id,
            by_make_model_year,
            source: "memory".to_string(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct make/model/year lookup, first row wins. The make compares
    /// ASCII case-insensitively like the trait methods; the model is exact.
    pub fn lookup(&self, make: &str, model: &str, year: u16) -> Option<&CatalogEntry> {
        self.by_make_model_year
            .get(&lookup_key(make, model, year))
            .map(|idx| &self.entries[*idx])
    }

    fn of_year_and_make<'a>(
        &'a self,
        year: u16,
        make: &'a str,
    ) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.year == year && entry.make.eq_ignore_ascii_case(make))
    }
}

fn lookup_key(make: &str, model: &str, year: u16) -> String {
    format!("{}_{}_{}", make.to_ascii_lowercase(), model, year)
}

impl Catalog for CsvCatalog {
    fn models(&self, year: u16, make: &str) -> Result<Vec<Candidate>> {
        let mut models: Vec<Candidate> = Vec::new();
        for entry in self.of_year_and_make(year, make) {
            if !models.iter().any(|candidate| candidate.label == entry.model) {
                models.push(Candidate::new(entry.model.clone(), entry.model.clone()));
            }
        }
        Ok(models)
    }

    fn options(&self, year: u16, make: &str, model: &str) -> Result<Vec<Candidate>> {
        Ok(self
            .of_year_and_make(year, make)
            .filter(|entry| entry.model == model)
            .map(|entry| Candidate::new(entry.id.clone(), entry.trim.clone()))
            .collect())
    }

    fn entry(&self, id: &str) -> Option<CatalogEntry> {
        self.by_id.get(id).map(|idx| self.entries[*idx].clone())
    }

    fn source(&self) -> &str {
        &self.source
    }
}

// ============================================================================
// TESTS
// ============================================================================
