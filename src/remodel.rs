// 🔁 Remodel Table - Registry model names → catalog spelling
// The registry and the catalog disagree on how some models are written.
// Each quirk is one (make, from, to) substring rewrite.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemodelRule {
    /// Decoded make the rule applies to (exact match)
    pub make: String,

    /// Substring to replace in the model name
    pub from: String,

    /// Replacement, may be empty
    #[serde(default)]
    pub to: String,
}

impl RemodelRule {
    pub fn new(make: &str, from: &str, to: &str) -> Self {
        RemodelRule {
            make: make.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemodelTable {
    rules: Vec<RemodelRule>,
}

impl RemodelTable {
    /// Create an empty table (model names pass through unchanged)
    pub fn new() -> Self {
        RemodelTable { rules: Vec::new() }
    }

    /// Load a JSON array of rules
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read remodel file: {:?}", path.as_ref()))?;

        let rules: Vec<RemodelRule> =
            serde_json::from_str(&content).context("Failed to parse remodel JSON")?;

        Ok(RemodelTable::from_rules(rules))
    }

    pub fn from_rules(rules: Vec<RemodelRule>) -> Self {
        RemodelTable { rules }
    }

    pub fn add_rule(&mut self, rule: RemodelRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[RemodelRule] {
        &self.rules
    }

    /// Rewrite `model` through every rule for `make`, in table order
    pub fn apply(&self, make: &str, model: &str) -> String {
        let mut remodeled = model.to_string();
        for rule in self.rules.iter().filter(|rule| rule.make == make) {
            if !rule.from.is_empty() && remodeled.contains(&rule.from) {
                remodeled = remodeled.replace(&rule.from, &rule.to);
            }
        }
        remodeled.trim().to_string()
    }
}

impl Default for RemodelTable {
    fn default() -> Self {
        RemodelTable::from_rules(vec![
            RemodelRule::new("Buick", "Ranier", "Rainier"),
            RemodelRule::new("Dodge", "Caravan/Grand Caravan", "Grand Caravan"),
            RemodelRule::new("Ford", "F-150", "F150"),
            RemodelRule::new("Ford", "F-250", "F250"),
            RemodelRule::new("Ford", "F-350", "F350"),
            RemodelRule::new("Lexus", "ES300h", "ES 300h"),
            RemodelRule::new("Lexus", "LX570", "LX 570"),
            RemodelRule::new("Lexus", "RX350", "RX 350"),
            RemodelRule::new("Mazda", "MAZDA", ""),
            RemodelRule::new("Mazda", "Mazda", ""),
            RemodelRule::new("Mercedes-Benz", "-Class", ""),
            RemodelRule::new("Nissan", "NV200, City Express", "NV200"),
            RemodelRule::new("Volkswagen", "New Beetle", "Beetle"),
        ])
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_rewrites() {
        let table = RemodelTable::default();
        assert_eq!(table.apply("Ford", "F-150"), "F150");
        assert_eq!(table.apply("Mazda", "Mazda3"), "3");
        assert_eq!(table.apply("Mazda", "MAZDA6"), "6");
        assert_eq!(table.apply("Mercedes-Benz", "CLK-Class"), "CLK");
        assert_eq!(table.apply("Volkswagen", "New Beetle"), "Beetle");
        assert_eq!(table.apply("Dodge", "Caravan/Grand Caravan"), "Grand Caravan");
        assert_eq!(table.apply("Lexus", "RX350"), "RX 350");
        assert_eq!(table.apply("Nissan", "NV200, City Express"), "NV200");
    }

    #[test]
    fn test_rules_are_scoped_to_make() {
        let table = RemodelTable::default();
        assert_eq!(table.apply("Ford", "New Beetle"), "New Beetle");
        assert_eq!(table.apply("Honda", "Civic"), "Civic");
        assert_eq!(RemodelTable::new().apply("Ford", "F-150"), "F-150");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"make": "Buick", "from": "Ranier", "to": "Rainier"}},
                {{"make": "Mazda", "from": "Mazda"}}]"#
        )
        .unwrap();

        let table = RemodelTable::from_file(file.path()).unwrap();
        assert_eq!(table.rules().len(), 2);
        assert_eq!(table.apply("Buick", "Ranier"), "Rainier");
        assert_eq!(table.apply("Mazda", "Mazda5"), "5");
    }

    #[test]
    fn test_from_file_errors_carry_context() {
        let err = RemodelTable::from_file("/nonexistent/remodel.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read remodel file"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = RemodelTable::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse remodel JSON"));
    }
}
