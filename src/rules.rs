// 🏷️ Make Rules - Brand normalization as data
// Registry manufacturer names are not brand names. An ordered chain of
// (predicate, transform) rules turns one into the other.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

use crate::vin::Vin;

/// Trailing market words removed from registry names, checked in this order
pub const MARKET_SUFFIXES: &[&str] = &[
    "Argentina",
    "Canada",
    "Cars",
    "China",
    "France",
    "Hungary",
    "Mexico",
    "Motor Company",
    "Thailand",
    "Truck USA",
    "Turkey",
    "USA",
    "USA - trucks",
    "USA (AutoAlliance International)",
];

/// Remove trailing market suffixes ("Ford Motor Company Canada" → "Ford").
/// A suffix only counts as a trailing word group, never the whole name.
pub fn strip_market_suffixes(manufacturer: &str) -> String {
    let mut name = manufacturer.trim().to_string();
    for suffix in MARKET_SUFFIXES {
        if let Some(rest) = name.strip_suffix(suffix) {
            if rest.ends_with(' ') {
                name = rest.trim_end().to_string();
            }
        }
    }
    name
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

pub type MakePredicate = Arc<dyn Fn(&str, &Vin) -> bool + Send + Sync>;
pub type MakeTransform = Arc<dyn Fn(&str, &Vin) -> String + Send + Sync>;

#[derive(Clone)]
pub struct MakeRule {
    /// Rule ID for tracing
    pub id: String,

    pub description: String,

    predicate: MakePredicate,
    transform: MakeTransform,
}

impl MakeRule {
    pub fn new<P, T>(id: &str, description: &str, predicate: P, transform: T) -> Self
    where
        P: Fn(&str, &Vin) -> bool + Send + Sync + 'static,
        T: Fn(&str, &Vin) -> String + Send + Sync + 'static,
    {
        MakeRule {
            id: id.to_string(),
            description: description.to_string(),
            predicate: Arc::new(predicate),
            transform: Arc::new(transform),
        }
    }

    /// Fires when the running make equals `from`, replaces it with `to`
    pub fn rename(id: &str, from: &str, to: &str) -> Self {
        let from = from.to_string();
        let to = to.to_string();
        let description = format!("{} → {}", from, to);
        MakeRule::new(
            id,
            &description,
            move |make, _| make == from,
            move |_, _| to.clone(),
        )
    }

    pub fn matches(&self, make: &str, vin: &Vin) -> bool {
        (self.predicate)(make, vin)
    }

    /// Transformed make if the rule fires, `None` otherwise
    pub fn apply(&self, make: &str, vin: &Vin) -> Option<String> {
        if self.matches(make, vin) {
            Some((self.transform)(make, vin))
        } else {
            None
        }
    }
}

impl fmt::Debug for MakeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MakeRule")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

// ============================================================================
// STANDARD RULES
// ============================================================================

/// Chrysler group brand from position 5, used from model year 2012 on
fn chrysler_brand(code: char) -> Option<&'static str> {
    match code {
        'D' => Some("Dodge"),
        'F' => Some("Fiat"),
        'J' => Some("Jeep"),
        'R' => Some("Ram"),
        _ => None,
    }
}

fn is_infiniti_code(vin: &Vin) -> bool {
    let line: String = [vin.char_at(4), vin.char_at(5)].iter().flatten().collect();
    matches!(vin.char_at(4), Some('J' | 'V' | 'Y')) || line == "S1" || line == "L0"
}

fn standard_rules() -> Vec<MakeRule> {
    vec![
        MakeRule::rename("general-motors", "General Motors", "GMC"),
        MakeRule::new(
            "chrysler-brand-code",
            "Chrysler/FCA after 2011: position 5 selects Dodge, Fiat, Jeep or Ram",
            |make, vin| {
                (make == "Chrysler" || make == "FCA")
                    && vin.year().map_or(false, |year| year > 2011)
                    && vin.char_at(4).and_then(chrysler_brand).is_some()
            },
            |make, vin| match vin.char_at(4).and_then(chrysler_brand) {
                Some(brand) => brand.to_string(),
                None => make.to_string(),
            },
        ),
        MakeRule::rename("fuji-heavy-industries", "Fuji Heavy Industries (Subaru)", "Subaru"),
        MakeRule::new(
            "nissan-infiniti",
            "Nissan with an Infiniti line code at positions 5-6",
            |make, vin| make == "Nissan" && is_infiniti_code(vin),
            |_, _| "Infiniti".to_string(),
        ),
        // Must run after nissan-infiniti so Samsung-built Nissans stay Nissan
        MakeRule::rename("renault-samsung", "Renault Samsung", "Nissan"),
        MakeRule::rename("subaru-isuzu", "Subaru-Isuzu Automotive", "Subaru"),
    ]
}

/// The chain every `Vin::make()` runs through
pub static STANDARD_CHAIN: Lazy<MakeRuleChain> = Lazy::new(MakeRuleChain::standard);

// ============================================================================
// RULE CHAIN
// ============================================================================

#[derive(Clone, Debug)]
pub struct MakeRuleChain {
    rules: Vec<MakeRule>,
}

impl MakeRuleChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        MakeRuleChain { rules: Vec::new() }
    }

    /// The built-in override rules, in evaluation order
    pub fn standard() -> Self {
        MakeRuleChain {
            rules: standard_rules(),
        }
    }

    /// Append a rule at the end of the chain
    pub fn push(&mut self, rule: MakeRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[MakeRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&MakeRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule in order against the running make
    pub fn apply(&self, make: &str, vin: &Vin) -> String {
        self.run(make, vin).0
    }

    /// IDs of the rules that fired, in order
    pub fn trace(&self, make: &str, vin: &Vin) -> Vec<String> {
        self.run(make, vin).1
    }

    fn run(&self, make: &str, vin: &Vin) -> (String, Vec<String>) {
        let mut current = make.to_string();
        let mut fired = Vec::new();

        for rule in &self.rules {
            if let Some(next) = rule.apply(&current, vin) {
                log::debug!("{}: rule {} rewrote '{}' → '{}'", vin, rule.id, current, next);
                current = next;
                fired.push(rule.id.clone());
            }
        }

        (current, fired)
    }
}

impl Default for MakeRuleChain {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// TESTS
// ============================================================================
