// 🚗 VIN Decoder - Structural decode of a Vehicle Identification Number
// Permissive: any string constructs a Vin. Validity is advisory and every
// property returns a best-effort answer for malformed input.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::checksum::{check_digit, FORBIDDEN_LETTERS};
use crate::rules::{strip_market_suffixes, MakeRuleChain, STANDARD_CHAIN};
use crate::tables::{self, Region};

/// Year characters that never appear at position 10
const FORBIDDEN_YEAR_CHARS: [char; 3] = ['U', 'Z', '0'];

// ============================================================================
// VALIDITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidityIssue {
    /// Not exactly 17 characters
    Length,
    /// Contains I, O or Q
    ForbiddenCharacter,
    /// Position 10 is U, Z or 0
    ModelYearCharacter,
    /// Position 9 does not match the computed check character
    CheckDigit,
}

impl fmt::Display for ValidityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidityIssue::Length => "length is not 17 characters",
            ValidityIssue::ForbiddenCharacter => "contains I, O or Q",
            ValidityIssue::ModelYearCharacter => "model year character is U, Z or 0",
            ValidityIssue::CheckDigit => "check digit mismatch",
        };
        f.write_str(text)
    }
}

// ============================================================================
// VIN
// ============================================================================

#[derive(Debug, Clone)]
pub struct Vin {
    vin: String,
    chars: Vec<char>,

    // Lazily computed, never reset
    issues: OnceCell<Vec<ValidityIssue>>,
    year: OnceCell<Option<u16>>,
    make: OnceCell<String>,
}

impl Vin {
    pub fn new(vin: &str) -> Self {
        let vin = vin.to_uppercase();
        let chars = vin.chars().collect();
        Vin {
            vin,
            chars,
            issues: OnceCell::new(),
            year: OnceCell::new(),
            make: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.vin
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at a 0-based position, if present
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Characters `start..end` (0-based), clipped to what exists
    fn section(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }
        self.chars[start..end].iter().collect()
    }

    // ========================================================================
    // SECTIONS
    // ========================================================================

    /// World Manufacturer Identifier, positions 1-3
    pub fn wmi(&self) -> String {
        self.section(0, 3)
    }

    /// Vehicle Descriptor Section, positions 4-9
    pub fn vds(&self) -> String {
        self.section(3, 9)
    }

    /// Vehicle Identifier Section, positions 10-17
    pub fn vis(&self) -> String {
        self.section(9, 17)
    }

    // ========================================================================
    // VALIDITY
    // ========================================================================

    pub fn is_valid(&self) -> bool {
        self.issues().is_empty()
    }

    /// Failed validity checks, in check order. Empty for a valid VIN.
    pub fn issues(&self) -> &[ValidityIssue] {
        self.issues.get_or_init(|| {
            let mut issues = Vec::new();

            if self.chars.len() != 17 {
                issues.push(ValidityIssue::Length);
            }
            if self.chars.iter().any(|c| FORBIDDEN_LETTERS.contains(c)) {
                issues.push(ValidityIssue::ForbiddenCharacter);
            }
            if let Some(c) = self.char_at(9) {
                if FORBIDDEN_YEAR_CHARS.contains(&c) {
                    issues.push(ValidityIssue::ModelYearCharacter);
                }
            }
            match check_digit(&self.vin) {
                Ok(expected) if self.char_at(8) == Some(expected) => {}
                _ => issues.push(ValidityIssue::CheckDigit),
            }

            issues
        })
    }

    // ========================================================================
    // PRODUCTION
    // ========================================================================

    /// Manufacturers building fewer than 500 vehicles a year put '9' at position 3
    pub fn is_low_volume_producer(&self) -> bool {
        self.char_at(2) == Some('9')
    }

    pub fn sequential_number_length(&self) -> usize {
        if self.is_low_volume_producer() {
            return tables::LOW_VOLUME_SEQUENTIAL_LENGTH;
        }
        tables::sequential_length_for(&self.wmi())
    }

    /// Last `sequential_number_length()` characters
    pub fn sequential_number(&self) -> String {
        let n = self.sequential_number_length();
        let start = self.chars.len().saturating_sub(n);
        self.section(start, self.chars.len())
    }

    // ========================================================================
    // MODEL YEAR
    // ========================================================================

    /// Position 7 numeric means position 10 is read in the 1980-2009 cycle
    pub fn is_pre_2010(&self) -> bool {
        self.char_at(6).map_or(false, |c| c.is_ascii_digit())
    }

    /// Model year from position 10. `None` when the character is unmapped.
    ///
    /// Position 7 is the only disambiguation available, so a VIN from one
    /// cycle can decode to the other.
    pub fn year(&self) -> Option<u16> {
        *self.year.get_or_init(|| {
            let code = self.char_at(9)?;
            let year = if self.is_pre_2010() {
                tables::year_pre_2010(code)
            } else {
                tables::year_post_2010(code)
            };
            if year.is_none() {
                log::debug!("{}: no model year for code '{}'", self.vin, code);
            }
            year
        })
    }

    // ========================================================================
    // ORIGIN
    // ========================================================================

    pub fn region(&self) -> Region {
        self.char_at(0).map_or(Region::Unknown, tables::region_for)
    }

    pub fn country(&self) -> &'static str {
        match (self.char_at(0), self.char_at(1)) {
            (Some(first), Some(second)) => tables::country_for(first, second),
            _ => tables::UNKNOWN,
        }
    }

    /// Raw registry manufacturer name, e.g. "Chevrolet Truck USA"
    pub fn manufacturer(&self) -> &'static str {
        tables::manufacturer_for(&self.wmi())
    }

    /// Normalized brand, after suffix stripping and the standard override chain
    pub fn make(&self) -> &str {
        self.make.get_or_init(|| self.make_with(&STANDARD_CHAIN))
    }

    /// Normalized brand through a caller-supplied override chain. Not cached.
    pub fn make_with(&self, chain: &MakeRuleChain) -> String {
        let stripped = strip_market_suffixes(self.manufacturer());
        chain.apply(&stripped, self)
    }

    // ========================================================================
    // ANONYMIZATION
    // ========================================================================

    /// Zero the sequential number and recompute position 9 so the result is
    /// self-consistent. Applying it twice gives the same string.
    pub fn anonymize(&self) -> String {
        let n = self.sequential_number_length();
        let keep = self.chars.len().saturating_sub(n);

        let mut zeroed: Vec<char> = self.chars[..keep].to_vec();
        zeroed.extend(std::iter::repeat('0').take(self.chars.len() - keep));

        let candidate: String = zeroed.iter().collect();
        if let Ok(digit) = check_digit(&candidate) {
            zeroed[8] = digit;
        }
        zeroed.into_iter().collect()
    }

    // ========================================================================
    // SNAPSHOT
    // ========================================================================

    pub fn decode(&self) -> DecodedVehicle {
        DecodedVehicle {
            vin: self.vin.clone(),
            wmi: self.wmi(),
            vds: self.vds(),
            vis: self.vis(),
            region: self.region(),
            country: self.country().to_string(),
            manufacturer: self.manufacturer().to_string(),
            make: self.make().to_string(),
            year: self.year(),
            is_low_volume_producer: self.is_low_volume_producer(),
            sequential_number_length: self.sequential_number_length(),
            sequential_number: self.sequential_number(),
            is_valid: self.is_valid(),
        }
    }
}

impl From<&str> for Vin {
    fn from(vin: &str) -> Self {
        Vin::new(vin)
    }
}

impl FromStr for Vin {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Vin::new(s))
    }
}

impl PartialEq for Vin {
    fn eq(&self, other: &Self) -> bool {
        self.vin == other.vin
    }
}

impl Eq for Vin {}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.vin)
    }
}

// ============================================================================
// DECODED SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedVehicle {
    pub vin: String,
    pub wmi: String,
    pub vds: String,
    pub vis: String,
    pub region: Region,
    pub country: String,
    pub manufacturer: String,
    pub make: String,
    pub year: Option<u16>,
    pub is_low_volume_producer: bool,
    pub sequential_number_length: usize,
    pub sequential_number: String,
    pub is_valid: bool,
}

// ============================================================================
// TESTS
// ============================================================================
