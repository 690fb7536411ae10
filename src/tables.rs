// 🗺️ Reference Tables - WMI, model year, region/country, sequential number
// Process-wide immutable data. Built once on first use, shared without locking.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel for anything the tables do not know
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// REGION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    Oceania,
    SouthAmerica,
    Unknown,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Africa => "africa",
            Region::Asia => "asia",
            Region::Europe => "europe",
            Region::NorthAmerica => "north_america",
            Region::Oceania => "oceania",
            Region::SouthAmerica => "south_america",
            Region::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// WORLD MANUFACTURER MAP (first VIN character → region → countries)
// ============================================================================

/// One region entry: countries keyed by the set of second characters they own
pub struct RegionEntry {
    pub region: Region,
    pub countries: &'static [(&'static str, &'static str)],
}

const ALL: &str = "ABCDEFGHJKLMNPRSTUVWXYZ1234567890";

static WORLD_MANUFACTURER_MAP: Lazy<HashMap<char, RegionEntry>> = Lazy::new(|| {
    use Region::*;

    let entries: &[(char, Region, &[(&str, &str)])] = &[
        ('A', Africa, &[("ABCDEFGH", "South Africa"), ("JKLMN", "Ivory Coast")]),
        ('B', Africa, &[("ABCDE", "Angola"), ("FGHJK", "Kenya"), ("LMNPR", "Tanzania")]),
        ('C', Africa, &[("ABCDE", "Benin"), ("FGHJK", "Madagascar"), ("LMNPR", "Tunisia")]),
        ('D', Africa, &[("ABCDE", "Egypt"), ("FGHJK", "Morocco"), ("LMNPR", "Zambia")]),
        ('E', Africa, &[("ABCDE", "Ethiopia"), ("FGHJK", "Mozambique")]),
        ('F', Africa, &[("ABCDE", "Ghana"), ("FGHJK", "Nigeria")]),
        ('G', Africa, &[]),
        ('H', Africa, &[]),
        ('J', Asia, &[(ALL, "Japan")]),
        ('K', Asia, &[
            ("ABCDE", "Sri Lanka"),
            ("FGHJK", "Israel"),
            ("LMNPR", "Korea (South)"),
            ("STUVWXYZ1234567890", "Kazakhstan"),
        ]),
        ('L', Asia, &[(ALL, "China")]),
        ('M', Asia, &[("ABCDE", "India"), ("FGHJK", "Indonesia"), ("LMNPR", "Thailand")]),
        ('N', Asia, &[("FGHJK", "Pakistan"), ("LMNPR", "Turkey")]),
        ('P', Asia, &[("ABCDE", "Philippines"), ("FGHJK", "Singapore"), ("LMNPR", "Malaysia")]),
        ('R', Asia, &[
            ("ABCDE", "United Arab Emirates"),
            ("FGHJK", "Taiwan"),
            ("LMNPR", "Vietnam"),
            ("STUVWXYZ1234567890", "Saudi Arabia"),
        ]),
        ('S', Europe, &[
            ("ABCDEFGHJKLM", "United Kingdom"),
            ("NPRST", "Germany"),
            ("UVWXYZ", "Poland"),
            ("1234", "Latvia"),
        ]),
        ('T', Europe, &[
            ("ABCDEFGH", "Switzerland"),
            ("JKLMNP", "Czech Republic"),
            ("RSTUV", "Hungary"),
            ("WXYZ1", "Portugal"),
        ]),
        ('U', Europe, &[
            ("HJKLM", "Denmark"),
            ("NPRST", "Ireland"),
            ("UVWXYZ", "Romania"),
            ("567", "Slovakia"),
        ]),
        ('V', Europe, &[
            ("ABCDE", "Austria"),
            ("FGHJKLMNPR", "France"),
            ("STUVW", "Spain"),
            ("XYZ12", "Serbia"),
            ("345", "Croatia"),
            ("67890", "Estonia"),
        ]),
        ('W', Europe, &[(ALL, "Germany")]),
        ('X', Europe, &[
            ("ABCDE", "Bulgaria"),
            ("FGHJK", "Greece"),
            ("LMNPR", "Netherlands"),
            ("STUVW", "Russia"),
            ("XYZ12", "Luxembourg"),
            ("34567890", "Russia"),
        ]),
        ('Y', Europe, &[
            ("ABCDE", "Belgium"),
            ("FGHJK", "Finland"),
            ("LMNPR", "Malta"),
            ("STUVW", "Sweden"),
            ("XYZ12", "Norway"),
            ("345", "Belarus"),
            ("67890", "Ukraine"),
        ]),
        ('Z', Europe, &[
            ("ABCDEFGHJKLMNPR", "Italy"),
            ("XYZ12", "Slovenia"),
            ("345", "Lithuania"),
            ("67890", "Russia"),
        ]),
        ('1', NorthAmerica, &[(ALL, "United States")]),
        ('2', NorthAmerica, &[(ALL, "Canada")]),
        ('3', NorthAmerica, &[
            ("ABCDEFGHJKLMNPRSTUVW", "Mexico"),
            ("XYZ1234567", "Costa Rica"),
            ("890", "Cayman Islands"),
        ]),
        ('4', NorthAmerica, &[(ALL, "United States")]),
        ('5', NorthAmerica, &[(ALL, "United States")]),
        ('6', Oceania, &[("ABCDEFGHJKLMNPRSTUVW", "Australia")]),
        ('7', Oceania, &[("ABCDE", "New Zealand")]),
        ('8', SouthAmerica, &[
            ("ABCDE", "Argentina"),
            ("FGHJK", "Chile"),
            ("LMNPR", "Ecuador"),
            ("STUVW", "Peru"),
            ("XYZ12", "Venezuela"),
        ]),
        ('9', SouthAmerica, &[
            ("ABCDE", "Brazil"),
            ("FGHJK", "Colombia"),
            ("LMNPR", "Paraguay"),
            ("STUVW", "Uruguay"),
            ("XYZ12", "Trinidad & Tobago"),
            ("3456789", "Brazil"),
        ]),
    ];

    entries
        .iter()
        .map(|(key, region, countries)| {
            (
                *key,
                RegionEntry {
                    region: *region,
                    countries: *countries,
                },
            )
        })
        .collect()
});

/// Region for the first WMI character
pub fn region_for(first: char) -> Region {
    WORLD_MANUFACTURER_MAP
        .get(&first)
        .map(|entry| entry.region)
        .unwrap_or(Region::Unknown)
}

/// Country for the first two WMI characters
pub fn country_for(first: char, second: char) -> &'static str {
    WORLD_MANUFACTURER_MAP
        .get(&first)
        .and_then(|entry| {
            entry
                .countries
                .iter()
                .find(|(codes, _)| codes.contains(second))
                .map(|(_, country)| *country)
        })
        .unwrap_or(UNKNOWN)
}

// ============================================================================
// MODEL YEAR CODES
// ============================================================================

/// Position-10 year characters, in order. 30 codes per cycle.
pub const YEAR_CODES: &str = "ABCDEFGHJKLMNPRSTVWXY123456789";

/// Year for a position-10 character in the 1980-2009 cycle
pub fn year_pre_2010(code: char) -> Option<u16> {
    YEAR_CODES.find(code).map(|idx| 1980 + idx as u16)
}

/// Year for a position-10 character in the 2010-2039 cycle
pub fn year_post_2010(code: char) -> Option<u16> {
    YEAR_CODES.find(code).map(|idx| 2010 + idx as u16)
}

// ============================================================================
// SEQUENTIAL NUMBER LENGTH
// ============================================================================

/// Default length of the sequential-number field
pub const DEFAULT_SEQUENTIAL_LENGTH: usize = 6;

/// Length used by low-volume producers (3rd character '9')
pub const LOW_VOLUME_SEQUENTIAL_LENGTH: usize = 3;

/// Manufacturers whose sequential number is shorter than the default, keyed by WMI prefix.
pub const SEQUENTIAL_LENGTH_EXCEPTIONS: &[(&str, usize)] = &[
    ("SAJ", 4), // Jaguar
    ("ZFF", 5), // Ferrari
    ("ZHW", 5), // Lamborghini
];

/// Sequential-number length for a WMI, ignoring the low-volume rule.
/// The longest matching prefix wins.
pub fn sequential_length_for(wmi: &str) -> usize {
    SEQUENTIAL_LENGTH_EXCEPTIONS
        .iter()
        .filter(|(prefix, _)| wmi.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, len)| *len)
        .unwrap_or(DEFAULT_SEQUENTIAL_LENGTH)
}

// ============================================================================
// WMI → MANUFACTURER
// ============================================================================

static WMI_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        // United States
        ("1B3", "Dodge"),
        ("1C3", "Chrysler"),
        ("1C4", "Chrysler"),
        ("1C6", "Chrysler"),
        ("1D3", "Dodge"),
        ("1D4", "Dodge"),
        ("1D7", "Dodge"),
        ("1F", "Ford Motor Company"),
        ("1FA", "Ford Motor Company"),
        ("1FM", "Ford Motor Company"),
        ("1FT", "Ford Motor Company"),
        ("1G", "General Motors"),
        ("1G1", "Chevrolet USA"),
        ("1G2", "Pontiac USA"),
        ("1G3", "Oldsmobile USA"),
        ("1G4", "Buick USA"),
        ("1G6", "Cadillac USA"),
        ("1G8", "Saturn USA"),
        ("1GC", "Chevrolet Truck USA"),
        ("1GK", "GMC Truck USA"),
        ("1GM", "Pontiac USA"),
        ("1GN", "Chevrolet Truck USA"),
        ("1GT", "GMC Truck USA"),
        ("1GY", "Cadillac USA"),
        ("1HD", "Harley-Davidson"),
        ("1HG", "Honda USA"),
        ("1J4", "Jeep"),
        ("1J8", "Jeep"),
        ("1L", "Lincoln USA"),
        ("1LN", "Lincoln USA"),
        ("1M", "Mercury USA"),
        ("1ME", "Mercury USA"),
        ("1N", "Nissan USA"),
        ("1N4", "Nissan USA"),
        ("1N6", "Nissan USA"),
        ("1VW", "Volkswagen USA"),
        ("1YV", "Mazda USA (AutoAlliance International)"),
        ("19U", "Acura"),
        ("19V", "Acura"),
        ("19X", "Honda"),
        ("4A3", "Mitsubishi"),
        ("4A4", "Mitsubishi"),
        ("4F2", "Mazda"),
        ("4JG", "Mercedes-Benz USA"),
        ("4M2", "Mercury"),
        ("4S3", "Fuji Heavy Industries (Subaru)"),
        ("4S4", "Subaru-Isuzu Automotive"),
        ("4S6", "Honda"),
        ("4T1", "Toyota"),
        ("4T3", "Toyota"),
        ("4US", "BMW"),
        ("5FN", "Honda"),
        ("5FR", "Acura"),
        ("5GA", "Buick"),
        ("5GN", "Hummer"),
        ("5GT", "Hummer"),
        ("5J6", "Honda"),
        ("5J8", "Acura"),
        ("5L1", "Lincoln"),
        ("5N1", "Nissan USA"),
        ("5NP", "Hyundai"),
        ("5TD", "Toyota"),
        ("5TF", "Toyota"),
        ("5UM", "BMW"),
        ("5UX", "BMW"),
        ("5XX", "Kia"),
        ("5YF", "Toyota"),
        ("5YJ", "Tesla"),
        // Canada
        ("2A4", "Chrysler Canada"),
        ("2A8", "Chrysler Canada"),
        ("2B3", "Dodge Canada"),
        ("2C3", "Chrysler Canada"),
        ("2C4", "Chrysler Canada"),
        ("2D4", "Dodge Canada"),
        ("2FA", "Ford Motor Company Canada"),
        ("2FM", "Ford Motor Company Canada"),
        ("2FT", "Ford Motor Company Canada"),
        ("2G", "General Motors Canada"),
        ("2G1", "Chevrolet Canada"),
        ("2G2", "Pontiac Canada"),
        ("2G4", "Buick Canada"),
        ("2G6", "Cadillac Canada"),
        ("2HG", "Honda Canada"),
        ("2HK", "Honda Canada"),
        ("2HM", "Hyundai Canada"),
        ("2HN", "Acura Canada"),
        ("2LM", "Lincoln Canada"),
        ("2T1", "Toyota Canada"),
        ("2T2", "Lexus Canada"),
        ("2T3", "Toyota Canada"),
        // Mexico
        ("3C3", "Chrysler Mexico"),
        ("3C4", "Chrysler Mexico"),
        ("3C6", "Chrysler Mexico"),
        ("3CZ", "Honda Mexico"),
        ("3D4", "Dodge Mexico"),
        ("3D7", "Dodge Mexico"),
        ("3FA", "Ford Mexico"),
        ("3FE", "Ford Mexico"),
        ("3G", "General Motors Mexico"),
        ("3GN", "Chevrolet Mexico"),
        ("3GY", "Cadillac Mexico"),
        ("3HG", "Honda Mexico"),
        ("3LN", "Lincoln Mexico"),
        ("3MZ", "Mazda Mexico"),
        ("3N1", "Nissan Mexico"),
        ("3N6", "Nissan Mexico"),
        ("3VW", "Volkswagen Mexico"),
        // Asia
        ("JA3", "Mitsubishi"),
        ("JA4", "Mitsubishi"),
        ("JF1", "Fuji Heavy Industries (Subaru)"),
        ("JF2", "Fuji Heavy Industries (Subaru)"),
        ("JH4", "Acura"),
        ("JHM", "Honda"),
        ("JM1", "Mazda"),
        ("JM3", "Mazda"),
        ("JN1", "Nissan"),
        ("JN8", "Nissan"),
        ("JS", "Suzuki"),
        ("JT", "Toyota"),
        ("JTH", "Lexus"),
        ("JTJ", "Lexus"),
        ("KM8", "Hyundai"),
        ("KMH", "Hyundai"),
        ("KNA", "Kia"),
        ("KND", "Kia"),
        ("KNM", "Renault Samsung"),
        ("L6T", "Geely"),
        ("MR0", "Toyota Thailand"),
        ("NM0", "Ford Turkey"),
        // Europe
        ("SAJ", "Jaguar Cars"),
        ("SAL", "Land Rover"),
        ("SCA", "Rolls-Royce"),
        ("SCB", "Bentley"),
        ("SCC", "Lotus Cars"),
        ("SCF", "Aston Martin"),
        ("TRU", "Audi Hungary"),
        ("VF1", "Renault France"),
        ("VF3", "Peugeot France"),
        ("VNK", "Toyota France"),
        ("W04", "Buick"),
        ("W0L", "Opel"),
        ("WA1", "Audi"),
        ("WAU", "Audi"),
        ("WBA", "BMW"),
        ("WBS", "BMW"),
        ("WDB", "Mercedes-Benz"),
        ("WDC", "Mercedes-Benz"),
        ("WDD", "Mercedes-Benz"),
        ("WMW", "MINI"),
        ("WP0", "Porsche"),
        ("WP1", "Porsche"),
        ("WUA", "Audi"),
        ("WVG", "Volkswagen"),
        ("WVW", "Volkswagen"),
        ("YS3", "Saab"),
        ("YV1", "Volvo Cars"),
        ("YV4", "Volvo Cars"),
        ("ZAC", "FCA"),
        ("ZAM", "Maserati"),
        ("ZAR", "Alfa Romeo"),
        ("ZFA", "Fiat"),
        ("ZFF", "Ferrari"),
        ("ZHW", "Lamborghini"),
        // South America
        ("8AP", "Fiat Argentina"),
        ("9BW", "Volkswagen"),
    ]
    .into_iter()
    .collect()
});

/// Raw registry manufacturer name for a WMI: 3-character code first, then the
/// 2-character prefix.
pub fn manufacturer_for(wmi: &str) -> &'static str {
    let prefix2: String = wmi.chars().take(2).collect();
    WMI_MAP
        .get(wmi)
        .or_else(|| WMI_MAP.get(prefix2.as_str()))
        .copied()
        .unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_lookup() {
        assert_eq!(region_for('1'), Region::NorthAmerica);
        assert_eq!(region_for('J'), Region::Asia);
        assert_eq!(region_for('W'), Region::Europe);
        assert_eq!(region_for('9'), Region::SouthAmerica);
        assert_eq!(region_for('6'), Region::Oceania);
        assert_eq!(region_for('A'), Region::Africa);
        assert_eq!(region_for('I'), Region::Unknown);
        assert_eq!(region_for('0'), Region::Unknown);
    }

    #[test]
    fn test_country_ranges() {
        assert_eq!(country_for('3', 'V'), "Mexico");
        assert_eq!(country_for('3', 'X'), "Costa Rica");
        assert_eq!(country_for('K', 'N'), "Korea (South)");
        assert_eq!(country_for('T', 'R'), "Hungary");
        assert_eq!(country_for('V', 'N'), "France");
        assert_eq!(country_for('Y', 'V'), "Sweden");
        assert_eq!(country_for('S', 'C'), "United Kingdom");
        assert_eq!(country_for('W', '0'), "Germany");
    }

    #[test]
    fn test_unmapped_country_is_unknown() {
        assert_eq!(country_for('G', 'A'), UNKNOWN);
        assert_eq!(country_for('N', 'A'), UNKNOWN);
        assert_eq!(country_for('?', 'A'), UNKNOWN);
    }

    #[test]
    fn test_country_sets_are_disjoint() {
        for (key, entry) in WORLD_MANUFACTURER_MAP.iter() {
            for c in ALL.chars() {
                let owners = entry
                    .countries
                    .iter()
                    .filter(|(codes, _)| codes.contains(c))
                    .count();
                assert!(owners <= 1, "{}{} maps to {} countries", key, c, owners);
            }
        }
    }

    #[test]
    fn test_year_cycles() {
        assert_eq!(year_pre_2010('A'), Some(1980));
        assert_eq!(year_pre_2010('Y'), Some(2000));
        assert_eq!(year_pre_2010('1'), Some(2001));
        assert_eq!(year_pre_2010('9'), Some(2009));
        assert_eq!(year_post_2010('A'), Some(2010));
        assert_eq!(year_post_2010('G'), Some(2016));
        assert_eq!(year_post_2010('9'), Some(2039));
        assert_eq!(year_post_2010('U'), None);
        assert_eq!(year_post_2010('Z'), None);
        assert_eq!(year_post_2010('0'), None);
    }

    #[test]
    fn test_sequential_length_table() {
        assert_eq!(sequential_length_for("SAJ"), 4);
        assert_eq!(sequential_length_for("ZFF"), 5);
        assert_eq!(sequential_length_for("ZHW"), 5);
        assert_eq!(sequential_length_for("1FA"), DEFAULT_SEQUENTIAL_LENGTH);
        assert_eq!(sequential_length_for(""), DEFAULT_SEQUENTIAL_LENGTH);
    }

    #[test]
    fn test_manufacturer_prefix_fallback() {
        assert_eq!(manufacturer_for("1GT"), "GMC Truck USA");
        assert_eq!(manufacturer_for("1G9"), "General Motors");
        assert_eq!(manufacturer_for("1FD"), "Ford Motor Company");
        assert_eq!(manufacturer_for("JTD"), "Toyota");
        assert_eq!(manufacturer_for("QQQ"), UNKNOWN);
        assert_eq!(manufacturer_for(""), UNKNOWN);
    }
}
