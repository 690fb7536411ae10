// 🔢 Checksum Engine - ISO 3779 check digit
// Weighted sum of transliterated characters, mod 11. 10 is written as 'X'.

use crate::error::VinError;

/// Positional weights. Position 9 (the check digit itself) carries 0.
pub const VIN_WEIGHTS: [u32; 17] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

/// Letters that never appear in a VIN
pub const FORBIDDEN_LETTERS: [char; 3] = ['I', 'O', 'Q'];

/// Numeric value of a VIN character. `None` for I, O, Q and anything outside A-Z/0-9.
pub fn transliterate(c: char) -> Option<u32> {
    let value = match c {
        '0'..='9' => c.to_digit(10)?,
        'A' | 'J' => 1,
        'B' | 'K' | 'S' => 2,
        'C' | 'L' | 'T' => 3,
        'D' | 'M' | 'U' => 4,
        'E' | 'N' | 'V' => 5,
        'F' | 'W' => 6,
        'G' | 'P' | 'X' => 7,
        'H' | 'Y' => 8,
        'R' | 'Z' => 9,
        _ => return None,
    };
    Some(value)
}

/// True if `c` belongs to the VIN alphabet
pub fn is_vin_char(c: char) -> bool {
    transliterate(c).is_some()
}

/// Compute the check character for a 17-character VIN.
///
/// The character currently at position 9 is ignored (weight 0), so the same
/// string can be checked against its own position 9.
///
/// # Errors
/// `VinError::InvalidInput` if the input is not exactly 17 characters drawn
/// from the VIN alphabet. Lowercase letters are rejected; callers normalize.
pub fn check_digit(vin17: &str) -> Result<char, VinError> {
    let chars: Vec<char> = vin17.chars().collect();
    if chars.len() != 17 {
        return Err(VinError::invalid_input(
            vin17,
            format!("expected 17 characters, got {}", chars.len()),
        ));
    }

    let mut sum = 0u32;
    for (position, c) in chars.iter().enumerate() {
        let value = transliterate(*c).ok_or_else(|| {
            VinError::invalid_input(
                vin17,
                format!("character '{}' at position {} is not a VIN character", c, position + 1),
            )
        })?;
        sum += VIN_WEIGHTS[position] * value;
    }

    Ok(match sum % 11 {
        10 => 'X',
        n => char::from_digit(n, 10).unwrap_or('0'),
    })
}

// ============================================================================
// TESTS
// ============================================================================
