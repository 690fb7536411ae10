// ❗ Core Errors
// The decoder is permissive; the only hard failure in the core is feeding the
// checksum engine something that is not a 17-character VIN.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VinError {
    /// Checksum input was not 17 characters from the VIN alphabet
    InvalidInput { input: String, reason: String },
}

impl VinError {
    pub fn invalid_input(input: &str, reason: impl Into<String>) -> Self {
        VinError::InvalidInput {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for VinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VinError::InvalidInput { input, reason } => {
                write!(f, "invalid checksum input '{}': {}", input, reason)
            }
        }
    }
}

impl std::error::Error for VinError {}
