//! Error types for transaction and PSBT decoding

use thiserror::Error;

/// Result type alias for decoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for decoding raw transactions and PSBTs
///
/// Every variant is terminal for the call that produced it: no partially
/// decoded structure is ever handed back alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid PSBT magic bytes: {}", hex::encode(found))]
    InvalidMagic { found: Vec<u8> },

    #[error("Invalid PSBT separator: expected 0xff, got {0:#04x}")]
    InvalidSeparator(u8),

    #[error("PSBT version could not be determined: global map has neither PSBT_GLOBAL_UNSIGNED_TX nor PSBT_GLOBAL_TX_VERSION")]
    UndeterminedVersion,

    #[error("Invalid PSBT version: {0} (only 0 and 2 exist)")]
    InvalidVersion(u32),

    #[error("Truncated input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Length mismatch in {field}: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("No UTXO found for input {input_index}")]
    MissingUtxo { input_index: usize },

    #[error("Missing required field {field} in map {index}")]
    MissingField { field: &'static str, index: usize },

    #[error("Input {input_index} spends output {vout}, but the previous transaction has {available} outputs")]
    OutputIndexOutOfRange {
        input_index: usize,
        vout: u64,
        available: usize,
    },
}

impl Error {
    /// Whether this error only means the PSBT lacks UTXO data yet
    ///
    /// Creator/constructor stage PSBTs are legitimate documents without the
    /// previous outputs needed for amount and fee analysis.
    pub fn is_missing_utxo(&self) -> bool {
        matches!(self, Error::MissingUtxo { .. })
    }
}
