//! File I/O operations for PSBTs

use crate::error::{IoError, Result};
use base64::Engine;
use psbt_core::{Psbt, PSBT_MAGIC};
use psbt_info::FeeRates;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Encoding of a PSBT on disk or in a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Pick by content: raw magic, then hex, then base64
    #[default]
    Auto,
    Binary,
    Hex,
    Base64,
}

impl InputFormat {
    /// Resolve `Auto` against the actual content
    pub fn resolve(self, data: &[u8]) -> Self {
        match self {
            InputFormat::Auto => detect_format(data),
            other => other,
        }
    }
}

impl FromStr for InputFormat {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(InputFormat::Auto),
            "binary" | "bin" | "raw" => Ok(InputFormat::Binary),
            "hex" => Ok(InputFormat::Hex),
            "base64" | "b64" => Ok(InputFormat::Base64),
            other => Err(IoError::InvalidFormat(format!("Unknown input format: {}", other))),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputFormat::Auto => "auto",
            InputFormat::Binary => "binary",
            InputFormat::Hex => "hex",
            InputFormat::Base64 => "base64",
        })
    }
}

/// Guess the encoding of PSBT data
///
/// Raw bytes start with the magic; text made only of hex digits is hex;
/// anything else is treated as base64.
pub fn detect_format(data: &[u8]) -> InputFormat {
    if data.starts_with(PSBT_MAGIC) {
        return InputFormat::Binary;
    }
    let mut text = data
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .peekable();
    if text.peek().is_some() && text.all(u8::is_ascii_hexdigit) {
        InputFormat::Hex
    } else {
        InputFormat::Base64
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn as_text(data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data)
        .map_err(|e| IoError::InvalidFormat(format!("PSBT text is not UTF-8: {}", e)))
}

/// Import a PSBT from a hex string
///
/// Whitespace, including line breaks, is ignored.
pub fn import_from_hex(hex_str: &str) -> Result<Psbt> {
    let bytes = hex::decode(strip_whitespace(hex_str))?;
    Ok(Psbt::deserialize(&bytes)?)
}

/// Import a PSBT from a base64-encoded string
///
/// Whitespace, including line breaks, is ignored.
pub fn import_from_base64(base64_str: &str) -> Result<Psbt> {
    let bytes = base64_decode(&strip_whitespace(base64_str))?;
    Ok(Psbt::deserialize(&bytes)?)
}

/// Import a PSBT from raw file contents in the given format
pub fn import_bytes(data: &[u8], format: InputFormat) -> Result<Psbt> {
    let format = format.resolve(data);
    debug!(%format, len = data.len(), "importing PSBT");

    match format {
        InputFormat::Binary | InputFormat::Auto => Ok(Psbt::deserialize(data)?),
        InputFormat::Hex => import_from_hex(as_text(data)?),
        InputFormat::Base64 => import_from_base64(as_text(data)?),
    }
}

/// Load a PSBT from a file
pub fn load_psbt<P: AsRef<Path>>(path: P, format: InputFormat) -> Result<Psbt> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::NotFound(path.display().to_string()));
    }
    let data = fs::read(path)?;
    import_bytes(&data, format)
}

/// Serialize a value to pretty-printed JSON
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Save a value as pretty-printed JSON
pub fn save_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    fs::write(path, to_json_pretty(value)?)?;
    Ok(())
}

/// Load recommended fee rates from a JSON document
///
/// The document uses the mempool.space field names (`fastestFee`,
/// `halfHourFee`, `hourFee`, `economyFee`, `minimumFee`).
pub fn load_fee_rates<P: AsRef<Path>>(path: P) -> Result<FeeRates> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::NotFound(path.display().to_string()));
    }
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Decode base64 to bytes
fn base64_decode(data: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| IoError::InvalidFormat(format!("Base64 decode error: {}", e)))
}
