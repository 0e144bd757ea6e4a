//! BIP32 key origin decoding for PSBT_OUT_BIP32_DERIVATION values

use psbt_core::{ByteReader, Error, Result};
use serde::Serialize;
use std::fmt;

const HARDENED_BIT: u32 = 0x8000_0000;

/// Path position of the BIP44 change branch (`m / purpose' / coin' / account' / change`)
const CHANGE_DEPTH: usize = 3;

/// One step of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChildNumber {
    /// Index with the hardened bit masked off
    pub index: u32,
    pub hardened: bool,
}

impl From<u32> for ChildNumber {
    fn from(raw: u32) -> Self {
        Self {
            index: raw & !HARDENED_BIT,
            hardened: raw & HARDENED_BIT != 0,
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)?;
        if self.hardened {
            f.write_str("'")?;
        }
        Ok(())
    }
}

/// Master key fingerprint and path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bip32Derivation {
    #[serde(serialize_with = "hex::serde::serialize")]
    pub fingerprint: [u8; 4],
    pub path: Vec<ChildNumber>,
}

impl Bip32Derivation {
    /// Decode `<4-byte fingerprint><4-byte LE index>*`
    pub fn decode(value: &[u8]) -> Result<Self> {
        if value.len() < 4 || value.len() % 4 != 0 {
            return Err(Error::LengthMismatch {
                field: "PSBT_OUT_BIP32_DERIVATION",
                expected: (value.len().max(4) as u64).next_multiple_of(4),
                actual: value.len() as u64,
            });
        }

        let mut reader = ByteReader::new(value);
        let fingerprint = reader.read_array()?;
        let mut path = Vec::with_capacity(reader.remaining() / 4);
        while !reader.is_empty() {
            path.push(ChildNumber::from(u32::from_le_bytes(reader.read_array()?)));
        }

        Ok(Self { fingerprint, path })
    }

    /// Whether the path sits on a change branch
    pub fn is_change(&self) -> bool {
        self.path
            .get(CHANGE_DEPTH)
            .is_some_and(|child| child.index == 1)
    }
}

impl fmt::Display for Bip32Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for child in &self.path {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}
