//! scriptPubKey classification
//!
//! Recognises the five standard output templates by length and fixed opcode
//! positions. Nothing is disassembled; anything that does not match a
//! template exactly is `Unknown`.

use serde::{Serialize, Serializer};
use std::fmt;

const OP_0: u8 = 0x00;
const OP_1: u8 = 0x51;
const OP_PUSHBYTES_20: u8 = 0x14;
const OP_PUSHBYTES_32: u8 = 0x20;
const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;

/// Standard output script templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptType {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
    Unknown,
}

impl ScriptType {
    /// Classify a scriptPubKey
    pub fn classify(script: &[u8]) -> Self {
        match script {
            [OP_DUP, OP_HASH160, OP_PUSHBYTES_20, .., OP_EQUALVERIFY, OP_CHECKSIG] if script.len() == 25 => {
                ScriptType::P2pkh
            }
            [OP_HASH160, OP_PUSHBYTES_20, .., OP_EQUAL] if script.len() == 23 => ScriptType::P2sh,
            [OP_0, OP_PUSHBYTES_20, ..] if script.len() == 22 => ScriptType::P2wpkh,
            [OP_0, OP_PUSHBYTES_32, ..] if script.len() == 34 => ScriptType::P2wsh,
            [OP_1, OP_PUSHBYTES_32, ..] if script.len() == 34 => ScriptType::P2tr,
            _ => ScriptType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptType::P2pkh => "P2PKH",
            ScriptType::P2sh => "P2SH",
            ScriptType::P2wpkh => "P2WPKH",
            ScriptType::P2wsh => "P2WSH",
            ScriptType::P2tr => "P2TR",
            ScriptType::Unknown => "UNKNOWN",
        }
    }

    /// Human-facing address family for this template
    pub fn address_type(self) -> &'static str {
        match self {
            ScriptType::P2pkh => "Legacy / Base58",
            ScriptType::P2sh => "Nested SegWit / Legacy",
            ScriptType::P2wpkh | ScriptType::P2wsh => "Native SegWit (bech32)",
            ScriptType::P2tr => "Native SegWit v1",
            ScriptType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ScriptType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
