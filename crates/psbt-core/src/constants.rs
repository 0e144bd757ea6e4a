//! PSBT Field Type Constants
//!
//! Key type codes for the three PSBT map kinds (BIP-174, BIP-370, BIP-371,
//! BIP-373, BIP-375) and the per-kind name tables used to label them.
//! The same numeric code means different things depending on the map it
//! appears in, so names are always resolved through a [`MapKind`].

use serde::Serialize;

// Magic bytes for PSBT
pub const PSBT_MAGIC: &[u8; 4] = b"psbt";
pub const PSBT_SEPARATOR: u8 = 0xff;

/// A single zero byte ends every key-value map
pub const PSBT_MAP_TERMINATOR: u8 = 0x00;

/// BIP-144 marker byte in place of the input count
pub const SEGWIT_MARKER: u8 = 0x00;

// Global key types
pub const PSBT_GLOBAL_UNSIGNED_TX: u64 = 0x00;
pub const PSBT_GLOBAL_XPUB: u64 = 0x01;
pub const PSBT_GLOBAL_TX_VERSION: u64 = 0x02;
pub const PSBT_GLOBAL_FALLBACK_LOCKTIME: u64 = 0x03;
pub const PSBT_GLOBAL_INPUT_COUNT: u64 = 0x04;
pub const PSBT_GLOBAL_OUTPUT_COUNT: u64 = 0x05;
pub const PSBT_GLOBAL_TX_MODIFIABLE: u64 = 0x06;
pub const PSBT_GLOBAL_SP_ECDH_SHARE: u64 = 0x07;
pub const PSBT_GLOBAL_SP_DLEQ: u64 = 0x08;
pub const PSBT_GLOBAL_VERSION: u64 = 0xfb;
pub const PSBT_GLOBAL_PROPRIETARY: u64 = 0xfc;

// Input key types
pub const PSBT_IN_NON_WITNESS_UTXO: u64 = 0x00;
pub const PSBT_IN_WITNESS_UTXO: u64 = 0x01;
pub const PSBT_IN_PARTIAL_SIG: u64 = 0x02;
pub const PSBT_IN_SIGHASH_TYPE: u64 = 0x03;
pub const PSBT_IN_REDEEM_SCRIPT: u64 = 0x04;
pub const PSBT_IN_WITNESS_SCRIPT: u64 = 0x05;
pub const PSBT_IN_BIP32_DERIVATION: u64 = 0x06;
pub const PSBT_IN_FINAL_SCRIPTSIG: u64 = 0x07;
pub const PSBT_IN_FINAL_SCRIPTWITNESS: u64 = 0x08;
pub const PSBT_IN_POR_COMMITMENT: u64 = 0x09;
pub const PSBT_IN_RIPEMD160: u64 = 0x0a;
pub const PSBT_IN_SHA256: u64 = 0x0b;
pub const PSBT_IN_HASH160: u64 = 0x0c;
pub const PSBT_IN_HASH256: u64 = 0x0d;
pub const PSBT_IN_PREVIOUS_TXID: u64 = 0x0e;
pub const PSBT_IN_OUTPUT_INDEX: u64 = 0x0f;
pub const PSBT_IN_SEQUENCE: u64 = 0x10;
pub const PSBT_IN_REQUIRED_TIME_LOCKTIME: u64 = 0x11;
pub const PSBT_IN_REQUIRED_HEIGHT_LOCKTIME: u64 = 0x12;
pub const PSBT_IN_TAP_KEY_SIG: u64 = 0x13;
pub const PSBT_IN_TAP_SCRIPT_SIG: u64 = 0x14;
pub const PSBT_IN_TAP_LEAF_SCRIPT: u64 = 0x15;
pub const PSBT_IN_TAP_BIP32_DERIVATION: u64 = 0x16;
pub const PSBT_IN_TAP_INTERNAL_KEY: u64 = 0x17;
pub const PSBT_IN_TAP_MERKLE_ROOT: u64 = 0x18;
pub const PSBT_IN_MUSIG2_PARTICIPANT_PUBKEYS: u64 = 0x1a;
pub const PSBT_IN_MUSIG2_PUB_NONCE: u64 = 0x1b;
pub const PSBT_IN_MUSIG2_PARTIAL_SIG: u64 = 0x1c;
pub const PSBT_IN_SP_ECDH_SHARE: u64 = 0x1d;
pub const PSBT_IN_SP_DLEQ: u64 = 0x1e;
pub const PSBT_IN_PROPRIETARY: u64 = 0xfc;

// Output key types
pub const PSBT_OUT_REDEEM_SCRIPT: u64 = 0x00;
pub const PSBT_OUT_WITNESS_SCRIPT: u64 = 0x01;
pub const PSBT_OUT_BIP32_DERIVATION: u64 = 0x02;
pub const PSBT_OUT_AMOUNT: u64 = 0x03;
pub const PSBT_OUT_SCRIPT: u64 = 0x04;
pub const PSBT_OUT_TAP_INTERNAL_KEY: u64 = 0x05;
pub const PSBT_OUT_TAP_TREE: u64 = 0x06;
pub const PSBT_OUT_TAP_BIP32_DERIVATION: u64 = 0x07;
pub const PSBT_OUT_MUSIG2_PARTICIPANT_PUBKEYS: u64 = 0x08;
pub const PSBT_OUT_SP_V0_INFO: u64 = 0x09;
pub const PSBT_OUT_PROPRIETARY: u64 = 0xfc;

const GLOBAL_KEY_TYPES: &[(u64, &str)] = &[
    (PSBT_GLOBAL_UNSIGNED_TX, "PSBT_GLOBAL_UNSIGNED_TX"),
    (PSBT_GLOBAL_XPUB, "PSBT_GLOBAL_XPUB"),
    (PSBT_GLOBAL_TX_VERSION, "PSBT_GLOBAL_TX_VERSION"),
    (PSBT_GLOBAL_FALLBACK_LOCKTIME, "PSBT_GLOBAL_FALLBACK_LOCKTIME"),
    (PSBT_GLOBAL_INPUT_COUNT, "PSBT_GLOBAL_INPUT_COUNT"),
    (PSBT_GLOBAL_OUTPUT_COUNT, "PSBT_GLOBAL_OUTPUT_COUNT"),
    (PSBT_GLOBAL_TX_MODIFIABLE, "PSBT_GLOBAL_TX_MODIFIABLE"),
    (PSBT_GLOBAL_SP_ECDH_SHARE, "PSBT_GLOBAL_SP_ECDH_SHARE"),
    (PSBT_GLOBAL_SP_DLEQ, "PSBT_GLOBAL_SP_DLEQ"),
    (PSBT_GLOBAL_VERSION, "PSBT_GLOBAL_VERSION"),
    (PSBT_GLOBAL_PROPRIETARY, "PSBT_GLOBAL_PROPRIETARY"),
];

const INPUT_KEY_TYPES: &[(u64, &str)] = &[
    (PSBT_IN_NON_WITNESS_UTXO, "PSBT_IN_NON_WITNESS_UTXO"),
    (PSBT_IN_WITNESS_UTXO, "PSBT_IN_WITNESS_UTXO"),
    (PSBT_IN_PARTIAL_SIG, "PSBT_IN_PARTIAL_SIG"),
    (PSBT_IN_SIGHASH_TYPE, "PSBT_IN_SIGHASH_TYPE"),
    (PSBT_IN_REDEEM_SCRIPT, "PSBT_IN_REDEEM_SCRIPT"),
    (PSBT_IN_WITNESS_SCRIPT, "PSBT_IN_WITNESS_SCRIPT"),
    (PSBT_IN_BIP32_DERIVATION, "PSBT_IN_BIP32_DERIVATION"),
    (PSBT_IN_FINAL_SCRIPTSIG, "PSBT_IN_FINAL_SCRIPTSIG"),
    (PSBT_IN_FINAL_SCRIPTWITNESS, "PSBT_IN_FINAL_SCRIPTWITNESS"),
    (PSBT_IN_POR_COMMITMENT, "PSBT_IN_POR_COMMITMENT"),
    (PSBT_IN_RIPEMD160, "PSBT_IN_RIPEMD160"),
    (PSBT_IN_SHA256, "PSBT_IN_SHA256"),
    (PSBT_IN_HASH160, "PSBT_IN_HASH160"),
    (PSBT_IN_HASH256, "PSBT_IN_HASH256"),
    (PSBT_IN_PREVIOUS_TXID, "PSBT_IN_PREVIOUS_TXID"),
    (PSBT_IN_OUTPUT_INDEX, "PSBT_IN_OUTPUT_INDEX"),
    (PSBT_IN_SEQUENCE, "PSBT_IN_SEQUENCE"),
    (PSBT_IN_REQUIRED_TIME_LOCKTIME, "PSBT_IN_REQUIRED_TIME_LOCKTIME"),
    (PSBT_IN_REQUIRED_HEIGHT_LOCKTIME, "PSBT_IN_REQUIRED_HEIGHT_LOCKTIME"),
    (PSBT_IN_TAP_KEY_SIG, "PSBT_IN_TAP_KEY_SIG"),
    (PSBT_IN_TAP_SCRIPT_SIG, "PSBT_IN_TAP_SCRIPT_SIG"),
    (PSBT_IN_TAP_LEAF_SCRIPT, "PSBT_IN_TAP_LEAF_SCRIPT"),
    (PSBT_IN_TAP_BIP32_DERIVATION, "PSBT_IN_TAP_BIP32_DERIVATION"),
    (PSBT_IN_TAP_INTERNAL_KEY, "PSBT_IN_TAP_INTERNAL_KEY"),
    (PSBT_IN_TAP_MERKLE_ROOT, "PSBT_IN_TAP_MERKLE_ROOT"),
    (PSBT_IN_MUSIG2_PARTICIPANT_PUBKEYS, "PSBT_IN_MUSIG2_PARTICIPANT_PUBKEYS"),
    (PSBT_IN_MUSIG2_PUB_NONCE, "PSBT_IN_MUSIG2_PUB_NONCE"),
    (PSBT_IN_MUSIG2_PARTIAL_SIG, "PSBT_IN_MUSIG2_PARTIAL_SIG"),
    (PSBT_IN_SP_ECDH_SHARE, "PSBT_IN_SP_ECDH_SHARE"),
    (PSBT_IN_SP_DLEQ, "PSBT_IN_SP_DLEQ"),
    (PSBT_IN_PROPRIETARY, "PSBT_IN_PROPRIETARY"),
];

const OUTPUT_KEY_TYPES: &[(u64, &str)] = &[
    (PSBT_OUT_REDEEM_SCRIPT, "PSBT_OUT_REDEEM_SCRIPT"),
    (PSBT_OUT_WITNESS_SCRIPT, "PSBT_OUT_WITNESS_SCRIPT"),
    (PSBT_OUT_BIP32_DERIVATION, "PSBT_OUT_BIP32_DERIVATION"),
    (PSBT_OUT_AMOUNT, "PSBT_OUT_AMOUNT"),
    (PSBT_OUT_SCRIPT, "PSBT_OUT_SCRIPT"),
    (PSBT_OUT_TAP_INTERNAL_KEY, "PSBT_OUT_TAP_INTERNAL_KEY"),
    (PSBT_OUT_TAP_TREE, "PSBT_OUT_TAP_TREE"),
    (PSBT_OUT_TAP_BIP32_DERIVATION, "PSBT_OUT_TAP_BIP32_DERIVATION"),
    (PSBT_OUT_MUSIG2_PARTICIPANT_PUBKEYS, "PSBT_OUT_MUSIG2_PARTICIPANT_PUBKEYS"),
    (PSBT_OUT_SP_V0_INFO, "PSBT_OUT_SP_V0_INFO"),
    (PSBT_OUT_PROPRIETARY, "PSBT_OUT_PROPRIETARY"),
];

/// PSBT map kind, used to disambiguate key types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MapKind {
    Global,
    Input,
    Output,
}

impl MapKind {
    fn key_types(self) -> &'static [(u64, &'static str)] {
        match self {
            MapKind::Global => GLOBAL_KEY_TYPES,
            MapKind::Input => INPUT_KEY_TYPES,
            MapKind::Output => OUTPUT_KEY_TYPES,
        }
    }

    /// Name of a key type in this map kind, `None` for unassigned codes
    pub fn key_type_name(self, key_type: u64) -> Option<&'static str> {
        self.key_types()
            .iter()
            .find(|(code, _)| *code == key_type)
            .map(|(_, name)| *name)
    }

    /// Marker returned for codes this map kind does not define
    pub fn unknown_key_type_name(self) -> &'static str {
        match self {
            MapKind::Global => "PSBT_GLOBAL_UNKNOWN",
            MapKind::Input => "PSBT_IN_UNKNOWN",
            MapKind::Output => "PSBT_OUT_UNKNOWN",
        }
    }
}

/// Get a human-readable name for a PSBT key type based on its map kind
///
/// Unassigned codes resolve to the map kind's unknown marker rather than
/// failing, since new key types may appear at any time.
pub fn key_type_name(kind: MapKind, key_type: u64) -> &'static str {
    kind.key_type_name(key_type)
        .unwrap_or_else(|| kind.unknown_key_type_name())
}
