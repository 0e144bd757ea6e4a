//! PSBT Core Library
//!
//! Wire-level decoding for Bitcoin raw transactions and Partially Signed
//! Bitcoin Transactions.
//!
//! This crate provides:
//! - CompactSize integers
//! - Legacy and segwit transaction decoding with size/weight accounting
//! - PSBT v0 (BIP-174) and v2 (BIP-370) container decoding
//! - Key type constants and names

pub mod compact_size;
pub mod constants;
pub mod error;
pub mod field;
pub mod psbt;
pub mod reader;
pub mod transaction;

pub use compact_size::{read_compact_size, CompactSize};
pub use constants::*;
pub use error::{Error, Result};
pub use field::{PsbtField, PsbtKey, PsbtMap, PsbtValue};
pub use psbt::{Psbt, PsbtVersion};
pub use reader::{le_uint, ByteReader};
pub use transaction::{Transaction, TxInput, TxOutput, WitnessItem, WitnessStack};
