//! PSBT Container Decoding
//!
//! Decodes BIP-174 (version 0) and BIP-370 (version 2) PSBTs into their
//! global, per-input and per-output maps. The two versions share a wire
//! layout but disagree on where the input/output counts live: a v0 PSBT
//! embeds the unsigned transaction, a v2 PSBT states the counts directly.

use crate::constants::*;
use crate::error::{Error, Result};
use crate::field::PsbtMap;
use crate::reader::{le_uint, ByteReader};
use crate::transaction::Transaction;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, warn};

/// PSBT container version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PsbtVersion {
    /// BIP-174: the global map carries the unsigned transaction
    V0,
    /// BIP-370: transaction fields are stored individually
    V2,
}

impl PsbtVersion {
    pub fn number(self) -> u32 {
        match self {
            PsbtVersion::V0 => 0,
            PsbtVersion::V2 => 2,
        }
    }
}

impl TryFrom<u32> for PsbtVersion {
    type Error = Error;

    fn try_from(version: u32) -> Result<Self> {
        match version {
            0 => Ok(PsbtVersion::V0),
            2 => Ok(PsbtVersion::V2),
            other => Err(Error::InvalidVersion(other)),
        }
    }
}

impl fmt::Display for PsbtVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for PsbtVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.number())
    }
}

/// A decoded PSBT
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Psbt {
    version: PsbtVersion,
    global_map: PsbtMap,
    input_maps: Vec<PsbtMap>,
    output_maps: Vec<PsbtMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unsigned_tx: Option<Transaction>,
}

impl Psbt {
    /// Deserialize a PSBT from bytes
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        Self::decode(&mut ByteReader::new(data))
    }

    /// Decode a PSBT at the reader's position
    ///
    /// Bytes after the last output map are left unread.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        read_magic(reader)?;

        let global_map = PsbtMap::decode(reader, MapKind::Global)?;
        let version = detect_version(&global_map)?;

        let (unsigned_tx, input_count, output_count) = match version {
            PsbtVersion::V0 => {
                let tx_bytes = global_map
                    .value_of(PSBT_GLOBAL_UNSIGNED_TX)
                    .ok_or(Error::UndeterminedVersion)?;
                let tx = Transaction::from_bytes(tx_bytes)?;
                let (input_count, output_count) = (tx.input_count() as u64, tx.output_count() as u64);
                (Some(tx), input_count, output_count)
            }
            PsbtVersion::V2 => {
                let input_count = declared_count(&global_map, PSBT_GLOBAL_INPUT_COUNT, "PSBT_GLOBAL_INPUT_COUNT")?;
                let output_count = declared_count(&global_map, PSBT_GLOBAL_OUTPUT_COUNT, "PSBT_GLOBAL_OUTPUT_COUNT")?;
                (None, input_count, output_count)
            }
        };

        debug!(%version, input_count, output_count, "decoding PSBT maps");

        let input_maps = decode_maps(reader, input_count, MapKind::Input)?;
        let output_maps = decode_maps(reader, output_count, MapKind::Output)?;

        Ok(Self {
            version,
            global_map,
            input_maps,
            output_maps,
            unsigned_tx,
        })
    }

    pub fn version(&self) -> PsbtVersion {
        self.version
    }

    /// Global map
    pub fn global(&self) -> &PsbtMap {
        &self.global_map
    }

    /// Per-input maps, in input order
    pub fn inputs(&self) -> &[PsbtMap] {
        &self.input_maps
    }

    /// Per-output maps, in output order
    pub fn outputs(&self) -> &[PsbtMap] {
        &self.output_maps
    }

    /// The transaction embedded in a v0 global map
    pub fn unsigned_tx(&self) -> Option<&Transaction> {
        self.unsigned_tx.as_ref()
    }

    /// Get the number of inputs
    pub fn num_inputs(&self) -> usize {
        self.input_maps.len()
    }

    /// Get the number of outputs
    pub fn num_outputs(&self) -> usize {
        self.output_maps.len()
    }
}

fn read_magic(reader: &mut ByteReader<'_>) -> Result<()> {
    let start = reader.position();
    let found = reader.read_bytes(PSBT_MAGIC.len().min(reader.remaining()))?;
    if found != &PSBT_MAGIC[..found.len()] {
        return Err(Error::InvalidMagic {
            found: found.to_vec(),
        });
    }
    if found.len() < PSBT_MAGIC.len() {
        return Err(Error::TruncatedInput {
            offset: start + found.len(),
            needed: PSBT_MAGIC.len() - found.len(),
            remaining: 0,
        });
    }

    let separator = reader.read_u8()?;
    if separator != PSBT_SEPARATOR {
        return Err(Error::InvalidSeparator(separator));
    }
    Ok(())
}

/// The first UNSIGNED_TX or TX_VERSION key in the global map decides the version
fn detect_version(global_map: &PsbtMap) -> Result<PsbtVersion> {
    let version = global_map
        .iter()
        .find_map(|field| match field.key_type() {
            PSBT_GLOBAL_UNSIGNED_TX => Some(PsbtVersion::V0),
            PSBT_GLOBAL_TX_VERSION => Some(PsbtVersion::V2),
            _ => None,
        })
        .ok_or(Error::UndeterminedVersion)?;

    if let Some(value) = global_map.value_of(PSBT_GLOBAL_VERSION) {
        let bytes: [u8; 4] = value.try_into().map_err(|_| Error::LengthMismatch {
            field: "PSBT_GLOBAL_VERSION",
            expected: 4,
            actual: value.len() as u64,
        })?;
        let declared = PsbtVersion::try_from(u32::from_le_bytes(bytes))?;
        if declared != version {
            warn!(
                %declared,
                detected = %version,
                "PSBT_GLOBAL_VERSION disagrees with the global map layout"
            );
        }
    }

    Ok(version)
}

/// A v2 count, defaulting to zero when the creator has not declared it yet
fn declared_count(global_map: &PsbtMap, key_type: u64, field: &'static str) -> Result<u64> {
    global_map
        .value_of(key_type)
        .map(|value| le_uint(field, value))
        .transpose()
        .map(|count| count.unwrap_or(0))
}

fn decode_maps(reader: &mut ByteReader<'_>, count: u64, kind: MapKind) -> Result<Vec<PsbtMap>> {
    let mut maps = Vec::with_capacity(reader.capacity_hint(count, 1));
    for _ in 0..count {
        maps.push(PsbtMap::decode(reader, kind)?);
    }
    Ok(maps)
}
