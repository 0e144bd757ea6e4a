//! PSBT Field Types
//!
//! Keys, values, key-value fields and the maps that hold them.

use crate::compact_size::{read_compact_size, CompactSize};
use crate::constants::{key_type_name, MapKind, PSBT_MAP_TERMINATOR};
use crate::error::{Error, Result};
use crate::reader::ByteReader;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A PSBT key: `<compact key_len><compact key_type><key_data>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsbtKey {
    key_len: u64,
    key_type: CompactSize,
    key_data: Vec<u8>,
    kind: MapKind,
}

impl PsbtKey {
    /// Create a key, checking `key_len == key_type width + key_data.len()`
    pub fn new(kind: MapKind, key_len: u64, key_type: CompactSize, key_data: Vec<u8>) -> Result<Self> {
        let actual = key_type.len as u64 + key_data.len() as u64;
        if key_len != actual {
            return Err(Error::LengthMismatch {
                field: "key",
                expected: key_len,
                actual,
            });
        }
        Ok(Self {
            key_len,
            key_type,
            key_data,
            kind,
        })
    }

    fn decode(reader: &mut ByteReader<'_>, kind: MapKind) -> Result<Self> {
        let key_len = read_compact_size(reader)?;
        let key_type = CompactSize::decode(reader)?;
        let data_len = key_len
            .checked_sub(key_type.len as u64)
            .ok_or(Error::LengthMismatch {
                field: "key",
                expected: key_len,
                actual: key_type.len as u64,
            })?;
        let key_data = reader.read_var_bytes(data_len)?.to_vec();
        Self::new(kind, key_len, key_type, key_data)
    }

    /// Declared key length (type code plus key data)
    pub fn key_len(&self) -> u64 {
        self.key_len
    }

    /// Numeric key type
    pub fn key_type(&self) -> u64 {
        self.key_type.value
    }

    /// Key data following the type code
    pub fn key_data(&self) -> &[u8] {
        &self.key_data
    }

    /// Map kind this key was read from
    pub fn kind(&self) -> MapKind {
        self.kind
    }

    /// Key type name for this key's map kind, or the kind's unknown marker
    pub fn type_name(&self) -> &'static str {
        key_type_name(self.kind, self.key_type.value)
    }

    /// Whether the key type is assigned for this map kind
    pub fn is_known(&self) -> bool {
        self.kind.key_type_name(self.key_type.value).is_some()
    }
}

impl Serialize for PsbtKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PsbtKey", 5)?;
        state.serialize_field("key_len", &self.key_len)?;
        state.serialize_field("key_type", &self.key_type.value)?;
        state.serialize_field("key_type_name", self.type_name())?;
        state.serialize_field("key_data", &hex::encode(&self.key_data))?;
        state.serialize_field("type", &self.kind)?;
        state.end()
    }
}

/// A PSBT value: `<compact val_len><val_data>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsbtValue {
    val_len: u64,
    #[serde(serialize_with = "hex::serde::serialize")]
    val_data: Vec<u8>,
}

impl PsbtValue {
    /// Create a value, checking `val_len == val_data.len()`
    pub fn new(val_len: u64, val_data: Vec<u8>) -> Result<Self> {
        if val_len != val_data.len() as u64 {
            return Err(Error::LengthMismatch {
                field: "value",
                expected: val_len,
                actual: val_data.len() as u64,
            });
        }
        Ok(Self { val_len, val_data })
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let val_len = read_compact_size(reader)?;
        let val_data = reader.read_var_bytes(val_len)?.to_vec();
        Self::new(val_len, val_data)
    }

    pub fn val_len(&self) -> u64 {
        self.val_len
    }

    pub fn data(&self) -> &[u8] {
        &self.val_data
    }
}

/// A single PSBT key-value field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsbtField {
    pub key: PsbtKey,
    pub value: PsbtValue,
}

impl PsbtField {
    /// Decode one key-value pair
    pub fn decode(reader: &mut ByteReader<'_>, kind: MapKind) -> Result<Self> {
        let key = PsbtKey::decode(reader, kind)?;
        let value = PsbtValue::decode(reader)?;
        Ok(Self { key, value })
    }

    /// Shorthand for the key's numeric type
    pub fn key_type(&self) -> u64 {
        self.key.key_type()
    }

    /// Shorthand for the value bytes
    pub fn value_data(&self) -> &[u8] {
        self.value.data()
    }
}

/// An ordered run of key-value fields, ended on the wire by `0x00`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsbtMap {
    kind: MapKind,
    fields: Vec<PsbtField>,
}

impl PsbtMap {
    /// Decode fields until the map terminator, consuming the terminator
    ///
    /// An immediate terminator yields an empty map.
    pub fn decode(reader: &mut ByteReader<'_>, kind: MapKind) -> Result<Self> {
        let mut fields = Vec::new();
        while reader.peek_u8()? != PSBT_MAP_TERMINATOR {
            fields.push(PsbtField::decode(reader, kind)?);
        }
        reader.read_u8()?;
        Ok(Self { kind, fields })
    }

    pub fn kind(&self) -> MapKind {
        self.kind
    }

    pub fn fields(&self) -> &[PsbtField] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &PsbtField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First field with the given key type
    pub fn get(&self, key_type: u64) -> Option<&PsbtField> {
        self.fields.iter().find(|f| f.key_type() == key_type)
    }

    /// Value bytes of the first field with the given key type
    pub fn value_of(&self, key_type: u64) -> Option<&[u8]> {
        self.get(key_type).map(PsbtField::value_data)
    }

    pub fn contains(&self, key_type: u64) -> bool {
        self.get(key_type).is_some()
    }
}
