//! Raw Transaction Decoding
//!
//! Decodes legacy and SegWit (BIP-144) transactions from their wire format.
//! Fields are kept as transmitted: txids are not byte-reversed, and version,
//! vout, sequence and locktime stay as raw 4-byte arrays with typed accessors
//! on top.

use crate::compact_size::read_compact_size;
use crate::constants::SEGWIT_MARKER;
use crate::error::{Error, Result};
use crate::reader::ByteReader;
use serde::Serialize;
use tracing::trace;

/// Smallest possible serialized input: txid + vout + empty script + sequence
const MIN_INPUT_SIZE: usize = 32 + 4 + 1 + 4;
/// Smallest possible serialized output: amount + empty script
const MIN_OUTPUT_SIZE: usize = 8 + 1;

/// A transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxInput {
    #[serde(serialize_with = "hex::serde::serialize")]
    txid: [u8; 32],
    #[serde(serialize_with = "hex::serde::serialize")]
    vout: [u8; 4],
    script_sig_len: u64,
    #[serde(serialize_with = "hex::serde::serialize")]
    script_sig: Vec<u8>,
    #[serde(serialize_with = "hex::serde::serialize")]
    sequence: [u8; 4],
}

impl TxInput {
    /// Create an input, rejecting a declared script length that disagrees with the script
    pub fn new(
        txid: [u8; 32],
        vout: [u8; 4],
        script_sig_len: u64,
        script_sig: Vec<u8>,
        sequence: [u8; 4],
    ) -> Result<Self> {
        check_len("scriptSig", script_sig_len, script_sig.len())?;
        Ok(Self {
            txid,
            vout,
            script_sig_len,
            script_sig,
            sequence,
        })
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let txid = reader.read_array()?;
        let vout = reader.read_array()?;
        let script_sig_len = read_compact_size(reader)?;
        let script_sig = reader.read_var_bytes(script_sig_len)?.to_vec();
        let sequence = reader.read_array()?;
        Self::new(txid, vout, script_sig_len, script_sig, sequence)
    }

    /// Previous txid in wire order
    pub fn txid(&self) -> &[u8; 32] {
        &self.txid
    }

    /// Previous txid in the byte-reversed order block explorers display
    pub fn txid_hex(&self) -> String {
        let mut display = self.txid;
        display.reverse();
        hex::encode(display)
    }

    /// Raw previous output index bytes
    pub fn vout(&self) -> &[u8; 4] {
        &self.vout
    }

    /// Previous output index
    pub fn vout_index(&self) -> u32 {
        u32::from_le_bytes(self.vout)
    }

    /// Declared scriptSig length
    pub fn script_sig_len(&self) -> u64 {
        self.script_sig_len
    }

    pub fn script_sig(&self) -> &[u8] {
        &self.script_sig
    }

    /// Raw sequence bytes
    pub fn sequence(&self) -> &[u8; 4] {
        &self.sequence
    }

    pub fn sequence_number(&self) -> u32 {
        u32::from_le_bytes(self.sequence)
    }
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutput {
    amount: u64,
    script_pubkey_len: u64,
    #[serde(serialize_with = "hex::serde::serialize")]
    script_pubkey: Vec<u8>,
}

impl TxOutput {
    /// Create an output, rejecting a declared script length that disagrees with the script
    pub fn new(amount: u64, script_pubkey_len: u64, script_pubkey: Vec<u8>) -> Result<Self> {
        check_len("scriptPubKey", script_pubkey_len, script_pubkey.len())?;
        Ok(Self {
            amount,
            script_pubkey_len,
            script_pubkey,
        })
    }

    /// Decode an output: 8-byte LE amount followed by a length-prefixed script
    ///
    /// This is also the layout of a PSBT_IN_WITNESS_UTXO value.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let amount = u64::from_le_bytes(reader.read_array()?);
        let script_pubkey_len = read_compact_size(reader)?;
        let script_pubkey = reader.read_var_bytes(script_pubkey_len)?.to_vec();
        Self::new(amount, script_pubkey_len, script_pubkey)
    }

    /// Amount in satoshis
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Declared scriptPubKey length
    pub fn script_pubkey_len(&self) -> u64 {
        self.script_pubkey_len
    }

    pub fn script_pubkey(&self) -> &[u8] {
        &self.script_pubkey
    }
}

/// A single witness stack element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WitnessItem {
    len: u64,
    #[serde(serialize_with = "hex::serde::serialize")]
    data: Vec<u8>,
}

impl WitnessItem {
    pub fn new(len: u64, data: Vec<u8>) -> Result<Self> {
        check_len("witness item", len, data.len())?;
        Ok(Self { len, data })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// The witness stack belonging to one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WitnessStack {
    items: Vec<WitnessItem>,
}

impl WitnessStack {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let count = read_compact_size(reader)?;
        let mut items = Vec::with_capacity(reader.capacity_hint(count, 1));
        for _ in 0..count {
            let len = read_compact_size(reader)?;
            let data = reader.read_var_bytes(len)?.to_vec();
            items.push(WitnessItem::new(len, data)?);
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[WitnessItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A decoded Bitcoin transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde(serialize_with = "hex::serde::serialize")]
    version: [u8; 4],
    witness_flag: Option<u8>,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    witnesses: Option<Vec<WitnessStack>>,
    #[serde(serialize_with = "hex::serde::serialize")]
    locktime: [u8; 4],
    base_size: usize,
    witness_size: usize,
}

impl Transaction {
    /// Decode a transaction from the start of `data`
    ///
    /// Bytes after the locktime are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::decode(&mut ByteReader::new(data))
    }

    /// Decode a transaction at the reader's position
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let start = reader.position();
        let version = reader.read_array()?;

        // A zero where the input count belongs is the BIP-144 marker
        let witness_flag = if reader.peek_u8()? == SEGWIT_MARKER {
            reader.read_u8()?;
            Some(reader.read_u8()?)
        } else {
            None
        };

        let input_count = read_compact_size(reader)?;
        let mut inputs = Vec::with_capacity(reader.capacity_hint(input_count, MIN_INPUT_SIZE));
        for _ in 0..input_count {
            inputs.push(TxInput::decode(reader)?);
        }

        let output_count = read_compact_size(reader)?;
        let mut outputs = Vec::with_capacity(reader.capacity_hint(output_count, MIN_OUTPUT_SIZE));
        for _ in 0..output_count {
            outputs.push(TxOutput::decode(reader)?);
        }

        let witness_start = reader.position();
        let witnesses = match witness_flag {
            Some(_) => Some(
                (0..inputs.len())
                    .map(|_| WitnessStack::decode(reader))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };
        let witness_size = reader.position() - witness_start;

        let locktime = reader.read_array()?;
        let base_size = reader.position() - start - witness_size;

        trace!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            segwit = witness_flag.is_some(),
            base_size,
            witness_size,
            "decoded transaction"
        );

        Ok(Self {
            version,
            witness_flag,
            inputs,
            outputs,
            witnesses,
            locktime,
            base_size,
            witness_size,
        })
    }

    /// Raw version bytes
    pub fn version(&self) -> &[u8; 4] {
        &self.version
    }

    pub fn version_number(&self) -> i32 {
        i32::from_le_bytes(self.version)
    }

    /// Whether the SegWit marker and flag were present
    pub fn is_segwit(&self) -> bool {
        self.witness_flag.is_some()
    }

    /// The flag byte following the SegWit marker
    pub fn witness_flag(&self) -> Option<u8> {
        self.witness_flag
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Per-input witness stacks, present only for SegWit transactions
    pub fn witnesses(&self) -> Option<&[WitnessStack]> {
        self.witnesses.as_deref()
    }

    /// Raw locktime bytes
    pub fn locktime(&self) -> &[u8; 4] {
        &self.locktime
    }

    pub fn lock_time(&self) -> u32 {
        u32::from_le_bytes(self.locktime)
    }

    /// Bytes consumed outside the witness stacks (marker and flag included)
    pub fn base_size(&self) -> usize {
        self.base_size
    }

    /// Bytes consumed by the witness stacks
    pub fn witness_size(&self) -> usize {
        self.witness_size
    }

    /// Total serialized length
    pub fn total_size(&self) -> usize {
        self.base_size + self.witness_size
    }

    /// `base_size * 4 + witness_size`
    pub fn weight(&self) -> u64 {
        self.base_size as u64 * 4 + self.witness_size as u64
    }

    /// Virtual size, `weight / 4`, unrounded
    pub fn vbytes(&self) -> f64 {
        self.weight() as f64 / 4.0
    }
}

fn check_len(field: &'static str, declared: u64, actual: usize) -> Result<()> {
    if declared != actual as u64 {
        return Err(Error::LengthMismatch {
            field,
            expected: declared,
            actual: actual as u64,
        });
    }
    Ok(())
}
