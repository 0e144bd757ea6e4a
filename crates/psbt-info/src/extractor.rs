//! PSBT information extraction
//!
//! Walks a decoded [`Psbt`] and reconstructs what a signer wants to see before
//! approving it: the amount and script family of every input and output,
//! totals, fee, virtual size, fee rate and which outputs pay back to the
//! wallet.

use crate::derivation::Bip32Derivation;
use crate::script::ScriptType;
use crate::vsize::SizeEstimate;
use psbt_core::{
    le_uint, ByteReader, Error, Psbt, PsbtMap, PsbtVersion, Result, Transaction, TxOutput,
    PSBT_IN_NON_WITNESS_UTXO, PSBT_IN_OUTPUT_INDEX, PSBT_IN_WITNESS_UTXO,
    PSBT_OUT_AMOUNT, PSBT_OUT_BIP32_DERIVATION, PSBT_OUT_SCRIPT,
};
use serde::Serialize;
use tracing::debug;

/// Amount and classification of one input or output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InOutInfo {
    pub amount: u64,
    pub address_type: &'static str,
    pub script_type: ScriptType,
}

impl InOutInfo {
    fn new(amount: u64, script: &[u8]) -> Self {
        let script_type = ScriptType::classify(script);
        Self {
            amount,
            address_type: script_type.address_type(),
            script_type,
        }
    }
}

/// Summary of a PSBT with UTXO data for every input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PsbtInfo {
    pub version: PsbtVersion,
    pub total_input_amt: u64,
    pub total_output_amt: u64,
    /// Input total minus output total; negative for an overspending PSBT
    pub fee_amt: i64,
    /// Satoshis per virtual byte
    pub fee_rate: f64,
    pub vbytes: f64,
    /// One flag per output
    pub change_output: Vec<bool>,
    pub inputs: Vec<InOutInfo>,
    pub outputs: Vec<InOutInfo>,
}

/// Extract amounts, fee and classification from a decoded PSBT
///
/// Fails with [`Error::MissingUtxo`] for the first input that carries neither
/// a witness nor a non-witness UTXO.
pub fn extract(psbt: &Psbt) -> Result<PsbtInfo> {
    let unsigned_tx = match psbt.version() {
        PsbtVersion::V0 => Some(psbt.unsigned_tx().ok_or(Error::MissingField {
            field: "PSBT_GLOBAL_UNSIGNED_TX",
            index: 0,
        })?),
        PsbtVersion::V2 => None,
    };

    let inputs = psbt
        .inputs()
        .iter()
        .enumerate()
        .map(|(index, input)| input_info(index, input, unsigned_tx))
        .collect::<Result<Vec<_>>>()?;

    let outputs: Vec<InOutInfo> = match unsigned_tx {
        Some(tx) => tx
            .outputs()
            .iter()
            .map(|output| InOutInfo::new(output.amount(), output.script_pubkey()))
            .collect(),
        None => psbt
            .outputs()
            .iter()
            .enumerate()
            .map(|(index, output)| output_info(index, output))
            .collect::<Result<Vec<_>>>()?,
    };

    let total_input_amt = total(&inputs);
    let total_output_amt = total(&outputs);
    let fee_amt = fee(total_input_amt, total_output_amt);

    let vbytes = match unsigned_tx {
        Some(tx) => tx.vbytes(),
        None => SizeEstimate::from_maps(psbt.inputs(), psbt.outputs()).vbytes(),
    };
    let fee_rate = fee_amt as f64 / vbytes;

    let mut change_output = vec![false; outputs.len()];
    for (flag, output) in change_output.iter_mut().zip(psbt.outputs()) {
        if let Some(value) = output.value_of(PSBT_OUT_BIP32_DERIVATION) {
            *flag = Bip32Derivation::decode(value)?.is_change();
        }
    }

    debug!(
        version = %psbt.version(),
        total_input_amt,
        total_output_amt,
        fee_amt,
        vbytes,
        "extracted PSBT info"
    );

    Ok(PsbtInfo {
        version: psbt.version(),
        total_input_amt,
        total_output_amt,
        fee_amt,
        fee_rate,
        vbytes,
        change_output,
        inputs,
        outputs,
    })
}

fn input_info(index: usize, input: &PsbtMap, unsigned_tx: Option<&Transaction>) -> Result<InOutInfo> {
    if let Some(value) = input.value_of(PSBT_IN_NON_WITNESS_UTXO) {
        let vout = spent_output_index(index, input, unsigned_tx)?;
        let prev_tx = Transaction::from_bytes(value)?;
        let spent = usize::try_from(vout)
            .ok()
            .and_then(|vout| prev_tx.outputs().get(vout))
            .ok_or(Error::OutputIndexOutOfRange {
                input_index: index,
                vout,
                available: prev_tx.output_count(),
            })?;
        return Ok(InOutInfo::new(spent.amount(), spent.script_pubkey()));
    }

    if let Some(value) = input.value_of(PSBT_IN_WITNESS_UTXO) {
        let utxo = TxOutput::decode(&mut ByteReader::new(value))?;
        return Ok(InOutInfo::new(utxo.amount(), utxo.script_pubkey()));
    }

    Err(Error::MissingUtxo { input_index: index })
}

/// Output index in the previous transaction spent by input `index`
fn spent_output_index(index: usize, input: &PsbtMap, unsigned_tx: Option<&Transaction>) -> Result<u64> {
    if let Some(tx) = unsigned_tx {
        let tx_input = tx.inputs().get(index).ok_or(Error::MissingField {
            field: "unsigned transaction input",
            index,
        })?;
        return Ok(tx_input.vout_index().into());
    }

    let value = input.value_of(PSBT_IN_OUTPUT_INDEX).ok_or(Error::MissingField {
        field: "PSBT_IN_OUTPUT_INDEX",
        index,
    })?;
    let vout = le_uint("PSBT_IN_OUTPUT_INDEX", value)?;
    if vout > u64::from(u32::MAX) {
        return Err(Error::LengthMismatch {
            field: "PSBT_IN_OUTPUT_INDEX",
            expected: 4,
            actual: value.len() as u64,
        });
    }
    Ok(vout)
}

fn output_info(index: usize, output: &PsbtMap) -> Result<InOutInfo> {
    let amount = output.value_of(PSBT_OUT_AMOUNT).ok_or(Error::MissingField {
        field: "PSBT_OUT_AMOUNT",
        index,
    })?;
    let amount: [u8; 8] = amount.try_into().map_err(|_| Error::LengthMismatch {
        field: "PSBT_OUT_AMOUNT",
        expected: 8,
        actual: amount.len() as u64,
    })?;
    let script = output.value_of(PSBT_OUT_SCRIPT).ok_or(Error::MissingField {
        field: "PSBT_OUT_SCRIPT",
        index,
    })?;
    Ok(InOutInfo::new(u64::from_le_bytes(amount), script))
}

fn total(entries: &[InOutInfo]) -> u64 {
    entries
        .iter()
        .fold(0u64, |sum, entry| sum.saturating_add(entry.amount))
}

fn fee(total_input: u64, total_output: u64) -> i64 {
    let fee = i128::from(total_input) - i128::from(total_output);
    fee.clamp(i64::MIN.into(), i64::MAX.into()) as i64
}
