//! End-to-end extraction tests
//!
//! PSBTs come from three sources: the BIP-174 test vectors, a small byte-level
//! builder for layouts other libraries refuse to produce (v2, early-stage,
//! malformed), and the `bitcoin` crate's own v0 serializer.

use bitcoin::bip32::{DerivationPath, Fingerprint};
use bitcoin::hashes::Hash;
use bitcoin::{
    absolute::LockTime, transaction::Version, Amount, OutPoint, ScriptBuf, Sequence, TxIn, TxOut,
    Txid, Witness,
};
use psbt_core::{Error, Psbt, PsbtVersion};
use psbt_info::{extract, render_early_stage, render_summary, FeeAssessment, FeeRates, ScriptType};
use std::collections::BTreeMap;
use std::str::FromStr;

/// BIP-174: "PSBT with one P2PKH input and one P2SH-P2WPKH input, both with no
/// UTXO data" (unsigned transaction only)
const BIP174_UNSIGNED_ONLY: &str = "70736274ff01009a020000000258e87a21b56daf0c23be8e7070456c336f7cbaa5c8757924f545887bb2abdd750000000000ffffffff838d0427d0ec650a68aa46bb0b098aea4422c071b2ca78352a077959d07cea1d0100000000ffffffff0270aaf00800000000160014d85c2b71d0060b09c9886aeb815e50991dda124d00e1f5050000000016001400aea9a2e5f0f876a588df5546e8742d1d87008f000000000000000000";

const G_PUBKEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

fn p2wpkh(fill: u8) -> Vec<u8> {
    let mut script = vec![0x00, 0x14];
    script.extend_from_slice(&[fill; 20]);
    script
}

fn p2tr(fill: u8) -> Vec<u8> {
    let mut script = vec![0x51, 0x20];
    script.extend_from_slice(&[fill; 32]);
    script
}

fn p2pkh(fill: u8) -> Vec<u8> {
    let mut script = vec![0x76, 0xa9, 0x14];
    script.extend_from_slice(&[fill; 20]);
    script.extend_from_slice(&[0x88, 0xac]);
    script
}

fn compact_size(n: usize) -> Vec<u8> {
    match n {
        0..=0xfc => vec![n as u8],
        0xfd..=0xffff => {
            let mut out = vec![0xfd];
            out.extend_from_slice(&(n as u16).to_le_bytes());
            out
        }
        _ => {
            let mut out = vec![0xfe];
            out.extend_from_slice(&(n as u32).to_le_bytes());
            out
        }
    }
}

fn witness_utxo(amount: u64, script: &[u8]) -> Vec<u8> {
    let mut value = amount.to_le_bytes().to_vec();
    value.extend(compact_size(script.len()));
    value.extend_from_slice(script);
    value
}

fn derivation(path: &[u32]) -> Vec<u8> {
    let mut value = vec![0xd9, 0x0c, 0x6a, 0x4f];
    for index in path {
        value.extend_from_slice(&index.to_le_bytes());
    }
    value
}

const H: u32 = 0x8000_0000;

/// Byte-level PSBT builder
struct PsbtBytes {
    bytes: Vec<u8>,
}

impl PsbtBytes {
    fn new() -> Self {
        Self {
            bytes: b"psbt\xff".to_vec(),
        }
    }

    fn field(mut self, key_type: u8, key_data: &[u8], value: &[u8]) -> Self {
        self.bytes.extend(compact_size(1 + key_data.len()));
        self.bytes.push(key_type);
        self.bytes.extend_from_slice(key_data);
        self.bytes.extend(compact_size(value.len()));
        self.bytes.extend_from_slice(value);
        self
    }

    fn end_map(mut self) -> Self {
        self.bytes.push(0x00);
        self
    }

    fn decode(&self) -> Psbt {
        Psbt::deserialize(&self.bytes).unwrap()
    }
}

/// v2 global map with the given counts
fn v2_global(input_count: u8, output_count: u8) -> PsbtBytes {
    PsbtBytes::new()
        .field(0x02, &[], &2u32.to_le_bytes())
        .field(0x03, &[], &0u32.to_le_bytes())
        .field(0x04, &[], &[input_count])
        .field(0x05, &[], &[output_count])
        .field(0xfb, &[], &2u32.to_le_bytes())
        .end_map()
}

fn v2_two_outputs() -> PsbtBytes {
    v2_global(1, 2)
        .field(0x0e, &[], &[0xab; 32])
        .field(0x0f, &[], &0u32.to_le_bytes())
        .field(0x01, &[], &witness_utxo(100_000, &p2tr(0x01)))
        .end_map()
        .field(0x03, &[], &60_000u64.to_le_bytes())
        .field(0x04, &[], &p2wpkh(0x02))
        .end_map()
        .field(0x03, &[], &39_000u64.to_le_bytes())
        .field(0x04, &[], &p2tr(0x03))
        .field(0x02, &[0x11; 33], &derivation(&[86 | H, H, H, 1, 0]))
        .end_map()
}

#[test]
fn test_bip174_vector_without_utxos() {
    let bytes = hex::decode(BIP174_UNSIGNED_ONLY).unwrap();
    let psbt = Psbt::deserialize(&bytes).unwrap();

    assert_eq!(psbt.version(), PsbtVersion::V0);
    assert_eq!(psbt.num_inputs(), 2);
    assert_eq!(psbt.num_outputs(), 2);

    let tx = psbt.unsigned_tx().unwrap();
    assert_eq!(tx.outputs()[0].amount(), 149_990_000);
    assert_eq!(tx.outputs()[1].amount(), 100_000_000);
    assert_eq!(
        tx.inputs()[0].txid_hex(),
        "75ddabb27b8845f5247975c8a5ba7c6f336c4570708ebe230caf6db5217ae858"
    );

    let err = extract(&psbt).unwrap_err();
    assert_eq!(err, Error::MissingUtxo { input_index: 0 });

    let text = render_early_stage(&psbt);
    assert!(text.contains("PSBT Version: 0"));
    assert!(text.contains("Inputs:       2"));
    assert!(text.contains("Outputs:      2"));
}

#[test]
fn test_v0_witness_utxo_amounts() {
    let mut unsigned = 2u32.to_le_bytes().to_vec();
    unsigned.push(1);
    unsigned.extend_from_slice(&[0x42; 32]);
    unsigned.extend_from_slice(&0u32.to_le_bytes());
    unsigned.push(0);
    unsigned.extend_from_slice(&0xffff_fffdu32.to_le_bytes());
    unsigned.push(1);
    unsigned.extend(witness_utxo(50_000, &p2wpkh(0x09)));
    unsigned.extend_from_slice(&0u32.to_le_bytes());

    let psbt = PsbtBytes::new()
        .field(0x00, &[], &unsigned)
        .end_map()
        .field(0x01, &[], &witness_utxo(100_000, &p2wpkh(0x08)))
        .end_map()
        .end_map()
        .decode();

    let info = extract(&psbt).unwrap();
    assert_eq!(info.total_input_amt, 100_000);
    assert_eq!(info.total_output_amt, 50_000);
    assert_eq!(info.fee_amt, 50_000);
    assert!(info.fee_rate > 0.0);

    // 1-in 1-out legacy serialization of a P2WPKH spend
    assert_eq!(info.vbytes, unsigned.len() as f64);
    assert_eq!(info.vbytes, 82.0);
}

#[test]
fn test_v2_amounts_and_change() {
    let psbt = v2_two_outputs().decode();
    assert_eq!(psbt.version(), PsbtVersion::V2);

    let info = extract(&psbt).unwrap();
    assert_eq!(info.total_input_amt, 100_000);
    assert_eq!(info.total_output_amt, 99_000);
    assert_eq!(info.fee_amt, 1_000);
    assert_eq!(info.inputs[0].script_type, ScriptType::P2tr);
    assert_eq!(info.inputs[0].address_type, "Native SegWit v1");
    assert_eq!(info.outputs[0].script_type, ScriptType::P2wpkh);
    assert_eq!(info.outputs[1].script_type, ScriptType::P2tr);
    assert_eq!(info.change_output, vec![false, true]);

    // 10 + 41 + (9 + 22) + (9 + 34)
    assert_eq!(info.vbytes, 125.0);
    assert_eq!(info.fee_rate, 8.0);
}

#[test]
fn test_v2_final_witness_changes_estimate() {
    let psbt = v2_global(1, 1)
        .field(0x0f, &[], &[0x00])
        .field(0x01, &[], &witness_utxo(20_000, &p2wpkh(0x01)))
        .field(0x08, &[], &[0x5a; 66])
        .end_map()
        .field(0x03, &[], &19_000u64.to_le_bytes())
        .field(0x04, &[], &p2pkh(0x02))
        .end_map()
        .decode();

    let info = extract(&psbt).unwrap();
    // base: 10 + 41 + 2 (marker, flag) + 9 + 25 = 87; witness: 66
    assert_eq!(info.vbytes, (87.0 * 4.0 + 66.0) / 4.0);
    assert_eq!(info.outputs[0].address_type, "Legacy / Base58");
}

#[test]
fn test_v2_early_stage() {
    let psbt = v2_global(0, 0).decode();
    assert_eq!(psbt.num_inputs(), 0);

    let info = extract(&psbt).unwrap();
    assert_eq!(info.total_input_amt, 0);
    assert_eq!(info.fee_amt, 0);
    assert_eq!(info.vbytes, 10.0);

    let psbt = v2_global(1, 0)
        .field(0x0e, &[], &[0xab; 32])
        .end_map()
        .decode();
    assert_eq!(
        extract(&psbt).unwrap_err(),
        Error::MissingUtxo { input_index: 0 }
    );
}

#[test]
fn test_v2_non_witness_utxo_needs_output_index() {
    let mut prev = 2u32.to_le_bytes().to_vec();
    prev.push(1);
    prev.extend_from_slice(&[0x01; 32]);
    prev.extend_from_slice(&[0; 4]);
    prev.push(0);
    prev.extend_from_slice(&[0xff; 4]);
    prev.push(2);
    prev.extend(witness_utxo(5_000, &p2pkh(0x01)));
    prev.extend(witness_utxo(7_000, &p2pkh(0x02)));
    prev.extend_from_slice(&[0; 4]);

    let without_index = v2_global(1, 0)
        .field(0x00, &[], &prev)
        .end_map()
        .decode();
    assert_eq!(
        extract(&without_index).unwrap_err(),
        Error::MissingField {
            field: "PSBT_IN_OUTPUT_INDEX",
            index: 0
        }
    );

    let with_index = v2_global(1, 0)
        .field(0x00, &[], &prev)
        .field(0x0f, &[], &1u32.to_le_bytes())
        .end_map()
        .decode();
    let info = extract(&with_index).unwrap();
    assert_eq!(info.total_input_amt, 7_000);
    assert_eq!(info.inputs[0].script_type, ScriptType::P2pkh);
}

#[test]
fn test_v2_output_without_amount() {
    let psbt = v2_global(0, 1)
        .field(0x04, &[], &p2wpkh(0x01))
        .end_map()
        .decode();
    assert_eq!(
        extract(&psbt).unwrap_err(),
        Error::MissingField {
            field: "PSBT_OUT_AMOUNT",
            index: 0
        }
    );
}

#[test]
fn test_summary_with_fee_rates() {
    let info = extract(&v2_two_outputs().decode()).unwrap();
    let rates: FeeRates = serde_json::from_str(
        r#"{"fastestFee": 6, "halfHourFee": 4, "hourFee": 3, "economyFee": 2, "minimumFee": 1}"#,
    )
    .unwrap();

    assert_eq!(
        FeeAssessment::assess(info.fee_rate, Some(&rates)),
        FeeAssessment::NextBlock
    );

    let text = render_summary(&info, Some(&rates));
    assert!(text.contains("PSBT Version: 2"));
    assert!(text.contains("  [1] 39,000 sats | Native SegWit v1 | P2TR (change output)"));
    assert!(text.contains("  Total Output: 99,000 sats"));
    assert!(text.contains("  Fee Rate:     ~8 sat/vB"));
    assert!(text.contains("Transaction should confirm in less than 10 minutes"));
}

#[test]
fn test_info_json() {
    let info = extract(&v2_two_outputs().decode()).unwrap();
    let json = serde_json::to_value(&info).unwrap();

    assert_eq!(json["version"], 2);
    assert_eq!(json["fee_amt"], 1_000);
    assert_eq!(json["outputs"][0]["script_type"], "P2WPKH");
    assert_eq!(json["change_output"][1], true);
}

fn bitcoin_tx(inputs: Vec<OutPoint>, outputs: Vec<TxOut>) -> bitcoin::Transaction {
    bitcoin::Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: inputs
            .into_iter()
            .map(|previous_output| TxIn {
                previous_output,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                witness: Witness::new(),
            })
            .collect(),
        output: outputs,
    }
}

fn tx_out(sats: u64, script: Vec<u8>) -> TxOut {
    TxOut {
        value: Amount::from_sat(sats),
        script_pubkey: ScriptBuf::from_bytes(script),
    }
}

#[test]
fn test_matches_bitcoin_crate_psbt() {
    let prev = bitcoin_tx(
        vec![OutPoint::new(Txid::from_byte_array([0x05; 32]), 0)],
        vec![tx_out(30_000, p2pkh(0x01)), tx_out(70_000, p2pkh(0x02))],
    );
    let unsigned = bitcoin_tx(
        vec![
            OutPoint::new(Txid::from_byte_array([0x06; 32]), 3),
            OutPoint::new(prev.compute_txid(), 1),
        ],
        vec![tx_out(150_000, p2wpkh(0x03)), tx_out(69_000, p2wpkh(0x04))],
    );

    let mut psbt = bitcoin::psbt::Psbt::from_unsigned_tx(unsigned.clone()).unwrap();
    psbt.inputs[0].witness_utxo = Some(tx_out(150_500, p2tr(0x07)));
    psbt.inputs[1].non_witness_utxo = Some(prev);

    let pubkey = bitcoin::secp256k1::PublicKey::from_str(G_PUBKEY).unwrap();
    let origin = (
        Fingerprint::from_str("d90c6a4f").unwrap(),
        DerivationPath::from_str("m/84'/0'/0'/1/3").unwrap(),
    );
    psbt.outputs[1].bip32_derivation = BTreeMap::from([(pubkey, origin)]);

    let decoded = Psbt::deserialize(&psbt.serialize()).unwrap();
    let info = extract(&decoded).unwrap();

    assert_eq!(info.total_input_amt, 150_500 + 70_000);
    assert_eq!(info.total_output_amt, 219_000);
    assert_eq!(info.fee_amt, 1_500);
    assert_eq!(info.inputs[0].script_type, ScriptType::P2tr);
    assert_eq!(info.inputs[1].script_type, ScriptType::P2pkh);
    assert_eq!(info.change_output, vec![false, true]);
    assert_eq!(info.vbytes, unsigned.weight().to_wu() as f64 / 4.0);
    assert_eq!(info.vbytes, unsigned.vsize() as f64);
}
