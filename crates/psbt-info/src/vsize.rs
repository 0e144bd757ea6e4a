//! Virtual size estimation for PSBT v2
//!
//! A v2 PSBT carries no serialized transaction, so its size is assembled from
//! fixed per-field widths plus whatever script material the maps already hold.
//! Compact-size prefixes are assumed to take one byte. The result tracks the
//! eventual broadcast size only loosely, and not at all before finalization.

use psbt_core::{
    PsbtMap, PSBT_IN_FINAL_SCRIPTSIG, PSBT_IN_FINAL_SCRIPTWITNESS, PSBT_IN_WITNESS_SCRIPT,
    PSBT_OUT_SCRIPT,
};
use serde::Serialize;

// version + input count + output count + locktime
const TX_OVERHEAD: usize = 4 + 1 + 1 + 4;
// txid + vout + scriptSig length + sequence
const INPUT_BASE: usize = 32 + 4 + 1 + 4;
// amount + scriptPubKey length
const OUTPUT_BASE: usize = 8 + 1;
const SEGWIT_MARKER_FLAG: usize = 2;

/// Estimated transaction size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeEstimate {
    pub base_size: usize,
    pub witness_size: usize,
    pub is_segwit: bool,
}

impl SizeEstimate {
    /// Estimate from v2 input and output maps
    pub fn from_maps(inputs: &[PsbtMap], outputs: &[PsbtMap]) -> Self {
        let mut base_size = TX_OVERHEAD;
        let mut witness_size = 0;
        let mut is_segwit = false;

        for input in inputs {
            base_size += INPUT_BASE;
            for field in input.iter() {
                match field.key_type() {
                    PSBT_IN_FINAL_SCRIPTSIG => base_size += field.value_data().len(),
                    PSBT_IN_WITNESS_SCRIPT | PSBT_IN_FINAL_SCRIPTWITNESS => {
                        witness_size += field.value_data().len();
                        is_segwit = true;
                    }
                    _ => {}
                }
            }
        }

        if is_segwit {
            base_size += SEGWIT_MARKER_FLAG;
        }

        for output in outputs {
            base_size += OUTPUT_BASE;
            base_size += output
                .iter()
                .filter(|field| field.key_type() == PSBT_OUT_SCRIPT)
                .map(|field| field.value_data().len())
                .sum::<usize>();
        }

        Self {
            base_size,
            witness_size,
            is_segwit,
        }
    }

    pub fn weight(&self) -> u64 {
        self.base_size as u64 * 4 + self.witness_size as u64
    }

    pub fn vbytes(&self) -> f64 {
        self.weight() as f64 / 4.0
    }
}
