//! Human-readable PSBT reports
//!
//! Renders [`PsbtInfo`] as the plain-text summary shown before signing and
//! judges its fee rate against a set of recommended fee tiers.

use crate::extractor::{InOutInfo, PsbtInfo};
use psbt_core::Psbt;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 60;

fn one() -> f64 {
    1.0
}

/// Recommended fee rates in sat/vB, as published by mempool-style fee estimators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRates {
    #[serde(default = "one")]
    pub fastest_fee: f64,
    #[serde(default = "one")]
    pub half_hour_fee: f64,
    #[serde(default = "one")]
    pub hour_fee: f64,
    #[serde(default = "one")]
    pub economy_fee: f64,
    #[serde(default = "one")]
    pub minimum_fee: f64,
}

impl Default for FeeRates {
    fn default() -> Self {
        Self {
            fastest_fee: 1.0,
            half_hour_fee: 1.0,
            hour_fee: 1.0,
            economy_fee: 1.0,
            minimum_fee: 1.0,
        }
    }
}

impl FeeRates {
    /// Every tier at the 1 sat/vB floor means nothing is waiting in the mempool
    pub fn is_empty_mempool(&self) -> bool {
        *self == Self::default()
    }
}

/// Where a fee rate falls against the recommended tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeeAssessment {
    EmptyMempool { excessive: bool },
    TooLow,
    HoursToDays,
    OverAnHour,
    HalfHourToHour,
    UnderHalfHour,
    NextBlock,
    HighButTolerable,
    Excessive,
    /// No fee rates were available to compare against
    Unavailable,
}

impl FeeAssessment {
    pub fn assess(fee_rate: f64, rates: Option<&FeeRates>) -> Self {
        let Some(rates) = rates else {
            return FeeAssessment::Unavailable;
        };

        if rates.is_empty_mempool() {
            FeeAssessment::EmptyMempool {
                excessive: fee_rate > 2.0,
            }
        } else if fee_rate < rates.minimum_fee {
            FeeAssessment::TooLow
        } else if fee_rate < rates.economy_fee {
            FeeAssessment::HoursToDays
        } else if fee_rate < rates.hour_fee {
            FeeAssessment::OverAnHour
        } else if fee_rate < rates.half_hour_fee {
            FeeAssessment::HalfHourToHour
        } else if fee_rate < rates.fastest_fee {
            FeeAssessment::UnderHalfHour
        } else if fee_rate <= 1.5 * rates.fastest_fee {
            FeeAssessment::NextBlock
        } else if fee_rate < 3.0 * rates.fastest_fee {
            FeeAssessment::HighButTolerable
        } else {
            FeeAssessment::Excessive
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FeeAssessment::EmptyMempool { .. } => {
                "Mempool is empty - transaction should confirm in next block regardless of fee"
            }
            FeeAssessment::TooLow => "Fee rate is too low",
            FeeAssessment::HoursToDays => "Transaction could take several hours to days to confirm",
            FeeAssessment::OverAnHour => "Transaction could take more than an hour to confirm",
            FeeAssessment::HalfHourToHour => {
                "Transaction should confirm between 30 minutes and an hour"
            }
            FeeAssessment::UnderHalfHour => "Transaction should take less than 30 minutes to confirm",
            FeeAssessment::NextBlock => "Transaction should confirm in less than 10 minutes",
            FeeAssessment::HighButTolerable => "Fee rate is high but tolerable",
            FeeAssessment::Excessive => "Fee rate is excessive/wasteful",
            FeeAssessment::Unavailable => "Could not fetch recommended fee rates",
        }
    }
}

impl fmt::Display for FeeAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())?;
        if let FeeAssessment::EmptyMempool { excessive: true } = self {
            write!(
                f,
                "\n{:16}Note: Supplied fee is excessive for current mempool conditions",
                ""
            )?;
        }
        Ok(())
    }
}

/// Format an integer with thousands separators
pub fn group_thousands(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn write_entry(out: &mut String, index: usize, entry: &InOutInfo, suffix: &str) -> fmt::Result {
    writeln!(
        out,
        "  [{}] {} sats | {} | {}{}",
        index,
        group_thousands(entry.amount.into()),
        entry.address_type,
        entry.script_type,
        suffix
    )
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Render the signing summary for a PSBT with complete UTXO data
pub fn render_summary(info: &PsbtInfo, rates: Option<&FeeRates>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_summary(&mut out, info, rates);
    out
}

fn write_summary(out: &mut String, info: &PsbtInfo, rates: Option<&FeeRates>) -> fmt::Result {
    writeln!(out, "{}", rule())?;
    writeln!(out, "PSBT SUMMARY")?;
    writeln!(out, "{}", rule())?;
    writeln!(out)?;
    writeln!(out, "PSBT Version: {}", info.version)?;

    writeln!(out)?;
    writeln!(out, "Inputs ({}):", info.inputs.len())?;
    for (i, input) in info.inputs.iter().enumerate() {
        write_entry(out, i, input, "")?;
    }

    writeln!(out)?;
    writeln!(out, "Outputs ({}):", info.outputs.len())?;
    for (i, output) in info.outputs.iter().enumerate() {
        let is_change = info.change_output.get(i).copied().unwrap_or(false);
        write_entry(out, i, output, if is_change { " (change output)" } else { "" })?;
    }

    writeln!(out)?;
    writeln!(out, "Transaction Summary:")?;
    writeln!(out, "  Total Input:  {} sats", group_thousands(info.total_input_amt.into()))?;
    writeln!(out, "  Total Output: {} sats", group_thousands(info.total_output_amt.into()))?;
    writeln!(out, "  Fee:          {} sats", group_thousands(info.fee_amt.into()))?;
    writeln!(out, "  Fee Rate:     ~{} sat/vB", info.fee_rate.round_ties_even())?;
    writeln!(out, "  Assessment:   {}", FeeAssessment::assess(info.fee_rate, rates))?;
    writeln!(out, "{}", rule())
}

/// Render what is known about a PSBT that still lacks UTXO data
pub fn render_early_stage(psbt: &Psbt) -> String {
    let mut out = String::new();
    let _ = write_early_stage(&mut out, psbt);
    out
}

fn write_early_stage(out: &mut String, psbt: &Psbt) -> fmt::Result {
    writeln!(out, "{}", rule())?;
    writeln!(out, "PSBT SUMMARY (early stage)")?;
    writeln!(out, "{}", rule())?;
    writeln!(out)?;
    writeln!(out, "PSBT Version: {}", psbt.version())?;
    writeln!(out, "Inputs:       {}", psbt.num_inputs())?;
    writeln!(out, "Outputs:      {}", psbt.num_outputs())?;
    writeln!(out)?;
    writeln!(
        out,
        "Input UTXO data has not been added yet; amounts, fee and fee rate"
    )?;
    writeln!(out, "are available once an updater fills in the inputs.")?;
    writeln!(out, "{}", rule())
}
