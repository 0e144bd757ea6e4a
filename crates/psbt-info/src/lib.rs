//! PSBT Information Library
//!
//! Derived information for decoded PSBTs: per-input and per-output amounts,
//! script and address classification, totals, fee, virtual size, fee rate and
//! change detection, plus the plain-text report built from them.

pub mod derivation;
pub mod extractor;
pub mod report;
pub mod script;
pub mod vsize;

pub use derivation::{Bip32Derivation, ChildNumber};
pub use extractor::{extract, InOutInfo, PsbtInfo};
pub use report::{render_early_stage, render_summary, FeeAssessment, FeeRates};
pub use script::ScriptType;
pub use vsize::SizeEstimate;
