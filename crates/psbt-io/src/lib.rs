//! PSBT I/O Library
//!
//! Loads PSBTs from files or strings in binary, hex or base64 form, reads
//! recommended fee rates, and exports decoded structures as JSON.

pub mod error;
pub mod file_io;

pub use error::{IoError, Result};
pub use file_io::*;
