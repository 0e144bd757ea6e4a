//! PSBT Report
//!
//! Command-line tool that decodes a PSBT file and prints what a signer needs
//! to check: amounts, script types, change outputs, fee and fee rate.

use clap::Parser;
use psbt_info::{extract, render_early_stage, render_summary};
use psbt_io::{load_fee_rates, load_psbt, to_json_pretty, InputFormat, IoError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "psbt-report")]
#[command(author, version, about = "Summarize a Partially Signed Bitcoin Transaction", long_about = None)]
struct Args {
    /// PSBT file (binary, hex or base64)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Input encoding
    #[arg(long, value_name = "FORMAT", default_value_t = InputFormat::Auto)]
    format: InputFormat,

    /// Print the extracted summary as JSON
    #[arg(long, conflicts_with = "dump")]
    json: bool,

    /// Print every decoded map and field as JSON
    #[arg(long)]
    dump: bool,

    /// JSON document of recommended fee rates (mempool.space format)
    #[arg(long, value_name = "FILE")]
    fee_rates: Option<PathBuf>,

    /// Log decoding steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: &Args) -> Result<(), IoError> {
    let psbt = load_psbt(&args.file, args.format)?;
    debug!(
        version = %psbt.version(),
        inputs = psbt.num_inputs(),
        outputs = psbt.num_outputs(),
        "loaded {}",
        args.file.display()
    );

    if args.dump {
        println!("{}", to_json_pretty(&psbt)?);
        return Ok(());
    }

    let rates = args.fee_rates.as_ref().map(load_fee_rates).transpose()?;

    match extract(&psbt) {
        Ok(info) if args.json => println!("{}", to_json_pretty(&info)?),
        Ok(info) => print!("{}", render_summary(&info, rates.as_ref())),
        Err(e) if e.is_missing_utxo() => {
            warn!("{}", e);
            print!("{}", render_early_stage(&psbt));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
