//! QR Convert - CLI tool for converting Swiss QR-bill payloads between
//! their serialized representations.

use clap::Parser;
use qrpay::{any_format, Format, Result};
use std::fs;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "qrconvert")]
#[command(about = "Convert QR-bill payloads between formats", long_about = None)]
struct Cli {
    /// Input file path
    #[arg(long = "input")]
    input: String,

    /// Input format (spc, epc, json, xml, csv, namevalue); auto-detected
    /// when omitted
    #[arg(long = "from")]
    from: Option<String>,

    /// Output format (spc, epc, json, xml, csv, namevalue)
    #[arg(long = "to")]
    to: String,

    /// Output file path; stdout when omitted
    #[arg(long = "output")]
    output: Option<String>,

    /// Validate the decoded payloads and report field errors
    #[arg(long = "check")]
    check: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.input)?;
    let decoded = match &cli.from {
        Some(from) => Format::from_str(from)?.read(&text),
        None => any_format::read(&text),
    }?;

    for warning in &decoded.warnings {
        eprintln!("Warning: {}", warning);
    }

    if cli.check {
        let mut error_count = 0;
        for (index, content) in decoded.value.iter().enumerate() {
            for error in content.check() {
                eprintln!("Record {}: {}: {}", index + 1, error.field_name, error.message);
                error_count += 1;
            }
        }
        if error_count > 0 {
            eprintln!("{} validation error(s)", error_count);
        }
    }

    let to = Format::from_str(&cli.to)?;
    let output = to.write(&decoded.value)?;
    match &cli.output {
        Some(path) => fs::write(path, output)?,
        None => println!("{}", output),
    }
    Ok(())
}
