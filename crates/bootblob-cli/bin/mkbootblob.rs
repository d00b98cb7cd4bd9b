//! mkbootblob binary entry point.
//!
//! Thin wrapper around the bootblob-cli library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Builds (or inspects) the image and prints its layout table
//!
//! Failures print one `Error:` line with the full cause chain and exit 1.

use anyhow::Result;
use bootblob_cli::{Invocation, commands, init_logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    let invocation = Invocation::from_args();
    init_logging(invocation.cli.log_level);

    match run(&invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(invocation: &Invocation) -> Result<()> {
    if let Some(image) = &invocation.cli.inspect {
        let (header, len) = commands::inspect(image)?;
        println!("{} ({} bytes)\n", image.display(), len);
        print!("{}", commands::render_header(&header));
        return Ok(());
    }

    let report = commands::build(invocation)?;
    println!();
    print!("{}", report.layout);
    println!();

    if let Some(output) = &report.output {
        tracing::info!("image written to {}", output.display());
    }
    Ok(())
}
