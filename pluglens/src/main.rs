use clap::Parser;
use pluglens::{init_subscriber, run, Cli, TracingConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_subscriber(&TracingConfig::from_verbosity(
        cli.quiet,
        cli.verbose,
        cli.log_format,
    ));

    match run(&cli, &mut std::io::stdout().lock()) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
