//! CSS module compiler: rewrites class selectors in one stylesheet
//! into globally unique tokens and writes an object file for the
//! linker.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use cssmod_core::error::Error;

#[derive(Parser, Debug)]
#[command(name = "cssmodc")]
#[command(about = "CSS module compiler: produces an object file with rewritten class selectors")]
struct Cli {
    /// Input CSS module (.css, or .scss expanded through sassc)
    input: PathBuf,
    /// Output object file
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let mut source = fs::read_to_string(&cli.input).map_err(|e| Error::io(&cli.input, e))?;

    if cli.input.extension().is_some_and(|ext| ext == "scss") {
        source = cssmod_cli::scss::expand(&source).map_err(|e| Error::io(&cli.input, e))?;
    }

    let artifact = cssmod_core::compile(&source, &cli.input)?;
    info!("writing css object file to {}", cli.output.display());
    artifact.write(&cli.output)
}
