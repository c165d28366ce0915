//! CSS module linker: combines object files into one stylesheet,
//! writes per-source class-map JSON mirrored under the build
//! directory, then touches the sentinel file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cssmod_core::error::Error;

#[derive(Parser, Debug)]
#[command(name = "cssmodl")]
#[command(about = "CSS module linker: combines object files produced by cssmodc")]
struct Cli {
    /// Target sentinel file, touched last once all outputs exist
    sentinel: PathBuf,
    /// Root of the source tree the module paths are relative to
    source_root: PathBuf,
    /// Build directory receiving the combined CSS and class maps
    build_root: PathBuf,
    /// Object files, in bundle order
    #[arg(required = true)]
    objects: Vec<PathBuf>,
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
    cssmod_core::link(&cli.objects, &cli.source_root, &cli.build_root, &cli.sentinel)?;
    Ok(())
}
