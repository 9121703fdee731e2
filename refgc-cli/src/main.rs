use std::path::Path;

use anyhow::Result;
use clap::{Arg, Command, error::ErrorKind};

use refgc_core::decompress_to_file;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "refgc";
    pub const DEFAULT_OUTPUT: &str = "reconstructed_sequence.txt";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Decompress a reference-encoded genomic target sequence.")
        .arg(
            Arg::new("reference")
                .long("reference")
                .short('r')
                .help("Path to the reference sequence file")
                .required(true),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .help("Path to the compressed target file")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file name")
                .default_value(consts::DEFAULT_OUTPUT),
        )
}

fn main() -> Result<()> {
    // Usage problems go to standard output and exit with status 1; only the
    // explicit --help/--version paths exit 0.
    let matches = match build_parser().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            println!("{err}");
            std::process::exit(code);
        }
    };

    let reference = matches
        .get_one::<String>("reference")
        .expect("reference is required");
    let target = matches
        .get_one::<String>("target")
        .expect("target is required");
    let output = matches
        .get_one::<String>("output")
        .expect("output has a default");

    decompress_to_file(Path::new(reference), Path::new(target), Path::new(output))
}
