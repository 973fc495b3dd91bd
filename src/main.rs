use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use feynwick::contract::contract_diagrams;
use feynwick::input::ProcessFile;
use feynwick::writer::{write_process, OutFormat};

/// Enumerate Wick contractions of quantum field operator products
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {
    /// Forbid contractions between two external operators (LSZ reduction)
    #[clap(short, long)]
    lsz: bool,

    /// Output format
    #[clap(short, long, value_enum, default_value = "yaml")]
    format: OutFormat,

    /// Output file
    #[clap(short, long)]
    outfile: Option<PathBuf>,

    /// Process files
    #[clap()]
    infiles: Vec<PathBuf>,
}

fn write_contractions(args: Args, mut out: impl Write) -> Result<()> {
    for filename in &args.infiles {
        info!("Reading processes from {filename:?}");
        let file = File::open(filename)
            .with_context(|| format!("Failed to read {filename:?}"))?;
        let processes: ProcessFile = serde_yaml::from_reader(
            BufReader::new(file),
        )
        .with_context(|| format!("Reading from {filename:?}"))?;

        for (name, process) in &processes.processes {
            let operators = process
                .operators(&processes.fields)
                .with_context(|| format!("Reading operators of `{name}`"))?;
            debug!("Contracting `{name}`: {} operators", operators.len());
            let contractions = contract_diagrams(&operators, args.lsz)
                .with_context(|| format!("Contracting `{name}`"))?;
            write_process(&mut out, name, &contractions, args.format)
                .with_context(|| format!("Writing contractions of `{name}`"))?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();

    if let Some(filename) = &args.outfile {
        let out = BufWriter::new(File::create(filename)?);
        write_contractions(args, out)
    } else {
        write_contractions(args, std::io::stdout())
    }
}
