use clap::{Arg, Command, arg};

pub const DECOMPOSE_CMD: &str = "decompose";

pub fn create_decompose_cli() -> Command {
    Command::new(DECOMPOSE_CMD)
        .about("Split multi-allelic records into minimal bi-allelic records")
        .arg_required_else_help(true)
        .arg(Arg::new("vcf").required(true).help("Input VCF, optionally gzipped"))
        .arg(arg!(-o --output <output> "Output file (default: stdout)"))
        .arg(arg!(-r --reference <reference> "Reference FASTA used to left-align indels"))
        .arg(arg!(--json "Write one JSON record per line instead of VCF"))
}
