use clap::{Arg, Command, arg};

pub const DOSAGE_CMD: &str = "dosage";

pub fn create_dosage_cli() -> Command {
    Command::new(DOSAGE_CMD)
        .about("Per-sample copy counts of every alternate allele")
        .arg_required_else_help(true)
        .arg(Arg::new("vcf").required(true).help("Input VCF, optionally gzipped"))
        .arg(arg!(-o --output <output> "Output file (default: stdout)"))
        .arg(arg!(--json "Write one JSON object per allele instead of a matrix"))
}
