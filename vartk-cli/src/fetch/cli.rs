use clap::{Arg, Command, arg, value_parser};

pub const FETCH_CMD: &str = "fetch";

pub fn create_fetch_cli() -> Command {
    Command::new(FETCH_CMD)
        .about("Print reference bases for one or more regions")
        .arg_required_else_help(true)
        .arg(Arg::new("fasta").required(true).help("Reference FASTA (indexed, plain or gzipped)"))
        .arg(
            Arg::new("regions")
                .required(true)
                .num_args(1..)
                .help("Regions as contig:start-end or contig:position, 1-based inclusive"),
        )
        .arg(arg!(-s --strand <strand> "Strand to report, + or - (default: +)"))
        .arg(
            arg!(-w --width <width> "Line width of the FASTA output; 0 for one line")
                .value_parser(value_parser!(usize)),
        )
        .arg(arg!(--"write-index" "Write <fasta>.fai when it had to be computed"))
}
