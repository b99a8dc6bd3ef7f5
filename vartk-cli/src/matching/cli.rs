use clap::{Arg, ArgAction, Command, arg};

pub const MATCH_CMD: &str = "match";

pub fn create_match_cli() -> Command {
    Command::new(MATCH_CMD)
        .about("Find the VCF allele each Annovar-style (contig, start, observed) query denotes")
        .arg_required_else_help(true)
        .arg(Arg::new("vcf").required(true).help("Input VCF, optionally gzipped"))
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .action(ArgAction::Append)
                .help("A query as contig:start:observed; may be repeated"),
        )
        .arg(arg!(--queries <queries> "File of queries, one per line (contig:start:observed or 3 tab-separated columns)"))
        .arg(arg!(-o --output <output> "Output file (default: stdout)"))
        .arg(arg!(--json "Write one JSON object per line"))
}
