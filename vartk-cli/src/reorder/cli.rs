use clap::{Arg, Command, arg};

pub const REORDER_CMD: &str = "reorder";

pub fn create_reorder_cli() -> Command {
    Command::new(REORDER_CMD)
        .about("Rewrite FORMAT keys and sample fields in a canonical order")
        .arg_required_else_help(true)
        .arg(Arg::new("vcf").required(true).help("Input VCF, optionally gzipped"))
        .arg(arg!(--order <order> "Canonical key order, e.g. GT:AD:DP:GQ:PL (default: from config)"))
        .arg(arg!(-o --output <output> "Output file (default: stdout)"))
}
