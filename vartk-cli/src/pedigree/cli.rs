use clap::{Arg, ArgGroup, Command, arg};

pub const PEDIGREE_CMD: &str = "pedigree";

pub fn create_pedigree_cli() -> Command {
    Command::new(PEDIGREE_CMD)
        .about("Inspect a PED pedigree: trios, unrelated representatives or relatives")
        .arg_required_else_help(true)
        .arg(Arg::new("ped").required(true).help("PED file"))
        .arg(arg!(--samples <samples> "Sample sheet to join on individual id"))
        .arg(arg!(-d --delimiter <delimiter> "Sample sheet delimiter (default: tab)"))
        .arg(arg!(--"legacy-nbsp" "Strip leading non-breaking spaces from sample sheet code cells"))
        .arg(arg!(--trios "List complete trios"))
        .arg(arg!(--unrelated "List one representative per family"))
        .arg(arg!(--relatives <individual> "List first-degree relatives of an individual"))
        .group(
            ArgGroup::new("mode")
                .args(["trios", "unrelated", "relatives"])
                .required(false),
        )
}
