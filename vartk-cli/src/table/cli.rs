use clap::{Arg, Command, arg};

pub const TABLE_CMD: &str = "table";

pub fn create_table_cli() -> Command {
    Command::new(TABLE_CMD)
        .about("Pretty-print, subset or convert a delimited table")
        .arg_required_else_help(true)
        .arg(Arg::new("file").required(true).help("Delimited text file, optionally gzipped"))
        .arg(arg!(-d --delimiter <delimiter> "Input delimiter (default: tab)"))
        .arg(arg!(-c --columns <columns> "Columns to keep, comma-separated, in output order"))
        .arg(arg!(--tsv "Write tab-separated text instead of an aligned table"))
        .arg(arg!(--"keep-comments" "Treat lines starting with # as data"))
}
