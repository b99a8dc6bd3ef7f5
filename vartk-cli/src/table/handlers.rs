use std::io::Write;

use anyhow::{Context, Result};
use clap::ArgMatches;

use vartk_io::{Table, TableOptions};

use crate::args::{parse_delimiter, parse_list, required};

pub fn run_table(matches: &ArgMatches) -> Result<()> {
    let file = required(matches, "file")?;

    let mut options = TableOptions::default();
    if let Some(d) = matches.get_one::<String>("delimiter") {
        options.delimiter = parse_delimiter(d)?;
    }
    if matches.get_flag("keep-comments") {
        options.comment = None;
    }

    let mut table =
        Table::read(file, &options).with_context(|| format!("Failed to read table: {}", file))?;
    if let Some(columns) = matches.get_one::<String>("columns") {
        table = table.select(&parse_list(columns))?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if matches.get_flag("tsv") {
        table.write(&mut out, '\t')?;
    } else {
        writeln!(out, "{}", table.render())?;
        writeln!(out, "Number of rows: {}", table.len())?;
    }
    Ok(())
}
