//! Small helpers for pulling typed values out of clap matches.
use anyhow::{Context, Result, bail};
use clap::ArgMatches;

pub fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .with_context(|| format!("Missing required argument `{}`", name))
}

///
/// Accept `tab`, `\t`, `comma` or any single character.
///
pub fn parse_delimiter(raw: &str) -> Result<char> {
    match raw {
        "tab" | "\\t" | "\t" => Ok('\t'),
        "comma" => Ok(','),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => bail!("Delimiter must be a single character, got `{}`", raw),
            }
        }
    }
}

///
/// Split a `:`- or `,`-separated list, dropping empty items.
///
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([':', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
