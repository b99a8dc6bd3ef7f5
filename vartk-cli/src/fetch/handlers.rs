use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;

use vartk_fasta::{IndexedFasta, Strand, fai_path, fetch_stranded};

use crate::args::required;
use crate::config::VartkConfig;
use crate::reference::open_reference;

const DEFAULT_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

///
/// Parse `contig:start-end` or `contig:position`; thousands separators are allowed.
///
pub fn parse_region(raw: &str) -> Result<Region> {
    let (contig, range) = raw
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Region `{}` has no `:`", raw))?;
    let number = |s: &str| -> Result<u64> {
        s.replace(',', "")
            .parse::<u64>()
            .with_context(|| format!("`{}` is not a position in region `{}`", s, raw))
    };
    let (start, end) = match range.split_once('-') {
        Some((s, e)) => (number(s)?, number(e)?),
        None => {
            let p = number(range)?;
            (p, p)
        }
    };
    if contig.is_empty() {
        bail!("Region `{}` has no contig", raw);
    }
    Ok(Region {
        contig: contig.to_string(),
        start,
        end,
    })
}

fn wrap(bases: &[u8], width: usize) -> Vec<&[u8]> {
    if width == 0 || bases.is_empty() {
        return vec![bases];
    }
    bases.chunks(width).collect()
}

pub fn run_fetch(matches: &ArgMatches, config: &VartkConfig) -> Result<()> {
    let fasta = Path::new(required(matches, "fasta")?);
    let strand: Strand = match matches.get_one::<String>("strand") {
        Some(s) => s.parse().map_err(|e: String| anyhow!(e))?,
        None => Strand::Forward,
    };
    let width = matches
        .get_one::<usize>("width")
        .copied()
        .unwrap_or(DEFAULT_WIDTH);

    if matches.get_flag("write-index") && !fai_path(fasta).exists() {
        let index = IndexedFasta::open(fasta)?.write_index()?;
        log::info!("Wrote {:?}", index);
    }

    let reference = open_reference(fasta, config.cache_capacity)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for raw in matches.get_many::<String>("regions").into_iter().flatten() {
        let region = parse_region(raw)?;
        let bases = fetch_stranded(&reference, &region.contig, region.start, region.end, strand)?;
        writeln!(
            out,
            ">{}:{}-{}({})",
            region.contig, region.start, region.end, strand
        )?;
        for line in wrap(&bases, width) {
            out.write_all(line)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}
