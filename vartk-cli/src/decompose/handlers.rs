use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use vartk_core::decompose::OLD_MULTIALLELIC_KEY;
use vartk_core::{Variant, VcfHeader, left_align};

use crate::args::required;
use crate::batch::{open_output, run_batch};
use crate::config::VartkConfig;
use crate::reference::{Reference, open_reference};

fn old_multiallelic_meta() -> String {
    format!(
        "##INFO=<ID={},Number=1,Type=String,Description=\"Original chr:pos:ref/alt encoding\">",
        OLD_MULTIALLELIC_KEY
    )
}

///
/// Decompose one record, left-aligning every part when a reference is given.
///
pub fn decompose_record(variant: &Variant, reference: Option<&Reference>) -> Result<Vec<Variant>> {
    let mut parts = variant.decompose()?;
    if let Some(reference) = reference {
        for part in parts.iter_mut() {
            let Some(alt) = part.alternates.first() else {
                continue;
            };
            let (position, r, a) =
                left_align(reference, &part.contig, part.position, &part.reference, alt)?;
            part.position = position;
            part.reference = r;
            part.alternates = vec![a];
        }
    }
    Ok(parts)
}

pub fn run_decompose(matches: &ArgMatches, config: &VartkConfig) -> Result<()> {
    let vcf = required(matches, "vcf")?;
    let json = matches.get_flag("json");
    let reference = matches
        .get_one::<String>("reference")
        .map(|p| open_reference(Path::new(p), config.cache_capacity))
        .transpose()?;

    let mut out = open_output(matches.get_one::<String>("output"))?;

    let header = |header: &VcfHeader, out: &mut dyn Write| -> Result<()> {
        if json {
            return Ok(());
        }
        let mut header = header.clone();
        header.push_meta(&old_multiallelic_meta());
        for line in header.lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    };

    let stats = run_batch(Path::new(vcf), &mut out, config, header, |variant| {
        let parts = decompose_record(&variant, reference.as_ref())?;
        parts
            .iter()
            .map(|p| -> Result<String> {
                if json {
                    Ok(serde_json::to_string(p)?)
                } else {
                    Ok(p.to_string())
                }
            })
            .collect()
    })?;

    if let Some(reference) = &reference {
        log::debug!(
            "Reference cache: {} hits, {} misses",
            reference.hits(),
            reference.misses()
        );
    }
    log::info!("Decomposed {} records", stats.records - stats.skipped);
    Ok(())
}
