use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;
use serde::Serialize;

use vartk_core::{Variant, VcfHeader};

use crate::args::required;
use crate::batch::{open_output, run_batch};
use crate::config::VartkConfig;

#[derive(Serialize)]
struct DosageRow<'a> {
    contig: &'a str,
    position: u64,
    reference: &'a str,
    alternate: &'a str,
    allele: usize,
    /// `None` where the genotype is not fully called
    dosages: Vec<Option<u32>>,
}

///
/// One output row per alternate allele: the record columns, then each sample's dosage.
///
pub fn dosage_rows(variant: &Variant, json: bool) -> Result<Vec<String>> {
    let mut rows = Vec::with_capacity(variant.alternates.len());
    for (i, alt) in variant.alternates.iter().enumerate() {
        let allele = i + 1;
        let dosages = variant.dosages(allele)?;
        if json {
            rows.push(serde_json::to_string(&DosageRow {
                contig: &variant.contig,
                position: variant.position,
                reference: &variant.reference,
                alternate: alt,
                allele,
                dosages: dosages.iter().map(|d| d.value()).collect(),
            })?);
        } else {
            let mut cells = vec![
                variant.contig.clone(),
                variant.position.to_string(),
                variant.reference.clone(),
                alt.clone(),
                allele.to_string(),
            ];
            cells.extend(dosages.iter().map(|d| d.to_string()));
            rows.push(cells.join("\t"));
        }
    }
    Ok(rows)
}

pub fn run_dosage(matches: &ArgMatches, config: &VartkConfig) -> Result<()> {
    let vcf = required(matches, "vcf")?;
    let json = matches.get_flag("json");
    let mut out = open_output(matches.get_one::<String>("output"))?;

    let header = |header: &VcfHeader, out: &mut dyn Write| -> Result<()> {
        if !json {
            let mut cols = vec!["#contig", "position", "reference", "alternate", "allele"];
            cols.extend(header.samples().iter().map(String::as_str));
            writeln!(out, "{}", cols.join("\t"))?;
        }
        Ok(())
    };

    run_batch(Path::new(vcf), &mut out, config, header, |variant| {
        dosage_rows(&variant, json)
    })?;
    Ok(())
}
