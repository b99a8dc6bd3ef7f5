use std::path::Path;

use anyhow::{Result, bail};
use clap::ArgMatches;
use log::warn;

use vartk_core::{Variant, VariantError};

use crate::args::{parse_list, required};
use crate::batch::{copy_header, open_output, run_batch};
use crate::config::VartkConfig;

///
/// Reorder one record; a record with keys outside `order` is passed through unchanged.
///
pub fn reorder_record(mut variant: Variant, order: &[String]) -> Result<String> {
    match variant.reorder_fields(order) {
        Ok(()) => {}
        Err(VariantError::MissingField { key }) => {
            warn!(
                "{}:{} keeps its FORMAT order; `{}` is not in the canonical order",
                variant.contig, variant.position, key
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(variant.to_string())
}

pub fn run_reorder(matches: &ArgMatches, config: &VartkConfig) -> Result<()> {
    let vcf = required(matches, "vcf")?;
    let order = match matches.get_one::<String>("order") {
        Some(raw) => parse_list(raw),
        None => config.canonical_order.clone(),
    };
    if order.is_empty() {
        bail!("The canonical order is empty");
    }

    let mut out = open_output(matches.get_one::<String>("output"))?;
    run_batch(Path::new(vcf), &mut out, config, copy_header, |variant| {
        Ok(vec![reorder_record(variant, &order)?])
    })?;
    Ok(())
}
