//! Chunked, parallel processing of VCF records.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;

use vartk_core::{Variant, VariantError, VcfHeader, VcfReader};

use crate::config::VartkConfig;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub records: usize,
    pub skipped: usize,
}

///
/// Open the output file, or stdout when no path is given.
///
pub fn open_output(path: Option<&String>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Failed to create output file: {}", p))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

fn spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg} ({pos} records)")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

///
/// Stream a VCF through `process` on a worker pool and write what it returns.
///
/// Records are parsed on the workers, one [`Variant`] per worker at a time,
/// and outputs are written in input order. A record that fails to parse or
/// to process is logged and skipped; the batch carries on.
///
/// # Arguments
/// - header: called once with the VCF header before any record is written
/// - process: turns one record into zero or more output lines
///
pub fn run_batch<H, F>(
    input: &Path,
    out: &mut dyn Write,
    config: &VartkConfig,
    header: H,
    process: F,
) -> Result<BatchStats>
where
    H: FnOnce(&VcfHeader, &mut dyn Write) -> Result<()>,
    F: Fn(Variant) -> Result<Vec<String>> + Sync,
{
    let mut reader =
        VcfReader::from_path(input).with_context(|| format!("Failed to open VCF: {:?}", input))?;
    header(reader.header(), out)?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = config.threads {
        builder = builder.num_threads(n);
    }
    let pool = builder.build().context("Failed to build the worker pool")?;

    let pb = spinner()?;
    pb.set_message(format!("Processing {:?}", input.file_name().unwrap_or_default()));

    let mut stats = BatchStats::default();
    loop {
        let mut chunk = Vec::with_capacity(config.chunk_size);
        let mut taken = 0;
        for item in reader.by_ref().take(config.chunk_size) {
            taken += 1;
            match item {
                Ok(record) => chunk.push(record),
                Err(VariantError::Io(e)) => {
                    return Err(e).with_context(|| format!("Failed to read {:?}", input));
                }
                // an undecodable line only costs that record
                Err(e) => {
                    warn!("Skipping record: {}", e);
                    stats.records += 1;
                    stats.skipped += 1;
                }
            }
        }
        if taken == 0 {
            break;
        }

        let results: Vec<(usize, Result<Vec<String>>)> = pool.install(|| {
            chunk
                .into_par_iter()
                .map(|(n, line)| {
                    let result = line
                        .parse::<Variant>()
                        .map_err(anyhow::Error::from)
                        .and_then(&process);
                    (n, result)
                })
                .collect()
        });

        for (n, result) in results {
            stats.records += 1;
            match result {
                Ok(lines) => {
                    for line in lines {
                        writeln!(out, "{}", line)?;
                    }
                }
                Err(e) => {
                    warn!("Skipping record at line {}: {:#}", n, e);
                    stats.skipped += 1;
                }
            }
        }
        pb.set_position(stats.records as u64);
    }

    out.flush()?;
    pb.finish_and_clear();
    info!(
        "Processed {} records from {:?} ({} skipped)",
        stats.records, input, stats.skipped
    );
    Ok(stats)
}

///
/// Write the header lines unchanged.
///
pub fn copy_header(header: &VcfHeader, out: &mut dyn Write) -> Result<()> {
    for line in header.lines() {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
