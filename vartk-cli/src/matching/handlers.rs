use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use fxhash::FxHashMap;
use serde::Serialize;

use vartk_core::{AnnovarQuery, MatchOutcome, Variant};

use crate::args::required;
use crate::batch::{open_output, run_batch};
use crate::config::VartkConfig;

#[derive(Serialize)]
struct MatchRow<'a> {
    query: String,
    contig: &'a str,
    position: Option<u64>,
    reference: Option<&'a str>,
    alternates: Option<String>,
    allele: Option<usize>,
    matches: usize,
}

///
/// Queries grouped by contig and sorted by start for window lookups.
///
pub struct QueryIndex {
    queries: Vec<AnnovarQuery>,
    by_contig: FxHashMap<String, BTreeMap<u64, Vec<usize>>>,
    seen: Vec<AtomicBool>,
}

impl QueryIndex {
    pub fn new(queries: Vec<AnnovarQuery>) -> Self {
        let mut by_contig: FxHashMap<String, BTreeMap<u64, Vec<usize>>> = FxHashMap::default();
        for (i, q) in queries.iter().enumerate() {
            by_contig
                .entry(q.contig.clone())
                .or_default()
                .entry(q.start)
                .or_default()
                .push(i);
        }
        let seen = queries.iter().map(|_| AtomicBool::new(false)).collect();
        QueryIndex {
            queries,
            by_contig,
            seen,
        }
    }

    ///
    /// Queries that can only match `variant`: an Annovar start never falls
    /// before the base preceding the record or past its last reference base.
    ///
    pub fn candidates(&self, variant: &Variant) -> Vec<(usize, &AnnovarQuery)> {
        let Some(starts) = self.by_contig.get(&variant.contig) else {
            return Vec::new();
        };
        let lo = variant.position.saturating_sub(1);
        let hi = variant.position + variant.reference.len() as u64;
        starts
            .range(lo..=hi)
            .flat_map(|(_, ids)| ids.iter().map(|i| (*i, &self.queries[*i])))
            .collect()
    }

    ///
    /// Match every candidate query against `variant`, remembering which hit.
    ///
    pub fn match_variant(&self, variant: &Variant) -> Vec<(&AnnovarQuery, MatchOutcome)> {
        let mut hits = Vec::new();
        for (i, q) in self.candidates(variant) {
            let outcome = variant.matches_query(q);
            if outcome.is_match() {
                self.seen[i].store(true, Ordering::Relaxed);
                hits.push((q, outcome));
            }
        }
        hits
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &AnnovarQuery> {
        self.queries
            .iter()
            .zip(&self.seen)
            .filter(|(_, seen)| !seen.load(Ordering::Relaxed))
            .map(|(q, _)| q)
    }
}

fn read_queries(path: &Path) -> Result<Vec<AnnovarQuery>> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("Failed to open queries: {:?}", path))?,
    );
    let mut queries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        queries.push(
            line.parse::<AnnovarQuery>()
                .with_context(|| format!("Bad query at line {}", i + 1))?,
        );
    }
    Ok(queries)
}

fn render(
    query: &AnnovarQuery,
    variant: Option<&Variant>,
    outcome: MatchOutcome,
    json: bool,
) -> Result<String> {
    if json {
        let row = MatchRow {
            query: query.to_string(),
            contig: &query.contig,
            position: variant.map(|v| v.position),
            reference: variant.map(|v| v.reference.as_str()),
            alternates: variant.map(|v| v.alternates.join(",")),
            allele: outcome.index(),
            matches: outcome.count(),
        };
        return Ok(serde_json::to_string(&row)?);
    }
    Ok(match variant {
        Some(v) => format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            query,
            v.contig,
            v.position,
            v.reference,
            v.alternates.join(","),
            outcome
        ),
        None => format!("{}\t{}\t.\t.\t.\t{}", query, query.contig, outcome),
    })
}

pub fn run_match(matches: &ArgMatches, config: &VartkConfig) -> Result<()> {
    let vcf = required(matches, "vcf")?;
    let json = matches.get_flag("json");

    let mut queries: Vec<AnnovarQuery> = Vec::new();
    if let Some(raw) = matches.get_many::<String>("query") {
        for q in raw {
            queries.push(q.parse().with_context(|| format!("Bad query `{}`", q))?);
        }
    }
    if let Some(path) = matches.get_one::<String>("queries") {
        queries.extend(read_queries(Path::new(path))?);
    }
    if queries.is_empty() {
        bail!("Give at least one query with --query or --queries");
    }

    let index = QueryIndex::new(queries);
    let mut out = open_output(matches.get_one::<String>("output"))?;

    let header = |_: &vartk_core::VcfHeader, out: &mut dyn Write| -> Result<()> {
        if !json {
            writeln!(out, "#query\tcontig\tposition\treference\talternates\tallele")?;
        }
        Ok(())
    };

    run_batch(Path::new(vcf), &mut out, config, header, |variant| {
        index
            .match_variant(&variant)
            .into_iter()
            .map(|(q, outcome)| render(q, Some(&variant), outcome, json))
            .collect()
    })?;

    let mut missing = 0;
    for q in index.unmatched() {
        writeln!(out, "{}", render(q, None, MatchOutcome::NoMatch, json)?)?;
        missing += 1;
    }
    out.flush()?;
    if missing > 0 {
        log::warn!("{} queries matched no record", missing);
    }
    Ok(())
}
