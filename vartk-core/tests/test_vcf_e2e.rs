//! End-to-end: VCF file on disk -> parsed records -> alleles, matching and dosage

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::tempdir;

use vartk_core::decompose::OLD_MULTIALLELIC_KEY;
use vartk_core::{AlleleType, Dosage, MatchOutcome, Variant, VariantError, VcfReader};

const HEADER: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2\tS3\n";

fn write_vcf(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("calls.vcf");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(f, "{}{}", HEADER, body).unwrap();
    (dir, path)
}

#[rstest]
fn test_batch_skips_malformed_records() {
    let (_dir, path) = write_vcf(
        "chr1\t20\t.\tCAG\tC\t50\tPASS\tDP=10\tGT\t0/1\t1/1\t./.\n\
chr1\t0\t.\tA\tT\t.\tPASS\t.\tGT\t0/1\t0/0\t0/0\n\
chr6\t40503520\t.\tACTGCTG\tACTGCTGCTGCTGCTG,A\t.\tPASS\t.\tGT\t1/2\t2/2\t0/1\n",
    );

    let mut parsed = Vec::new();
    let mut rejected = Vec::new();
    for (line, result) in VcfReader::from_path(&path).unwrap().variants() {
        match result {
            Ok(v) => parsed.push(v),
            Err(e) => rejected.push((line, e)),
        }
    }

    assert_eq!(parsed.len(), 2);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].0, 4);
    assert!(matches!(rejected[0].1, VariantError::MalformedRecord { column: 1, .. }));

    let deletion = &parsed[0];
    assert_eq!(deletion.alleles()[0].kind, AlleleType::Deletion);
    assert_eq!(deletion.matches("chr1", 21, "-"), MatchOutcome::Match(1));
    assert_eq!(
        deletion.dosages(1).unwrap(),
        vec![Dosage::Called(1), Dosage::Called(2), Dosage::Unknown]
    );

    let multi = &parsed[1];
    assert_eq!(multi.matches("chr6", 40503521, "-"), MatchOutcome::Match(2));
    assert_eq!(
        multi.dosages(2).unwrap(),
        vec![Dosage::Called(1), Dosage::Called(2), Dosage::Called(0)]
    );
}

#[rstest]
fn test_records_render_back_identically() {
    let body = "chr2\t5\trs1\tG\tA,T\t12.5\tPASS\tDP=4;DB\tGT:DP\t0|1:3\t1/2:9\t./.:.\n";
    let (_dir, path) = write_vcf(body);

    let reader = VcfReader::from_path(&path).unwrap();
    let lines: Vec<String> = reader
        .variants()
        .map(|(_, r)| r.unwrap().to_string())
        .collect();

    assert_eq!(lines, vec![body.trim_end().to_string()]);
}

#[rstest]
fn test_decomposed_records_parse_again() {
    let v: Variant = "chr6\t40503520\t.\tACTGCTG\tACTGCTGCTGCTGCTG,A\t.\tPASS\t.\tGT\t1/2"
        .parse()
        .unwrap();

    for (i, part) in v.decompose().unwrap().into_iter().enumerate() {
        let reparsed: Variant = part.to_string().parse().unwrap();
        assert_eq!(reparsed, part);
        assert!(reparsed.info.contains_key(OLD_MULTIALLELIC_KEY));
        assert_eq!(reparsed.dosage(0, 1).unwrap(), Dosage::Called(1));
        assert_eq!(reparsed.alleles()[0].kind, v.alleles()[i].kind);
    }
}
