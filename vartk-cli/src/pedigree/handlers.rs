use anyhow::{Context, Result};
use clap::ArgMatches;
use tabled::{Table, Tabled};

use vartk_io::{Individual, Pedigree, SampleSheet, SampleSheetOptions, TableOptions};

use crate::args::{parse_delimiter, required};

#[derive(Tabled)]
pub struct IndividualPrint {
    family: String,
    id: String,
    father: String,
    mother: String,
    sex: String,
    status: String,
    gene_category: String,
}

#[derive(Tabled)]
pub struct TrioPrint {
    family: String,
    child: String,
    father: String,
    mother: String,
}

fn individual_print(ind: &Individual, sheet: Option<&SampleSheet>) -> IndividualPrint {
    let gene_category = sheet
        .and_then(|s| s.get(&ind.id))
        .map(|s| s.gene_category.to_string())
        .unwrap_or_else(|| ".".to_string());
    IndividualPrint {
        family: ind.family.clone(),
        id: ind.id.clone(),
        father: ind.father.clone().unwrap_or_else(|| "0".to_string()),
        mother: ind.mother.clone().unwrap_or_else(|| "0".to_string()),
        sex: ind.sex.to_string(),
        status: ind.status.to_string(),
        gene_category,
    }
}

///
/// Rows of the individuals table, joined with the sample sheet when one is given.
///
pub fn individual_rows(individuals: &[&Individual], sheet: Option<&SampleSheet>) -> Vec<IndividualPrint> {
    individuals
        .iter()
        .map(|ind| individual_print(ind, sheet))
        .collect()
}

pub fn run_pedigree(matches: &ArgMatches) -> Result<()> {
    let ped = required(matches, "ped")?;
    let pedigree =
        Pedigree::from_path(ped).with_context(|| format!("Failed to load pedigree: {}", ped))?;

    let sheet = match matches.get_one::<String>("samples") {
        Some(path) => {
            let mut options = SampleSheetOptions {
                legacy_nbsp: matches.get_flag("legacy-nbsp"),
                ..Default::default()
            };
            if let Some(d) = matches.get_one::<String>("delimiter") {
                options.table = TableOptions {
                    delimiter: parse_delimiter(d)?,
                    ..Default::default()
                };
            }
            let sheet = SampleSheet::read(path, &options)
                .with_context(|| format!("Failed to load sample sheet: {}", path))?;
            for ind in pedigree.individuals() {
                if sheet.get(&ind.id).is_none() {
                    log::warn!("{} is in the pedigree but not in the sample sheet", ind.id);
                }
            }
            Some(sheet)
        }
        None => None,
    };

    if matches.get_flag("trios") {
        let trios: Vec<TrioPrint> = pedigree
            .trios()
            .into_iter()
            .map(|(child, father, mother)| TrioPrint {
                family: child.family.clone(),
                child: child.id.clone(),
                father: father.id.clone(),
                mother: mother.id.clone(),
            })
            .collect();
        let n = trios.len();
        println!("{}", Table::new(trios));
        println!("Number of trios: {}", n);
        return Ok(());
    }

    let individuals: Vec<&Individual> = if matches.get_flag("unrelated") {
        pedigree.unrelated()
    } else if let Some(id) = matches.get_one::<String>("relatives") {
        if pedigree.get(id).is_none() {
            anyhow::bail!("Individual `{}` is not in the pedigree", id);
        }
        pedigree.first_degree(id)
    } else {
        pedigree.individuals().iter().collect()
    };

    let n = individuals.len();
    println!("{}", Table::new(individual_rows(&individuals, sheet.as_ref())));
    println!("Number of individuals: {}", n);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use vartk_io::Table as DataTable;

    #[rstest]
    fn test_rows_join_sample_sheet() {
        let pedigree =
            Pedigree::from_reader(Cursor::new("F1 dad 0 0 1 1\nF1 kid dad 0 2 2\n")).unwrap();
        let table = DataTable::from_reader(
            Cursor::new("sample\tgene_category\nkid\tC\n"),
            &TableOptions::default(),
        )
        .unwrap();
        let sheet = SampleSheet::from_table(&table, &SampleSheetOptions::default()).unwrap();

        let all: Vec<&Individual> = pedigree.individuals().iter().collect();
        let rows = individual_rows(&all, Some(&sheet));

        assert_eq!(rows[0].gene_category, ".");
        assert_eq!(rows[1].father, "dad");
        assert_eq!(rows[1].mother, "0");
        assert_eq!(rows[1].sex, "female");
        assert_eq!(rows[1].gene_category, "candidate");
    }
}
