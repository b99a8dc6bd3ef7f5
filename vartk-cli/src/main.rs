mod args;
mod batch;
mod config;
mod decompose;
mod dosage;
mod fetch;
mod matching;
mod pedigree;
mod reference;
mod reorder;
mod table;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgMatches, Command, arg, value_parser};

use config::VartkConfig;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "vartk";
    pub const BIN_NAME: &str = "vartk";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Variant normalization across positional conventions, multi-allelic decomposition and genotype dosage.")
        .subcommand_required(true)
        .arg(arg!(-v --verbose ... "More log output; repeat for more").global(true))
        .arg(
            arg!(--config <config> "TOML configuration file")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            arg!(-t --threads <threads> "Worker threads (overrides the config file)")
                .value_parser(value_parser!(usize))
                .global(true),
        )
        .arg(
            arg!(--"chunk-size" <records> "Records per parallel chunk (overrides the config file)")
                .value_parser(value_parser!(usize))
                .global(true),
        )
        .subcommand(table::cli::create_table_cli())
        .subcommand(decompose::cli::create_decompose_cli())
        .subcommand(matching::cli::create_match_cli())
        .subcommand(dosage::cli::create_dosage_cli())
        .subcommand(reorder::cli::create_reorder_cli())
        .subcommand(fetch::cli::create_fetch_cli())
        .subcommand(pedigree::cli::create_pedigree_cli())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

///
/// Config file values with command-line overrides applied.
///
fn load_config(matches: &ArgMatches) -> Result<VartkConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => VartkConfig::try_from(path.as_path())
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => VartkConfig::default(),
    };
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.threads = Some(*threads);
    }
    if let Some(chunk_size) = matches.get_one::<usize>("chunk-size") {
        config.chunk_size = (*chunk_size).max(1);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_count("verbose"));
    let config = load_config(&matches)?;
    log::debug!("{} {} with {:?}", consts::PKG_NAME, consts::VERSION, config);

    match matches.subcommand() {
        //
        // TABLE
        //
        Some((table::cli::TABLE_CMD, matches)) => {
            table::handlers::run_table(matches)?;
        }

        //
        // DECOMPOSE
        //
        Some((decompose::cli::DECOMPOSE_CMD, matches)) => {
            decompose::handlers::run_decompose(matches, &config)?;
        }

        //
        // MATCH
        //
        Some((matching::cli::MATCH_CMD, matches)) => {
            matching::handlers::run_match(matches, &config)?;
        }

        //
        // DOSAGE
        //
        Some((dosage::cli::DOSAGE_CMD, matches)) => {
            dosage::handlers::run_dosage(matches, &config)?;
        }

        //
        // REORDER
        //
        Some((reorder::cli::REORDER_CMD, matches)) => {
            reorder::handlers::run_reorder(matches, &config)?;
        }

        //
        // FETCH
        //
        Some((fetch::cli::FETCH_CMD, matches)) => {
            fetch::handlers::run_fetch(matches, &config)?;
        }

        //
        // PEDIGREE
        //
        Some((pedigree::cli::PEDIGREE_CMD, matches)) => {
            pedigree::handlers::run_pedigree(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parser_is_valid() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_parser_identity() {
        let parser = build_parser();
        assert_eq!(parser.get_name(), consts::BIN_NAME);
        assert_eq!(parser.get_author(), None);
    }

    #[rstest]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vartk.toml");
        std::fs::write(&path, "threads = 8\nchunk_size = 50\n").unwrap();

        let matches = build_parser().get_matches_from([
            "vartk",
            "--config",
            path.to_str().unwrap(),
            "dosage",
            "in.vcf",
            "--threads",
            "2",
        ]);
        let config = load_config(&matches).unwrap();

        assert_eq!(config.threads, Some(2));
        assert_eq!(config.chunk_size, 50);
    }
}
