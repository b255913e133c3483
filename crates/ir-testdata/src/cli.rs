//! `gen-testdata` command line

use crate::config::{default_ir_cache_dir, parse_list, GeneratorConfig, DEFAULT_REFS_CONF};
use crate::filter::ModelFilter;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::convert::Infallible;
use std::path::PathBuf;

/// Build the command definition
#[must_use]
pub fn command() -> Command {
    Command::new("gen-testdata")
        .version(crate::VERSION)
        .about("Generate stress test configs for models from an IR cache")
        .arg(
            Arg::new("test_conf")
                .long("test_conf")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a test config .xml file"),
        )
        .arg(
            Arg::new("refs_conf")
                .long("refs_conf")
                .default_value(DEFAULT_REFS_CONF)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a references config .xml file"),
        )
        .arg(
            Arg::new("ir_cache_dir")
                .long("ir_cache_dir")
                .value_parser(value_parser!(PathBuf))
                .help("Directory with IRs to scan [default: ../ir_cache next to the executable]"),
        )
        .arg(list_arg("topology", "Comma separated model names to include"))
        .arg(list_arg("framework", "Comma separated frameworks to include"))
        .arg(list_arg("precision", "Comma separated precisions to include"))
        .arg(list_arg("not_topology", "Comma separated model names to exclude"))
}

fn list_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(list_value)
        .help(help)
}

fn list_value(value: &str) -> Result<Vec<String>, Infallible> {
    Ok(parse_list(value))
}

fn list(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_one::<Vec<String>>(name)
        .cloned()
        .unwrap_or_default()
}

/// Turn parsed arguments into a generator config
#[must_use]
pub fn config_from_matches(matches: &ArgMatches) -> GeneratorConfig {
    let filter = ModelFilter::new()
        .with_topology(list(matches, "topology"))
        .with_not_topology(list(matches, "not_topology"))
        .with_framework(list(matches, "framework"))
        .with_precision(list(matches, "precision"));

    let test_conf = matches
        .get_one::<PathBuf>("test_conf")
        .cloned()
        .unwrap_or_default();
    let refs_conf = matches
        .get_one::<PathBuf>("refs_conf")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REFS_CONF));
    let ir_cache_dir = matches
        .get_one::<PathBuf>("ir_cache_dir")
        .cloned()
        .unwrap_or_else(default_ir_cache_dir);

    GeneratorConfig::new(test_conf)
        .with_refs_conf(refs_conf)
        .with_ir_cache_dir(ir_cache_dir)
        .with_filter(filter)
}
