//! `yamlgate`: checks one file against the supported YAML subset.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use yamlgate_core::{run_lines, validate_reader, RunMode, ValidationReport, ValidatorOptions};

mod config;

/// Validate the structure of a YAML document without building its values.
#[derive(Debug, Parser)]
#[command(name = "yamlgate", version)]
struct Cli {
    /// File to validate
    path: PathBuf,

    /// Print every error as `line N: <kind>: <message>`
    #[arg(short, long)]
    verbose: bool,

    /// Stop at the first error
    #[arg(long)]
    fail_fast: bool,

    /// Accept a sequence as the whole document
    #[arg(long)]
    allow_top_level_sequence: bool,

    /// Allow mapping entries and sequence items under the same parent
    #[arg(long)]
    lenient_siblings: bool,

    /// Print an outline of the parsed structure
    #[arg(long)]
    tree: bool,

    /// TOML file with a `[validator]` table; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Exit codes for the validator.
mod exit_codes {
    /// Document is valid.
    pub const VALID: i32 = 0;
    /// Document is invalid.
    pub const INVALID: i32 = 1;
    /// Usage, config or I/O failure.
    pub const ERROR: i32 = 2;
}

impl Cli {
    fn options(&self) -> Result<ValidatorOptions> {
        let mut options = match &self.config {
            Some(path) => config::load_options(path)?,
            None => ValidatorOptions::default(),
        };
        if self.fail_fast {
            options.mode = RunMode::FailFast;
        }
        if self.allow_top_level_sequence {
            options.allow_top_level_sequence = true;
        }
        if self.lenient_siblings {
            options.strict_sibling_homogeneity = false;
        }
        // Only `--tree` reads the tree back; otherwise stream in bounded memory.
        options.retain_tree = self.tree;
        Ok(options)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::ERROR
        }
    };
    process::exit(code);
}

fn run(cli: &Cli) -> Result<i32> {
    let options = cli.options()?;
    log::info!("validating {} with {options:?}", cli.path.display());

    let file =
        File::open(&cli.path).with_context(|| format!("failed to open {}", cli.path.display()))?;
    let reader = BufReader::new(file);

    let report = if cli.tree {
        let lines = reader
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to read {}", cli.path.display()))?;
        let done = run_lines(&lines, &options);
        print!("{}", done.tree.render());
        done.report
    } else {
        validate_reader(reader, &options)
            .with_context(|| format!("failed to read {}", cli.path.display()))?
    };

    Ok(print_report(&report, cli.verbose))
}

fn print_report(report: &ValidationReport, verbose: bool) -> i32 {
    if verbose {
        for err in &report.errors {
            println!("{err}");
        }
    }
    if report.valid {
        println!("Valid YAML");
        exit_codes::VALID
    } else {
        println!("Invalid YAML");
        exit_codes::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("yamlgate").chain(args.iter().copied())).unwrap()
    }

    fn document(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn flags_override_defaults() {
        let options = cli(&["doc.yaml", "--fail-fast", "--lenient-siblings"])
            .options()
            .unwrap();
        assert_eq!(options.mode, RunMode::FailFast);
        assert!(!options.strict_sibling_homogeneity);
        assert!(!options.allow_top_level_sequence);
    }

    #[test]
    fn flags_override_config_file() {
        let config = document("[validator]\nstrict_sibling_homogeneity = true\nretain_tree = false\n");
        let path = config.path().to_string_lossy().into_owned();
        let options = cli(&["doc.yaml", "--config", path.as_str(), "--lenient-siblings", "--tree"])
            .options()
            .unwrap();
        assert!(!options.strict_sibling_homogeneity);
        assert!(options.retain_tree);
    }

    #[test]
    fn tree_is_released_unless_printed() {
        let options = cli(&["doc.yaml"]).options().unwrap();
        assert!(!options.retain_tree);

        let config = document("[validator]\nretain_tree = true\n");
        let path = config.path().to_string_lossy().into_owned();
        let options = cli(&["doc.yaml", "--config", path.as_str()]).options().unwrap();
        assert!(!options.retain_tree);

        assert!(cli(&["doc.yaml", "--tree"]).options().unwrap().retain_tree);
    }

    #[test]
    fn path_is_required() {
        assert!(Cli::try_parse_from(["yamlgate"]).is_err());
    }

    #[test]
    fn exit_code_follows_verdict() {
        let valid = document("name: test\nitems:\n  - one\n");
        let path = valid.path().to_string_lossy().into_owned();
        assert_eq!(run(&cli(&[path.as_str()])).unwrap(), exit_codes::VALID);

        let invalid = document("a:\n    b: 1\n  c: 2\n");
        let path = invalid.path().to_string_lossy().into_owned();
        assert_eq!(run(&cli(&[path.as_str(), "--verbose"])).unwrap(), exit_codes::INVALID);
        assert_eq!(run(&cli(&[path.as_str(), "--tree"])).unwrap(), exit_codes::INVALID);
    }

    #[test]
    fn missing_file_is_an_error_not_a_verdict() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");
        let path = path.to_string_lossy().into_owned();
        assert!(run(&cli(&[path.as_str()])).is_err());
    }
}
