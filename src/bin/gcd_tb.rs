use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use tlmtb::gcd::suite;
use tlmtb::test::run_tests;
use tlmtb::{logging, TbConfig, TbResult};

#[derive(Parser, Debug)]
#[command(name = "gcd_tb", about = "Runs the GCD testbench against the behavioural model")]
struct Cli {
    /// Test to run, may be repeated. Runs every test when omitted.
    #[arg(long = "test", value_name = "NAME")]
    tests: Vec<String>,

    /// Lists the available tests and exits.
    #[arg(long)]
    list: bool,

    /// Seed of the random sequences, overrides the config file.
    #[arg(long, env = "TLMTB_SEED")]
    seed: Option<u64>,

    /// TOML file with testbench settings.
    #[arg(long, env = "TLMTB_CONFIG")]
    config: Option<PathBuf>,

    /// Where to write the JUnit XML report.
    #[arg(long)]
    junit: Option<PathBuf>,

    /// Log filter directive, `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    log: String,
}

fn run(cli: Cli) -> TbResult<bool> {
    let registry = suite::registry();
    if cli.list {
        for test in registry.iter() {
            println!("{:<14} {}", test.name, test.description);
        }
        return Ok(true);
    }

    let mut cfg = match &cli.config {
        Some(path) => TbConfig::load(path)?,
        None => TbConfig::default(),
    };
    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
    if cli.junit.is_some() {
        cfg.junit_path = cli.junit;
    }

    let tests = registry.select(&cli.tests)?;
    let summary = run_tests(&tests, &cfg)?;
    Ok(summary.passed())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}
