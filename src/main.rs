#![allow(non_snake_case)]
use RustedDeriv::Utils::config::SolverConfig;
use RustedDeriv::Utils::logger::{AUTO_LOG_FILE, init_logger};
use RustedDeriv::derivative::result_assembler::{DerivativePipeline, ProblemInput};
use RustedDeriv::derivative::samples::{SAMPLE_PROBLEMS, sample_problem};
use RustedDeriv::derivative::trail_report::render_trail;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Symbolic derivative of f with a validated, replayable solution trail.
#[derive(Debug, Parser)]
#[command(name = "rusted-deriv", version, about)]
struct Cli {
    /// expression in Python syntax, e.g. "x**3 + 2*x - 1"
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    fx: String,
    /// differentiation variable, x when blank
    #[arg(long, default_value = "")]
    var: String,
    /// derivative order 1..10, 1 when blank
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    order: String,
    /// evaluate the derivative at this point
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    point: String,
    /// solve built-in sample N instead of --fx/--order/--point
    #[arg(long, value_name = "N", conflicts_with_all = ["fx", "order", "point"])]
    sample: Option<usize>,
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// print the result record as JSON instead of the trail
    #[arg(long)]
    json: bool,
    /// overrides the loglevel of the configuration
    #[arg(long)]
    loglevel: Option<String>,
    /// also log to PATH; without a value a timestamped log_<date>_<time>.txt
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = AUTO_LOG_FILE)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => match SolverConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(2);
            }
        },
        None => SolverConfig::default(),
    };
    let loglevel = cli.loglevel.as_deref().unwrap_or(&config.loglevel);
    let log_file = cli.log_file.as_deref().or(config.log_file.as_deref());
    if let Err(e) = init_logger(loglevel, log_file) {
        eprintln!("{}", e);
        return ExitCode::from(2);
    }

    let input = match cli.sample {
        Some(number) => match sample_problem(number) {
            Some(input) => input,
            None => {
                eprintln!(
                    "no sample {}, choose 1..={}",
                    number,
                    SAMPLE_PROBLEMS.len()
                );
                return ExitCode::from(2);
            }
        },
        None => ProblemInput::new(&cli.fx, &cli.var, &cli.order, &cli.point),
    };

    let algebra = config.build_algebra();
    let pipeline = DerivativePipeline::new(algebra.as_deref(), config.pipeline_settings());
    let result = pipeline.run(&input);

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("cannot serialise result: {}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        print!("{}", render_trail(&result));
    }
    if result.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_flag() {
        let cli = Cli::try_parse_from(["rusted-deriv", "--fx", "x**2", "--log-file"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from(AUTO_LOG_FILE)));
        let cli = Cli::try_parse_from(["rusted-deriv", "--log-file", "run.log", "--fx", "x"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("run.log")));
        let cli = Cli::try_parse_from(["rusted-deriv", "--fx", "x"]).unwrap();
        assert_eq!(cli.log_file, None);
    }
}
