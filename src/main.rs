use std::process::ExitCode;

use log::error;
use timetable_solver::config::SolverConfig;
use timetable_solver::data::{Strategy, TimetableInput};
use timetable_solver::{server, solver};

const USAGE: &str = "Usage: timetable_solver <astar|hc> <input_file> [config_file] | serve [addr]";
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd] if cmd == "serve" => serve(DEFAULT_ADDR).await,
        [cmd, addr] if cmd == "serve" => serve(addr).await,
        [algorithm, input] => run(algorithm, input, None).await,
        [algorithm, input, config] => run(algorithm, input, Some(config)).await,
        _ => {
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(addr: &str) -> ExitCode {
    match server::run_server(addr).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server failed on {addr}: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(algorithm: &str, input_path: &str, config_path: Option<&String>) -> ExitCode {
    let strategy: Strategy = match algorithm.parse() {
        Ok(strategy) => strategy,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    let input = match TimetableInput::from_path(input_path) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("cannot read {input_path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config = match config_path.map(SolverConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("cannot read configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = tokio::task::spawn_blocking(move || solver::solve(&input, strategy, &config)).await;
    match result {
        Ok(Ok(output)) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            eprintln!("invalid input: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("solver task failed: {e}");
            ExitCode::FAILURE
        }
    }
}
