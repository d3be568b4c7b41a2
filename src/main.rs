// src/main.rs

use std::process::ExitCode;

use tripwatch::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("tripwatch: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Context chain on one line, e.g. "loading config x: missing api_key".
            tracing::error!("{err:#}");
            eprintln!("tripwatch: {err:#}");
            ExitCode::FAILURE
        }
    }
}
