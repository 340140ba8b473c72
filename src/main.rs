use std::process::ExitCode;
use std::sync::Arc;

use semvisor::cli::{self, Command};
use semvisor::{Coordinator, LogWriter, Subscribe};

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match cli::parse(std::env::args().skip(1)) {
        Ok(Command::Run(cfg)) => cfg,
        Ok(Command::Help) => {
            print!("{}", cli::USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            println!("{e}");
            println!("Try '--help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    let mut subs: Vec<Arc<dyn Subscribe>> = Vec::new();
    if !cfg.silent {
        subs.push(Arc::new(LogWriter::new()));
    }

    let report = cfg.report;
    let expected = cfg.expected_consumption();
    let coordinator = Coordinator::builder(cfg).with_subscribers(subs).build();
    match coordinator.run().await {
        Ok(summary) => {
            if report {
                eprintln!("semvisor: {summary} (expected {expected} consumed)");
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_startup() => {
            eprintln!("semvisor: fatal startup failure: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("semvisor: {e}");
            ExitCode::FAILURE
        }
    }
}
