use clap::Parser;
use liveability::app::{LiveabilityApp, RunStatus};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::debug!("cwd: {:?}", std::env::current_dir());
    let args = LiveabilityApp::parse();
    log::info!("starting liveability at {}", chrono::Local::now().to_rfc3339());
    match args.op.run(&args.config) {
        Ok(RunStatus::Complete) => ExitCode::SUCCESS,
        Ok(RunStatus::Incomplete) => {
            log::warn!("some units are in ERROR; re-run to resume or run the fallback pass");
            ExitCode::from(1)
        }
        Err(e) if e.is_config_error() => {
            log::error!("{e}");
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(1)
        }
    }
}
